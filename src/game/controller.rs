use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::scheduler::EventLoop;
use super::state::{CardFace, Cell, GameConfig, GameState, HIDDEN_LABEL, PairOutcome, Selection};

pub const COMPLETION_TITLE: &str = "Congratulations!";

/// Rendering side of the game. The controller never reads anything back.
pub trait Surface {
    fn render(&self, index: usize, label: &str, face: CardFace);
    fn set_score_text(&self, text: &str);
    fn set_time_text(&self, text: &str);
    fn show_completion_dialog(&self, title: &str, message: &str);
}

pub fn score_text(score: u32) -> String {
    format!("Score: {score}")
}

pub fn time_text(secs: u64) -> String {
    format!("Time: {secs}s")
}

pub fn completion_message(secs: u64, score: u32) -> String {
    format!("You found every pair!\n\nTime: {secs}s\nScore: {score}")
}

struct Inner {
    config: GameConfig,
    surface: Rc<dyn Surface>,
    events: Rc<dyn EventLoop>,
    rng: RefCell<StdRng>,
    state: RefCell<GameState>,
}

/// Owns one window's game and reacts to clicks and timers.
///
/// Cloning yields another handle to the same game. Scheduled callbacks hold
/// only a weak handle and carry the generation they were scheduled for, so
/// anything left over from a replaced session is dropped when it fires.
#[derive(Clone)]
pub struct GameController {
    inner: Rc<Inner>,
}

impl GameController {
    pub fn new(config: GameConfig, surface: Rc<dyn Surface>, events: Rc<dyn EventLoop>) -> Self {
        Self::with_rng(config, surface, events, StdRng::from_rng(&mut rand::rng()))
    }

    /// Same as [`GameController::new`] with a caller-chosen shuffle source.
    pub fn with_rng(
        config: GameConfig,
        surface: Rc<dyn Surface>,
        events: Rc<dyn EventLoop>,
        mut rng: StdRng,
    ) -> Self {
        let state = GameState::deal(&config, &mut rng, events.now(), 0);
        GameController {
            inner: Rc::new(Inner {
                config,
                surface,
                events,
                rng: RefCell::new(rng),
                state: RefCell::new(state),
            }),
        }
    }

    pub fn new_game(&self) {
        let generation = {
            let mut st = self.inner.state.borrow_mut();
            let generation = st.generation.wrapping_add(1);
            let mut rng = self.inner.rng.borrow_mut();
            *st = GameState::deal(&self.inner.config, &mut *rng, self.inner.events.now(), generation);
            generation
        };
        info!(
            generation,
            cells = self.inner.config.cell_count(),
            pairs = self.inner.config.total_pairs(),
            "new game"
        );

        let surface = &self.inner.surface;
        for index in 0..self.inner.config.cell_count() {
            surface.render(index, HIDDEN_LABEL, CardFace::FaceDown);
        }
        surface.set_score_text(&score_text(0));
        surface.set_time_text(&time_text(0));
        self.start_clock(generation);
    }

    fn start_clock(&self, generation: u64) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.events.schedule_repeating(
            self.inner.config.tick_interval,
            Box::new(move || match upgrade(&weak) {
                Some(game) => game.tick(generation),
                None => ControlFlow::Break(()),
            }),
        );
    }

    fn tick(&self, generation: u64) -> ControlFlow<()> {
        let st = self.inner.state.borrow();
        if st.generation != generation {
            debug!(generation, current = st.generation, "stopping stale clock");
            return ControlFlow::Break(());
        }
        if st.is_complete() {
            return ControlFlow::Break(());
        }
        let elapsed = st.elapsed_secs(self.inner.events.now());
        drop(st);
        self.inner.surface.set_time_text(&time_text(elapsed));
        ControlFlow::Continue(())
    }

    pub fn on_cell_click(&self, index: usize) {
        let mut st = self.inner.state.borrow_mut();
        assert!(
            index < st.cells.len(),
            "cell index {index} out of range for {} cells",
            st.cells.len()
        );
        if !st.accepts_click(index) {
            return;
        }

        let selection = st.reveal(index);
        let cell = &st.cells[index];
        debug!(index, symbol = %cell.symbol, "reveal");
        self.inner.surface.render(index, cell.label(), cell.face());

        if let Selection::Pair(..) = selection {
            drop(st);
            self.check_match();
        }
    }

    fn check_match(&self) {
        let mut st = self.inner.state.borrow_mut();
        match st.resolve_pair(self.inner.config.points_per_match) {
            PairOutcome::Match { first, second } => {
                info!(first, second, score = st.score, pairs = st.matched_pairs, "match");
                let surface = &self.inner.surface;
                surface.set_score_text(&score_text(st.score));
                for index in [first, second] {
                    let cell = &st.cells[index];
                    surface.render(index, cell.label(), cell.face());
                }
                if st.is_complete() {
                    drop(st);
                    self.on_win();
                }
            }
            PairOutcome::Mismatch { first, second } => {
                debug!(first, second, "mismatch");
                let generation = st.generation;
                drop(st);
                self.schedule_hide(generation, first, second);
            }
        }
    }

    fn schedule_hide(&self, generation: u64, first: usize, second: usize) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.events.schedule_once(
            self.inner.config.mismatch_delay,
            Box::new(move || {
                if let Some(game) = upgrade(&weak) {
                    game.hide_pair(generation, first, second);
                }
            }),
        );
    }

    fn hide_pair(&self, generation: u64, first: usize, second: usize) {
        let mut st = self.inner.state.borrow_mut();
        if st.generation != generation {
            debug!(generation, current = st.generation, "dropping stale hide");
            return;
        }
        st.hide_pair(first, second);
        for index in [first, second] {
            let cell = &st.cells[index];
            self.inner.surface.render(index, cell.label(), cell.face());
        }
    }

    fn on_win(&self) {
        let (elapsed, score) = {
            let st = self.inner.state.borrow();
            (st.elapsed_secs(self.inner.events.now()), st.score)
        };
        info!(elapsed, score, "all pairs found");
        self.inner
            .surface
            .show_completion_dialog(COMPLETION_TITLE, &completion_message(elapsed, score));
    }

    pub fn config(&self) -> &GameConfig {
        &self.inner.config
    }

    pub fn score(&self) -> u32 {
        self.inner.state.borrow().score
    }

    pub fn matched_pairs(&self) -> usize {
        self.inner.state.borrow().matched_pairs
    }

    pub fn total_pairs(&self) -> usize {
        self.inner.config.total_pairs()
    }

    pub fn is_locked(&self) -> bool {
        self.inner.state.borrow().locked
    }

    pub fn is_complete(&self) -> bool {
        self.inner.state.borrow().is_complete()
    }

    pub fn generation(&self) -> u64 {
        self.inner.state.borrow().generation
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.inner.state.borrow().elapsed_secs(self.inner.events.now())
    }

    pub fn cells(&self) -> Vec<Cell> {
        self.inner.state.borrow().cells.clone()
    }

    pub fn face_up_unmatched(&self) -> usize {
        self.inner.state.borrow().face_up_unmatched()
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<GameController> {
    weak.upgrade().map(|inner| GameController { inner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::scheduler::VirtualLoop;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Render(usize, String, CardFace),
        Score(String),
        Time(String),
        Dialog(String, String),
    }

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<Call>>,
    }

    impl Recorder {
        fn take(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.borrow_mut())
        }

        fn dialogs(&self) -> Vec<(String, String)> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|call| match call {
                    Call::Dialog(title, message) => Some((title.clone(), message.clone())),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for Recorder {
        fn render(&self, index: usize, label: &str, face: CardFace) {
            self.calls
                .borrow_mut()
                .push(Call::Render(index, label.to_string(), face));
        }

        fn set_score_text(&self, text: &str) {
            self.calls.borrow_mut().push(Call::Score(text.to_string()));
        }

        fn set_time_text(&self, text: &str) {
            self.calls.borrow_mut().push(Call::Time(text.to_string()));
        }

        fn show_completion_dialog(&self, title: &str, message: &str) {
            self.calls
                .borrow_mut()
                .push(Call::Dialog(title.to_string(), message.to_string()));
        }
    }

    struct Harness {
        game: GameController,
        surface: Rc<Recorder>,
        events: Rc<VirtualLoop>,
    }

    fn harness(seed: u64) -> Harness {
        let surface = Rc::new(Recorder::default());
        let events = Rc::new(VirtualLoop::new());
        let game = GameController::with_rng(
            GameConfig::default(),
            surface.clone(),
            events.clone(),
            StdRng::seed_from_u64(seed),
        );
        game.new_game();
        surface.take();
        Harness {
            game,
            surface,
            events,
        }
    }

    fn partner(game: &GameController, index: usize) -> usize {
        let cells = game.cells();
        (0..cells.len())
            .find(|&i| i != index && cells[i].symbol == cells[index].symbol)
            .unwrap()
    }

    fn stranger(game: &GameController, index: usize) -> usize {
        let cells = game.cells();
        (0..cells.len())
            .find(|&i| cells[i].symbol != cells[index].symbol)
            .unwrap()
    }

    fn pairs(game: &GameController) -> Vec<(usize, usize)> {
        let mut seen = Vec::new();
        let mut out = Vec::new();
        for index in 0..game.cells().len() {
            if seen.contains(&index) {
                continue;
            }
            let other = partner(game, index);
            seen.extend([index, other]);
            out.push((index, other));
        }
        out
    }

    #[test]
    fn new_game_renders_face_down_board() {
        let surface = Rc::new(Recorder::default());
        let events = Rc::new(VirtualLoop::new());
        let game = GameController::with_rng(
            GameConfig::default(),
            surface.clone(),
            events,
            StdRng::seed_from_u64(1),
        );
        game.new_game();

        let calls = surface.take();
        let renders: Vec<_> = calls
            .iter()
            .filter(|call| matches!(call, Call::Render(_, label, CardFace::FaceDown) if label == "?"))
            .collect();
        assert_eq!(renders.len(), 12);
        assert!(calls.contains(&Call::Score("Score: 0".into())));
        assert!(calls.contains(&Call::Time("Time: 0s".into())));
        assert_eq!(game.generation(), 1);
    }

    #[test]
    fn mismatch_hides_after_delay() {
        let h = harness(2);
        let a = 0;
        let b = stranger(&h.game, a);

        h.game.on_cell_click(a);
        h.game.on_cell_click(b);
        assert!(h.game.is_locked());
        assert_eq!(h.game.face_up_unmatched(), 2);

        h.events.advance(Duration::from_millis(999));
        assert!(h.game.is_locked());
        assert_eq!(h.game.face_up_unmatched(), 2);

        h.events.advance(Duration::from_millis(1));
        assert!(!h.game.is_locked());
        assert_eq!(h.game.face_up_unmatched(), 0);
        assert_eq!(h.game.score(), 0);
        let calls = h.surface.take();
        assert!(calls.contains(&Call::Render(a, "?".into(), CardFace::FaceDown)));
        assert!(calls.contains(&Call::Render(b, "?".into(), CardFace::FaceDown)));
    }

    #[test]
    fn match_settles_immediately() {
        let h = harness(3);
        let a = 0;
        let c = partner(&h.game, a);
        let symbol = h.game.cells()[a].symbol.clone();

        h.game.on_cell_click(a);
        h.game.on_cell_click(c);

        assert!(!h.game.is_locked());
        assert_eq!(h.game.score(), 10);
        assert_eq!(h.game.matched_pairs(), 1);
        let calls = h.surface.take();
        assert!(calls.contains(&Call::Render(a, symbol.clone(), CardFace::Matched)));
        assert!(calls.contains(&Call::Render(c, symbol, CardFace::Matched)));
        assert!(calls.contains(&Call::Score("Score: 10".into())));
    }

    #[test]
    fn clicks_ignored_while_locked_or_matched() {
        let h = harness(4);
        let a = 0;
        let c = partner(&h.game, a);
        h.game.on_cell_click(a);
        h.game.on_cell_click(c);
        h.surface.take();

        h.game.on_cell_click(a);
        assert!(h.surface.take().is_empty());
        assert_eq!(h.game.face_up_unmatched(), 0);

        let x = (0..12).find(|&i| i != a && i != c).unwrap();
        let cells = h.game.cells();
        let y = (0..12)
            .find(|&i| !cells[i].matched && cells[i].symbol != cells[x].symbol)
            .unwrap();
        h.game.on_cell_click(x);
        h.game.on_cell_click(y);
        assert!(h.game.is_locked());
        h.surface.take();
        let before = h.game.cells();

        let z = (0..12).find(|&i| ![a, c, x, y].contains(&i)).unwrap();
        h.game.on_cell_click(z);
        assert!(h.surface.take().is_empty());
        assert_eq!(h.game.cells(), before);
        assert!(h.game.face_up_unmatched() <= 2);
    }

    #[test]
    fn clicking_revealed_first_card_again_is_ignored() {
        let h = harness(5);
        h.game.on_cell_click(4);
        h.surface.take();
        h.game.on_cell_click(4);
        assert!(h.surface.take().is_empty());
        assert!(!h.game.is_locked());
        assert_eq!(h.game.face_up_unmatched(), 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_click_panics() {
        let h = harness(6);
        h.game.on_cell_click(12);
    }

    #[test]
    fn clock_updates_time_label_each_second() {
        let h = harness(7);
        h.events.advance_secs(3);
        let times: Vec<_> = h
            .surface
            .take()
            .into_iter()
            .filter(|call| matches!(call, Call::Time(_)))
            .collect();
        assert_eq!(
            times,
            vec![
                Call::Time("Time: 1s".into()),
                Call::Time("Time: 2s".into()),
                Call::Time("Time: 3s".into()),
            ]
        );
    }

    #[test]
    fn winning_shows_one_dialog_and_stops_clock() {
        let h = harness(8);
        h.events.advance_secs(4);
        for (a, b) in pairs(&h.game) {
            h.game.on_cell_click(a);
            h.game.on_cell_click(b);
            h.events.advance(Duration::from_millis(500));
        }
        assert!(h.game.is_complete());

        let dialogs = h.surface.dialogs();
        assert_eq!(dialogs.len(), 1);
        assert_eq!(dialogs[0].0, COMPLETION_TITLE);
        assert!(dialogs[0].1.contains("Score: 60"));
        assert!(dialogs[0].1.contains("Time: 6s"), "{}", dialogs[0].1);

        h.surface.take();
        h.events.advance_secs(5);
        assert!(h.surface.take().is_empty());
        assert_eq!(h.events.pending(), 0);
    }

    #[test]
    fn restart_resets_everything() {
        let h = harness(9);
        let a = 0;
        let c = partner(&h.game, a);
        h.game.on_cell_click(a);
        h.game.on_cell_click(c);
        let x = (0..12).find(|&i| i != a && i != c).unwrap();
        h.game.on_cell_click(x);

        h.game.new_game();
        assert_eq!(h.game.score(), 0);
        assert_eq!(h.game.matched_pairs(), 0);
        assert!(!h.game.is_locked());
        assert!(h.game.cells().iter().all(|cell| cell.face() == CardFace::FaceDown));
        assert_eq!(h.game.generation(), 2);
    }

    #[test]
    fn restart_drops_pending_hide() {
        let h = harness(10);
        let a = 0;
        let b = stranger(&h.game, a);
        h.game.on_cell_click(a);
        h.game.on_cell_click(b);

        h.game.new_game();
        h.game.on_cell_click(a);
        h.surface.take();

        h.events.advance_secs(1);
        assert_eq!(h.game.face_up_unmatched(), 1);
        assert!(h.game.cells()[a].revealed);
        assert!(
            !h.surface
                .take()
                .iter()
                .any(|call| matches!(call, Call::Render(..)))
        );
    }

    #[test]
    fn restart_keeps_a_single_clock() {
        let h = harness(11);
        h.game.new_game();
        h.game.new_game();
        h.surface.take();

        h.events.advance_secs(1);
        let ticks = h
            .surface
            .take()
            .into_iter()
            .filter(|call| matches!(call, Call::Time(_)))
            .count();
        assert_eq!(ticks, 1);
        assert_eq!(h.events.pending(), 1);
    }

    #[test]
    fn dropped_controller_stops_callbacks() {
        let h = harness(12);
        let surface = h.surface.clone();
        let events = h.events.clone();
        drop(h);
        events.advance_secs(3);
        assert!(surface.take().is_empty());
        assert_eq!(events.pending(), 0);
    }
}
