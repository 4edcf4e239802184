use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::ConfigError;

pub const GRID_ROWS: usize = 4;
pub const GRID_COLS: usize = 3;
pub const MATCH_POINTS: u32 = 10;
pub const MISMATCH_DELAY_MS: u64 = 1000;
pub const TICK_INTERVAL_MS: u64 = 1000;
pub const HIDDEN_LABEL: &str = "?";

pub const DEFAULT_SYMBOLS: [&str; 6] = ["🍎", "🍊", "🍇", "🍓", "🍌", "🍉"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardFace {
    FaceDown,
    FaceUp,
    Matched,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub symbol: String,
    pub revealed: bool,
    pub matched: bool,
}

impl Cell {
    fn face_down(symbol: &str) -> Self {
        Cell {
            symbol: symbol.to_string(),
            revealed: false,
            matched: false,
        }
    }

    pub fn face(&self) -> CardFace {
        if self.matched {
            CardFace::Matched
        } else if self.revealed {
            CardFace::FaceUp
        } else {
            CardFace::FaceDown
        }
    }

    pub fn label(&self) -> &str {
        match self.face() {
            CardFace::FaceDown => HIDDEN_LABEL,
            CardFace::FaceUp | CardFace::Matched => &self.symbol,
        }
    }
}

/// Board shape, symbol set and timing rules for a game.
///
/// Every symbol is dealt exactly twice, so `rows * cols` must be twice the
/// number of symbols.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    rows: usize,
    cols: usize,
    symbols: Vec<String>,
    pub mismatch_delay: Duration,
    pub tick_interval: Duration,
    pub points_per_match: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            mismatch_delay: Duration::from_millis(MISMATCH_DELAY_MS),
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            points_per_match: MATCH_POINTS,
        }
    }
}

impl GameConfig {
    pub fn new(rows: usize, cols: usize, symbols: Vec<String>) -> Result<Self, ConfigError> {
        if symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        let cells = rows * cols;
        if cells != symbols.len() * 2 {
            return Err(ConfigError::GridSize {
                rows,
                cols,
                pairs: symbols.len(),
            });
        }
        let mut seen = HashSet::with_capacity(symbols.len());
        for symbol in &symbols {
            if symbol.trim().is_empty() {
                return Err(ConfigError::EmptySymbol);
            }
            if !seen.insert(symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol(symbol.clone()));
            }
        }
        Ok(GameConfig {
            rows,
            cols,
            symbols,
            ..GameConfig::default()
        })
    }

    /// Default grid and timings with a different symbol set.
    pub fn with_symbols(symbols: Vec<String>) -> Result<Self, ConfigError> {
        Self::new(GRID_ROWS, GRID_COLS, symbols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn total_pairs(&self) -> usize {
        self.symbols.len()
    }
}

/// What a reveal did to the pending selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    First(usize),
    Pair(usize, usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairOutcome {
    Match { first: usize, second: usize },
    Mismatch { first: usize, second: usize },
}

/// One session's board and counters. Dealt wholesale; never reshuffled.
#[derive(Clone, Debug)]
pub struct GameState {
    pub cells: Vec<Cell>,
    pub score: u32,
    pub matched_pairs: usize,
    pub first_selected: Option<usize>,
    pub second_selected: Option<usize>,
    pub locked: bool,
    pub started_at: Instant,
    pub generation: u64,
    total_pairs: usize,
}

impl GameState {
    pub fn deal<R: Rng + ?Sized>(
        config: &GameConfig,
        rng: &mut R,
        started_at: Instant,
        generation: u64,
    ) -> Self {
        let mut values: Vec<&str> = config
            .symbols()
            .iter()
            .flat_map(|symbol| [symbol.as_str(), symbol.as_str()])
            .collect();
        values.shuffle(rng);

        GameState {
            cells: values.into_iter().map(Cell::face_down).collect(),
            score: 0,
            matched_pairs: 0,
            first_selected: None,
            second_selected: None,
            locked: false,
            started_at,
            generation,
            total_pairs: config.total_pairs(),
        }
    }

    pub fn total_pairs(&self) -> usize {
        self.total_pairs
    }

    pub fn is_complete(&self) -> bool {
        self.matched_pairs >= self.total_pairs
    }

    pub fn elapsed_secs(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.started_at).as_secs()
    }

    pub fn accepts_click(&self, index: usize) -> bool {
        let cell = &self.cells[index];
        !self.locked && !cell.revealed && !cell.matched
    }

    /// Turns a cell face-up and records it in the selection slots.
    pub fn reveal(&mut self, index: usize) -> Selection {
        self.cells[index].revealed = true;
        match self.first_selected {
            None => {
                self.first_selected = Some(index);
                Selection::First(index)
            }
            Some(first) => {
                self.second_selected = Some(index);
                Selection::Pair(first, index)
            }
        }
    }

    /// Compares the two selected cells. A match is settled at once; a
    /// mismatch leaves the board locked until [`GameState::hide_pair`].
    pub fn resolve_pair(&mut self, points: u32) -> PairOutcome {
        self.locked = true;
        let (Some(first), Some(second)) = (self.first_selected, self.second_selected) else {
            panic!("resolve_pair called without two selected cells");
        };

        if self.cells[first].symbol != self.cells[second].symbol {
            return PairOutcome::Mismatch { first, second };
        }

        self.cells[first].matched = true;
        self.cells[second].matched = true;
        self.score += points;
        self.clear_selection();
        self.matched_pairs += 1;
        PairOutcome::Match { first, second }
    }

    pub fn hide_pair(&mut self, first: usize, second: usize) {
        for index in [first, second] {
            self.cells[index].revealed = false;
        }
        self.clear_selection();
    }

    fn clear_selection(&mut self) {
        self.first_selected = None;
        self.second_selected = None;
        self.locked = false;
    }

    pub fn face_up_unmatched(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.revealed && !cell.matched)
            .count()
    }
}
