use std::cell::RefCell;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};

pub type OnceTask = Box<dyn FnOnce()>;
pub type RepeatingTask = Box<dyn FnMut() -> ControlFlow<()>>;

/// Clock and timer primitives the game runs on.
///
/// Implementations dispatch every task on the same thread, one at a time.
pub trait EventLoop {
    fn now(&self) -> Instant;

    fn schedule_once(&self, delay: Duration, task: OnceTask);

    /// Runs `task` every `interval` until it returns `ControlFlow::Break`.
    fn schedule_repeating(&self, interval: Duration, task: RepeatingTask);
}

enum Task {
    Once(OnceTask),
    Repeating {
        interval: Duration,
        task: RepeatingTask,
    },
}

struct Pending {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Queue {
    pending: Vec<Pending>,
    next_seq: u64,
}

impl Queue {
    fn push(&mut self, due: Duration, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending { due, seq, task });
    }

    fn pop_due(&mut self, until: Duration) -> Option<Pending> {
        let (pos, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= until)
            .min_by_key(|(_, p)| (p.due, p.seq))?;
        Some(self.pending.swap_remove(pos))
    }
}

/// Deterministic single-threaded task queue driven by a virtual clock.
///
/// Nothing runs until [`VirtualLoop::advance`] is called.
pub struct VirtualLoop {
    origin: Instant,
    elapsed: RefCell<Duration>,
    queue: RefCell<Queue>,
}

impl Default for VirtualLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualLoop {
    pub fn new() -> Self {
        VirtualLoop {
            origin: Instant::now(),
            elapsed: RefCell::new(Duration::ZERO),
            queue: RefCell::new(Queue::default()),
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.borrow()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Moves the clock forward by `by`, running every task that falls due
    /// on the way in due order.
    pub fn advance(&self, by: Duration) {
        let target = self.elapsed() + by;
        loop {
            let next = self.queue.borrow_mut().pop_due(target);
            let Some(Pending { due, task, .. }) = next else {
                break;
            };
            *self.elapsed.borrow_mut() = due;
            match task {
                Task::Once(task) => task(),
                Task::Repeating { interval, mut task } => {
                    if task().is_continue() {
                        self.queue
                            .borrow_mut()
                            .push(due + interval, Task::Repeating { interval, task });
                    }
                }
            }
        }
        *self.elapsed.borrow_mut() = target;
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl EventLoop for VirtualLoop {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn schedule_once(&self, delay: Duration, task: OnceTask) {
        let due = self.elapsed() + delay;
        self.queue.borrow_mut().push(due, Task::Once(task));
    }

    fn schedule_repeating(&self, interval: Duration, task: RepeatingTask) {
        let due = self.elapsed() + interval;
        self.queue
            .borrow_mut()
            .push(due, Task::Repeating { interval, task });
    }
}
