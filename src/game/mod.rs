pub mod controller;
pub mod scheduler;
pub mod state;

pub use controller::{GameController, Surface};
pub use scheduler::{EventLoop, VirtualLoop};
pub use state::{CardFace, Cell, GameConfig, GameState};
