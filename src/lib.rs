pub mod error;
pub mod game;
pub mod settings;
pub mod ui;
