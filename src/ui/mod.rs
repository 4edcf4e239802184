pub mod app;
pub mod board;
pub mod dialogs;
pub mod style;
pub mod surface;
