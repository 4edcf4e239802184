use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("At least one symbol is required")]
    NoSymbols,
    #[error("A {rows}x{cols} grid cannot hold {pairs} pairs")]
    GridSize { rows: usize, cols: usize, pairs: usize },
    #[error("Symbols must not be blank")]
    EmptySymbol,
    #[error("Symbol {0:?} is listed more than once")]
    DuplicateSymbol(String),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not read settings from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write settings to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Config(#[from] ConfigError),
}
