//! Layout intake: turn a layout backend's output into mapped fields plus a
//! general evidence index over every block and table.

pub mod assemble;
pub mod types;

pub use assemble::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed layout JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layout analysis failed: {0}")]
    Analyzer(String),
}
