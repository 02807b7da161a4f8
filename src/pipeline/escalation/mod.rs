//! Escalation of unresolved fields to an external language model.
//!
//! Deterministic mapping always runs first. A document is escalated only
//! when validation asks for it, a blocking finding names a field this
//! document type can supply, and there is enough text to work from.

pub mod gate;
pub mod prompt;
pub mod resolve;
pub mod types;

pub use gate::*;
pub use prompt::*;
pub use resolve::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EscalationError {
    #[error("Language model client error: {0}")]
    Client(String),

    #[error("Malformed language model response: {0}")]
    MalformedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
