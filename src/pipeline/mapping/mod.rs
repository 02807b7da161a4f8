//! Deterministic field mapping: layout text blocks in, fields with
//! confidences and evidence out.

pub mod address;
pub mod classify;
pub mod contact;
pub mod context;
pub mod evidence;
pub mod label;
pub mod normalize;
pub mod orchestrator;
pub mod patterns;
pub mod proposal;
pub mod strategy;
pub mod types;

pub use classify::classify_document;
pub use evidence::{EvidenceEntry, EvidenceIndex};
pub use label::extract_by_label;
pub use orchestrator::{map_fields, map_fields_with_patterns};
pub use patterns::{PatternLibrary, PATTERNS};
pub use strategy::{Acceptance, Cascade, FieldStrategy, MappingContext};
pub use types::{Candidate, FieldMap, FieldValue, MappingResult};
