pub mod mapping;
pub mod extraction;
pub mod escalation;
