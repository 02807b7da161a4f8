//! Strategy cascades.
//!
//! Each field is resolved by an ordered list of strategies. The first
//! strategy whose candidate clears its stage's acceptance bar wins and the
//! rest are never consulted.

use super::patterns::PatternLibrary;
use super::types::Candidate;
use crate::config::MapperConfig;
use crate::models::{FieldName, TextBlock};

/// Everything a strategy may read. Strategies are pure over this.
#[derive(Clone, Copy)]
pub struct MappingContext<'a> {
    pub blocks: &'a [TextBlock],
    pub config: &'a MapperConfig,
    pub patterns: &'a PatternLibrary,
}

impl<'a> MappingContext<'a> {
    pub fn new(
        blocks: &'a [TextBlock],
        config: &'a MapperConfig,
        patterns: &'a PatternLibrary,
    ) -> Self {
        Self {
            blocks,
            config,
            patterns,
        }
    }
}

/// One way of finding a field value.
pub trait FieldStrategy {
    fn name(&self) -> &'static str;

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate>;
}

/// Bar a stage's candidate must clear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acceptance {
    Any,
    AtLeast(f32),
    Above(f32),
}

impl Acceptance {
    pub fn accepts(&self, confidence: f32) -> bool {
        match *self {
            Acceptance::Any => true,
            Acceptance::AtLeast(bar) => confidence >= bar,
            Acceptance::Above(bar) => confidence > bar,
        }
    }
}

pub struct Stage<'s> {
    pub strategy: &'s dyn FieldStrategy,
    pub acceptance: Acceptance,
}

/// Coarse-to-fine strategy chain for one field.
pub struct Cascade<'s> {
    field: FieldName,
    stages: Vec<Stage<'s>>,
}

/// A candidate accepted by a cascade, tagged with the strategy that found it.
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    pub candidate: Candidate,
    pub strategy: &'static str,
}

impl<'s> Cascade<'s> {
    pub fn new(field: FieldName) -> Self {
        Self {
            field,
            stages: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: &'s dyn FieldStrategy, acceptance: Acceptance) -> Self {
        self.stages.push(Stage {
            strategy,
            acceptance,
        });
        self
    }

    pub fn field(&self) -> FieldName {
        self.field
    }

    pub fn run(&self, ctx: &MappingContext<'_>) -> Option<Accepted> {
        for stage in &self.stages {
            let Some(candidate) = stage.strategy.extract(ctx) else {
                continue;
            };
            if stage.acceptance.accepts(candidate.confidence) {
                return Some(Accepted {
                    candidate,
                    strategy: stage.strategy.name(),
                });
            }
            tracing::debug!(
                field = %self.field,
                strategy = stage.strategy.name(),
                confidence = candidate.confidence,
                "Candidate below stage bar, falling through"
            );
        }
        None
    }
}
