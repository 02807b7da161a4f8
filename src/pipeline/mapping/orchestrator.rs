//! Field mapping orchestrator.
//!
//! Classifies the document, then resolves each field through its cascade in
//! a fixed order. A field set by an earlier cascade is never revisited.

use super::address::site_address_cascade;
use super::classify::classify_document;
use super::contact::{ApplicantEmail, ApplicantPhone, ApplicationRefPattern, RankedPostcode};
use super::evidence::EvidenceIndexer;
use super::label::{LabelledField, LABELLED_FIELDS};
use super::patterns::{PatternLibrary, PATTERNS};
use super::proposal::proposed_use_cascade;
use super::strategy::{Acceptance, Cascade, MappingContext};
use super::types::{FieldMap, MappingResult};
use crate::config::MapperConfig;
use crate::models::{ExtractedLayout, FieldName, TextBlock};

/// Map a layout's text blocks to fields with the standard pattern library.
///
/// Blocks must already carry their reading-order `index`.
pub fn map_fields(layout: &ExtractedLayout, config: &MapperConfig) -> MappingResult {
    map_fields_with_patterns(&layout.text_blocks, config, &PATTERNS)
}

pub fn map_fields_with_patterns(
    blocks: &[TextBlock],
    config: &MapperConfig,
    patterns: &PatternLibrary,
) -> MappingResult {
    let unindexed = blocks.iter().filter(|b| b.index.is_none()).count();
    if unindexed > 0 {
        tracing::warn!(
            unindexed,
            total = blocks.len(),
            "Text blocks without an index; evidence block ids will be incomplete"
        );
    }

    let document_type = classify_document(blocks, config.limits.classify_blocks, patterns);
    let ctx = MappingContext::new(blocks, config, patterns);
    let mut mapper = FieldMapper {
        ctx,
        fields: FieldMap::new(document_type),
        evidence: EvidenceIndexer::new(document_type, config.limits.snippet_chars),
    };

    mapper.resolve(
        &Cascade::new(FieldName::ApplicationRef).then(&ApplicationRefPattern, Acceptance::Any),
    );
    mapper.resolve(&site_address_cascade(config));
    mapper.resolve(&proposed_use_cascade());

    for field in LABELLED_FIELDS {
        let strategy = LabelledField(field);
        mapper.resolve(&Cascade::new(field).then(&strategy, Acceptance::Any));
    }

    mapper.resolve(&Cascade::new(FieldName::Postcode).then(
        &RankedPostcode,
        Acceptance::AtLeast(config.confidence.postcode_accept),
    ));
    mapper.resolve(&Cascade::new(FieldName::ApplicantEmail).then(&ApplicantEmail, Acceptance::Any));
    mapper.resolve(&Cascade::new(FieldName::ApplicantPhone).then(&ApplicantPhone, Acceptance::Any));

    let result = MappingResult {
        fields: mapper.fields,
        evidence_index: mapper.evidence.finish(),
    };
    tracing::info!(
        document_type = %document_type,
        block_count = blocks.len(),
        field_count = result.fields.len(),
        "Field mapping complete"
    );
    result
}

struct FieldMapper<'a> {
    ctx: MappingContext<'a>,
    fields: FieldMap,
    evidence: EvidenceIndexer,
}

impl FieldMapper<'_> {
    fn resolve(&mut self, cascade: &Cascade<'_>) {
        let field = cascade.field();
        if self.fields.contains(field) {
            return;
        }
        let Some(accepted) = cascade.run(&self.ctx) else {
            return;
        };

        let candidate = accepted.candidate;
        let Some(block) = self.ctx.blocks.get(candidate.block) else {
            return;
        };
        tracing::debug!(
            field = %field,
            strategy = accepted.strategy,
            confidence = candidate.confidence,
            block_id = %block.block_id(),
            "Field resolved"
        );
        self.evidence.record(field, block, candidate.confidence);
        self.fields.insert(field, candidate.value, candidate.confidence);
    }
}
