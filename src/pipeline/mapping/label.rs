//! Generic label-phrase fallback for fields no dedicated strategy filled.

use regex::Regex;

use super::normalize::{char_len, colon_value, normalize, normalize_lower};
use super::strategy::{FieldStrategy, MappingContext};
use super::types::Candidate;
use crate::config::ScanLimits;
use crate::models::{FieldName, TextBlock};

/// Fields tried by the label fallback, in assignment order.
pub const LABELLED_FIELDS: [FieldName; 5] = [
    FieldName::SiteAddress,
    FieldName::ProposalDescription,
    FieldName::ApplicantName,
    FieldName::AgentName,
    FieldName::ProposedUse,
];

/// First block matching any of `labels`, with the value it introduces.
///
/// Takes the text after the colon in the same block; with no inline value,
/// joins the next `label_lookahead` non-empty blocks, stopping once the
/// joined text is longer than `label_min_joined_chars`. Returns the value and
/// the position of the label block.
pub fn extract_by_label(
    blocks: &[TextBlock],
    labels: &[Regex],
    limits: &ScanLimits,
) -> Option<(String, usize)> {
    blocks.iter().enumerate().find_map(|(i, block)| {
        let lower = normalize_lower(&block.content);
        if !labels.iter().any(|re| re.is_match(&lower)) {
            return None;
        }

        if let Some(value) = colon_value(&block.content).filter(|v| !v.is_empty()) {
            return Some((value, i));
        }

        let mut following: Vec<String> = Vec::new();
        for next in blocks.iter().skip(i + 1).take(limits.label_lookahead) {
            let text = normalize(&next.content);
            if !text.is_empty() {
                following.push(text);
            }
            if char_len(&following.join(" ")) > limits.label_min_joined_chars {
                break;
            }
        }

        if following.is_empty() {
            None
        } else {
            Some((following.join(" "), i))
        }
    })
}

/// Label-phrase lookup for one field, at the fixed fallback confidence.
pub struct LabelledField(pub FieldName);

impl FieldStrategy for LabelledField {
    fn name(&self) -> &'static str {
        "label_fallback"
    }

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate> {
        let labels = ctx.patterns.labels_for(self.0)?;
        let (value, block) = extract_by_label(ctx.blocks, labels, &ctx.config.limits)?;
        Some(Candidate::new(value, block, ctx.config.confidence.label_fallback))
    }
}
