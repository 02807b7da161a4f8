//! Proposed-use extraction.

use super::normalize::{char_len, is_noise, looks_allcaps, normalize};
use super::patterns::{contains_any, PRIOR_APPROVAL_PHRASES};
use super::strategy::{Acceptance, Cascade, FieldStrategy, MappingContext};
use super::types::Candidate;
use crate::models::FieldName;

/// Declared proposals must be longer than this to be taken.
const MIN_DECLARED_USE_CHARS: usize = 10;

/// Statements shorter than this are never proposals.
const MIN_STATEMENT_CHARS: usize = 20;

/// Statements at least this long earn the higher confidence.
const LONG_STATEMENT_CHARS: usize = 30;

pub fn proposed_use_cascade() -> Cascade<'static> {
    Cascade::new(FieldName::ProposedUse)
        .then(&PriorApprovalUse, Acceptance::Any)
        .then(&ProposalStatementUse, Acceptance::Any)
}

/// The proposal named in a prior-approval declaration.
///
/// The tail after the first `:` wins; otherwise the text after
/// "prior approval for", then after the first standalone "for".
pub struct PriorApprovalUse;

impl PriorApprovalUse {
    fn declared_tail<'t>(ctx: &MappingContext<'_>, text: &'t str) -> Option<&'t str> {
        if let Some((_, tail)) = text.split_once(':') {
            return Some(tail);
        }
        ctx.patterns
            .prior_approval_for
            .find(text)
            .or_else(|| ctx.patterns.standalone_for.find(text))
            .map(|m| &text[m.end()..])
    }
}

impl FieldStrategy for PriorApprovalUse {
    fn name(&self) -> &'static str {
        "prior_approval_declaration"
    }

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate> {
        let limit = ctx.config.limits.prior_approval_blocks;
        ctx.blocks.iter().take(limit).enumerate().find_map(|(i, block)| {
            let text = normalize(&block.content);
            if !contains_any(&text.to_lowercase(), PRIOR_APPROVAL_PHRASES) {
                return None;
            }
            let declared = normalize(Self::declared_tail(ctx, &text)?);
            (char_len(&declared) > MIN_DECLARED_USE_CHARS).then(|| {
                Candidate::new(declared, i, ctx.config.confidence.prior_approval)
            })
        })
    }
}

/// A shouted or sentence-terminated proposal statement on a drawing sheet.
pub struct ProposalStatementUse;

impl FieldStrategy for ProposalStatementUse {
    fn name(&self) -> &'static str {
        "proposal_statement"
    }

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate> {
        let limit = ctx.config.limits.proposal_statement_blocks;
        let c = &ctx.config.confidence;
        ctx.blocks.iter().take(limit).enumerate().find_map(|(i, block)| {
            let text = normalize(&block.content);
            if text.is_empty() || is_noise(&text) {
                return None;
            }
            let len = char_len(&text);
            let qualifies = ctx.patterns.proposal_hint.is_match(&text)
                && len >= MIN_STATEMENT_CHARS
                && (looks_allcaps(&text) || text.ends_with('.'));
            if !qualifies {
                return None;
            }
            let confidence = if len >= LONG_STATEMENT_CHARS {
                c.proposal_long
            } else {
                c.proposal_short
            };
            Some(Candidate::new(text, i, confidence))
        })
    }
}
