//! Regex-driven fields: application reference, postcode, applicant email and phone.
//!
//! All four scan the first `regex_field_blocks` blocks. Only the first
//! pattern hit in each block is considered.

use super::context::{in_site_location_section, is_council_contact, near_applicant};
use super::normalize::{char_len, normalize};
use super::patterns::PO_BOX_MARKER;
use super::strategy::{FieldStrategy, MappingContext};
use super::types::Candidate;
use crate::config::CouncilPostcodePolicy;

/// Phone hits shorter than this after normalization are discarded.
const MIN_PHONE_CHARS: usize = 9;

const PORTAL_REF_PREFIX: &str = "PP-";

/// First `PP-` portal reference or year-prefixed code, upper-cased.
pub struct ApplicationRefPattern;

impl FieldStrategy for ApplicationRefPattern {
    fn name(&self) -> &'static str {
        "application_ref_pattern"
    }

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate> {
        let c = &ctx.config.confidence;
        ctx.blocks
            .iter()
            .take(ctx.config.limits.regex_field_blocks)
            .enumerate()
            .find_map(|(i, block)| {
                let caps = ctx.patterns.application_ref.captures(&block.content)?;
                let reference = caps[1].to_uppercase();
                let confidence = if reference.contains(PORTAL_REF_PREFIX) {
                    c.portal_ref
                } else {
                    c.year_ref
                };
                Some(Candidate::new(reference, i, confidence))
            })
    }
}

/// Every postcode-shaped hit ranked by context; the best one wins.
///
/// Hits in council contact text are pushed down to the penalty confidence
/// according to the configured [`CouncilPostcodePolicy`]. Equal scores keep
/// reading order.
pub struct RankedPostcode;

impl RankedPostcode {
    /// All candidates in reading order, before ranking.
    pub fn candidates(ctx: &MappingContext<'_>) -> Vec<Candidate> {
        let limits = &ctx.config.limits;
        let c = &ctx.config.confidence;
        let council = &ctx.config.council;

        ctx.blocks
            .iter()
            .take(limits.regex_field_blocks)
            .enumerate()
            .filter_map(|(i, block)| {
                let caps = ctx.patterns.postcode.captures(&block.content)?;
                let postcode = normalize(&caps[1]).to_uppercase();
                let lower = block.content.to_lowercase();

                let in_section = in_site_location_section(ctx.blocks, i, limits.section_lookback);
                let mut confidence = if in_section || lower.contains("postcode") {
                    c.postcode_labelled
                } else if lower.contains("site") || lower.contains("address") {
                    c.postcode_site_context
                } else {
                    c.postcode_base
                };

                if is_council_contact(&block.content) {
                    let penalised = match council.policy {
                        CouncilPostcodePolicy::Listed => {
                            lower.contains(PO_BOX_MARKER)
                                || council.postcodes.iter().any(|p| postcode.starts_with(p.as_str()))
                        }
                        CouncilPostcodePolicy::AnyCouncilBlock => true,
                    };
                    if penalised {
                        confidence = c.postcode_council_penalty;
                    }
                }

                Some(Candidate::new(postcode, i, confidence))
            })
            .collect()
    }
}

impl FieldStrategy for RankedPostcode {
    fn name(&self) -> &'static str {
        "ranked_postcode"
    }

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate> {
        let mut candidates = Self::candidates(ctx);
        // Stable: ties keep the earliest block.
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        candidates.into_iter().next()
    }
}

fn contact_confidence(ctx: &MappingContext<'_>, index: usize) -> f32 {
    let c = &ctx.config.confidence;
    if near_applicant(ctx.blocks, index, ctx.config.limits.applicant_context_radius) {
        c.contact_applicant
    } else {
        c.contact_base
    }
}

/// First email outside council contact text.
pub struct ApplicantEmail;

impl FieldStrategy for ApplicantEmail {
    fn name(&self) -> &'static str {
        "applicant_email"
    }

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate> {
        ctx.blocks
            .iter()
            .take(ctx.config.limits.regex_field_blocks)
            .enumerate()
            .filter(|(_, block)| !is_council_contact(&block.content))
            .find_map(|(i, block)| {
                let hit = ctx.patterns.email.find(&block.content)?;
                Some(Candidate::new(hit.as_str(), i, contact_confidence(ctx, i)))
            })
    }
}

/// First phone number outside council contact text that is not a date.
pub struct ApplicantPhone;

impl FieldStrategy for ApplicantPhone {
    fn name(&self) -> &'static str {
        "applicant_phone"
    }

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate> {
        ctx.blocks
            .iter()
            .take(ctx.config.limits.regex_field_blocks)
            .enumerate()
            .filter(|(_, block)| !is_council_contact(&block.content))
            .find_map(|(i, block)| {
                let caps = ctx.patterns.phone.captures(&block.content)?;
                let raw = &caps[1];
                if ctx.patterns.date_like.is_match(raw) {
                    return None;
                }
                let number = normalize(raw);
                if char_len(&number) < MIN_PHONE_CHARS {
                    return None;
                }
                Some(Candidate::new(number, i, contact_confidence(ctx, i)))
            })
    }
}
