//! Site-address extraction: three strategies, most precise first.
//!
//! 1. Structured "Site location" section on application forms.
//! 2. "demolition of <address> <postcode>" sentences on site notices.
//! 3. Heuristic scan of plan-sheet text for address-shaped lines.

use super::context::in_site_location_section;
use super::normalize::{char_len, colon_value, is_noise, normalize, normalize_lower};
use super::patterns::{contains_any, ADDRESS_SECTION_HEADERS, PLAN_ADDRESS_LABELS};
use super::strategy::{Acceptance, Cascade, FieldStrategy, MappingContext};
use super::types::Candidate;
use crate::config::MapperConfig;
use crate::models::FieldName;

/// Minimum captured address length for the demolition pattern.
const MIN_DEMOLITION_ADDRESS_CHARS: usize = 10;

/// Minimum labelled value length for the plan-sheet scan.
const MIN_PLAN_LABEL_VALUE_CHARS: usize = 5;

/// Site-address cascade with bars taken from `config`.
pub fn site_address_cascade(config: &MapperConfig) -> Cascade<'static> {
    let c = &config.confidence;
    Cascade::new(FieldName::SiteAddress)
        .then(
            &StructuredSectionAddress,
            Acceptance::AtLeast(c.structured_section_bar),
        )
        .then(&DemolitionAddress, Acceptance::AtLeast(c.demolition_bar))
        .then(&PlanSheetAddress, Acceptance::Above(c.plan_floor))
}

// ═══════════════════════════════════════════
// Strategy 1: structured section
// ═══════════════════════════════════════════

#[derive(Debug, Default)]
struct AddressParts {
    property_name: Option<String>,
    line1: Option<String>,
    line2: Option<String>,
    town: Option<String>,
    postcode: Option<String>,
}

impl AddressParts {
    fn join(self) -> Option<String> {
        let parts: Vec<String> = [
            self.property_name,
            self.line1,
            self.line2,
            self.town,
            self.postcode,
        ]
        .into_iter()
        .flatten()
        .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Later labelled values replace earlier ones; absent values never do.
fn overwrite(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

fn mentions_line(lower: &str, digit: char) -> bool {
    lower.contains(&format!("address line {digit}"))
        || (lower.contains("address") && lower.contains("line") && lower.contains(digit))
}

fn mentions_town(lower: &str) -> bool {
    lower.contains("town") || lower.contains("city")
}

/// Labelled address parts under a site-location header.
///
/// Values are read from "Label: value" in the same block, or from the block
/// following a bare label. Inline labels are matched on the text before the
/// colon only. The header block is the evidence source.
pub struct StructuredSectionAddress;

impl FieldStrategy for StructuredSectionAddress {
    fn name(&self) -> &'static str {
        "structured_section"
    }

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate> {
        let blocks = ctx.blocks;
        let limits = &ctx.config.limits;
        let postcode_re = &ctx.patterns.postcode;

        let start = blocks
            .iter()
            .take(limits.section_header_blocks)
            .position(|b| contains_any(&normalize_lower(&b.content), ADDRESS_SECTION_HEADERS))?;

        let end = start
            .saturating_add(1)
            .saturating_add(limits.section_body_blocks)
            .min(blocks.len());
        let find_postcode = |text: &str| {
            postcode_re
                .captures(text)
                .map(|caps| normalize(&caps[1]).to_uppercase())
        };

        let mut parts = AddressParts::default();
        for i in start + 1..end {
            let text = normalize(&blocks[i].content);
            if char_len(&text) < 2 || is_noise(&text) {
                continue;
            }

            if let Some((label, value)) = text.split_once(':') {
                let label = label.to_lowercase();
                let value = normalize(value);
                if label.contains("property name") && parts.property_name.is_none() {
                    parts.property_name = non_empty(value.clone());
                }
                if mentions_line(&label, '1') {
                    overwrite(&mut parts.line1, non_empty(value.clone()));
                }
                if mentions_line(&label, '2') {
                    overwrite(&mut parts.line2, non_empty(value.clone()));
                }
                if mentions_town(&label) {
                    overwrite(&mut parts.town, non_empty(value.clone()));
                }
                if label.contains("postcode") {
                    overwrite(&mut parts.postcode, find_postcode(&value));
                }
            }

            // Value-follows-label: the previous block was a bare label.
            if i > start + 1 {
                let prev = normalize_lower(&blocks[i - 1].content);
                if prev.contains("property name") && parts.property_name.is_none() {
                    parts.property_name = Some(text);
                } else if (prev.contains("address line 1") || prev.contains("address"))
                    && parts.line1.is_none()
                {
                    parts.line1 = Some(text);
                } else if prev.contains("address line 2") && parts.line2.is_none() {
                    parts.line2 = Some(text);
                } else if mentions_town(&prev) && parts.town.is_none() {
                    parts.town = Some(text);
                } else if prev.contains("postcode") && parts.postcode.is_none() {
                    parts.postcode = find_postcode(&text);
                }
            }
        }

        let value = parts.join()?;
        Some(Candidate::new(
            value,
            start,
            ctx.config.confidence.structured_section,
        ))
    }
}

// ═══════════════════════════════════════════
// Strategy 2: demolition sentence
// ═══════════════════════════════════════════

/// "demolition of <address> <postcode>" as printed on site notices.
pub struct DemolitionAddress;

impl FieldStrategy for DemolitionAddress {
    fn name(&self) -> &'static str {
        "demolition_pattern"
    }

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate> {
        let limit = ctx.config.limits.demolition_blocks;
        for (i, block) in ctx.blocks.iter().take(limit).enumerate() {
            let text = normalize(&block.content);
            if !text.to_lowercase().contains("demolition") {
                continue;
            }
            let Some(caps) = ctx.patterns.demolition.captures(&text) else {
                continue;
            };
            let (Some(address), Some(postcode)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let address = address
                .as_str()
                .trim()
                .trim_end_matches(|c: char| c == ',' || c.is_whitespace());
            if char_len(address) <= MIN_DEMOLITION_ADDRESS_CHARS {
                continue;
            }
            let postcode = normalize(postcode.as_str()).to_uppercase();
            return Some(Candidate::new(
                format!("{address}, {postcode}"),
                i,
                ctx.config.confidence.demolition,
            ));
        }
        None
    }
}

// ═══════════════════════════════════════════
// Strategy 3: plan-sheet heuristics
// ═══════════════════════════════════════════

/// Best address-shaped or address-labelled line on a drawing sheet.
///
/// Lines inside a detected site-location section score higher. Ties keep
/// the earliest line.
pub struct PlanSheetAddress;

impl PlanSheetAddress {
    fn is_skippable(ctx: &MappingContext<'_>, text: &str, lower: &str) -> bool {
        text.is_empty()
            || is_noise(text)
            || char_len(text) < 5
            || lower.contains("disclaimer")
            || lower.contains("for information")
            || ctx.patterns.grid_reference.is_match(text)
            || ctx.patterns.bare_number.is_match(text)
    }
}

impl FieldStrategy for PlanSheetAddress {
    fn name(&self) -> &'static str {
        "plan_sheet_heuristic"
    }

    fn extract(&self, ctx: &MappingContext<'_>) -> Option<Candidate> {
        let limits = &ctx.config.limits;
        let c = &ctx.config.confidence;
        let mut best: Option<Candidate> = None;

        for (i, block) in ctx.blocks.iter().take(limits.heuristic_blocks).enumerate() {
            let text = normalize(&block.content);
            let lower = text.to_lowercase();
            if Self::is_skippable(ctx, &text, &lower) {
                continue;
            }

            let in_section = in_site_location_section(ctx.blocks, i, limits.section_lookback);
            let scored = if ctx.patterns.address_like.is_match(&text) {
                let confidence = if in_section {
                    c.plan_address_in_section
                } else {
                    c.plan_address
                };
                Some((text, confidence))
            } else if contains_any(&lower, PLAN_ADDRESS_LABELS) {
                colon_value(&text)
                    .filter(|value| char_len(value) > MIN_PLAN_LABEL_VALUE_CHARS)
                    .map(|value| {
                        let confidence = if in_section {
                            c.plan_label_in_section
                        } else {
                            c.plan_label
                        };
                        (value, confidence)
                    })
            } else {
                None
            };

            if let Some((value, confidence)) = scored {
                let best_confidence = best.as_ref().map_or(0.0, |b| b.confidence);
                if confidence > best_confidence {
                    best = Some(Candidate::new(value, i, confidence));
                }
            }
        }

        best
    }
}
