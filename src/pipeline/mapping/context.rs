//! Context scorers: where a block sits, and whose text it is.

use super::normalize::normalize_lower;
use super::patterns::{contains_any, APPLICANT_MARKER, COUNCIL_MARKERS, SECTION_HEADERS};
use crate::models::TextBlock;

/// True when one of the `lookback` blocks before `index` is a site-location header.
pub fn in_site_location_section(blocks: &[TextBlock], index: usize, lookback: usize) -> bool {
    let end = index.min(blocks.len());
    blocks[index.saturating_sub(lookback).min(end)..end]
        .iter()
        .any(|b| contains_any(&normalize_lower(&b.content), SECTION_HEADERS))
}

/// Council or planning-office boilerplate rather than applicant-supplied data.
pub fn is_council_contact(text: &str) -> bool {
    contains_any(&text.to_lowercase(), COUNCIL_MARKERS)
}

/// True when "applicant" appears within `radius` blocks of `index`, inclusive.
pub fn near_applicant(blocks: &[TextBlock], index: usize, radius: usize) -> bool {
    let start = index.saturating_sub(radius);
    let end = index.saturating_add(radius).saturating_add(1).min(blocks.len());
    if start >= end {
        return false;
    }
    blocks[start..end]
        .iter()
        .any(|b| normalize_lower(&b.content).contains(APPLICANT_MARKER))
}
