use std::collections::BTreeSet;

use super::types::{GateReason, Severity, ValidationReport};
use crate::models::{DocumentType, FieldName};
use crate::pipeline::extraction::ExtractionOutput;

/// Documents with fewer text blocks are never escalated.
pub const MIN_TEXT_BLOCKS: usize = 5;

/// Fields each document type may legitimately supply.
pub fn owned_fields(doc_type: DocumentType) -> &'static [FieldName] {
    match doc_type {
        DocumentType::ApplicationForm => &[
            FieldName::ApplicationRef,
            FieldName::SiteAddress,
            FieldName::ProposedUse,
            FieldName::ApplicantName,
            FieldName::AgentName,
        ],
        DocumentType::SitePlan => &[FieldName::SiteAddress, FieldName::ProposedUse],
        DocumentType::Drawing => &[FieldName::ProposedUse],
        DocumentType::DesignStatement => &[FieldName::ProposedUse, FieldName::SiteAddress],
        DocumentType::Unknown => &[FieldName::SiteAddress, FieldName::ProposedUse],
        DocumentType::SiteNotice | DocumentType::Heritage => &[],
    }
}

pub fn owns(doc_type: DocumentType, field: &str) -> bool {
    owned_fields(doc_type).iter().any(|f| f.as_str() == field)
}

/// Fields named by blocking (error-severity, unresolved) findings that no
/// earlier document has already resolved. Duplicates are kept.
pub fn blocking_missing_fields<'v>(
    validation: &'v ValidationReport,
    resolved_fields: &BTreeSet<String>,
) -> Vec<&'v str> {
    validation
        .findings
        .iter()
        .filter(|f| f.severity == Severity::Error && f.status.is_unresolved())
        .flat_map(|f| f.missing_fields.iter())
        .filter(|field| !resolved_fields.contains(*field))
        .map(String::as_str)
        .collect()
}

/// Whether this document should be sent to the language model.
pub fn should_trigger_llm(
    validation: &ValidationReport,
    extraction: &ExtractionOutput,
    resolved_fields: &BTreeSet<String>,
) -> bool {
    if !validation.summary.needs_llm {
        return false;
    }

    let missing = blocking_missing_fields(validation, resolved_fields);
    if missing.is_empty() {
        tracing::debug!("No blocking missing fields; escalation skipped");
        return false;
    }

    let doc_type = extraction.fields.document_type();
    if !missing.iter().any(|field| owns(doc_type, field)) {
        tracing::debug!(
            document_type = %doc_type,
            ?missing,
            "Missing fields not owned by document type; escalation skipped"
        );
        return false;
    }

    if extraction.text_blocks.len() < MIN_TEXT_BLOCKS {
        tracing::debug!(
            text_blocks = extraction.text_blocks.len(),
            "Too little text to escalate"
        );
        return false;
    }

    true
}

/// Missing fields and rule ids of every unresolved finding, sorted and unique.
pub fn gate_reason(validation: &ValidationReport) -> GateReason {
    let mut missing_fields = BTreeSet::new();
    let mut affected_rule_ids = BTreeSet::new();
    for finding in validation.findings.iter().filter(|f| f.status.is_unresolved()) {
        missing_fields.extend(finding.missing_fields.iter().cloned());
        if let Some(rule_id) = finding.rule_id.as_ref().filter(|id| !id.is_empty()) {
            affected_rule_ids.insert(rule_id.clone());
        }
    }
    GateReason {
        missing_fields: missing_fields.into_iter().collect(),
        affected_rule_ids: affected_rule_ids.into_iter().collect(),
        validation_summary: validation.summary.clone(),
    }
}
