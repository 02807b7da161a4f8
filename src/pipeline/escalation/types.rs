use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::EscalationError;
use crate::pipeline::extraction::GeneralEvidenceIndex;
use crate::pipeline::mapping::FieldMap;

// ═══════════════════════════════════════════
// Validation input
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Pass,
    NeedsReview,
    Fail,
    Pending,
    #[default]
    #[serde(other)]
    Unknown,
}

impl FindingStatus {
    /// Statuses that mark a rule as unresolved.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::NeedsReview | Self::Fail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
    #[default]
    #[serde(other)]
    Other,
}

/// One rule outcome from the validation stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationFinding {
    #[serde(default)]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub status: FindingStatus,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub missing_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    #[serde(default)]
    pub needs_llm: bool,
    /// Counts and other summary keys, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(default)]
    pub summary: ValidationSummary,
    #[serde(default)]
    pub findings: Vec<ValidationFinding>,
}

// ═══════════════════════════════════════════
// Model request / response
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationSchema {
    pub field: &'static str,
    pub evidence_key: &'static str,
    pub page: &'static str,
    pub quote: &'static str,
}

/// Shape the model is asked to answer in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSchema {
    pub filled_fields: BTreeMap<String, &'static str>,
    pub notes: &'static str,
    pub citations: Vec<CitationSchema>,
}

/// What the model is told about one missing field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldGuidance {
    /// Search hint (when the field has one) followed by the document text.
    pub context: String,
    pub validation_rule: String,
}

/// Schema-bound request: fill only the missing fields, from evidence only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmRequest {
    pub task: String,
    pub missing_fields: Vec<String>,
    pub field_guidance: BTreeMap<String, FieldGuidance>,
    pub extraction_fields: FieldMap,
    pub evidence_index: GeneralEvidenceIndex,
    pub return_schema: ReturnSchema,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub evidence_key: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub quote: String,
}

/// Parsed model answer. Unfound fields come back as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub filled_fields: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl LlmResponse {
    pub fn from_value(value: &serde_json::Value) -> Result<Self, EscalationError> {
        Self::deserialize(value).map_err(|e| EscalationError::MalformedResponse(e.to_string()))
    }

    /// Filled fields with a non-null value.
    pub fn resolved(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.filled_fields
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// External language-model client (allows mocking for tests).
pub trait LlmClient {
    /// Send `request` and return the model's JSON answer.
    fn chat_json(&self, request: &LlmRequest) -> Result<serde_json::Value, EscalationError>;
}

// ═══════════════════════════════════════════
// Outcome
// ═══════════════════════════════════════════

/// Why the gate opened, for audit logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateReason {
    pub missing_fields: Vec<String>,
    pub affected_rule_ids: Vec<String>,
    pub validation_summary: ValidationSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscalationOutcome {
    pub triggered: bool,
    pub gate_reason: GateReason,
    pub request: LlmRequest,
    pub response: serde_json::Value,
}

impl EscalationOutcome {
    pub fn parsed_response(&self) -> Result<LlmResponse, EscalationError> {
        LlmResponse::from_value(&self.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tolerates_missing_keys() {
        let report: ValidationReport = serde_json::from_str("{}").unwrap();
        assert!(!report.summary.needs_llm);
        assert!(report.findings.is_empty());

        let report: ValidationReport =
            serde_json::from_str(r#"{"findings": [{"rule_id": "R1"}]}"#).unwrap();
        assert_eq!(report.findings[0].status, FindingStatus::Unknown);
        assert_eq!(report.findings[0].severity, Severity::Other);
    }

    #[test]
    fn unknown_enum_values_fold_to_catch_all() {
        let finding: ValidationFinding = serde_json::from_str(
            r#"{"status": "skipped", "severity": "critical", "missing_fields": ["postcode"]}"#,
        )
        .unwrap();
        assert_eq!(finding.status, FindingStatus::Unknown);
        assert_eq!(finding.severity, Severity::Other);
        assert_eq!(finding.missing_fields, vec!["postcode"]);
    }

    #[test]
    fn summary_keeps_extra_keys() {
        let summary: ValidationSummary =
            serde_json::from_str(r#"{"needs_llm": true, "fail": 2, "pass": 7}"#).unwrap();
        assert!(summary.needs_llm);
        assert_eq!(summary.extra["fail"], 2);
        let back = serde_json::to_value(&summary).unwrap();
        assert_eq!(back["pass"], 7);
        assert_eq!(back["needs_llm"], true);
    }

    #[test]
    fn unresolved_statuses() {
        assert!(FindingStatus::NeedsReview.is_unresolved());
        assert!(FindingStatus::Fail.is_unresolved());
        assert!(!FindingStatus::Pending.is_unresolved());
        assert!(!FindingStatus::Pass.is_unresolved());
    }

    #[test]
    fn response_parsing() {
        let value = serde_json::json!({
            "filled_fields": {"site_address": "12 Example Street", "application_ref": null},
            "notes": "found on page 1",
            "citations": [{"field": "site_address", "evidence_key": "text_block_3", "page": 1, "quote": "12 Example Street"}]
        });
        let response = LlmResponse::from_value(&value).unwrap();
        let resolved: Vec<&str> = response.resolved().map(|(k, _)| k).collect();
        assert_eq!(resolved, vec!["site_address"]);
        assert_eq!(response.citations[0].page, Some(1));
    }

    #[test]
    fn non_object_response_is_malformed() {
        let err = LlmResponse::from_value(&serde_json::json!("sorry")).unwrap_err();
        assert!(matches!(err, EscalationError::MalformedResponse(_)));
    }
}
