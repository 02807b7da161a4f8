use std::collections::BTreeSet;

use super::gate::{gate_reason, should_trigger_llm};
use super::prompt::build_llm_request;
use super::types::{EscalationOutcome, LlmClient, ValidationReport};
use super::EscalationError;
use crate::pipeline::extraction::ExtractionOutput;

/// Ask the model to fill the missing fields. Does not consult the gate.
pub fn resolve_missing_fields(
    extraction: &ExtractionOutput,
    validation: &ValidationReport,
    client: &dyn LlmClient,
) -> Result<EscalationOutcome, EscalationError> {
    let gate_reason = gate_reason(validation);
    let request = build_llm_request(extraction, validation);

    tracing::info!(
        document_type = %extraction.fields.document_type(),
        missing = ?gate_reason.missing_fields,
        rules = ?gate_reason.affected_rule_ids,
        "Escalating missing fields to language model"
    );

    let response = client.chat_json(&request)?;
    if !response.is_object() {
        return Err(EscalationError::MalformedResponse(format!(
            "expected a JSON object, got {response}"
        )));
    }

    Ok(EscalationOutcome {
        triggered: true,
        gate_reason,
        request,
        response,
    })
}

/// Gate, then resolve. `Ok(None)` when the gate stays closed.
pub fn escalate(
    extraction: &ExtractionOutput,
    validation: &ValidationReport,
    resolved_fields: &BTreeSet<String>,
    client: &dyn LlmClient,
) -> Result<Option<EscalationOutcome>, EscalationError> {
    if !should_trigger_llm(validation, extraction, resolved_fields) {
        return Ok(None);
    }
    resolve_missing_fields(extraction, validation, client).map(Some)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::config::MapperConfig;
    use crate::models::{ExtractedLayout, TextBlock};
    use crate::pipeline::escalation::types::LlmRequest;
    use crate::pipeline::extraction::build_extraction;

    struct MockLlmClient {
        response: serde_json::Value,
        calls: Cell<usize>,
    }

    impl MockLlmClient {
        fn new(response: serde_json::Value) -> Self {
            Self {
                response,
                calls: Cell::new(0),
            }
        }
    }

    impl LlmClient for MockLlmClient {
        fn chat_json(&self, _request: &LlmRequest) -> Result<serde_json::Value, EscalationError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.response.clone())
        }
    }

    struct FailingClient;

    impl LlmClient for FailingClient {
        fn chat_json(&self, _request: &LlmRequest) -> Result<serde_json::Value, EscalationError> {
            Err(EscalationError::Client("connection refused".into()))
        }
    }

    fn extraction() -> ExtractionOutput {
        let texts = [
            "Planning Application Form",
            "Town and Country Planning Act 1990",
            "Planning Portal Reference: PP-14469287",
            "Applicant Details",
            "Name of applicant: Jane Example",
        ];
        let blocks = texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextBlock::new(1, i, *t))
            .collect();
        build_extraction(ExtractedLayout::from_blocks(blocks), &MapperConfig::default())
    }

    fn validation() -> ValidationReport {
        serde_json::from_value(serde_json::json!({
            "summary": {"needs_llm": true, "fail": 1},
            "findings": [{
                "rule_id": "R-SITE-01",
                "status": "fail",
                "severity": "error",
                "missing_fields": ["site_address"]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn outcome_carries_reason_request_and_response() {
        let client = MockLlmClient::new(serde_json::json!({
            "filled_fields": {"site_address": "12 Example Street, B12 3CD"},
            "notes": "",
            "citations": []
        }));
        let outcome = resolve_missing_fields(&extraction(), &validation(), &client).unwrap();

        assert!(outcome.triggered);
        assert_eq!(outcome.gate_reason.missing_fields, vec!["site_address"]);
        assert_eq!(outcome.gate_reason.affected_rule_ids, vec!["R-SITE-01"]);
        assert_eq!(outcome.request.missing_fields, vec!["site_address"]);
        let parsed = outcome.parsed_response().unwrap();
        assert_eq!(parsed.filled_fields["site_address"], "12 Example Street, B12 3CD");

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["triggered"], true);
        assert_eq!(json["gate_reason"]["validation_summary"]["fail"], 1);
    }

    #[test]
    fn client_errors_propagate() {
        let err = resolve_missing_fields(&extraction(), &validation(), &FailingClient).unwrap_err();
        assert!(matches!(err, EscalationError::Client(_)));
    }

    #[test]
    fn non_object_response_rejected() {
        let client = MockLlmClient::new(serde_json::json!(["not", "an", "object"]));
        let err = resolve_missing_fields(&extraction(), &validation(), &client).unwrap_err();
        assert!(matches!(err, EscalationError::MalformedResponse(_)));
    }

    #[test]
    fn closed_gate_skips_client() {
        let client = MockLlmClient::new(serde_json::json!({}));
        let resolved = BTreeSet::from(["site_address".to_string()]);
        let outcome = escalate(&extraction(), &validation(), &resolved, &client).unwrap();
        assert!(outcome.is_none());
        assert_eq!(client.calls.get(), 0);
    }

    #[test]
    fn open_gate_calls_client_once() {
        let client = MockLlmClient::new(serde_json::json!({"filled_fields": {}}));
        let outcome = escalate(&extraction(), &validation(), &BTreeSet::new(), &client).unwrap();
        assert!(outcome.is_some());
        assert_eq!(client.calls.get(), 1);
    }
}
