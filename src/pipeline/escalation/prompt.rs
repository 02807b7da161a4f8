use std::collections::{BTreeMap, BTreeSet};

use super::types::{CitationSchema, FieldGuidance, LlmRequest, ReturnSchema, ValidationReport};
use crate::models::{Table, TextBlock};
use crate::pipeline::extraction::ExtractionOutput;

pub const ESCALATION_TASK: &str =
    "Fill missing structured fields from extracted evidence only. If not found, return null.";

const FILLED_FIELD_TYPE: &str = "string|number|object|null";

/// Build the schema-bound request for every field any finding reports missing.
pub fn build_llm_request(extraction: &ExtractionOutput, validation: &ValidationReport) -> LlmRequest {
    let missing_fields: Vec<String> = validation
        .findings
        .iter()
        .flat_map(|f| f.missing_fields.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let document_context = build_document_context(&extraction.text_blocks, &extraction.tables);
    let field_guidance = missing_fields
        .iter()
        .map(|field| {
            let guidance = FieldGuidance {
                context: field_context(field, &document_context),
                validation_rule: validation_rule_for(field),
            };
            (field.clone(), guidance)
        })
        .collect();

    let filled_fields: BTreeMap<String, &'static str> = missing_fields
        .iter()
        .map(|field| (field.clone(), FILLED_FIELD_TYPE))
        .collect();

    LlmRequest {
        task: ESCALATION_TASK.to_string(),
        missing_fields,
        field_guidance,
        extraction_fields: extraction.fields.clone(),
        evidence_index: extraction.evidence_index.clone(),
        return_schema: ReturnSchema {
            filled_fields,
            notes: "string",
            citations: vec![CitationSchema {
                field: "string",
                evidence_key: "string",
                page: "number",
                quote: "string",
            }],
        },
    }
}

/// Plain-text rendering of a document for model context.
///
/// Headings get a `## ` prefix; each table becomes one `|`-joined line of
/// its non-empty cells. Parts are separated by blank lines.
pub fn build_document_context(text_blocks: &[TextBlock], tables: &[Table]) -> String {
    let blocks = text_blocks
        .iter()
        .filter(|b| !b.content.is_empty())
        .map(|b| {
            if b.is_heading() {
                format!("## {}", b.content)
            } else {
                b.content.clone()
            }
        });

    let tables = tables.iter().filter_map(|t| {
        let cells: Vec<&str> = t
            .cells
            .iter()
            .map(|c| c.content.as_str())
            .filter(|c| !c.is_empty())
            .collect();
        (!cells.is_empty()).then(|| cells.join(" | "))
    });

    blocks.chain(tables).collect::<Vec<_>>().join("\n\n")
}

fn field_hint(field: &str) -> Option<&'static str> {
    match field {
        "site_address" => Some("Look for address information, postcodes, street names"),
        "proposed_use" => Some("Look for descriptions of proposed development, use classes"),
        "application_ref" => Some("Look for application reference numbers, planning references"),
        _ => None,
    }
}

/// Document context prefixed with a search hint for `field`, if it has one.
pub fn field_context(field: &str, context: &str) -> String {
    match field_hint(field) {
        Some(hint) => format!("{hint}\n\n{context}"),
        None => context.to_string(),
    }
}

/// Human-readable validation rule for `field`.
pub fn validation_rule_for(field: &str) -> String {
    match field {
        "site_address" => "Site address must be a valid UK address with postcode".to_string(),
        "proposed_use" => {
            "Proposed use must be clearly stated and match planning use classes".to_string()
        }
        "application_ref" => {
            "Application reference must follow format APP/YYYY/NNNN".to_string()
        }
        other => format!("Field {other} must be valid and complete"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapperConfig;
    use crate::models::{Cell, ExtractedLayout};
    use crate::pipeline::extraction::build_extraction;

    fn cell(content: &str) -> Cell {
        Cell {
            content: content.to_string(),
            ..Cell::default()
        }
    }

    #[test]
    fn request_lists_sorted_unique_missing_fields() {
        let extraction = build_extraction(
            ExtractedLayout::from_blocks(vec![TextBlock::new(1, 0, "Postcode: B12 3CD")]),
            &MapperConfig::default(),
        );
        let validation: ValidationReport = serde_json::from_value(serde_json::json!({
            "findings": [
                {"status": "fail", "severity": "warning", "missing_fields": ["site_address", "application_ref"]},
                {"status": "pass", "missing_fields": ["site_address"]}
            ]
        }))
        .unwrap();

        let request = build_llm_request(&extraction, &validation);
        assert_eq!(request.missing_fields, vec!["application_ref", "site_address"]);
        assert_eq!(request.task, ESCALATION_TASK);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["return_schema"]["filled_fields"]["site_address"],
            "string|number|object|null"
        );
        assert_eq!(json["return_schema"]["citations"][0]["page"], "number");
        assert_eq!(json["extraction_fields"]["postcode"], "B12 3CD");
        assert_eq!(json["evidence_index"]["text_block_0"]["type"], "text_block");
        assert_eq!(json["evidence_index"]["postcode"][0]["block_id"], "p1b0");
    }

    #[test]
    fn request_carries_guidance_per_missing_field() {
        let extraction = build_extraction(
            ExtractedLayout::from_blocks(vec![
                TextBlock::new(1, 0, "Site Location").with_role("sectionHeading"),
                TextBlock::new(1, 1, "Postcode: B12 3CD"),
            ]),
            &MapperConfig::default(),
        );
        let validation: ValidationReport = serde_json::from_value(serde_json::json!({
            "findings": [
                {"status": "fail", "severity": "error", "missing_fields": ["site_address", "agent_name"]}
            ]
        }))
        .unwrap();

        let request = build_llm_request(&extraction, &validation);
        let keys: Vec<&str> = request.field_guidance.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["agent_name", "site_address"]);

        let site = &request.field_guidance["site_address"];
        assert_eq!(
            site.context,
            "Look for address information, postcodes, street names\n\n## Site Location\n\nPostcode: B12 3CD"
        );
        assert!(site.validation_rule.contains("postcode"));

        let agent = &request.field_guidance["agent_name"];
        assert_eq!(agent.context, "## Site Location\n\nPostcode: B12 3CD");
        assert_eq!(agent.validation_rule, "Field agent_name must be valid and complete");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["field_guidance"]["agent_name"]["validation_rule"],
            "Field agent_name must be valid and complete"
        );
    }

    #[test]
    fn document_context_marks_headings_and_tables() {
        let blocks = vec![
            TextBlock::new(1, 0, "Site Location").with_role("sectionHeading"),
            TextBlock::new(1, 1, "12 Example Street"),
            TextBlock::new(1, 2, ""),
        ];
        let tables = vec![
            Table {
                cells: vec![cell("Ref"), cell(""), cell("PP-14469287")],
                ..Table::default()
            },
            Table::default(),
        ];
        assert_eq!(
            build_document_context(&blocks, &tables),
            "## Site Location\n\n12 Example Street\n\nRef | PP-14469287"
        );
        assert_eq!(build_document_context(&[], &[]), "");
    }

    #[test]
    fn field_context_hints() {
        assert_eq!(
            field_context("site_address", "body"),
            "Look for address information, postcodes, street names\n\nbody"
        );
        assert_eq!(field_context("agent_name", "body"), "body");
    }

    #[test]
    fn validation_rules() {
        assert!(validation_rule_for("site_address").contains("postcode"));
        assert_eq!(
            validation_rule_for("agent_name"),
            "Field agent_name must be valid and complete"
        );
    }
}
