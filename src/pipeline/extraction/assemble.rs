use std::path::Path;

use super::types::{EvidenceItem, ExtractionOutput, GeneralEvidenceIndex, LayoutAnalyzer, LayoutEvidence};
use super::ExtractionError;
use crate::config::MapperConfig;
use crate::models::{ExtractedLayout, Table, TextBlock};
use crate::pipeline::mapping::map_fields;

/// Text-block snippets keep this many characters before the ellipsis.
pub const BLOCK_SNIPPET_CHARS: usize = 100;
/// Table snippets are built from at most this many leading cells.
pub const TABLE_SNIPPET_CELLS: usize = 5;
/// Each cell contributes at most this many characters to a table snippet.
pub const TABLE_CELL_SNIPPET_CHARS: usize = 50;

const ELLIPSIS: &str = "...";

pub fn parse_layout(json: &str) -> Result<ExtractedLayout, ExtractionError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_layout(path: &Path) -> Result<ExtractedLayout, ExtractionError> {
    let raw = std::fs::read_to_string(path)?;
    let layout = parse_layout(&raw)?;
    tracing::debug!(
        path = %path.display(),
        text_blocks = layout.text_blocks.len(),
        tables = layout.tables.len(),
        "Loaded layout"
    );
    Ok(layout)
}

/// Run the analyzer, then map and assemble its layout.
pub fn extract_from_bytes(
    analyzer: &dyn LayoutAnalyzer,
    document: &[u8],
    model: &str,
    config: &MapperConfig,
) -> Result<ExtractionOutput, ExtractionError> {
    tracing::info!(bytes = document.len(), model, "Starting layout analysis");
    let layout = analyzer.analyze(document, model)?;
    Ok(build_extraction(layout, config))
}

/// Index blocks, map fields, and build the general evidence index.
pub fn build_extraction(mut layout: ExtractedLayout, config: &MapperConfig) -> ExtractionOutput {
    layout.assign_block_indices();
    let mapped = map_fields(&layout, config);

    let mut evidence_index = GeneralEvidenceIndex::default();
    for (i, block) in layout.text_blocks.iter().enumerate() {
        evidence_index.insert(format!("text_block_{i}"), block_evidence(block));
    }
    for (i, table) in layout.tables.iter().enumerate() {
        evidence_index.insert(format!("table_{i}"), table_evidence(table));
    }
    for (field, entries) in mapped.evidence_index.iter() {
        evidence_index.insert(field.as_str(), EvidenceItem::Field(entries.to_vec()));
    }

    tracing::info!(
        pages = layout.page_count(),
        text_blocks = layout.text_blocks.len(),
        tables = layout.tables.len(),
        fields = mapped.fields.len(),
        "Extraction assembled"
    );

    ExtractionOutput {
        fields: mapped.fields,
        evidence_index,
        metadata: layout.metadata,
        text_blocks: layout.text_blocks,
        tables: layout.tables,
        page_anchors: layout.page_anchors,
    }
}

fn block_evidence(block: &TextBlock) -> EvidenceItem {
    EvidenceItem::Layout(LayoutEvidence::TextBlock {
        content: block.content.clone(),
        snippet: block_snippet(&block.content),
        page_number: block.page_number,
        bounding_box: block.bounding_box.clone(),
    })
}

fn table_evidence(table: &Table) -> EvidenceItem {
    EvidenceItem::Layout(LayoutEvidence::Table {
        row_count: table.row_count,
        column_count: table.column_count,
        page_number: table.page_number,
        snippet: table_snippet(table),
        cells: table.cells.clone(),
    })
}

/// First 100 characters, with "..." appended when the content was longer.
pub fn block_snippet(content: &str) -> String {
    if content.chars().count() > BLOCK_SNIPPET_CHARS {
        let head: String = content.chars().take(BLOCK_SNIPPET_CHARS).collect();
        format!("{head}{ELLIPSIS}")
    } else {
        content.to_string()
    }
}

/// Non-empty cells among the first five, each cut to 50 characters.
pub fn table_snippet(table: &Table) -> String {
    table
        .cells
        .iter()
        .take(TABLE_SNIPPET_CELLS)
        .filter(|cell| !cell.content.is_empty())
        .map(|cell| cell.content.chars().take(TABLE_CELL_SNIPPET_CHARS).collect::<String>())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, DocumentType, FieldName};

    fn cell(content: &str) -> Cell {
        Cell {
            content: content.to_string(),
            ..Cell::default()
        }
    }

    struct MockAnalyzer {
        layout: Option<ExtractedLayout>,
    }

    impl LayoutAnalyzer for MockAnalyzer {
        fn analyze(&self, _document: &[u8], model: &str) -> Result<ExtractedLayout, ExtractionError> {
            self.layout
                .clone()
                .ok_or_else(|| ExtractionError::Analyzer(format!("model {model} unavailable")))
        }
    }

    fn notice_layout() -> ExtractedLayout {
        parse_layout(
            r#"{
                "text_blocks": [
                    {"content": "Site notice of application", "page_number": 1},
                    {"text": "Demolition of Unit M, Dorset Road, Saltley, Birmingham, B8 1BG", "page": 1},
                    {"content": "Contact 07700 900123", "page_number": 2, "bounding_box": [1, 2, 3, 4]}
                ],
                "tables": [
                    {"page_number": 2, "row_count": 1, "column_count": 3,
                     "cells": [{"content": "Ref"}, {"content": ""}, {"content": "PP-14469287"}]}
                ],
                "metadata": {"page_count": 2},
                "page_anchors": {"1": {"offset": 0}}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn block_snippet_appends_ellipsis_only_when_cut() {
        assert_eq!(block_snippet("short"), "short");
        let exact = "a".repeat(100);
        assert_eq!(block_snippet(&exact), exact);
        let long = "b".repeat(101);
        assert_eq!(block_snippet(&long), format!("{}...", "b".repeat(100)));
    }

    #[test]
    fn table_snippet_skips_empty_cells() {
        let table = Table {
            cells: vec![
                cell("Ref"),
                cell(""),
                cell(&"x".repeat(80)),
                cell("d"),
                cell("e"),
                cell("beyond the first five"),
            ],
            ..Table::default()
        };
        assert_eq!(
            table_snippet(&table),
            format!("Ref | {} | d | e", "x".repeat(50))
        );
        assert_eq!(table_snippet(&Table::default()), "");
    }

    #[test]
    fn build_assigns_indices_before_mapping() {
        let output = build_extraction(notice_layout(), &MapperConfig::default());
        let ids: Vec<String> = output.text_blocks.iter().map(|b| b.block_id()).collect();
        assert_eq!(ids, vec!["p1b0", "p1b1", "p2b2"]);

        assert_eq!(output.fields.document_type(), DocumentType::SiteNotice);
        assert_eq!(
            output.fields.value(FieldName::SiteAddress),
            Some("Unit M, Dorset Road, Saltley, Birmingham, B8 1BG")
        );
        match output.evidence_index.get("site_address") {
            Some(EvidenceItem::Field(entries)) => assert_eq!(entries[0].block_id, "p1b1"),
            other => panic!("unexpected site_address evidence: {other:?}"),
        }
    }

    #[test]
    fn general_index_orders_blocks_tables_then_fields() {
        let output = build_extraction(notice_layout(), &MapperConfig::default());
        let keys: Vec<&str> = output.evidence_index.keys().collect();
        assert_eq!(
            &keys[..4],
            &["text_block_0", "text_block_1", "text_block_2", "table_0"]
        );
        assert!(keys[4..].contains(&"site_address"));
        assert!(keys[4..].contains(&"applicant_phone"));
    }

    #[test]
    fn serialized_output_shape() {
        let output = build_extraction(notice_layout(), &MapperConfig::default());
        let json = serde_json::to_value(&output).unwrap();

        let block = &json["evidence_index"]["text_block_2"];
        assert_eq!(block["type"], "text_block");
        assert_eq!(block["page_number"], 2);
        assert_eq!(block["bounding_box"], serde_json::json!([1, 2, 3, 4]));

        let table = &json["evidence_index"]["table_0"];
        assert_eq!(table["type"], "table");
        assert_eq!(table["snippet"], "Ref | PP-14469287");
        assert_eq!(table["cells"].as_array().unwrap().len(), 3);

        assert_eq!(json["fields"]["document_type"], "site_notice");
        assert_eq!(json["metadata"]["page_count"], 2);
        assert_eq!(json["page_anchors"]["1"]["offset"], 0);
        assert_eq!(json["text_blocks"][1]["index"], 1);
    }

    #[test]
    fn index_insert_replaces_in_place() {
        let mut index = GeneralEvidenceIndex::default();
        index.insert("a", EvidenceItem::Field(vec![]));
        index.insert("b", EvidenceItem::Field(vec![]));
        index.insert(
            "a",
            block_evidence(&TextBlock::new(1, 0, "replacement")),
        );
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(matches!(index.get("a"), Some(EvidenceItem::Layout(_))));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn extract_from_bytes_runs_analyzer() {
        let analyzer = MockAnalyzer {
            layout: Some(notice_layout()),
        };
        let output =
            extract_from_bytes(&analyzer, b"%PDF-1.7", "prebuilt-layout", &MapperConfig::default())
                .unwrap();
        assert_eq!(output.text_blocks.len(), 3);
    }

    #[test]
    fn analyzer_failure_propagates() {
        let analyzer = MockAnalyzer { layout: None };
        let err = extract_from_bytes(&analyzer, b"", "prebuilt-layout", &MapperConfig::default())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Analyzer(_)));
        assert!(err.to_string().contains("prebuilt-layout"));
    }

    #[test]
    fn malformed_layout_is_json_error() {
        assert!(matches!(
            parse_layout("{\"text_blocks\": 3}"),
            Err(ExtractionError::Json(_))
        ));
    }

    #[test]
    fn load_layout_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, r#"{"text_blocks": [{"content": "x", "page_number": 1}]}"#)
            .unwrap();
        let layout = load_layout(&path).unwrap();
        assert_eq!(layout.text_blocks.len(), 1);
        assert!(matches!(
            load_layout(&dir.path().join("missing.json")),
            Err(ExtractionError::Io(_))
        ));
    }
}
