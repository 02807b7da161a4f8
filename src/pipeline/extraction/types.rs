use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::ExtractionError;
use crate::models::{Cell, ExtractedLayout, Table, TextBlock};
use crate::pipeline::mapping::{EvidenceEntry, FieldMap};

/// One entry of the general evidence index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutEvidence {
    TextBlock {
        content: String,
        snippet: String,
        page_number: u32,
        bounding_box: Option<serde_json::Value>,
    },
    Table {
        row_count: usize,
        column_count: usize,
        page_number: u32,
        snippet: String,
        cells: Vec<Cell>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EvidenceItem {
    Layout(LayoutEvidence),
    Field(Vec<EvidenceEntry>),
}

/// `text_block_{i}`, then `table_{i}`, then one entry per mapped field,
/// serialized as a JSON object in that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneralEvidenceIndex {
    entries: Vec<(String, EvidenceItem)>,
}

impl GeneralEvidenceIndex {
    /// Insert or replace `key`, keeping its original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, item: EvidenceItem) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = item,
            None => self.entries.push((key, item)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&EvidenceItem> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for GeneralEvidenceIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, item) in &self.entries {
            map.serialize_entry(key, item)?;
        }
        map.end()
    }
}

/// Everything downstream stages need about one analyzed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOutput {
    pub fields: FieldMap,
    pub evidence_index: GeneralEvidenceIndex,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub text_blocks: Vec<TextBlock>,
    pub tables: Vec<Table>,
    pub page_anchors: serde_json::Map<String, serde_json::Value>,
}

/// External layout-analysis backend (allows mocking for tests).
pub trait LayoutAnalyzer {
    /// Analyze a document's bytes with the named backend model.
    fn analyze(&self, document: &[u8], model: &str) -> Result<ExtractedLayout, ExtractionError>;
}
