use std::collections::BTreeMap;

use serde::Serialize;

use super::normalize::snippet;
use crate::models::{DocumentType, FieldName, TextBlock};

/// A citation justifying one extracted field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceEntry {
    pub page: u32,
    /// `p{page}b{index}` of the source block.
    pub block_id: String,
    pub snippet: String,
    pub confidence: f32,
    pub source_doc_type: DocumentType,
}

/// Field name → evidence entries, append-ordered per field.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct EvidenceIndex(BTreeMap<FieldName, Vec<EvidenceEntry>>);

impl EvidenceIndex {
    pub fn get(&self, field: FieldName) -> &[EvidenceEntry] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &[EvidenceEntry])> {
        self.0.iter().map(|(field, entries)| (*field, entries.as_slice()))
    }

    pub fn push(&mut self, field: FieldName, entry: EvidenceEntry) {
        self.0.entry(field).or_default().push(entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Records evidence for every field value assigned during one mapping pass.
pub struct EvidenceIndexer {
    document_type: DocumentType,
    snippet_chars: usize,
    index: EvidenceIndex,
}

impl EvidenceIndexer {
    pub fn new(document_type: DocumentType, snippet_chars: usize) -> Self {
        Self {
            document_type,
            snippet_chars,
            index: EvidenceIndex::default(),
        }
    }

    pub fn record(&mut self, field: FieldName, block: &TextBlock, confidence: f32) {
        self.index.push(
            field,
            EvidenceEntry {
                page: block.page_number,
                block_id: block.block_id(),
                snippet: snippet(&block.content, self.snippet_chars),
                confidence,
                source_doc_type: self.document_type,
            },
        );
    }

    pub fn finish(self) -> EvidenceIndex {
        self.index
    }
}
