use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::evidence::EvidenceIndex;
use crate::models::{DocumentType, FieldName};

/// A value proposed by one strategy.
///
/// `block` is the position of the source block in the mapped slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub value: String,
    pub block: usize,
    pub confidence: f32,
}

impl Candidate {
    pub fn new(value: impl Into<String>, block: usize, confidence: f32) -> Self {
        Self {
            value: value.into(),
            block,
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub value: String,
    pub confidence: f32,
}

/// Populated fields of one mapping pass, in the order they were set.
///
/// Write-once: a field that already has a value is never overwritten.
/// Serializes flat: `document_type`, then each field followed by its
/// `{field}_confidence` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    document_type: DocumentType,
    entries: Vec<(FieldName, FieldValue)>,
}

impl FieldMap {
    pub fn new(document_type: DocumentType) -> Self {
        Self {
            document_type,
            entries: Vec::new(),
        }
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn get(&self, field: FieldName) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    pub fn value(&self, field: FieldName) -> Option<&str> {
        self.get(field).map(|v| v.value.as_str())
    }

    pub fn confidence(&self, field: FieldName) -> Option<f32> {
        self.get(field).map(|v| v.confidence)
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.get(field).is_some()
    }

    /// Set `field` unless it already holds a value. Returns whether it was set.
    pub fn insert(&mut self, field: FieldName, value: String, confidence: f32) -> bool {
        if self.contains(field) {
            return false;
        }
        self.entries.push((field, FieldValue { value, confidence }));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (*name, value))
    }

    /// Number of populated fields, excluding `document_type`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.entries.len() * 2))?;
        map.serialize_entry("document_type", &self.document_type)?;
        for (name, field) in &self.entries {
            map.serialize_entry(name.as_str(), &field.value)?;
            map.serialize_entry(&name.confidence_key(), &field.confidence)?;
        }
        map.end()
    }
}

/// `{fields, evidence_index}` for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingResult {
    pub fields: FieldMap,
    pub evidence_index: EvidenceIndex,
}
