//! Document-type classification by hint-phrase scoring.

use super::normalize::normalize;
use super::patterns::{PatternLibrary, DOC_TYPE_PRIORITY};
use crate::models::{DocumentType, TextBlock};

/// Lower-cased, normalized text of the first `limit` blocks, space-joined.
pub fn classification_corpus(blocks: &[TextBlock], limit: usize) -> String {
    blocks
        .iter()
        .take(limit)
        .map(|b| normalize(&b.content))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Number of distinct hint phrases for `doc_type` found in `corpus`.
pub fn score(corpus: &str, doc_type: DocumentType, patterns: &PatternLibrary) -> usize {
    patterns
        .hints_for(doc_type)
        .map_or(0, |hints| hints.iter().filter(|re| re.is_match(corpus)).count())
}

/// Highest-scoring document type.
///
/// Types are scored in priority order and a later type must strictly beat
/// the running best, so earlier types win ties. Types outside the priority
/// list are only consulted when every priority type scores zero.
pub fn classify_document(
    blocks: &[TextBlock],
    limit: usize,
    patterns: &PatternLibrary,
) -> DocumentType {
    let corpus = classification_corpus(blocks, limit);

    let mut best = (DocumentType::Unknown, 0usize);
    for doc_type in DOC_TYPE_PRIORITY {
        let s = score(&corpus, doc_type, patterns);
        if s > best.1 {
            best = (doc_type, s);
        }
    }

    if best.1 == 0 {
        for hints in &patterns.doc_type_hints {
            if DOC_TYPE_PRIORITY.contains(&hints.doc_type) {
                continue;
            }
            let s = score(&corpus, hints.doc_type, patterns);
            if s > best.1 {
                best = (hints.doc_type, s);
            }
        }
    }

    tracing::debug!(document_type = %best.0, score = best.1, "Classified document");
    best.0
}
