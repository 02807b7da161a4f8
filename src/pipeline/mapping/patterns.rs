//! Fixed regular expressions and phrase tables used by every strategy.
//!
//! Pure data: nothing here holds state or encodes control flow. Strategies
//! receive a [`PatternLibrary`] so they can be exercised against a modified
//! library in isolation.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{DocumentType, FieldName};

/// Boilerplate markers found on drawing sheets and map extracts.
pub const NOISE_MARKERS: &[&str] = &[
    "copyright",
    "notes:",
    "scale",
    "printed on",
    "os 1000",
    "disclaimer",
    "this drawing",
    "for information only",
];

/// Markers of council or planning-office contact text.
pub const COUNCIL_MARKERS: &[&str] = &[
    "birmingham.gov.uk",
    "planning.registration",
    "council",
    "local authority",
    "planning department",
    "planning@",
    "0121 464",
    "po box",
];

pub const PO_BOX_MARKER: &str = "po box";

/// Headers that open a site-location section, for proximity checks.
pub const SECTION_HEADERS: &[&str] = &[
    "site location",
    "site address",
    "address of site",
    "location of site",
    "property address",
];

/// Headers that start structured address extraction on application forms.
pub const ADDRESS_SECTION_HEADERS: &[&str] = &[
    "site location",
    "site address",
    "address of site",
    "property address",
];

/// Inline labels recognised by the plan-sheet address scan.
pub const PLAN_ADDRESS_LABELS: &[&str] = &["site address", "address of site", "site location"];

/// Declaration phrases that introduce a prior-approval proposal.
pub const PRIOR_APPROVAL_PHRASES: &[&str] =
    &["i/we hereby apply for prior approval", "prior approval for"];

pub const APPLICANT_MARKER: &str = "applicant";

/// Classification order. Application forms and site notices share vocabulary
/// with drawings and plans, so they are scored first and win ties.
pub const DOC_TYPE_PRIORITY: [DocumentType; 6] = [
    DocumentType::ApplicationForm,
    DocumentType::SiteNotice,
    DocumentType::SitePlan,
    DocumentType::DesignStatement,
    DocumentType::Heritage,
    DocumentType::Drawing,
];

/// Hint phrases for one document type.
#[derive(Debug, Clone)]
pub struct DocTypeHints {
    pub doc_type: DocumentType,
    pub hints: Vec<Regex>,
}

/// Label phrases used by the generic label fallback for one field.
#[derive(Debug, Clone)]
pub struct LabelPhrases {
    pub field: FieldName,
    pub patterns: Vec<Regex>,
}

/// The complete compiled pattern set.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    /// UK postcode shape; group 1 is the postcode.
    pub postcode: Regex,
    pub email: Regex,
    /// Phone-like digit runs; group 1 is the number.
    pub phone: Regex,
    /// `PP-` portal references or year-prefixed codes; group 1 is the ref.
    pub application_ref: Regex,
    pub date_like: Regex,
    /// A leading house number followed by upper-case address text.
    pub address_like: Regex,
    pub proposal_hint: Regex,
    /// "demolition of <address> <postcode>"; groups 1 and 2.
    pub demolition: Regex,
    pub prior_approval_for: Regex,
    pub standalone_for: Regex,
    /// Map grid references such as "4 2447".
    pub grid_reference: Regex,
    pub bare_number: Regex,
    pub doc_type_hints: Vec<DocTypeHints>,
    pub label_phrases: Vec<LabelPhrases>,
}

/// The standard library, compiled once per process.
pub static PATTERNS: LazyLock<PatternLibrary> = LazyLock::new(PatternLibrary::standard);

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid pattern library regex")
}

fn regexes(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| regex(p)).collect()
}

impl PatternLibrary {
    pub fn standard() -> Self {
        Self {
            postcode: regex(r"(?i)\b([A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2})\b"),
            email: regex(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b"),
            phone: regex(r"\b(\+?\d[\d\s().-]{8,}\d)\b"),
            application_ref: regex(r"(?i)\b(PP-\d{6,}|20\d{6,}[A-Z]{1,3})\b"),
            date_like: regex(r"\b\d{1,2}[./-]\d{1,2}[./-]\d{2,4}\b"),
            address_like: regex(r"^\s*\d+\s+[A-Z0-9'’\- ]{4,}$"),
            proposal_hint: regex(
                r"(?i)\b(PROPOS|DEVELOPMENT|CONVERSION|USE|HMO|EXTENSION|LOFT|DORMER)\b",
            ),
            demolition: regex(
                r"(?i)demolition\s+of\s+(.+?)(?:\s+([A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2}))",
            ),
            prior_approval_for: regex(r"(?i)prior\s+approval\s+for\b"),
            standalone_for: regex(r"(?i)\bfor\b"),
            grid_reference: regex(r"^\s*\d+\s+\d+\s*$"),
            bare_number: regex(r"^\s*\d+\s*$"),
            doc_type_hints: vec![
                DocTypeHints {
                    doc_type: DocumentType::ApplicationForm,
                    hints: regexes(&[
                        r"application form",
                        r"planning application",
                        r"town and country planning",
                        r"planning portal reference",
                        r"application to determine if prior approval",
                        r"i/we hereby apply for prior approval",
                        r"prior approval",
                    ]),
                },
                DocTypeHints {
                    doc_type: DocumentType::SiteNotice,
                    hints: regexes(&[
                        r"statement of display of a site notice",
                        r"site notice of application",
                        r"site notice",
                        r"notice of application",
                    ]),
                },
                DocTypeHints {
                    doc_type: DocumentType::SitePlan,
                    hints: regexes(&[
                        r"location\s*&\s*block\s*plan",
                        r"location plan",
                        r"block plan",
                        r"\b1:1250\b",
                        r"\b1:500\b",
                        r"\b1:2500\b",
                    ]),
                },
                DocTypeHints {
                    doc_type: DocumentType::Drawing,
                    hints: regexes(&[
                        r"existing",
                        r"proposed",
                        r"elevation",
                        r"floor plan",
                        r"section",
                    ]),
                },
                DocTypeHints {
                    doc_type: DocumentType::DesignStatement,
                    hints: regexes(&[r"design and access statement", r"design\s*&\s*access"]),
                },
                DocTypeHints {
                    doc_type: DocumentType::Heritage,
                    hints: regexes(&[
                        r"heritage statement",
                        r"listed building",
                        r"conservation area",
                    ]),
                },
            ],
            label_phrases: vec![
                LabelPhrases {
                    field: FieldName::SiteAddress,
                    patterns: regexes(&[r"site address", r"address of site", r"site location"]),
                },
                LabelPhrases {
                    field: FieldName::ProposalDescription,
                    patterns: regexes(&[
                        r"proposal",
                        r"description of development",
                        r"proposed development",
                        r"what are you proposing",
                    ]),
                },
                LabelPhrases {
                    field: FieldName::ApplicantName,
                    patterns: regexes(&[
                        r"applicant name",
                        r"name of applicant",
                        r"first name",
                        r"surname",
                    ]),
                },
                LabelPhrases {
                    field: FieldName::AgentName,
                    patterns: regexes(&[r"agent name", r"name of agent"]),
                },
                LabelPhrases {
                    field: FieldName::ProposedUse,
                    patterns: regexes(&[
                        r"i/we hereby apply for prior approval",
                        r"prior approval for",
                        r"declaration",
                    ]),
                },
            ],
        }
    }

    pub fn hints_for(&self, doc_type: DocumentType) -> Option<&[Regex]> {
        self.doc_type_hints
            .iter()
            .find(|h| h.doc_type == doc_type)
            .map(|h| h.hints.as_slice())
    }

    pub fn labels_for(&self, field: FieldName) -> Option<&[Regex]> {
        self.label_phrases
            .iter()
            .find(|l| l.field == field)
            .map(|l| l.patterns.as_slice())
    }
}

/// True when `haystack` contains any of `needles`.
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}
