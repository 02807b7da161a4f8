//! Application constants and mapper configuration.
//!
//! Every hand-tuned confidence value and scan window used by the field mapper
//! lives in [`MapperConfig`]. `MapperConfig::default()` is the calibrated
//! baseline; a JSON file may override any subset of it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "PlanProof";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV_VAR: &str = "PLANPROOF_LOG";

/// Filter used when `PLANPROOF_LOG` is unset or unparsable.
pub fn default_log_filter() -> &'static str {
    "planproof_lib=info,planproof_map=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Complete configuration of one mapping pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub limits: ScanLimits,
    pub confidence: ConfidenceTable,
    pub council: CouncilRules,
}

/// How many leading blocks each strategy inspects.
///
/// Capping the scan keeps each extractor's worst-case cost independent of
/// document length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanLimits {
    /// Blocks concatenated into the classification corpus.
    pub classify_blocks: usize,
    /// Blocks searched for a site-location header (structured address).
    pub section_header_blocks: usize,
    /// Blocks after the header scanned for labelled address parts.
    pub section_body_blocks: usize,
    /// Blocks looked back over when deciding section membership.
    pub section_lookback: usize,
    pub demolition_blocks: usize,
    pub heuristic_blocks: usize,
    pub prior_approval_blocks: usize,
    pub proposal_statement_blocks: usize,
    /// Blocks scanned for application refs, postcodes, emails and phones.
    pub regex_field_blocks: usize,
    /// Blocks either side of a contact hit searched for "applicant".
    pub applicant_context_radius: usize,
    /// Blocks after a bare label joined into its value.
    pub label_lookahead: usize,
    /// Joined look-ahead text stops growing once longer than this.
    pub label_min_joined_chars: usize,
    pub snippet_chars: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            classify_blocks: 200,
            section_header_blocks: 200,
            section_body_blocks: 20,
            section_lookback: 10,
            demolition_blocks: 100,
            heuristic_blocks: 100,
            prior_approval_blocks: 100,
            proposal_statement_blocks: 80,
            regex_field_blocks: 400,
            applicant_context_radius: 2,
            label_lookahead: 3,
            label_min_joined_chars: 20,
            snippet_chars: 240,
        }
    }
}

/// Confidence assigned by each strategy, and the bar each cascade stage
/// must clear to be accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceTable {
    pub structured_section: f32,
    pub structured_section_bar: f32,
    pub demolition: f32,
    pub demolition_bar: f32,
    pub plan_address_in_section: f32,
    pub plan_address: f32,
    pub plan_label_in_section: f32,
    pub plan_label: f32,
    /// Heuristic candidates must score strictly above this.
    pub plan_floor: f32,
    pub prior_approval: f32,
    pub proposal_long: f32,
    pub proposal_short: f32,
    pub portal_ref: f32,
    pub year_ref: f32,
    pub postcode_labelled: f32,
    pub postcode_site_context: f32,
    pub postcode_base: f32,
    pub postcode_council_penalty: f32,
    pub postcode_accept: f32,
    pub contact_applicant: f32,
    pub contact_base: f32,
    pub label_fallback: f32,
}

impl Default for ConfidenceTable {
    fn default() -> Self {
        Self {
            structured_section: 0.95,
            structured_section_bar: 0.9,
            demolition: 0.85,
            demolition_bar: 0.8,
            plan_address_in_section: 0.7,
            plan_address: 0.4,
            plan_label_in_section: 0.8,
            plan_label: 0.6,
            plan_floor: 0.3,
            prior_approval: 0.9,
            proposal_long: 0.7,
            proposal_short: 0.5,
            portal_ref: 0.9,
            year_ref: 0.8,
            postcode_labelled: 0.9,
            postcode_site_context: 0.7,
            postcode_base: 0.5,
            postcode_council_penalty: 0.1,
            postcode_accept: 0.3,
            contact_applicant: 0.8,
            contact_base: 0.5,
            label_fallback: 0.7,
        }
    }
}

impl ConfidenceTable {
    fn entries(&self) -> [(&'static str, f32); 22] {
        [
            ("structured_section", self.structured_section),
            ("structured_section_bar", self.structured_section_bar),
            ("demolition", self.demolition),
            ("demolition_bar", self.demolition_bar),
            ("plan_address_in_section", self.plan_address_in_section),
            ("plan_address", self.plan_address),
            ("plan_label_in_section", self.plan_label_in_section),
            ("plan_label", self.plan_label),
            ("plan_floor", self.plan_floor),
            ("prior_approval", self.prior_approval),
            ("proposal_long", self.proposal_long),
            ("proposal_short", self.proposal_short),
            ("portal_ref", self.portal_ref),
            ("year_ref", self.year_ref),
            ("postcode_labelled", self.postcode_labelled),
            ("postcode_site_context", self.postcode_site_context),
            ("postcode_base", self.postcode_base),
            ("postcode_council_penalty", self.postcode_council_penalty),
            ("postcode_accept", self.postcode_accept),
            ("contact_applicant", self.contact_applicant),
            ("contact_base", self.contact_base),
            ("label_fallback", self.label_fallback),
        ]
    }
}

/// Which postcodes found in council/office text are pushed below the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouncilPostcodePolicy {
    /// Only the configured council postcodes, or any postcode in a PO-box block.
    #[default]
    Listed,
    /// Any postcode that appears in council-contact text.
    AnyCouncilBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouncilRules {
    pub policy: CouncilPostcodePolicy,
    /// Literal council postcodes, upper-case, matched as prefixes.
    pub postcodes: Vec<String>,
}

impl Default for CouncilRules {
    fn default() -> Self {
        Self {
            policy: CouncilPostcodePolicy::Listed,
            postcodes: vec!["B1 1TU".to_string()],
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════

impl MapperConfig {
    /// Parse a (possibly partial) JSON config; omitted keys keep defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), "Loaded mapper config");
        Ok(config)
    }

    /// Reject confidences outside `[0, 1]` and empty scan windows.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.confidence.entries() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field: format!("confidence.{field}"),
                    reason: format!("{value} is outside [0.0, 1.0]"),
                });
            }
        }

        let limits = &self.limits;
        let windows = [
            ("classify_blocks", limits.classify_blocks),
            ("section_header_blocks", limits.section_header_blocks),
            ("section_body_blocks", limits.section_body_blocks),
            ("section_lookback", limits.section_lookback),
            ("demolition_blocks", limits.demolition_blocks),
            ("heuristic_blocks", limits.heuristic_blocks),
            ("prior_approval_blocks", limits.prior_approval_blocks),
            ("proposal_statement_blocks", limits.proposal_statement_blocks),
            ("regex_field_blocks", limits.regex_field_blocks),
            ("label_lookahead", limits.label_lookahead),
            ("snippet_chars", limits.snippet_chars),
        ];
        for (field, value) in windows {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field: format!("limits.{field}"),
                    reason: "must be greater than zero".into(),
                });
            }
        }

        Ok(())
    }
}
