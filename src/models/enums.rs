use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a string does not name a known enum variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct InvalidEnumValue {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnumValue {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(DocumentType {
    ApplicationForm => "application_form",
    SiteNotice => "site_notice",
    SitePlan => "site_plan",
    DesignStatement => "design_statement",
    Heritage => "heritage",
    Drawing => "drawing",
    Unknown => "unknown",
});

str_enum!(FieldName {
    ApplicationRef => "application_ref",
    SiteAddress => "site_address",
    ProposedUse => "proposed_use",
    ProposalDescription => "proposal_description",
    ApplicantName => "applicant_name",
    AgentName => "agent_name",
    Postcode => "postcode",
    ApplicantEmail => "applicant_email",
    ApplicantPhone => "applicant_phone",
});

impl FieldName {
    /// Key of the parallel confidence entry in the flat field map.
    pub fn confidence_key(&self) -> String {
        format!("{}_confidence", self.as_str())
    }
}
