pub mod classifier;
pub mod engine;
pub mod synthetic;
pub mod validator;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectCategory {
    Road,
    Building,
    Bridge,
    Factory,
    OilSpillRemediation,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryGroup {
    Infrastructure,
    Environmental,
    Unrecognized,
}

impl ProjectCategory {
    pub const KNOWN: [ProjectCategory; 5] = [
        ProjectCategory::Road,
        ProjectCategory::Building,
        ProjectCategory::Bridge,
        ProjectCategory::Factory,
        ProjectCategory::OilSpillRemediation,
    ];

    /// Total: anything outside the known set becomes `Unknown`.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "road" => Self::Road,
            "building" => Self::Building,
            "bridge" => Self::Bridge,
            "factory" => Self::Factory,
            "oil spill remediation" | "oilspillremediation" | "oil_spill_remediation"
            | "oil-spill-remediation" => Self::OilSpillRemediation,
            _ => Self::Unknown(raw.trim().to_string()),
        }
    }

    pub fn group(&self) -> CategoryGroup {
        match self {
            Self::Road | Self::Building | Self::Bridge | Self::Factory => {
                CategoryGroup::Infrastructure
            }
            Self::OilSpillRemediation => CategoryGroup::Environmental,
            Self::Unknown(_) => CategoryGroup::Unrecognized,
        }
    }
}

impl Display for ProjectCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Road => "Road",
            Self::Building => "Building",
            Self::Bridge => "Bridge",
            Self::Factory => "Factory",
            Self::OilSpillRemediation => "Oil Spill Remediation",
            Self::Unknown(label) => label.as_str(),
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    GhostProjectDetected,
    ConstructionActive,
    SpillDetected,
    CleanupVerified,
    UnknownProjectType,
}

impl Verdict {
    /// Verdicts that need a human to follow up.
    pub fn is_risk(self) -> bool {
        matches!(
            self,
            Self::GhostProjectDetected | Self::SpillDetected | Self::UnknownProjectType
        )
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::GhostProjectDetected => "GHOST_PROJECT_DETECTED",
            Self::ConstructionActive => "CONSTRUCTION_ACTIVE",
            Self::SpillDetected => "SPILL_DETECTED",
            Self::CleanupVerified => "CLEANUP_VERIFIED",
            Self::UnknownProjectType => "UNKNOWN_PROJECT_TYPE",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub calculated_index: f64,
    pub verdict: Verdict,
    pub risk_flag: bool,
    pub reason: String,
    pub model_used: String,
}

/// The NDVI value that actually reaches the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveObservation {
    pub value: Option<f64>,
    pub synthetic: bool,
}

impl EffectiveObservation {
    pub fn real(value: Option<f64>) -> Self {
        Self {
            value,
            synthetic: false,
        }
    }

    pub fn synthetic(value: f64) -> Self {
        Self {
            value: Some(value),
            synthetic: true,
        }
    }

    pub fn index(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}
