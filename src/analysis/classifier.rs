use crate::analysis::{AnalysisReport, CategoryGroup, ProjectCategory, Verdict};

/// Above this NDVI a claimed built site reads as forest or bush.
pub const GHOST_THRESHOLD: f64 = 0.4;
/// Open band of readings flagged as an anomalous water surface.
pub const SPILL_BAND: (f64, f64) = (-0.15, 0.05);

pub const INFRASTRUCTURE_RULESET: &str = "Ghost_NDVI_Rules_v2";
pub const ENVIRONMENTAL_RULESET: &str = "Oil_NDVI_Rules_v2";
pub const UNASSIGNED_RULESET: &str = "Unassigned";

pub fn classify(category: &ProjectCategory, index: f64) -> AnalysisReport {
    match category.group() {
        CategoryGroup::Infrastructure => classify_infrastructure(category, index),
        CategoryGroup::Environmental => classify_environmental(index),
        CategoryGroup::Unrecognized => AnalysisReport {
            calculated_index: index,
            verdict: Verdict::UnknownProjectType,
            risk_flag: Verdict::UnknownProjectType.is_risk(),
            reason: "System does not have a rule set for this project category.".to_string(),
            model_used: UNASSIGNED_RULESET.to_string(),
        },
    }
}

fn classify_infrastructure(category: &ProjectCategory, index: f64) -> AnalysisReport {
    let (verdict, reason) = if index > GHOST_THRESHOLD {
        (
            Verdict::GhostProjectDetected,
            format!(
                "High vegetation index ({index:.4}) detected. Terrain reads as forest/bush instead of '{category}'."
            ),
        )
    } else {
        (
            Verdict::ConstructionActive,
            format!(
                "Low vegetation index ({index:.4}) confirms paved/built surface consistent with '{category}'."
            ),
        )
    };
    report(index, verdict, reason, INFRASTRUCTURE_RULESET)
}

fn classify_environmental(index: f64) -> AnalysisReport {
    let (low, high) = SPILL_BAND;
    let (verdict, reason) = if index > low && index < high {
        (
            Verdict::SpillDetected,
            format!(
                "Water-surface index ({index:.4}) is inside the hydrocarbon sheen band. Remediation incomplete."
            ),
        )
    } else {
        (
            Verdict::CleanupVerified,
            format!(
                "Water-surface index ({index:.4}) is consistent with clean environmental recovery."
            ),
        )
    };
    report(index, verdict, reason, ENVIRONMENTAL_RULESET)
}

fn report(index: f64, verdict: Verdict, reason: String, ruleset: &str) -> AnalysisReport {
    AnalysisReport {
        calculated_index: index,
        verdict,
        risk_flag: verdict.is_risk(),
        reason,
        model_used: ruleset.to_string(),
    }
}
