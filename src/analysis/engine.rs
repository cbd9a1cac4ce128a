use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::analysis::classifier::classify;
use crate::analysis::synthetic::generate;
use crate::analysis::validator::{is_usable, ValidityRule};
use crate::analysis::{AnalysisReport, EffectiveObservation, ProjectCategory};
use crate::config::AnalysisConfig;
use crate::satellite::SatelliteData;

/// Validator, fallback generator and classifier wired together.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine {
    pub rule: ValidityRule,
    pub seed: Option<u64>,
}

impl DecisionEngine {
    pub fn new(rule: ValidityRule, seed: Option<u64>) -> Self {
        Self { rule, seed }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.validity_rule, config.seed)
    }

    pub fn analyze(&self, project_type: &str, data: &SatelliteData) -> AnalysisReport {
        let category = ProjectCategory::parse(project_type);
        match self.seed {
            Some(seed) => {
                self.analyze_with_rng(&category, data, &mut StdRng::seed_from_u64(seed))
            }
            None => self.analyze_with_rng(&category, data, &mut rand::thread_rng()),
        }
    }

    pub fn analyze_with_rng<R: Rng>(
        &self,
        category: &ProjectCategory,
        data: &SatelliteData,
        rng: &mut R,
    ) -> AnalysisReport {
        let observation = resolve_observation(category, data.ndvi_mean, self.rule, rng);
        let report = classify(category, observation.index());
        info!(
            category = %category,
            verdict = %report.verdict,
            ndvi = report.calculated_index,
            synthetic = observation.synthetic,
            "project analyzed"
        );
        report
    }
}

/// Real data always wins; the RNG is only touched when the reading is unusable.
pub fn resolve_observation<R: Rng>(
    category: &ProjectCategory,
    raw: Option<f64>,
    rule: ValidityRule,
    rng: &mut R,
) -> EffectiveObservation {
    if is_usable(raw, rule) {
        return EffectiveObservation::real(raw);
    }
    match generate(category, rng) {
        Some(value) => EffectiveObservation::synthetic(value),
        None => EffectiveObservation::real(raw.filter(|v| v.is_finite())),
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    use super::{resolve_observation, DecisionEngine};
    use crate::analysis::validator::ValidityRule;
    use crate::analysis::{AnalysisReport, ProjectCategory, Verdict};
    use crate::satellite::http::parse_satellite_payload;
    use crate::satellite::SatelliteData;

    struct PanickingRng;

    impl RngCore for PanickingRng {
        fn next_u32(&mut self) -> u32 {
            panic!("rng consulted for a usable reading")
        }

        fn next_u64(&mut self) -> u64 {
            panic!("rng consulted for a usable reading")
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("rng consulted for a usable reading")
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            panic!("rng consulted for a usable reading")
        }
    }

    #[test]
    fn real_reading_takes_precedence() {
        let engine = DecisionEngine::default();
        let report = engine.analyze_with_rng(
            &ProjectCategory::Road,
            &SatelliteData::reading(0.6),
            &mut PanickingRng,
        );
        assert_eq!(report.calculated_index, 0.6);
        assert_eq!(report.verdict, Verdict::GhostProjectDetected);
        assert!(report.risk_flag);
    }

    #[test]
    fn building_with_low_index_is_active_construction() {
        let report = DecisionEngine::default().analyze("Building", &SatelliteData::reading(0.12));
        assert_eq!(report.verdict, Verdict::ConstructionActive);
        assert!(!report.risk_flag);
        assert_eq!(report.calculated_index, 0.12);
    }

    #[test]
    fn usable_reading_ignores_seed() {
        let data = SatelliteData::reading(-0.3);
        let a = DecisionEngine::new(ValidityRule::ExactZero, Some(1))
            .analyze("Oil Spill Remediation", &data);
        let b = DecisionEngine::new(ValidityRule::ExactZero, Some(2))
            .analyze("Oil Spill Remediation", &data);
        assert_eq!(a, b);
        assert_eq!(a.verdict, Verdict::CleanupVerified);
    }

    #[test]
    fn missing_or_zero_reading_is_replaced() {
        let engine = DecisionEngine::default();
        let mut rng = StdRng::seed_from_u64(2024);
        for data in [SatelliteData::default(), SatelliteData::reading(0.0)] {
            for _ in 0..200 {
                let report = engine.analyze_with_rng(&ProjectCategory::Factory, &data, &mut rng);
                assert_ne!(report.calculated_index, 0.0);
                let low = (0.05..=0.18).contains(&report.calculated_index);
                let high = (0.45..=0.75).contains(&report.calculated_index);
                assert!(low || high, "index {}", report.calculated_index);
                let expected = if high {
                    Verdict::GhostProjectDetected
                } else {
                    Verdict::ConstructionActive
                };
                assert_eq!(report.verdict, expected);
            }
        }
    }

    #[test]
    fn oil_spill_fallback_verdict_follows_drawn_value() {
        let engine = DecisionEngine::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen_spill = false;
        let mut seen_clean = false;
        for _ in 0..1000 {
            let report = engine.analyze_with_rng(
                &ProjectCategory::OilSpillRemediation,
                &SatelliteData::reading(0.0),
                &mut rng,
            );
            let index = report.calculated_index;
            assert!((-0.25..=-0.05).contains(&index), "index {index}");
            if index > -0.15 && index < 0.05 {
                assert_eq!(report.verdict, Verdict::SpillDetected);
                seen_spill = true;
            } else {
                assert_eq!(report.verdict, Verdict::CleanupVerified);
                seen_clean = true;
            }
        }
        assert!(seen_spill && seen_clean);
    }

    #[test]
    fn unknown_category_keeps_raw_reading() {
        let mut rng = StdRng::seed_from_u64(5);
        let observation = resolve_observation(
            &ProjectCategory::parse("Canal"),
            None,
            ValidityRule::ExactZero,
            &mut rng,
        );
        assert_eq!(observation.value, None);
        assert!(!observation.synthetic);

        let report = DecisionEngine::default().analyze("Canal", &SatelliteData::reading(0.0));
        assert_eq!(report.verdict, Verdict::UnknownProjectType);
        assert!(report.risk_flag);
        assert_eq!(report.calculated_index, 0.0);
    }

    #[test]
    fn unknown_category_report_survives_json_round_trip() {
        let payload = serde_json::json!({ "ndvi_mean": "NaN", "image_count": 3 });
        let data = parse_satellite_payload(&payload).expect("payload parses");
        let report = DecisionEngine::default().analyze("Canal", &data);
        assert_eq!(report.calculated_index, 0.0);

        let json = serde_json::to_string(&report).expect("serialize");
        let back: AnalysisReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, report);
    }

    #[test]
    fn non_finite_raw_reading_is_never_reported() {
        let mut rng = StdRng::seed_from_u64(8);
        for raw in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let observation = resolve_observation(
                &ProjectCategory::parse("Canal"),
                Some(raw),
                ValidityRule::ExactZero,
                &mut rng,
            );
            assert_eq!(observation.value, None);
            assert_eq!(observation.index(), 0.0);
        }
    }

    #[test]
    fn near_zero_rule_replaces_tiny_readings() {
        let engine = DecisionEngine::new(ValidityRule::NearZero, Some(3));
        let report = engine.analyze("Road", &SatelliteData::reading(5e-5));
        assert_ne!(report.calculated_index, 5e-5);

        let exact = DecisionEngine::new(ValidityRule::ExactZero, Some(3));
        let report = exact.analyze("Road", &SatelliteData::reading(5e-5));
        assert_eq!(report.calculated_index, 5e-5);
    }

    #[test]
    fn seeded_engine_is_reproducible() {
        let engine = DecisionEngine::new(ValidityRule::ExactZero, Some(77));
        let data = SatelliteData::default();
        assert_eq!(engine.analyze("Bridge", &data), engine.analyze("Bridge", &data));
    }
}
