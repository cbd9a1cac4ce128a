use std::ops::RangeInclusive;

use rand::Rng;
use tracing::warn;

use crate::analysis::{CategoryGroup, ProjectCategory};

/// Draw bands used when a site has no usable reading.
#[derive(Debug, Clone)]
pub struct SyntheticProfile {
    pub primary: RangeInclusive<f64>,
    pub alternate: Option<(f64, RangeInclusive<f64>)>,
}

/// Cleared or paved land most of the time, bush in one draw out of five.
pub const INFRASTRUCTURE_PROFILE: SyntheticProfile = SyntheticProfile {
    primary: 0.05..=0.18,
    alternate: Some((0.2, 0.45..=0.75)),
};

/// Open water, slightly perturbed.
pub const ENVIRONMENTAL_PROFILE: SyntheticProfile = SyntheticProfile {
    primary: -0.25..=-0.05,
    alternate: None,
};

impl SyntheticProfile {
    pub fn for_group(group: CategoryGroup) -> Option<Self> {
        match group {
            CategoryGroup::Infrastructure => Some(INFRASTRUCTURE_PROFILE),
            CategoryGroup::Environmental => Some(ENVIRONMENTAL_PROFILE),
            CategoryGroup::Unrecognized => None,
        }
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        if let Some((probability, band)) = &self.alternate {
            if rng.gen_bool(*probability) {
                return rng.gen_range(band.clone());
            }
        }
        rng.gen_range(self.primary.clone())
    }
}

/// Returns `None` for categories that have no fallback profile.
pub fn generate<R: Rng>(category: &ProjectCategory, rng: &mut R) -> Option<f64> {
    let profile = SyntheticProfile::for_group(category.group())?;
    let value = profile.draw(rng);
    warn!(
        category = %category,
        ndvi = value,
        "no usable satellite reading, substituting synthetic NDVI"
    );
    Some(value)
}
