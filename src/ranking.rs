//! Suitability scoring and ranking.
//!
//! The score is a weighted sum of four normalized components: roof area,
//! annual energy yield, freedom from shading, and how closely the roof
//! faces south. Weights are applied exactly as given and never
//! renormalized, so non-default weights deliberately move the score range.

use crate::building::BuildingCollection;
use crate::error::{Result, SolarError};
use crate::ordering::{self, Order};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const W_AREA: f64 = 0.2;
pub const W_ENERGY: f64 = 0.4;
pub const W_SHADING: f64 = 0.2;
pub const W_ORIENTATION: f64 = 0.2;

/// Roof area at which the area component saturates, m2.
pub const AREA_SCALE_M2: f64 = 500.0;

/// Annual yield at which the energy component saturates, kWh/yr.
pub const ENERGY_SCALE_KWH: f64 = 50_000.0;

/// Ideal roof azimuth in the northern hemisphere, degrees.
pub const SOUTH_AZIMUTH_DEG: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityWeights {
    pub area: f64,
    pub energy: f64,
    pub shading: f64,
    pub orientation: f64,
}

impl SuitabilityWeights {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("area", self.area),
            ("energy", self.energy),
            ("shading", self.shading),
            ("orientation", self.orientation),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(SolarError::InvalidArgument(format!(
                    "{} weight must be finite and non-negative, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }
}

impl Default for SuitabilityWeights {
    fn default() -> Self {
        Self {
            area: W_AREA,
            energy: W_ENERGY,
            shading: W_SHADING,
            orientation: W_ORIENTATION,
        }
    }
}

/// Suitability band. Ordered so that a better band compares greater.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    Unsuitable,
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Excellent => "Excellent",
            Category::Good => "Good",
            Category::Moderate => "Moderate",
            Category::Poor => "Poor",
            Category::Unsuitable => "Unsuitable",
        };
        write!(f, "{}", name)
    }
}

/// Weighted suitability score, around `[0, 100]` for the default weights.
///
/// Area and energy are scaled against fixed saturation points and capped
/// at full contribution; values beyond the cap stop mattering. Negative
/// area or energy scores as zero. The orientation is folded into
/// `[0, 360)` first, so -90 and 270 degrees score identically. The
/// shading factor must be a valid fraction.
pub fn suitability_score(
    area_m2: f64,
    energy_kwh: f64,
    shading_factor: f64,
    orientation_deg: f64,
    weights: &SuitabilityWeights,
) -> Result<f64> {
    weights.validate()?;
    if !(0.0..=1.0).contains(&shading_factor) {
        return Err(SolarError::InvalidArgument(format!(
            "shading factor must be within [0, 1], got {}",
            shading_factor
        )));
    }
    if !orientation_deg.is_finite() {
        return Err(SolarError::InvalidArgument(format!(
            "orientation must be finite, got {}",
            orientation_deg
        )));
    }
    let area_score = (area_m2 / AREA_SCALE_M2).clamp(0.0, 1.0);
    let energy_score = (energy_kwh / ENERGY_SCALE_KWH).clamp(0.0, 1.0);
    let shading_score = 1.0 - shading_factor;
    let folded = orientation_deg.rem_euclid(360.0);
    let orientation_score = 1.0 - (folded - SOUTH_AZIMUTH_DEG).abs() / SOUTH_AZIMUTH_DEG;

    let combined = weights.area * area_score
        + weights.energy * energy_score
        + weights.shading * shading_score
        + weights.orientation * orientation_score;
    Ok(combined * 100.0)
}

/// Band for a score. Boundaries belong to the better band; anything
/// below 20, including NaN, is unsuitable.
pub fn classify(score: f64) -> Category {
    if score >= 80.0 {
        Category::Excellent
    } else if score >= 60.0 {
        Category::Good
    } else if score >= 40.0 {
        Category::Moderate
    } else if score >= 20.0 {
        Category::Poor
    } else {
        Category::Unsuitable
    }
}

/// Orders the collection by descending score and assigns dense ranks
/// starting at 1.
///
/// The sort is stable, so equal scores keep their relative input order
/// and get consecutive ranks. Buildings without a score rank as 0.
pub fn rank(collection: BuildingCollection) -> BuildingCollection {
    let (crs, mut buildings) = collection.into_parts();
    ordering::sort_by_key_f64(&mut buildings, Order::Descending, |b| {
        b.score.unwrap_or(0.0)
    });
    for (i, b) in buildings.iter_mut().enumerate() {
        b.rank = Some(i + 1);
    }
    BuildingCollection::from_parts(crs, buildings)
}

/// The `top_n` best buildings as a ranked collection.
///
/// Selection matches a full descending sort truncated to `top_n`, ranks
/// run 1 through the returned length. Zero asks for nothing and yields an
/// empty collection; asking beyond the input yields everything.
pub fn priority_list(collection: BuildingCollection, top_n: usize) -> BuildingCollection {
    let (crs, buildings) = collection.into_parts();
    let mut winners = ordering::top_k_by(&buildings, top_n, |b| b.score.unwrap_or(0.0));
    for (i, b) in winners.iter_mut().enumerate() {
        b.rank = Some(i + 1);
    }
    BuildingCollection::from_parts(crs, winners)
}

/// Scores, classifies, and ranks every building in the collection.
///
/// Derived fields a building is missing are treated as 0 before scoring.
/// Buildings are scored in parallel; the final order is fixed by the
/// stable rank sort, not by scheduling.
pub fn score_and_rank(
    collection: BuildingCollection,
    weights: &SuitabilityWeights,
) -> Result<BuildingCollection> {
    let (crs, mut buildings) = collection.into_parts();
    buildings.par_iter_mut().try_for_each(|b| {
        let score = suitability_score(
            b.area.unwrap_or(0.0),
            b.energy_kwh.unwrap_or(0.0),
            b.shading_factor.unwrap_or(0.0),
            b.orientation.unwrap_or(0.0),
            weights,
        )?;
        let category = classify(score);
        debug!("scored {}: {:.1} ({})", b.id, score, category);
        b.score = Some(score);
        b.category = Some(category);
        Ok(())
    })?;
    Ok(rank(BuildingCollection::from_parts(crs, buildings)))
}
