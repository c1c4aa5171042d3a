//! Annual energy yield and the financial figures derived from it.
//!
//! All formulas are annual steady-state estimates. Degenerate inputs
//! (no roof area, no irradiance, zero install cost) produce defined
//! neutral values so a district run never aborts on bad cadastre rows.

use crate::building::BuildingCollection;
use crate::error::{Result, SolarError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Module efficiency assumed for unspecified installations.
pub const DEFAULT_PANEL_EFFICIENCY: f64 = 0.18;

/// Feed-in energy price, EUR per kWh.
pub const DEFAULT_ENERGY_PRICE_PER_KWH: f64 = 0.25;

/// Turnkey install cost, EUR per square meter of roof.
pub const DEFAULT_INSTALL_COST_PER_M2: f64 = 200.0;

/// Annual horizontal irradiance assumed when a building carries none,
/// kWh/m2/yr. Round mid-latitude figure.
pub const DEFAULT_IRRADIANCE_KWH_M2: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyConfig {
    /// Module efficiency, fraction in (0, 1].
    pub panel_efficiency: f64,
    /// Energy price, EUR per kWh.
    pub energy_price_per_kwh: f64,
    /// Install cost, EUR per m2 of roof.
    pub install_cost_per_m2: f64,
    /// Irradiance fallback for buildings without a measured value,
    /// kWh/m2/yr.
    pub default_irradiance: f64,
}

impl EnergyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<()> {
        if !self.panel_efficiency.is_finite()
            || self.panel_efficiency <= 0.0
            || self.panel_efficiency > 1.0
        {
            return Err(SolarError::InvalidArgument(format!(
                "panel efficiency must be in (0, 1], got {}",
                self.panel_efficiency
            )));
        }
        for (name, value) in [
            ("energy price", self.energy_price_per_kwh),
            ("install cost", self.install_cost_per_m2),
            ("default irradiance", self.default_irradiance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SolarError::InvalidArgument(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            panel_efficiency: DEFAULT_PANEL_EFFICIENCY,
            energy_price_per_kwh: DEFAULT_ENERGY_PRICE_PER_KWH,
            install_cost_per_m2: DEFAULT_INSTALL_COST_PER_M2,
            default_irradiance: DEFAULT_IRRADIANCE_KWH_M2,
        }
    }
}

/// Annual energy yield of a roof, kWh/yr.
///
/// `area * irradiance * efficiency * (1 - shading)`. A shading factor
/// outside `[0, 1]` is a caller bug and errors; roofs without area or
/// irradiance simply yield 0.
pub fn solar_potential(
    area_m2: f64,
    irradiance_kwh_m2: f64,
    efficiency: f64,
    shading_factor: f64,
) -> Result<f64> {
    if !(0.0..=1.0).contains(&shading_factor) {
        return Err(SolarError::InvalidArgument(format!(
            "shading factor must be within [0, 1], got {}",
            shading_factor
        )));
    }
    if area_m2 <= 0.0 || irradiance_kwh_m2 <= 0.0 {
        return Ok(0.0);
    }
    Ok(area_m2 * irradiance_kwh_m2 * efficiency * (1.0 - shading_factor))
}

/// First-year return on investment, percent. Negative when the install
/// cost exceeds the annual revenue, which is the normal case.
///
/// Roofs with no area or no install cost have no investment to relate to
/// and yield 0.
pub fn roi(energy_kwh: f64, energy_price: f64, cost_per_m2: f64, area_m2: f64) -> f64 {
    let cost = area_m2 * cost_per_m2;
    if area_m2 <= 0.0 || cost <= 0.0 {
        return 0.0;
    }
    let revenue = energy_kwh * energy_price;
    (revenue - cost) / cost * 100.0
}

/// Years until the install cost is recovered.
///
/// A roof with no area, no yield, or no revenue never pays back and
/// yields positive infinity. A zero-cost install on a producing roof
/// pays back immediately.
pub fn payback_years(energy_kwh: f64, energy_price: f64, cost_per_m2: f64, area_m2: f64) -> f64 {
    let revenue = energy_kwh * energy_price;
    if area_m2 <= 0.0 || energy_kwh <= 0.0 || revenue <= 0.0 {
        return f64::INFINITY;
    }
    area_m2 * cost_per_m2 / revenue
}

/// Attaches energy yield, ROI, and payback to every building.
///
/// Buildings missing an irradiance value fall back to the configured
/// default; buildings the shading stage has not touched are treated as
/// unshaded.
pub fn estimate_energy(
    collection: BuildingCollection,
    config: &EnergyConfig,
) -> Result<BuildingCollection> {
    config.validate()?;
    let (crs, mut buildings) = collection.into_parts();
    for b in buildings.iter_mut() {
        let area = b.area.unwrap_or_else(|| b.footprint.area());
        let irradiance = b.irradiance.unwrap_or(config.default_irradiance);
        let shading = b.shading_factor.unwrap_or(0.0);
        let energy = solar_potential(area, irradiance, config.panel_efficiency, shading)?;
        b.energy_kwh = Some(energy);
        b.roi_percent = Some(roi(
            energy,
            config.energy_price_per_kwh,
            config.install_cost_per_m2,
            area,
        ));
        b.payback_years = Some(payback_years(
            energy,
            config.energy_price_per_kwh,
            config.install_cost_per_m2,
            area,
        ));
    }
    debug!(buildings = buildings.len(), "estimated energy and finances");
    Ok(BuildingCollection::from_parts(crs, buildings))
}
