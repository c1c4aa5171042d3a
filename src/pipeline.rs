//! Full suitability pipeline.
//!
//! Stages run in a fixed order, each consuming the collection and handing
//! back an enriched one: roof attributes, then shading, then energy and
//! finances, then score and rank. Any stage error aborts the run with the
//! collection untouched from the caller's point of view.

use crate::building::BuildingCollection;
use crate::energy::{self, EnergyConfig};
use crate::error::Result;
use crate::ranking::{self, SuitabilityWeights};
use crate::roof;
use crate::shading::{self, ShadingConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub shading: ShadingConfig,
    #[serde(default)]
    pub energy: EnergyConfig,
    #[serde(default)]
    pub weights: SuitabilityWeights,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Runs every analysis stage over the collection and returns it ranked.
///
/// The collection must be in a projected reference. An empty collection
/// is fine and comes back empty.
pub fn run(collection: BuildingCollection, config: &PipelineConfig) -> Result<BuildingCollection> {
    collection.ensure_projected()?;
    info!(
        buildings = collection.len(),
        crs = %collection.crs(),
        "starting suitability analysis"
    );
    let collection = roof::derive_attributes(collection)?;
    let collection = shading::estimate_shading(collection, &config.shading)?;
    let collection = energy::estimate_energy(collection, &config.energy)?;
    let ranked = ranking::score_and_rank(collection, &config.weights)?;
    info!(buildings = ranked.len(), "analysis finished");
    Ok(ranked)
}
