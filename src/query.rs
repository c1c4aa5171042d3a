//! Read-side views over an analyzed collection.
//!
//! Thin borrowing helpers a serving layer can map directly onto
//! endpoints. They never mutate and never recompute; everything shown
//! here was derived by the pipeline stages.

use crate::building::{Building, BuildingCollection, BuildingId};
use crate::ordering;
use crate::ranking::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-building summary for detail views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityBreakdown {
    pub id: BuildingId,
    pub score: f64,
    pub category: Category,
    pub area_m2: f64,
    pub energy_kwh: f64,
    pub roi_percent: f64,
    pub payback_years: f64,
}

/// Aggregated figures for one neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodSummary {
    pub neighborhood: String,
    pub buildings: usize,
    pub mean_score: f64,
    pub total_energy_kwh: f64,
}

/// Buildings scoring at least `min_score`, at most `limit` of them, in
/// collection order. Buildings without a score count as 0.
pub fn list_buildings(
    collection: &BuildingCollection,
    min_score: f64,
    limit: usize,
) -> Vec<&Building> {
    collection
        .iter()
        .filter(|b| b.score.unwrap_or(0.0) >= min_score)
        .take(limit)
        .collect()
}

/// The building carrying `id`, or None.
pub fn building_by_id<'a>(
    collection: &'a BuildingCollection,
    id: &BuildingId,
) -> Option<&'a Building> {
    ordering::find_by_id(collection, id)
}

/// Detail summary for a single building. None until the pipeline has
/// derived every figure the summary shows.
pub fn suitability_breakdown(b: &Building) -> Option<SuitabilityBreakdown> {
    Some(SuitabilityBreakdown {
        id: b.id.clone(),
        score: b.score?,
        category: b.category?,
        area_m2: b.area?,
        energy_kwh: b.energy_kwh?,
        roi_percent: b.roi_percent?,
        payback_years: b.payback_years?,
    })
}

/// The `top_n` ranked buildings, ascending by rank.
///
/// Operates on the ranked artifact: buildings without a rank are not
/// eligible and an unranked collection yields nothing.
pub fn priority(collection: &BuildingCollection, top_n: usize) -> Vec<&Building> {
    let mut ranked: Vec<&Building> = collection.iter().filter(|b| b.rank.is_some()).collect();
    ranked.sort_by_key(|b| b.rank);
    ranked.truncate(top_n);
    ranked
}

/// Mean score and total yield per neighborhood, best neighborhoods first,
/// names breaking ties.
///
/// Buildings without a neighborhood label cannot be drawn on a district
/// map and are left out.
pub fn aggregate_by_neighborhood(collection: &BuildingCollection) -> Vec<NeighborhoodSummary> {
    let mut groups: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for b in collection {
        let Some(name) = b.neighborhood.as_deref() else {
            continue;
        };
        let entry = groups.entry(name).or_default();
        entry.0 += 1;
        entry.1 += b.score.unwrap_or(0.0);
        entry.2 += b.energy_kwh.unwrap_or(0.0);
    }
    let mut summaries: Vec<NeighborhoodSummary> = groups
        .into_iter()
        .map(|(name, (count, score_sum, energy_sum))| NeighborhoodSummary {
            neighborhood: name.to_string(),
            buildings: count,
            mean_score: score_sum / count as f64,
            total_energy_kwh: energy_sum,
        })
        .collect();
    // BTreeMap iteration already ordered names ascending; the stable sort
    // keeps that order within equal means.
    summaries.sort_by(|a, b| b.mean_score.total_cmp(&a.mean_score));
    summaries
}
