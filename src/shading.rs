//! Inter-building shading estimation.
//!
//! Screening-level model over centroid distances: a neighbor can only
//! shade a building when it is strictly taller and its shadow, cast at the
//! configured sun elevation, reaches at least as far as the distance
//! between the two centroids. Individual obstructions combine like
//! partially overlapping covers rather than adding up, so the factor
//! saturates instead of exceeding full shade.

use crate::building::{Building, BuildingCollection};
use crate::error::{Result, SolarError};
use crate::spatial::SpatialIndex;
use crate::Point;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sun elevation used when none is configured, degrees above the horizon.
pub const DEFAULT_SUN_ELEVATION_DEG: f64 = 45.0;

/// Neighbor search radius used when none is configured, meters.
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadingConfig {
    /// Sun elevation above the horizon, degrees.
    pub sun_elevation_deg: f64,
    /// Radius around each centroid in which neighbors are considered,
    /// meters.
    pub search_radius_m: f64,
}

impl ShadingConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            sun_elevation_deg: DEFAULT_SUN_ELEVATION_DEG,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
        }
    }
}

/// Horizontal length of the shadow cast by an obstacle of `height` meters.
///
/// Defined as `height / tan(elevation)` for elevations strictly between 0
/// and 90 degrees. Outside that range the sun is below the horizon or at
/// zenith and no usable shadow exists, so the length is 0. Heights at or
/// below zero also cast no shadow.
pub fn shadow_length(height: f64, sun_elevation_deg: f64) -> f64 {
    if height <= 0.0 || !(sun_elevation_deg > 0.0 && sun_elevation_deg < 90.0) {
        return 0.0;
    }
    height / sun_elevation_deg.to_radians().tan()
}

/// Obstruction contributed by a single neighbor, in `[0, 1]`.
///
/// Zero unless the neighbor is strictly taller and its shadow reaches the
/// target. Within reach, the contribution grows as the neighbor gets
/// closer and as the height margin widens.
fn obstruction(
    target_height: f64,
    neighbor_height: f64,
    distance: f64,
    sun_elevation_deg: f64,
) -> f64 {
    if neighbor_height <= target_height {
        return 0.0;
    }
    let reach = shadow_length(neighbor_height, sun_elevation_deg);
    if reach <= 0.0 || distance > reach {
        return 0.0;
    }
    let proximity = 1.0 - distance / reach;
    let exposure = 1.0 - target_height.max(0.0) / neighbor_height;
    proximity * exposure
}

/// Combined shading factor for a roof, in `[0, 1]`.
///
/// `neighbors` holds `(height, centroid_distance)` pairs. Contributions
/// combine as overlapping covers: `1 - prod(1 - o_i)`. Adding a neighbor
/// never lowers the factor, and no neighbor set pushes it past 1. An empty
/// neighborhood yields 0.
pub fn shading_factor(
    target_height: f64,
    neighbors: &[(f64, f64)],
    sun_elevation_deg: f64,
) -> f64 {
    let mut unshaded = 1.0;
    for &(height, distance) in neighbors {
        unshaded *= 1.0 - obstruction(target_height, height, distance, sun_elevation_deg);
    }
    (1.0 - unshaded).clamp(0.0, 1.0)
}

/// Buildings whose centroids lie within `radius` of the target's centroid,
/// the target itself excluded, ascending by distance.
///
/// The index must have been built from `collection`; a stale index is
/// rejected rather than silently resolving to the wrong buildings.
pub fn find_neighbors<'a>(
    target: &Building,
    collection: &'a BuildingCollection,
    index: &SpatialIndex,
    radius: f64,
) -> Result<Vec<(&'a Building, f64)>> {
    index.ensure_same_crs(collection.crs())?;
    if index.len() != collection.len() {
        return Err(SolarError::InvalidArgument(format!(
            "index holds {} buildings but the collection has {}",
            index.len(),
            collection.len()
        )));
    }
    let centroid = target.centroid_or_computed();
    let hits = index.within_radius_positions(centroid, radius)?;
    Ok(hits
        .into_iter()
        .filter_map(|n| {
            let b = collection.get(n.position)?;
            (b.id != target.id).then_some((b, n.distance))
        })
        .collect())
}

/// Attaches a shading factor to every building in the collection.
///
/// Builds a centroid index once, then evaluates buildings in parallel.
/// Isolated buildings get a factor of 0.
pub fn estimate_shading(
    collection: BuildingCollection,
    config: &ShadingConfig,
) -> Result<BuildingCollection> {
    collection.ensure_projected()?;
    if !config.sun_elevation_deg.is_finite() {
        return Err(SolarError::InvalidArgument(format!(
            "sun elevation must be finite, got {}",
            config.sun_elevation_deg
        )));
    }
    if !config.search_radius_m.is_finite() || config.search_radius_m < 0.0 {
        return Err(SolarError::InvalidArgument(format!(
            "search radius must be finite and non-negative, got {}",
            config.search_radius_m
        )));
    }

    let index = SpatialIndex::build(&collection)?;
    let snapshot: Vec<(Point, f64)> = collection
        .iter()
        .map(|b| (b.centroid_or_computed(), b.height))
        .collect();

    let factors: Vec<f64> = (0..snapshot.len())
        .into_par_iter()
        .map(|i| {
            let (centroid, height) = snapshot[i];
            let hits = index.within_radius_positions(centroid, config.search_radius_m)?;
            let neighbors: Vec<(f64, f64)> = hits
                .into_iter()
                .filter(|n| n.position != i)
                .map(|n| (snapshot[n.position].1, n.distance))
                .collect();
            Ok(shading_factor(height, &neighbors, config.sun_elevation_deg))
        })
        .collect::<Result<Vec<_>>>()?;

    let (crs, mut buildings) = collection.into_parts();
    for (b, factor) in buildings.iter_mut().zip(factors) {
        b.shading_factor = Some(factor);
    }
    debug!(buildings = buildings.len(), "estimated shading factors");
    Ok(BuildingCollection::from_parts(crs, buildings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::Crs;
    use crate::Polygon;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_shadow_length_at_45_degrees_equals_height() {
        assert!(close(shadow_length(10.0, 45.0), 10.0));
    }

    #[test]
    fn test_shadow_length_at_30_degrees() {
        // tan(30 deg) = 1/sqrt(3), so the shadow is sqrt(3) times the height.
        assert!((shadow_length(10.0, 30.0) - 17.320508).abs() < 1e-5);
    }

    #[test]
    fn test_shadow_length_degenerate_inputs() {
        assert_eq!(shadow_length(10.0, 0.0), 0.0);
        assert_eq!(shadow_length(10.0, 90.0), 0.0);
        assert_eq!(shadow_length(10.0, -15.0), 0.0);
        assert_eq!(shadow_length(10.0, 180.0), 0.0);
        assert_eq!(shadow_length(0.0, 45.0), 0.0);
        assert_eq!(shadow_length(10.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_single_neighbor_factor() {
        // Neighbor 20 m tall at 5 m, sun at 45 deg: reach 20 m,
        // proximity 0.75, exposure 0.5.
        let factor = shading_factor(10.0, &[(20.0, 5.0)], 45.0);
        assert!(close(factor, 0.375), "got {factor}");
    }

    #[test]
    fn test_shorter_and_equal_neighbors_do_not_shade() {
        assert_eq!(shading_factor(10.0, &[(5.0, 1.0)], 45.0), 0.0);
        assert_eq!(shading_factor(10.0, &[(10.0, 1.0)], 45.0), 0.0);
    }

    #[test]
    fn test_neighbor_beyond_shadow_reach_does_not_shade() {
        // Reach is 20 m at 45 deg; the neighbor sits 25 m away.
        assert_eq!(shading_factor(10.0, &[(20.0, 25.0)], 45.0), 0.0);
    }

    #[test]
    fn test_no_neighbors_means_no_shade() {
        assert_eq!(shading_factor(10.0, &[], 45.0), 0.0);
    }

    #[test]
    fn test_factors_combine_like_covers() {
        let single = shading_factor(10.0, &[(20.0, 5.0)], 45.0);
        let double = shading_factor(10.0, &[(20.0, 5.0), (20.0, 5.0)], 45.0);
        assert!(double > single, "second neighbor must add shade");
        assert!(
            double < 2.0 * single,
            "overlapping covers must not add linearly"
        );
        assert!(close(double, 1.0 - (1.0 - single) * (1.0 - single)));
    }

    #[test]
    fn test_factor_never_exceeds_one() {
        let neighbors: Vec<(f64, f64)> = (0..50).map(|_| (100.0, 0.5)).collect();
        let factor = shading_factor(1.0, &neighbors, 45.0);
        assert!((0.0..=1.0).contains(&factor));
        // Full shade: a taller neighbor directly on top of a ground-level roof.
        assert_eq!(shading_factor(0.0, &[(10.0, 0.0)], 45.0), 1.0);
    }

    fn district() -> BuildingCollection {
        let mut col = BuildingCollection::new(Crs::projected(28992));
        let short = Building::new("short", Polygon::rectangle(0., 0., 10., 10.).unwrap(), 5.0);
        let tall = Building::new("tall", Polygon::rectangle(15., 0., 10., 10.).unwrap(), 30.0);
        let far = Building::new(
            "far",
            Polygon::rectangle(10_000., 0., 10., 10.).unwrap(),
            30.0,
        );
        col.add(short.unwrap());
        col.add(tall.unwrap());
        col.add(far.unwrap());
        col
    }

    #[test]
    fn test_estimate_shading_marks_overshadowed_roofs() {
        let col = estimate_shading(district(), &ShadingConfig::default()).unwrap();
        let short = col.get(0).unwrap().shading_factor.unwrap();
        let tall = col.get(1).unwrap().shading_factor.unwrap();
        let far = col.get(2).unwrap().shading_factor.unwrap();
        assert!(short > 0.0, "short building sits in the tall one's shadow");
        assert_eq!(tall, 0.0, "nothing overtops the tall building");
        assert_eq!(far, 0.0, "isolated building is unshaded");
    }

    #[test]
    fn test_estimate_shading_rejects_bad_config() {
        let nan_elevation = ShadingConfig {
            sun_elevation_deg: f64::NAN,
            ..ShadingConfig::default()
        };
        assert!(estimate_shading(district(), &nan_elevation).is_err());
        let negative_radius = ShadingConfig {
            search_radius_m: -1.0,
            ..ShadingConfig::default()
        };
        assert!(estimate_shading(district(), &negative_radius).is_err());
    }

    #[test]
    fn test_find_neighbors_excludes_target_and_sorts_by_distance() {
        let col = district();
        let index = SpatialIndex::build(&col).unwrap();
        let target = col.get(0).unwrap();
        let neighbors = find_neighbors(target, &col, &index, 100.0).unwrap();
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].0.id.as_str(), "tall");
        assert!(close(neighbors[0].1, 15.0));
    }

    #[test]
    fn test_find_neighbors_rejects_stale_index() {
        let col = district();
        let index = SpatialIndex::build(&col).unwrap();
        let mut grown = col.clone();
        grown.add(
            Building::new("extra", Polygon::rectangle(40., 0., 10., 10.).unwrap(), 9.0).unwrap(),
        );
        let target = grown.get(0).unwrap().clone();
        assert!(find_neighbors(&target, &grown, &index, 100.0).is_err());
    }
}
