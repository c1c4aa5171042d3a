//! Roof attribute extraction.
//!
//! First pipeline stage. Computes footprint area, dominant orientation,
//! an estimated slope, and the centroid for every building. All values
//! come from the 2D footprint and the registered height; no 3D roof
//! geometry is available in cadastre extracts.

use crate::building::{BuildingCollection, RoofType};
use crate::error::Result;
use tracing::debug;

/// Slope assumed for flat roofs, degrees. Real flat roofs keep a small
/// drainage pitch.
pub const FLAT_SLOPE_DEG: f64 = 2.0;

/// Half-span of the reference cross-section used by the slope heuristic,
/// meters.
const SLOPE_REF_HALF_SPAN_M: f64 = 5.0;

/// Fraction of building height attributed to the roof rise.
const PITCHED_RISE_RATIO: f64 = 0.30;
const GABLED_RISE_RATIO: f64 = 0.45;

/// Estimated roof slope in degrees for a building of the given height.
///
/// Flat roofs get a small constant. Pitched and gabled roofs scale with
/// height: the rise is taken as a fixed fraction of the building height
/// over a reference half-span, so taller buildings of the same type always
/// report a steeper roof. Heights at or below zero yield the type's
/// minimum.
pub fn slope_degrees(height: f64, roof_type: RoofType) -> f64 {
    let rise_ratio = match roof_type {
        RoofType::Flat => return FLAT_SLOPE_DEG,
        RoofType::Pitched => PITCHED_RISE_RATIO,
        RoofType::Gabled => GABLED_RISE_RATIO,
    };
    let rise = rise_ratio * height.max(0.0);
    (rise / SLOPE_REF_HALF_SPAN_M).atan().to_degrees()
}

/// Attaches area, orientation, slope, and centroid to every building.
///
/// Errors when the collection is in a geographic reference; footprint
/// areas in degrees squared are meaningless.
pub fn derive_attributes(collection: BuildingCollection) -> Result<BuildingCollection> {
    collection.ensure_projected()?;
    let (crs, mut buildings) = collection.into_parts();
    for b in buildings.iter_mut() {
        b.area = Some(b.footprint.area());
        b.orientation = Some(b.footprint.orientation());
        b.slope = Some(slope_degrees(b.height, b.roof_type));
        b.centroid = Some(b.footprint.centroid());
    }
    debug!(buildings = buildings.len(), "derived roof attributes");
    Ok(BuildingCollection::from_parts(crs, buildings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::{Building, Crs};
    use crate::Polygon;

    #[test]
    fn test_flat_slope_ignores_height() {
        assert_eq!(slope_degrees(3.0, RoofType::Flat), FLAT_SLOPE_DEG);
        assert_eq!(slope_degrees(30.0, RoofType::Flat), FLAT_SLOPE_DEG);
    }

    #[test]
    fn test_slope_grows_with_height() {
        let low = slope_degrees(6.0, RoofType::Pitched);
        let high = slope_degrees(12.0, RoofType::Pitched);
        assert!(high > low, "taller building should report steeper roof");
    }

    #[test]
    fn test_gabled_is_steeper_than_pitched() {
        let pitched = slope_degrees(9.0, RoofType::Pitched);
        let gabled = slope_degrees(9.0, RoofType::Gabled);
        assert!(gabled > pitched);
    }

    #[test]
    fn test_slope_stays_in_plausible_range() {
        for h in [0.0, 3.0, 9.0, 30.0, 120.0] {
            for rt in [RoofType::Flat, RoofType::Pitched, RoofType::Gabled] {
                let slope = slope_degrees(h, rt);
                assert!((0.0..90.0).contains(&slope), "slope {slope} for h={h}");
            }
        }
    }

    #[test]
    fn test_derive_attributes_fills_all_fields() {
        let mut col = BuildingCollection::new(Crs::projected(28992));
        col.add(
            Building::new("b-1", Polygon::rectangle(0., 0., 20., 10.).unwrap(), 9.0)
                .unwrap()
                .with_roof_type(RoofType::Pitched),
        );
        let col = derive_attributes(col).unwrap();
        let b = col.get(0).unwrap();
        assert_eq!(b.area, Some(200.0));
        assert_eq!(b.orientation, Some(90.0));
        assert_eq!(b.slope, Some(slope_degrees(9.0, RoofType::Pitched)));
        assert!(b.centroid.unwrap().is_close(&crate::Point::new(10., 5.)));
    }

    #[test]
    fn test_geographic_collection_is_rejected() {
        let col = BuildingCollection::new(Crs::geographic(4326));
        assert!(derive_attributes(col).is_err());
    }
}
