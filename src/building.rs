//! Building data model shared by every analysis stage.
//!
//! A [`Building`] starts with raw cadastre fields (footprint, height, roof
//! type) and is enriched in place as the stages run: geometry attributes,
//! shading factor, energy figures, and finally score, category, and rank.
//! Enriched fields are `Option` so a collection can be serialized at any
//! stage without inventing placeholder values.

use crate::error::{Result, SolarError};
use crate::ranking::Category;
use crate::{Point, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a building. Expected to be unique within a collection;
/// lookups return the first match when duplicates slip through.
#[derive(Eq, PartialEq, Hash, Debug, Clone, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(String);

impl BuildingId {
    /// Creates a new random identifier.
    pub fn random() -> Self {
        BuildingId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BuildingId {
    fn from(s: &str) -> Self {
        BuildingId(s.to_string())
    }
}

impl From<String> for BuildingId {
    fn from(s: String) -> Self {
        BuildingId(s)
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Roof construction type, used by the slope heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoofType {
    #[default]
    Flat,
    Pitched,
    Gabled,
}

impl fmt::Display for RoofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoofType::Flat => "flat",
            RoofType::Pitched => "pitched",
            RoofType::Gabled => "gabled",
        };
        write!(f, "{}", name)
    }
}

/// Coordinate reference tag carried by collections and the spatial index.
///
/// All planar math in the crate assumes meter-based projected coordinates.
/// Geographic (degree-based) references are rejected at stage boundaries
/// rather than silently producing meaningless distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crs {
    Projected { epsg: u32 },
    Geographic { epsg: u32 },
}

impl Crs {
    pub fn projected(epsg: u32) -> Self {
        Crs::Projected { epsg }
    }

    pub fn geographic(epsg: u32) -> Self {
        Crs::Geographic { epsg }
    }

    pub fn is_projected(&self) -> bool {
        matches!(self, Crs::Projected { .. })
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Projected { epsg } | Crs::Geographic { epsg } => *epsg,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Crs::Projected { epsg } => write!(f, "EPSG:{} (projected)", epsg),
            Crs::Geographic { epsg } => write!(f, "EPSG:{} (geographic)", epsg),
        }
    }
}

/// A single building and everything the pipeline has derived for it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub footprint: Polygon,
    /// Height above ground, meters. Never negative.
    pub height: f64,
    #[serde(default)]
    pub roof_type: RoofType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    /// Annual irradiance on the horizontal plane, kWh/m2/yr. Falls back to
    /// the configured default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irradiance: Option<f64>,

    // Derived by the geometry stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroid: Option<Point>,

    // Derived by the shading stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shading_factor: Option<f64>,

    // Derived by the energy stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payback_years: Option<f64>,

    // Derived by the ranking stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
}

impl Building {
    /// Creates a building from raw cadastre fields.
    ///
    /// Height must be finite and non-negative. Zero is a legal height and
    /// means the building cannot shade anything.
    pub fn new(id: impl Into<BuildingId>, footprint: Polygon, height: f64) -> Result<Self> {
        if !height.is_finite() || height < 0.0 {
            return Err(SolarError::InvalidArgument(format!(
                "building height must be finite and non-negative, got {}",
                height
            )));
        }
        Ok(Self {
            id: id.into(),
            footprint,
            height,
            roof_type: RoofType::default(),
            neighborhood: None,
            irradiance: None,
            area: None,
            orientation: None,
            slope: None,
            centroid: None,
            shading_factor: None,
            energy_kwh: None,
            roi_percent: None,
            payback_years: None,
            score: None,
            category: None,
            rank: None,
        })
    }

    pub fn with_roof_type(mut self, roof_type: RoofType) -> Self {
        self.roof_type = roof_type;
        self
    }

    pub fn with_neighborhood(mut self, name: &str) -> Self {
        self.neighborhood = Some(name.to_string());
        self
    }

    pub fn with_irradiance(mut self, kwh_per_m2: f64) -> Self {
        self.irradiance = Some(kwh_per_m2);
        self
    }

    /// Footprint centroid attached by the geometry stage, or computed on
    /// the fly when the stage has not run yet.
    pub fn centroid_or_computed(&self) -> Point {
        self.centroid.unwrap_or_else(|| self.footprint.centroid())
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Building({}, h={:.1}m)", self.id, self.height)
    }
}

/// An ordered set of buildings sharing one coordinate reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCollection {
    crs: Crs,
    buildings: Vec<Building>,
}

impl BuildingCollection {
    pub fn new(crs: Crs) -> Self {
        Self {
            crs,
            buildings: Vec::new(),
        }
    }

    pub fn from_parts(crs: Crs, buildings: Vec<Building>) -> Self {
        Self { crs, buildings }
    }

    pub fn into_parts(self) -> (Crs, Vec<Building>) {
        (self.crs, self.buildings)
    }

    pub fn add(&mut self, building: Building) {
        self.buildings.push(building);
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn get(&self, index: usize) -> Option<&Building> {
        self.buildings.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Building> {
        self.buildings.iter()
    }

    /// Errors unless the collection is in a projected reference.
    pub fn ensure_projected(&self) -> Result<()> {
        if self.crs.is_projected() {
            Ok(())
        } else {
            Err(SolarError::GeographicCrs(self.crs))
        }
    }
}

impl<'a> IntoIterator for &'a BuildingCollection {
    type Item = &'a Building;
    type IntoIter = std::slice::Iter<'a, Building>;

    fn into_iter(self) -> Self::IntoIter {
        self.buildings.iter()
    }
}
