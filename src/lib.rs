//! Rooftop solar suitability analysis over building footprints.
//!
//! Feed a [`BuildingCollection`] in a projected reference through
//! [`pipeline::run`] and read the ranked result back through the
//! [`query`] views, or drive the stages in `roof`, `shading`, `energy`,
//! and `ranking` individually.

pub mod building;
pub mod energy;
pub mod error;
pub mod geom;
pub mod io;
pub mod kdtree;
pub mod ordering;
pub mod pipeline;
pub mod query;
pub mod ranking;
pub mod roof;
pub mod shading;
pub mod spatial;

// Prelude
pub use building::{Building, BuildingCollection, BuildingId, Crs, RoofType};
pub use error::{Result, SolarError};
pub use geom::point::Point;
pub use geom::polygon::Polygon;
pub use kdtree::KdTree;
pub use pipeline::PipelineConfig;
pub use ranking::Category;
pub use spatial::SpatialIndex;
