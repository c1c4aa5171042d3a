//! Spatial index over building centroids.
//!
//! The index is an immutable snapshot: build it once from a collection and
//! rebuild after the collection changes. Queries take `&self` only, so an
//! index can be shared across threads freely.

use crate::building::{BuildingCollection, BuildingId, Crs};
use crate::error::{Result, SolarError};
use crate::kdtree::{KdTree, Neighbor};
use crate::Point;

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree,
    ids: Vec<BuildingId>,
    crs: Crs,
}

impl SpatialIndex {
    /// Builds the index from the collection's footprint centroids.
    ///
    /// Centroids attached by the geometry stage are used as-is; buildings
    /// the stage has not touched yet get theirs computed here. Positions
    /// follow collection order.
    pub fn build(collection: &BuildingCollection) -> Result<Self> {
        collection.ensure_projected()?;
        let points: Vec<Point> = collection.iter().map(|b| b.centroid_or_computed()).collect();
        let tree = KdTree::build(&points)?;
        let ids = collection.iter().map(|b| b.id.clone()).collect();
        Ok(Self {
            tree,
            ids,
            crs: collection.crs(),
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Identifier of the building at a query position.
    pub fn id_at(&self, position: usize) -> Option<&BuildingId> {
        self.ids.get(position)
    }

    /// Errors when `other` is not the reference this index was built in.
    /// Guards against querying a stale index with reprojected data.
    pub fn ensure_same_crs(&self, other: Crs) -> Result<()> {
        if self.crs == other {
            Ok(())
        } else {
            Err(SolarError::CrsMismatch(self.crs, other))
        }
    }

    /// The `k` buildings whose centroids are closest to `query`, as
    /// collection positions with distances, ascending.
    pub fn k_nearest_positions(&self, query: Point, k: usize) -> Result<Vec<Neighbor>> {
        self.tree.k_nearest(query, k)
    }

    /// All buildings whose centroids lie within `radius` of `query`
    /// (boundary inclusive), as collection positions with distances,
    /// ascending.
    pub fn within_radius_positions(&self, query: Point, radius: f64) -> Result<Vec<Neighbor>> {
        self.tree.within_radius(query, radius)
    }

    /// Same as [`k_nearest_positions`](Self::k_nearest_positions) but
    /// resolved to building identifiers.
    pub fn k_nearest(&self, query: Point, k: usize) -> Result<Vec<(BuildingId, f64)>> {
        Ok(self.resolve(self.tree.k_nearest(query, k)?))
    }

    /// Same as [`within_radius_positions`](Self::within_radius_positions)
    /// but resolved to building identifiers.
    pub fn within_radius(&self, query: Point, radius: f64) -> Result<Vec<(BuildingId, f64)>> {
        Ok(self.resolve(self.tree.within_radius(query, radius)?))
    }

    fn resolve(&self, neighbors: Vec<Neighbor>) -> Vec<(BuildingId, f64)> {
        neighbors
            .into_iter()
            .map(|n| (self.ids[n.position].clone(), n.distance))
            .collect()
    }
}
