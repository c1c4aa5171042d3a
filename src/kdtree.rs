//! 2-d tree over planar points.
//!
//! Construction takes O(n log n) via median splits on alternating axes,
//! which keeps the tree balanced regardless of insertion order. Queries
//! average O(log n) for clustered urban data; heavily duplicated or
//! collapsed point sets degrade toward O(n) per query but stay correct.
//!
//! Positions returned by queries refer to the slice the tree was built
//! from. Results are ordered by ascending distance, with the build
//! position breaking exact ties so repeated queries are deterministic.

use crate::error::{Result, SolarError};
use crate::Point;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A match returned by spatial queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the point in the slice the tree was built from.
    pub position: usize,
    /// Euclidean distance from the query point.
    pub distance: f64,
}

#[derive(Debug, Clone)]
struct Node {
    point: Point,
    position: usize,
    axis: u8,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl KdTree {
    /// Builds a tree from a slice of points. Duplicate and coincident
    /// points are fine. Non-finite coordinates are rejected.
    pub fn build(points: &[Point]) -> Result<Self> {
        for (i, p) in points.iter().enumerate() {
            if !p.is_finite() {
                return Err(SolarError::InvalidArgument(format!(
                    "point {} is not finite: {}",
                    i, p
                )));
            }
        }
        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = Self::build_rec(points, &mut order, 0, &mut nodes);
        Ok(Self { nodes, root })
    }

    fn build_rec(
        points: &[Point],
        order: &mut [usize],
        depth: usize,
        nodes: &mut Vec<Node>,
    ) -> Option<usize> {
        if order.is_empty() {
            return None;
        }
        let axis = (depth % 2) as u8;
        let mid = order.len() / 2;
        order.select_nth_unstable_by(mid, |&a, &b| {
            axis_coord(&points[a], axis).total_cmp(&axis_coord(&points[b], axis))
        });
        let position = order[mid];
        let (lower, rest) = order.split_at_mut(mid);
        let upper = &mut rest[1..];
        let left = Self::build_rec(points, lower, depth + 1, nodes);
        let right = Self::build_rec(points, upper, depth + 1, nodes);
        nodes.push(Node {
            point: points[position],
            position,
            axis,
            left,
            right,
        });
        Some(nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The `k` points closest to `query`, ascending by distance.
    ///
    /// Asking for more points than the tree holds returns all of them.
    /// `k` of zero is an error rather than a silent empty result.
    pub fn k_nearest(&self, query: Point, k: usize) -> Result<Vec<Neighbor>> {
        if k < 1 {
            return Err(SolarError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }
        if !query.is_finite() {
            return Err(SolarError::InvalidArgument(format!(
                "query point is not finite: {}",
                query
            )));
        }
        let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::new();
        self.nearest_rec(self.root, &query, k, &mut heap);
        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|e| Neighbor {
                position: e.position,
                distance: e.distance,
            })
            .collect())
    }

    fn nearest_rec(
        &self,
        node: Option<usize>,
        query: &Point,
        k: usize,
        heap: &mut BinaryHeap<HeapEntry>,
    ) {
        let Some(idx) = node else { return };
        let node = &self.nodes[idx];
        heap.push(HeapEntry {
            distance: node.point.distance(query),
            position: node.position,
        });
        if heap.len() > k {
            heap.pop();
        }
        let diff = axis_coord(query, node.axis) - axis_coord(&node.point, node.axis);
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        self.nearest_rec(near, query, k, heap);
        // The far side can only contain a winner if the splitting plane is
        // not farther away than the current worst candidate. Ties must be
        // visited, equal-distance points on the far side may win on position.
        let visit_far = heap.len() < k
            || heap
                .peek()
                .map_or(true, |worst| diff.abs() <= worst.distance);
        if visit_far {
            self.nearest_rec(far, query, k, heap);
        }
    }

    /// Every point within `radius` of `query` (boundary inclusive),
    /// ascending by distance.
    pub fn within_radius(&self, query: Point, radius: f64) -> Result<Vec<Neighbor>> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SolarError::InvalidArgument(format!(
                "radius must be finite and non-negative, got {}",
                radius
            )));
        }
        if !query.is_finite() {
            return Err(SolarError::InvalidArgument(format!(
                "query point is not finite: {}",
                query
            )));
        }
        let mut hits = Vec::new();
        self.radius_rec(self.root, &query, radius, &mut hits);
        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        Ok(hits)
    }

    fn radius_rec(&self, node: Option<usize>, query: &Point, radius: f64, hits: &mut Vec<Neighbor>) {
        let Some(idx) = node else { return };
        let node = &self.nodes[idx];
        let distance = node.point.distance(query);
        if distance <= radius {
            hits.push(Neighbor {
                position: node.position,
                distance,
            });
        }
        let diff = axis_coord(query, node.axis) - axis_coord(&node.point, node.axis);
        let (near, far) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        self.radius_rec(near, query, radius, hits);
        if diff.abs() <= radius {
            self.radius_rec(far, query, radius, hits);
        }
    }
}

fn axis_coord(p: &Point, axis: u8) -> f64 {
    if axis == 0 {
        p.x
    } else {
        p.y
    }
}

/// Max-heap entry: the worst candidate (largest distance, then largest
/// position) sits on top and is evicted first.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    distance: f64,
    position: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.position.cmp(&other.position))
    }
}
