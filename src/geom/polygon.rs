//! Planar footprint polygon.
//!
//! A polygon stores its boundary as an open ring (no repeated closing
//! vertex). Degenerate rings with fewer than 3 distinct vertices are
//! allowed and yield zero area: upstream cadastre data contains them and
//! the analysis treats them as unusable roofs, not as errors.

use crate::error::{Result, SolarError};
use crate::geom::EPS;
use crate::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pts: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon from boundary vertices given in order.
    ///
    /// The ring may be passed open or explicitly closed (last vertex equal
    /// to the first); a closing vertex is normalized away. Non-finite
    /// coordinates are rejected.
    pub fn new(pts: Vec<Point>) -> Result<Self> {
        for (i, p) in pts.iter().enumerate() {
            if !p.is_finite() {
                return Err(SolarError::InvalidArgument(format!(
                    "polygon vertex {} is not finite: {}",
                    i, p
                )));
            }
        }
        let mut pts = pts;
        while pts.len() >= 2 && pts[pts.len() - 1].is_close(&pts[0]) {
            pts.pop();
        }
        Ok(Self { pts })
    }

    /// Axis-aligned rectangle with its lower-left corner at `(x, y)`.
    pub fn rectangle(x: f64, y: f64, width: f64, depth: f64) -> Result<Self> {
        Self::new(vec![
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + depth),
            Point::new(x, y + depth),
        ])
    }

    /// Boundary vertices without the closing vertex.
    pub fn vertices(&self) -> &[Point] {
        &self.pts
    }

    /// Boundary vertices with the first vertex repeated at the end.
    pub fn closed_ring(&self) -> Vec<Point> {
        let mut ring = self.pts.clone();
        if let Some(first) = self.pts.first() {
            ring.push(*first);
        }
        ring
    }

    pub fn num_vertices(&self) -> usize {
        self.pts.len()
    }

    /// Boundary edges in vertex order, wrapping from the last vertex back
    /// to the first. Rings with fewer than 2 vertices have no edges.
    pub fn edges(&self) -> Vec<(Point, Point)> {
        let n = self.pts.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n).map(|i| (self.pts[i], self.pts[(i + 1) % n])).collect()
    }

    /// Shoelace area of the ring, in square meters. Always non-negative.
    ///
    /// Degenerate rings yield 0. Self-intersecting rings yield the net
    /// magnitude of their signed lobes, which cancels toward 0 for a
    /// symmetric bowtie.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Total boundary length, in meters.
    pub fn perimeter(&self) -> f64 {
        self.edges().iter().map(|(a, b)| a.distance(b)).sum()
    }

    /// Azimuth of the longest boundary edge, in degrees clockwise from
    /// north (0 = north, 90 = east), folded into `[0, 360)`.
    ///
    /// The edge direction follows vertex order. Ties keep the earliest
    /// edge. Rings without a measurable edge yield 0.
    pub fn orientation(&self) -> f64 {
        let mut best_len = 0.0;
        let mut best_dir = None;
        for (a, b) in self.edges() {
            let len = a.distance(&b);
            if len > best_len {
                best_len = len;
                best_dir = Some((b.x - a.x, b.y - a.y));
            }
        }
        match best_dir {
            Some((dx, dy)) if best_len > EPS => dx.atan2(dy).to_degrees().rem_euclid(360.0),
            _ => 0.0,
        }
    }

    /// Area-weighted centroid of the ring.
    ///
    /// Falls back to the vertex mean when the ring encloses no measurable
    /// area. An empty ring yields the origin.
    pub fn centroid(&self) -> Point {
        let n = self.pts.len();
        if n == 0 {
            return Point::new(0.0, 0.0);
        }
        let twice_area = self.signed_area_raw();
        if twice_area.abs() < EPS {
            let sx: f64 = self.pts.iter().map(|p| p.x).sum();
            let sy: f64 = self.pts.iter().map(|p| p.y).sum();
            return Point::new(sx / n as f64, sy / n as f64);
        }
        // Coordinates are shifted to the first vertex so the cross terms
        // keep precision at survey-grid magnitudes.
        let origin = self.pts[0];
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let a = self.pts[i];
            let b = self.pts[(i + 1) % n];
            let (ax, ay) = (a.x - origin.x, a.y - origin.y);
            let (bx, by) = (b.x - origin.x, b.y - origin.y);
            let cross = ax * by - bx * ay;
            cx += (ax + bx) * cross;
            cy += (ay + by) * cross;
        }
        Point::new(
            origin.x + cx / (3.0 * twice_area),
            origin.y + cy / (3.0 * twice_area),
        )
    }

    fn signed_area(&self) -> f64 {
        self.signed_area_raw() / 2.0
    }

    fn signed_area_raw(&self) -> f64 {
        let n = self.pts.len();
        if n < 3 {
            return 0.0;
        }
        let origin = self.pts[0];
        let mut twice = 0.0;
        for i in 0..n {
            let a = self.pts[i];
            let b = self.pts[(i + 1) % n];
            twice += (a.x - origin.x) * (b.y - origin.y) - (b.x - origin.x) * (a.y - origin.y);
        }
        twice
    }
}
