pub mod point;
pub mod polygon;

/// Geometric precision.
///
/// Coordinates are meters in a projected reference, so magnitudes around
/// 1e5 are typical and 1e-9 is far below any survey accuracy.
const EPS: f64 = 1e-9;
