//! Error types shared across the crate.

use crate::building::Crs;
use thiserror::Error;

/// Errors produced by the analysis stages.
///
/// Degenerate geometry (empty footprints, zero heights, zero costs) is not
/// an error anywhere in the crate. Those inputs flow through the math and
/// produce defined neutral results instead. Errors are reserved for inputs
/// that are outside a function's domain altogether.
#[derive(Error, Debug)]
pub enum SolarError {
    /// Out-of-domain argument caught at a function boundary.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Planar math was requested over a geographic (degree-based) reference.
    #[error("expected a projected coordinate reference, got {0}")]
    GeographicCrs(Crs),

    /// Two inputs carry different coordinate references.
    #[error("coordinate reference mismatch: {0} vs {1}")]
    CrsMismatch(Crs, Crs),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SolarError>;
