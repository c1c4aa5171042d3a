//! Reading and writing building collections as JSON.
//!
//! The on-disk form is the serde representation of
//! [`BuildingCollection`](crate::BuildingCollection): derived fields are
//! present only once a stage has filled them, so a file written mid-run
//! reads back into the same mid-run state.
//!
//! JSON has no notation for non-finite numbers. An infinite payback
//! (a roof that never recoups its cost) is written as `null` and reads
//! back as an absent value.

use crate::building::BuildingCollection;
use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Writes a collection to `path`, replacing any existing file.
pub fn write_collection(path: impl AsRef<Path>, collection: &BuildingCollection) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer(writer, collection)?;
    Ok(())
}

/// Reads a collection from `path`.
pub fn read_collection(path: impl AsRef<Path>) -> Result<BuildingCollection> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let collection = serde_json::from_reader(reader)?;
    Ok(collection)
}
