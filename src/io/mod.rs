use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::Serialize;

pub mod annotation;
pub mod json_writer;
pub mod miso_bf;
pub mod miso_summary;
pub mod summary;
pub mod table;
pub mod tsv_writer;

/// Sentinel written for values that are not available.
pub const NOT_AVAILABLE: &str = "n/a";

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

pub(crate) fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let decoder = GzDecoder::new(file);
        Ok(Box::new(decoder))
    } else {
        Ok(Box::new(file))
    }
}

pub(crate) fn read_to_string_maybe_gz(path: &Path) -> Result<String> {
    let mut reader = open_maybe_gz(path)?;
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(content)
}

pub(crate) fn split_list(cell: &str) -> Vec<String> {
    cell.split(',').map(|v| v.trim().to_string()).collect()
}
