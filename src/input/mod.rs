use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const SUMMARY_SUFFIX: &str = ".miso_summary";
pub const COMPARISON_SUFFIX: &str = ".miso_bf";
pub const PAIR_SEPARATOR: &str = "_vs_";

pub fn comparison_name(sample_a: &str, sample_b: &str) -> String {
    format!("{}{}{}", sample_a, PAIR_SEPARATOR, sample_b)
}

/// `<dir>/<sample>.miso_summary`, or its `.gz` sibling.
pub fn resolve_summary_path(dir: &Path, sample: &str) -> Option<PathBuf> {
    first_existing(dir, &format!("{}{}", sample, SUMMARY_SUFFIX))
}

/// Comparison files are pair-symmetric: `a_vs_b` is tried before `b_vs_a`.
pub fn resolve_comparison_path(dir: &Path, sample_a: &str, sample_b: &str) -> Option<PathBuf> {
    first_existing(
        dir,
        &format!("{}{}", comparison_name(sample_a, sample_b), COMPARISON_SUFFIX),
    )
    .or_else(|| {
        first_existing(
            dir,
            &format!("{}{}", comparison_name(sample_b, sample_a), COMPARISON_SUFFIX),
        )
    })
}

fn first_existing(dir: &Path, file_name: &str) -> Option<PathBuf> {
    let plain = dir.join(file_name);
    if plain.is_file() {
        return Some(plain);
    }
    let gz = dir.join(format!("{}.gz", file_name));
    if gz.is_file() {
        return Some(gz);
    }
    None
}

/// Sample names of every summary file in `dir`, sorted.
pub fn discover_summary_samples(dir: &Path) -> Result<Vec<String>> {
    let mut samples = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let stem = name.strip_suffix(".gz").unwrap_or(&name);
        if let Some(sample) = stem.strip_suffix(SUMMARY_SUFFIX) {
            samples.push(sample.to_string());
        }
    }
    samples.sort();
    samples.dedup();
    Ok(samples)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonDir {
    pub name: String,
    pub sample_a: String,
    pub sample_b: String,
    pub raw_bf_path: PathBuf,
}

/// Raw estimator comparison directories: `<dir>/<a>_vs_<b>/bayes-factors/<a>_vs_<b>.miso_bf`.
pub fn discover_comparison_dirs(dir: &Path) -> Result<Vec<ComparisonDir>> {
    let mut found = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let Some((a, b)) = name.split_once(PAIR_SEPARATOR) else {
            continue;
        };
        let bf_dir = entry.path().join("bayes-factors");
        let Some(raw_bf_path) = first_existing(&bf_dir, &format!("{}{}", name, COMPARISON_SUFFIX))
        else {
            tracing::warn!(comparison = %name, "comparison directory has no Bayes factor file");
            continue;
        };
        found.push(ComparisonDir {
            sample_a: a.to_string(),
            sample_b: b.to_string(),
            name,
            raw_bf_path,
        });
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}
