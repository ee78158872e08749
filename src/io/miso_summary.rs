use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::io::{read_to_string_maybe_gz, split_list};

const EVENT_COLUMN: &str = "event_name";
const MEAN_COLUMN: &str = "miso_posterior_mean";
const LOW_COLUMN: &str = "ci_low";
const HIGH_COLUMN: &str = "ci_high";

/// One event of a per-sample summary. Multi-isoform events carry one value
/// per isoform; values are kept as the estimator wrote them.
#[derive(Debug, Clone, PartialEq)]
pub struct PsiRecord {
    pub event: String,
    pub low: Vec<String>,
    pub mean: Vec<String>,
    pub high: Vec<String>,
}

impl PsiRecord {
    pub fn isoforms(&self) -> usize {
        self.mean.len()
    }

    /// True when low/mean/high disagree on the isoform count.
    pub fn is_ragged(&self) -> bool {
        self.low.len() != self.mean.len() || self.high.len() != self.mean.len()
    }
}

pub fn read_miso_summary(path: &Path) -> Result<Vec<PsiRecord>> {
    let content = read_to_string_maybe_gz(path)?;
    parse_miso_summary(&content, &path.display().to_string())
}

pub fn parse_miso_summary(content: &str, source: &str) -> Result<Vec<PsiRecord>> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, header_line) = lines
        .next()
        .with_context(|| format!("{} is empty", source))?;
    let header: Vec<&str> = header_line
        .trim_start_matches('#')
        .split('\t')
        .map(str::trim)
        .collect();
    let col = |name: &str| -> Result<usize> {
        header
            .iter()
            .position(|h| *h == name)
            .with_context(|| format!("{} header is missing column '{}'", source, name))
    };
    let event_col = col(EVENT_COLUMN)?;
    let mean_col = col(MEAN_COLUMN)?;
    let low_col = col(LOW_COLUMN)?;
    let high_col = col(HIGH_COLUMN)?;
    let width = event_col.max(mean_col).max(low_col).max(high_col) + 1;

    let mut records = Vec::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < width {
            bail!(
                "{}:{} expected at least {} columns, got {}",
                source,
                line_no,
                width,
                fields.len()
            );
        }
        records.push(PsiRecord {
            event: fields[event_col].trim().to_string(),
            low: split_list(fields[low_col]),
            mean: split_list(fields[mean_col]),
            high: split_list(fields[high_col]),
        });
    }
    Ok(records)
}
