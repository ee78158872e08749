use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::input;
use crate::io::annotation::{Annotation, AnnotationLookup};
use crate::io::table::Table;
use crate::io::{read_to_string_maybe_gz, split_list};

const EVENT_COLUMN: &str = "event_name";
const BF_COLUMN: &str = "bayes_factor";
const MAX_BF_COLUMN: &str = "max_bf";
// Position of bayes_factor in raw estimator output when no header names it.
const RAW_BF_INDEX: usize = 8;

/// One event of a pairwise comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRecord {
    pub event: String,
    pub bayes_factors: Vec<String>,
    pub max_bf: Option<String>,
    pub annotation: Option<Annotation>,
}

pub fn read_comparison(path: &Path) -> Result<Vec<ComparisonRecord>> {
    let content = read_to_string_maybe_gz(path)?;
    parse_comparison(&content, &path.display().to_string())
}

pub fn parse_comparison(content: &str, source: &str) -> Result<Vec<ComparisonRecord>> {
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
    let find = |name: &str| header.iter().position(|h| *h == name);

    let event_col = find(EVENT_COLUMN).unwrap_or(0);
    let bf_col =
        find(BF_COLUMN).with_context(|| format!("{} header has no '{}'", source, BF_COLUMN))?;
    let max_col = find(MAX_BF_COLUMN);
    let annot_cols = match (find("gene"), find("symb"), find("desc")) {
        (Some(g), Some(s), Some(d)) => Some((g, s, d)),
        _ => None,
    };

    let mut records = Vec::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split('\t').collect();
        let get = |col: usize| -> Result<&str> {
            fields.get(col).map(|f| f.trim()).with_context(|| {
                format!(
                    "{}:{} expected column {} but row has {} fields",
                    source,
                    line_no,
                    col + 1,
                    fields.len()
                )
            })
        };
        let annotation = match annot_cols {
            Some((g, s, d)) => Some(Annotation::new(get(g)?, get(s)?, get(d)?)),
            None => None,
        };
        records.push(ComparisonRecord {
            event: get(event_col)?.to_string(),
            bayes_factors: split_list(get(bf_col)?),
            max_bf: match max_col {
                Some(c) => Some(get(c)?.to_string()),
                None => None,
            },
            annotation,
        });
    }
    Ok(records)
}

pub fn max_bayes_factor(values: &[String]) -> Result<f64> {
    if values.is_empty() {
        bail!("empty Bayes factor list");
    }
    let mut max = f64::NEG_INFINITY;
    for v in values {
        let parsed: f64 = v
            .parse()
            .with_context(|| format!("invalid Bayes factor '{}'", v))?;
        if parsed > max {
            max = parsed;
        }
    }
    Ok(max)
}

pub fn annotated_header(sample_a: &str, sample_b: &str) -> Vec<String> {
    let mut header = vec!["#event_name".to_string()];
    for s in [sample_a, sample_b] {
        header.push(format!("{}_posterior_mean", s));
        header.push(format!("{}_ci_low", s));
        header.push(format!("{}_ci_high", s));
    }
    for name in ["diff", BF_COLUMN, "isoforms"] {
        header.push(name.to_string());
    }
    for s in [sample_a, sample_b] {
        header.push(format!("{}_counts", s));
        header.push(format!("{}_assigned_counts", s));
    }
    for name in [
        "chrom",
        "strand",
        "mRNA_starts",
        "mRNA_ends",
        MAX_BF_COLUMN,
        "gene",
        "symb",
        "desc",
    ] {
        header.push(name.to_string());
    }
    header
}

/// Turns raw estimator comparison output into an annotated comparison table:
/// appends `max_bf` and the event annotation, then ranks rows by `max_bf`.
pub fn summarize_raw_comparison(
    content: &str,
    source: &str,
    sample_a: &str,
    sample_b: &str,
    lookup: &dyn AnnotationLookup,
) -> Result<Table> {
    let mut bf_col = RAW_BF_INDEX;
    let mut ranked: Vec<(f64, Vec<String>)> = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<String> = line.split('\t').map(|f| f.trim().to_string()).collect();
        if line.trim_start_matches('#').starts_with(EVENT_COLUMN) {
            if let Some(pos) = fields.iter().position(|f| f == BF_COLUMN) {
                bf_col = pos;
            }
            continue;
        }
        let bf_cell = fields.get(bf_col).with_context(|| {
            format!("{}:{} row has no Bayes factor column", source, idx + 1)
        })?;
        let max = max_bayes_factor(&split_list(bf_cell))
            .with_context(|| format!("{}:{}", source, idx + 1))?;

        let mut row = fields;
        row.push(max.to_string());
        let annotation = lookup.resolve(&row[0]);
        row.extend(annotation.fields().iter().map(|f| f.to_string()));
        ranked.push((max, row));
    }

    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let mut table = Table::new(annotated_header(sample_a, sample_b));
    table.rows = ranked.into_iter().map(|(_, row)| row).collect();
    Ok(table)
}

/// Summarizes every `<a>_vs_<b>` comparison directory under `input_dir` into
/// `<out_dir>/<a>_vs_<b>.miso_bf`.
pub fn annotate_comparisons(
    input_dir: &Path,
    out_dir: &Path,
    lookup: &dyn AnnotationLookup,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let mut written = Vec::new();
    for found in input::discover_comparison_dirs(input_dir)? {
        let content = read_to_string_maybe_gz(&found.raw_bf_path)?;
        let table = summarize_raw_comparison(
            &content,
            &found.raw_bf_path.display().to_string(),
            &found.sample_a,
            &found.sample_b,
            lookup,
        )?;
        let out_path = out_dir.join(format!("{}{}", found.name, input::COMPARISON_SUFFIX));
        table.write(&out_path)?;
        info!(
            comparison = %found.name,
            events = table.rows.len(),
            out = %out_path.display(),
            "comparison_annotated"
        );
        written.push(out_path);
    }
    Ok(written)
}
