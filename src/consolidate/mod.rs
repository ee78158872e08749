//! Merges per-sample PSI summaries and pairwise comparison tables into one
//! wide table keyed by event.
//!
//! Layout: `#Event`, then `<s>_low <s>_mean <s>_high` for every sample,
//! then one `<a>_vs_<b>` column per sample pair (a before b in sample order),
//! then `gene symb desc`.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::input;
use crate::io::NOT_AVAILABLE;
use crate::io::annotation::{Annotation, AnnotationLookup};
use crate::io::miso_bf::{ComparisonRecord, max_bayes_factor, read_comparison};
use crate::io::miso_summary::{PsiRecord, read_miso_summary};
use crate::io::table::Table;
use crate::schema::v1::IsoformMode;

/// Written for a pair whose comparison table has no row for the event.
pub const NEUTRAL_BF: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoformMismatch {
    pub event: String,
    pub column: String,
    pub expected: usize,
    pub found: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConsolidationStats {
    pub samples: usize,
    pub events: usize,
    pub missing_comparisons: Vec<String>,
    pub isoform_mismatches: Vec<IsoformMismatch>,
    /// Comparison rows whose event appears in no sample summary.
    pub comparison_only_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Consolidated {
    pub table: Table,
    pub stats: ConsolidationStats,
}

#[derive(Debug)]
struct EventEntry {
    event: String,
    psi: Vec<Option<[String; 3]>>,
    bf: Vec<Option<String>>,
    annotation: Option<Annotation>,
    isoforms: Option<usize>,
}

pub struct Consolidator {
    mode: IsoformMode,
    samples: Vec<String>,
    pairs: Vec<(usize, usize)>,
    index: HashMap<String, usize>,
    events: Vec<EventEntry>,
    stats: ConsolidationStats,
}

impl Consolidator {
    pub fn new(samples: Vec<String>, mode: IsoformMode, with_bf: bool) -> Self {
        let mut pairs = Vec::new();
        if with_bf {
            for i in 0..samples.len() {
                for j in (i + 1)..samples.len() {
                    pairs.push((i, j));
                }
            }
        }
        let stats = ConsolidationStats {
            samples: samples.len(),
            ..ConsolidationStats::default()
        };
        Self {
            mode,
            samples,
            pairs,
            index: HashMap::new(),
            events: Vec::new(),
            stats,
        }
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Pair columns as `(sample_a, sample_b)` in column order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.pairs
            .iter()
            .map(|&(i, j)| (self.samples[i].as_str(), self.samples[j].as_str()))
            .collect()
    }

    pub fn add_sample(&mut self, sample: usize, records: Vec<PsiRecord>) {
        let n_samples = self.samples.len();
        let n_pairs = self.pairs.len();
        for rec in records {
            let idx = match self.index.get(&rec.event) {
                Some(&idx) => idx,
                None => {
                    let idx = self.events.len();
                    self.index.insert(rec.event.clone(), idx);
                    self.events.push(EventEntry {
                        event: rec.event.clone(),
                        psi: vec![None; n_samples],
                        bf: vec![None; n_pairs],
                        annotation: None,
                        isoforms: None,
                    });
                    idx
                }
            };

            let triple = match self.mode {
                IsoformMode::Single => [first(&rec.low), first(&rec.mean), first(&rec.high)],
                IsoformMode::Multi => {
                    let column = format!("{}_mean", self.samples[sample]);
                    if rec.is_ragged() {
                        let found = if rec.low.len() != rec.isoforms() {
                            rec.low.len()
                        } else {
                            rec.high.len()
                        };
                        self.record_mismatch(&rec.event, &column, rec.isoforms(), found);
                    }
                    self.check_isoforms(idx, &column, rec.isoforms());
                    [rec.low.join(","), rec.mean.join(","), rec.high.join(",")]
                }
            };
            self.events[idx].psi[sample] = Some(triple);
        }
    }

    pub fn add_comparison(&mut self, pair: usize, records: Vec<ComparisonRecord>) -> Result<()> {
        let (a, b) = self.pairs[pair];
        let column = input::comparison_name(&self.samples[a], &self.samples[b]);
        for rec in records {
            let Some(&idx) = self.index.get(&rec.event) else {
                self.stats.comparison_only_rows += 1;
                continue;
            };
            let value = match self.mode {
                IsoformMode::Single => match &rec.max_bf {
                    Some(v) => v.clone(),
                    None => max_bayes_factor(&rec.bayes_factors)
                        .with_context(|| format!("event {} in {}", rec.event, column))?
                        .to_string(),
                },
                IsoformMode::Multi => {
                    self.check_isoforms(idx, &column, rec.bayes_factors.len());
                    rec.bayes_factors.join(",")
                }
            };
            let entry = &mut self.events[idx];
            entry.bf[pair] = Some(value);
            if entry.annotation.is_none() {
                entry.annotation = rec.annotation;
            }
        }
        Ok(())
    }

    pub fn mark_missing_comparison(&mut self, pair: usize) {
        let (a, b) = self.pairs[pair];
        let name = input::comparison_name(&self.samples[a], &self.samples[b]);
        warn!(
            comparison = %name,
            "comparison file not found under either pair ordering; using neutral Bayes factor"
        );
        self.stats.missing_comparisons.push(name);
    }

    fn check_isoforms(&mut self, idx: usize, column: &str, found: usize) {
        match self.events[idx].isoforms {
            None => self.events[idx].isoforms = Some(found),
            Some(expected) if expected != found => {
                let event = self.events[idx].event.clone();
                self.record_mismatch(&event, column, expected, found);
            }
            Some(_) => {}
        }
    }

    fn record_mismatch(&mut self, event: &str, column: &str, expected: usize, found: usize) {
        warn!(
            event = %event,
            column = %column,
            expected,
            found,
            "isoform count mismatch"
        );
        self.stats.isoform_mismatches.push(IsoformMismatch {
            event: event.to_string(),
            column: column.to_string(),
            expected,
            found,
        });
    }

    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["#Event".to_string()];
        for s in &self.samples {
            header.push(format!("{}_low", s));
            header.push(format!("{}_mean", s));
            header.push(format!("{}_high", s));
        }
        for (a, b) in self.pairs() {
            header.push(input::comparison_name(a, b));
        }
        for name in ["gene", "symb", "desc"] {
            header.push(name.to_string());
        }
        header
    }

    pub fn finish(self, lookup: Option<&dyn AnnotationLookup>) -> Consolidated {
        let mut table = Table::new(self.header());
        for entry in self.events {
            let mut row = Vec::with_capacity(table.header.len());
            row.push(entry.event.clone());
            for psi in entry.psi {
                match psi {
                    Some(triple) => row.extend(triple),
                    None => row.extend([NOT_AVAILABLE; 3].map(str::to_string)),
                }
            }
            for bf in entry.bf {
                row.push(bf.unwrap_or_else(|| NEUTRAL_BF.to_string()));
            }
            let annotation = entry.annotation.unwrap_or_else(|| match lookup {
                Some(l) => l.resolve(&entry.event),
                None => Annotation::not_available(),
            });
            row.extend(annotation.fields().iter().map(|f| f.to_string()));
            table.rows.push(row);
        }
        let mut stats = self.stats;
        stats.events = table.rows.len();
        Consolidated { table, stats }
    }
}

fn first(values: &[String]) -> String {
    values
        .first()
        .cloned()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Reads `<summary_dir>/<sample>.miso_summary` for every sample and, when
/// Bayes factors are requested, the `<a>_vs_<b>.miso_bf` (or `<b>_vs_<a>`)
/// table for every pair from `compare_dir`.
pub fn consolidate_dirs(
    summary_dir: &Path,
    compare_dir: &Path,
    samples: Vec<String>,
    mode: IsoformMode,
    with_bf: bool,
    lookup: Option<&dyn AnnotationLookup>,
) -> Result<Consolidated> {
    let mut consolidator = Consolidator::new(samples, mode, with_bf);

    for i in 0..consolidator.samples().len() {
        let sample = consolidator.samples()[i].clone();
        let path = input::resolve_summary_path(summary_dir, &sample).with_context(|| {
            format!(
                "summary file for sample '{}' not found in {}",
                sample,
                summary_dir.display()
            )
        })?;
        let records = read_miso_summary(&path)?;
        info!(sample = %sample, events = records.len(), "summary_loaded");
        consolidator.add_sample(i, records);
    }

    if with_bf {
        let pairs: Vec<(String, String)> = consolidator
            .pairs()
            .into_iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        for (p, (a, b)) in pairs.iter().enumerate() {
            match input::resolve_comparison_path(compare_dir, a, b) {
                Some(path) => {
                    let records = read_comparison(&path)?;
                    info!(
                        comparison = %path.display(),
                        events = records.len(),
                        "comparison_loaded"
                    );
                    consolidator.add_comparison(p, records)?;
                }
                None => consolidator.mark_missing_comparison(p),
            }
        }
    }

    Ok(consolidator.finish(lookup))
}
