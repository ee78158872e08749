use std::cmp::Ordering;

use anyhow::{Result, bail};
use tracing::{debug, info, warn};

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::groups::GroupAssignment;
use crate::input::{PAIR_SEPARATOR, comparison_name};
use crate::io::NOT_AVAILABLE;
use crate::io::table::Table;
use crate::math::stats::{empirical_z, mean, null_summary, round_to};
use crate::schema::v1::IsoformMode;
use crate::trend::compidx::comparison_pairs;
use crate::trend::evidence::PairwiseEvidence;
use crate::trend::permute::{Permuter, SeededPermuter, replicate_orders};
use crate::trend::{
    EventOutcome, EventTrend, IsoformTrend, SkipReason, SkippedEvent, TrendOutcome, TrendParams,
};

const MEAN_SUFFIX: &str = "_mean";

/// Column layout of a consolidated table resolved against a group assignment.
///
/// Samples are placed in block order (all samples of the first group, then
/// the second, ...); positions in that order index every per-event vector.
pub struct TrendEngine {
    params: TrendParams,
    columns: Vec<String>,
    samples: Vec<String>,
    psi_cols: Vec<usize>,
    bf_cols: Vec<(usize, usize, usize)>,
    pairs: Vec<(usize, usize)>,
    control: Vec<usize>,
    experimental: Vec<usize>,
    control_label: String,
    experimental_label: String,
    symbol_col: Option<usize>,
    width: usize,
}

impl TrendEngine {
    pub fn new(table: &Table, groups: &GroupAssignment, params: TrendParams) -> Result<Self> {
        let header = &table.header;
        let samples = groups.block_order();
        if !groups.is_block_contiguous() {
            warn!("group file interleaves groups; samples are evaluated in group-block order");
        }
        let position = |name: &str| samples.iter().position(|s| s == name);

        let mut psi_cols: Vec<Option<usize>> = vec![None; samples.len()];
        let mut bf_cols = Vec::new();
        let mut excluded = 0usize;
        for (col, name) in header.iter().enumerate().skip(1) {
            if let Some(sample) = name.strip_suffix(MEAN_SUFFIX) {
                if let Some(pos) = position(sample) {
                    psi_cols[pos].get_or_insert(col);
                    continue;
                }
            }
            if let Some((a, b)) = name.split_once(PAIR_SEPARATOR) {
                if is_excluded(&params.excluded_comparisons, a, b) {
                    excluded += 1;
                    continue;
                }
                if let (Some(pa), Some(pb)) = (position(a), position(b)) {
                    bf_cols.push((pa, pb, col));
                }
            }
        }
        if excluded > 0 {
            info!(excluded, "comparison columns without a source file left out");
        }
        let mut resolved = Vec::with_capacity(samples.len());
        for (pos, col) in psi_cols.into_iter().enumerate() {
            match col {
                Some(c) => resolved.push(c),
                None => bail!(
                    "sample '{}' from the group assignment has no {}{} column",
                    samples[pos],
                    samples[pos],
                    MEAN_SUFFIX
                ),
            }
        }

        let reference = groups.reference_groups(
            params.convention,
            params.control.as_deref(),
            params.experimental.as_deref(),
        )?;
        let positions_of = |group: usize| -> Vec<usize> {
            groups
                .members(group)
                .iter()
                .filter_map(|s| position(s))
                .collect()
        };
        let control = positions_of(reference.control);
        let experimental = positions_of(reference.experimental);

        let symbol_col = table
            .column_index("symb")
            .or_else(|| header.len().checked_sub(2));

        Ok(Self {
            pairs: comparison_pairs(&groups.block_sizes()),
            control_label: groups.groups()[reference.control].clone(),
            experimental_label: groups.groups()[reference.experimental].clone(),
            width: header.len(),
            columns: header.to_vec(),
            psi_cols: resolved,
            bf_cols,
            control,
            experimental,
            symbol_col,
            samples,
            params,
        })
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn comparison_pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn control_label(&self) -> &str {
        &self.control_label
    }

    pub fn experimental_label(&self) -> &str {
        &self.experimental_label
    }

    pub fn parse_evidence(&self, row: &[String]) -> Result<PairwiseEvidence, SkipReason> {
        if row.len() < self.width {
            return Err(SkipReason::ShortRow {
                expected: self.width,
                found: row.len(),
            });
        }

        let mut psi = Vec::with_capacity(self.psi_cols.len());
        let mut isoforms: Option<usize> = None;
        for (pos, &col) in self.psi_cols.iter().enumerate() {
            let cell = row[col].trim();
            if cell == NOT_AVAILABLE || cell.is_empty() {
                return Err(SkipReason::MissingPsi {
                    sample: self.samples[pos].clone(),
                });
            }
            let values = self.parse_list(cell, col)?;
            if let Some(v) = values.iter().find(|v| !v.is_finite()) {
                return Err(SkipReason::Malformed {
                    column: self.columns[col].clone(),
                    value: v.to_string(),
                });
            }
            match isoforms {
                None => isoforms = Some(values.len()),
                Some(expected) if expected != values.len() => {
                    return Err(SkipReason::IsoformMismatch {
                        column: self.columns[col].clone(),
                        expected,
                        found: values.len(),
                    });
                }
                Some(_) => {}
            }
            psi.push(values);
        }
        let isoforms = isoforms.unwrap_or(1);
        if self.params.mode == IsoformMode::Single && isoforms != 1 {
            return Err(SkipReason::IsoformMismatch {
                column: self.columns[self.psi_cols[0]].clone(),
                expected: 1,
                found: isoforms,
            });
        }

        let mut evidence = PairwiseEvidence::new(psi, isoforms);
        for &(a, b, col) in &self.bf_cols {
            let cell = row[col].trim();
            if cell == NOT_AVAILABLE || cell.is_empty() {
                continue;
            }
            let mut values = self.parse_list(cell, col)?;
            if values.len() != isoforms {
                // A scalar on a multi-isoform event is the consolidator's neutral default.
                if values.len() == 1 {
                    values = vec![values[0]; isoforms];
                } else {
                    return Err(SkipReason::IsoformMismatch {
                        column: self.columns[col].clone(),
                        expected: isoforms,
                        found: values.len(),
                    });
                }
            }
            evidence.set_bf(a, b, values);
        }
        Ok(evidence)
    }

    fn parse_list(&self, cell: &str, col: usize) -> Result<Vec<f64>, SkipReason> {
        cell.split(',')
            .map(|v| {
                v.trim().parse::<f64>().map_err(|_| SkipReason::Malformed {
                    column: self.columns[col].clone(),
                    value: v.trim().to_string(),
                })
            })
            .collect()
    }

    /// Evaluates one consolidated row with a permutation stream derived from
    /// the run seed and the row index.
    pub fn evaluate(&self, index: usize, row: &[String]) -> EventOutcome {
        let mut permuter = SeededPermuter::for_event(self.params.seed, index);
        self.evaluate_with(row, &mut permuter)
    }

    pub fn evaluate_with<P: Permuter + ?Sized>(
        &self,
        row: &[String],
        permuter: &mut P,
    ) -> EventOutcome {
        let event = row.first().cloned().unwrap_or_default();
        let evidence = match self.parse_evidence(row) {
            Ok(e) => e,
            Err(reason) => {
                debug!(event = %event, reason = %reason, "event skipped");
                return EventOutcome::Skipped(SkippedEvent { event, reason });
            }
        };

        // One set of orders per event, shared by all isoforms.
        let orders = replicate_orders(evidence.n_samples(), self.params.nshuffles, permuter);
        let isoforms = (0..evidence.isoforms())
            .map(|iso| self.isoform_trend(&evidence, &orders, iso))
            .collect();

        let trend = EventTrend {
            symbol: self
                .symbol_col
                .and_then(|c| row.get(c))
                .cloned()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            event,
            isoforms,
        };
        if self.params.mode == IsoformMode::Multi && !trend.has_signal() {
            return EventOutcome::Flat(trend.event);
        }
        EventOutcome::Reported(trend)
    }

    /// Sign-sum statistic for every replicate order; index 0 is the observed order.
    pub fn replicate_statistics(
        &self,
        evidence: &PairwiseEvidence,
        orders: &[Vec<usize>],
        iso: usize,
    ) -> Vec<i64> {
        orders
            .iter()
            .map(|order| evidence.sign_sum(order, &self.pairs, iso, self.params.min_bf))
            .collect()
    }

    fn isoform_trend(
        &self,
        evidence: &PairwiseEvidence,
        orders: &[Vec<usize>],
        iso: usize,
    ) -> IsoformTrend {
        let stats = self.replicate_statistics(evidence, orders, iso);
        let observed = stats[0];
        let (null_mean, null_std) = null_summary(&stats[1..]);
        let (z, degenerate_null) = if observed == 0 {
            (0.0, false)
        } else {
            match empirical_z(observed as f64, null_mean, null_std) {
                Some(z) => (z, false),
                None => (0.0, true),
            }
        };

        let group_mean = |positions: &[usize]| -> f64 {
            let values: Vec<f64> = positions.iter().map(|&p| evidence.psi(p, iso)).collect();
            mean(&values)
        };
        let control_psi = group_mean(&self.control);
        let experimental_psi = group_mean(&self.experimental);

        IsoformTrend {
            observed,
            null_mean,
            null_std,
            z,
            degenerate_null,
            control_psi: round_to(control_psi, 2),
            experimental_psi: round_to(experimental_psi, 2),
            delta_psi: round_to(experimental_psi - control_psi, 2),
        }
    }

    fn evaluate_all(&self, rows: &[Vec<String>]) -> Result<Vec<EventOutcome>> {
        #[cfg(feature = "mt")]
        let outcomes = {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.params.threads)
                .build()
                .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
            pool.install(|| {
                rows.par_iter()
                    .enumerate()
                    .map(|(i, row)| self.evaluate(i, row))
                    .collect::<Vec<_>>()
            })
        };

        #[cfg(not(feature = "mt"))]
        let outcomes = rows
            .iter()
            .enumerate()
            .map(|(i, row)| self.evaluate(i, row))
            .collect::<Vec<_>>();

        Ok(outcomes)
    }
}

fn is_excluded(excluded: &[String], a: &str, b: &str) -> bool {
    excluded
        .iter()
        .any(|c| *c == comparison_name(a, b) || *c == comparison_name(b, a))
}

pub fn run_trend(
    table: &Table,
    groups: &GroupAssignment,
    params: &TrendParams,
) -> Result<TrendOutcome> {
    let engine = TrendEngine::new(table, groups, params.clone())?;
    info!(
        samples = engine.samples().len(),
        comparisons = engine.comparison_pairs().len(),
        control = %engine.control_label(),
        experimental = %engine.experimental_label(),
        nshuffles = params.nshuffles,
        min_bf = params.min_bf,
        "trend_engine_ready"
    );

    let outcomes = engine.evaluate_all(&table.rows)?;

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    let mut dropped_flat = 0usize;
    for outcome in outcomes {
        match outcome {
            EventOutcome::Reported(t) => rows.push(t),
            EventOutcome::Flat(_) => dropped_flat += 1,
            EventOutcome::Skipped(s) => skipped.push(s),
        }
    }

    let mode = params.mode;
    rows.sort_by(|a, b| {
        b.ranking_key(mode)
            .partial_cmp(&a.ranking_key(mode))
            .unwrap_or(Ordering::Equal)
    });

    let outcome = TrendOutcome {
        mode,
        control_label: engine.control_label().to_string(),
        experimental_label: engine.experimental_label().to_string(),
        rows,
        skipped,
        dropped_flat,
        events_read: table.rows.len(),
    };
    if !outcome.skipped.is_empty() {
        warn!(
            skipped = outcome.skipped.len(),
            "events skipped for incomplete or inconsistent data"
        );
    }
    info!(
        events = outcome.events_read,
        reported = outcome.rows.len(),
        dropped_flat = outcome.dropped_flat,
        degenerate_null = outcome.degenerate_null(),
        "trend_ready"
    );
    Ok(outcome)
}
