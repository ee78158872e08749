//! Monotonic trend detection across an ordered sequence of sample groups.

pub mod compidx;
pub mod engine;
pub mod evidence;
pub mod permute;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::groups::ReferenceConvention;
use crate::schema::v1::IsoformMode;

pub use engine::{TrendEngine, run_trend};

#[derive(Debug, Clone)]
pub struct TrendParams {
    pub mode: IsoformMode,
    /// Inclusive lower bound on the pairwise Bayes factor.
    pub min_bf: f64,
    pub nshuffles: usize,
    pub seed: u64,
    /// 0 = rayon default.
    pub threads: usize,
    pub convention: ReferenceConvention,
    pub control: Option<String>,
    pub experimental: Option<String>,
    /// `<a>_vs_<b>` columns whose comparison file was missing at
    /// consolidation; they contribute no sign at any threshold.
    pub excluded_comparisons: Vec<String>,
}

impl TrendParams {
    pub fn new(mode: IsoformMode) -> Self {
        let convention = match mode {
            IsoformMode::Single => ReferenceConvention::FirstVsLast,
            IsoformMode::Multi => ReferenceConvention::SecondVsFirst,
        };
        Self {
            mode,
            min_bf: 5.0,
            nshuffles: 1000,
            seed: 42,
            threads: 0,
            convention,
            control: None,
            experimental: None,
            excluded_comparisons: Vec::new(),
        }
    }
}

/// Why an event was left out of the report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("no PSI estimate for sample {sample}")]
    MissingPsi { sample: String },
    #[error("isoform count mismatch in {column}: expected {expected}, found {found}")]
    IsoformMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("malformed value '{value}' in {column}")]
    Malformed { column: String, value: String },
    #[error("row has {found} fields, header has {expected}")]
    ShortRow { expected: usize, found: usize },
}

impl SkipReason {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingPsi { .. } => "missing_psi",
            Self::IsoformMismatch { .. } => "isoform_mismatch",
            Self::Malformed { .. } => "malformed_value",
            Self::ShortRow { .. } => "short_row",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEvent {
    pub event: String,
    pub reason: SkipReason,
}

/// Statistic for one isoform of one event.
#[derive(Debug, Clone, PartialEq)]
pub struct IsoformTrend {
    /// Signed concordance over the comparison index set, unpermuted order.
    pub observed: i64,
    pub null_mean: f64,
    pub null_std: f64,
    pub z: f64,
    /// Null had zero spread while the observed statistic was nonzero.
    pub degenerate_null: bool,
    pub control_psi: f64,
    pub experimental_psi: f64,
    pub delta_psi: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventTrend {
    pub event: String,
    pub symbol: String,
    pub isoforms: Vec<IsoformTrend>,
}

impl EventTrend {
    pub fn max_abs_z(&self) -> f64 {
        self.isoforms.iter().map(|i| i.z.abs()).fold(0.0, f64::max)
    }

    pub fn has_signal(&self) -> bool {
        self.isoforms.iter().any(|i| i.observed != 0)
    }

    /// Raw observed statistic for single-isoform runs, max |Z| otherwise.
    pub fn ranking_key(&self, mode: IsoformMode) -> f64 {
        match mode {
            IsoformMode::Single => self.isoforms.first().map_or(0.0, |i| i.observed as f64),
            IsoformMode::Multi => self.max_abs_z(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum EventOutcome {
    Reported(EventTrend),
    /// Multi-isoform event without signal in any isoform.
    Flat(String),
    Skipped(SkippedEvent),
}

#[derive(Debug, Clone)]
pub struct TrendOutcome {
    pub mode: IsoformMode,
    pub control_label: String,
    pub experimental_label: String,
    /// Sorted by ranking key, descending; ties keep input order.
    pub rows: Vec<EventTrend>,
    pub skipped: Vec<SkippedEvent>,
    pub dropped_flat: usize,
    pub events_read: usize,
}

impl TrendOutcome {
    pub fn skip_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for s in &self.skipped {
            *counts.entry(s.reason.kind().to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn degenerate_null(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.isoforms.iter())
            .filter(|i| i.degenerate_null)
            .count()
    }
}
