use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::groups::ReferenceConvention;
use crate::schema::v1::IsoformMode;
use crate::trend::TrendParams;

#[derive(Debug, Parser)]
#[command(
    name = "kira-splicetrend",
    version,
    about = "Monotonic splicing trends across ordered sample groups"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge per-sample summaries and pairwise comparisons into one table
    Consolidate(ConsolidateArgs),
    /// Rank events of a consolidated table by monotonic trend
    Monotonic(MonotonicArgs),
    /// Consolidate, then rank, in one pass
    Run(RunArgs),
    /// Summarize raw pairwise comparison output with max Bayes factor and annotation
    Annotate(AnnotateArgs),
}

#[derive(Debug, Args)]
pub struct ConsolidateArgs {
    #[arg(long, help = "Directory with <sample>.miso_summary files")]
    pub summary_dir: PathBuf,

    #[arg(long, help = "Directory with <a>_vs_<b>.miso_bf files (defaults to --summary-dir)")]
    pub compare_dir: Option<PathBuf>,

    #[arg(long, help = "Sample/group assignment (two whitespace-separated columns)")]
    pub groups: Option<PathBuf>,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub multi_iso: bool,

    #[arg(long, default_value_t = false, help = "Omit pairwise Bayes factor columns")]
    pub no_bf: bool,

    #[arg(long, help = "Event annotation TSV: event, gene, symbol, description")]
    pub annotation: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct TrendArgs {
    #[arg(long, default_value_t = 5.0, help = "Minimum Bayes factor (inclusive)")]
    pub min_bf: f64,

    #[arg(long, default_value_t = 1000, help = "Number of label permutations")]
    pub shuffles: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,

    #[arg(long, value_enum, help = "Reference groups (default depends on --multi-iso)")]
    pub convention: Option<ConventionArg>,

    #[arg(long, help = "Control group label (overrides --convention)")]
    pub control: Option<String>,

    #[arg(long, help = "Experimental group label (overrides --convention)")]
    pub experimental: Option<String>,
}

impl TrendArgs {
    pub fn to_params(&self, mode: IsoformMode) -> TrendParams {
        let mut params = TrendParams::new(mode);
        params.min_bf = self.min_bf;
        params.nshuffles = self.shuffles;
        params.seed = self.seed;
        params.threads = self.threads;
        if let Some(c) = self.convention {
            params.convention = match c {
                ConventionArg::FirstLast => ReferenceConvention::FirstVsLast,
                ConventionArg::SecondFirst => ReferenceConvention::SecondVsFirst,
            };
        }
        params.control = self.control.clone();
        params.experimental = self.experimental.clone();
        params
    }
}

#[derive(Debug, Args)]
pub struct MonotonicArgs {
    #[arg(long, help = "Consolidated table")]
    pub input: PathBuf,

    #[arg(long)]
    pub groups: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub multi_iso: bool,

    #[arg(long, help = "Optional run summary JSON")]
    pub json: Option<PathBuf>,

    #[command(flatten)]
    pub trend: TrendArgs,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long)]
    pub summary_dir: PathBuf,

    #[arg(long)]
    pub compare_dir: Option<PathBuf>,

    #[arg(long)]
    pub groups: PathBuf,

    #[arg(long, help = "Output directory")]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub multi_iso: bool,

    #[arg(long)]
    pub annotation: Option<PathBuf>,

    #[command(flatten)]
    pub trend: TrendArgs,
}

#[derive(Debug, Args)]
pub struct AnnotateArgs {
    #[arg(long, help = "Directory with <a>_vs_<b> comparison directories")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long)]
    pub annotation: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConventionArg {
    FirstLast,
    SecondFirst,
}

pub fn isoform_mode(multi_iso: bool) -> IsoformMode {
    if multi_iso {
        IsoformMode::Multi
    } else {
        IsoformMode::Single
    }
}
