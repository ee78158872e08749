use std::path::{Path, PathBuf};

use crate::consolidate::ConsolidationStats;
use crate::groups::GroupAssignment;
use crate::io::annotation::AnnotationTable;
use crate::io::table::Table;
use crate::schema::v1::{IsoformMode, SplicetrendV1};
use crate::trend::{TrendOutcome, TrendParams};

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub consolidated_path: Option<PathBuf>,
    pub trend_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
}

impl OutputPaths {
    /// Layout of a full run: every artifact inside `out_dir`.
    pub fn run_dir(out_dir: PathBuf) -> Self {
        Self {
            consolidated_path: Some(out_dir.join("consolidated.tsv")),
            trend_path: Some(out_dir.join("monotonic.tsv")),
            json_path: Some(out_dir.join("summary.json")),
            out_dir,
        }
    }

    /// Single-artifact layout; the parent directory is created on demand.
    pub fn single_file(path: &Path) -> Self {
        let out_dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            out_dir,
            consolidated_path: None,
            trend_path: None,
            json_path: None,
        }
    }
}

#[derive(Debug)]
pub struct Ctx {
    pub mode: IsoformMode,
    pub groups_path: Option<PathBuf>,
    pub annotation_path: Option<PathBuf>,
    pub summary_dir: Option<PathBuf>,
    pub compare_dir: Option<PathBuf>,
    pub consolidated_input: Option<PathBuf>,
    pub with_bf: bool,
    /// None disables the trend stage.
    pub trend_params: Option<TrendParams>,
    pub groups: Option<GroupAssignment>,
    pub annotations: Option<AnnotationTable>,
    pub consolidated: Option<Table>,
    pub consolidation_stats: Option<ConsolidationStats>,
    pub trend: Option<TrendOutcome>,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
    pub report: SplicetrendV1,
}

impl Ctx {
    pub fn new(mode: IsoformMode, output: OutputPaths, tool_version: &str) -> Self {
        Self {
            mode,
            groups_path: None,
            annotation_path: None,
            summary_dir: None,
            compare_dir: None,
            consolidated_input: None,
            with_bf: true,
            trend_params: None,
            groups: None,
            annotations: None,
            consolidated: None,
            consolidation_stats: None,
            trend: None,
            warnings: Vec::new(),
            output,
            report: SplicetrendV1::empty(tool_version, mode),
        }
    }
}
