use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsoformMode {
    Single,
    Multi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    pub min_bf: f64,
    pub nshuffles: usize,
    pub seed: u64,
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMeta {
    pub order: Vec<String>,
    pub samples: usize,
    pub control: Option<String>,
    pub experimental: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationMeta {
    pub samples: usize,
    pub events: usize,
    pub with_bf: bool,
    pub missing_comparisons: Vec<String>,
    pub isoform_mismatches: usize,
    pub comparison_only_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendMeta {
    pub events_read: usize,
    pub reported: usize,
    pub dropped_flat: usize,
    pub degenerate_null: usize,
    pub skipped: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplicetrendV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub mode: IsoformMode,
    pub parameters: Option<Parameters>,
    pub groups: Option<GroupMeta>,
    pub consolidation: Option<ConsolidationMeta>,
    pub trend: Option<TrendMeta>,
    pub warnings: Vec<String>,
}

impl SplicetrendV1 {
    pub fn empty(tool_version: &str, mode: IsoformMode) -> Self {
        Self {
            tool: "kira-splicetrend".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            mode,
            parameters: None,
            groups: None,
            consolidation: None,
            trend: None,
            warnings: Vec::new(),
        }
    }
}
