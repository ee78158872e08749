use anyhow::{Result, bail};
use tracing::info;

use crate::consolidate::consolidate_dirs;
use crate::ctx::Ctx;
use crate::input;
use crate::io::annotation::AnnotationLookup;
use crate::io::table::Table;
use crate::pipeline::Stage;
use crate::schema::v1::ConsolidationMeta;

pub struct Stage2Consolidate;

impl Stage2Consolidate {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Consolidate {
    fn name(&self) -> &'static str {
        "stage2_consolidate"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(summary_dir) = ctx.summary_dir.clone() else {
            if let Some(path) = &ctx.consolidated_input {
                let table = Table::read(path)?;
                info!(
                    input = %path.display(),
                    events = table.rows.len(),
                    columns = table.header.len(),
                    "consolidated_table_loaded"
                );
                ctx.consolidated = Some(table);
            }
            return Ok(());
        };
        let compare_dir = ctx
            .compare_dir
            .clone()
            .unwrap_or_else(|| summary_dir.clone());

        let samples = match &ctx.groups {
            Some(groups) => groups.samples().to_vec(),
            None if !ctx.with_bf => input::discover_summary_samples(&summary_dir)?,
            None => bail!("consolidation with Bayes factors requires a group assignment"),
        };
        if samples.is_empty() {
            bail!("no samples to consolidate in {}", summary_dir.display());
        }

        let lookup = ctx
            .annotations
            .as_ref()
            .map(|a| a as &dyn AnnotationLookup);
        let consolidated = consolidate_dirs(
            &summary_dir,
            &compare_dir,
            samples,
            ctx.mode,
            ctx.with_bf,
            lookup,
        )?;

        let stats = consolidated.stats;
        for name in &stats.missing_comparisons {
            ctx.warnings
                .push(format!("comparison {} not found; neutral Bayes factor used", name));
        }
        for m in &stats.isoform_mismatches {
            ctx.warnings.push(format!(
                "event {} has {} isoforms in {} (expected {})",
                m.event, m.found, m.column, m.expected
            ));
        }
        ctx.report.consolidation = Some(ConsolidationMeta {
            samples: stats.samples,
            events: stats.events,
            with_bf: ctx.with_bf,
            missing_comparisons: stats.missing_comparisons.clone(),
            isoform_mismatches: stats.isoform_mismatches.len(),
            comparison_only_rows: stats.comparison_only_rows,
        });
        info!(
            samples = stats.samples,
            events = stats.events,
            missing_comparisons = stats.missing_comparisons.len(),
            "consolidation_ready"
        );

        ctx.consolidated = Some(consolidated.table);
        ctx.consolidation_stats = Some(stats);
        Ok(())
    }
}
