use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{json_writer, tsv_writer};
use crate::pipeline::Stage;

pub struct Stage4Output;

impl Stage4Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Output {
    fn name(&self) -> &'static str {
        "stage4_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        // Only freshly merged tables are written back out.
        if let (Some(path), Some(table), true) = (
            &ctx.output.consolidated_path,
            &ctx.consolidated,
            ctx.summary_dir.is_some(),
        ) {
            table.write(path)?;
            info!(out = %path.display(), rows = table.rows.len(), "consolidated_written");
        }

        if let (Some(path), Some(outcome)) = (&ctx.output.trend_path, &ctx.trend) {
            tsv_writer::write_trend_tsv(path, outcome)?;
            info!(out = %path.display(), rows = outcome.rows.len(), "trend_report_written");
        }

        ctx.report.warnings = ctx.warnings.clone();
        if let Some(path) = ctx.output.json_path.clone() {
            json_writer::write_json(&path, ctx)?;
            info!(out = %path.display(), "summary_json_written");
        }

        info!("stage4_output_ready");
        Ok(())
    }
}
