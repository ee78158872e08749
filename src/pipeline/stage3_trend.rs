use anyhow::{Context, Result};
use tracing::warn;

use crate::consolidate::NEUTRAL_BF;
use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::schema::v1::TrendMeta;
use crate::trend::run_trend;

pub struct Stage3Trend;

impl Stage3Trend {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Trend {
    fn name(&self) -> &'static str {
        "stage3_trend"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let Some(mut params) = ctx.trend_params.clone() else {
            return Ok(());
        };
        match &ctx.consolidation_stats {
            Some(stats) => params.excluded_comparisons = stats.missing_comparisons.clone(),
            // A table read from disk carries no record of which defaults were filled in.
            None if params.min_bf <= 1.0 => {
                warn!(
                    min_bf = params.min_bf,
                    neutral = NEUTRAL_BF,
                    "neutral Bayes factor defaults in the input table count as evidence"
                );
                ctx.warnings.push(format!(
                    "min_bf {} admits neutral Bayes factor defaults ({}) as evidence",
                    params.min_bf, NEUTRAL_BF
                ));
            }
            None => {}
        }
        let table = ctx
            .consolidated
            .as_ref()
            .context("consolidated table missing")?;
        let groups = ctx.groups.as_ref().context("group assignment missing")?;

        let outcome = run_trend(table, groups, &params)?;

        if let Some(meta) = ctx.report.groups.as_mut() {
            meta.control = Some(outcome.control_label.clone());
            meta.experimental = Some(outcome.experimental_label.clone());
        }
        ctx.report.trend = Some(TrendMeta {
            events_read: outcome.events_read,
            reported: outcome.rows.len(),
            dropped_flat: outcome.dropped_flat,
            degenerate_null: outcome.degenerate_null(),
            skipped: outcome.skip_counts(),
        });
        ctx.trend = Some(outcome);
        Ok(())
    }
}
