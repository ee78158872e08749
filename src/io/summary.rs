use crate::ctx::Ctx;
use crate::schema::v1::IsoformMode;

/// Short human-readable run summary for the terminal.
pub fn format_summary(ctx: &Ctx) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let mode = match ctx.mode {
        IsoformMode::Single => "single",
        IsoformMode::Multi => "multi",
    };

    let mut out = String::new();
    out.push_str(&format!("kira-splicetrend v{}\n", version));
    if let Some(groups) = &ctx.groups {
        out.push_str(&format!(
            "Groups: {} ({} samples), isoforms={}\n",
            groups.groups().join(" -> "),
            groups.samples().len(),
            mode
        ));
    }
    if let Some(stats) = &ctx.consolidation_stats {
        out.push_str(&format!(
            "Consolidated: {} events, {} missing comparisons\n",
            stats.events,
            stats.missing_comparisons.len()
        ));
    }
    if let Some(tc) = &ctx.trend {
        out.push_str(&format!(
            "Trend: {} reported, {} skipped, {} flat ({} vs {})\n",
            tc.rows.len(),
            tc.skipped.len(),
            tc.dropped_flat,
            tc.control_label,
            tc.experimental_label
        ));
        if let Some(top) = tc.rows.first() {
            out.push_str(&format!(
                "Top: {} ({}) key={:.4}\n",
                top.event,
                top.symbol,
                top.ranking_key(tc.mode)
            ));
        }
    }
    if ctx.warnings.is_empty() {
        out.push_str("Warnings: none\n");
    } else {
        out.push_str(&format!("Warnings: {}\n", ctx.warnings.len()));
    }
    out
}
