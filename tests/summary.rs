use std::path::PathBuf;

use kira_splicetrend::ctx::{Ctx, OutputPaths};
use kira_splicetrend::groups::GroupAssignment;
use kira_splicetrend::io::summary::format_summary;
use kira_splicetrend::schema::v1::IsoformMode;
use kira_splicetrend::trend::{EventTrend, IsoformTrend, TrendOutcome};

#[test]
fn summary_format() {
    let mut ctx = Ctx::new(
        IsoformMode::Single,
        OutputPaths::run_dir(PathBuf::from("out")),
        "0.0.0-test",
    );
    ctx.groups = Some(GroupAssignment::parse("A wt\nB ko\n", "groups").unwrap());
    ctx.trend = Some(TrendOutcome {
        mode: IsoformMode::Single,
        control_label: "wt".to_string(),
        experimental_label: "ko".to_string(),
        rows: vec![EventTrend {
            event: "E7".to_string(),
            symbol: "SRSF1".to_string(),
            isoforms: vec![IsoformTrend {
                observed: 1,
                null_mean: 0.0,
                null_std: 0.5,
                z: 2.0,
                degenerate_null: false,
                control_psi: 0.1,
                experimental_psi: 0.9,
                delta_psi: 0.8,
            }],
        }],
        skipped: Vec::new(),
        dropped_flat: 0,
        events_read: 1,
    });

    let s = format_summary(&ctx);
    assert!(s.starts_with("kira-splicetrend v"));
    assert!(s.contains("Groups: wt -> ko (2 samples), isoforms=single"));
    assert!(s.contains("Trend: 1 reported, 0 skipped, 0 flat (wt vs ko)"));
    assert!(s.contains("Top: E7 (SRSF1) key=1.0000"));
    assert!(s.contains("Warnings: none"));
}
