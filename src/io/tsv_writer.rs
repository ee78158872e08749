use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::schema::v1::IsoformMode;
use crate::trend::{EventTrend, IsoformTrend, TrendOutcome};

pub fn trend_header(mode: IsoformMode, control: &str, experimental: &str) -> String {
    let mut header = format!(
        "#Event\tSymb\tTrueval\tMean\tStd\t{}_psi\t{}_psi\tdelta_psi\tZ-score",
        control, experimental
    );
    if mode == IsoformMode::Multi {
        header.push_str("\tMaxZ");
    }
    header
}

/// One report line. Multi-isoform fields are comma-joined per isoform;
/// null mean and std are rounded to 2 decimals there.
pub fn trend_line(row: &EventTrend, mode: IsoformMode) -> String {
    let join = |f: &dyn Fn(&IsoformTrend) -> String| -> String {
        row.isoforms.iter().map(f).collect::<Vec<_>>().join(",")
    };
    let mut fields = vec![row.event.clone(), row.symbol.clone()];
    let null_prec = match mode {
        IsoformMode::Single => 4,
        IsoformMode::Multi => 2,
    };
    fields.push(join(&|i| i.observed.to_string()));
    fields.push(join(&|i| format!("{:.*}", null_prec, i.null_mean)));
    fields.push(join(&|i| format!("{:.*}", null_prec, i.null_std)));
    fields.push(join(&|i| format!("{:.2}", i.control_psi)));
    fields.push(join(&|i| format!("{:.2}", i.experimental_psi)));
    fields.push(join(&|i| format!("{:.2}", i.delta_psi)));
    fields.push(join(&|i| format!("{:.4}", i.z)));
    if mode == IsoformMode::Multi {
        fields.push(format!("{:.4}", row.max_abs_z()));
    }
    fields.join("\t")
}

pub fn write_trend_tsv(path: &Path, outcome: &TrendOutcome) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(
        w,
        "{}",
        trend_header(
            outcome.mode,
            &outcome.control_label,
            &outcome.experimental_label
        )
    )?;
    for row in &outcome.rows {
        writeln!(w, "{}", trend_line(row, outcome.mode))?;
    }
    w.flush()?;
    Ok(())
}
