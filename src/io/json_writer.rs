use std::path::Path;

use anyhow::Result;

use crate::ctx::Ctx;
use crate::schema::v1::SplicetrendV1;

pub fn build_report(ctx: &Ctx) -> SplicetrendV1 {
    let mut report = ctx.report.clone();
    report.mode = ctx.mode;
    report.version = env!("CARGO_PKG_VERSION").to_string();
    report.warnings = ctx.warnings.clone();
    report
}

pub fn write_json(path: &Path, ctx: &Ctx) -> Result<()> {
    let report = build_report(ctx);
    crate::io::write_json(path, &report)
}
