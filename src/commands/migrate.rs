//! `stackrun migrate` - one migration pass against an already running stack

use anyhow::{Context, Result};

use super::{preflight, run_reported_pass, StackContext, MIGRATION_TOOLS};
use crate::domain::PassReport;
use crate::error::StackError;
use crate::ui;

pub async fn execute(ctx: &StackContext) -> Result<()> {
    ui::print_header("Running migrations");
    preflight(MIGRATION_TOOLS);

    let migrations = ctx.migration_service();
    let report = run_reported_pass(&migrations, &ctx.services_root, ctx.emit_events).await;
    check_report(&report)
}

/// Fail the command when any service failed, carrying the first error
fn check_report(report: &PassReport) -> Result<()> {
    let Some(first) = report.outcomes.iter().find_map(|o| o.error.clone()) else {
        return Ok(());
    };
    Err(StackError::from(first))
        .with_context(|| format!("{} of {} service(s) failed", report.failed(), report.outcomes.len()))
}
