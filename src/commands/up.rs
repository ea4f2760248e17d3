//! `stackrun up` - start the stack, migrate, then serve the command loop

use anyhow::Result;
use tracing::info;

use super::session::Session;
use super::{preflight, run_reported_pass, StackContext, MIGRATION_TOOLS};
use crate::error::StackError;
use crate::infrastructure::ContainerRuntime;
use crate::observability;
use crate::tools::tools;
use crate::ui;

pub async fn execute(ctx: &StackContext, migrate_twice: bool) -> Result<()> {
    ui::print_header("Starting local stack");
    preflight(&[tools::DOCKER]);
    preflight(MIGRATION_TOOLS);

    let runtime = ctx.container_runtime();
    if let Err(e) = runtime.start_stack().await {
        if ctx.emit_events {
            observability::emit_lifecycle("start", Some(e.to_string()));
        }
        return Err(StackError::from(e).into());
    }
    if ctx.emit_events {
        observability::emit_lifecycle("start", None);
    }
    ui::print_success("Docker containers started");

    let migrations = ctx.migration_service();
    run_reported_pass(&migrations, &ctx.services_root, ctx.emit_events).await;
    if migrate_twice {
        info!("Running additional migration pass");
        run_reported_pass(&migrations, &ctx.services_root, ctx.emit_events).await;
    }

    Session::new(&runtime, &migrations, &ctx.services_root, ctx.emit_events)
        .run()
        .await
}
