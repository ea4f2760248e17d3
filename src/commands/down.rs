//! `stackrun down` - stop the stack

use anyhow::Result;

use super::{preflight, StackContext};
use crate::error::StackError;
use crate::infrastructure::ContainerRuntime;
use crate::observability;
use crate::tools::tools;
use crate::ui;

pub async fn execute(ctx: &StackContext) -> Result<()> {
    preflight(&[tools::DOCKER]);

    let result = ctx.container_runtime().stop_stack().await;
    if ctx.emit_events {
        observability::emit_lifecycle("stop", result.as_ref().err().map(|e| e.to_string()));
    }
    result.map_err(StackError::from)?;

    ui::print_success("Docker containers stopped");
    Ok(())
}
