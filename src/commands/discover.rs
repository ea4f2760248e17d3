//! `stackrun discover` - show which services a pass would migrate

use anyhow::Result;

use super::StackContext;
use crate::error::StackError;
use crate::services::ServiceDiscovery;
use crate::ui;

pub fn execute(ctx: &StackContext) -> Result<()> {
    let report = ServiceDiscovery::new(&ctx.config.migrations)
        .discover(&ctx.services_root)
        .map_err(StackError::from)?;

    ui::print_info(&format!("Services root: {}", ctx.services_root.display()));
    println!();
    ui::print_discovery(&report);
    Ok(())
}
