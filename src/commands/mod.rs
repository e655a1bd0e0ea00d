//! Subcommand implementations

pub mod diff;
pub mod graph;
pub mod routes;
pub mod synth;

use anyhow::{Context as _, Result};
use construct::App;
use stackgen::config::StackConfig;
use stackgen::stack;

use crate::Context;

/// Load the stack config and assemble the app it describes
pub(crate) fn assemble(ctx: &Context) -> Result<(StackConfig, App)> {
    let config = StackConfig::load(ctx.config.as_deref())?;
    log::info!("Assembling stack {}", config.stack_name);

    let mut app = App::new();
    stack::products_stack_with(
        &mut app,
        &config.stack_name,
        Some(config.stack_props()),
        &config.products_options(),
    )
    .with_context(|| format!("Failed to assemble stack {}", config.stack_name))?;

    Ok((config, app))
}
