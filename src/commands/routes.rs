//! `stackgen routes`

use anyhow::{Context as _, Result};
use colored::Colorize;
use construct::{LogicalId, Stack};

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let (config, app) = super::assemble(ctx)?;
    let stack = app
        .stack(&config.stack_name)
        .with_context(|| format!("Stack {} not found", config.stack_name))?;

    let verbose = ctx.verbose > 0;
    ui::header(&format!("Routes of {}", stack.name()));
    let routes: Vec<_> = stack.routes().collect();
    let width = routes.iter().map(|(m, _, _)| m.len()).max().unwrap_or(0);
    for (method, path, handler) in &routes {
        println!(
            "  {:<width$} {} {} {}",
            method.bold(),
            path,
            "→".dimmed(),
            label(stack, handler, verbose)
        );
    }

    ui::section("Table access");
    for (grantee, target, mode) in stack.grants() {
        println!(
            "  {} {} {}",
            label(stack, grantee, verbose),
            mode.to_string().cyan(),
            label(stack, target, verbose)
        );
    }

    if !ctx.quiet {
        println!();
        ui::dim(&format!(
            "{}, {}",
            ui::plural(routes.len(), "route"),
            ui::plural(stack.grants().count(), "grant")
        ));
    }
    Ok(())
}

/// Construct name, with the logical ID appended when verbose
fn label(stack: &Stack, id: &LogicalId, verbose: bool) -> String {
    let name = construct_name(stack, id);
    if verbose && name != id.as_str() {
        format!("{name} ({id})")
    } else {
        name
    }
}

/// Construct id of the handle owning `id`, e.g. `GetProductsFunction`
fn construct_name(stack: &Stack, id: &LogicalId) -> String {
    let Some(resource) = stack.resource(id) else {
        return id.to_string();
    };
    let path = resource.path();
    let relative = path
        .strip_prefix(stack.name())
        .and_then(|p| p.strip_prefix('/'))
        .unwrap_or(path);
    relative.strip_suffix("/Resource").unwrap_or(relative).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use construct::{CfnResource, StackProps};

    #[test]
    fn test_construct_name() {
        let mut stack = Stack::new("Demo", StackProps::default()).unwrap();
        let nested = stack
            .add_resource(&["GetFn", "Resource"], CfnResource::new("AWS::Lambda::Function"))
            .unwrap();
        let flat = stack
            .add_resource(&["Bucket"], CfnResource::new("AWS::S3::Bucket"))
            .unwrap();

        assert_eq!(construct_name(&stack, &nested), "GetFn");
        assert_eq!(construct_name(&stack, &flat), "Bucket");
        assert_eq!(construct_name(&stack, &LogicalId::new("Nope")), "Nope");
    }

    #[test]
    fn test_label_shows_logical_id_when_verbose() {
        let mut stack = Stack::new("Demo", StackProps::default()).unwrap();
        let nested = stack
            .add_resource(&["GetFn", "Resource"], CfnResource::new("AWS::Lambda::Function"))
            .unwrap();
        let flat = stack
            .add_resource(&["Bucket"], CfnResource::new("AWS::S3::Bucket"))
            .unwrap();

        assert_eq!(label(&stack, &nested, false), "GetFn");
        assert_eq!(label(&stack, &nested, true), format!("GetFn ({nested})"));
        assert_eq!(label(&stack, &flat, true), "Bucket");
    }
}
