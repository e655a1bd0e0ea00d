//! `stackgen diff`

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use construct::{Change, DiffSummary, ResourceDiff, Template, compute_diffs, compute_output_diffs, group_by_type};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::Context;
use crate::cli::DiffArgs;
use crate::ui;

pub fn run(ctx: &Context, args: DiffArgs) -> Result<()> {
    let (config, app) = super::assemble(ctx)?;
    let assembly = app.synth().context("Synthesis failed")?;
    let artifact = assembly
        .artifact(&config.stack_name)
        .with_context(|| format!("Stack {} was not synthesized", config.stack_name))?;

    let path = args
        .template
        .clone()
        .unwrap_or_else(|| args.out.join(artifact.template_file()));
    let previous = load_previous(&path)?;

    ui::header(&format!("Stack {}", config.stack_name));

    let diffs = compute_diffs(&previous, &artifact.template);
    let outputs = compute_output_diffs(&previous, &artifact.template);
    let summary = DiffSummary::from_diffs(&diffs);

    if !summary.has_changes() && outputs.is_empty() {
        println!();
        ui::success("No differences");
        return Ok(());
    }

    for (resource_type, group) in group_by_type(&diffs) {
        ui::section(&resource_type);
        for diff in group {
            print_resource_diff(diff, args.detail);
        }
    }

    if !outputs.is_empty() {
        ui::section("Outputs");
        for (name, change) in &outputs {
            println!("  {} {}", ui::change_marker(change), name);
        }
    }

    println!();
    println!(
        "{} to add, {} to modify, {} to remove",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.removals.to_string().red()
    );
    if summary.replacements > 0 {
        ui::warn(&format!(
            "{} will be replaced",
            ui::plural(summary.replacements, "resource")
        ));
    }

    if args.fail {
        bail!("{} pending", ui::plural(summary.total() + outputs.len(), "change"));
    }
    Ok(())
}

/// Read the previous template; a missing file compares against an empty stack
fn load_previous(path: &Path) -> Result<Template> {
    if !path.exists() {
        ui::info(&format!(
            "No previous template at {}, every resource is new",
            path.display()
        ));
        return Ok(Template::from_json("{}")?);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    Template::from_json(&content).with_context(|| format!("Invalid template in {}", path.display()))
}

fn print_resource_diff(diff: &ResourceDiff, detail: bool) {
    println!("  {} {}", ui::change_marker(&diff.change), diff.logical_id);

    if let Change::Modified { fields } = &diff.change {
        ui::dim(&format!("  changed: {}", fields.join(", ")));
        if diff.is_replacement() {
            ui::dim(&format!("  {}", "requires replacement".red()));
        }
    }

    if detail {
        print_text_diff(diff.before.as_ref(), diff.after.as_ref());
    }
}

/// Line diff of the pretty-printed entries
fn print_text_diff(before: Option<&Value>, after: Option<&Value>) {
    let render = |v: Option<&Value>| {
        v.and_then(|v| serde_json::to_string_pretty(v).ok())
            .map(|s| s + "\n")
            .unwrap_or_default()
    };
    let (old, new) = (render(before), render(after));

    let diff = similar::TextDiff::from_lines(&old, &new);
    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => print!("      {}", format!("- {change}").red()),
            similar::ChangeTag::Insert => print!("      {}", format!("+ {change}").green()),
            similar::ChangeTag::Equal => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_previous_is_empty() {
        let dir = TempDir::new().unwrap();
        let t = load_previous(&dir.path().join("Missing.template.json")).unwrap();
        assert!(t.resources.is_empty());
        assert!(t.outputs.is_empty());
    }

    #[test]
    fn test_invalid_previous_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Broken.template.json");
        fs::write(&path, "not json").unwrap();
        let err = load_previous(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid template"));
    }

    #[test]
    fn test_previous_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Prev.template.json");
        let original =
            Template::from_json(r#"{"Resources":{"A":{"Type":"AWS::SNS::Topic"}}}"#).unwrap();
        fs::write(&path, original.to_json_pretty().unwrap()).unwrap();

        let loaded = load_previous(&path).unwrap();
        assert!(compute_diffs(&original, &loaded).is_empty());
    }
}
