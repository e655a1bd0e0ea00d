//! `stackgen synth`

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::Context;
use crate::cli::SynthArgs;
use crate::ui;

pub fn run(ctx: &Context, args: SynthArgs) -> Result<()> {
    let (config, app) = super::assemble(ctx)?;
    let assembly = app.synth().context("Synthesis failed")?;

    if args.stdout {
        let artifact = assembly
            .artifact(&config.stack_name)
            .with_context(|| format!("Stack {} was not synthesized", config.stack_name))?;
        println!("{}", artifact.template.to_json_pretty()?);
        return Ok(());
    }

    let files = assembly.files()?;
    let changed = changed_files(&args.out, &files);

    if changed.is_empty() {
        if !ctx.quiet {
            ui::success(&format!("{} is up to date", args.out.display()));
        }
        return Ok(());
    }

    let overwriting: Vec<&PathBuf> = changed.iter().filter(|p| p.exists()).collect();
    if !overwriting.is_empty() && !args.force && !confirm_overwrite(&args.out, overwriting.len())? {
        ui::warn("Aborted, nothing was written");
        return Ok(());
    }

    write_files(&args.out, &files)?;

    if !ctx.quiet {
        ui::success(&format!(
            "Synthesized {} to {}",
            config.stack_name,
            args.out.display()
        ));
        for (name, _) in &files {
            ui::dim(name);
        }
        if let Some(artifact) = assembly.artifact(&config.stack_name) {
            ui::kv("resources", &artifact.template.resources.len().to_string());
            ui::kv("environment", &artifact.environment.uri());
        }
    }
    Ok(())
}

/// Paths under `out` whose contents would change
fn changed_files(out: &Path, files: &[(String, String)]) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|(name, contents)| {
            !fs::read_to_string(out.join(name)).is_ok_and(|existing| existing == *contents)
        })
        .map(|(name, _)| out.join(name))
        .collect()
}

fn confirm_overwrite(out: &Path, count: usize) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(format!(
            "Overwrite {} in {}?",
            ui::plural(count, "file"),
            out.display()
        ))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

fn write_files(out: &Path, files: &[(String, String)]) -> Result<()> {
    fs::create_dir_all(out).with_context(|| format!("Could not create {}", out.display()))?;
    for (name, contents) in files {
        let path = out.join(name);
        fs::write(&path, contents).with_context(|| format!("Could not write {}", path.display()))?;
        log::debug!("Wrote {}", path.display());
    }
    Ok(())
}
