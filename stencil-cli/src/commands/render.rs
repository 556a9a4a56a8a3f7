//! `stencil render` — render every (or the selected) target.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use stencil_renderer::{AggregateError, RenderSummary, Renderer, TargetReport};

use super::load_config;

/// Arguments for `stencil render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Render only this target (repeatable).
    #[arg(short, long = "target", value_name = "NAME")]
    pub targets: Vec<String>,

    /// Emit a machine-readable JSON report on stdout.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    ok: bool,
    rendered: &'a [TargetReport],
    failed: Vec<JsonFailure>,
}

#[derive(Serialize)]
struct JsonFailure {
    target: String,
    error: String,
}

impl RenderArgs {
    pub fn run(self, config_path: &Path) -> Result<()> {
        let config = load_config(config_path)?;
        let renderer = Renderer::new(config).context("invalid configuration")?;

        let outcome = if self.targets.is_empty() {
            renderer.render_all()
        } else {
            renderer.render_targets(&self.targets)
        };

        if self.json {
            print_json(&outcome)?;
        } else {
            print_human(&outcome);
        }

        if let Err(err) = outcome {
            bail!(err);
        }
        Ok(())
    }
}

fn print_json(outcome: &Result<RenderSummary, AggregateError>) -> Result<()> {
    let empty = RenderSummary::default();
    let (summary, failed) = match outcome {
        Ok(summary) => (summary, Vec::new()),
        Err(err) => (
            &empty,
            err.failures
                .iter()
                .map(|f| JsonFailure {
                    target: f.target().to_string(),
                    error: f.to_string(),
                })
                .collect(),
        ),
    };
    let report = JsonReport {
        ok: outcome.is_ok(),
        rendered: &summary.targets,
        failed,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize render report")?
    );
    Ok(())
}

fn print_human(outcome: &Result<RenderSummary, AggregateError>) {
    match outcome {
        Ok(summary) => {
            for t in &summary.targets {
                println!(
                    "{} '{}' → {} ({} files, {} dirs)",
                    "✓".green().bold(),
                    t.name,
                    t.output_dir.display(),
                    t.stats.files,
                    t.stats.dirs
                );
            }
            println!(
                "{} files rendered for {} target(s)",
                summary.total_files(),
                summary.targets.len()
            );
        }
        Err(err) => {
            for failure in &err.failures {
                println!("{} {failure}", "✗".red().bold());
            }
            println!("{} of {} target(s) failed", err.failures.len(), err.attempted);
        }
    }
}
