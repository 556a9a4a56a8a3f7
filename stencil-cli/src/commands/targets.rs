//! `stencil targets` — list configured targets.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::load_config;

/// Arguments for `stencil targets`.
#[derive(Args, Debug)]
pub struct TargetsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct TargetRow {
    #[tabled(rename = "TARGET")]
    name: String,
    #[tabled(rename = "OUTPUT DIR")]
    output_dir: String,
    #[tabled(rename = "VARS")]
    vars: usize,
}

impl TargetsArgs {
    pub fn run(self, config_path: &Path) -> Result<()> {
        let config = load_config(config_path)?;
        let rows: Vec<TargetRow> = config
            .targets
            .iter()
            .map(|(name, target)| TargetRow {
                name: name.to_string(),
                output_dir: target.output_dir.display().to_string(),
                vars: target.vars.len(),
            })
            .collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize targets JSON")?
            );
            return Ok(());
        }

        println!(
            "templates: {} | delimiters: {} {}",
            config.template_dir.display(),
            config.delimiters.left,
            config.delimiters.right
        );
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
