pub mod render;
pub mod targets;

use std::path::Path;

use anyhow::{Context, Result};
use stencil_core::{config, Config};

/// Load and validate the configuration, with the path in the error context.
pub fn load_config(path: &Path) -> Result<Config> {
    config::load(path).with_context(|| format!("failed to load configuration {}", path.display()))
}
