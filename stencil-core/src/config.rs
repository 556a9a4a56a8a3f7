//! YAML configuration loading and structural validation.
//!
//! # File layout
//!
//! ```yaml
//! version: 1
//! template-dir: templates
//! delims: { left: "[[", right: "]]" }   # optional
//! vars: { env: prod }                   # optional
//! targets:
//!   web:
//!     dir: out/web
//!     vars: { env: staging }
//! ```
//!
//! Relative paths in a file loaded with [`load`] are resolved against the
//! file's own directory. [`parse`] leaves them untouched.

use std::path::{Component, Path, PathBuf};

use crate::error::ConfigError;
use crate::types::Config;

// ---------------------------------------------------------------------------
// 1. Load / parse
// ---------------------------------------------------------------------------

/// Read, parse and validate the configuration file at `path`.
///
/// Returns `ConfigError::Io` if the file cannot be read and
/// `ConfigError::Parse` (with path + line context) if it is malformed.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_unvalidated(&contents, path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.resolve_relative_to(base);
    config.validate()?;
    Ok(config)
}

/// Parse and validate a configuration from a YAML string.
pub fn parse(yaml: &str) -> Result<Config, ConfigError> {
    let config = parse_unvalidated(yaml, Path::new("<inline>"))?;
    config.validate()?;
    Ok(config)
}

fn parse_unvalidated(yaml: &str, origin: &Path) -> Result<Config, ConfigError> {
    let mut config: Config = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    config.delimiters.fill_defaults();
    Ok(config)
}

// ---------------------------------------------------------------------------
// 2. Validation
// ---------------------------------------------------------------------------

impl Config {
    /// Check the structural invariants the renderer relies on.
    ///
    /// Output directories are compared lexically (after folding `.` and `..`),
    /// since they usually do not exist yet.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != Config::VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                expected: Config::VERSION,
            });
        }

        let delims = &self.delimiters;
        let invalid = |reason| ConfigError::InvalidDelimiters {
            left: delims.left.clone(),
            right: delims.right.clone(),
            reason,
        };
        if delims.left.trim().is_empty() || delims.right.trim().is_empty() {
            return Err(invalid("delimiters must not be blank"));
        }
        if delims.left == delims.right {
            return Err(invalid("left and right delimiters must differ"));
        }

        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        let template_dir = normalize(&self.template_dir);
        let mut seen: Vec<(&str, PathBuf)> = Vec::with_capacity(self.targets.len());
        for (name, target) in &self.targets {
            if name.as_str().trim().is_empty() {
                return Err(ConfigError::EmptyTargetName);
            }
            if target.output_dir.as_os_str().is_empty() {
                return Err(ConfigError::EmptyOutputDir {
                    target: name.to_string(),
                });
            }

            let dir = normalize(&target.output_dir);
            if contains(&template_dir, &dir) {
                return Err(ConfigError::OutputInsideTemplateRoot {
                    target: name.to_string(),
                    dir: target.output_dir.clone(),
                    template_dir: self.template_dir.clone(),
                });
            }
            if let Some((other, other_dir)) = seen
                .iter()
                .find(|(_, d)| contains(&dir, d) || contains(d, &dir))
            {
                return Err(ConfigError::OverlappingOutputs {
                    first: (*other).to_string(),
                    second: name.to_string(),
                    first_dir: other_dir.clone(),
                    second_dir: dir,
                });
            }
            seen.push((name.as_str(), dir));
        }
        Ok(())
    }

    /// Join every relative path in the configuration onto `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.template_dir.is_relative() {
            self.template_dir = base.join(&self.template_dir);
        }
        for target in self.targets.values_mut() {
            if target.output_dir.is_relative() {
                target.output_dir = base.join(&target.output_dir);
            }
        }
    }
}

/// Lexically fold `.` and `..` components. Pure, no I/O.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether normalized `path` lies at or below normalized `root`.
///
/// An empty `root` is the current directory: it holds every relative path
/// that does not climb out with a leading `..`.
fn contains(root: &Path, path: &Path) -> bool {
    match path.strip_prefix(root) {
        Ok(rest) => {
            (!root.as_os_str().is_empty() || path.is_relative())
                && !matches!(rest.components().next(), Some(Component::ParentDir))
        }
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
