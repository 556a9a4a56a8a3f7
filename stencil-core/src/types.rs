//! Domain types for a stencil configuration.
//!
//! All path fields use `PathBuf`; variable values are `serde_json::Value`
//! kept in ordered maps so every lookup and merge is deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Variable mapping handed to templates. Values may be any YAML/JSON value.
pub type Vars = BTreeMap<String, serde_json::Value>;

/// Default opening delimiter of the template engine.
pub const DEFAULT_LEFT_DELIM: &str = "{{";
/// Default closing delimiter of the template engine.
pub const DEFAULT_RIGHT_DELIM: &str = "}}";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a render target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetName(pub String);

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TargetName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TargetName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl TargetName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Delimiters
// ---------------------------------------------------------------------------

/// Open/close markers recognised around template actions.
///
/// Either side may be omitted (or left empty) in the file, in which case the
/// engine default (`{{` / `}}`) is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    #[serde(default = "default_left")]
    pub left: String,
    #[serde(default = "default_right")]
    pub right: String,
}

fn default_left() -> String {
    DEFAULT_LEFT_DELIM.to_string()
}

fn default_right() -> String {
    DEFAULT_RIGHT_DELIM.to_string()
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            left: default_left(),
            right: default_right(),
        }
    }
}

impl Delimiters {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Replace empty sides with the engine defaults.
    pub(crate) fn fill_defaults(&mut self) {
        if self.left.is_empty() {
            self.left = default_left();
        }
        if self.right.is_empty() {
            self.right = default_right();
        }
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// A named rendering destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Root of this target's output tree.
    #[serde(rename = "dir", alias = "output-dir")]
    pub output_dir: PathBuf,
    /// Target-level variables; these override globals on key collision.
    #[serde(default)]
    pub vars: Vars,
}

impl Target {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            vars: Vars::new(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// A complete stencil configuration.
///
/// Built once before rendering starts and only ever shared by reference
/// afterwards; nothing in the render path takes it mutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Schema version. Only `1` is accepted.
    pub version: i64,
    /// Root of the template tree.
    #[serde(rename = "template-dir", alias = "template-root")]
    pub template_dir: PathBuf,
    #[serde(default, rename = "delims")]
    pub delimiters: Delimiters,
    /// Global variables shared by every target.
    #[serde(default)]
    pub vars: Vars,
    pub targets: BTreeMap<TargetName, Target>,
}

impl Config {
    /// Current (and only) supported schema version.
    pub const VERSION: i64 = 1;

    /// An empty configuration rooted at `template_dir` with default delimiters.
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            version: Self::VERSION,
            template_dir: template_dir.into(),
            delimiters: Delimiters::default(),
            vars: Vars::new(),
            targets: BTreeMap::new(),
        }
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_target(mut self, name: impl Into<TargetName>, target: Target) -> Self {
        self.targets.insert(name.into(), target);
        self
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(&TargetName::from(name))
    }
}
