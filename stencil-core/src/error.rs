//! Error types for stencil-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed YAML or a schema mismatch; serde_yaml supplies the line.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Only schema version 1 is understood.
    #[error("unsupported config version {found}; expected {expected}")]
    UnsupportedVersion { found: i64, expected: i64 },

    /// Delimiters must be non-empty and distinct.
    #[error("invalid delimiters {left:?} / {right:?}: {reason}")]
    InvalidDelimiters {
        left: String,
        right: String,
        reason: &'static str,
    },

    /// A configuration without targets has nothing to render.
    #[error("no targets configured")]
    NoTargets,

    /// Target names are used in logs and errors and must not be blank.
    #[error("target names must not be empty")]
    EmptyTargetName,

    /// A target has no output directory.
    #[error("target '{target}' has an empty output dir")]
    EmptyOutputDir { target: String },

    /// Two targets would write into the same tree.
    #[error("targets '{first}' and '{second}' have overlapping output dirs ({first_dir} / {second_dir})")]
    OverlappingOutputs {
        first: String,
        second: String,
        first_dir: PathBuf,
        second_dir: PathBuf,
    },

    /// An output directory inside the template root would be walked as a template.
    #[error("output dir {dir} of target '{target}' lies inside template dir {template_dir}")]
    OutputInsideTemplateRoot {
        target: String,
        dir: PathBuf,
        template_dir: PathBuf,
    },
}
