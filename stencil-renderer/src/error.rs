//! Error types for stencil-renderer.
//!
//! Layering inside one target's walk:
//!
//! ```text
//! TargetError::Failed { target }          one per failed target
//!   └─ RenderError::File { file }         added once, at the file boundary
//!        └─ TemplateSyntax | TemplateEvaluation | Filesystem
//! ```
//!
//! Directory recursion never adds a layer of its own.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Filesystem operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    CreateDir,
    ReadDir,
    Read,
    Write,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FsOp::CreateDir => "create dir",
            FsOp::ReadDir => "read dir",
            FsOp::Read => "read",
            FsOp::Write => "write",
        })
    }
}

/// All errors that can arise while rendering a single target.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Directory creation, listing, file read or file write failed.
    #[error("failed to {op} {}: {source}", .path.display())]
    Filesystem {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed template source.
    #[error("template syntax error in {}: {}", .path.display(), chain(.source))]
    TemplateSyntax {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    /// The template parsed but could not be evaluated against the variables.
    #[error("template evaluation error in {}: {}", .path.display(), chain(.source))]
    TemplateEvaluation {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    /// Context layer naming the template file (relative to the template dir).
    #[error("failed to render {}: {source}", .file.display())]
    File {
        file: PathBuf,
        #[source]
        source: Box<RenderError>,
    },
}

impl RenderError {
    /// The innermost error, skipping [`RenderError::File`] context layers.
    pub fn root(&self) -> &RenderError {
        match self {
            RenderError::File { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Convenience constructor for [`RenderError::Filesystem`].
pub(crate) fn fs_err(op: FsOp, path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Filesystem {
        op,
        path: path.into(),
        source,
    }
}

/// Failure of one target inside [`crate::Renderer::render_all`].
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("failed to process target '{target}': {source}")]
    Failed {
        target: String,
        #[source]
        source: RenderError,
    },

    /// The target's worker thread panicked.
    #[error("target '{target}' panicked during rendering")]
    Panicked { target: String },

    /// A target was requested by name but is not configured.
    #[error("unknown target '{target}'")]
    UnknownTarget { target: String },
}

impl TargetError {
    pub fn target(&self) -> &str {
        match self {
            TargetError::Failed { target, .. }
            | TargetError::Panicked { target }
            | TargetError::UnknownTarget { target } => target,
        }
    }
}

/// Returned by a render run when at least one target failed.
#[derive(Debug, Error)]
#[error("{} of {attempted} target(s) failed: {}", .failures.len(), failed_names(.failures))]
pub struct AggregateError {
    /// One entry per failed target, ordered by target name.
    pub failures: Vec<TargetError>,
    /// Number of targets the run was asked to render.
    pub attempted: usize,
}

impl AggregateError {
    pub fn failed_targets(&self) -> Vec<&str> {
        self.failures.iter().map(TargetError::target).collect()
    }
}

fn failed_names(failures: &[TargetError]) -> String {
    failures
        .iter()
        .map(TargetError::target)
        .collect::<Vec<_>>()
        .join(", ")
}

/// tera keeps parser and evaluation detail in its source chain; flatten it.
fn chain(err: &tera::Error) -> String {
    let mut out = err.to_string();
    let mut next = err.source();
    while let Some(cause) = next {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        next = cause.source();
    }
    out
}
