//! # stencil-renderer
//!
//! Renders a template directory tree into every configured target's output
//! directory, mirroring the tree and substituting per-target variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use stencil_core::config;
//! use stencil_renderer::Renderer;
//!
//! fn render(path: &Path) {
//!     let Ok(cfg) = config::load(path) else { return };
//!     if let Ok(renderer) = Renderer::new(cfg) {
//!         match renderer.render_all() {
//!             Ok(summary) => println!("{} files rendered", summary.total_files()),
//!             Err(err) => eprintln!("{err}"),
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod renderer;
pub mod walker;

pub use context::{RenderContext, BANNER_KEY};
pub use engine::TemplateEngine;
pub use error::{AggregateError, FsOp, RenderError, TargetError};
pub use renderer::{RenderSummary, Renderer, TargetReport};
pub use walker::TargetStats;
