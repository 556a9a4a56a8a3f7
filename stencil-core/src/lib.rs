//! Stencil core library — configuration types, loading, validation, errors.
//!
//! Public API surface:
//! - [`types`] — [`Config`], [`Target`], [`Delimiters`] and the [`TargetName`] newtype
//! - [`error`] — [`ConfigError`]
//! - [`config`] — load / parse / validate

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{Config, Delimiters, Target, TargetName, Vars};
