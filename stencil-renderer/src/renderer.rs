//! Multi-target orchestration — one scoped thread per target, one result per
//! target collected at a single join point.

use std::path::PathBuf;
use std::thread;

use serde::Serialize;
use stencil_core::{Config, ConfigError, Target, TargetName};

use crate::engine::TemplateEngine;
use crate::error::{AggregateError, RenderError, TargetError};
use crate::walker::{TargetJob, TargetStats};

/// Outcome of one successfully rendered target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub name: String,
    pub output_dir: PathBuf,
    pub stats: TargetStats,
}

/// Successful run summary, ordered by target name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderSummary {
    pub targets: Vec<TargetReport>,
}

impl RenderSummary {
    pub fn total_files(&self) -> usize {
        self.targets.iter().map(|t| t.stats.files).sum()
    }
}

/// Owns a validated configuration and renders its targets.
///
/// Render methods take `&self`: worker threads borrow the configuration and
/// never get mutable access to it.
pub struct Renderer {
    config: Config,
    engine: TemplateEngine,
}

impl Renderer {
    /// Construct a [`Renderer`]; fails if `config` does not pass validation.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = TemplateEngine::new(config.delimiters.clone());
        Ok(Renderer { config, engine })
    }

    /// Render every configured target concurrently.
    ///
    /// Every target is attempted regardless of failures in others. Returns
    /// `Err` if at least one target failed; files already written by a
    /// failing target are left as they are.
    pub fn render_all(&self) -> Result<RenderSummary, AggregateError> {
        let jobs: Vec<_> = self.config.targets.iter().collect();
        self.run(jobs, Vec::new())
    }

    /// Render only the named targets. Unknown names are reported as
    /// [`TargetError::UnknownTarget`] without stopping the known ones.
    pub fn render_targets<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<RenderSummary, AggregateError> {
        let mut jobs: Vec<(&TargetName, &Target)> = Vec::new();
        let mut unknown = Vec::new();
        for name in names {
            let name = name.as_ref();
            match self.config.targets.get_key_value(&TargetName::from(name)) {
                Some(job) => jobs.push(job),
                None => unknown.push(TargetError::UnknownTarget {
                    target: name.to_string(),
                }),
            }
        }
        jobs.sort_by(|a, b| a.0.cmp(b.0));
        jobs.dedup_by(|a, b| a.0 == b.0);
        unknown.sort_by(|a, b| a.target().cmp(b.target()));
        unknown.dedup_by(|a, b| a.target() == b.target());
        self.run(jobs, unknown)
    }

    fn run(
        &self,
        jobs: Vec<(&TargetName, &Target)>,
        mut failures: Vec<TargetError>,
    ) -> Result<RenderSummary, AggregateError> {
        let attempted = jobs.len() + failures.len();
        tracing::info!(targets = jobs.len(), "rendering targets");

        let results: Vec<(&TargetName, &Target, thread::Result<Result<TargetStats, RenderError>>)> =
            thread::scope(|scope| {
                let handles: Vec<_> = jobs
                    .iter()
                    .map(|&(name, target)| {
                        let handle = scope.spawn(move || {
                            TargetJob::new(&self.config, name.as_str(), target, &self.engine).run()
                        });
                        (name, target, handle)
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|(name, target, handle)| (name, target, handle.join()))
                    .collect()
            });

        let mut summary = RenderSummary::default();
        for (name, target, outcome) in results {
            match outcome {
                Ok(Ok(stats)) => {
                    tracing::info!(
                        target_name = name.as_str(),
                        dirs = stats.dirs,
                        files = stats.files,
                        "target rendered"
                    );
                    summary.targets.push(TargetReport {
                        name: name.to_string(),
                        output_dir: target.output_dir.clone(),
                        stats,
                    });
                }
                Ok(Err(source)) => failures.push(TargetError::Failed {
                    target: name.to_string(),
                    source,
                }),
                Err(_) => failures.push(TargetError::Panicked {
                    target: name.to_string(),
                }),
            }
        }

        if failures.is_empty() {
            return Ok(summary);
        }
        failures.sort_by(|a, b| a.target().cmp(b.target()));
        for failure in &failures {
            tracing::error!(target_name = failure.target(), "{failure}");
        }
        Err(AggregateError {
            failures,
            attempted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(root: &TempDir) -> Config {
        let tpl = root.path().join("tpl");
        fs::create_dir_all(&tpl).unwrap();
        fs::write(tpl.join("a.txt"), "{{ .who }}").unwrap();
        Config::new(tpl)
            .with_var("who", "global")
            .with_target("one", Target::new(root.path().join("out/one")))
            .with_target("two", Target::new(root.path().join("out/two")).with_var("who", "two"))
    }

    #[test]
    fn new_rejects_invalid_config() {
        let root = TempDir::new().unwrap();
        let mut cfg = config(&root);
        cfg.targets.clear();
        assert!(matches!(Renderer::new(cfg), Err(ConfigError::NoTargets)));
    }

    #[test]
    fn render_all_summarises_every_target() {
        let root = TempDir::new().unwrap();
        let renderer = Renderer::new(config(&root)).unwrap();
        let summary = renderer.render_all().unwrap();
        let names: Vec<_> = summary.targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["one", "two"]);
        assert_eq!(summary.total_files(), 2);
        assert_eq!(fs::read_to_string(root.path().join("out/one/a.txt")).unwrap(), "global");
        assert_eq!(fs::read_to_string(root.path().join("out/two/a.txt")).unwrap(), "two");
    }

    #[test]
    fn render_targets_renders_subset_and_reports_unknown() {
        let root = TempDir::new().unwrap();
        let renderer = Renderer::new(config(&root)).unwrap();
        let err = renderer.render_targets(&["two", "ghost", "two"]).unwrap_err();
        assert_eq!(err.attempted, 2);
        assert_eq!(err.failed_targets(), ["ghost"]);
        assert!(matches!(err.failures[0], TargetError::UnknownTarget { .. }));
        assert!(root.path().join("out/two/a.txt").exists());
        assert!(!root.path().join("out/one").exists());
    }

    #[test]
    fn render_targets_known_only_succeeds() {
        let root = TempDir::new().unwrap();
        let renderer = Renderer::new(config(&root)).unwrap();
        let summary = renderer.render_targets(&["one"]).unwrap();
        assert_eq!(summary.targets.len(), 1);
        assert_eq!(summary.targets[0].stats, TargetStats { dirs: 1, files: 1 });
    }
}
