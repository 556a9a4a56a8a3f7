//! Per-target tree walk: mirror every template directory under the target's
//! output dir and render every template file in place.
//!
//! The walk is sequential and depth-first. A directory's output counterpart
//! is created before any of its entries are processed; sibling order is
//! whatever the filesystem reports.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use stencil_core::{Config, Target};

use crate::context::RenderContext;
use crate::engine::TemplateEngine;
use crate::error::{fs_err, FsOp, RenderError};

/// Counts gathered while rendering one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TargetStats {
    /// Output directories ensured, including the output root.
    pub dirs: usize,
    /// Template files rendered.
    pub files: usize,
}

enum EntryKind {
    Dir,
    File,
    Other,
}

/// One target's render job. Borrows the shared configuration read-only.
pub struct TargetJob<'a> {
    name: &'a str,
    template_dir: &'a Path,
    target: &'a Target,
    engine: &'a TemplateEngine,
    context: RenderContext,
    stats: TargetStats,
}

impl<'a> TargetJob<'a> {
    pub fn new(
        config: &'a Config,
        name: &'a str,
        target: &'a Target,
        engine: &'a TemplateEngine,
    ) -> Self {
        Self {
            name,
            template_dir: &config.template_dir,
            target,
            engine,
            context: RenderContext::new(name, &config.vars, &target.vars),
            stats: TargetStats::default(),
        }
    }

    /// Ensure the output root exists, then walk the template tree from its root.
    ///
    /// The first error aborts the rest of this target's walk.
    pub fn run(mut self) -> Result<TargetStats, RenderError> {
        tracing::info!(target_name = self.name, out = %self.target.output_dir.display(), "processing target");
        ensure_dir(&self.target.output_dir)?;
        self.process_subdir(Path::new(""))?;
        Ok(self.stats)
    }

    fn process_subdir(&mut self, rel: &Path) -> Result<(), RenderError> {
        let out_dir = under(&self.target.output_dir, rel);
        tracing::debug!(target_name = self.name, dir = %out_dir.display(), "ensuring dir");
        ensure_dir(&out_dir)?;
        self.stats.dirs += 1;

        let src_dir = under(self.template_dir, rel);
        let entries = fs::read_dir(&src_dir).map_err(|e| fs_err(FsOp::ReadDir, &src_dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| fs_err(FsOp::ReadDir, &src_dir, e))?;
            let child = rel.join(entry.file_name());
            match classify(&entry)? {
                // Recursion errors already carry their context.
                EntryKind::Dir => self.process_subdir(&child)?,
                EntryKind::File => self.render_file(&child).map_err(|e| RenderError::File {
                    file: child.clone(),
                    source: Box::new(e),
                })?,
                EntryKind::Other => {
                    tracing::debug!(target_name = self.name, entry = %entry.path().display(), "skipping special file");
                }
            }
        }
        Ok(())
    }

    fn render_file(&mut self, rel: &Path) -> Result<(), RenderError> {
        let source_path = self.template_dir.join(rel);
        let out_path = self.target.output_dir.join(rel);
        tracing::debug!(
            target_name = self.name,
            from = %source_path.display(),
            to = %out_path.display(),
            "rendering"
        );

        let source =
            fs::read_to_string(&source_path).map_err(|e| fs_err(FsOp::Read, &source_path, e))?;
        let ctx = self.context.for_file(rel);
        let rendered = self.engine.render(&source_path, &source, &ctx)?;
        fs::write(&out_path, rendered).map_err(|e| fs_err(FsOp::Write, &out_path, e))?;

        self.stats.files += 1;
        Ok(())
    }
}

/// `create_dir_all`; an existing directory is not an error.
fn ensure_dir(dir: &Path) -> Result<(), RenderError> {
    fs::create_dir_all(dir).map_err(|e| fs_err(FsOp::CreateDir, dir, e))
}

fn under(root: &Path, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

/// Symlinks are classified by what they point to.
fn classify(entry: &fs::DirEntry) -> Result<EntryKind, RenderError> {
    let path = entry.path();
    let file_type = entry.file_type().map_err(|e| fs_err(FsOp::Read, &path, e))?;
    let (is_dir, is_file) = if file_type.is_symlink() {
        let meta = fs::metadata(&path).map_err(|e| fs_err(FsOp::Read, &path, e))?;
        (meta.is_dir(), meta.is_file())
    } else {
        (file_type.is_dir(), file_type.is_file())
    };
    Ok(if is_dir {
        EntryKind::Dir
    } else if is_file {
        EntryKind::File
    } else {
        EntryKind::Other
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
