//! Resolved variable mapping: global vars merged with target vars, plus the
//! reserved banner key.
//!
//! # Precedence
//!
//! 1. global `vars`
//! 2. target `vars` (override globals key by key; the merge is shallow)
//! 3. [`BANNER_KEY`] (always set by the renderer; a user value under this key
//!    is discarded with a warning)

use std::path::Path;

use stencil_core::Vars;

/// Reserved variable holding a one-line "generated" notice for the current file.
pub const BANNER_KEY: &str = "stencil_banner";

/// Merge global and target variables. Target entries win on collision.
pub fn resolve_vars(global: &Vars, target: &Vars) -> Vars {
    let mut resolved = global.clone();
    resolved.extend(target.iter().map(|(k, v)| (k.clone(), v.clone())));
    resolved
}

/// Banner text for the template at `template_rel` (relative to the template dir).
///
/// Contains no timestamp, so repeated runs render identical bytes.
pub fn banner(template_rel: &Path) -> String {
    format!(
        "Generated by stencil from {}. Do not edit.",
        template_rel.to_string_lossy().replace('\\', "/")
    )
}

/// Per-target rendering context; extended per file with the banner.
#[derive(Debug, Clone)]
pub struct RenderContext {
    vars: Vars,
    base: tera::Context,
}

impl RenderContext {
    /// Build the resolved mapping for `target_name`.
    pub fn new(target_name: &str, global: &Vars, target: &Vars) -> Self {
        let mut vars = resolve_vars(global, target);
        if vars.remove(BANNER_KEY).is_some() {
            tracing::warn!(
                target_name,
                key = BANNER_KEY,
                "user variable uses a reserved key; the generated banner replaces it"
            );
        }

        let mut base = tera::Context::new();
        for (key, value) in &vars {
            base.insert(key.as_str(), value);
        }
        Self { vars, base }
    }

    /// Resolved user variables (banner excluded).
    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    /// Full mapping for one template file.
    pub fn for_file(&self, template_rel: &Path) -> tera::Context {
        let mut ctx = self.base.clone();
        ctx.insert(BANNER_KEY, &banner(template_rel));
        ctx
    }
}
