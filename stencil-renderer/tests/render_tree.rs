//! End-to-end rendering of template trees into multiple targets.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use stencil_core::{Config, Delimiters, Target};
use stencil_renderer::{RenderError, Renderer, TargetError, BANNER_KEY};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Relative path → `Some(contents)` for files, `None` for directories.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
        for entry in fs::read_dir(dir).expect("read dir") {
            let path = entry.expect("entry").path();
            let rel = path.strip_prefix(root).expect("prefix").to_path_buf();
            if path.is_dir() {
                out.insert(rel, None);
                walk(root, &path, out);
            } else {
                out.insert(rel, Some(fs::read(&path).expect("read")));
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

fn shape(root: &Path) -> Vec<PathBuf> {
    snapshot(root).into_keys().collect()
}

fn template_tree(root: &assert_fs::TempDir) -> PathBuf {
    let tpl = root.child("templates");
    tpl.child("greeting.txt")
        .write_str("Hello {{.name}} in {{.env}}")
        .unwrap();
    tpl.child("config/app.yaml")
        .write_str("name: {{ .name }}\nreplicas: {{ .replicas }}\n")
        .unwrap();
    tpl.child("assets/icons").create_dir_all().unwrap();
    tpl.child("assets/README.md")
        .write_str("<!-- {{ .stencil_banner }} -->\n")
        .unwrap();
    tpl.path().to_path_buf()
}

fn scenario_config(root: &assert_fs::TempDir) -> Config {
    Config::new(template_tree(root))
        .with_var("env", "prod")
        .with_var("replicas", 2)
        .with_target(
            "web",
            Target::new(root.path().join("out/web"))
                .with_var("env", "staging")
                .with_var("name", "app1"),
        )
        .with_target(
            "api",
            Target::new(root.path().join("out/api")).with_var("name", "api1"),
        )
}

// ---------------------------------------------------------------------------
// 1. Structure and content
// ---------------------------------------------------------------------------

#[test]
fn target_vars_override_globals_in_output() {
    let root = assert_fs::TempDir::new().unwrap();
    Renderer::new(scenario_config(&root))
        .unwrap()
        .render_all()
        .expect("render");

    root.child("out/web/greeting.txt")
        .assert("Hello app1 in staging");
    root.child("out/api/greeting.txt").assert("Hello api1 in prod");
    root.child("out/web/config/app.yaml")
        .assert("name: app1\nreplicas: 2\n");
}

#[test]
fn every_target_mirrors_the_template_tree() {
    let root = assert_fs::TempDir::new().unwrap();
    let config = scenario_config(&root);
    let expected = shape(&config.template_dir);
    Renderer::new(config).unwrap().render_all().expect("render");

    assert_eq!(shape(&root.path().join("out/web")), expected);
    assert_eq!(shape(&root.path().join("out/api")), expected);
}

#[test]
fn empty_template_dirs_are_created_empty() {
    let root = assert_fs::TempDir::new().unwrap();
    Renderer::new(scenario_config(&root))
        .unwrap()
        .render_all()
        .expect("render");

    let icons = root.child("out/web/assets/icons");
    icons.assert(predicate::path::is_dir());
    assert_eq!(fs::read_dir(icons.path()).unwrap().count(), 0);
}

#[test]
fn banner_names_the_template() {
    let root = assert_fs::TempDir::new().unwrap();
    let config = scenario_config(&root).with_var(BANNER_KEY, "user value is ignored");
    Renderer::new(config).unwrap().render_all().expect("render");

    root.child("out/web/assets/README.md").assert(
        "<!-- Generated by stencil from assets/README.md. Do not edit. -->\n",
    );
}

#[test]
fn custom_delimiters_keep_engine_braces_literal() {
    let root = assert_fs::TempDir::new().unwrap();
    let tpl = root.child("tpl");
    tpl.child("chart.yaml")
        .write_str("image: [[ .image ]]\nhelm: {{ .Values.tag }}\n")
        .unwrap();
    let config = Config::new(tpl.path())
        .with_delimiters(Delimiters::new("[[", "]]"))
        .with_target(
            "prod",
            Target::new(root.path().join("out")).with_var("image", "nginx:1.27"),
        );
    Renderer::new(config).unwrap().render_all().expect("render");

    root.child("out/chart.yaml")
        .assert("image: nginx:1.27\nhelm: {{ .Values.tag }}\n");
}

// ---------------------------------------------------------------------------
// 2. Determinism and idempotence
// ---------------------------------------------------------------------------

#[test]
fn repeated_runs_are_byte_identical() {
    let root = assert_fs::TempDir::new().unwrap();
    let renderer = Renderer::new(scenario_config(&root)).unwrap();

    renderer.render_all().expect("first run");
    let first = snapshot(&root.path().join("out"));
    renderer.render_all().expect("second run");
    let second = snapshot(&root.path().join("out"));

    assert_eq!(first, second);
}

#[test]
fn partially_existing_output_converges_to_clean_result() {
    let clean_root = assert_fs::TempDir::new().unwrap();
    Renderer::new(scenario_config(&clean_root))
        .unwrap()
        .render_all()
        .expect("clean run");

    let root = assert_fs::TempDir::new().unwrap();
    root.child("out/web/assets").create_dir_all().unwrap();
    root.child("out/web/greeting.txt")
        .write_str("stale content that is much longer than the rendered text")
        .unwrap();
    Renderer::new(scenario_config(&root))
        .unwrap()
        .render_all()
        .expect("run over partial output");

    assert_eq!(
        snapshot(&root.path().join("out")),
        snapshot(&clean_root.path().join("out"))
    );
}

// ---------------------------------------------------------------------------
// 3. Failures
// ---------------------------------------------------------------------------

#[test]
fn failing_target_does_not_stop_others() {
    let root = assert_fs::TempDir::new().unwrap();
    let tpl = root.child("tpl");
    tpl.child("ok.txt").write_str("ok").unwrap();
    tpl.child("needs_port.txt").write_str("port={{ .port }}").unwrap();
    root.child("out/broken/keep.txt").write_str("untouched").unwrap();

    let config = Config::new(tpl.path())
        .with_target("broken", Target::new(root.path().join("out/broken")))
        .with_target(
            "fine",
            Target::new(root.path().join("out/fine")).with_var("port", 8080),
        );
    let err = Renderer::new(config).unwrap().render_all().unwrap_err();

    assert_eq!(err.attempted, 2);
    assert_eq!(err.failed_targets(), ["broken"]);
    match &err.failures[0] {
        TargetError::Failed { target, source } => {
            assert_eq!(target, "broken");
            assert!(
                matches!(source.root(), RenderError::TemplateEvaluation { .. }),
                "got: {source}"
            );
            assert!(source.to_string().contains("needs_port.txt"));
        }
        other => panic!("unexpected failure: {other}"),
    }

    root.child("out/fine/needs_port.txt").assert("port=8080");
    root.child("out/fine/ok.txt").assert("ok");
    root.child("out/broken/keep.txt").assert("untouched");
    root.child("out/broken/needs_port.txt")
        .assert(predicate::path::missing());
    let ok = root.child("out/broken/ok.txt");
    if ok.path().exists() {
        ok.assert("ok");
    }
}

#[test]
fn malformed_template_is_reported_per_target() {
    let root = assert_fs::TempDir::new().unwrap();
    let tpl = root.child("tpl");
    tpl.child("nested/bad.txt").write_str("Hello {{ .name").unwrap();

    let config = Config::new(tpl.path())
        .with_target("a", Target::new(root.path().join("out/a")).with_var("name", "x"))
        .with_target("b", Target::new(root.path().join("out/b")).with_var("name", "y"));
    let err = Renderer::new(config).unwrap().render_all().unwrap_err();

    assert_eq!(err.failed_targets(), ["a", "b"]);
    for failure in &err.failures {
        let TargetError::Failed { source, .. } = failure else {
            panic!("unexpected failure: {failure}");
        };
        match source {
            RenderError::File { file, source } => {
                assert_eq!(file, Path::new("nested/bad.txt"));
                assert!(matches!(**source, RenderError::TemplateSyntax { .. }));
            }
            other => panic!("expected a file-level error, got: {other}"),
        }
        let msg = failure.to_string();
        assert!(msg.contains(&format!("target '{}'", failure.target())), "got: {msg}");
        assert!(msg.contains("bad.txt"), "got: {msg}");
    }
    // Directory creation precedes the failing file.
    root.child("out/a/nested").assert(predicate::path::is_dir());
}

#[test]
fn missing_template_root_fails_every_target() {
    let root = assert_fs::TempDir::new().unwrap();
    let config = Config::new(root.path().join("nowhere"))
        .with_target("a", Target::new(root.path().join("out/a")))
        .with_target("b", Target::new(root.path().join("out/b")));
    let err = Renderer::new(config).unwrap().render_all().unwrap_err();

    assert_eq!(err.failures.len(), 2);
    for failure in &err.failures {
        assert!(failure.to_string().contains("nowhere"), "got: {failure}");
    }
}

// ---------------------------------------------------------------------------
// 4. Concurrency
// ---------------------------------------------------------------------------

#[test]
fn many_targets_render_concurrently() {
    let root = assert_fs::TempDir::new().unwrap();
    let tpl = root.child("tpl");
    tpl.child("id.txt").write_str("{{ .id }}").unwrap();
    tpl.child("deep/er/id.txt").write_str("{{ .id }}-deep").unwrap();

    let mut config = Config::new(tpl.path());
    for i in 0..24 {
        config = config.with_target(
            format!("t{i:02}").as_str(),
            Target::new(root.path().join(format!("out/t{i:02}"))).with_var("id", i),
        );
    }
    let summary = Renderer::new(config).unwrap().render_all().expect("render");

    assert_eq!(summary.targets.len(), 24);
    assert_eq!(summary.total_files(), 48);
    for i in 0..24 {
        root.child(format!("out/t{i:02}/id.txt")).assert(i.to_string());
        root.child(format!("out/t{i:02}/deep/er/id.txt"))
            .assert(format!("{i}-deep"));
    }
}
