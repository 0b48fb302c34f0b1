// tests/dev_target.rs

mod common;
use crate::common::{ProjectBuilder, TestResult, init_tracing};

use std::path::Path;

use serde_json::json;

use splitscript::commands::dev::resolve_target;
use splitscript::config::{self, detect_variant};
use splitscript::errors::SplitscriptError;
use splitscript::types::AuthoringVariant;

#[test]
fn folder_target_runs_default_main() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().with_file("app/index.js", "").build();

    let target = resolve_target(project.root(), Path::new("app"))?;
    assert_eq!(target.project_root, project.path("app"));
    assert_eq!(target.entry_source, project.path("app/index.js"));
    Ok(())
}

#[test]
fn typed_folder_defaults_to_index_ts() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .typescript()
        .with_file("index.ts", "")
        .build();

    let target = resolve_target(project.root(), Path::new("."))?;
    assert_eq!(target.entry_source, project.path("index.ts"));
    Ok(())
}

#[test]
fn configured_main_must_exist() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .with_setting("main", json!("server.js"))
        .with_file("index.js", "")
        .build();

    let err = resolve_target(project.root(), Path::new(".")).unwrap_err();
    assert!(matches!(err, SplitscriptError::MissingEntryPoint(ref p) if p.ends_with("server.js")));
    Ok(())
}

#[test]
fn file_target_runs_from_its_folder() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().with_file("bot/main.ts", "").build();

    let target = resolve_target(project.root(), Path::new("bot/main.ts"))?;
    assert_eq!(target.project_root, project.path("bot"));
    assert_eq!(target.entry_source, project.path("bot/main.ts"));

    let err = resolve_target(project.root(), Path::new("bot/missing.ts")).unwrap_err();
    assert!(matches!(err, SplitscriptError::MissingEntryPoint(_)));
    Ok(())
}

#[test]
fn variant_follows_manifest_markers() -> TestResult {
    init_tracing();
    let plain = ProjectBuilder::new().build();
    let settings = config::load(plain.root())?.settings;
    assert_eq!(detect_variant(plain.root(), &settings)?, AuthoringVariant::CommonJs);

    let esm = ProjectBuilder::new().es_module().build();
    assert_eq!(detect_variant(esm.root(), &settings)?, AuthoringVariant::EsModule);

    let typed = ProjectBuilder::new().es_module().typescript().build();
    assert_eq!(detect_variant(typed.root(), &settings)?, AuthoringVariant::Typed);

    let forced = ProjectBuilder::new().with_setting("typescript", json!(true)).build();
    let forced_settings = config::load(forced.root())?.settings;
    assert_eq!(detect_variant(forced.root(), &forced_settings)?, AuthoringVariant::Typed);

    let broken = ProjectBuilder::new().with_file("package.json", "{").build();
    let err = detect_variant(broken.root(), &settings).unwrap_err();
    assert!(matches!(err, SplitscriptError::MalformedConfig { .. }));
    Ok(())
}
