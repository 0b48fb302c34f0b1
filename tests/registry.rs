// tests/registry.rs

mod common;
use crate::common::{ProjectBuilder, TestResult, init_tracing};

use std::fs;
use std::sync::Arc;

use serde_json::json;

use splitscript::config::{self, ConfigStore, PackageRegistration};
use splitscript::context::ProjectContext;
use splitscript::errors::SplitscriptError;

fn discord() -> PackageRegistration {
    PackageRegistration::new("discord", "@splitscript.js/discord", ["message/*", "guild/**"])
}

#[test]
fn register_writes_exactly_the_supplied_fields() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().build();
    project.store().register(&discord())?;

    let file = project.ss_json();
    assert_eq!(
        file["packages"]["discord"],
        json!({
            "validEventPatterns": ["message/*", "guild/**"],
            "moduleName": "@splitscript.js/discord"
        })
    );
    Ok(())
}

#[test]
fn second_registration_in_same_context_fails() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().build();
    let store = project.store();
    store.register(&discord())?;

    let err = store.register(&discord()).unwrap_err();
    assert!(matches!(err, SplitscriptError::DuplicatePackage(ref name) if name == "discord"));
    Ok(())
}

#[test]
fn separate_contexts_overwrite_last_writer_wins() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().build();
    project.store().register(&discord())?;

    let updated = PackageRegistration::new("discord", "discord-v2", ["ready"]);
    project.store().register(&updated)?;

    let entry = project.store().get("discord")?.expect("registered");
    assert_eq!(entry, updated);
    Ok(())
}

#[test]
fn register_preserves_other_entries_and_unknown_keys() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .with_package("slack", "@splitscript.js/slack", &["message"])
        .with_setting("dev", json!("out"))
        .with_setting("custom", json!({ "keep": true }))
        .build();

    project.store().register(&discord())?;

    let file = project.ss_json();
    assert_eq!(file["packages"]["slack"]["moduleName"], "@splitscript.js/slack");
    assert!(file["packages"]["discord"].is_object());
    assert_eq!(file["dev"], "out");
    assert_eq!(file["custom"], json!({ "keep": true }));
    Ok(())
}

#[test]
fn malformed_registry_is_an_error_and_left_untouched() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().build();
    project.write("ss.json", "{ not json");

    let err = project.store().register(&discord()).unwrap_err();
    assert!(matches!(err, SplitscriptError::MalformedConfig { .. }));
    assert_eq!(project.read("ss.json"), "{ not json");
    Ok(())
}

#[test]
fn registration_can_be_retried_after_fixing_the_registry() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().build();
    let store = project.store();
    project.write("ss.json", "{ not json");

    assert!(store.register(&discord()).is_err());
    assert!(!store.context().is_registered("discord"));

    project.write("ss.json", "{}");
    store.register(&discord())?;
    assert!(store.get("discord")?.is_some());
    Ok(())
}

#[test]
fn missing_registry_is_empty_and_created_on_register() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let loaded = config::load(dir.path())?;
    assert!(loaded.packages.is_empty());

    let store = ConfigStore::new(Arc::new(ProjectContext::new(dir.path())));
    store.register(&discord())?;
    assert!(dir.path().join("ss.json").exists());
    assert!(store.get("discord")?.is_some());
    assert!(store.get("slack")?.is_none());
    Ok(())
}

#[test]
fn legacy_field_names_are_read_and_rewritten() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().build();
    project.write(
        "ss.json",
        r#"{ "packages": { "old": { "validEvents": ["a/b"], "packageName": "legacy" } } }"#,
    );

    let old = project.store().get("old")?.expect("legacy entry");
    assert_eq!(old.module_name, "legacy");
    assert_eq!(old.valid_event_patterns, vec!["a/b"]);

    project.store().register(&discord())?;
    let file = project.ss_json();
    assert_eq!(
        file["packages"]["old"],
        json!({ "validEventPatterns": ["a/b"], "moduleName": "legacy" })
    );
    Ok(())
}

#[test]
fn invalid_registrations_are_rejected_before_claiming() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().build();
    let store = project.store();

    let err = store
        .register(&PackageRegistration::new("a/b", "m", ["x"]))
        .unwrap_err();
    assert!(matches!(err, SplitscriptError::ConfigError(_)));
    assert!(!store.context().is_registered("a/b"));

    let err = store
        .register(&PackageRegistration::new("ok", "m", [" "]))
        .unwrap_err();
    assert!(matches!(err, SplitscriptError::ConfigError(_)));
    Ok(())
}

#[test]
fn existing_events_lists_declared_folders_with_entries() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .with_package("chat", "chat-lib", &["message/create", "user/join", "user/leave"])
        .with_file("functions/chat/message/create/1.js", "")
        .build();
    fs::create_dir_all(project.path("functions/chat/user/join"))?;

    let events = project.store().existing_events("chat")?;
    assert_eq!(events, vec!["message/create"]);
    assert!(project.store().existing_events("unknown")?.is_empty());
    Ok(())
}

#[test]
fn settings_fall_back_to_defaults() -> TestResult {
    let project = ProjectBuilder::new().build();
    let settings = project.store().load()?.settings;
    assert_eq!(settings.dev_dir(), ".ss");
    assert_eq!(settings.build_dir(), "build");
    assert_eq!(settings.runner(), "node");
    assert_eq!(settings.main_or_default(true), "index.ts");
    assert_eq!(settings.main_or_default(false), "index.js");
    Ok(())
}
