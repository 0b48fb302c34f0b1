// tests/scaffold.rs

mod common;
use crate::common::{ProjectBuilder, TestResult, init_tracing};

use serde_json::json;

use splitscript::commands::{self, RemoveOutcome};
use splitscript::errors::SplitscriptError;
use splitscript::scaffold::{create_handler, fill_new_handler, next_index, render};
use splitscript::types::AuthoringVariant;

#[test]
fn next_index_skips_non_numeric_stems() {
    assert_eq!(next_index(["1", "2", "notanumber"]), 3);
    assert_eq!(next_index(Vec::<String>::new()), 1);
    assert_eq!(next_index(["7", "3"]), 8);
}

#[test]
fn render_produces_each_variant() {
    assert_eq!(
        render(AuthoringVariant::Typed, "chat-lib", "MessageX"),
        "import { Events } from 'chat-lib';\nexport default async function (event: Events.MessageX) {\n\n}"
    );
    assert_eq!(
        render(AuthoringVariant::EsModule, "chat-lib", "Ready"),
        "/** @typedef {import('chat-lib').Events.Ready} Event */\n/** @param {Event} event */\n\nexport default async function (event) {\n\n}"
    );
    assert_eq!(
        render(AuthoringVariant::CommonJs, "chat-lib", "Ready"),
        "/** @typedef {import('chat-lib').Events.Ready} Event */\n/** @param {Event} event */\n\nmodule.exports = async function (event) {\n\n}"
    );
}

#[test]
fn create_handler_allocates_next_index() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .with_package("chat", "chat-lib", &["message/*"])
        .es_module()
        .with_file("functions/chat/message/create/notes.js", "")
        .build();
    let store = project.store();

    let first = create_handler(&store, "chat", "Message/Create")?;
    assert_eq!(first.path, project.path("functions/chat/message/create/1.js"));
    assert_eq!(first.variant, AuthoringVariant::EsModule);
    assert_eq!(
        project.read("functions/chat/message/create/1.js"),
        render(AuthoringVariant::EsModule, "chat-lib", "MessageX")
    );

    let second = create_handler(&store, "chat", "message_create")?;
    assert_eq!(second.path, project.path("functions/chat/message/create/2.js"));
    Ok(())
}

#[test]
fn create_handler_in_typed_project_writes_ts() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .with_package("chat", "chat-lib", &["message/create"])
        .typescript()
        .build();

    let created = create_handler(&project.store(), "chat", "message/create")?;
    assert_eq!(created.path, project.path("functions/chat/message/create/1.ts"));
    assert_eq!(
        project.read("functions/chat/message/create/1.ts"),
        render(AuthoringVariant::Typed, "chat-lib", "MessageCreate")
    );
    Ok(())
}

#[test]
fn create_handler_rejects_unknown_package_and_event() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .with_package("chat", "chat-lib", &["message/*"])
        .build();
    let store = project.store();

    let err = create_handler(&store, "slack", "message/create").unwrap_err();
    assert!(matches!(err, SplitscriptError::PackageNotFound(_)));

    let err = create_handler(&store, "chat", "user/join").unwrap_err();
    assert!(matches!(err, SplitscriptError::ConfigError(_)));
    assert!(!project.path("functions/chat/user").exists());
    Ok(())
}

#[test]
fn fill_new_handler_only_touches_empty_sanctioned_files() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .with_package("chat", "chat-lib", &["message/*"])
        .with_file("functions/chat/message/delete/5.js", "")
        .with_file("functions/chat/message/edit/1.js", "// mine")
        .with_file("functions/chat/user/join/1.js", "")
        .with_file("functions/chat/message/create/1.ts", "")
        .build();
    let store = project.store();

    assert!(fill_new_handler(&store, &project.path("functions/chat/message/delete/5.js"))?);
    assert_eq!(
        project.read("functions/chat/message/delete/5.js"),
        render(AuthoringVariant::CommonJs, "chat-lib", "MessageX")
    );

    assert!(fill_new_handler(&store, &project.path("functions/chat/message/create/1.ts"))?);
    assert_eq!(
        project.read("functions/chat/message/create/1.ts"),
        render(AuthoringVariant::Typed, "chat-lib", "MessageX")
    );

    assert!(!fill_new_handler(&store, &project.path("functions/chat/message/edit/1.js"))?);
    assert_eq!(project.read("functions/chat/message/edit/1.js"), "// mine");

    assert!(!fill_new_handler(&store, &project.path("functions/chat/user/join/1.js"))?);
    assert_eq!(project.read("functions/chat/user/join/1.js"), "");
    Ok(())
}

#[test]
fn add_and_remove_commands() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .with_package("chat", "chat-lib", &["message/create", "ready"])
        .with_setting("typescript", json!(true))
        .build();
    let root = project.root();

    commands::add(root, "chat", "message/create")?;
    commands::add(root, "chat", "message/create")?;

    let listed = commands::remove(root, "chat", None, &[], false)?;
    assert_eq!(listed, RemoveOutcome::Events(vec!["message/create".to_string()]));

    let files = commands::remove(root, "chat", Some("message/create"), &[], false)?;
    assert_eq!(
        files,
        RemoveOutcome::Files(vec!["1.ts".to_string(), "2.ts".to_string()])
    );

    let removed = commands::remove(root, "chat", Some("message/create"), &["1.ts".to_string()], false)?;
    assert_eq!(
        removed,
        RemoveOutcome::Removed(vec![project.path("functions/chat/message/create/1.ts")])
    );

    let removed = commands::remove(root, "chat", Some("message/create"), &[], true)?;
    assert_eq!(
        removed,
        RemoveOutcome::Removed(vec![project.path("functions/chat/message/create/2.ts")])
    );

    let err = commands::remove(root, "chat", None, &[], false).unwrap_err();
    assert!(matches!(err, SplitscriptError::ConfigError(_)));
    Ok(())
}
