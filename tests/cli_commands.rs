// tests/cli_commands.rs

mod common;
use crate::common::{ProjectBuilder, TestResult, init_tracing};

use clap::Parser;
use serde_json::Value;

use splitscript::cli::{CliArgs, Command};
use splitscript::commands;
use splitscript::errors::SplitscriptError;
use splitscript::router::{HandlerLoader, ProcessLoader};

#[test]
fn parses_subcommands() {
    let args = CliArgs::try_parse_from(["splitscript", "add", "chat", "message/create"]).unwrap();
    assert!(matches!(args.command, Command::Add { ref package, ref event }
        if package == "chat" && event == "message/create"));

    let args = CliArgs::try_parse_from([
        "splitscript", "remove", "chat", "message/create", "1.ts", "2.ts", "--log-level", "debug",
    ])
    .unwrap();
    assert!(args.log_level.is_some());
    assert!(matches!(args.command, Command::Remove { ref files, all: false, .. } if files.len() == 2));

    let args = CliArgs::try_parse_from(["splitscript", "emit", "chat", "ready"]).unwrap();
    assert!(matches!(args.command, Command::Emit { ref data, .. } if data == "{}"));

    let args = CliArgs::try_parse_from(["splitscript", "dev"]).unwrap();
    assert!(matches!(args.command, Command::Dev { target: None }));

    assert!(CliArgs::try_parse_from(["splitscript", "build"]).is_err());
}

#[test]
fn listeners_command_prints_json() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .with_file("functions/chat/ready/1.js", "")
        .build();

    let missing: Value = serde_json::from_str(&commands::listeners(project.root(), "slack", None)?)?;
    assert!(missing.is_null());

    let found: Value = serde_json::from_str(&commands::listeners(project.root(), "chat", Some("Ready"))?)?;
    assert_eq!(found[0]["event"], serde_json::json!(["ready"]));
    Ok(())
}

#[tokio::test]
async fn emit_command_validates_payload_and_tolerates_no_listeners() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().build();

    let err = commands::emit(project.root(), "chat", "ready", "{oops").await.unwrap_err();
    assert!(matches!(err, SplitscriptError::JsonError(_)));

    let report = commands::emit(project.root(), "chat", "ready", r#"{"a":1}"#).await?;
    assert_eq!(report.invoked, 0);
    Ok(())
}

#[tokio::test]
async fn process_loader_sniffs_export_shape() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new()
        .with_file("esm.js", "export default async function (event) {}")
        .with_file("cjs.js", "module.exports = async function (event) {}")
        .with_file("none.js", "const x = 1;")
        .build();
    let loader = ProcessLoader::default();

    let esm = loader.load(&project.path("esm.js")).await?;
    assert!(esm.default_export.is_some() && esm.module_value.is_none());

    let cjs = loader.load(&project.path("cjs.js")).await?;
    assert!(cjs.default_export.is_none() && cjs.module_value.is_some());

    let none = loader.load(&project.path("none.js")).await?;
    assert!(none.default_export.is_none() && none.module_value.is_none());

    assert!(loader.load(&project.path("missing.js")).await.is_err());
    Ok(())
}

#[test]
fn log_filter_prefers_cli_level_and_caps_watcher_noise() -> TestResult {
    use splitscript::cli::LogLevel;
    use splitscript::logging::build_filter;

    let filter = build_filter(Some(LogLevel::Debug), Some("garbage=nope"))?;
    let rendered = filter.to_string();
    assert!(rendered.contains("debug"));
    assert!(rendered.contains("notify=warn"));

    let filter = build_filter(None, Some("notify=trace,info"))?;
    assert!(!filter.to_string().contains("notify=warn"));

    assert!(build_filter(None, Some("splitscript=notalevel")).is_err());
    Ok(())
}
