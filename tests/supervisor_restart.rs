// tests/supervisor_restart.rs

mod common;
use crate::common::{
    BackendCall, FakeProcessBackend, Project, ProjectBuilder, TestResult, init_tracing, with_timeout,
};

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use splitscript::build::{BuildPipeline, CopyCompiler};
use splitscript::dev::{DevEvent, DevSupervisor};
use splitscript::errors::{Result, SplitscriptError};
use splitscript::watch::WatchEvent;

fn dev_project() -> Project {
    ProjectBuilder::new()
        .with_package("chat", "chat-lib", &["message/*"])
        .with_file("index.js", "require('./lib/util')")
        .with_file("lib/util.js", "module.exports = 1")
        .with_file("README.md", "docs")
        .build()
}

/// Queue `events`, then run a supervisor over them to completion.
async fn run_with(
    project: &Project,
    events: Vec<DevEvent>,
) -> (Result<()>, Arc<Mutex<Vec<BackendCall>>>, FakeProcessBackend) {
    let backend = FakeProcessBackend::new();
    let calls = backend.calls_handle();
    let (tx, rx) = mpsc::channel(16);
    for event in events {
        tx.send(event).await.unwrap();
    }
    drop(tx);

    let pipeline = BuildPipeline::new(project.root(), project.path(".ss"), Arc::new(CopyCompiler));
    let supervisor = DevSupervisor::new(
        pipeline,
        backend.clone(),
        rx,
        project.path("index.js"),
        "node",
    )
    .with_scaffold(project.store());

    let result = with_timeout(tokio::spawn(supervisor.run())).await.unwrap();
    (result, calls, backend)
}

fn starts(calls: &[BackendCall]) -> usize {
    calls
        .iter()
        .filter(|c| matches!(c, BackendCall::Start { .. }))
        .count()
}

#[tokio::test]
async fn one_change_gives_one_stop_then_start() -> TestResult {
    init_tracing();
    let project = dev_project();
    project.write("lib/util.js", "module.exports = 2");

    let (result, calls, _) = run_with(
        &project,
        vec![
            DevEvent::File(WatchEvent::Changed(project.path("lib/util.js"))),
            DevEvent::Shutdown,
        ],
    )
    .await;
    result?;

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            BackendCall::Start { generation: 1, pid: 1001 },
            BackendCall::Stop { pid: 1001 },
            BackendCall::Start { generation: 2, pid: 1002 },
            BackendCall::Stop { pid: 1002 },
        ]
    );
    assert_eq!(project.read(".ss/lib/util.js"), "module.exports = 2");
    Ok(())
}

#[tokio::test]
async fn queued_changes_are_coalesced_into_one_restart() -> TestResult {
    init_tracing();
    let project = dev_project();
    let extra = project.write("lib/extra.js", "module.exports = 3");

    let (result, calls, _) = run_with(
        &project,
        vec![
            DevEvent::File(WatchEvent::Changed(project.path("lib/util.js"))),
            DevEvent::File(WatchEvent::Added(extra)),
            DevEvent::File(WatchEvent::Changed(project.path("index.js"))),
            DevEvent::Shutdown,
        ],
    )
    .await;
    result?;

    let calls = calls.lock().unwrap().clone();
    assert_eq!(starts(&calls), 2);
    assert_eq!(project.read(".ss/lib/extra.js"), "module.exports = 3");
    Ok(())
}

#[tokio::test]
async fn removing_the_entry_point_does_not_restart() -> TestResult {
    init_tracing();
    let project = dev_project();

    let (result, calls, _) = run_with(
        &project,
        vec![
            DevEvent::File(WatchEvent::Removed(project.path("index.js"))),
            DevEvent::Shutdown,
        ],
    )
    .await;
    result?;

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            BackendCall::Start { generation: 1, pid: 1001 },
            BackendCall::Stop { pid: 1001 },
        ]
    );
    assert!(!project.path(".ss/index.js").exists());
    Ok(())
}

#[tokio::test]
async fn entry_point_output_is_not_relaunched_after_removal() -> TestResult {
    init_tracing();
    let project = dev_project();

    let (result, calls, _) = run_with(
        &project,
        vec![
            DevEvent::File(WatchEvent::Removed(project.path("index.js"))),
            DevEvent::File(WatchEvent::Changed(project.path("lib/util.js"))),
            DevEvent::Shutdown,
        ],
    )
    .await;
    result?;
    // The restart triggered by util.js finds no entry output to launch.
    assert_eq!(starts(&calls.lock().unwrap()), 1);
    assert!(!project.path(".ss/index.js").exists());
    Ok(())
}

#[tokio::test]
async fn removing_a_module_deletes_its_output_and_restarts() -> TestResult {
    init_tracing();
    let project = dev_project();

    let (result, calls, _) = run_with(
        &project,
        vec![
            DevEvent::File(WatchEvent::Removed(project.path("lib/util.js"))),
            DevEvent::Shutdown,
        ],
    )
    .await;
    result?;

    assert_eq!(starts(&calls.lock().unwrap()), 2);
    assert!(!project.path(".ss/lib/util.js").exists());
    Ok(())
}

#[tokio::test]
async fn ineligible_changes_are_ignored() -> TestResult {
    init_tracing();
    let project = dev_project();

    let (result, calls, _) = run_with(
        &project,
        vec![
            DevEvent::File(WatchEvent::Changed(project.path("README.md"))),
            DevEvent::File(WatchEvent::Changed(project.path("ss.json"))),
            DevEvent::Shutdown,
        ],
    )
    .await;
    result?;

    assert_eq!(starts(&calls.lock().unwrap()), 1);
    Ok(())
}

#[tokio::test]
async fn stderr_of_current_generation_is_fatal() -> TestResult {
    init_tracing();
    let project = dev_project();

    let (result, calls, _) = run_with(
        &project,
        vec![
            DevEvent::Crashed { generation: 0, line: "stale".to_string() },
            DevEvent::Crashed { generation: 1, line: "TypeError: boom".to_string() },
        ],
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, SplitscriptError::ProcessCrashed(ref line) if line == "TypeError: boom"));
    let calls = calls.lock().unwrap().clone();
    assert_eq!(calls.last(), Some(&BackendCall::Stop { pid: 1001 }));
    Ok(())
}

#[tokio::test]
async fn new_empty_listener_is_filled_then_built() -> TestResult {
    init_tracing();
    let project = dev_project();
    let listener = project.write("functions/chat/message/create/1.js", "");

    let (result, _, _) = run_with(
        &project,
        vec![DevEvent::File(WatchEvent::Added(listener)), DevEvent::Shutdown],
    )
    .await;
    result?;

    let filled = project.read("functions/chat/message/create/1.js");
    assert!(filled.contains("module.exports = async function (event)"));
    assert_eq!(project.read(".ss/functions/chat/message/create/1.js"), filled);
    Ok(())
}

#[tokio::test]
async fn launch_exposes_output_and_project_roots() -> TestResult {
    init_tracing();
    let project = dev_project();

    let (result, _, backend) = run_with(&project, vec![DevEvent::Shutdown]).await;
    result?;

    let specs = backend.specs_handle();
    let specs = specs.lock().unwrap();
    assert_eq!(specs.len(), 1);
    let spec = &specs[0];
    assert_eq!(spec.program, "node");
    assert_eq!(spec.args, vec![project.path(".ss/index.js").to_string_lossy().into_owned()]);
    assert!(spec.env.contains(&("ROOT".to_string(), project.path(".ss").to_string_lossy().into_owned())));
    assert!(spec.env.contains(&(
        "CONFIG_LOCATION".to_string(),
        project.root().to_string_lossy().into_owned()
    )));
    Ok(())
}

#[tokio::test]
async fn stderr_queued_behind_a_change_is_still_fatal() -> TestResult {
    init_tracing();
    let project = dev_project();

    let (result, calls, _) = run_with(
        &project,
        vec![
            DevEvent::File(WatchEvent::Changed(project.path("lib/util.js"))),
            DevEvent::Crashed { generation: 1, line: "TypeError: boom".to_string() },
        ],
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, SplitscriptError::ProcessCrashed(ref line) if line == "TypeError: boom"));
    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            BackendCall::Start { generation: 1, pid: 1001 },
            BackendCall::Stop { pid: 1001 },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn stderr_of_a_stopped_generation_queued_behind_a_change_is_ignored() -> TestResult {
    init_tracing();
    let project = dev_project();

    let (result, calls, _) = run_with(
        &project,
        vec![
            DevEvent::File(WatchEvent::Changed(project.path("lib/util.js"))),
            DevEvent::Crashed { generation: 0, line: "old".to_string() },
            DevEvent::Shutdown,
        ],
    )
    .await;
    result?;
    assert_eq!(starts(&calls.lock().unwrap()), 2);
    Ok(())
}
