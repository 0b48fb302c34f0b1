// tests/watch_events.rs

mod common;
use crate::common::{ProjectBuilder, TestResult, init_tracing};

use std::path::PathBuf;
use std::time::Duration;

use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tokio::time::timeout;

use splitscript::watch::{WatchEvent, classify, relative_str, spawn_watcher};

fn event(kind: EventKind, paths: &[&str]) -> Event {
    paths
        .iter()
        .fold(Event::new(kind), |ev, p| ev.add_path(PathBuf::from(p)))
}

#[test]
fn notify_kinds_map_to_watch_events() {
    assert_eq!(
        classify(&event(EventKind::Create(CreateKind::File), &["/p/a.ts"])),
        vec![WatchEvent::Added(PathBuf::from("/p/a.ts"))]
    );
    assert_eq!(
        classify(&event(EventKind::Remove(RemoveKind::File), &["/p/a.ts"])),
        vec![WatchEvent::Removed(PathBuf::from("/p/a.ts"))]
    );
    assert_eq!(
        classify(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/p/old.ts", "/p/new.ts"]
        )),
        vec![
            WatchEvent::Removed(PathBuf::from("/p/old.ts")),
            WatchEvent::Added(PathBuf::from("/p/new.ts")),
        ]
    );
    assert!(classify(&event(EventKind::Access(AccessKind::Any), &["/p/a.ts"])).is_empty());
    assert!(
        classify(&event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)),
            &["/p/a.ts"]
        ))
        .is_empty()
    );
}

#[test]
fn content_changes_only_count_for_existing_files() -> TestResult {
    let project = ProjectBuilder::new().with_file("a.ts", "").build();
    let existing = project.path("a.ts");
    let ev = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(existing.clone())
        .add_path(project.path("gone.ts"));
    assert_eq!(classify(&ev), vec![WatchEvent::Changed(existing)]);
    Ok(())
}

#[test]
fn relative_str_uses_forward_slashes() {
    let root = PathBuf::from("/p");
    assert_eq!(
        relative_str(&root, &PathBuf::from("/p/functions/chat/1.js")).as_deref(),
        Some("functions/chat/1.js")
    );
    assert_eq!(relative_str(&root, &PathBuf::from("/elsewhere/x")), None);
}

#[tokio::test]
async fn watcher_reports_new_files_and_skips_ignored() -> TestResult {
    init_tracing();
    let project = ProjectBuilder::new().build();
    let (tx, mut rx) = mpsc::channel(64);
    let ignored_dir = project.path(".ss");
    let _handle = spawn_watcher(project.root(), move |p| p.starts_with(&ignored_dir), tx)?;

    tokio::time::sleep(Duration::from_millis(200)).await;
    project.write(".ss/skip.js", "");
    let created = project.write("new.ts", "let a = 1;");

    let found = timeout(Duration::from_secs(5), async {
        while let Some(ev) = rx.recv().await {
            assert!(!ev.path().starts_with(project.path(".ss")), "ignored path leaked: {ev:?}");
            if ev.path() == created {
                return true;
            }
        }
        false
    })
    .await?;
    assert!(found);
    Ok(())
}
