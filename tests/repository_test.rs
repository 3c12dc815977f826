//! Integration tests for tasksync
//!
//! These tests drive the repository end to end: SQLite storage, the
//! background push scope and the fake remote service.

use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use task_network::{
    FailingNetworkDataSource, FakeNetworkDataSource, NetworkDataSource, NetworkTask, TaskStatus,
};
use tasksync::storage::{DatabaseConfig, LocalTask, TaskDao, TaskDatabase, TaskStream};
use tasksync::sync::{Dispatcher, SyncScope};
use tasksync::{Task, TaskId, TaskRepository};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(5);

struct Harness {
    repo: TaskRepository,
    remote: Arc<FakeNetworkDataSource>,
    db: TaskDatabase,
}

fn harness_with(db: TaskDatabase, remote: FakeNetworkDataSource) -> Harness {
    let remote = Arc::new(remote.with_latency(Duration::ZERO));
    let repo = TaskRepository::new(
        Arc::new(db.task_dao()),
        remote.clone(),
        Dispatcher::current(),
        SyncScope::current(),
    );
    Harness { repo, remote, db }
}

fn harness() -> Harness {
    harness_with(
        TaskDatabase::open_in_memory().unwrap(),
        FakeNetworkDataSource::new(),
    )
}

async fn next<T>(stream: &mut TaskStream<T>) -> T {
    tokio::time::timeout(TIMEOUT, stream.next())
        .await
        .expect("stream emission timed out")
        .expect("stream ended")
        .unwrap()
}

async fn settle(repo: &TaskRepository) {
    assert!(repo.scope().wait_idle(TIMEOUT).await, "pushes did not finish");
}

#[tokio::test]
async fn test_observe_after_insert() {
    let db = TaskDatabase::open_in_memory().unwrap();
    let dao = db.task_dao();

    let task = LocalTask::new("1", "Buy milk", "2%", false);
    dao.upsert(task.clone()).await.unwrap();

    let mut stream = dao.observe_all();
    assert_eq!(next(&mut stream).await, vec![task]);
}

#[tokio::test]
async fn test_create_emits_one_more_incomplete_task() {
    let h = harness();
    h.repo
        .create("Existing", "already there")
        .await
        .unwrap();

    let mut stream = h.repo.observe_all();
    let before = next(&mut stream).await;
    assert_eq!(before.len(), 1);

    let id = h.repo.create("Title", "Description").await.unwrap();
    let after = next(&mut stream).await;

    assert_eq!(after.len(), before.len() + 1);
    let created = after.iter().find(|t| t.id == id).unwrap();
    assert_eq!(created.title, "Title");
    assert_eq!(created.description, "Description");
    assert!(!created.is_completed);

    settle(&h.repo).await;
}

#[tokio::test]
async fn test_create_generates_unique_ids() {
    let h = harness();

    let mut ids = HashSet::new();
    for i in 0..20 {
        let id = h.repo.create(format!("Task {}", i), "").await.unwrap();
        assert!(ids.insert(id), "duplicate id");
    }

    assert_eq!(h.repo.get_all().await.unwrap().len(), 20);
    settle(&h.repo).await;
}

#[tokio::test]
async fn test_complete_flips_only_target() {
    let h = harness();
    let first = h.repo.create("First", "").await.unwrap();
    let second = h.repo.create("Second", "").await.unwrap();

    h.repo.complete(&second).await.unwrap();

    let tasks = h.repo.get_all().await.unwrap();
    let first_task = tasks.iter().find(|t| t.id == first).unwrap();
    let second_task = tasks.iter().find(|t| t.id == second).unwrap();
    assert!(!first_task.is_completed);
    assert!(second_task.is_completed);
    assert_eq!(second_task.title, "Second");

    settle(&h.repo).await;
}

#[tokio::test]
async fn test_complete_emits_with_only_target_flipped() {
    let h = harness();
    h.repo.create("First", "one").await.unwrap();
    let target = h.repo.create("Second", "two").await.unwrap();
    h.repo.create("Third", "three").await.unwrap();

    let mut stream = h.repo.observe_all();
    let before = next(&mut stream).await;
    assert_eq!(before.len(), 3);

    h.repo.complete(&target).await.unwrap();
    let after = next(&mut stream).await;

    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        if old.id == target {
            assert_eq!(*new, old.clone().with_completed(true));
        } else {
            assert_eq!(new, old);
        }
    }

    settle(&h.repo).await;
}

#[tokio::test]
async fn test_complete_unknown_id_changes_nothing() {
    let h = harness();
    h.repo.create("Only", "").await.unwrap();
    let before = h.repo.get_all().await.unwrap();

    h.repo
        .complete(&TaskId::new("does-not-exist"))
        .await
        .unwrap();

    assert_eq!(h.repo.get_all().await.unwrap(), before);
    settle(&h.repo).await;
}

#[tokio::test]
async fn test_writes_reach_remote_last_write_wins() {
    let h = harness_with(
        TaskDatabase::open_in_memory().unwrap(),
        FakeNetworkDataSource::with_tasks(Vec::new()),
    );

    // Settle between writes so pushes reach the remote in write order
    let a = h.repo.create("A", "").await.unwrap();
    settle(&h.repo).await;
    let b = h.repo.create("B", "").await.unwrap();
    settle(&h.repo).await;
    h.repo.complete(&a).await.unwrap();
    settle(&h.repo).await;

    let remote = h.remote.snapshot().await;
    assert_eq!(remote.len(), 2);

    let remote_a = remote.iter().find(|t| t.id == a.as_str()).unwrap();
    let remote_b = remote.iter().find(|t| t.id == b.as_str()).unwrap();
    assert_eq!(remote_a.status, TaskStatus::Complete);
    assert_eq!(remote_b.status, TaskStatus::Active);
    assert!(remote.iter().all(|t| t.priority.is_none()));

    // One push per write, and every push carried the full local collection
    assert_eq!(h.remote.save_count(), 3);
    assert_eq!(h.repo.scope().stats().succeeded, 3);
}

#[tokio::test]
async fn test_refresh_replaces_local_contents() {
    let h = harness_with(
        TaskDatabase::open_in_memory().unwrap(),
        FakeNetworkDataSource::with_tasks(vec![
            NetworkTask::new("shared", "Remote title", "remote desc")
                .with_status(TaskStatus::Complete)
                .with_priority(2),
            NetworkTask::new("remote-only", "Remote only", ""),
        ]),
    );

    // Write straight to the DAO so no push overwrites the remote first
    let dao = h.db.task_dao();
    dao.upsert_all(vec![
        LocalTask::new("shared", "Local title", "local desc", false),
        LocalTask::new("local-only", "Local only", "", false),
    ])
    .await
    .unwrap();

    h.repo.refresh().await.unwrap();

    let tasks = h.repo.get_all().await.unwrap();
    assert_eq!(
        tasks,
        vec![
            Task::new("shared", "Remote title", "remote desc").with_completed(true),
            Task::new("remote-only", "Remote only", ""),
        ]
    );
    assert_eq!(h.remote.save_count(), 0);
}

#[tokio::test]
async fn test_refresh_of_empty_remote_clears_local() {
    let h = harness_with(
        TaskDatabase::open_in_memory().unwrap(),
        FakeNetworkDataSource::with_tasks(Vec::new()),
    );
    h.db
        .task_dao()
        .upsert(LocalTask::new("x", "Stale", "", false))
        .await
        .unwrap();

    h.repo.refresh().await.unwrap();
    assert!(h.repo.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refresh_then_observe_sees_seed_tasks() {
    let h = harness();
    let mut stream = h.repo.observe_all();
    assert!(next(&mut stream).await.is_empty());

    h.repo.refresh().await.unwrap();

    // delete_all on an empty table does not notify, so the upsert is next
    let tasks = next(&mut stream).await;
    let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Build tower in Pisa", "Finish bridge in Tacoma"]);
}

#[tokio::test]
async fn test_refresh_failure_leaves_local_untouched() {
    let db = TaskDatabase::open_in_memory().unwrap();
    let network: Arc<dyn NetworkDataSource> = Arc::new(FailingNetworkDataSource::default());
    let repo = TaskRepository::new(
        Arc::new(db.task_dao()),
        network,
        Dispatcher::current(),
        SyncScope::current(),
    );

    repo.create("Kept", "").await.unwrap();
    settle(&repo).await;

    let err = repo.refresh().await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(repo.get_all().await.unwrap().len(), 1);

    // The failed push was swallowed, not returned
    assert_eq!(repo.scope().stats().failed, 1);
}

#[tokio::test]
async fn test_file_backed_database_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = DatabaseConfig::at(dir.path().join("tasks.db"));

    let id = {
        let h = harness_with(
            TaskDatabase::open(&config).unwrap(),
            FakeNetworkDataSource::with_tasks(Vec::new()),
        );
        let id = h.repo.create("Persisted", "on disk").await.unwrap();
        h.repo.scope().shutdown(TIMEOUT).await;
        id
    };

    let h = harness_with(
        TaskDatabase::open(&config).unwrap(),
        FakeNetworkDataSource::with_tasks(Vec::new()),
    );
    assert_eq!(
        h.repo.get_all().await.unwrap(),
        vec![Task::new(id, "Persisted", "on disk")]
    );
}

#[tokio::test]
async fn test_remote_backing_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let backing = dir.path().join("remote.jsonl");

    let remote = FakeNetworkDataSource::with_tasks(Vec::new())
        .with_backing_file(&backing)
        .await
        .unwrap();
    let h = harness_with(TaskDatabase::open_in_memory().unwrap(), remote);
    let id = h.repo.create("Mirrored", "to file").await.unwrap();
    settle(&h.repo).await;

    // A second remote over the same file sees the push
    let reloaded = FakeNetworkDataSource::with_tasks(Vec::new())
        .with_backing_file(&backing)
        .await
        .unwrap();
    let fresh = harness_with(TaskDatabase::open_in_memory().unwrap(), reloaded);
    fresh.repo.refresh().await.unwrap();

    assert_eq!(
        fresh.repo.get_all().await.unwrap(),
        vec![Task::new(id, "Mirrored", "to file")]
    );
}

#[tokio::test]
async fn test_shutdown_rejects_new_pushes() {
    let h = harness();
    h.repo.scope().shutdown(TIMEOUT).await;

    // The local write still succeeds; only the push is dropped
    h.repo.create("After shutdown", "").await.unwrap();
    assert_eq!(h.repo.get_all().await.unwrap().len(), 1);
    assert_eq!(h.repo.scope().stats().launched, 0);
}
