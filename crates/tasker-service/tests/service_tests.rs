/// Behavior of the user and task operations against a real SQLite file.
///
/// Each test gets a fresh database in its own temp directory.

use std::time::Duration;

use tempfile::TempDir;
use uuid::Uuid;

use tasker_db::{Database, DbConfig, SchemaStatus};
use tasker_service::TaskerService;
use tasker_types::{TaskStatus, TaskerError, UpdateOutcome};

fn service() -> (TempDir, TaskerService) {
    let dir = TempDir::new().unwrap();
    let db = Database::new(DbConfig::new(dir.path().join("tasker.db"))).unwrap();
    assert_eq!(db.bootstrap().unwrap(), SchemaStatus::Created);
    (dir, TaskerService::new(db))
}

fn assert_status<T: std::fmt::Debug>(result: Result<T, TaskerError>, code: u16) {
    let err = result.unwrap_err();
    assert_eq!(err.status_code(), code, "unexpected error: {err:?}");
}

// -- Users --

#[tokio::test]
async fn first_user_gets_id_101() {
    let (_dir, svc) = service();

    assert_eq!(svc.create_user("alice").await.unwrap(), 101);
    assert_eq!(svc.create_user("bob").await.unwrap(), 102);

    let user = svc.get_user(101).await.unwrap();
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn numeric_or_empty_username_is_bad_request() {
    let (_dir, svc) = service();

    assert_status(svc.create_user("12345").await, 400);
    assert_status(svc.create_user("").await, 400);
    assert_status(svc.create_user("   ").await, 400);
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let (_dir, svc) = service();
    svc.create_user("alice").await.unwrap();

    assert_status(svc.create_user("alice").await, 409);

    // Matching is case-sensitive
    assert!(svc.create_user("Alice").await.is_ok());
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let (_dir, svc) = service();
    assert_status(svc.get_user(101).await, 404);
}

// -- Creating tasks --

#[tokio::test]
async fn task_for_missing_user_is_not_found() {
    let (_dir, svc) = service();
    assert_status(svc.create_task(999, "buy milk", "").await, 404);
}

#[tokio::test]
async fn duplicate_trimmed_name_is_conflict_per_user() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    let bob = svc.create_user("bob").await.unwrap();

    svc.create_task(alice, "buy milk", "").await.unwrap();
    assert_status(svc.create_task(alice, "  buy milk  ", "").await, 409);

    // Another user may reuse the name
    assert!(svc.create_task(bob, "buy milk", "").await.is_ok());
}

#[tokio::test]
async fn blank_task_name_is_bad_request() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();

    assert_status(svc.create_task(alice, "   ", "desc").await, 400);
}

#[tokio::test]
async fn missing_user_is_reported_before_blank_name() {
    let (_dir, svc) = service();
    assert_status(svc.create_task(999, "", "").await, 404);
}

#[tokio::test]
async fn new_task_is_active_and_trimmed() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();

    let id = svc.create_task(alice, "  buy milk ", "2%  ").await.unwrap();
    let task = svc.get_task(&id.to_string()).await.unwrap();

    assert_eq!(task.id, id);
    assert_eq!(task.user_id, alice);
    assert_eq!(task.name, "buy milk");
    assert_eq!(task.description, "2%");
    assert_eq!(task.status, TaskStatus::Active);
    assert_eq!(task.created_at, task.updated_at);
}

// -- Reading tasks --

#[tokio::test]
async fn get_task_rejects_malformed_ids() {
    let (_dir, svc) = service();

    assert_status(svc.get_task("not-a-uuid").await, 400);
    assert_status(svc.get_task(&Uuid::new_v4().to_string()).await, 404);
}

#[tokio::test]
async fn list_tasks_includes_archived_tasks() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    let milk = svc.create_task(alice, "buy milk", "").await.unwrap();
    let dog = svc.create_task(alice, "walk dog", "").await.unwrap();
    svc.change_task_status(&dog.to_string(), "Archive").await.unwrap();

    let all: Vec<Uuid> = svc.list_tasks(alice).await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(all.len(), 2);
    assert!(all.contains(&milk));
    assert!(all.contains(&dog));

    let active = svc.list_tasks_by_status(alice, TaskStatus::Active).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, milk);

    let archived = svc.list_tasks_by_status(alice, TaskStatus::Archive).await.unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, dog);
}

#[tokio::test]
async fn list_tasks_is_scoped_to_the_user() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    let bob = svc.create_user("bob").await.unwrap();
    svc.create_task(alice, "buy milk", "").await.unwrap();

    assert_eq!(svc.list_tasks(alice).await.unwrap().len(), 1);
    assert!(svc.list_tasks(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_tasks_for_unknown_user_is_not_found() {
    let (_dir, svc) = service();

    assert_status(svc.list_tasks(0).await, 404);
    assert_status(svc.list_tasks(101).await, 404);
}

// -- Updating tasks --

#[tokio::test]
async fn update_without_fields_is_a_no_op() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    let id = svc.create_task(alice, "buy milk", "2%").await.unwrap().to_string();

    let outcome = svc.update_task(&id, Some(""), Some("  ")).await.unwrap();
    assert_eq!(outcome, UpdateOutcome::NoChanges);
    assert_eq!(svc.update_task(&id, None, None).await.unwrap(), UpdateOutcome::NoChanges);

    let task = svc.get_task(&id).await.unwrap();
    assert_eq!(task.name, "buy milk");
    assert_eq!(task.description, "2%");
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    let id = svc.create_task(alice, "buy milk", "2%").await.unwrap().to_string();

    let outcome = svc.update_task(&id, None, Some(" whole ")).await.unwrap();
    assert_eq!(outcome, UpdateOutcome::Updated);

    let task = svc.get_task(&id).await.unwrap();
    assert_eq!(task.name, "buy milk");
    assert_eq!(task.description, "whole");

    svc.update_task(&id, Some("buy oat milk"), None).await.unwrap();
    let task = svc.get_task(&id).await.unwrap();
    assert_eq!(task.name, "buy oat milk");
    assert_eq!(task.description, "whole");
}

#[tokio::test]
async fn update_errors() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    svc.create_task(alice, "buy milk", "").await.unwrap();
    let dog = svc.create_task(alice, "walk dog", "").await.unwrap().to_string();

    assert_status(svc.update_task("12", Some("x"), None).await, 400);
    assert_status(
        svc.update_task(&Uuid::new_v4().to_string(), Some("x"), None).await,
        404,
    );
    // Unknown task is reported even when nothing would change
    assert_status(svc.update_task(&Uuid::new_v4().to_string(), None, None).await, 404);
    // Renaming onto a sibling's name
    assert_status(svc.update_task(&dog, Some("buy milk"), None).await, 409);

    // Renaming to its own current name is fine
    assert_eq!(
        svc.update_task(&dog, Some("walk dog"), None).await.unwrap(),
        UpdateOutcome::Updated
    );
}

// -- Status --

#[tokio::test]
async fn status_round_trip() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    let id = svc.create_task(alice, "buy milk", "").await.unwrap().to_string();

    svc.change_task_status(&id, "Archive").await.unwrap();
    assert_eq!(svc.get_task(&id).await.unwrap().status, TaskStatus::Archive);

    svc.change_task_status(&id, "Active").await.unwrap();
    assert_eq!(svc.get_task(&id).await.unwrap().status, TaskStatus::Active);
}

#[tokio::test]
async fn status_outside_enum_is_bad_request() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    let id = svc.create_task(alice, "buy milk", "").await.unwrap().to_string();

    assert_status(svc.change_task_status(&id, "Done").await, 400);
    assert_eq!(svc.get_task(&id).await.unwrap().status, TaskStatus::Active);
}

#[tokio::test]
async fn status_change_errors() {
    let (_dir, svc) = service();

    assert_status(svc.change_task_status("nope", "Archive").await, 400);
    assert_status(
        svc.change_task_status(&Uuid::new_v4().to_string(), "Archive").await,
        404,
    );
}

#[tokio::test]
async fn status_change_returns_the_stored_status() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    let id = svc.create_task(alice, "buy milk", "").await.unwrap().to_string();

    assert_eq!(svc.change_task_status(&id, " archive ").await.unwrap(), TaskStatus::Archive);
}

// -- Timestamps --

#[tokio::test]
async fn mutations_refresh_updated_at_only() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    let id = svc.create_task(alice, "buy milk", "").await.unwrap().to_string();
    let created = svc.get_task(&id).await.unwrap();

    // Timestamps have millisecond resolution
    tokio::time::sleep(Duration::from_millis(20)).await;
    svc.change_task_status(&id, "Archive").await.unwrap();
    let archived = svc.get_task(&id).await.unwrap();

    assert_eq!(archived.created_at, created.created_at);
    assert!(archived.updated_at > created.updated_at);

    tokio::time::sleep(Duration::from_millis(20)).await;
    svc.update_task(&id, None, Some("2%")).await.unwrap();
    let updated = svc.get_task(&id).await.unwrap();

    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > archived.updated_at);
}

// -- Concurrency --

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_creates_yield_one_task() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let svc = svc.clone();
            tokio::spawn(async move { svc.create_task(alice, "same", "").await })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => {
                assert_eq!(e.status_code(), 409, "unexpected error: {e:?}");
                conflicts += 1;
            }
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 15);
    assert_eq!(svc.list_tasks(alice).await.unwrap().len(), 1);
}

// -- Deleting --

#[tokio::test]
async fn deleted_task_is_gone() {
    let (_dir, svc) = service();
    let alice = svc.create_user("alice").await.unwrap();
    let id = svc.create_task(alice, "buy milk", "").await.unwrap().to_string();

    svc.delete_task(&id).await.unwrap();

    assert_status(svc.get_task(&id).await, 404);
    assert_status(svc.delete_task(&id).await, 404);
    assert_status(svc.delete_task("bad id").await, 400);
}

// -- End to end --

#[tokio::test]
async fn alice_buys_milk() {
    let (_dir, svc) = service();

    let alice = svc.create_user("alice").await.unwrap();
    assert_eq!(alice, 101);

    let milk = svc.create_task(101, "buy milk", "2%  ").await.unwrap();
    let errand = svc.create_task(101, "post letter", "").await.unwrap();
    assert_eq!(svc.get_task(&milk.to_string()).await.unwrap().description, "2%");

    let ids: Vec<Uuid> = svc.list_tasks(101).await.unwrap().iter().map(|t| t.id).collect();
    assert!(ids.contains(&milk));

    svc.delete_task(&milk.to_string()).await.unwrap();

    let ids: Vec<Uuid> = svc.list_tasks(101).await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![errand]);

    svc.delete_task(&errand.to_string()).await.unwrap();
    assert!(svc.list_tasks(101).await.unwrap().is_empty());
}

#[tokio::test]
async fn errors_render_with_status_text() {
    let (_dir, svc) = service();

    let err = svc.get_task(&Uuid::new_v4().to_string()).await.unwrap_err();
    let json = serde_json::to_value(err.to_response()).unwrap();

    assert_eq!(json["status"], "404 Not Found");
    assert!(json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn bootstrap_is_idempotent_with_data() {
    let (_dir, svc) = service();
    svc.create_user("alice").await.unwrap();

    assert_eq!(svc.database().bootstrap().unwrap(), SchemaStatus::AlreadyPresent);
    assert_eq!(svc.create_user("bob").await.unwrap(), 102);
}
