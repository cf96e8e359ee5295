//! End-to-end tests: `MutationEngine` driving `HttpTaskGateway` against a
//! mock board API.

use std::sync::Arc;
use std::time::Duration;

use kanban_sync::board::snapshot::check_invariants;
use kanban_sync::board::{
    BoardStore, DragEvent, HttpTaskGateway, MutationEngine, MutationOutcome, Session,
    SnapshotStore,
};
use kanban_sync::config::ClientConfig;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn task(id: i64, title: &str, column: i64, position: i32) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "position": position,
        "column": column,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

/// Board 1: column 10 holds tasks 1, 2, 3; column 20 holds task 4.
fn board_json() -> Value {
    json!({
        "id": 1,
        "name": "Roadmap",
        "columns": [
            {"id": 10, "name": "To Do", "position": 0, "tasks": [
                task(1, "Draft", 10, 0),
                task(2, "Review", 10, 1),
                task(3, "Ship", 10, 2)
            ]},
            {"id": 20, "name": "Done", "position": 1, "tasks": [
                task(4, "Setup", 20, 0)
            ]}
        ],
        "labels": []
    })
}

async fn mount_board(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/boards/1/"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(board_json()))
        .mount(server)
        .await;
}

async fn engine(server: &MockServer) -> (MutationEngine, Arc<BoardStore>) {
    let config = ClientConfig {
        api_url: format!("{}/api", server.uri()),
        timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    };
    let gateway = HttpTaskGateway::new(&config, Session::with_access("tok")).unwrap();
    let store = Arc::new(BoardStore::new());
    let engine = MutationEngine::new(store.clone(), Arc::new(gateway));
    engine.load_board(1).await.unwrap();
    (engine, store)
}

fn column_ids(store: &BoardStore, column: i64) -> Vec<i64> {
    let board = store.get(1).unwrap();
    board
        .column(column)
        .unwrap()
        .tasks
        .iter()
        .map(|t| t.id)
        .collect()
}

fn drag(active: &str, over: &str, from: &str, to: &str) -> DragEvent {
    DragEvent {
        active_id: Some(active.into()),
        over_id: Some(over.into()),
        source_container: Some(from.into()),
        destination_container: Some(to.into()),
    }
}

#[tokio::test]
async fn test_cross_column_drop_sends_reorder_and_commits() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/reorder/"))
        .and(body_json(json!({
            "moves": [{"task_id": 2, "to_column": 20, "to_position": 0}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, store) = engine(&server).await;
    let outcome = engine.reorder(1, &drag("2", "4", "10", "20")).await;

    assert!(outcome.is_committed());
    assert_eq!(column_ids(&store, 10), vec![1, 3]);
    assert_eq!(column_ids(&store, 20), vec![2, 4]);
    check_invariants(&store.get(1).unwrap()).unwrap();
}

#[tokio::test]
async fn test_server_error_restores_board() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/reorder/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (engine, store) = engine(&server).await;
    let before = store.get(1).unwrap();
    let outcome = engine.reorder(1, &drag("2", "4", "10", "20")).await;

    let failure = outcome.failure().expect("reorder should roll back");
    assert_eq!(failure.to_string(), "Failed to move task.");
    assert_eq!(*store.get(1).unwrap(), *before);
}

#[tokio::test]
async fn test_create_replaces_placeholder_with_server_task() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/tasks/"))
        .and(body_json(json!({
            "title": "Plan",
            "description": "",
            "column": 20,
            "label_ids": []
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(task(99, "Plan", 20, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, store) = engine(&server).await;
    match engine.create_task(1, 20, "Plan").await {
        MutationOutcome::Committed(created) => assert_eq!(created.id, 99),
        other => panic!("Expected commit, got {:?}", other),
    }
    assert_eq!(column_ids(&store, 20), vec![99, 4]);
    check_invariants(&store.get(1).unwrap()).unwrap();
}

#[tokio::test]
async fn test_delete_failure_brings_task_back() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/3/delete/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let (engine, store) = engine(&server).await;
    let outcome = engine.delete_task(1, 3).await;

    assert_eq!(outcome.failure().unwrap().to_string(), "Failed to delete.");
    assert_eq!(column_ids(&store, 10), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_rename_committed_without_response_body() {
    let server = MockServer::start().await;
    mount_board(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/api/tasks/1/"))
        .and(body_json(json!({"title": "Outline"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (engine, store) = engine(&server).await;
    assert!(engine.edit_title(1, 1, "Outline").await.is_committed());
    assert_eq!(store.get(1).unwrap().task(1).unwrap().title, "Outline");
}

#[tokio::test]
async fn test_skipped_mutations_send_nothing() {
    let server = MockServer::start().await;
    mount_board(&server).await;

    let (engine, _store) = engine(&server).await;
    assert!(engine.create_task(1, 10, "   ").await.is_skipped());
    assert!(engine.edit_title(1, 1, "Draft").await.is_skipped());
    assert!(engine.reorder(1, &drag("2", "2", "10", "10")).await.is_skipped());

    // Only the initial board fetch reached the server.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
