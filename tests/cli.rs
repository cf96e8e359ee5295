//! Integration tests for the `kanban` binary against a mock board API.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Temp directory holding a kanban.toml that points the session file
/// inside the same directory.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let session = dir.path().join("session.json");
        fs::write(
            dir.path().join("kanban.toml"),
            format!("[session]\nfile = {:?}\n", session.display().to_string()),
        )
        .unwrap();
        Self { dir }
    }

    fn session_file(&self) -> std::path::PathBuf {
        self.dir.path().join("session.json")
    }

    /// `kanban` with config, API url and environment pinned to this workspace.
    fn kanban(&self, server: &MockServer) -> Command {
        let mut cmd = cargo_bin_cmd!("kanban");
        cmd.current_dir(self.dir.path())
            .env_remove("KANBAN_API_URL")
            .env_remove("KANBAN_TIMEOUT_SECS")
            .env_remove("KANBAN_TOKEN")
            .arg("--config")
            .arg(self.dir.path().join("kanban.toml"))
            .arg("--api-url")
            .arg(format!("{}/api", server.uri()));
        cmd
    }

    fn authed(&self, server: &MockServer) -> Command {
        let mut cmd = self.kanban(server);
        cmd.env("KANBAN_TOKEN", "tok");
        cmd
    }
}

fn task(id: i64, title: &str, column: i64) -> Value {
    json!({
        "id": id,
        "title": title,
        "column": column,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    })
}

async fn mount_board(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/boards/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "Roadmap",
            "columns": [
                {"id": 10, "name": "To Do", "tasks": [task(1, "Draft", 10), task(2, "Review", 10)]},
                {"id": 20, "name": "Done", "tasks": []}
            ]
        })))
        .mount(server)
        .await;
}

mod cli_basics {
    use super::*;

    #[test]
    fn test_kanban_help() {
        cargo_bin_cmd!("kanban")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("optimistic"));
    }

    #[test]
    fn test_kanban_version() {
        cargo_bin_cmd!("kanban").arg("--version").assert().success();
    }

    #[test]
    fn test_add_requires_title() {
        cargo_bin_cmd!("kanban").args(["add", "1", "10"]).assert().failure();
    }
}

mod session {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login_saves_token_and_logout_removes_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/jwt/create/"))
            .and(body_json(json!({"username": "ann", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "abc"})))
            .expect(1)
            .mount(&server)
            .await;
        let ws = Workspace::new();

        ws.kanban(&server)
            .args(["login", "ann", "--password-stdin"])
            .write_stdin("pw\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Logged in as ann"));
        let saved = fs::read_to_string(ws.session_file()).unwrap();
        assert!(saved.contains("abc"));

        ws.kanban(&server).arg("logout").assert().success();
        assert!(!ws.session_file().exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/jwt/create/"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let ws = Workspace::new();

        ws.kanban(&server)
            .args(["login", "ann", "--password-stdin"])
            .write_stdin("bad\n")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid credentials or server error."));
        assert!(!ws.session_file().exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_commands_require_login() {
        let server = MockServer::start().await;
        let ws = Workspace::new();

        ws.kanban(&server)
            .arg("boards")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not logged in"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

mod boards {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_boards_lists_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/boards/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Roadmap"},
                {"id": 2, "name": "Chores"}
            ])))
            .mount(&server)
            .await;
        let ws = Workspace::new();

        ws.authed(&server)
            .arg("boards")
            .assert()
            .success()
            .stdout(predicate::str::contains("Roadmap").and(predicate::str::contains("Chores")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_show_marks_empty_columns() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        let ws = Workspace::new();

        ws.authed(&server)
            .args(["show", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Review").and(predicate::str::contains("No tasks")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_show_unknown_board() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/boards/5/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let ws = Workspace::new();

        ws.authed(&server)
            .args(["show", "5"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Board 5 not found"));
    }
}

mod tasks {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_add_creates_task() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/tasks/"))
            .and(body_json(json!({
                "title": "Write docs",
                "description": "",
                "column": 20,
                "label_ids": []
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(task(7, "Write docs", 20)))
            .expect(1)
            .mount(&server)
            .await;
        let ws = Workspace::new();

        ws.authed(&server)
            .args(["add", "1", "20", "Write", "docs"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created task 7"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rm_failure_exits_nonzero() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/api/tasks/2/delete/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let ws = Workspace::new();

        ws.authed(&server)
            .args(["rm", "1", "2", "--yes"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to delete."))
            .stdout(predicate::str::contains("Review"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mv_onto_empty_column() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/tasks/reorder/"))
            .and(body_json(json!({
                "moves": [{"task_id": 1, "to_column": 20, "to_position": 0}]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let ws = Workspace::new();

        ws.authed(&server)
            .args(["mv", "1", "1", "--to", "20"])
            .assert()
            .success();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mv_without_over_lands_at_head() {
        let server = MockServer::start().await;
        // Column 2 holds a task whose id is also 2.
        Mock::given(method("GET"))
            .and(path("/api/boards/3/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3,
                "name": "Chores",
                "columns": [
                    {"id": 1, "name": "To Do", "tasks": [task(7, "Sweep", 1)]},
                    {"id": 2, "name": "Done", "tasks": [task(5, "Dust", 2), task(2, "Mop", 2)]}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/tasks/reorder/"))
            .and(body_json(json!({
                "moves": [{"task_id": 7, "to_column": 2, "to_position": 0}]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let ws = Workspace::new();

        ws.authed(&server)
            .args(["mv", "3", "7", "--to", "2"])
            .assert()
            .success();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rename_to_same_title_is_skipped() {
        let server = MockServer::start().await;
        mount_board(&server).await;
        let ws = Workspace::new();

        ws.authed(&server)
            .args(["rename", "1", "1", "Draft"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing to do: title unchanged"));
    }
}
