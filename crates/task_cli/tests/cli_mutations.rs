use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskdeck-{nanos}-{file_name}"))
}

fn task(id: &str, title: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": description,
        "priority": "medium",
        "status": "todo",
        "createdAt": "2025-02-01T08:00:00Z",
        "updatedAt": "2025-02-01T08:00:00Z",
    })
}

async fn run(server: &MockServer, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_taskdeck");
    let api_url = format!("{}/api", server.uri());
    let config_path = temp_path("missing-config.json");
    let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();

    tokio::task::spawn_blocking(move || {
        Command::new(exe)
            .args(&args)
            .env("TASKDECK_API_URL", api_url)
            .env("TASKDECK_CONFIG_PATH", &config_path)
            .env("TASKDECK_LOG", "off")
            .output()
            .expect("failed to run taskdeck")
    })
    .await
    .unwrap()
}

async fn mount_list(server: &MockServer, tasks: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tasks))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn add_posts_task_and_reports_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(body_json(serde_json::json!({
            "title": "Buy milk",
            "description": "",
            "priority": "high",
            "status": "todo",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(task("9", "Buy milk", "")))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, serde_json::json!([task("9", "Buy milk", "")])).await;

    let output = run(&server, &["add", "  Buy milk ", "-p", "high"]).await;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Added task: Buy milk (9)"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("OK: Task created successfully!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn add_without_title_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(&server, &["add", "   "]).await;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("title is required"));
}

#[tokio::test(flavor = "multi_thread")]
async fn add_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"message": "Title too long"})),
        )
        .mount(&server)
        .await;

    let output = run(&server, &["add", "x"]).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("FAILED: Failed to create task: Title too long"));
    assert!(stderr.contains("ERROR: request_failed - Title too long"));
}

#[tokio::test(flavor = "multi_thread")]
async fn edit_keeps_unchanged_fields() {
    let server = MockServer::start().await;
    mount_list(&server, serde_json::json!([task("3", "Draft", "keep me")])).await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/3"))
        .and(body_json(serde_json::json!({
            "title": "Final",
            "description": "keep me",
            "priority": "medium",
            "status": "done",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task("3", "Final", "keep me")))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(&server, &["edit", "3", "--title", "Final", "-s", "done"]).await;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Updated task: Final (3)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn edit_requires_a_change() {
    let server = MockServer::start().await;

    let output = run(&server, &["edit", "3"]).await;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nothing to change"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_task() {
    let server = MockServer::start().await;
    mount_list(&server, serde_json::json!([task("4", "Old chore", "")])).await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(&server, &["delete", "4"]).await;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Deleted task: Old chore (4)"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("OK: Task deleted successfully!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_missing_task_fails() {
    let server = MockServer::start().await;
    mount_list(&server, serde_json::json!([])).await;
    Mock::given(method("DELETE"))
        .and(path("/api/tasks/404"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"message": "Task not found"})),
        )
        .mount(&server)
        .await;

    let output = run(&server, &["delete", "404"]).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("FAILED: Failed to delete task: Task not found"));
    assert!(stderr.contains("ERROR: request_failed - Task not found"));
}
