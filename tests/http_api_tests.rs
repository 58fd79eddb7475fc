//! HTTP mock tests for the board API client.
//!
//! Uses wiremock to stand in for the backend.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use focusboard::api::{BoardApi, HttpApi};
use focusboard::error::{ApiError, MapError};
use focusboard::models::{
    AccomplishmentPatch, AttachmentKind, NewAccomplishment, NewAttachment, NewProject, NewTask, TaskPatch,
    TaskPriority, TaskStatus,
};

fn api_for(server: &MockServer) -> HttpApi {
    // Trailing slash is trimmed.
    HttpApi::new(&format!("{}/", server.uri()), None).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task_record(id: serde_json::Value, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "status": "planned",
        "priority": "high",
        "estimated_time": 45,
        "created_at": "2025-03-10T08:00:00Z",
        "updated_at": "2025-03-10 08:30:00",
        "date": "2025-03-10",
        "project_id": 3
    })
}

// =============================================================================
// Tasks
// =============================================================================

#[tokio::test]
async fn lists_tasks_of_a_day() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/date/2025-03-10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_record(json!(1), "Write report")])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = api_for(&server).list_tasks_by_date(day(2025, 3, 10)).await.unwrap();

    assert_eq!(tasks.len(), 1);
    let task = &tasks[0];
    assert_eq!(task.id, "1");
    assert_eq!(task.description, "");
    assert_eq!(task.priority, TaskPriority::High);
    assert_eq!(task.estimated_minutes, 45);
    assert_eq!(task.project_id.as_deref(), Some("3"));
    assert_eq!(task.date, day(2025, 3, 10));
}

#[tokio::test]
async fn creates_task_with_wire_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_partial_json(json!({
            "title": "Write report",
            "status": "in_progress",
            "priority": "high",
            "estimated_time": 45,
            "date": "2025-03-10",
            "project_id": "3"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_record(json!("abc"), "Write report")))
        .expect(1)
        .mount(&server)
        .await;

    let input = NewTask {
        title: "Write report".into(),
        description: String::new(),
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        estimated_minutes: 45,
        notes: None,
        date: day(2025, 3, 10),
        project_id: Some("3".into()),
    };
    let task = api_for(&server).create_task(&input).await.unwrap();

    assert_eq!(task.id, "abc");
}

#[tokio::test]
async fn update_sends_only_present_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/7"))
        .and(body_json(json!({ "status": "discarded", "completed_at": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let patch = TaskPatch {
        status: Some(TaskStatus::Discarded),
        completed_at: Some(None),
        ..Default::default()
    };
    api_for(&server).update_task("7", &patch).await.unwrap();
}

#[tokio::test]
async fn ids_are_sent_as_single_path_segments() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "wiped": true })))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/..%2Fprojects"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/a%2Fb%3Fx%23y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_record(json!("a/b?x#y"), "Odd id")))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api.delete_task("../projects").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(api.get_task("a/b?x#y").await.unwrap().id, "a/b?x#y");
}

#[tokio::test]
async fn dot_segment_ids_are_refused() {
    let server = MockServer::start().await;
    let api = api_for(&server);

    for id in ["..", ".", ""] {
        let err = api.delete_task(id).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidId { message: "Failed to delete task", .. }));
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_returns_server_echo() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": 7 })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/8"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert_eq!(api.delete_task("7").await.unwrap(), json!({ "deleted": 7 }));
    assert_eq!(api.delete_task("8").await.unwrap(), serde_json::Value::Null);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn non_success_status_is_a_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let err = api_for(&server).get_task("404").await.unwrap_err();

    assert!(matches!(err, ApiError::Request { message: "Failed to get task", status: 404 }));
    assert_eq!(err.to_string(), "Failed to get task (HTTP 404)");
}

#[tokio::test]
async fn invalid_record_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_record(json!(1), "  ")])))
        .mount(&server)
        .await;

    let err = api_for(&server).list_tasks().await.unwrap_err();

    match err {
        ApiError::Decode { message, source } => {
            assert_eq!(message, "Failed to get tasks");
            assert_eq!(source, MapError::Empty("title"));
        }
        other => panic!("expected a decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_a_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = api_for(&server).list_projects().await.unwrap_err();
    assert!(matches!(err, ApiError::Json { message: "Failed to get projects", .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let api = HttpApi::new("http://127.0.0.1:1", Some(std::time::Duration::from_secs(2))).unwrap();
    let err = api.list_tasks().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
    assert_eq!(err.status(), None);
}

#[test]
fn rejects_invalid_base_url() {
    assert!(matches!(HttpApi::new("not a url", None), Err(ApiError::InvalidBaseUrl(_))));
    let api = HttpApi::new("http://localhost:3000///", None).unwrap();
    assert_eq!(api.base_url(), "http://localhost:3000");
}

// =============================================================================
// Accomplishments and projects
// =============================================================================

fn accomplishment_record() -> serde_json::Value {
    json!({
        "id": 11,
        "task_id": 7,
        "title": "Completed: Write report",
        "description": "Quarterly",
        "time_taken": 50,
        "challenges": "API flaky",
        "proofs": [{ "id": 1, "type": "pull_request", "title": "PR 3", "url": "https://git.example/pr/3" }],
        "created_at": "2025-03-10T10:00:00Z",
        "updated_at": "2025-03-10T10:00:00Z"
    })
}

#[tokio::test]
async fn create_accomplishment_sends_attachments_as_proofs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accomplishments"))
        .and(body_json(json!({
            "title": "Completed: Write report",
            "description": "Quarterly",
            "time_taken": 50,
            "challenges": "API flaky",
            "proofs": [{ "type": "pr", "title": "PR 3", "url": "https://git.example/pr/3" }],
            "task_id": "7"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(accomplishment_record()))
        .expect(1)
        .mount(&server)
        .await;

    let input = NewAccomplishment {
        title: "Completed: Write report".into(),
        description: "Quarterly".into(),
        time_taken: Some(50),
        challenges: Some("API flaky".into()),
        comments: None,
        attachments: vec![NewAttachment {
            kind: AttachmentKind::PullRequest,
            title: "PR 3".into(),
            url: Some("https://git.example/pr/3".into()),
        }],
        task_id: Some("7".into()),
    };
    let created = api_for(&server).create_accomplishment(&input).await.unwrap();

    assert_eq!(created.id, "11");
    assert_eq!(created.attachments.len(), 1);
}

#[tokio::test]
async fn lists_accomplishments_of_a_task() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accomplishments/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([accomplishment_record()])))
        .mount(&server)
        .await;

    let found = api_for(&server).list_accomplishments_by_task("7").await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].task_id.as_deref(), Some("7"));
    assert_eq!(found[0].time_taken, Some(50));
    assert_eq!(found[0].attachments[0].kind, AttachmentKind::PullRequest);
    assert_eq!(found[0].comments, None);
}

#[tokio::test]
async fn update_accomplishment_sends_full_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accomplishments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([accomplishment_record()])))
        .mount(&server)
        .await;
    let mut updated = accomplishment_record();
    updated["comments"] = json!("Shipped");
    Mock::given(method("PUT"))
        .and(path("/accomplishments/11"))
        .and(body_partial_json(json!({
            "title": "Completed: Write report",
            "comments": "Shipped",
            "challenges": "API flaky",
            "task_id": "7",
            "attachments": [{ "type": "pr", "title": "PR 3", "url": "https://git.example/pr/3" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let current = api.list_accomplishments().await.unwrap().remove(0);
    let patch = AccomplishmentPatch { comments: Some("Shipped".into()), ..Default::default() };
    let result = api.update_accomplishment(&current, &patch).await.unwrap();

    assert_eq!(result.comments.as_deref(), Some("Shipped"));
}

#[tokio::test]
async fn deletes_accomplishments_of_a_task() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/accomplishments/task/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(api_for(&server).delete_accomplishments_by_task("7").await.unwrap(), serde_json::Value::Null);
}

#[tokio::test]
async fn creates_project() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects"))
        .and(body_json(json!({ "name": "Website" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 3, "name": "Website" })))
        .mount(&server)
        .await;

    let project = api_for(&server)
        .create_project(&NewProject { name: "Website".into(), description: None })
        .await
        .unwrap();
    assert_eq!(project.id, "3");
    assert_eq!(project.description, None);
}

// =============================================================================
// Stats
// =============================================================================

#[tokio::test]
async fn dashboard_stats_use_date_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard/stats"))
        .and(query_param("date", "2025-03-10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plannedTasks": 2,
            "inProgressTasks": 1,
            "completedTasks": 1,
            "discardedTasks": 0,
            "totalEstimatedMinutes": 180,
            "totalActualMinutes": 45,
            "completionRate": 25.0
        })))
        .mount(&server)
        .await;

    let stats = api_for(&server).dashboard_stats(day(2025, 3, 10)).await.unwrap();

    assert_eq!(stats.total_tasks(), 4);
    assert_eq!(stats.total_estimated_minutes, 180);
    assert_eq!(stats.completion_rate, 25.0);
}

#[tokio::test]
async fn weekly_stats_reject_negative_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats/weekly-stats"))
        .and(query_param("date", "2025-03-10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "day": "Mon", "planned": 3, "completed": -1 }
        ])))
        .mount(&server)
        .await;

    let err = api_for(&server).weekly_stats(day(2025, 3, 10)).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Decode { source: MapError::Negative { field: "completed", value: -1 }, .. }
    ));
}

#[tokio::test]
async fn summary_posts_date_range() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/highlights"))
        .and(query_param("startDate", "2025-03-03"))
        .and(query_param("endDate", "2025-03-09"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "projectName": "Website",
            "projectSummary": [{
                "deliveryDetails": "Launched login",
                "accomplishments": "OAuth",
                "approach": "Pairing"
            }]
        }])))
        .mount(&server)
        .await;

    let summary = api_for(&server).summary_table(day(2025, 3, 3), day(2025, 3, 9)).await.unwrap();

    assert_eq!(summary[0].project_name, "Website");
    assert_eq!(summary[0].rows[0].delivery_details, "Launched login");
}
