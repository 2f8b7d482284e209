use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use school_scheduler::models::{Course, NewCourseRequest};
use school_scheduler::scheduling::{HttpSchedulingRequestClient, SchedulingRequestClient};

type Received = Arc<Mutex<Vec<(String, Value)>>>;

/// Serves a stub scheduling service on an ephemeral port and returns its base url.
async fn spawn_stub(status: StatusCode, reply: Value, received: Received) -> String {
    let app = Router::new()
        .route(
            "/api/courses/{id}/schedule-request",
            post(
                move |State(received): State<Received>, Path(id): Path<String>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        received.lock().unwrap().push((id, body));
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(received);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn course() -> Course {
    Course::new(NewCourseRequest {
        name: "Biology Basics".to_string(),
        teacher: "t-frank".to_string(),
        schedule: None,
    })
}

#[tokio::test]
async fn test_accepted_request_posts_schedule_needed() {
    let received = Received::default();
    let base = spawn_stub(
        StatusCode::CREATED,
        json!({ "success": true, "notificationId": "n-1" }),
        received.clone(),
    )
    .await;

    let client = HttpSchedulingRequestClient::new(format!("{base}/")).unwrap();
    let course = course();
    assert!(client.request_schedule(&course).await.unwrap());

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (id, body) = &received[0];
    assert_eq!(id, &course.id);
    assert_eq!(body["courseId"], json!(course.id));
    assert_eq!(body["courseName"], json!("Biology Basics"));
    assert_eq!(body["type"], json!("schedule_needed"));
    assert_eq!(body["read"], json!(false));
}

#[tokio::test]
async fn test_error_status_is_a_rejection() {
    let base = spawn_stub(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "boom" }),
        Received::default(),
    )
    .await;

    let client = HttpSchedulingRequestClient::new(base).unwrap();
    assert!(!client.request_schedule(&course()).await.unwrap());
}

#[tokio::test]
async fn test_explicit_failure_body_is_a_rejection() {
    let base = spawn_stub(StatusCode::OK, json!({ "success": false }), Received::default()).await;

    let client = HttpSchedulingRequestClient::new(base).unwrap();
    assert!(!client.request_schedule(&course()).await.unwrap());
}

#[tokio::test]
async fn test_unreachable_service_is_upstream_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpSchedulingRequestClient::new(format!("http://{addr}")).unwrap();
    let err = client.request_schedule(&course()).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_request_against_configured_service() {
    dotenvy::dotenv().ok();

    let base = std::env::var("SCHEDULING_API_URL").expect("SCHEDULING_API_URL must be set");
    let client = HttpSchedulingRequestClient::new(base).expect("Failed to create scheduling client");

    let course = Course::new(NewCourseRequest {
        name: format!("Integration Test Course - {}", chrono::Utc::now().timestamp()),
        teacher: "integration-teacher".to_string(),
        schedule: None,
    });

    let accepted = client
        .request_schedule(&course)
        .await
        .expect("Scheduling service unreachable");
    println!("scheduling request for {} accepted: {}", course.id, accepted);
}
