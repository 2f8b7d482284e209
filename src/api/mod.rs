use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::engine::{ScheduleChange, SessionConflict, StudentSummary, Viewpoint, WeekDay};
use crate::error::AppError;
use crate::models::*;
use crate::services::WeekFilter;
use crate::state::AppState;

#[derive(Deserialize)]
struct EnrollRequest {
    student_id: StudentId,
}

#[derive(Deserialize)]
struct SubmitScheduleRequest {
    #[serde(default)]
    sessions: Vec<NewSessionRequest>,
}

#[derive(Deserialize)]
struct SummaryQueryParams {
    #[serde(default)]
    at: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
struct WeekQueryParams {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    view: Viewpoint,
    #[serde(default)]
    teacher: Option<String>,
    #[serde(default)]
    student: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", get(get_course).delete(delete_course))
        .route("/courses/{id}/students", post(enroll_student))
        .route(
            "/courses/{id}/students/{student_id}",
            axum::routing::delete(unenroll_student),
        )
        .route("/courses/{id}/students/{student_id}/summary", get(student_summary))
        .route("/courses/{id}/roster", get(roster))
        .route("/courses/{id}/sessions", post(add_session))
        .route(
            "/courses/{id}/sessions/{session_id}",
            put(replace_session).delete(remove_session),
        )
        .route("/courses/{id}/conflicts", get(list_conflicts))
        .route("/courses/{id}/schedule-request", post(request_schedule))
        .route("/courses/{id}/schedule", put(submit_schedule))
        .route("/courses/{id}/attendance", put(set_attendance))
        .route("/courses/{id}/grades", post(add_grade))
        .route("/schedule/week", get(week))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.courses.list_courses().await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    Ok(Json(state.courses.list_courses().await?))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = state.courses.create_course(req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(state.courses.get_course(&id).await?))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.courses.delete_course(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn enroll_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EnrollRequest>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(state.courses.enroll_student(&id, &req.student_id).await?))
}

async fn unenroll_student(
    State(state): State<AppState>,
    Path((id, student_id)): Path<(String, String)>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(state.courses.unenroll_student(&id, &student_id).await?))
}

async fn student_summary(
    State(state): State<AppState>,
    Path((id, student_id)): Path<(String, String)>,
    Query(params): Query<SummaryQueryParams>,
) -> Result<Json<StudentSummary>, AppError> {
    let now = params.at.unwrap_or_else(|| state.clock.now());
    Ok(Json(state.courses.student_summary(&id, &student_id, now).await?))
}

async fn roster(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SummaryQueryParams>,
) -> Result<Json<Vec<StudentSummary>>, AppError> {
    let now = params.at.unwrap_or_else(|| state.clock.now());
    Ok(Json(state.courses.roster(&id, now).await?))
}

async fn add_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<ScheduleChange>, AppError> {
    Ok(Json(state.courses.add_session(&id, req).await?))
}

async fn replace_session(
    State(state): State<AppState>,
    Path((id, session_id)): Path<(String, String)>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<ScheduleChange>, AppError> {
    Ok(Json(state.courses.replace_session(&id, &session_id, req).await?))
}

async fn remove_session(
    State(state): State<AppState>,
    Path((id, session_id)): Path<(String, String)>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(state.courses.remove_session(&id, &session_id).await?))
}

async fn list_conflicts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SessionConflict>>, AppError> {
    Ok(Json(state.courses.conflicts(&id).await?))
}

async fn request_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(state.courses.request_schedule(&id).await?))
}

async fn submit_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitScheduleRequest>,
) -> Result<Json<ScheduleChange>, AppError> {
    Ok(Json(state.courses.submit_schedule(&id, req.sessions).await?))
}

async fn set_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AttendanceRequest>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(state.courses.set_attendance(&id, req).await?))
}

async fn add_grade(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewGradeRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let today = state.clock.now().date();
    let course = state.courses.add_grade(&id, req, today).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn week(
    State(state): State<AppState>,
    Query(params): Query<WeekQueryParams>,
) -> Result<Json<Vec<WeekDay>>, AppError> {
    let reference = params.date.unwrap_or_else(|| state.clock.now().date());
    let filter = WeekFilter {
        teacher: params.teacher,
        student: params.student,
    };
    Ok(Json(state.courses.week(reference, params.view, &filter).await?))
}
