pub mod dto;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::Course;

/// The small external service that records "this course needs a schedule".
/// Only its success signal drives the pending transition.
#[async_trait]
pub trait SchedulingRequestClient: Send + Sync {
    async fn request_schedule(&self, course: &Course) -> Result<bool, AppError>;
}

pub struct HttpSchedulingRequestClient {
    client: Client,
    base_url: String,
}

impl HttpSchedulingRequestClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, course_id: &str) -> String {
        format!("{}/api/courses/{}/schedule-request", self.base_url, course_id)
    }
}

#[async_trait]
impl SchedulingRequestClient for HttpSchedulingRequestClient {
    async fn request_schedule(&self, course: &Course) -> Result<bool, AppError> {
        let body = dto::ScheduleNeededNotification::for_course(course, Utc::now());

        let response = self
            .client
            .post(self.endpoint(&course.id))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("scheduling request for {} rejected ({}): {}", course.id, status, text);
            return Ok(false);
        }

        // An explicit `"success": false` in a 2xx body still counts as a rejection.
        let accepted = response
            .json::<dto::ScheduleRequestResponse>()
            .await
            .ok()
            .and_then(|r| {
                if let Some(id) = &r.notification_id {
                    info!("scheduling notification {} created for {}", id, course.id);
                }
                r.success
            })
            .unwrap_or(true);
        Ok(accepted)
    }
}

/// Accepts every request. Used when no scheduling service is configured.
pub struct NoopSchedulingRequestClient;

#[async_trait]
impl SchedulingRequestClient for NoopSchedulingRequestClient {
    async fn request_schedule(&self, _course: &Course) -> Result<bool, AppError> {
        Ok(true)
    }
}
