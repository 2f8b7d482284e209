use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Course;

pub const SCHEDULE_NEEDED: &str = "schedule_needed";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleNeededNotification {
    pub course_id: String,
    pub course_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub created_at: String,
    pub read: bool,
}

impl ScheduleNeededNotification {
    pub fn for_course(course: &Course, now: DateTime<Utc>) -> Self {
        Self {
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            kind: SCHEDULE_NEEDED.to_string(),
            message: "This course needs a schedule".to_string(),
            created_at: now.to_rfc3339(),
            read: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequestResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub notification_id: Option<String>,
}
