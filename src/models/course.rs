use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AttendanceLedger, GradeLedger, Session};

pub type CourseId = String;
pub type StudentId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleState {
    Unscheduled,
    PendingSchedule,
    Scheduled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub teacher: String,
    /// Free-text label such as "Mon & Wed 10:00".
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub enrolled_students: BTreeSet<StudentId>,
    #[serde(default)]
    pub pending_schedule: bool,
    #[serde(default)]
    pub student_grades: GradeLedger,
    #[serde(default)]
    pub student_attendance: AttendanceLedger,
}

impl Course {
    pub fn new(req: NewCourseRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            teacher: req.teacher,
            schedule: req.schedule.unwrap_or_default(),
            sessions: Vec::new(),
            enrolled_students: BTreeSet::new(),
            pending_schedule: false,
            student_grades: GradeLedger::default(),
            student_attendance: AttendanceLedger::default(),
        }
    }

    pub fn schedule_state(&self) -> ScheduleState {
        if self.pending_schedule {
            ScheduleState::PendingSchedule
        } else if self.sessions.is_empty() {
            ScheduleState::Unscheduled
        } else {
            ScheduleState::Scheduled
        }
    }

    pub fn is_enrolled(&self, student_id: &str) -> bool {
        self.enrolled_students.contains(student_id)
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
    pub teacher: String,
    #[serde(default)]
    pub schedule: Option<String>,
}
