//! The `pending_schedule` lifecycle and session authoring.
//!
//! ```text
//! Unscheduled ──mark_pending──▶ PendingSchedule ──submit_schedule──▶ Scheduled
//!      ▲                              ▲                                  │
//!      └──submit_schedule(empty)──────┴──────────mark_pending────────────┘
//! ```
//!
//! Enrollment, grading and attendance are independent of this state.

use std::collections::HashSet;

use serde::Serialize;

use crate::engine::conflicts::{SessionConflict, find_conflicts, find_conflicts_with};
use crate::error::EngineError;
use crate::models::{Course, Session};

/// A course after a session change, with any overlaps it introduced. Conflicts are
/// advisory; the caller decides whether to warn or block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleChange {
    pub course: Course,
    pub conflicts: Vec<SessionConflict>,
}

pub fn find_course<'a>(courses: &'a [Course], course_id: &str) -> Result<&'a Course, EngineError> {
    courses
        .iter()
        .find(|c| c.id == course_id)
        .ok_or_else(|| EngineError::CourseNotFound(course_id.to_string()))
}

/// Flags the course for scheduling. Existing sessions are kept.
pub fn mark_pending(course: &Course) -> Course {
    Course {
        pending_schedule: true,
        ..course.clone()
    }
}

/// Session ids are unique within a course; the first repeated id is reported.
pub fn ensure_unique_ids(sessions: &[Session]) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for s in sessions {
        if !seen.insert(s.id.as_str()) {
            return Err(EngineError::DuplicateSession(s.id.clone()));
        }
    }
    Ok(())
}

/// Replaces the session list wholesale and clears the pending flag.
pub fn apply_schedule(course: &Course, sessions: Vec<Session>) -> Result<ScheduleChange, EngineError> {
    ensure_unique_ids(&sessions)?;
    let sessions: Vec<Session> = sessions
        .into_iter()
        .map(|s| s.rehomed(&course.id))
        .collect();
    let conflicts = find_conflicts(&sessions);

    Ok(ScheduleChange {
        course: Course {
            sessions,
            pending_schedule: false,
            ..course.clone()
        },
        conflicts,
    })
}

/// Looks `course_id` up in the current collection, then applies the schedule.
pub fn submit_schedule(
    courses: &[Course],
    course_id: &str,
    sessions: Vec<Session>,
) -> Result<ScheduleChange, EngineError> {
    let course = find_course(courses, course_id)?;
    apply_schedule(course, sessions)
}

/// Appends a new session. Editing an existing id goes through `replace_session`.
pub fn add_session(course: &Course, session: Session) -> Result<ScheduleChange, EngineError> {
    if course.session(&session.id).is_some() {
        return Err(EngineError::DuplicateSession(session.id));
    }
    let session = session.rehomed(&course.id);
    let conflicts = find_conflicts_with(&course.sessions, &session);

    let mut sessions = course.sessions.clone();
    sessions.push(session);

    Ok(ScheduleChange {
        course: Course {
            sessions,
            ..course.clone()
        },
        conflicts,
    })
}

/// Swaps the session with the same id for `session`, keeping its position.
pub fn replace_session(course: &Course, session: Session) -> Result<ScheduleChange, EngineError> {
    let session = session.rehomed(&course.id);
    let index = course
        .sessions
        .iter()
        .position(|s| s.id == session.id)
        .ok_or_else(|| EngineError::SessionNotFound(session.id.clone()))?;
    let conflicts = find_conflicts_with(&course.sessions, &session);

    let mut sessions = course.sessions.clone();
    sessions[index] = session;

    Ok(ScheduleChange {
        course: Course {
            sessions,
            ..course.clone()
        },
        conflicts,
    })
}

pub fn remove_session(course: &Course, session_id: &str) -> Result<Course, EngineError> {
    if course.session(session_id).is_none() {
        return Err(EngineError::SessionNotFound(session_id.to_string()));
    }

    Ok(Course {
        sessions: course
            .sessions
            .iter()
            .filter(|s| s.id != session_id)
            .cloned()
            .collect(),
        ..course.clone()
    })
}
