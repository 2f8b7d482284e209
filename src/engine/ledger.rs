//! Per-student grades and attendance nested inside a course.
//!
//! Every mutation returns a fresh `Course`; the input value is never modified, so a
//! reader holding the previous value keeps a consistent snapshot.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::EngineError;
use crate::models::{Course, GradeEntry, Session, SessionId};

fn ensure_enrolled(course: &Course, student_id: &str) -> Result<(), EngineError> {
    if course.is_enrolled(student_id) {
        Ok(())
    } else {
        Err(EngineError::StudentNotEnrolled {
            course_id: course.id.clone(),
            student_id: student_id.to_string(),
        })
    }
}

/// Appends a grade. Only non-finite values are rejected; scale checks are caller policy.
pub fn add_grade(course: &Course, student_id: &str, entry: GradeEntry) -> Result<Course, EngineError> {
    ensure_enrolled(course, student_id)?;
    if !entry.value.is_finite() {
        return Err(EngineError::InvalidGradeValue(entry.value));
    }

    Ok(Course {
        student_grades: course.student_grades.with_entry(student_id, entry),
        ..course.clone()
    })
}

pub fn set_attendance(
    course: &Course,
    student_id: &str,
    session_id: &str,
    present: bool,
) -> Result<Course, EngineError> {
    ensure_enrolled(course, student_id)?;

    Ok(Course {
        student_attendance: course
            .student_attendance
            .with_mark(student_id, session_id, present),
        ..course.clone()
    })
}

pub fn enroll_student(course: &Course, student_id: &str) -> Course {
    let mut next = course.clone();
    next.enrolled_students.insert(student_id.to_string());
    next
}

/// Unenrolls and drops the student's grades and attendance.
pub fn remove_student(course: &Course, student_id: &str) -> Course {
    let mut enrolled = course.enrolled_students.clone();
    enrolled.remove(student_id);

    Course {
        enrolled_students: enrolled,
        student_grades: course.student_grades.without(student_id),
        student_attendance: course.student_attendance.without(student_id),
        ..course.clone()
    }
}

/// Drops ledger entries whose student is no longer enrolled.
pub fn purge_unenrolled(mut course: Course) -> Course {
    let enrolled = &course.enrolled_students;
    let grades = std::mem::take(&mut course.student_grades);
    let attendance = std::mem::take(&mut course.student_attendance);
    course.student_grades = grades.retain_students(|s| enrolled.contains(s));
    course.student_attendance = attendance.retain_students(|s| enrolled.contains(s));
    course
}

/// Arithmetic mean rounded to one decimal; 0 when there are no grades yet.
pub fn mean_grade(entries: &[GradeEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let sum: f64 = entries.iter().map(|e| e.value).sum();
    let mean = sum / entries.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Present sessions over present plus lapsed-absent sessions, as a percentage.
///
/// A session is lapsed-absent when it is already past at `now` and not marked present.
/// Future and in-progress sessions without a `true` mark stay out of the denominator.
pub fn attendance_rate(course: &Course, student_id: &str, now: NaiveDateTime) -> f64 {
    let marks = course.student_attendance.for_student(student_id);

    let mut present = 0usize;
    let mut lapsed_absent = 0usize;
    for session in &course.sessions {
        let marked_present = marks
            .and_then(|m| m.get(&session.id))
            .copied()
            .unwrap_or(false);
        if marked_present {
            present += 1;
        } else if session.is_past(now) {
            lapsed_absent += 1;
        }
    }

    let counted = present + lapsed_absent;
    if counted == 0 {
        return 0.0;
    }
    present as f64 / counted as f64 * 100.0
}

/// One course session with the student's presence; an unrecorded mark reads as absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionAttendance {
    pub session: Session,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub student_id: String,
    pub mean_grade: f64,
    pub attendance_rate: f64,
    pub attendance_count: usize,
    pub sessions_count: usize,
    pub grades: Vec<GradeEntry>,
    pub attendance: BTreeMap<SessionId, bool>,
    pub attendance_details: Vec<SessionAttendance>,
}

fn summarize(course: &Course, student_id: &str, now: NaiveDateTime) -> StudentSummary {
    let grades = course.student_grades.entries(student_id);
    let attendance_details: Vec<SessionAttendance> = course
        .sessions
        .iter()
        .map(|session| SessionAttendance {
            session: session.clone(),
            present: course.student_attendance.record(student_id, &session.id) == Some(true),
        })
        .collect();

    StudentSummary {
        student_id: student_id.to_string(),
        mean_grade: mean_grade(grades),
        attendance_rate: attendance_rate(course, student_id, now),
        attendance_count: attendance_details.iter().filter(|d| d.present).count(),
        sessions_count: course.sessions.len(),
        grades: grades.to_vec(),
        attendance: course
            .student_attendance
            .for_student(student_id)
            .cloned()
            .unwrap_or_default(),
        attendance_details,
    }
}

pub fn student_summary(
    course: &Course,
    student_id: &str,
    now: NaiveDateTime,
) -> Result<StudentSummary, EngineError> {
    ensure_enrolled(course, student_id)?;
    Ok(summarize(course, student_id, now))
}

/// Summary of every enrolled student, in student id order.
pub fn course_roster(course: &Course, now: NaiveDateTime) -> Vec<StudentSummary> {
    course
        .enrolled_students
        .iter()
        .map(|student_id| summarize(course, student_id, now))
        .collect()
}
