//! Document-store shapes and their normalization into engine values.
//!
//! Stored session dates arrive as backend timestamp objects, RFC 3339 strings, or plain
//! `YYYY-MM-DD`. They are converted to calendar dates here and nowhere else.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use tracing::warn;

use crate::engine;
use crate::error::AppError;
use crate::models::{
    AttendanceLedger, ClockTime, Course, GradeEntry, GradeLedger, Session, SessionId,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredDate {
    Timestamp {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },
    Text(String),
}

impl StoredDate {
    /// Calendar date of the stored instant as seen from the school's UTC offset.
    pub fn to_naive_date(&self, offset: FixedOffset) -> Result<NaiveDate, AppError> {
        match self {
            StoredDate::Timestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds)
                .map(|utc| utc.with_timezone(&offset).date_naive())
                .ok_or_else(|| {
                    AppError::BadRequest(format!("timestamp out of range: {}s", seconds))
                }),
            StoredDate::Text(raw) => {
                if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                    return Ok(date);
                }
                DateTime::parse_from_rfc3339(raw)
                    .map(|dt| dt.with_timezone(&offset).date_naive())
                    .map_err(|e| AppError::BadRequest(format!("invalid stored date {:?}: {}", raw, e)))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    pub date: StoredDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub room_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCourse {
    pub id: String,
    pub name: String,
    pub teacher: String,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub sessions: Vec<StoredSession>,
    #[serde(default)]
    pub enrolled_students: Vec<String>,
    #[serde(default)]
    pub pending_schedule: bool,
    #[serde(default)]
    pub student_grades: HashMap<String, Vec<GradeEntry>>,
    #[serde(default)]
    pub student_attendance: HashMap<String, HashMap<SessionId, bool>>,
}

impl StoredCourse {
    /// Students that have grades or attendance on file but are not enrolled.
    fn unenrolled_ledger_keys(&self) -> BTreeSet<String> {
        self.student_grades
            .keys()
            .chain(self.student_attendance.keys())
            .filter(|s| !self.enrolled_students.contains(*s))
            .cloned()
            .collect()
    }

    pub fn into_course(self, offset: FixedOffset) -> Result<Course, AppError> {
        let stale = self.unenrolled_ledger_keys();

        let sessions = self
            .sessions
            .into_iter()
            .enumerate()
            .map(|(i, s)| -> Result<Session, AppError> {
                let date = s.date.to_naive_date(offset)?;
                let start = ClockTime::parse(&s.start_time)?;
                let end = ClockTime::parse(&s.end_time)?;
                // Older documents carry sessions without ids; derive a stable one.
                let id = s.id.unwrap_or_else(|| format!("{}-session-{}", self.id, i));
                Ok(Session::new(id, self.id.as_str(), date, start, end)?.with_room(s.room_number))
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        engine::ensure_unique_ids(&sessions)?;

        let course = Course {
            id: self.id,
            name: self.name,
            teacher: self.teacher,
            schedule: self.schedule.unwrap_or_default(),
            sessions,
            enrolled_students: self.enrolled_students.into_iter().collect(),
            pending_schedule: self.pending_schedule,
            student_grades: self.student_grades.into_iter().collect::<GradeLedger>(),
            student_attendance: self
                .student_attendance
                .into_iter()
                .map(|(student, marks)| (student, marks.into_iter().collect::<BTreeMap<_, _>>()))
                .collect::<AttendanceLedger>(),
        };

        if !stale.is_empty() {
            warn!(
                course_id = %course.id,
                students = ?stale,
                "dropped ledger entries of students no longer enrolled"
            );
        }
        Ok(engine::purge_unenrolled(course))
    }
}

/// Parses a JSON array of stored course documents.
pub fn courses_from_json(raw: &str, offset: FixedOffset) -> Result<Vec<Course>, AppError> {
    let stored: Vec<StoredCourse> = serde_json::from_str(raw)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse course documents: {}", e)))?;
    stored.into_iter().map(|c| c.into_course(offset)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn timestamp_objects_become_local_dates() {
        // 2025-01-07T23:30:00Z
        let stored = StoredDate::Timestamp {
            seconds: 1_736_292_600,
            nanoseconds: 0,
        };
        assert_eq!(
            stored.to_naive_date(utc()).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()
        );
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            stored.to_naive_date(plus_two).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 8).unwrap()
        );
    }

    #[test]
    fn text_dates_accept_plain_and_rfc3339() {
        let plain = StoredDate::Text("2025-01-08".to_string());
        let rfc = StoredDate::Text("2025-01-08T13:00:00.000Z".to_string());
        let expected = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        assert_eq!(plain.to_naive_date(utc()).unwrap(), expected);
        assert_eq!(rfc.to_naive_date(utc()).unwrap(), expected);
        assert!(StoredDate::Text("next tuesday".to_string()).to_naive_date(utc()).is_err());
    }

    #[test]
    fn documents_normalize_into_courses() {
        let raw = r#"[{
            "id": "c1",
            "name": "Biology Basics",
            "teacher": "t-frank",
            "schedule": "Mon & Wed 10:00",
            "pendingSchedule": true,
            "enrolledStudents": ["stu-1", "stu-1"],
            "sessions": [
                {"id": "s1", "courseId": "c1", "date": {"seconds": 1736330400, "nanoseconds": 0},
                 "startTime": "10:00", "endTime": "11:00", "roomNumber": "B12"},
                {"date": "2025-01-10", "startTime": "10:00", "endTime": "11:00"}
            ],
            "studentGrades": {
                "stu-1": [{"id": "g1", "title": "Quiz", "value": 9, "date": "2025-01-08"}],
                "gone": [{"id": "g2", "title": "Quiz", "value": 4, "date": "2025-01-08"}]
            },
            "studentAttendance": {"stu-1": {"s1": true}}
        }]"#;

        let courses = courses_from_json(raw, utc()).unwrap();
        let course = &courses[0];
        assert!(course.pending_schedule);
        assert_eq!(course.enrolled_students.len(), 1);
        assert_eq!(course.sessions.len(), 2);
        assert_eq!(course.sessions[0].date, NaiveDate::from_ymd_opt(2025, 1, 8).unwrap());
        assert_eq!(course.sessions[1].id, "c1-session-1");
        assert_eq!(course.student_grades.entries("stu-1")[0].value, 9.0);
        assert!(!course.student_grades.contains("gone"));
        assert_eq!(course.student_attendance.record("stu-1", "s1"), Some(true));
    }

    #[test]
    fn malformed_session_times_are_rejected() {
        let raw = r#"[{"id": "c1", "name": "Art", "teacher": "t",
            "sessions": [{"date": "2025-01-08", "startTime": "15:00", "endTime": "14:00"}]}]"#;
        let err = courses_from_json(raw, utc()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Engine(crate::error::EngineError::InvalidSessionRange { .. })
        ));
    }

    #[test]
    fn derived_session_id_colliding_with_explicit_one_is_rejected() {
        let raw = r#"[{"id": "c1", "name": "Art", "teacher": "t",
            "sessions": [
                {"id": "c1-session-1", "date": "2025-01-08", "startTime": "09:00", "endTime": "10:00"},
                {"date": "2025-01-09", "startTime": "09:00", "endTime": "10:00"}
            ]}]"#;
        let err = courses_from_json(raw, utc()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Engine(crate::error::EngineError::DuplicateSession(ref id)) if id == "c1-session-1"
        ));
    }

    #[test]
    fn attendance_of_unenrolled_students_is_purged() {
        let raw = r#"[{"id": "c1", "name": "Art", "teacher": "t",
            "enrolledStudents": ["stu-1"],
            "studentGrades": {"gone": [{"id": "g1", "title": "Quiz", "value": 4, "date": "2025-01-08"}]},
            "studentAttendance": {"stu-1": {"s1": true}, "left": {"s1": false}}
        }]"#;
        let stored: Vec<StoredCourse> = serde_json::from_str(raw).unwrap();
        let stale: Vec<String> = stored[0].unenrolled_ledger_keys().into_iter().collect();
        assert_eq!(stale, vec!["gone", "left"]);

        let course = stored.into_iter().next().unwrap().into_course(utc()).unwrap();
        assert!(!course.student_attendance.contains("left"));
        assert_eq!(course.student_attendance.record("stu-1", "s1"), Some(true));
        assert!(course.student_grades.is_empty());
    }
}
