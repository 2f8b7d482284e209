use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{SessionId, StudentId};

pub type GradeId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub id: GradeId,
    pub title: String,
    pub value: f64,
    /// ISO-8601 date (or date-time) string as entered by the teacher.
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGradeRequest {
    pub student_id: StudentId,
    pub title: String,
    pub value: f64,
    #[serde(default)]
    pub date: Option<String>,
}

impl NewGradeRequest {
    pub fn into_entry(self, today: chrono::NaiveDate) -> (StudentId, GradeEntry) {
        let entry = GradeEntry {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            value: self.value,
            date: self.date.unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        };
        (self.student_id, entry)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    pub student_id: StudentId,
    pub session_id: SessionId,
    pub present: bool,
}

/// Grade entries per student, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeLedger(BTreeMap<StudentId, Vec<GradeEntry>>);

impl GradeLedger {
    pub fn entries(&self, student_id: &str) -> &[GradeEntry] {
        self.0.get(student_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.0.contains_key(student_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn with_entry(&self, student_id: &str, entry: GradeEntry) -> Self {
        let mut next = self.0.clone();
        next.entry(student_id.to_string()).or_default().push(entry);
        Self(next)
    }

    pub(crate) fn without(&self, student_id: &str) -> Self {
        let mut next = self.0.clone();
        next.remove(student_id);
        Self(next)
    }

    pub(crate) fn retain_students(self, keep: impl Fn(&str) -> bool) -> Self {
        Self(self.0.into_iter().filter(|(k, _)| keep(k)).collect())
    }
}

impl FromIterator<(StudentId, Vec<GradeEntry>)> for GradeLedger {
    fn from_iter<I: IntoIterator<Item = (StudentId, Vec<GradeEntry>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Presence flags per student and session. A missing key means "not recorded yet",
/// which is distinct from an explicit `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceLedger(BTreeMap<StudentId, BTreeMap<SessionId, bool>>);

impl AttendanceLedger {
    pub fn record(&self, student_id: &str, session_id: &str) -> Option<bool> {
        self.0.get(student_id)?.get(session_id).copied()
    }

    pub fn for_student(&self, student_id: &str) -> Option<&BTreeMap<SessionId, bool>> {
        self.0.get(student_id)
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.0.contains_key(student_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn with_mark(&self, student_id: &str, session_id: &str, present: bool) -> Self {
        let mut next = self.0.clone();
        next.entry(student_id.to_string())
            .or_default()
            .insert(session_id.to_string(), present);
        Self(next)
    }

    pub(crate) fn without(&self, student_id: &str) -> Self {
        let mut next = self.0.clone();
        next.remove(student_id);
        Self(next)
    }

    pub(crate) fn retain_students(self, keep: impl Fn(&str) -> bool) -> Self {
        Self(self.0.into_iter().filter(|(k, _)| keep(k)).collect())
    }
}

impl FromIterator<(StudentId, BTreeMap<SessionId, bool>)> for AttendanceLedger {
    fn from_iter<I: IntoIterator<Item = (StudentId, BTreeMap<SessionId, bool>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
