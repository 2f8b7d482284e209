use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::GradePolicy;
use crate::engine::{self, ScheduleChange, SessionConflict, StudentSummary, Viewpoint, WeekDay};
use crate::error::{AppError, EngineError};
use crate::models::{AttendanceRequest, Course, NewCourseRequest, NewGradeRequest, NewSessionRequest};
use crate::scheduling::SchedulingRequestClient;
use crate::services::notifier::Notifier;
use crate::store::CourseStore;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeekFilter {
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub student: Option<String>,
}

/// Runs each command as read current value → pure engine call → publish replacement.
pub struct CourseService {
    store: Arc<dyn CourseStore>,
    scheduling: Arc<dyn SchedulingRequestClient>,
    notifier: Notifier,
    grade_policy: GradePolicy,
}

impl CourseService {
    pub fn new(
        store: Arc<dyn CourseStore>,
        scheduling: Arc<dyn SchedulingRequestClient>,
        notifier: Notifier,
        grade_policy: GradePolicy,
    ) -> Self {
        Self {
            store,
            scheduling,
            notifier,
            grade_policy,
        }
    }

    async fn load(&self, course_id: &str) -> Result<Arc<Course>, AppError> {
        self.store
            .get(course_id)
            .await?
            .ok_or_else(|| EngineError::CourseNotFound(course_id.to_string()).into())
    }

    async fn publish(&self, course: Course) -> Result<Course, AppError> {
        let published = self.store.put(course).await?;
        Ok((*published).clone())
    }

    fn report<T>(&self, result: Result<T, AppError>, success: impl FnOnce(&T) -> String) -> Result<T, AppError> {
        match &result {
            Ok(value) => self.notifier.success(success(value)),
            Err(e) => self.notifier.error(e.to_string()),
        }
        result
    }

    fn warn_conflicts(&self, course: &Course, conflicts: &[SessionConflict]) {
        for c in conflicts {
            warn!(
                "session conflict in {}: {} {}-{} overlaps {} {}-{}",
                course.id,
                c.first.date,
                c.first.start_time,
                c.first.end_time,
                c.second.date,
                c.second.start_time,
                c.second.end_time
            );
        }
        if !conflicts.is_empty() {
            self.notifier.warning(format!(
                "{} has {} overlapping session pair(s)",
                course.name,
                conflicts.len()
            ));
        }
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let courses = self.store.list().await?;
        Ok(courses.iter().map(|c| (**c).clone()).collect())
    }

    pub async fn get_course(&self, course_id: &str) -> Result<Course, AppError> {
        Ok((*self.load(course_id).await?).clone())
    }

    pub async fn create_course(&self, req: NewCourseRequest) -> Result<Course, AppError> {
        let result = self.publish(Course::new(req)).await;
        self.report(result, |c| format!("Course {} created", c.name))
    }

    pub async fn delete_course(&self, course_id: &str) -> Result<(), AppError> {
        let result = match self.store.delete(course_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(EngineError::CourseNotFound(course_id.to_string()).into()),
            Err(e) => Err(e),
        };
        self.report(result, |_| format!("Course {} deleted", course_id))
    }

    pub async fn enroll_student(&self, course_id: &str, student_id: &str) -> Result<Course, AppError> {
        let result = async {
            let course = self.load(course_id).await?;
            self.publish(engine::enroll_student(&course, student_id)).await
        }
        .await;
        self.report(result, |c| format!("{} enrolled in {}", student_id, c.name))
    }

    pub async fn unenroll_student(&self, course_id: &str, student_id: &str) -> Result<Course, AppError> {
        let result = async {
            let course = self.load(course_id).await?;
            self.publish(engine::remove_student(&course, student_id)).await
        }
        .await;
        self.report(result, |c| format!("{} removed from {}", student_id, c.name))
    }

    pub async fn add_session(&self, course_id: &str, req: NewSessionRequest) -> Result<ScheduleChange, AppError> {
        let result = async {
            let course = self.load(course_id).await?;
            let session = req.into_session(&course.id)?;
            let change = engine::add_session(&course, session)?;
            self.warn_conflicts(&change.course, &change.conflicts);
            let course = self.publish(change.course).await?;
            Ok::<_, AppError>(ScheduleChange { course, ..change })
        }
        .await;
        self.report(result, |c| format!("Session added to {}", c.course.name))
    }

    pub async fn replace_session(
        &self,
        course_id: &str,
        session_id: &str,
        mut req: NewSessionRequest,
    ) -> Result<ScheduleChange, AppError> {
        let result = async {
            let course = self.load(course_id).await?;
            req.id = Some(session_id.to_string());
            let session = req.into_session(&course.id)?;
            let change = engine::replace_session(&course, session)?;
            self.warn_conflicts(&change.course, &change.conflicts);
            let course = self.publish(change.course).await?;
            Ok::<_, AppError>(ScheduleChange { course, ..change })
        }
        .await;
        self.report(result, |c| format!("Session updated in {}", c.course.name))
    }

    pub async fn remove_session(&self, course_id: &str, session_id: &str) -> Result<Course, AppError> {
        let result = async {
            let course = self.load(course_id).await?;
            let next = engine::remove_session(&course, session_id)?;
            self.publish(next).await
        }
        .await;
        self.report(result, |c| format!("Session removed from {}", c.name))
    }

    pub async fn conflicts(&self, course_id: &str) -> Result<Vec<SessionConflict>, AppError> {
        let course = self.load(course_id).await?;
        Ok(engine::find_conflicts(&course.sessions))
    }

    /// Asks the scheduling service first; the flag only flips on its success signal.
    pub async fn request_schedule(&self, course_id: &str) -> Result<Course, AppError> {
        let result = async {
            let course = self.load(course_id).await?;
            if !self.scheduling.request_schedule(&course).await? {
                return Err(AppError::SchedulingRejected(course_id.to_string()));
            }
            let next = engine::mark_pending(&course);
            info!("course {} marked pending schedule (was {:?})", course.id, course.schedule_state());
            self.publish(next).await
        }
        .await;
        self.report(result, |c| format!("Schedule requested for {}", c.name))
    }

    pub async fn submit_schedule(
        &self,
        course_id: &str,
        sessions: Vec<NewSessionRequest>,
    ) -> Result<ScheduleChange, AppError> {
        let result = async {
            let course = self.load(course_id).await?;
            let sessions = sessions
                .into_iter()
                .map(|req| req.into_session(&course.id))
                .collect::<Result<Vec<_>, EngineError>>()?;

            let change = engine::apply_schedule(&course, sessions)?;
            self.warn_conflicts(&change.course, &change.conflicts);
            info!(
                "schedule submitted for {}: {} session(s), {:?} -> {:?}",
                course.id,
                change.course.sessions.len(),
                course.schedule_state(),
                change.course.schedule_state()
            );
            let course = self.publish(change.course).await?;
            Ok::<_, AppError>(ScheduleChange { course, ..change })
        }
        .await;
        self.report(result, |c| format!("Schedule saved for {}", c.course.name))
    }

    pub async fn set_attendance(&self, course_id: &str, req: AttendanceRequest) -> Result<Course, AppError> {
        let result = async {
            let course = self.load(course_id).await?;
            let next = engine::set_attendance(&course, &req.student_id, &req.session_id, req.present)?;
            self.publish(next).await
        }
        .await;
        self.report(result, |c| format!("Attendance updated in {}", c.name))
    }

    pub async fn add_grade(
        &self,
        course_id: &str,
        req: NewGradeRequest,
        today: NaiveDate,
    ) -> Result<Course, AppError> {
        let result = async {
            if !self.grade_policy.allows(req.value) {
                return Err(AppError::BadRequest(format!(
                    "grade {} is outside the 0-10 scale",
                    req.value
                )));
            }
            let course = self.load(course_id).await?;
            let (student_id, entry) = req.into_entry(today);
            let next = engine::add_grade(&course, &student_id, entry)?;
            self.publish(next).await
        }
        .await;
        self.report(result, |c| format!("Grade added in {}", c.name))
    }

    pub async fn student_summary(
        &self,
        course_id: &str,
        student_id: &str,
        now: NaiveDateTime,
    ) -> Result<StudentSummary, AppError> {
        let course = self.load(course_id).await?;
        Ok(engine::student_summary(&course, student_id, now)?)
    }

    pub async fn roster(&self, course_id: &str, now: NaiveDateTime) -> Result<Vec<StudentSummary>, AppError> {
        let course = self.load(course_id).await?;
        Ok(engine::course_roster(&course, now))
    }

    pub async fn week(
        &self,
        reference: NaiveDate,
        viewpoint: Viewpoint,
        filter: &WeekFilter,
    ) -> Result<Vec<WeekDay>, AppError> {
        let window = engine::compute_week_window(reference)?;

        let mut courses: Vec<Course> = self.store.list().await?.iter().map(|c| (**c).clone()).collect();
        if let Some(teacher) = filter.teacher.as_deref() {
            courses = engine::courses_for_teacher(&courses, teacher).cloned().collect();
        }
        if let Some(student) = filter.student.as_deref() {
            courses = engine::courses_for_student(&courses, student).cloned().collect();
        }

        Ok(engine::project_week(&courses, &window, viewpoint))
    }
}
