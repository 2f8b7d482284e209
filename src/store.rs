use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::AppError;
use crate::models::Course;

/// The persistence collaborator. Every write is a whole-course replacement; the last
/// write for a course id wins.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Arc<Course>>, AppError>;
    async fn get(&self, course_id: &str) -> Result<Option<Arc<Course>>, AppError>;
    async fn put(&self, course: Course) -> Result<Arc<Course>, AppError>;
    async fn delete(&self, course_id: &str) -> Result<bool, AppError>;
}

/// Keeps published course values behind `Arc`s so readers hold immutable snapshots
/// while writers swap in replacements.
#[derive(Default)]
pub struct InMemoryCourseStore {
    courses: RwLock<HashMap<String, Arc<Course>>>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        let courses = courses
            .into_iter()
            .map(|c| (c.id.clone(), Arc::new(c)))
            .collect();
        Self {
            courses: RwLock::new(courses),
        }
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn list(&self) -> Result<Vec<Arc<Course>>, AppError> {
        let mut courses: Vec<Arc<Course>> = self.courses.read().await.values().cloned().collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(courses)
    }

    async fn get(&self, course_id: &str) -> Result<Option<Arc<Course>>, AppError> {
        Ok(self.courses.read().await.get(course_id).cloned())
    }

    async fn put(&self, course: Course) -> Result<Arc<Course>, AppError> {
        let course = Arc::new(course);
        let previous = self
            .courses
            .write()
            .await
            .insert(course.id.clone(), course.clone());
        debug!(course_id = %course.id, replaced = previous.is_some(), "course published");
        Ok(course)
    }

    async fn delete(&self, course_id: &str) -> Result<bool, AppError> {
        Ok(self.courses.write().await.remove(course_id).is_some())
    }
}
