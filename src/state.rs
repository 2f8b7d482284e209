use std::sync::Arc;

use crate::clock::Clock;
use crate::services::CourseService;

#[derive(Clone)]
pub struct AppState {
    pub courses: Arc<CourseService>,
    pub clock: Arc<dyn Clock>,
}
