pub mod course_service;
pub mod notifier;

pub use course_service::{CourseService, WeekFilter};
pub use notifier::{Notification, NotificationLevel, Notifier, forward_to_log};
