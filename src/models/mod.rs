pub mod course;
pub mod ledger;
pub mod session;

pub use course::{Course, CourseId, NewCourseRequest, ScheduleState, StudentId};
pub use ledger::{AttendanceLedger, AttendanceRequest, GradeEntry, GradeId, GradeLedger, NewGradeRequest};
pub use session::{ClockTime, NewSessionRequest, Session, SessionId, to_minutes};
