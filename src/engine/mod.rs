//! Pure scheduling and ledger logic. Nothing here performs I/O, reads a clock, or
//! holds state: callers pass in the current course value and `now`, and publish
//! whatever comes back.

pub mod conflicts;
pub mod ledger;
pub mod week;
pub mod workflow;

pub use conflicts::{SessionConflict, find_conflicts, find_conflicts_with};
pub use ledger::{
    SessionAttendance, StudentSummary, add_grade, attendance_rate, course_roster, enroll_student,
    mean_grade, purge_unenrolled, remove_student, set_attendance, student_summary,
};
pub use week::{
    Viewpoint, WeekDay, WeekSession, WeekWindow, compute_week_window, courses_for_student,
    courses_for_teacher, day_index, format_time_range, is_today, project_week,
};
pub use workflow::{
    ScheduleChange, add_session, apply_schedule, ensure_unique_ids, find_course, mark_pending,
    remove_session, replace_session, submit_schedule,
};
