use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{ClockTime, Course, CourseId, SessionId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewpoint {
    #[default]
    Student,
    Teacher,
}

/// Monday 00:00 through Sunday 23:59:59.999 of one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// The reference date the window was computed from.
    pub today: NaiveDate,
}

impl WeekWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        let at = date.and_time(NaiveTime::MIN);
        self.start <= at && at <= self.end
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSession {
    pub id: SessionId,
    pub course_id: CourseId,
    pub course_name: String,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    /// `9:00 AM - 10:30 AM`
    pub time_range: String,
    pub room_number: Option<String>,
    pub teacher_name: String,
    pub student_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub day_name: String,
    pub day_number: String,
    pub is_today: bool,
    pub sessions: Vec<WeekSession>,
}

/// Fails for references whose week runs past the representable calendar.
pub fn compute_week_window(reference: NaiveDate) -> Result<WeekWindow, EngineError> {
    let out_of_range = || EngineError::DateOutOfRange(reference.to_string());

    let monday = reference
        .checked_sub_signed(TimeDelta::days(day_index(reference) as i64))
        .ok_or_else(out_of_range)?;
    let start = monday.and_time(NaiveTime::MIN);
    let end = start
        .checked_add_signed(TimeDelta::days(7))
        .and_then(|next_monday| next_monday.checked_sub_signed(TimeDelta::milliseconds(1)))
        .ok_or_else(out_of_range)?;

    Ok(WeekWindow {
        start,
        end,
        today: reference,
    })
}

/// Monday = 0 … Sunday = 6.
pub fn day_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

/// Buckets every session inside `window` into its weekday, each day sorted by start time.
/// Recomputed from scratch on every call.
pub fn project_week(courses: &[Course], window: &WeekWindow, viewpoint: Viewpoint) -> Vec<WeekDay> {
    let mut days: Vec<WeekDay> = window
        .first_day()
        .iter_days()
        .take(7)
        .map(|date| WeekDay {
            date,
            day_name: date.format("%a").to_string(),
            day_number: date.day().to_string(),
            is_today: is_today(date, window.today),
            sessions: Vec::new(),
        })
        .collect();

    for course in courses {
        let student_count = match viewpoint {
            Viewpoint::Teacher => course.enrolled_students.len(),
            Viewpoint::Student => 0,
        };

        for session in course.sessions.iter().filter(|s| window.contains(s.date)) {
            days[day_index(session.date)].sessions.push(WeekSession {
                id: session.id.clone(),
                course_id: course.id.clone(),
                course_name: course.name.clone(),
                start_time: session.start_time,
                end_time: session.end_time,
                time_range: format_time_range(session.start_time, session.end_time),
                room_number: session.room_number.clone(),
                teacher_name: course.teacher.clone(),
                student_count,
            });
        }
    }

    for day in &mut days {
        day.sessions.sort_by_key(|s| s.start_time.minutes());
    }

    days
}

pub fn courses_for_teacher<'a>(courses: &'a [Course], teacher: &'a str) -> impl Iterator<Item = &'a Course> {
    courses.iter().filter(move |c| c.teacher == teacher)
}

pub fn courses_for_student<'a>(courses: &'a [Course], student_id: &'a str) -> impl Iterator<Item = &'a Course> {
    courses.iter().filter(move |c| c.is_enrolled(student_id))
}

/// `9:00 AM - 10:30 AM`
pub fn format_time_range(start: ClockTime, end: ClockTime) -> String {
    format!("{} - {}", start.to_12_hour(), end.to_12_hour())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewCourseRequest, Session};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn course(name: &str, sessions: &[(&str, NaiveDate, &str, &str)]) -> Course {
        let mut course = Course::new(NewCourseRequest {
            name: name.to_string(),
            teacher: format!("teacher-of-{name}"),
            schedule: None,
        });
        course.sessions = sessions
            .iter()
            .map(|(id, d, start, end)| {
                Session::new(*id, course.id.clone(), *d, start.parse().unwrap(), end.parse().unwrap())
                    .unwrap()
            })
            .collect();
        course
    }

    #[test]
    fn window_starts_on_monday() {
        let window = compute_week_window(date(2025, 1, 8)).unwrap();
        assert_eq!(window.start, date(2025, 1, 6).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            window.end,
            date(2025, 1, 12).and_hms_milli_opt(23, 59, 59, 999).unwrap()
        );
    }

    #[test]
    fn sunday_belongs_to_previous_monday() {
        let window = compute_week_window(date(2025, 1, 12)).unwrap();
        assert_eq!(window.first_day(), date(2025, 1, 6));
        assert!(window.contains(date(2025, 1, 12)));
        assert!(!window.contains(date(2025, 1, 13)));
        assert!(!window.contains(date(2025, 1, 5)));
    }

    #[test]
    fn monday_reference_is_its_own_start() {
        let window = compute_week_window(date(2025, 1, 6)).unwrap();
        assert_eq!(window.first_day(), date(2025, 1, 6));
    }

    #[test]
    fn wednesday_session_lands_on_index_two() {
        let courses = vec![course("Biology", &[("s1", date(2025, 1, 8), "13:00", "15:00")])];
        let window = compute_week_window(date(2025, 1, 6)).unwrap();
        let days = project_week(&courses, &window, Viewpoint::Student);

        assert_eq!(days.len(), 7);
        for (i, day) in days.iter().enumerate() {
            if i == 2 {
                assert_eq!(day.sessions.len(), 1);
                assert_eq!(day.sessions[0].id, "s1");
                assert_eq!(day.sessions[0].time_range, "1:00 PM - 3:00 PM");
                assert_eq!(day.day_name, "Wed");
                assert_eq!(day.day_number, "8");
            } else {
                assert!(day.sessions.is_empty(), "day {i} should be empty");
            }
        }
    }

    #[test]
    fn sessions_outside_window_are_skipped() {
        let courses = vec![course(
            "Art",
            &[
                ("before", date(2025, 1, 5), "09:00", "10:00"),
                ("after", date(2025, 1, 13), "09:00", "10:00"),
            ],
        )];
        let window = compute_week_window(date(2025, 1, 8)).unwrap();
        let days = project_week(&courses, &window, Viewpoint::Student);
        assert!(days.iter().all(|d| d.sessions.is_empty()));
    }

    #[test]
    fn days_are_sorted_by_start_across_courses() {
        let monday = date(2025, 1, 6);
        let courses = vec![
            course("Late", &[("late", monday, "14:00", "15:00")]),
            course("Early", &[("early", monday, "8:30", "9:15")]),
            course("Mid", &[("mid", monday, "10:00", "11:00")]),
        ];
        let window = compute_week_window(monday).unwrap();
        let days = project_week(&courses, &window, Viewpoint::Student);
        let order: Vec<&str> = days[0].sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["early", "mid", "late"]);
    }

    #[test]
    fn teacher_view_counts_students() {
        let mut c = course("CS1", &[("s1", date(2025, 1, 7), "13:00", "14:00")]);
        c.enrolled_students.insert("stu-1".to_string());
        c.enrolled_students.insert("stu-2".to_string());
        let courses = vec![c];
        let window = compute_week_window(date(2025, 1, 7)).unwrap();

        let teacher = project_week(&courses, &window, Viewpoint::Teacher);
        assert_eq!(teacher[1].sessions[0].student_count, 2);
        assert!(teacher[1].is_today);

        let student = project_week(&courses, &window, Viewpoint::Student);
        assert_eq!(student[1].sessions[0].student_count, 0);
        assert_eq!(student[1].sessions[0].teacher_name, "teacher-of-CS1");
    }

    #[test]
    fn dashboard_filters() {
        let mut a = course("A", &[]);
        a.enrolled_students.insert("stu-1".to_string());
        let b = course("B", &[]);
        let courses = vec![a, b];

        let mine: Vec<_> = courses_for_student(&courses, "stu-1").map(|c| c.name.as_str()).collect();
        assert_eq!(mine, vec!["A"]);
        let taught: Vec<_> = courses_for_teacher(&courses, "teacher-of-B").map(|c| c.name.as_str()).collect();
        assert_eq!(taught, vec!["B"]);
    }

    #[test]
    fn time_range_formatting() {
        let range = format_time_range("09:00".parse().unwrap(), "13:30".parse().unwrap());
        assert_eq!(range, "9:00 AM - 1:30 PM");
    }

    #[test]
    fn week_past_the_calendar_end_is_an_error() {
        assert!(matches!(
            compute_week_window(NaiveDate::MAX),
            Err(EngineError::DateOutOfRange(_))
        ));
    }

    #[test]
    fn last_full_week_still_projects() {
        // The last Sunday before the final calendar day; its week still fits.
        let mut sunday = NaiveDate::MAX.pred_opt().unwrap();
        while sunday.weekday() != chrono::Weekday::Sun {
            sunday = sunday.pred_opt().unwrap();
        }
        let window = compute_week_window(sunday).unwrap();
        let days = project_week(&[], &window, Viewpoint::Student);
        assert_eq!(days.len(), 7);
        assert_eq!(days[6].date, sunday);
        assert!(days[6].is_today);
    }
}
