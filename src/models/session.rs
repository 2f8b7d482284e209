use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::CourseId;

pub type SessionId = String;

/// A 24-hour `HH:MM` wall-clock time, stored as minute-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        let invalid = || EngineError::InvalidTimeFormat(raw.to_string());

        let (hours, minutes) = raw.split_once(':').ok_or_else(invalid)?;
        if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hours: u16 = hours.parse().map_err(|_| invalid())?;
        let minutes: u16 = minutes.parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }

        Ok(Self(hours * 60 + minutes))
    }

    /// Minute-of-day of a timestamp, seconds truncated.
    pub fn of(at: NaiveDateTime) -> Self {
        Self((at.hour() * 60 + at.minute()) as u16)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// `13:05` -> `1:05 PM`
    pub fn to_12_hour(self) -> String {
        let suffix = if self.hour() >= 12 { "PM" } else { "AM" };
        let hour = match self.hour() % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", hour, self.minute(), suffix)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Parses `HH:MM` into minutes since midnight.
pub fn to_minutes(time: &str) -> Result<u16, EngineError> {
    ClockTime::parse(time).map(ClockTime::minutes)
}

/// One scheduled meeting of a course. Edits replace the whole value by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub course_id: CourseId,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
}

impl Session {
    pub fn new(
        id: impl Into<SessionId>,
        course_id: impl Into<CourseId>,
        date: NaiveDate,
        start_time: ClockTime,
        end_time: ClockTime,
    ) -> Result<Self, EngineError> {
        if end_time <= start_time {
            return Err(EngineError::InvalidSessionRange {
                start: start_time.to_string(),
                end: end_time.to_string(),
            });
        }

        Ok(Self {
            id: id.into(),
            course_id: course_id.into(),
            date,
            start_time,
            end_time,
            room_number: None,
        })
    }

    pub fn with_room(mut self, room_number: Option<String>) -> Self {
        self.room_number = room_number;
        self
    }

    /// Half-open overlap on the same date: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Session) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    /// Only sessions on `now`'s calendar date can be reported as ended here.
    pub fn has_ended(&self, now: NaiveDateTime) -> bool {
        now.date() == self.date && ClockTime::of(now) > self.end_time
    }

    /// True for any earlier date, and for today once the end minute has passed.
    pub fn is_past(&self, now: NaiveDateTime) -> bool {
        self.date < now.date() || self.has_ended(now)
    }

    pub fn can_join(&self, now: NaiveDateTime) -> bool {
        let minute = ClockTime::of(now);
        now.date() == self.date && self.start_time <= minute && minute <= self.end_time
    }

    pub(crate) fn rehomed(mut self, course_id: &str) -> Self {
        if self.course_id != course_id {
            self.course_id = course_id.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionRequest {
    #[serde(default)]
    pub id: Option<SessionId>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub room_number: Option<String>,
}

impl NewSessionRequest {
    pub fn into_session(self, course_id: &str) -> Result<Session, EngineError> {
        let start = ClockTime::parse(&self.start_time)?;
        let end = ClockTime::parse(&self.end_time)?;
        let id = self.id.unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Session::new(id, course_id, self.date, start, end)?.with_room(self.room_number))
    }
}
