use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::FixedOffset;

use crate::error::AppError;

/// Whether grade values outside the 0–10 scale are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GradePolicy {
    #[default]
    Accept,
    Scale0To10,
}

impl GradePolicy {
    pub fn allows(self, value: f64) -> bool {
        match self {
            GradePolicy::Accept => true,
            GradePolicy::Scale0To10 => (0.0..=10.0).contains(&value),
        }
    }
}

impl FromStr for GradePolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(GradePolicy::Accept),
            "scale-0-10" => Ok(GradePolicy::Scale0To10),
            other => Err(AppError::Config(format!("unknown GRADE_POLICY {:?}", other))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub scheduling_api_url: Option<String>,
    pub utc_offset: FixedOffset,
    pub grade_policy: GradePolicy,
    pub seed_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?;

        let scheduling_api_url = lookup("SCHEDULING_API_URL").filter(|v| !v.trim().is_empty());

        let offset_minutes = match lookup("SCHOOL_UTC_OFFSET_MINUTES") {
            Some(raw) => raw.trim().parse::<i32>().map_err(|e| {
                AppError::Config(format!("SCHOOL_UTC_OFFSET_MINUTES is invalid: {}", e))
            })?,
            None => 0,
        };
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            AppError::Config(format!("SCHOOL_UTC_OFFSET_MINUTES out of range: {}", offset_minutes))
        })?;

        let grade_policy = match lookup("GRADE_POLICY") {
            Some(raw) => raw.parse()?,
            None => GradePolicy::default(),
        };

        let seed_path = lookup("SEED_COURSES_PATH").map(PathBuf::from);

        Ok(Self {
            bind_addr,
            scheduling_api_url,
            utc_offset,
            grade_policy,
            seed_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert!(config.scheduling_api_url.is_none());
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
        assert_eq!(config.grade_policy, GradePolicy::Accept);
    }

    #[test]
    fn reads_all_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("SCHEDULING_API_URL", "http://localhost:4000"),
            ("SCHOOL_UTC_OFFSET_MINUTES", "-300"),
            ("GRADE_POLICY", "scale-0-10"),
            ("SEED_COURSES_PATH", "courses.json"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.scheduling_api_url.as_deref(), Some("http://localhost:4000"));
        assert_eq!(config.utc_offset.local_minus_utc(), -300 * 60);
        assert_eq!(config.grade_policy, GradePolicy::Scale0To10);
        assert_eq!(config.seed_path, Some(PathBuf::from("courses.json")));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("GRADE_POLICY", "strictish")])),
            Err(AppError::Config(_))
        ));
        assert!(AppConfig::from_lookup(lookup(&[("SCHOOL_UTC_OFFSET_MINUTES", "9999")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])).is_err());
    }

    #[test]
    fn scale_policy_bounds() {
        assert!(GradePolicy::Scale0To10.allows(0.0));
        assert!(GradePolicy::Scale0To10.allows(10.0));
        assert!(!GradePolicy::Scale0To10.allows(10.5));
        assert!(GradePolicy::Accept.allows(-3.0));
    }
}
