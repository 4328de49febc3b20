use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// English day names, indexed from Monday, as they appear in slot keys and the Config sheet.
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Converts a weekday to the full English name used in slot keys
pub fn day_name(day: Weekday) -> &'static str {
    DAY_NAMES[day.num_days_from_monday() as usize]
}

/// Parses a full English day name, ignoring case and surrounding whitespace
pub fn parse_day_name(name: &str) -> Option<Weekday> {
    let name = name.trim();
    DAY_NAMES
        .iter()
        .position(|d| d.eq_ignore_ascii_case(name))
        .and_then(|i| Weekday::try_from(i as u8).ok())
}

/// Time of day of a service, always rendered as 24-hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime(NaiveTime);

impl ServiceTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(ServiceTime)
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTime(pub String);

impl fmt::Display for InvalidTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid time of day {:?}, expected HH:MM", self.0)
    }
}

impl std::error::Error for InvalidTime {}

impl FromStr for ServiceTime {
    type Err = InvalidTime;

    /// Accepts `H:MM` or `HH:MM`; seconds are not allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (hours, minutes) = trimmed
            .split_once(':')
            .ok_or_else(|| InvalidTime(s.to_string()))?;
        if minutes.len() != 2 || hours.is_empty() || hours.len() > 2 {
            return Err(InvalidTime(s.to_string()));
        }
        let hours: u32 = hours.parse().map_err(|_| InvalidTime(s.to_string()))?;
        let minutes: u32 = minutes.parse().map_err(|_| InvalidTime(s.to_string()))?;
        ServiceTime::from_hm(hours, minutes).ok_or_else(|| InvalidTime(s.to_string()))
    }
}

impl Serialize for ServiceTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServiceTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Builds the `{DayName}-{HH:MM}` key shared by slots and exclusion sets
pub fn slot_key(day: Weekday, time: ServiceTime) -> String {
    format!("{}-{}", day_name(day), time)
}
