use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::slot_utils::ServiceTime;
use crate::schedule::types::{Assignee, Assignment, SlotInstance};
use crate::store::{cell, row, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    #[default]
    Pending,
    Present,
    Absent,
}

impl Attendance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attendance::Pending => "pending",
            Attendance::Present => "present",
            Attendance::Absent => "absent",
        }
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attendance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Attendance::Pending),
            "present" => Ok(Attendance::Present),
            "absent" => Ok(Attendance::Absent),
            other => Err(format!("unknown attendance status {:?}", other)),
        }
    }
}

/// A persisted row of the Schedule sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: String,
    pub date: NaiveDate,
    pub time: ServiceTime,
    pub is_central_mass: bool,
    #[serde(rename = "assignedAcolyteId")]
    pub assignee: Assignee,
    pub attendance: Attendance,
}

impl AssignmentRecord {
    /// Fresh record with a new id and `pending` attendance.
    pub fn from_assignment(assignment: &Assignment) -> Self {
        AssignmentRecord {
            id: Uuid::new_v4().to_string(),
            date: assignment.slot.date,
            time: assignment.slot.time,
            is_central_mass: assignment.slot.is_special,
            assignee: assignment.assignee.clone(),
            attendance: Attendance::Pending,
        }
    }

    pub fn slot(&self) -> SlotInstance {
        SlotInstance {
            date: self.date,
            day: self.date.weekday(),
            time: self.time,
            is_special: self.is_central_mass,
        }
    }

    pub fn from_row(r: &Row) -> Result<Self, String> {
        let id = cell(r, "id");
        if id.is_empty() {
            return Err("missing id".to_string());
        }
        let date = NaiveDate::parse_from_str(cell(r, "date"), "%Y-%m-%d")
            .map_err(|e| format!("bad date {:?}: {}", cell(r, "date"), e))?;
        let time = cell(r, "time")
            .parse::<ServiceTime>()
            .map_err(|e| e.to_string())?;
        // Unknown statuses fall back to pending
        let attendance = cell(r, "attendance_status").parse().unwrap_or_default();

        Ok(AssignmentRecord {
            id: id.to_string(),
            date,
            time,
            is_central_mass: cell(r, "is_central_mass").eq_ignore_ascii_case("true"),
            assignee: Assignee::from(cell(r, "assigned_acolyte_id").to_string()),
            attendance,
        })
    }

    pub fn to_row(&self) -> Row {
        row([
            ("id", self.id.clone()),
            ("date", self.date.format("%Y-%m-%d").to_string()),
            ("time", self.time.to_string()),
            (
                "is_central_mass",
                if self.is_central_mass { "TRUE" } else { "FALSE" }.to_string(),
            ),
            ("assigned_acolyte_id", String::from(self.assignee.clone())),
            ("attendance_status", self.attendance.as_str().to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::CENTRAL_MASS_HOLDER;
    use chrono::Weekday;

    fn schedule_row(attendance: &str, assignee: &str) -> Row {
        row([
            ("id", "abc"),
            ("date", "2025-12-22"),
            ("time", "19:00"),
            ("is_central_mass", "FALSE"),
            ("assigned_acolyte_id", assignee),
            ("attendance_status", attendance),
        ])
    }

    #[test]
    fn parses_schedule_row() {
        let rec = AssignmentRecord::from_row(&schedule_row("present", "5")).unwrap();
        assert_eq!(rec.attendance, Attendance::Present);
        assert_eq!(rec.assignee, Assignee::Participant("5".into()));
        assert_eq!(rec.slot().day, Weekday::Mon);
        assert_eq!(rec.slot().key(), "Monday-19:00");
    }

    #[test]
    fn unknown_attendance_defaults_to_pending() {
        let rec = AssignmentRecord::from_row(&schedule_row("late", "5")).unwrap();
        assert_eq!(rec.attendance, Attendance::Pending);
    }

    #[test]
    fn sentinel_maps_to_placeholder() {
        let rec = AssignmentRecord::from_row(&schedule_row("pending", CENTRAL_MASS_HOLDER)).unwrap();
        assert_eq!(rec.assignee, Assignee::CentralPlaceholder);
        assert_eq!(rec.to_row()["assigned_acolyte_id"], CENTRAL_MASS_HOLDER);
    }

    #[test]
    fn rejects_bad_dates() {
        let mut r = schedule_row("pending", "5");
        r.insert("date".into(), "22/12/2025".into());
        assert!(AssignmentRecord::from_row(&r).is_err());
    }

    #[test]
    fn json_uses_api_field_names() {
        let rec = AssignmentRecord::from_row(&schedule_row("absent", "5")).unwrap();
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["assignedAcolyteId"], "5");
        assert_eq!(json["isCentralMass"], false);
        assert_eq!(json["attendance"], "absent");
        assert_eq!(json["date"], "2025-12-22");
        assert_eq!(json["time"], "19:00");
    }
}
