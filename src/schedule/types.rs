use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::slot_utils::{day_name, slot_key, ServiceTime};

/// Placeholder assignee stored on the central mass record.
pub const CENTRAL_MASS_HOLDER: &str = "CENTRAL_MASS_HOLDER";

/// A recurring mass materialised on a concrete date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInstance {
    pub date: NaiveDate,
    pub day: Weekday,
    pub time: ServiceTime,
    /// Set only on the special day's chosen central mass.
    pub is_special: bool,
}

impl SlotInstance {
    pub fn key(&self) -> String {
        slot_key(self.day, self.time)
    }
}

impl fmt::Display for SlotInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", day_name(self.day), self.date, self.time)
    }
}

/// Who serves a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Assignee {
    Participant(String),
    /// Deliberately unassigned: the central mass.
    CentralPlaceholder,
}

impl Assignee {
    pub fn participant_id(&self) -> Option<&str> {
        match self {
            Assignee::Participant(id) => Some(id),
            Assignee::CentralPlaceholder => None,
        }
    }
}

impl From<String> for Assignee {
    fn from(value: String) -> Self {
        if value == CENTRAL_MASS_HOLDER {
            Assignee::CentralPlaceholder
        } else {
            Assignee::Participant(value)
        }
    }
}

impl From<Assignee> for String {
    fn from(value: Assignee) -> Self {
        match value {
            Assignee::Participant(id) => id,
            Assignee::CentralPlaceholder => CENTRAL_MASS_HOLDER.to_string(),
        }
    }
}

/// One binding produced by a generation run, before it is given an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub slot: SlotInstance,
    pub assignee: Assignee,
}

/// Which distribution pass a diagnostic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Weekdays,
    SpecialDay,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Weekdays => f.write_str("weekday"),
            Pass::SpecialDay => f.write_str("special day"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnassignedReason {
    /// Every candidate slot is in the participant's exclusion set.
    Exclusions,
    /// Some slots were allowed but all of them were already full.
    Capacity,
}

/// Non-fatal findings of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    NoSlots {
        pass: Pass,
    },
    Unassigned {
        participant_id: String,
        name: String,
        pass: Pass,
        reason: UnassignedReason,
    },
    NoCentralOptions {
        day: Weekday,
    },
    MissingCentralSlot {
        day: Weekday,
        time: ServiceTime,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NoSlots { pass: Pass::Weekdays } => {
                f.write_str("no weekday masses defined for this week")
            }
            Diagnostic::NoSlots { pass: Pass::SpecialDay } => {
                f.write_str("no non-central masses found for the special day")
            }
            Diagnostic::Unassigned {
                participant_id,
                name,
                pass,
                reason: UnassignedReason::Exclusions,
            } => write!(
                f,
                "could not assign {} ({}) to any {} mass due to limitations",
                name, participant_id, pass
            ),
            Diagnostic::Unassigned {
                participant_id,
                name,
                pass,
                reason: UnassignedReason::Capacity,
            } => write!(
                f,
                "could not assign {} ({}) to any {} mass: every allowed mass is full",
                name, participant_id, pass
            ),
            Diagnostic::NoCentralOptions { day } => write!(
                f,
                "no central_option masses defined for {}",
                day_name(*day)
            ),
            Diagnostic::MissingCentralSlot { day, time } => write!(
                f,
                "central mass time {} not found in config for {}",
                time,
                day_name(*day)
            ),
        }
    }
}

/// Outcome of one distribution pass.
#[derive(Debug, Clone, Default)]
pub struct Distribution {
    pub assignments: Vec<Assignment>,
    pub unassigned: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}
