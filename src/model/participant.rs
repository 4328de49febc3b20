use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::{cell, row, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "master", alias = "supervisor")]
    Supervisor,
    /// The only role that takes part in distribution.
    #[serde(rename = "acolyte")]
    Acolyte,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "master",
            Role::Acolyte => "acolyte",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "master" | "supervisor" => Ok(Role::Supervisor),
            "acolyte" => Ok(Role::Acolyte),
            other => Err(format!("unknown role {:?}", other)),
        }
    }
}

/// A person on the roster, as stored in the Users sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    /// `{DayName}-{HH:MM}` keys this person cannot serve. Membership test only.
    pub limitations: Vec<String>,
}

impl Participant {
    /// Active acolytes are the only people distributed onto slots.
    pub fn is_assignable(&self) -> bool {
        self.is_active && self.role == Role::Acolyte
    }

    pub fn excludes(&self, slot_key: &str) -> bool {
        self.limitations.iter().any(|l| l == slot_key)
    }

    pub fn from_row(r: &Row) -> Result<Self, String> {
        let id = cell(r, "id");
        if id.is_empty() {
            return Err("missing id".to_string());
        }
        let role = cell(r, "role").parse::<Role>()?;

        Ok(Participant {
            id: id.to_string(),
            name: cell(r, "name").to_string(),
            role,
            is_active: parse_active(cell(r, "active")),
            limitations: parse_limitations(cell(r, "limitations")),
        })
    }

    pub fn to_row(&self) -> Row {
        row([
            ("id", self.id.clone()),
            ("name", self.name.clone()),
            ("role", self.role.as_str().to_string()),
            ("active", if self.is_active { "TRUE" } else { "FALSE" }.to_string()),
            ("limitations", self.limitations.join(",")),
        ])
    }
}

fn parse_active(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Splits the comma-joined limitations cell, dropping blanks and duplicates
pub fn parse_limitations(value: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in value.split(',') {
        let part = part.trim();
        if !part.is_empty() && !out.iter().any(|p| p == part) {
            out.push(part.to_string());
        }
    }
    out
}

/// Fields accepted when creating a participant.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParticipant {
    pub name: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub limitations: Vec<String>,
}

fn default_active() -> bool {
    true
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub limitations: Option<Vec<String>>,
}

impl ParticipantPatch {
    pub fn apply(&self, participant: &mut Participant) {
        if let Some(name) = &self.name {
            participant.name = name.clone();
        }
        if let Some(role) = self.role {
            participant.role = role;
        }
        if let Some(active) = self.is_active {
            participant.is_active = active;
        }
        if let Some(limitations) = &self.limitations {
            participant.limitations = parse_limitations(&limitations.join(","));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_row(id: &str, role: &str, active: &str, limitations: &str) -> Row {
        row([
            ("id", id),
            ("name", "Juan Pérez"),
            ("role", role),
            ("active", active),
            ("limitations", limitations),
        ])
    }

    #[test]
    fn parses_users_row() {
        let p = Participant::from_row(&users_row("1", "acolyte", "TRUE", "Monday-19:00, Sunday-08:00"))
            .unwrap();
        assert_eq!(p.role, Role::Acolyte);
        assert!(p.is_active);
        assert!(p.is_assignable());
        assert_eq!(p.limitations, vec!["Monday-19:00", "Sunday-08:00"]);
        assert!(p.excludes("Sunday-08:00"));
        assert!(!p.excludes("Sunday-10:00"));
    }

    #[test]
    fn inactive_or_non_acolyte_is_not_assignable() {
        let inactive = Participant::from_row(&users_row("1", "acolyte", "FALSE", "")).unwrap();
        assert!(!inactive.is_assignable());
        let master = Participant::from_row(&users_row("2", "master", "true", "")).unwrap();
        assert_eq!(master.role, Role::Supervisor);
        assert!(!master.is_assignable());
    }

    #[test]
    fn rejects_unknown_role_and_missing_id() {
        assert!(Participant::from_row(&users_row("1", "deacon", "TRUE", "")).is_err());
        assert!(Participant::from_row(&users_row("", "acolyte", "TRUE", "")).is_err());
    }

    #[test]
    fn malformed_limitation_never_matches() {
        let p = Participant::from_row(&users_row("1", "acolyte", "TRUE", "Mon-19:00")).unwrap();
        assert!(!p.excludes("Monday-19:00"));
    }

    #[test]
    fn row_round_trip_keeps_fields() {
        let p = Participant {
            id: "7".into(),
            name: "María Gómez".into(),
            role: Role::Acolyte,
            is_active: false,
            limitations: vec!["Friday-19:00".into()],
        };
        assert_eq!(Participant::from_row(&p.to_row()).unwrap(), p);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut p = Participant::from_row(&users_row("1", "acolyte", "TRUE", "")).unwrap();
        let patch = ParticipantPatch {
            is_active: Some(false),
            limitations: Some(vec!["Monday-19:00".into(), "Monday-19:00".into()]),
            ..Default::default()
        };
        patch.apply(&mut p);
        assert!(!p.is_active);
        assert_eq!(p.name, "Juan Pérez");
        assert_eq!(p.limitations, vec!["Monday-19:00"]);
    }

    #[test]
    fn supervisor_spelling_accepted_everywhere() {
        let patch: ParticipantPatch =
            serde_json::from_value(serde_json::json!({"role": "supervisor"})).unwrap();
        assert_eq!(patch.role, Some(Role::Supervisor));
        assert_eq!("supervisor".parse::<Role>().unwrap(), Role::Supervisor);
        assert_eq!(serde_json::to_value(Role::Supervisor).unwrap(), "master");
    }
}
