use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::schedule::slot_utils::{day_name, parse_day_name, slot_key, ServiceTime};
use crate::store::{cell, row, Row};

pub const ACOLYTES_PER_MASS_KEY: &str = "acolytes_per_mass";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotCategory {
    Regular,
    /// May be picked as the special day's central mass.
    CentralOption,
}

impl SlotCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotCategory::Regular => "regular",
            SlotCategory::CentralOption => "central_option",
        }
    }
}

/// A mass that recurs every week on `day` at `time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDefinition {
    pub day: Weekday,
    pub time: ServiceTime,
    pub category: SlotCategory,
}

impl SlotDefinition {
    pub fn new(day: Weekday, time: ServiceTime, category: SlotCategory) -> Self {
        Self { day, time, category }
    }

    pub fn key(&self) -> String {
        slot_key(self.day, self.time)
    }

    pub fn to_row(&self) -> Row {
        row([
            ("day", day_name(self.day).to_string()),
            ("time", self.time.to_string()),
            ("type", self.category.as_str().to_string()),
        ])
    }
}

/// Everything the Config sheet holds: recurring masses plus key/value settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MassConfig {
    pub definitions: Vec<SlotDefinition>,
    pub acolytes_per_mass: Option<usize>,
}

impl MassConfig {
    /// Rows carrying both `day` and `time` are definitions; rows with a `setting_key` are settings.
    /// Malformed rows are logged and skipped.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut config = MassConfig::default();

        for (index, r) in rows.iter().enumerate() {
            let day = cell(r, "day");
            let time = cell(r, "time");
            let setting_key = cell(r, "setting_key");

            if !day.is_empty() && !time.is_empty() {
                let Some(weekday) = parse_day_name(day) else {
                    warn!(row = index + 2, day, "skipping config row with unknown day name");
                    continue;
                };
                let time = match time.parse::<ServiceTime>() {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(row = index + 2, error = %e, "skipping config row");
                        continue;
                    }
                };
                let category = if cell(r, "type") == SlotCategory::CentralOption.as_str() {
                    SlotCategory::CentralOption
                } else {
                    SlotCategory::Regular
                };
                config
                    .definitions
                    .push(SlotDefinition::new(weekday, time, category));
            } else if setting_key == ACOLYTES_PER_MASS_KEY {
                match cell(r, "setting_value").parse::<usize>() {
                    Ok(n) => config.acolytes_per_mass = Some(n),
                    Err(_) => warn!(
                        row = index + 2,
                        value = cell(r, "setting_value"),
                        "ignoring non-numeric acolytes_per_mass"
                    ),
                }
            }
        }

        config
    }
}

/// Seed rows for an empty Config sheet: one evening mass Monday to Saturday,
/// five Sunday masses of which three can be central.
pub fn default_config_rows() -> Vec<Row> {
    let weekday_mass = ServiceTime::from_hm(19, 0);
    let mut rows: Vec<Row> = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ]
    .into_iter()
    .filter_map(|day| weekday_mass.map(|t| SlotDefinition::new(day, t, SlotCategory::Regular)))
    .map(|def| def.to_row())
    .collect();

    let sunday = [
        (8, 0, SlotCategory::Regular),
        (10, 0, SlotCategory::CentralOption),
        (12, 0, SlotCategory::CentralOption),
        (18, 0, SlotCategory::CentralOption),
        (19, 30, SlotCategory::Regular),
    ];
    for (h, m, category) in sunday {
        if let Some(t) = ServiceTime::from_hm(h, m) {
            rows.push(SlotDefinition::new(Weekday::Sun, t, category).to_row());
        }
    }

    rows.push(row([
        ("setting_key", ACOLYTES_PER_MASS_KEY),
        ("setting_value", "2"),
    ]));
    rows
}
