//! Service façade over the row store: the operations the CLI and the HTTP API call.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Datelike, Days, Local, NaiveDate};
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{GenerationConfig, RegenerationScope};
use crate::error::{Result, RosterError};
use crate::model::{
    default_config_rows, AssignmentRecord, Attendance, MassConfig, NewParticipant, Participant,
    ParticipantPatch,
};
use crate::model::participant::parse_limitations;
use crate::schedule::{plan_week, CentralChoice, Diagnostic, WeekRequest};
use crate::store::{cell, Row, RowStore, Sheet};

/// Caller-supplied knobs of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// First day of the week; defaults to the next Monday after today.
    pub start: Option<NaiveDate>,
    /// Overrides the per-mass target for this run.
    pub per_mass: Option<usize>,
    pub central: CentralChoice,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            start: None,
            per_mass: None,
            central: CentralChoice::Random,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    pub fn warnings(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }
}

/// The next Monday strictly after `today`.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let ahead = match (7 - today.weekday().num_days_from_monday()) % 7 {
        0 => 7,
        n => n,
    };
    today
        .checked_add_days(Days::new(u64::from(ahead)))
        .unwrap_or(today)
}

pub struct Roster {
    store: Arc<dyn RowStore>,
    generation: GenerationConfig,
    /// Serialises every read-modify-write against the store.
    writer: Mutex<()>,
}

impl Roster {
    pub fn new(store: Arc<dyn RowStore>, generation: GenerationConfig) -> Self {
        Self {
            store,
            generation,
            writer: Mutex::new(()),
        }
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|_| RosterError::Storage("roster writer lock poisoned".to_string()))
    }

    /// Writes header rows for every sheet and seeds an empty Config sheet.
    pub fn initialize(&self) -> Result<()> {
        let _guard = self.write_lock()?;
        for sheet in Sheet::ALL {
            let rows = self.store.list_rows(sheet)?;
            if !rows.is_empty() {
                self.store.replace_rows(sheet, &rows)?;
            } else if sheet == Sheet::Config {
                info!("seeding default mass configuration");
                self.store.replace_rows(sheet, &default_config_rows())?;
            } else {
                self.store.clear(sheet)?;
            }
        }
        Ok(())
    }

    pub fn participants(&self) -> Result<Vec<Participant>> {
        let rows = self.store.list_rows(Sheet::Users)?;
        Ok(parse_rows(Sheet::Users, &rows, Participant::from_row))
    }

    pub fn add_participant(&self, new: NewParticipant) -> Result<Participant> {
        if new.name.trim().is_empty() {
            return Err(RosterError::Validation("Name and Role are required".to_string()));
        }
        let participant = Participant {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            role: new.role,
            is_active: new.is_active,
            limitations: parse_limitations(&new.limitations.join(",")),
        };

        let _guard = self.write_lock()?;
        self.store
            .append_rows(Sheet::Users, &[participant.to_row()])?;
        info!(id = %participant.id, name = %participant.name, "participant added");
        Ok(participant)
    }

    pub fn update_participant(&self, id: &str, patch: &ParticipantPatch) -> Result<Participant> {
        let _guard = self.write_lock()?;
        let mut rows = self.store.list_rows(Sheet::Users)?;
        let index = find_row(&rows, id).ok_or_else(|| RosterError::not_found("user", id))?;

        let mut participant = Participant::from_row(&rows[index])
            .map_err(|e| RosterError::Storage(format!("user {} is malformed: {}", id, e)))?;
        patch.apply(&mut participant);
        rows[index] = participant.to_row();

        self.store.replace_rows(Sheet::Users, &rows)?;
        info!(id, "participant updated");
        Ok(participant)
    }

    pub fn mass_config(&self) -> Result<MassConfig> {
        let rows = self.store.list_rows(Sheet::Config)?;
        Ok(MassConfig::from_rows(&rows))
    }

    /// All stored assignments, by date then time.
    pub fn assignments(&self) -> Result<Vec<AssignmentRecord>> {
        let rows = self.store.list_rows(Sheet::Schedule)?;
        let mut records = parse_rows(Sheet::Schedule, &rows, AssignmentRecord::from_row);
        records.sort_by_key(|r| (r.date, r.time));
        Ok(records)
    }

    /// Sets one record's attendance. Other records are left untouched.
    pub fn set_attendance(&self, id: &str, status: Attendance) -> Result<AssignmentRecord> {
        let _guard = self.write_lock()?;
        let mut rows = self.store.list_rows(Sheet::Schedule)?;
        let index = find_row(&rows, id).ok_or_else(|| RosterError::not_found("entry", id))?;

        let mut record = AssignmentRecord::from_row(&rows[index])
            .map_err(|e| RosterError::Storage(format!("entry {} is malformed: {}", id, e)))?;
        record.attendance = status;
        rows[index] = record.to_row();

        self.store.replace_rows(Sheet::Schedule, &rows)?;
        info!(id, %status, "attendance updated");
        Ok(record)
    }

    /// Runs one generation and swaps the stored schedule for its output.
    ///
    /// Old and new records are exchanged in a single `replace_rows`, so a
    /// failed write leaves the previous schedule in place.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        options: &GenerateOptions,
        rng: &mut R,
    ) -> Result<GenerationReport> {
        let _guard = self.write_lock()?;

        let participants = self.participants()?;
        let config = self.mass_config()?;

        let start = options
            .start
            .unwrap_or_else(|| next_monday(Local::now().date_naive()));
        if start.weekday() != chrono::Weekday::Mon {
            info!(%start, weekday = %start.weekday(), "week does not start on a Monday");
        }

        let per_mass = options
            .per_mass
            .or(config.acolytes_per_mass)
            .unwrap_or(self.generation.acolytes_per_mass);
        let per_slot_cap = self.generation.enforce_per_mass_limit.then_some(per_mass);
        info!(
            per_mass,
            enforced = per_slot_cap.is_some(),
            "per-mass target"
        );

        let request = WeekRequest {
            start,
            central: options.central,
            special_day_exclusions: self.generation.special_day_exclusions,
            per_slot_cap,
        };
        let plan = plan_week(&request, &config.definitions, &participants, rng);
        let records: Vec<AssignmentRecord> = plan
            .assignments
            .iter()
            .map(AssignmentRecord::from_assignment)
            .collect();

        let mut rows: Vec<Row> = match self.generation.regeneration_scope {
            RegenerationScope::All => Vec::new(),
            RegenerationScope::Horizon => self
                .store
                .list_rows(Sheet::Schedule)
                .map_err(|e| RosterError::pipeline("reading previous assignments", e))?
                .into_iter()
                .filter(|r| !row_in_range(r, plan.start, plan.end))
                .collect(),
        };
        let kept = rows.len();
        rows.extend(records.iter().map(AssignmentRecord::to_row));

        self.store
            .replace_rows(Sheet::Schedule, &rows)
            .map_err(|e| RosterError::pipeline("writing assignments", e))?;

        info!(
            start = %plan.start,
            end = %plan.end,
            written = records.len(),
            kept,
            "schedule regenerated"
        );

        Ok(GenerationReport {
            start: plan.start,
            end: plan.end,
            count: records.len(),
            diagnostics: plan.diagnostics,
        })
    }
}

fn find_row(rows: &[Row], id: &str) -> Option<usize> {
    rows.iter().position(|r| cell(r, "id") == id)
}

/// Rows whose date cannot be read are treated as outside every horizon.
fn row_in_range(r: &Row, start: NaiveDate, end: NaiveDate) -> bool {
    NaiveDate::parse_from_str(cell(r, "date"), "%Y-%m-%d")
        .map(|d| d >= start && d <= end)
        .unwrap_or(false)
}

fn parse_rows<T>(sheet: Sheet, rows: &[Row], parse: fn(&Row) -> std::result::Result<T, String>) -> Vec<T> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, r)| match parse(r) {
            Ok(item) => Some(item),
            Err(e) => {
                // +2: header line and 1-based numbering
                warn!(sheet = %sheet, row = index + 2, error = %e, "skipping malformed row");
                None
            }
        })
        .collect()
}
