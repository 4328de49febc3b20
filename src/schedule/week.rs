use chrono::{Days, NaiveDate};
use rand::Rng;
use tracing::info;

use super::catalog::{resolve_week, CentralChoice, SPECIAL_DAY_OFFSET};
use super::distribute::{distribute, DistributionRules};
use super::types::{Assignee, Assignment, Diagnostic, Pass};
use crate::config::SpecialDayExclusions;
use crate::model::{Participant, SlotDefinition};

/// Inputs of one generation run besides the roster and the definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekRequest {
    pub start: NaiveDate,
    pub central: CentralChoice,
    pub special_day_exclusions: SpecialDayExclusions,
    pub per_slot_cap: Option<usize>,
}

/// Everything a run produced, not yet persisted.
#[derive(Debug, Clone)]
pub struct WeekPlan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub assignments: Vec<Assignment>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the week's assignments: weekday pass, central placeholder, special-day pass.
///
/// Only active acolytes are distributed. Each pass shuffles the roster independently.
pub fn plan_week<R: Rng + ?Sized>(
    request: &WeekRequest,
    definitions: &[SlotDefinition],
    participants: &[Participant],
    rng: &mut R,
) -> WeekPlan {
    let roster: Vec<&Participant> = participants.iter().filter(|p| p.is_assignable()).collect();
    let catalog = resolve_week(request.start, definitions, request.central, rng);

    info!(
        start = %request.start,
        weekday_masses = catalog.regular.len(),
        acolytes = roster.len(),
        "distributing weekday masses"
    );

    let weekday_rules = DistributionRules {
        check_exclusions: true,
        per_slot_cap: request.per_slot_cap,
    };
    let weekdays = distribute(&catalog.regular, &roster, weekday_rules, Pass::Weekdays, rng);

    let special_rules = DistributionRules {
        check_exclusions: request.special_day_exclusions == SpecialDayExclusions::Enforce,
        per_slot_cap: request.per_slot_cap,
    };
    let special = distribute(
        &catalog.special_remainder,
        &roster,
        special_rules,
        Pass::SpecialDay,
        rng,
    );

    let mut assignments = weekdays.assignments;
    if let Some(central) = catalog.central {
        assignments.push(Assignment {
            slot: central,
            assignee: Assignee::CentralPlaceholder,
        });
    }
    assignments.extend(special.assignments);

    let mut diagnostics = catalog.diagnostics;
    diagnostics.extend(weekdays.diagnostics);
    diagnostics.extend(special.diagnostics);

    let end = request
        .start
        .checked_add_days(Days::new(SPECIAL_DAY_OFFSET))
        .unwrap_or(request.start);

    info!(
        assignments = assignments.len(),
        diagnostics = diagnostics.len(),
        "week planned"
    );

    WeekPlan {
        start: request.start,
        end,
        assignments,
        diagnostics,
    }
}
