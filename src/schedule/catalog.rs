use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::slot_utils::ServiceTime;
use super::types::{Diagnostic, SlotInstance};
use crate::model::{SlotCategory, SlotDefinition};

/// Offset of the special day within the seven-day window.
pub const SPECIAL_DAY_OFFSET: u64 = 6;

/// How the special day's central mass is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentralChoice {
    /// Uniformly among that day's `central_option` masses.
    Random,
    Manual(ServiceTime),
}

impl CentralChoice {
    /// Random when asked for explicitly or when no time is given.
    pub fn from_request(random: bool, time: Option<ServiceTime>) -> Self {
        match (random, time) {
            (false, Some(t)) => CentralChoice::Manual(t),
            _ => CentralChoice::Random,
        }
    }
}

/// The week's slot instances, split the way the distribution passes consume them.
#[derive(Debug, Clone, Default)]
pub struct WeekCatalog {
    /// Days 0..=5, in date order then definition order.
    pub regular: Vec<SlotInstance>,
    pub central: Option<SlotInstance>,
    /// The special day's masses other than the central one, in definition order.
    pub special_remainder: Vec<SlotInstance>,
    pub diagnostics: Vec<Diagnostic>,
}

fn day_at(start: NaiveDate, offset: u64) -> Option<NaiveDate> {
    start.checked_add_days(Days::new(offset))
}

fn instances_for(date: NaiveDate, definitions: &[SlotDefinition]) -> impl Iterator<Item = SlotInstance> + '_ {
    let day = date.weekday();
    definitions
        .iter()
        .filter(move |d| d.day == day)
        .map(move |d| SlotInstance {
            date,
            day,
            time: d.time,
            is_special: false,
        })
}

/// Expands recurring definitions into the seven days starting at `start`.
///
/// The seventh day is the special day whatever weekday it falls on. A central
/// time with no matching definition yields no central slot and a diagnostic.
pub fn resolve_week<R: Rng + ?Sized>(
    start: NaiveDate,
    definitions: &[SlotDefinition],
    choice: CentralChoice,
    rng: &mut R,
) -> WeekCatalog {
    let mut catalog = WeekCatalog::default();

    for offset in 0..SPECIAL_DAY_OFFSET {
        let Some(date) = day_at(start, offset) else {
            break;
        };
        catalog.regular.extend(instances_for(date, definitions));
    }

    let Some(special_date) = day_at(start, SPECIAL_DAY_OFFSET) else {
        return catalog;
    };
    let special_day = special_date.weekday();

    let central_time = match choice {
        CentralChoice::Manual(t) => Some(t),
        CentralChoice::Random => pick_central_time(special_day, definitions, rng),
    };

    match central_time {
        None => {
            warn!(day = %special_day, "no central_option masses defined; skipping central mass");
            catalog
                .diagnostics
                .push(Diagnostic::NoCentralOptions { day: special_day });
        }
        Some(time) => {
            let found = definitions
                .iter()
                .any(|d| d.day == special_day && d.time == time);
            if found {
                debug!(date = %special_date, %time, "central mass chosen");
                catalog.central = Some(SlotInstance {
                    date: special_date,
                    day: special_day,
                    time,
                    is_special: true,
                });
            } else {
                let diagnostic = Diagnostic::MissingCentralSlot {
                    day: special_day,
                    time,
                };
                warn!("{}", diagnostic);
                catalog.diagnostics.push(diagnostic);
            }
        }
    }

    let central = catalog.central.as_ref().map(|c| c.time);
    catalog.special_remainder = instances_for(special_date, definitions)
        .filter(|slot| Some(slot.time) != central)
        .collect();

    catalog
}

fn pick_central_time<R: Rng + ?Sized>(
    day: Weekday,
    definitions: &[SlotDefinition],
    rng: &mut R,
) -> Option<ServiceTime> {
    let options: Vec<ServiceTime> = definitions
        .iter()
        .filter(|d| d.day == day && d.category == SlotCategory::CentralOption)
        .map(|d| d.time)
        .collect();
    options.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn t(s: &str) -> ServiceTime {
        s.parse().unwrap()
    }

    fn defs() -> Vec<SlotDefinition> {
        let mut defs: Vec<SlotDefinition> = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ]
        .into_iter()
        .map(|d| SlotDefinition::new(d, t("19:00"), SlotCategory::Regular))
        .collect();
        defs.push(SlotDefinition::new(Weekday::Sun, t("08:00"), SlotCategory::Regular));
        defs.push(SlotDefinition::new(Weekday::Sun, t("10:00"), SlotCategory::CentralOption));
        defs.push(SlotDefinition::new(Weekday::Sun, t("12:00"), SlotCategory::CentralOption));
        defs.push(SlotDefinition::new(Weekday::Sun, t("18:00"), SlotCategory::CentralOption));
        defs.push(SlotDefinition::new(Weekday::Sun, t("19:30"), SlotCategory::Regular));
        defs
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 22).unwrap()
    }

    #[test]
    fn expands_six_weekdays_in_date_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let catalog = resolve_week(monday(), &defs(), CentralChoice::Manual(t("12:00")), &mut rng);

        assert_eq!(catalog.regular.len(), 6);
        let dates: Vec<NaiveDate> = catalog.regular.iter().map(|s| s.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(catalog.regular[0].key(), "Monday-19:00");
        assert_eq!(catalog.regular[5].key(), "Saturday-19:00");
        assert!(catalog.regular.iter().all(|s| !s.is_special));
    }

    #[test]
    fn manual_central_splits_special_day() {
        let mut rng = StdRng::seed_from_u64(1);
        let catalog = resolve_week(monday(), &defs(), CentralChoice::Manual(t("12:00")), &mut rng);

        let central = catalog.central.unwrap();
        assert_eq!(central.time, t("12:00"));
        assert_eq!(central.date, NaiveDate::from_ymd_opt(2025, 12, 28).unwrap());
        assert!(central.is_special);

        let rest: Vec<String> = catalog
            .special_remainder
            .iter()
            .map(|s| s.time.to_string())
            .collect();
        assert_eq!(rest, vec!["08:00", "10:00", "18:00", "19:30"]);
        assert!(catalog.diagnostics.is_empty());
    }

    #[test]
    fn random_central_is_always_a_central_option() {
        let options = [t("10:00"), t("12:00"), t("18:00")];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let catalog = resolve_week(monday(), &defs(), CentralChoice::Random, &mut rng);
            let central = catalog.central.unwrap();
            assert!(options.contains(&central.time));
            assert_eq!(catalog.special_remainder.len(), 4);
        }
    }

    #[test]
    fn unknown_manual_time_has_no_central_slot() {
        let mut rng = StdRng::seed_from_u64(1);
        let catalog = resolve_week(monday(), &defs(), CentralChoice::Manual(t("11:00")), &mut rng);
        assert!(catalog.central.is_none());
        assert_eq!(catalog.special_remainder.len(), 5);
        assert_eq!(
            catalog.diagnostics,
            vec![Diagnostic::MissingCentralSlot {
                day: Weekday::Sun,
                time: t("11:00")
            }]
        );
    }

    #[test]
    fn special_day_is_the_seventh_day_not_sunday() {
        // Starting on a Wednesday makes Tuesday the special day
        let start = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let catalog = resolve_week(start, &defs(), CentralChoice::Random, &mut rng);

        assert!(catalog.central.is_none());
        assert_eq!(
            catalog.diagnostics,
            vec![Diagnostic::NoCentralOptions { day: Weekday::Tue }]
        );
        assert_eq!(catalog.special_remainder.len(), 1);
        assert_eq!(catalog.special_remainder[0].key(), "Tuesday-19:00");
        // Wed..Sat and Monday, plus the five Sunday masses
        assert_eq!(catalog.regular.len(), 5 + 5);
    }

    #[test]
    fn empty_definitions_yield_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let catalog = resolve_week(monday(), &[], CentralChoice::Random, &mut rng);
        assert!(catalog.regular.is_empty());
        assert!(catalog.special_remainder.is_empty());
        assert!(catalog.central.is_none());
    }
}
