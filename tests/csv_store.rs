//! The CSV directory backend, exercised through the roster.

use std::fs;
use std::sync::Arc;

use acolyte_roster::config::GenerationConfig;
use acolyte_roster::model::{Attendance, NewParticipant, Role};
use acolyte_roster::schedule::CentralChoice;
use acolyte_roster::store::{row, CsvStore, RowStore, Sheet};
use acolyte_roster::{GenerateOptions, Roster, RosterError};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

#[test]
fn missing_directory_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    let err = CsvStore::open(dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, RosterError::ConfigurationMissing(_)));
}

#[test]
fn absent_sheet_reads_as_empty() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path()).unwrap();
    assert!(store.list_rows(Sheet::Users).unwrap().is_empty());
}

#[test]
fn append_writes_header_once() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path()).unwrap();

    store
        .append_rows(Sheet::Users, &[row([("id", "1"), ("name", "Ana"), ("role", "acolyte")])])
        .unwrap();
    store
        .append_rows(Sheet::Users, &[row([("id", "2"), ("name", "Luis, Jr."), ("role", "master")])])
        .unwrap();

    let text = fs::read_to_string(store.sheet_path(Sheet::Users)).unwrap();
    assert_eq!(text.matches("id,name,role,active,limitations").count(), 1);

    let rows = store.list_rows(Sheet::Users).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["name"], "Luis, Jr.");
    assert_eq!(rows[1]["active"], "");
}

#[test]
fn clear_keeps_the_header() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path()).unwrap();
    store
        .append_rows(Sheet::Schedule, &[row([("id", "a"), ("date", "2025-12-22")])])
        .unwrap();

    store.clear(Sheet::Schedule).unwrap();
    store.clear(Sheet::Schedule).unwrap();

    assert!(store.list_rows(Sheet::Schedule).unwrap().is_empty());
    let text = fs::read_to_string(store.sheet_path(Sheet::Schedule)).unwrap();
    assert!(text.starts_with("id,date,time,is_central_mass,assigned_acolyte_id,attendance_status"));
}

#[test]
fn replace_leaves_no_staging_files_behind() {
    let dir = tempdir().unwrap();
    let store = CsvStore::open(dir.path()).unwrap();
    store
        .replace_rows(Sheet::Config, &[row([("day", "Monday"), ("time", "19:00")])])
        .unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Config.csv".to_string()]);
}

#[test]
fn initialized_directory_supports_a_full_cycle() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let store = CsvStore::create(&data).unwrap();
    let roster = Roster::new(Arc::new(store.clone()), GenerationConfig::default());
    roster.initialize().unwrap();
    // Second run must not reseed
    roster.initialize().unwrap();

    let config = roster.mass_config().unwrap();
    assert_eq!(config.definitions.len(), 11);
    assert_eq!(config.acolytes_per_mass, Some(2));

    for name in ["Ana", "Luis", "Marta"] {
        roster
            .add_participant(NewParticipant {
                name: name.to_string(),
                role: Role::Acolyte,
                is_active: true,
                limitations: vec!["Monday-19:00".to_string()],
            })
            .unwrap();
    }
    let people = roster.participants().unwrap();
    assert_eq!(people.len(), 3);
    assert!(people.iter().all(|p| p.limitations == vec!["Monday-19:00"]));

    let options = GenerateOptions {
        start: NaiveDate::from_ymd_opt(2025, 12, 22),
        per_mass: None,
        central: CentralChoice::Manual("10:00".parse().unwrap()),
    };
    let report = roster.generate(&options, &mut StdRng::seed_from_u64(3)).unwrap();
    // 3 weekday + 1 central + 3 Sunday
    assert_eq!(report.count, 7);

    // Reopen from disk to prove it persisted
    let reopened = Roster::new(
        Arc::new(CsvStore::open(&data).unwrap()),
        GenerationConfig::default(),
    );
    let records = reopened.assignments().unwrap();
    assert_eq!(records.len(), 7);
    // Everyone is excluded from Monday
    assert!(records
        .iter()
        .all(|r| r.date != NaiveDate::from_ymd_opt(2025, 12, 22).unwrap()));

    let id = records[0].id.clone();
    reopened.set_attendance(&id, Attendance::Absent).unwrap();
    let again = roster.assignments().unwrap();
    assert_eq!(again.iter().find(|r| r.id == id).unwrap().attendance, Attendance::Absent);
}

#[test]
fn malformed_rows_are_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("Users.csv"),
        "id,name,role,active,limitations\n\
         1,Ana,acolyte,TRUE,\n\
         ,Nameless,acolyte,TRUE,\n\
         3,Odd,bishop,TRUE,\n\
         4,Luis,acolyte,true,\"Monday-19:00,Sunday-08:00\"\n",
    )
    .unwrap();
    let roster = Roster::new(
        Arc::new(CsvStore::open(dir.path()).unwrap()),
        GenerationConfig::default(),
    );

    let people = roster.participants().unwrap();
    let ids: Vec<&str> = people.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);
    assert_eq!(people[1].limitations.len(), 2);
}
