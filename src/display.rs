use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::model::{AssignmentRecord, Attendance, Participant};
use crate::schedule::{day_name, Assignee, Diagnostic};

/// Formats who serves a mass: the participant's name, or a marker for the central mass
pub fn format_assignee(assignee: &Assignee, names: &HashMap<&str, &str>) -> String {
    match assignee {
        Assignee::CentralPlaceholder => "[CENTRAL MASS]".to_string(),
        Assignee::Participant(id) => match names.get(id.as_str()) {
            Some(name) => name.to_string(),
            None => format!("(unknown {})", id),
        },
    }
}

fn attendance_mark(attendance: Attendance) -> &'static str {
    match attendance {
        Attendance::Pending => "",
        Attendance::Present => " [present]",
        Attendance::Absent => " [absent]",
    }
}

/// Renders records grouped by date, one line per assignment: `HH:MM name`.
/// Records are expected in (date, time) order.
pub fn render_schedule(records: &[AssignmentRecord], participants: &[Participant]) -> String {
    let names: HashMap<&str, &str> = participants
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();

    let mut out = String::new();
    let mut current_date = None;
    for record in records {
        if current_date != Some(record.date) {
            current_date = Some(record.date);
            let _ = writeln!(out, "** {} {} **", day_name(record.slot().day), record.date);
        }
        let _ = writeln!(
            out,
            "{} {}{}",
            record.time,
            format_assignee(&record.assignee, &names),
            attendance_mark(record.attendance)
        );
    }
    if records.is_empty() {
        out.push_str("No assignments stored.\n");
    }
    out
}

/// Writes the rendered schedule to a file
pub fn write_schedule_to_file(
    records: &[AssignmentRecord],
    participants: &[Participant],
    path: &Path,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(render_schedule(records, participants).as_bytes())
}

/// Prints the run's warnings, if any
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!("⚠️  Warnings ({}):", diagnostics.len());
    for diagnostic in diagnostics {
        println!("  - {}", diagnostic);
    }
}
