//! Typed schemas for the three sheets. Parsing happens here, at the row boundary.

pub mod assignment;
pub mod participant;
pub mod slot;

pub use assignment::{AssignmentRecord, Attendance};
pub use participant::{NewParticipant, Participant, ParticipantPatch, Role};
pub use slot::{default_config_rows, MassConfig, SlotCategory, SlotDefinition};
