//! Weekly acolyte roster: expands recurring masses into a dated week, spreads
//! active acolytes across them, and tracks attendance afterwards.

pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod roster;
pub mod schedule;
pub mod store;
pub mod web;

pub use error::{Result, RosterError};
pub use roster::{GenerateOptions, GenerationReport, Roster};
