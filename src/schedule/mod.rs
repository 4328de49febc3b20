pub mod types;
pub mod slot_utils;
pub mod catalog;
pub mod distribute;
pub mod week;

pub use types::{Assignee, Assignment, Diagnostic, Distribution, Pass, SlotInstance, CENTRAL_MASS_HOLDER};
pub use slot_utils::{day_name, slot_key, ServiceTime};
pub use catalog::{resolve_week, CentralChoice, WeekCatalog};
pub use distribute::{distribute, DistributionRules};
pub use week::{plan_week, WeekPlan, WeekRequest};
