#![forbid(unsafe_code)]
//! Rostra — planification automatique du personnel par département.
//!
//! - Planificateur automatique (week-ends d'abord, équité, blocages vendredi/lundi).
//! - Expansion des shifts personnels récurrents.
//! - Moteur de contraintes (fenêtres glissantes) et contrôle de couverture.
//! - Dates sans fuseau ; heures `HH:MM` ; stockage fichier JSON.

pub mod calendar;
pub mod constraints;
pub mod expander;
pub mod io;
pub mod model;
pub mod scheduler;
pub mod storage;

pub use calendar::{month_roster_range, multiplier, HolidayCalendar, Month, Period};
pub use constraints::{
    staffing_gaps, ConstraintConfig, ConstraintEngine, ConstraintKind, RuleEvaluator, Severity,
    StaffingGap, Violation,
};
pub use expander::BaseRuleExpander;
pub use model::{
    AutomationRule, BaseRule, Dataset, Department, DepartmentId, EmploymentType, Leave,
    LeaveStatus, LeaveType, Shift, ShiftId, Staff, StaffCategory, StaffId,
};
pub use scheduler::{AutoScheduler, ScheduleOptions, ScheduleReport, SchedError};
pub use storage::{JsonStorage, Repository, Storage};
