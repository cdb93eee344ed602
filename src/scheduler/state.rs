use crate::calendar::{iso_week_key, is_weekend, Period};
use crate::constraints::ConstraintConfig;
use crate::model::{AutomationRule, EmploymentType, Shift, StaffId};
use crate::storage::StaffSnapshot;
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeSet, HashMap, HashSet};

use super::DepartmentRoles;

/// Entrées d'un run, lues une seule fois au démarrage.
pub(super) struct RunInputs {
    pub period: Period,
    pub staff: Vec<StaffSnapshot>,
    /// Tous les shifts de la période, personnel non éligible compris.
    pub period_shifts: Vec<Shift>,
    pub employment: HashMap<StaffId, EmploymentType>,
    pub rules: Vec<AutomationRule>,
    pub roles: DepartmentRoles,
    pub constraints: Vec<ConstraintConfig>,
}

impl RunInputs {
    pub fn shifts_on(&self, day: NaiveDate) -> impl Iterator<Item = &Shift> {
        self.period_shifts.iter().filter(move |s| s.date == day)
    }

    pub fn smod_staffed(&self, day: NaiveDate) -> bool {
        self.shifts_on(day).any(|s| s.is_smod)
    }
}

/// Accumulateur mutable d'un run : shifts créés, blocages, week-ends travaillés.
#[derive(Debug, Default)]
pub(super) struct RunState {
    pub new_shifts: Vec<Shift>,
    blocked: HashMap<StaffId, HashSet<NaiveDate>>,
    weekend_days: HashMap<StaffId, BTreeSet<NaiveDate>>,
    pub weekend_blocks: usize,
}

impl RunState {
    /// Pré-remplit le suivi des week-ends avec les shifts existants.
    pub fn seeded(staff: &[StaffSnapshot]) -> Self {
        let mut state = Self::default();
        for snapshot in staff {
            for s in snapshot.shifts.iter().filter(|s| is_weekend(s.date)) {
                state.track_weekend(&s.staff_id, s.date);
            }
        }
        state
    }

    fn track_weekend(&mut self, staff: &StaffId, date: NaiveDate) {
        self.weekend_days.entry(staff.clone()).or_default().insert(date);
    }

    pub fn record(&mut self, shift: Shift) {
        if is_weekend(shift.date) {
            self.track_weekend(&shift.staff_id, shift.date);
        }
        self.new_shifts.push(shift);
    }

    pub fn block(&mut self, staff: &StaffId, date: NaiveDate) {
        self.blocked.entry(staff.clone()).or_default().insert(date);
    }

    pub fn is_blocked(&self, staff: &StaffId, date: NaiveDate) -> bool {
        self.blocked.get(staff).is_some_and(|d| d.contains(&date))
    }

    pub fn created_on(&self, staff: &StaffId, date: NaiveDate) -> bool {
        self.new_shifts
            .iter()
            .any(|s| &s.staff_id == staff && s.date == date)
    }

    pub fn created_for<'a>(&'a self, staff: &'a StaffId) -> impl Iterator<Item = &'a Shift> + 'a {
        self.new_shifts.iter().filter(move |s| &s.staff_id == staff)
    }

    /// Shift existant ou créé pendant ce run.
    pub fn has_worked(&self, snapshot: &StaffSnapshot, date: NaiveDate) -> bool {
        snapshot.shifts.iter().any(|s| s.date == date) || self.created_on(&snapshot.staff.id, date)
    }

    /// Week-ends distincts (semaines ISO) travaillés dans la période.
    pub fn weekends_worked(&self, staff: &StaffId, period: Period) -> usize {
        self.weekend_days.get(staff).map_or(0, |days| {
            days.iter()
                .filter(|d| period.contains(**d))
                .map(|d| iso_week_key(*d))
                .collect::<HashSet<_>>()
                .len()
        })
    }

    /// A travaillé le week-end de la semaine calendaire précédant `day`.
    pub fn worked_previous_weekend(&self, staff: &StaffId, day: NaiveDate) -> bool {
        let previous = iso_week_key(day - Duration::days(7));
        self.weekend_days
            .get(staff)
            .is_some_and(|days| days.iter().any(|d| iso_week_key(*d) == previous))
    }
}
