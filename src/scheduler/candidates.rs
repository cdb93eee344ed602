use super::state::{RunInputs, RunState};
use super::{DepartmentRoles, Slot};
use crate::calendar::is_weekend;
use crate::constraints::ConstraintEngine;
use crate::model::{DepartmentId, Shift, ShiftId, Staff, StaffCategory, StaffId};
use crate::storage::StaffSnapshot;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Ni congé approuvé, ni shift existant, ni shift créé ce jour-là.
pub(super) fn is_available(snapshot: &StaffSnapshot, state: &RunState, day: NaiveDate) -> bool {
    !snapshot.leaves.iter().any(|l| l.blocks(day))
        && !snapshot.shifts.iter().any(|s| s.date == day)
        && !state.created_on(&snapshot.staff.id, day)
}

pub(super) fn pool<'a>(
    inputs: &'a RunInputs,
    state: &RunState,
    assigned_today: &HashSet<StaffId>,
    slot: &Slot,
    day: NaiveDate,
) -> Vec<&'a StaffSnapshot> {
    inputs
        .staff
        .iter()
        .filter(|c| !assigned_today.contains(&c.staff.id))
        .filter(|c| !state.is_blocked(&c.staff.id, day))
        .filter(|c| slot.required_type.map_or(true, |t| c.staff.employment_type == t))
        .filter(|c| is_available(c, state, day))
        .filter(|c| c.staff.has_skill(&slot.department_id))
        .collect()
}

/// Vrai si l'affectation ne déclenche aucune violation sur le shift candidat.
pub(super) fn passes_constraints(
    engine: &ConstraintEngine,
    inputs: &RunInputs,
    state: &RunState,
    snapshot: &StaffSnapshot,
    slot: &Slot,
    day: NaiveDate,
) -> bool {
    let sentinel = ShiftId::random();
    let mut trial: Vec<Shift> = snapshot
        .shifts
        .iter()
        .chain(state.created_for(&snapshot.staff.id))
        .cloned()
        .collect();
    let mut candidate = Shift::new(
        snapshot.staff.id.clone(),
        slot.department_id.clone(),
        day,
        slot.start_time,
        slot.end_time,
    );
    candidate.id = sentinel.clone();
    trial.push(candidate);
    !engine
        .validate(&trial, &inputs.constraints, None)
        .iter()
        .any(|v| v.shift_id.as_ref() == Some(&sentinel))
}

fn smod_capable(staff: &Staff, roles: &DepartmentRoles) -> bool {
    staff.category == StaffCategory::ShiftManager || staff.has_skill(&roles.smod)
}

/// Score de priorité par département : plus haut = préféré.
pub(super) fn department_score(
    staff: &Staff,
    department: &DepartmentId,
    roles: &DepartmentRoles,
) -> i32 {
    if department == &roles.smod {
        return if smod_capable(staff, roles) { 100 } else { 0 };
    }
    if !roles.is_specialist(department) {
        return 0;
    }
    if !staff.has_skill(department) {
        -1
    } else if smod_capable(staff, roles) {
        10
    } else if staff.skills.len() == 1 {
        50
    } else {
        30
    }
}

/// Tri stable des candidats (à appeler après le mélange aléatoire) :
/// continuité du dimanche, score de département, équité des week-ends.
pub(super) fn rank(
    candidates: &mut [&StaffSnapshot],
    slot: &Slot,
    day: NaiveDate,
    inputs: &RunInputs,
    state: &RunState,
) {
    let sunday = day.weekday() == Weekday::Sun;
    let weekend = is_weekend(day);
    let saturday = day - Duration::days(1);

    candidates.sort_by_cached_key(|c| {
        let id = &c.staff.id;
        let kept_pairing = sunday && state.has_worked(c, saturday);
        let score = department_score(&c.staff, &slot.department_id, &inputs.roles);
        let (over, worked, back_to_back) = if weekend {
            let n = state.weekends_worked(id, inputs.period);
            (n >= 2, n, state.worked_previous_weekend(id, day))
        } else {
            (false, 0, false)
        };
        (!kept_pairing, Reverse(score), over, worked, back_to_back)
    });
}
