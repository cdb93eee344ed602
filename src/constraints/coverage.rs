use crate::calendar::{day_of_week, Period};
use crate::model::{AutomationRule, DepartmentId, EmploymentType, RuleId, Shift, ShiftId, StaffId};
use crate::scheduler::day_slots;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Créneau en sous-effectif.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffingGap {
    pub date: NaiveDate,
    pub rule_id: RuleId,
    pub department_id: DepartmentId,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub required: u32,
    pub filled: u32,
}

impl StaffingGap {
    pub fn missing(&self) -> u32 {
        self.required.saturating_sub(self.filled)
    }
}

/// Compare la demande (règles d'automatisation) aux shifts réalisés, jour par jour.
///
/// Même appariement que le planificateur : un shift ne compte que pour un seul
/// créneau, et un créneau SMOD est couvert dès qu'un shift SMOD existe ce jour-là.
pub fn staffing_gaps(
    period: Period,
    rules: &[AutomationRule],
    shifts: &[Shift],
    employment: &HashMap<StaffId, EmploymentType>,
) -> Vec<StaffingGap> {
    let mut out = Vec::new();
    for day in period.days() {
        let todays: Vec<&Shift> = shifts.iter().filter(|s| s.date == day).collect();
        let smod_exists = todays.iter().any(|s| s.is_smod);
        let mut used: HashSet<&ShiftId> = HashSet::new();

        for slot in day_slots(rules, day_of_week(day), smod_exists) {
            let mut filled = 0;
            for &s in &todays {
                if filled >= slot.count {
                    break;
                }
                if used.contains(&s.id) || !slot.accepts(s, employment.get(&s.staff_id).copied()) {
                    continue;
                }
                used.insert(&s.id);
                filled += 1;
            }
            if filled < slot.count {
                out.push(StaffingGap {
                    date: day,
                    rule_id: slot.rule_id.clone(),
                    department_id: slot.department_id.clone(),
                    start_time: slot.start_time,
                    end_time: slot.end_time,
                    required: slot.count,
                    filled,
                });
            }
        }
    }
    out
}
