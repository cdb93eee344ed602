use crate::calendar::times_match;
use crate::model::{AutomationRule, DepartmentId, EmploymentType, RuleId, Shift};
use chrono::NaiveTime;

/// Une unité de besoin pour un jour donné.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub rule_id: RuleId,
    pub department_id: DepartmentId,
    pub count: u32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_smod: bool,
    pub required_type: Option<EmploymentType>,
    pub tolerance_minutes: u32,
}

impl Slot {
    pub fn from_rule(rule: &AutomationRule) -> Self {
        Self {
            rule_id: rule.id.clone(),
            department_id: rule.department_id.clone(),
            count: rule.required_count,
            start_time: rule.start_time,
            end_time: rule.end_time,
            is_smod: rule.is_smod,
            required_type: rule.required_type,
            tolerance_minutes: rule.tolerance_minutes,
        }
    }

    /// Un shift couvre ce créneau : même département, horaires dans la tolérance,
    /// type de contrat si exigé.
    pub fn accepts(&self, shift: &Shift, employment: Option<EmploymentType>) -> bool {
        shift.department_id == self.department_id
            && times_match(
                shift.start_time,
                shift.end_time,
                self.start_time,
                self.end_time,
                self.tolerance_minutes,
            )
            && self.required_type.map_or(true, |t| employment == Some(t))
    }
}

/// Créneaux du jour, SMOD en tête (ordre d'origine conservé sinon).
/// Avec `smod_exists`, les créneaux SMOD sont omis.
pub fn day_slots(rules: &[AutomationRule], day_of_week: u8, smod_exists: bool) -> Vec<Slot> {
    let mut slots: Vec<Slot> = rules
        .iter()
        .filter(|r| r.day_of_week == day_of_week)
        .filter(|r| !(r.is_smod && smod_exists))
        .map(Slot::from_rule)
        .collect();
    slots.sort_by_key(|s| !s.is_smod);
    slots
}
