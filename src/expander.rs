//! Matérialise les shifts personnels récurrents (règles de base) sur un mois.

use crate::calendar::{day_of_week, Month, Period};
use crate::constraints::{ConstraintConfig, ConstraintEngine};
use crate::model::{BaseRule, EmploymentType, Shift, ShiftId, Staff, StaffId};
use crate::scheduler::SchedError;
use crate::storage::Repository;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::{HashMap, HashSet};

/// Générateur simple : une règle de base = un shift par jour de semaine correspondant.
pub struct BaseRuleExpander {
    engine: ConstraintEngine,
    lookback_days: i64,
}

impl Default for BaseRuleExpander {
    fn default() -> Self {
        Self {
            engine: ConstraintEngine::new(),
            lookback_days: 14,
        }
    }
}

impl BaseRuleExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retourne le nombre de shifts créés.
    pub fn expand<R: Repository + ?Sized>(
        &self,
        repo: &mut R,
        month: Month,
    ) -> Result<usize, SchedError> {
        let period = month.period();
        let staff: HashMap<StaffId, Staff> = repo
            .all_staff()?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let rules = repo.base_rules()?;
        let mut constraints = repo.constraints()?;
        if constraints.is_empty() {
            constraints.push(ConstraintConfig::default_window());
        }
        let lookback = Period {
            start: period.start - Duration::days(self.lookback_days),
            end: period.end,
        };
        let mut running = repo.shifts_in_range(lookback)?;
        let full_weekend = full_weekend_staff(&rules);
        let mut created = Vec::new();

        for day in period.days() {
            let dow = day_of_week(day);
            for rule in rules.iter().filter(|r| r.day_of_week == dow) {
                if running
                    .iter()
                    .any(|s| s.staff_id == rule.staff_id && s.date == day)
                {
                    continue;
                }
                let Some(member) = staff.get(&rule.staff_id) else {
                    tracing::warn!(rule = %rule.id, staff = %rule.staff_id, "base rule for unknown staff");
                    continue;
                };
                if member.employment_type == EmploymentType::FullTime
                    && is_weekend_neighbour(day)
                    && full_weekend.contains(&rule.staff_id)
                {
                    continue;
                }

                let Some(shift) = self.admit(&running, rule, day, &constraints) else {
                    tracing::debug!(%day, staff = %rule.staff_id, "base shift rejected by constraints");
                    continue;
                };
                running.push(shift.clone());
                created.push(shift);
            }
        }

        let count = created.len();
        if count > 0 {
            repo.insert_shifts(created).map_err(SchedError::Persist)?;
        }
        tracing::info!(%month, created = count, "base rules expanded");
        Ok(count)
    }

    /// Passe le candidat au moteur de contraintes, limité aux shifts de la personne.
    fn admit(
        &self,
        running: &[Shift],
        rule: &BaseRule,
        day: NaiveDate,
        constraints: &[ConstraintConfig],
    ) -> Option<Shift> {
        let mut candidate = Shift::new(
            rule.staff_id.clone(),
            rule.template.department_id.clone(),
            day,
            rule.template.start_time,
            rule.template.end_time,
        );
        let sentinel = ShiftId::random();
        candidate.id = sentinel.clone();

        let mut scoped: Vec<Shift> = running
            .iter()
            .filter(|s| s.staff_id == rule.staff_id)
            .cloned()
            .collect();
        scoped.push(candidate.clone());

        let rejected = self
            .engine
            .validate(&scoped, constraints, None)
            .iter()
            .any(|v| v.shift_id.as_ref() == Some(&sentinel));
        if rejected {
            return None;
        }
        Some(candidate)
    }
}

fn is_weekend_neighbour(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Fri | Weekday::Mon)
}

fn staff_on(rules: &[BaseRule], dow: u8) -> HashSet<&StaffId> {
    rules
        .iter()
        .filter(|r| r.day_of_week == dow)
        .map(|r| &r.staff_id)
        .collect()
}

/// Personnes ayant une règle de base le samedi et le dimanche.
fn full_weekend_staff(rules: &[BaseRule]) -> HashSet<StaffId> {
    let saturday = staff_on(rules, 6);
    staff_on(rules, 0)
        .into_iter()
        .filter(|id| saturday.contains(id))
        .cloned()
        .collect()
}
