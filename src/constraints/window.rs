use super::{ConstraintConfig, RuleEvaluator, Violation, WindowParams};
use crate::calendar::Month;
use crate::model::{Shift, StaffId};
use chrono::{Days, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Nombre maximum de jours travaillés sur une fenêtre glissante de N jours.
///
/// Les fenêtres sont ancrées sur les jours travaillés uniquement : pour chaque
/// date `d` travaillée, on compte les dates distinctes travaillées dans
/// `[d - (window - 1), d]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxDaysInWindow;

impl RuleEvaluator for MaxDaysInWindow {
    fn evaluate(
        &self,
        shifts: &[&Shift],
        constraint: &ConstraintConfig,
        target_month: Option<Month>,
    ) -> Vec<Violation> {
        let params = match constraint.window_params() {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(constraint = %constraint.name, %err, "skipping constraint");
                return Vec::new();
            }
        };

        let mut by_staff: BTreeMap<&StaffId, Vec<&Shift>> = BTreeMap::new();
        for s in shifts {
            by_staff.entry(&s.staff_id).or_default().push(s);
        }

        let mut out = Vec::new();
        for (staff, own) in by_staff {
            let worked: BTreeSet<NaiveDate> = own.iter().map(|s| s.date).collect();
            for &day in &worked {
                if target_month.is_some_and(|m| !m.contains(day)) {
                    continue;
                }
                let count = days_in_window(&worked, day, params);
                if count <= params.limit as usize {
                    continue;
                }
                let message = render_message(constraint, params, count);
                out.extend(own.iter().filter(|s| s.date == day).map(|s| Violation {
                    shift_id: Some(s.id.clone()),
                    staff_id: staff.clone(),
                    date: day,
                    message: message.clone(),
                    severity: constraint.severity,
                    constraint_name: constraint.name.clone(),
                }));
            }
        }
        out
    }
}

fn days_in_window(worked: &BTreeSet<NaiveDate>, day: NaiveDate, params: WindowParams) -> usize {
    let from = day
        .checked_sub_days(Days::new(u64::from(params.window) - 1))
        .unwrap_or(NaiveDate::MIN);
    worked.range(from..=day).count()
}

fn render_message(constraint: &ConstraintConfig, params: WindowParams, count: usize) -> String {
    match &constraint.message {
        Some(m) => m.clone(),
        None => format!(
            "{}: {count} days worked in a {}-day window (limit {})",
            constraint.name, params.window, params.limit
        ),
    }
}
