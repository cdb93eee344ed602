//! Moteur de contraintes : applique des évaluateurs enfichables à un ensemble de shifts.

pub mod coverage;
mod types;
mod window;

pub use coverage::{staffing_gaps, StaffingGap};
pub use types::{ConfigError, ConstraintConfig, ConstraintKind, Severity, Violation, WindowParams};
pub use window::MaxDaysInWindow;

use crate::calendar::Month;
use crate::model::Shift;
use std::collections::HashMap;

/// Évaluateur d'un type de contrainte.
pub trait RuleEvaluator {
    fn evaluate(
        &self,
        shifts: &[&Shift],
        constraint: &ConstraintConfig,
        target_month: Option<Month>,
    ) -> Vec<Violation>;
}

/// Registre `ConstraintKind -> évaluateur`. Ne lève jamais d'erreur.
pub struct ConstraintEngine {
    evaluators: HashMap<ConstraintKind, Box<dyn RuleEvaluator>>,
}

impl Default for ConstraintEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintEngine {
    pub fn new() -> Self {
        let mut engine = Self::empty();
        engine.register(ConstraintKind::MaxDaysInWindow, MaxDaysInWindow);
        engine
    }

    pub fn empty() -> Self {
        Self {
            evaluators: HashMap::new(),
        }
    }

    pub fn register<E: RuleEvaluator + 'static>(&mut self, kind: ConstraintKind, evaluator: E) {
        self.evaluators.insert(kind, Box::new(evaluator));
    }

    /// Agrège les violations de toutes les contraintes actives, sans dédoublonnage.
    /// Un type sans évaluateur enregistré est ignoré.
    pub fn validate(
        &self,
        shifts: &[Shift],
        constraints: &[ConstraintConfig],
        target_month: Option<Month>,
    ) -> Vec<Violation> {
        let mut out = Vec::new();
        for constraint in constraints.iter().filter(|c| c.is_active) {
            let Some(evaluator) = self.evaluators.get(&constraint.kind) else {
                tracing::debug!(constraint = %constraint.name, kind = ?constraint.kind, "no evaluator, ignored");
                continue;
            };
            let scoped: Vec<&Shift> = shifts
                .iter()
                .filter(|s| {
                    constraint
                        .department_id
                        .as_ref()
                        .map_or(true, |d| &s.department_id == d)
                })
                .collect();
            out.extend(evaluator.evaluate(&scoped, constraint, target_month));
        }
        out
    }
}
