mod candidates;
mod slots;
mod state;
mod types;

pub use slots::{day_slots, Slot};
pub use types::{
    DepartmentRoles, ScheduleOptions, ScheduleReport, SchedError, CAFE, FRONT_DESK, GEAR_SHOP,
    SMOD,
};

use crate::calendar::{day_of_week, is_weekend, Month, Period};
use crate::constraints::{ConstraintConfig, ConstraintEngine};
use crate::model::{EmploymentType, Shift, ShiftId, StaffId};
use crate::storage::Repository;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use state::{RunInputs, RunState};
use std::collections::HashSet;

/// Planificateur automatique : affecte le personnel éligible aux créneaux
/// définis par les règles d'automatisation, week-ends d'abord.
#[derive(Default)]
pub struct AutoScheduler {
    options: ScheduleOptions,
    engine: ConstraintEngine,
}

impl AutoScheduler {
    pub fn new(options: ScheduleOptions) -> Self {
        Self {
            options,
            engine: ConstraintEngine::new(),
        }
    }

    /// Génère et insère les shifts du mois.
    pub fn generate<R: Repository + ?Sized>(
        &self,
        repo: &mut R,
        month: Month,
    ) -> Result<ScheduleReport, SchedError> {
        self.generate_period(repo, month.period())
    }

    pub fn generate_period<R: Repository + ?Sized>(
        &self,
        repo: &mut R,
        period: Period,
    ) -> Result<ScheduleReport, SchedError> {
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.generate_with_rng(repo, period, &mut rng)
    }

    /// Variante à source aléatoire injectée.
    pub fn generate_with_rng<R: Repository + ?Sized, G: Rng + ?Sized>(
        &self,
        repo: &mut R,
        period: Period,
        rng: &mut G,
    ) -> Result<ScheduleReport, SchedError> {
        tracing::info!(start = %period.start, end = %period.end, "auto-scheduling");
        let inputs = self.load_inputs(&*repo, period)?;
        let mut state = RunState::seeded(&inputs.staff);
        let mut days_processed = 0;

        // Phase 1 : week-ends, dont un dimanche isolé en tête de période
        if period.start.weekday() == Weekday::Sun {
            let sunday = period.start;
            days_processed += self.process_day(&inputs, &mut state, sunday, rng);
            if let Some(saturday) = sunday.pred_opt() {
                block_full_weekend_workers(&inputs, &mut state, saturday, sunday);
            }
        }
        for saturday in period.days().filter(|d| d.weekday() == Weekday::Sat) {
            days_processed += self.process_day(&inputs, &mut state, saturday, rng);
            let sunday = saturday + Duration::days(1);
            if period.contains(sunday) {
                days_processed += self.process_day(&inputs, &mut state, sunday, rng);
            }
            block_full_weekend_workers(&inputs, &mut state, saturday, sunday);
        }

        // Phase 2 : jours de semaine
        for day in period.days().filter(|d| !is_weekend(*d)) {
            days_processed += self.process_day(&inputs, &mut state, day, rng);
        }

        let created = state.new_shifts;
        if !created.is_empty() {
            repo.insert_shifts(created.clone()).map_err(SchedError::Persist)?;
        }
        tracing::info!(created = created.len(), days_processed, "auto-scheduling done");

        Ok(ScheduleReport {
            created,
            days_processed,
            weekend_blocks: state.weekend_blocks,
        })
    }

    fn load_inputs<R: Repository + ?Sized>(
        &self,
        repo: &R,
        period: Period,
    ) -> Result<RunInputs, SchedError> {
        let roles = DepartmentRoles::resolve(&repo.departments()?)?;
        let staff = repo.eligible_staff(period.buffered(self.options.buffer_days))?;
        let period_shifts = repo.shifts_in_range(period)?;
        let employment = repo
            .all_staff()?
            .into_iter()
            .map(|s| (s.id, s.employment_type))
            .collect();
        let rules = repo.automation_rules()?;
        let mut constraints = Vec::new();
        if self.options.enforce_constraints {
            constraints = repo.constraints()?;
            if constraints.is_empty() {
                constraints.push(ConstraintConfig::default_window());
            }
        }
        tracing::debug!(
            eligible = staff.len(),
            existing = period_shifts.len(),
            rules = rules.len(),
            "inputs loaded"
        );
        Ok(RunInputs {
            period,
            staff,
            period_shifts,
            employment,
            rules,
            roles,
            constraints,
        })
    }

    /// Traite un jour ; retourne 1 si des règles s'appliquaient, 0 sinon.
    fn process_day<G: Rng + ?Sized>(
        &self,
        inputs: &RunInputs,
        state: &mut RunState,
        day: NaiveDate,
        rng: &mut G,
    ) -> usize {
        let dow = day_of_week(day);
        if !inputs.rules.iter().any(|r| r.day_of_week == dow) {
            return 0;
        }

        let slots = day_slots(&inputs.rules, dow, inputs.smod_staffed(day));
        let mut used: HashSet<ShiftId> = HashSet::new();
        let mut assigned_today: HashSet<StaffId> = HashSet::new();

        for slot in &slots {
            let employment = |s: &Shift| inputs.employment.get(&s.staff_id).copied();
            let mut matched = 0;
            for s in inputs.shifts_on(day).chain(state.new_shifts.iter().filter(|s| s.date == day)) {
                if matched >= slot.count {
                    break;
                }
                if used.contains(&s.id) || !slot.accepts(s, employment(s)) {
                    continue;
                }
                used.insert(s.id.clone());
                matched += 1;
            }

            let remaining = slot.count - matched;
            tracing::debug!(%day, department = %slot.department_id, matched, remaining, "slot");
            for _ in 0..remaining {
                let Some(shift) = self.pick(inputs, state, &assigned_today, slot, day, rng) else {
                    break;
                };
                used.insert(shift.id.clone());
                assigned_today.insert(shift.staff_id.clone());
                state.record(shift);
            }
        }
        1
    }

    fn pick<G: Rng + ?Sized>(
        &self,
        inputs: &RunInputs,
        state: &RunState,
        assigned_today: &HashSet<StaffId>,
        slot: &Slot,
        day: NaiveDate,
        rng: &mut G,
    ) -> Option<Shift> {
        let mut pool = candidates::pool(inputs, state, assigned_today, slot, day);
        if self.options.enforce_constraints {
            pool.retain(|c| {
                candidates::passes_constraints(&self.engine, inputs, state, c, slot, day)
            });
        }
        pool.shuffle(rng);
        candidates::rank(&mut pool, slot, day, inputs, state);

        let chosen = pool.first()?;
        let shift = Shift::new(
            chosen.staff.id.clone(),
            slot.department_id.clone(),
            day,
            slot.start_time,
            slot.end_time,
        )
        .smod(slot.is_smod);
        Some(shift)
    }
}

/// Temps plein ayant travaillé samedi et dimanche : vendredi et lundi bloqués.
fn block_full_weekend_workers(
    inputs: &RunInputs,
    state: &mut RunState,
    saturday: NaiveDate,
    sunday: NaiveDate,
) {
    let full_weekend: Vec<StaffId> = inputs
        .staff
        .iter()
        .filter(|c| c.staff.employment_type == EmploymentType::FullTime)
        .filter(|c| state.has_worked(c, saturday) && state.has_worked(c, sunday))
        .map(|c| c.staff.id.clone())
        .collect();
    for id in full_weekend {
        state.block(&id, saturday - Duration::days(1));
        state.block(&id, sunday + Duration::days(1));
        state.weekend_blocks += 1;
    }
}
