#![forbid(unsafe_code)]
mod common;

use common::{d, every_day, hm, member, rule, shift, venue};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rostra::calendar::Period;
use rostra::model::{
    AutomationRule, Dataset, Department, EmploymentType, Leave, LeaveStatus, LeaveType, Shift,
    Staff, StaffCategory,
};
use rostra::storage::{Repository, StaffSnapshot};
use rostra::{
    AutoScheduler, ConstraintConfig, Month, ScheduleOptions, SchedError, Severity, StaffId,
};
use std::collections::{HashMap, HashSet};

fn first_week() -> Period {
    Period::new(d(1), d(7)).unwrap()
}

fn run(data: &mut Dataset, period: Period, seed: u64) -> Vec<Shift> {
    let mut rng = StdRng::seed_from_u64(seed);
    AutoScheduler::default()
        .generate_with_rng(data, period, &mut rng)
        .unwrap()
        .created
}

#[test]
fn one_front_desk_shift_per_day_over_a_week() {
    for seed in 0..20 {
        let mut v = venue();
        let a = member("a", EmploymentType::FullTime, StaffCategory::FrontDesk, &[&v.desk]);
        let b = member("b", EmploymentType::FullTime, StaffCategory::FrontDesk, &[&v.desk]);
        v.data.staff = vec![a.clone(), b.clone()];
        v.data.automation_rules = every_day(&v.desk, 1);

        let created = run(&mut v.data, first_week(), seed);
        assert_eq!(created.len(), 7);
        let dates: HashSet<_> = created.iter().map(|s| s.date).collect();
        assert_eq!(dates.len(), 7);
        assert!(created
            .iter()
            .all(|s| s.staff_id == a.id || s.staff_id == b.id));
        assert!(created.iter().all(|s| s.start_time == hm(9, 0) && s.end_time == hm(17, 0)));
        assert_eq!(v.data.shifts.len(), 7);
    }
}

#[test]
fn full_weekend_blocks_friday_and_monday() {
    for seed in 0..20 {
        let mut v = venue();
        let a = member("a", EmploymentType::FullTime, StaffCategory::FrontDesk, &[&v.desk]);
        let b = member("b", EmploymentType::FullTime, StaffCategory::FrontDesk, &[&v.desk]);
        v.data.staff = vec![a, b];
        v.data.automation_rules = every_day(&v.desk, 1);

        let created = run(&mut v.data, Period::new(d(1), d(14)).unwrap(), seed);
        let by_day: HashMap<_, _> = created.iter().map(|s| (s.date, s.staff_id.clone())).collect();

        // dimanche : continuité avec le samedi
        assert_eq!(by_day[&d(6)], by_day[&d(7)]);
        assert_eq!(by_day[&d(13)], by_day[&d(14)]);
        assert_ne!(by_day[&d(5)], by_day[&d(6)]);
        assert_ne!(by_day[&d(8)], by_day[&d(7)]);
        assert_ne!(by_day[&d(12)], by_day[&d(13)]);
    }
}

#[test]
fn part_timers_are_not_blocked_after_a_full_weekend() {
    let mut v = venue();
    let a = member("a", EmploymentType::PartTime, StaffCategory::FrontDesk, &[&v.desk]);
    v.data.staff = vec![a.clone()];
    v.data.automation_rules = every_day(&v.desk, 1);

    let report = AutoScheduler::default()
        .generate_with_rng(&mut v.data, first_week(), &mut StdRng::seed_from_u64(1))
        .unwrap();
    assert_eq!(report.created.len(), 7);
    assert_eq!(report.weekend_blocks, 0);
}

#[test]
fn lone_full_timer_leaves_friday_open() {
    let mut v = venue();
    let a = member("a", EmploymentType::FullTime, StaffCategory::FrontDesk, &[&v.desk]);
    v.data.staff = vec![a];
    v.data.automation_rules = every_day(&v.desk, 1);

    let report = AutoScheduler::default()
        .generate_with_rng(&mut v.data, first_week(), &mut StdRng::seed_from_u64(1))
        .unwrap();
    assert_eq!(report.weekend_blocks, 1);
    assert_eq!(report.created.len(), 6);
    assert!(!report.created.iter().any(|s| s.date == d(5)));
}

#[test]
fn empty_demand_is_a_no_op() {
    let mut v = venue();
    v.data.staff = vec![member(
        "a",
        EmploymentType::FullTime,
        StaffCategory::Cafe,
        &[&v.cafe],
    )];
    let month: Month = "2025-12".parse().unwrap();
    let report = AutoScheduler::default().generate(&mut v.data, month).unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.days_processed, 0);
    assert!(v.data.shifts.is_empty());
}

#[test]
fn missing_department_aborts_the_run() {
    let mut v = venue();
    v.data.departments.retain(|dep| dep.name != "Cafe");
    v.data.automation_rules = every_day(&v.desk, 1);
    let err = AutoScheduler::default()
        .generate(&mut v.data, "2025-12".parse().unwrap())
        .unwrap_err();
    assert!(matches!(err, SchedError::MissingDepartment(ref name) if name == "Cafe"));
}

#[test]
fn approved_leave_blocks_but_pending_does_not() {
    let mut v = venue();
    let a = member("a", EmploymentType::PartTime, StaffCategory::FrontDesk, &[&v.desk]);
    let b = member("b", EmploymentType::PartTime, StaffCategory::FrontDesk, &[&v.desk]);
    let leave = |staff: &Staff, status| Leave {
        staff_id: staff.id.clone(),
        start_date: d(1),
        end_date: d(7),
        status,
        leave_type: LeaveType::Paid,
    };
    v.data.leaves = vec![
        leave(&a, LeaveStatus::Approved),
        leave(&b, LeaveStatus::Pending),
    ];
    v.data.staff = vec![a.clone(), b.clone()];
    v.data.automation_rules = every_day(&v.desk, 1);

    let created = run(&mut v.data, first_week(), 3);
    assert_eq!(created.len(), 7);
    assert!(created.iter().all(|s| s.staff_id == b.id));
}

#[test]
fn existing_shifts_within_tolerance_satisfy_demand() {
    let mut v = venue();
    let a = member("a", EmploymentType::PartTime, StaffCategory::FrontDesk, &[&v.desk]);
    let mut outsider = member("x", EmploymentType::PartTime, StaffCategory::Shop, &[]);
    outsider.auto_schedule = false;
    let mut manual = shift(&outsider, &v.desk, d(2));
    manual.start_time = hm(9, 10);
    manual.end_time = hm(16, 55);
    let mut off_time = shift(&outsider, &v.desk, d(3));
    off_time.start_time = hm(12, 0);
    v.data.shifts = vec![manual, off_time];
    v.data.staff = vec![a.clone(), outsider];
    v.data.automation_rules = vec![rule(2, &v.desk, 1), rule(3, &v.desk, 1)];

    let created = run(&mut v.data, first_week(), 0);
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].date, d(3));
    assert_eq!(created[0].staff_id, a.id);
}

#[test]
fn smod_slot_skipped_when_someone_already_covers_it() {
    let mut v = venue();
    let boss = member("boss", EmploymentType::FullTime, StaffCategory::ShiftManager, &[&v.smod]);
    let mut manual = shift(&boss, &v.smod, d(2));
    manual.is_smod = true;
    manual.start_time = hm(6, 0);
    v.data.shifts = vec![manual];
    v.data.staff = vec![boss];
    let smod_rule = AutomationRule {
        is_smod: true,
        ..rule(2, &v.smod, 1)
    };
    let other_day = AutomationRule {
        is_smod: true,
        ..rule(3, &v.smod, 1)
    };
    v.data.automation_rules = vec![smod_rule, other_day];

    let created = run(&mut v.data, first_week(), 0);
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].date, d(3));
    assert!(created[0].is_smod);
}

#[test]
fn required_employment_type_filters_candidates() {
    for seed in 0..10 {
        let mut v = venue();
        let ft = member("ft", EmploymentType::FullTime, StaffCategory::Cafe, &[&v.cafe]);
        let pt = member("pt", EmploymentType::PartTime, StaffCategory::Cafe, &[&v.cafe]);
        v.data.staff = vec![ft.clone(), pt];
        v.data.automation_rules = vec![AutomationRule {
            required_type: Some(EmploymentType::FullTime),
            ..rule(1, &v.cafe, 1)
        }];

        let created = run(&mut v.data, first_week(), seed);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].staff_id, ft.id);
    }
}

#[test]
fn dedicated_specialist_wins_over_generalist_and_manager() {
    for seed in 0..10 {
        let mut v = venue();
        let general = member(
            "general",
            EmploymentType::PartTime,
            StaffCategory::Cafe,
            &[&v.desk, &v.cafe],
        );
        let manager = member(
            "manager",
            EmploymentType::FullTime,
            StaffCategory::ShiftManager,
            &[&v.desk, &v.smod],
        );
        let dedicated = member("desk", EmploymentType::PartTime, StaffCategory::FrontDesk, &[&v.desk]);
        v.data.staff = vec![general, manager, dedicated.clone()];
        v.data.automation_rules = vec![rule(1, &v.desk, 1)];

        let created = run(&mut v.data, first_week(), seed);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].staff_id, dedicated.id);
    }
}

#[test]
fn nobody_is_double_booked_on_a_day() {
    let mut v = venue();
    let a = member("a", EmploymentType::PartTime, StaffCategory::Cafe, &[&v.cafe, &v.desk]);
    let b = member("b", EmploymentType::PartTime, StaffCategory::Cafe, &[&v.cafe, &v.desk]);
    v.data.staff = vec![a, b];
    v.data.automation_rules = vec![rule(1, &v.cafe, 2), rule(1, &v.desk, 2)];

    let created = run(&mut v.data, first_week(), 5);
    // deux personnes pour quatre places : le reste reste vacant
    assert_eq!(created.len(), 2);
    assert_ne!(created[0].staff_id, created[1].staff_id);
}

#[test]
fn saturdays_are_spread_without_back_to_back_weekends() {
    for seed in 0..20 {
        let mut v = venue();
        v.data.staff = ["a", "b", "c"]
            .iter()
            .map(|n| member(n, EmploymentType::PartTime, StaffCategory::FrontDesk, &[&v.desk]))
            .collect();
        v.data.automation_rules = vec![rule(6, &v.desk, 1)];

        let created = run(&mut v.data, "2025-12".parse::<Month>().unwrap().period(), seed);
        let saturdays = [d(6), d(13), d(20), d(27)];
        let who: Vec<StaffId> = saturdays
            .iter()
            .map(|day| created.iter().find(|s| s.date == *day).unwrap().staff_id.clone())
            .collect();
        for pair in who.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        let mut counts: HashMap<&StaffId, usize> = HashMap::new();
        for id in &who {
            *counts.entry(id).or_default() += 1;
        }
        assert!(counts.values().all(|n| *n <= 2));
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let mut v = venue();
    v.data.staff = ["a", "b", "c", "d"]
        .iter()
        .map(|n| member(n, EmploymentType::PartTime, StaffCategory::FrontDesk, &[&v.desk]))
        .collect();
    v.data.automation_rules = every_day(&v.desk, 2);
    let scheduler = AutoScheduler::new(ScheduleOptions {
        seed: Some(42),
        ..ScheduleOptions::default()
    });
    let month: Month = "2025-12".parse().unwrap();

    let mut first = v.data.clone();
    let mut second = v.data.clone();
    let key = |shifts: &[Shift]| -> Vec<_> {
        shifts.iter().map(|s| (s.date, s.staff_id.clone())).collect()
    };
    let a = scheduler.generate(&mut first, month).unwrap();
    let b = scheduler.generate(&mut second, month).unwrap();
    assert_eq!(key(&a.created), key(&b.created));
}

#[test]
fn enforced_constraints_reject_a_sixth_day() {
    let mut v = venue();
    let a = member("a", EmploymentType::PartTime, StaffCategory::FrontDesk, &[&v.desk]);
    v.data.shifts = (1..=5).map(|day| shift(&a, &v.cafe, d(day))).collect();
    v.data.staff = vec![a];
    v.data.automation_rules = vec![rule(6, &v.desk, 1)];
    v.data.constraints = vec![ConstraintConfig::max_days_in_window(
        "5 in 7",
        5,
        7,
        Severity::Critical,
    )];

    let mut relaxed = v.data.clone();
    assert_eq!(run(&mut relaxed, first_week(), 0).len(), 1);

    let strict = AutoScheduler::new(ScheduleOptions {
        enforce_constraints: true,
        ..ScheduleOptions::default()
    });
    let report = strict
        .generate_with_rng(&mut v.data, first_week(), &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert!(report.created.is_empty());
}

/// Dépôt dont l'écriture par lot échoue.
struct FailingWrites(Dataset);

impl Repository for FailingWrites {
    fn eligible_staff(&self, range: Period) -> anyhow::Result<Vec<StaffSnapshot>> {
        self.0.eligible_staff(range)
    }
    fn all_staff(&self) -> anyhow::Result<Vec<Staff>> {
        self.0.all_staff()
    }
    fn shifts_in_range(&self, range: Period) -> anyhow::Result<Vec<Shift>> {
        self.0.shifts_in_range(range)
    }
    fn departments(&self) -> anyhow::Result<Vec<Department>> {
        self.0.departments()
    }
    fn automation_rules(&self) -> anyhow::Result<Vec<AutomationRule>> {
        self.0.automation_rules()
    }
    fn base_rules(&self) -> anyhow::Result<Vec<rostra::BaseRule>> {
        self.0.base_rules()
    }
    fn approved_leave(&self, range: Period) -> anyhow::Result<Vec<Leave>> {
        self.0.approved_leave(range)
    }
    fn constraints(&self) -> anyhow::Result<Vec<ConstraintConfig>> {
        self.0.constraints()
    }
    fn insert_shifts(&mut self, _shifts: Vec<Shift>) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

#[test]
fn batch_write_failure_fails_the_whole_run() {
    let mut v = venue();
    v.data.staff = vec![member(
        "a",
        EmploymentType::PartTime,
        StaffCategory::FrontDesk,
        &[&v.desk],
    )];
    v.data.automation_rules = every_day(&v.desk, 1);
    let mut repo = FailingWrites(v.data);

    let err = AutoScheduler::default()
        .generate(&mut repo, "2025-12".parse().unwrap())
        .unwrap_err();
    assert!(matches!(err, SchedError::Persist(_)));
    assert!(err.to_string().contains("disk full"));
    assert!(repo.0.shifts.is_empty());
}

#[test]
fn leading_sunday_is_scheduled_with_the_weekends() {
    let mut v = venue();
    let a = member("a", EmploymentType::PartTime, StaffCategory::FrontDesk, &[&v.desk]);
    v.data.staff = vec![a];
    v.data.automation_rules = every_day(&v.desk, 1);
    let june = |day| chrono::NaiveDate::from_ymd_opt(2025, 6, day).unwrap();

    let mut rng = StdRng::seed_from_u64(3);
    let report = AutoScheduler::default()
        .generate_with_rng(&mut v.data, Period::new(june(1), june(3)).unwrap(), &mut rng)
        .unwrap();
    let mut dates: Vec<_> = report.created.iter().map(|s| s.date).collect();
    dates.sort();
    assert_eq!(dates, vec![june(1), june(2), june(3)]);
    assert_eq!(report.days_processed, 3);
}
