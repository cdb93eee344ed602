#![allow(dead_code)]
use chrono::{NaiveDate, NaiveTime};
use rostra::model::{
    AutomationRule, Dataset, Department, DepartmentId, EmploymentType, RuleId, Shift, Staff,
    StaffCategory,
};

pub struct Venue {
    pub data: Dataset,
    pub gear: DepartmentId,
    pub smod: DepartmentId,
    pub cafe: DepartmentId,
    pub desk: DepartmentId,
}

/// Lieu avec les quatre départements requis, sans personnel ni règles.
pub fn venue() -> Venue {
    let gear = Department::new("Gear Shop", "#8a5");
    let smod = Department::new("Shift Manager (SMOD)", "#a33");
    let cafe = Department::new("Cafe", "#c82");
    let desk = Department::new("Front Desk", "#37c");
    let ids = (gear.id.clone(), smod.id.clone(), cafe.id.clone(), desk.id.clone());
    let data = Dataset {
        departments: vec![gear, smod, cafe, desk],
        ..Dataset::default()
    };
    Venue {
        data,
        gear: ids.0,
        smod: ids.1,
        cafe: ids.2,
        desk: ids.3,
    }
}

/// Date de décembre 2025 (le 1er est un lundi).
pub fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, day).unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn rule(day_of_week: u8, department: &DepartmentId, count: u32) -> AutomationRule {
    AutomationRule {
        id: RuleId::random(),
        day_of_week,
        department_id: department.clone(),
        start_time: hm(9, 0),
        end_time: hm(17, 0),
        required_count: count,
        required_type: None,
        is_smod: false,
        tolerance_minutes: 15,
    }
}

pub fn every_day(department: &DepartmentId, count: u32) -> Vec<AutomationRule> {
    (0..7).map(|dow| rule(dow, department, count)).collect()
}

pub fn member(
    name: &str,
    employment: EmploymentType,
    category: StaffCategory,
    skills: &[&DepartmentId],
) -> Staff {
    skills
        .iter()
        .fold(Staff::new(name, employment, category), |s, dept| s.with_skill(dept))
}

pub fn shift(staff: &Staff, department: &DepartmentId, date: NaiveDate) -> Shift {
    Shift::new(staff.id.clone(), department.clone(), date, hm(9, 0), hm(17, 0))
}
