use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour un membre du personnel
    StaffId
);
string_id!(
    /// Identifiant fort pour un département
    DepartmentId
);
string_id!(
    /// Identifiant fort pour un shift
    ShiftId
);
string_id!(
    /// Identifiant fort pour une règle (automation, base, contrainte)
    RuleId
);

/// Sérialisation `HH:MM` des heures (accepte aussi `HH:MM:SS` en lecture).
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid time (HH:MM): {raw}")))
    }

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentType {
    FullTime,
    PartTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffCategory {
    Management,
    ShiftManager,
    Cafe,
    Shop,
    FrontDesk,
}

/// Membre du personnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub employment_type: EmploymentType,
    pub category: StaffCategory,
    /// Présent dans le modèle, non appliqué par le planificateur.
    #[serde(default)]
    pub max_weekly_hours: Option<f64>,
    /// Départements dans lesquels la personne peut travailler.
    #[serde(default)]
    pub skills: BTreeSet<DepartmentId>,
    #[serde(default)]
    pub auto_schedule: bool,
}

impl Staff {
    pub fn new<N: Into<String>>(
        name: N,
        employment_type: EmploymentType,
        category: StaffCategory,
    ) -> Self {
        Self {
            id: StaffId::random(),
            name: name.into(),
            employment_type,
            category,
            max_weekly_hours: None,
            skills: BTreeSet::new(),
            auto_schedule: true,
        }
    }

    pub fn with_skill(mut self, department: &DepartmentId) -> Self {
        self.skills.insert(department.clone());
        self
    }

    pub fn has_skill(&self, department: &DepartmentId) -> bool {
        self.skills.contains(department)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl Department {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, color: C) -> Self {
        Self {
            id: DepartmentId::random(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Shift daté, sans fuseau. `end < start` signifie une fin le lendemain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub staff_id: StaffId,
    pub department_id: DepartmentId,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub is_smod: bool,
}

impl Shift {
    pub fn new(
        staff_id: StaffId,
        department_id: DepartmentId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id: ShiftId::random(),
            staff_id,
            department_id,
            date,
            start_time,
            end_time,
            is_smod: false,
        }
    }

    pub fn smod(mut self, is_smod: bool) -> Self {
        self.is_smod = is_smod;
        self
    }

    /// Durée en heures (+24h si le shift passe minuit).
    pub fn duration_hours(&self) -> f64 {
        crate::calendar::shift_duration_hours(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    Paid,
    Unpaid,
}

/// Congé, bornes incluses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leave {
    pub staff_id: StaffId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
}

impl Leave {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    /// Seuls les congés approuvés bloquent la planification.
    pub fn blocks(&self, date: NaiveDate) -> bool {
        self.status == LeaveStatus::Approved && self.covers(date)
    }
}

/// Besoin récurrent : un créneau par jour de semaine (0 = dimanche).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: RuleId,
    pub day_of_week: u8,
    pub department_id: DepartmentId,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub required_count: u32,
    #[serde(default)]
    pub required_type: Option<EmploymentType>,
    #[serde(default)]
    pub is_smod: bool,
    #[serde(default)]
    pub tolerance_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub id: RuleId,
    pub name: String,
    pub department_id: DepartmentId,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceType {
    #[default]
    Weekly,
}

/// Shift personnel récurrent (template joint).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRule {
    pub id: RuleId,
    pub staff_id: StaffId,
    pub day_of_week: u8,
    pub template: ShiftTemplate,
    #[serde(default)]
    pub recurrence: RecurrenceType,
}

/// Jeu de données complet (snapshot lu par le moteur).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub staff: Vec<Staff>,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub leaves: Vec<Leave>,
    #[serde(default)]
    pub automation_rules: Vec<AutomationRule>,
    #[serde(default)]
    pub base_rules: Vec<BaseRule>,
    #[serde(default)]
    pub constraints: Vec<crate::constraints::ConstraintConfig>,
}

impl Dataset {
    pub fn find_staff(&self, id: &StaffId) -> Option<&Staff> {
        self.staff.iter().find(|s| &s.id == id)
    }
}
