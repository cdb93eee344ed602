use crate::calendar::Period;
use crate::constraints::ConstraintConfig;
use crate::model::{
    AutomationRule, BaseRule, Dataset, Department, Leave, LeaveStatus, Shift, Staff,
};
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Personne éligible avec ses congés approuvés et shifts sur la période demandée.
#[derive(Debug, Clone)]
pub struct StaffSnapshot {
    pub staff: Staff,
    pub leaves: Vec<Leave>,
    pub shifts: Vec<Shift>,
}

/// Accès aux données lu par le moteur ; la seule écriture est l'insertion par lot.
pub trait Repository {
    /// Personnel `auto_schedule = true`, congés approuvés et shifts filtrés sur `range`.
    fn eligible_staff(&self, range: Period) -> anyhow::Result<Vec<StaffSnapshot>>;
    fn all_staff(&self) -> anyhow::Result<Vec<Staff>>;
    fn shifts_in_range(&self, range: Period) -> anyhow::Result<Vec<Shift>>;
    fn departments(&self) -> anyhow::Result<Vec<Department>>;
    fn automation_rules(&self) -> anyhow::Result<Vec<AutomationRule>>;
    fn base_rules(&self) -> anyhow::Result<Vec<BaseRule>>;
    fn approved_leave(&self, range: Period) -> anyhow::Result<Vec<Leave>>;
    /// Vide si aucune contrainte n'est stockée (l'appelant choisit le défaut).
    fn constraints(&self) -> anyhow::Result<Vec<ConstraintConfig>>;
    /// Insertion en un seul lot ; un échec porte sur le lot entier.
    fn insert_shifts(&mut self, shifts: Vec<Shift>) -> anyhow::Result<()>;
}

impl Repository for Dataset {
    fn eligible_staff(&self, range: Period) -> anyhow::Result<Vec<StaffSnapshot>> {
        let leaves = self.approved_leave(range)?;
        Ok(self
            .staff
            .iter()
            .filter(|s| s.auto_schedule)
            .map(|s| StaffSnapshot {
                staff: s.clone(),
                leaves: leaves.iter().filter(|l| l.staff_id == s.id).cloned().collect(),
                shifts: self
                    .shifts
                    .iter()
                    .filter(|sh| sh.staff_id == s.id && range.contains(sh.date))
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    fn all_staff(&self) -> anyhow::Result<Vec<Staff>> {
        Ok(self.staff.clone())
    }

    fn shifts_in_range(&self, range: Period) -> anyhow::Result<Vec<Shift>> {
        Ok(self
            .shifts
            .iter()
            .filter(|s| range.contains(s.date))
            .cloned()
            .collect())
    }

    fn departments(&self) -> anyhow::Result<Vec<Department>> {
        Ok(self.departments.clone())
    }

    fn automation_rules(&self) -> anyhow::Result<Vec<AutomationRule>> {
        Ok(self.automation_rules.clone())
    }

    fn base_rules(&self) -> anyhow::Result<Vec<BaseRule>> {
        Ok(self.base_rules.clone())
    }

    fn approved_leave(&self, range: Period) -> anyhow::Result<Vec<Leave>> {
        Ok(self
            .leaves
            .iter()
            .filter(|l| l.status == LeaveStatus::Approved && l.overlaps(range.start, range.end))
            .cloned()
            .collect())
    }

    fn constraints(&self) -> anyhow::Result<Vec<ConstraintConfig>> {
        Ok(self.constraints.clone())
    }

    fn insert_shifts(&mut self, shifts: Vec<Shift>) -> anyhow::Result<()> {
        self.shifts.extend(shifts);
        Ok(())
    }
}

pub trait Storage {
    /// Charge un jeu de données depuis un support.
    fn load(&self) -> anyhow::Result<Dataset>;
    /// Sauvegarde de manière atomique.
    fn save(&self, dataset: &Dataset) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self { path: path.as_ref().to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Dataset> {
        let data = fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let dataset: Dataset = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(dataset)
    }

    fn save(&self, dataset: &Dataset) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(dataset)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
