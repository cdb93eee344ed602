use crate::model::{Department, DepartmentId, Shift};
use thiserror::Error;

/// Options de génération
#[derive(Debug, Clone, Copy)]
pub struct ScheduleOptions {
    /// Marge (jours) autour du mois pour charger congés et shifts existants.
    pub buffer_days: i64,
    /// Écarte les candidats dont l'affectation violerait une contrainte ce jour-là.
    pub enforce_constraints: bool,
    /// Graine du mélange aléatoire (départage des ex æquo).
    pub seed: Option<u64>,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            buffer_days: 14,
            enforce_constraints: false,
            seed: None,
        }
    }
}

/// Résultat d'un run. Le sous-effectif n'y figure pas : voir `constraints::staffing_gaps`.
#[derive(Debug, Clone, Default)]
pub struct ScheduleReport {
    pub created: Vec<Shift>,
    pub days_processed: usize,
    /// Nombre de blocages vendredi/lundi posés après un week-end complet.
    pub weekend_blocks: usize,
}

pub const GEAR_SHOP: &str = "Gear Shop";
pub const SMOD: &str = "Shift Manager (SMOD)";
pub const CAFE: &str = "Cafe";
pub const FRONT_DESK: &str = "Front Desk";

/// Départements au rôle particulier, résolus par leur nom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentRoles {
    pub gear_shop: DepartmentId,
    pub smod: DepartmentId,
    pub cafe: DepartmentId,
    pub front_desk: DepartmentId,
}

impl DepartmentRoles {
    pub fn resolve(departments: &[Department]) -> Result<Self, SchedError> {
        let find = |name: &str| {
            departments
                .iter()
                .find(|d| d.name == name)
                .map(|d| d.id.clone())
                .ok_or_else(|| SchedError::MissingDepartment(name.to_string()))
        };
        Ok(Self {
            gear_shop: find(GEAR_SHOP)?,
            smod: find(SMOD)?,
            cafe: find(CAFE)?,
            front_desk: find(FRONT_DESK)?,
        })
    }

    /// Front Desk, Cafe, Gear Shop : départements à spécialistes.
    pub fn is_specialist(&self, department: &DepartmentId) -> bool {
        department == &self.front_desk || department == &self.cafe || department == &self.gear_shop
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("required department missing: {0}")]
    MissingDepartment(String),
    #[error("failed to persist generated shifts: {0:#}")]
    Persist(anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
