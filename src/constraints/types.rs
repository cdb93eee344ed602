use crate::model::{DepartmentId, RuleId, ShiftId, StaffId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warning,
    Critical,
}

/// Type de règle. Les types inconnus sont conservés tels quels (et ignorés à l'évaluation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConstraintKind {
    MaxDaysInWindow,
    Unknown(String),
}

impl ConstraintKind {
    pub const MAX_DAYS_IN_WINDOW: &'static str = "MAX_DAYS_IN_WINDOW";
}

impl From<String> for ConstraintKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            Self::MAX_DAYS_IN_WINDOW => Self::MaxDaysInWindow,
            _ => Self::Unknown(s),
        }
    }
}

impl From<ConstraintKind> for String {
    fn from(kind: ConstraintKind) -> Self {
        match kind {
            ConstraintKind::MaxDaysInWindow => ConstraintKind::MAX_DAYS_IN_WINDOW.to_string(),
            ConstraintKind::Unknown(s) => s,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("constraint {0}: missing or non-numeric parameter `{1}`")]
    BadParam(String, &'static str),
    #[error("constraint {0}: window must be at least one day")]
    EmptyWindow(String),
    #[error("constraint {0}: unknown type `{1}`")]
    UnknownKind(String, String),
}

/// Paramètres de la règle « N jours max sur une fenêtre glissante ».
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    pub limit: u32,
    pub window: u32,
}

fn default_active() -> bool {
    true
}

/// Configuration d'une contrainte ; évaluée, ne modifie jamais les données.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintConfig {
    pub id: RuleId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConstraintKind,
    #[serde(default)]
    pub params: serde_json::Value,
    pub severity: Severity,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ConstraintConfig {
    pub fn max_days_in_window<N: Into<String>>(
        name: N,
        limit: u32,
        window: u32,
        severity: Severity,
    ) -> Self {
        Self {
            id: RuleId::random(),
            name: name.into(),
            kind: ConstraintKind::MaxDaysInWindow,
            params: serde_json::json!({ "limit": limit, "window": window }),
            severity,
            department_id: None,
            is_active: true,
            message: None,
        }
    }

    /// Contrainte utilisée quand aucune n'est configurée : 5 jours max sur 7.
    pub fn default_window() -> Self {
        Self::max_days_in_window("Max 5 days in 7", 5, 7, Severity::Critical)
    }

    pub fn scoped_to(mut self, department: DepartmentId) -> Self {
        self.department_id = Some(department);
        self
    }

    /// Lecture permissive : nombres ou chaînes numériques.
    pub fn window_params(&self) -> Result<WindowParams, ConfigError> {
        let limit = self.numeric_param("limit")?;
        let window = self.numeric_param("window")?;
        if window == 0 {
            return Err(ConfigError::EmptyWindow(self.name.clone()));
        }
        Ok(WindowParams { limit, window })
    }

    fn numeric_param(&self, key: &'static str) -> Result<u32, ConfigError> {
        let bad = || ConfigError::BadParam(self.name.clone(), key);
        match self.params.get(key) {
            Some(serde_json::Value::Number(n)) => {
                n.as_u64().and_then(|v| u32::try_from(v).ok()).ok_or_else(bad)
            }
            Some(serde_json::Value::String(s)) => s.trim().parse().map_err(|_| bad()),
            _ => Err(bad()),
        }
    }

    /// Validation stricte, à appeler à la création de la configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.kind {
            ConstraintKind::MaxDaysInWindow => self.window_params().map(|_| ()),
            ConstraintKind::Unknown(kind) => {
                Err(ConfigError::UnknownKind(self.name.clone(), kind.clone()))
            }
        }
    }
}

/// Violation d'une contrainte (sortie pure, non persistée).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub shift_id: Option<ShiftId>,
    pub staff_id: StaffId,
    pub date: NaiveDate,
    pub message: String,
    pub severity: Severity,
    pub constraint_name: String,
}
