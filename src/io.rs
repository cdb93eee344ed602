use crate::constraints::{Severity, StaffingGap, Violation};
use crate::model::Dataset;
use csv::WriterBuilder;
use std::path::Path;

fn severity_label(s: Severity) -> &'static str {
    match s {
        Severity::Warning => "WARNING",
        Severity::Critical => "CRITICAL",
    }
}

/// Export CSV des violations: header `shift_id,staff,date,severity,constraint,message`
pub fn export_violations_csv<P: AsRef<Path>>(
    path: P,
    violations: &[Violation],
    dataset: &Dataset,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["shift_id", "staff", "date", "severity", "constraint", "message"])?;
    for v in violations {
        let staff = dataset
            .find_staff(&v.staff_id)
            .map(|s| s.name.as_str())
            .unwrap_or(v.staff_id.as_str());
        let date = v.date.to_string();
        w.write_record([
            v.shift_id.as_ref().map(|id| id.as_str()).unwrap_or(""),
            staff,
            date.as_str(),
            severity_label(v.severity),
            v.constraint_name.as_str(),
            v.message.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV du sous-effectif: header `date,department,start,end,required,filled`
pub fn export_gaps_csv<P: AsRef<Path>>(
    path: P,
    gaps: &[StaffingGap],
    dataset: &Dataset,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "department", "start", "end", "required", "filled"])?;
    for g in gaps {
        let department = dataset
            .departments
            .iter()
            .find(|d| d.id == g.department_id)
            .map(|d| d.name.as_str())
            .unwrap_or(g.department_id.as_str());
        w.write_record([
            g.date.to_string(),
            department.to_string(),
            g.start_time.format("%H:%M").to_string(),
            g.end_time.format("%H:%M").to_string(),
            g.required.to_string(),
            g.filled.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des shifts: header `id,date,staff,department,start,end,smod`
pub fn export_shifts_csv<P: AsRef<Path>>(path: P, dataset: &Dataset) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "date", "staff", "department", "start", "end", "smod"])?;
    let mut shifts: Vec<_> = dataset.shifts.iter().collect();
    shifts.sort_by_key(|s| (s.date, s.start_time));
    for s in shifts {
        let staff = dataset
            .find_staff(&s.staff_id)
            .map(|p| p.name.as_str())
            .unwrap_or("");
        let department = dataset
            .departments
            .iter()
            .find(|d| d.id == s.department_id)
            .map(|d| d.name.as_str())
            .unwrap_or("");
        let date = s.date.to_string();
        let start = s.start_time.format("%H:%M").to_string();
        let end = s.end_time.format("%H:%M").to_string();
        w.write_record([
            s.id.as_str(),
            date.as_str(),
            staff,
            department,
            start.as_str(),
            end.as_str(),
            if s.is_smod { "yes" } else { "no" },
        ])?;
    }
    w.flush()?;
    Ok(())
}
