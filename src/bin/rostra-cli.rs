#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rostra::{
    calendar::{month_roster_range, multiplier, weighted_hours, HolidayCalendar, Month},
    constraints::{staffing_gaps, ConstraintConfig, ConstraintEngine},
    expander::BaseRuleExpander,
    io,
    model::Dataset,
    scheduler::{AutoScheduler, ScheduleOptions},
    storage::{JsonStorage, Storage},
};
use std::collections::HashMap;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification du personnel (fichier JSON, sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du jeu de données
    #[arg(long, global = true, default_value = "roster.json")]
    data: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Planifier automatiquement un mois (YYYY-MM)
    Generate {
        #[arg(long)]
        month: String,
        /// Graine du départage aléatoire
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 14)]
        buffer_days: i64,
        /// Écarter les candidats qui violeraient une contrainte
        #[arg(long)]
        enforce_constraints: bool,
    },

    /// Matérialiser les shifts récurrents d'un mois
    Expand {
        #[arg(long)]
        month: String,
    },

    /// Vérifier contraintes et couverture
    Check {
        #[arg(long)]
        month: String,
        /// Export CSV des violations (optionnel)
        #[arg(long)]
        report: Option<String>,
        /// Export CSV du sous-effectif (optionnel)
        #[arg(long)]
        gaps: Option<String>,
    },

    /// Lister et optionnellement exporter les shifts
    List {
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Afficher la plage de semaines complètes d'un mois
    Range {
        #[arg(long)]
        month: String,
    },

    /// Coefficient d'une date (férié 2.0, dimanche 1.5)
    Multiplier {
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "AU")]
        country: String,
    },

    /// Heures pondérées par personne sur un mois
    Hours {
        #[arg(long)]
        month: String,
        #[arg(long, default_value = "AU")]
        country: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.data)?;
    let mut dataset = if storage.path().exists() {
        storage.load()?
    } else {
        Dataset::default()
    };

    let code = match cli.cmd {
        Commands::Generate {
            month,
            seed,
            buffer_days,
            enforce_constraints,
        } => {
            let month: Month = month.parse()?;
            let scheduler = AutoScheduler::new(ScheduleOptions {
                buffer_days,
                enforce_constraints,
                seed,
            });
            let report = scheduler.generate(&mut dataset, month)?;
            storage.save(&dataset)?;
            println!(
                "{}: {} shift(s) created over {} day(s), {} weekend block(s)",
                month,
                report.created.len(),
                report.days_processed,
                report.weekend_blocks
            );
            0
        }
        Commands::Expand { month } => {
            let month: Month = month.parse()?;
            let count = BaseRuleExpander::new().expand(&mut dataset, month)?;
            storage.save(&dataset)?;
            println!("{month}: {count} shift(s) created from base rules");
            0
        }
        Commands::Check {
            month,
            report,
            gaps,
        } => {
            let month: Month = month.parse()?;
            check(&dataset, month, report, gaps)?
        }
        Commands::List { out_csv } => {
            if let Some(path) = out_csv {
                io::export_shifts_csv(path, &dataset)?;
            }
            // impression compacte
            let mut shifts: Vec<_> = dataset.shifts.iter().collect();
            shifts.sort_by_key(|s| (s.date, s.start_time));
            for s in shifts {
                let who = dataset
                    .find_staff(&s.staff_id)
                    .map(|p| p.name.as_str())
                    .unwrap_or("-");
                println!(
                    "{} | {} {}→{} | {}",
                    s.id.as_str(),
                    s.date,
                    s.start_time.format("%H:%M"),
                    s.end_time.format("%H:%M"),
                    who
                );
            }
            0
        }
        Commands::Range { month } => {
            let range = month_roster_range(month.parse()?);
            println!("{} → {}", range.start, range.end);
            0
        }
        Commands::Multiplier { date, country } => {
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("invalid date: {date}"))?;
            println!("{}", multiplier(date, &HolidayCalendar::builtin(&country)));
            0
        }
        Commands::Hours { month, country } => {
            let month: Month = month.parse()?;
            let in_month: Vec<_> = dataset
                .shifts
                .iter()
                .filter(|s| month.contains(s.date))
                .cloned()
                .collect();
            for (staff, hours) in weighted_hours(&in_month, &HolidayCalendar::builtin(&country)) {
                let name = dataset
                    .find_staff(&staff)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| staff.to_string());
                println!("{name}: {hours:.2}");
            }
            0
        }
    };

    std::process::exit(code);
}

fn check(
    dataset: &Dataset,
    month: Month,
    report: Option<String>,
    gaps_out: Option<String>,
) -> Result<i32> {
    let mut constraints = dataset.constraints.clone();
    if constraints.is_empty() {
        constraints.push(ConstraintConfig::default_window());
    }
    let violations = ConstraintEngine::new().validate(&dataset.shifts, &constraints, Some(month));
    let employment: HashMap<_, _> = dataset
        .staff
        .iter()
        .map(|s| (s.id.clone(), s.employment_type))
        .collect();
    let gaps = staffing_gaps(
        month.period(),
        &dataset.automation_rules,
        &dataset.shifts,
        &employment,
    );

    if let Some(path) = report {
        io::export_violations_csv(path, &violations, dataset)?;
    }
    if let Some(path) = gaps_out {
        io::export_gaps_csv(path, &gaps, dataset)?;
    }

    if violations.is_empty() && gaps.is_empty() {
        println!("OK: no violations, fully staffed");
        return Ok(0);
    }
    eprintln!(
        "Found {} violation(s), {} understaffed slot(s)",
        violations.len(),
        gaps.len()
    );
    // Code 2 = WARNING/INCOMPLETE
    Ok(2)
}
