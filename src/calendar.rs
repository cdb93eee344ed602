//! Utilitaires calendaires : mois, semaines complètes, jours fériés, coefficients.

use crate::model::{Shift, StaffId};
use anyhow::{bail, Context};
use chrono::{Datelike, Days, Duration, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Marge (jours) garantie représentable autour d'un mois : semaines
/// complètes, buffers et fenêtres de rétrospective restent dans la plage chrono.
const MONTH_MARGIN_DAYS: u64 = 366;

/// Mois calendaire (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32,
    first: NaiveDate,
    last: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> anyhow::Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("month out of range: {month}");
        }
        let (next_year, next_month) = if month == 12 {
            (year.checked_add(1), 1)
        } else {
            (Some(year), month + 1)
        };
        let first = NaiveDate::from_ymd_opt(year, month, 1);
        let last = next_year
            .and_then(|y| NaiveDate::from_ymd_opt(y, next_month, 1))
            .and_then(|d| d.pred_opt());
        let (Some(first), Some(last)) = (first, last) else {
            bail!("year out of range: {year}");
        };
        if first.checked_sub_days(Days::new(MONTH_MARGIN_DAYS)).is_none()
            || last.checked_add_days(Days::new(MONTH_MARGIN_DAYS)).is_none()
        {
            bail!("year out of range: {year}");
        }
        Ok(Self {
            year,
            month,
            first,
            last,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn period(&self) -> Period {
        Period {
            start: self.first_day(),
            end: self.last_day(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .with_context(|| format!("invalid month (expected YYYY-MM): {s}"))?;
        let year: i32 = y.parse().with_context(|| format!("invalid year in {s}"))?;
        let month: u32 = m.parse().with_context(|| format!("invalid month in {s}"))?;
        Self::new(year, month)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Intervalle de dates, bornes incluses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> anyhow::Result<Self> {
        if end < start {
            bail!("end date must be after start date");
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Élargit la période de `days` jours de chaque côté, borné à la plage chrono.
    pub fn buffered(&self, days: i64) -> Self {
        let days = Days::new(u64::try_from(days).unwrap_or(0));
        Self {
            start: self.start.checked_sub_days(days).unwrap_or(NaiveDate::MIN),
            end: self.end.checked_add_days(days).unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Du lundi précédant (ou égal au) 1er du mois au dimanche suivant (ou égal au) dernier jour.
pub fn month_roster_range(month: Month) -> Period {
    let first = month.first_day();
    let last = month.last_day();
    let back = i64::from(first.weekday().num_days_from_monday());
    let forward = 6 - i64::from(last.weekday().num_days_from_monday());
    Period {
        start: first - Duration::days(back),
        end: last + Duration::days(forward),
    }
}

/// 0 = dimanche .. 6 = samedi.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Clé (année ISO, semaine ISO) ; samedi et dimanche partagent la même semaine.
pub fn iso_week_key(date: NaiveDate) -> (i32, u32) {
    let w = date.iso_week();
    (w.year(), w.week())
}

const AU_HOLIDAYS: &[(i32, &[(u32, u32)])] = &[
    (
        2025,
        &[(1, 1), (1, 27), (4, 18), (4, 21), (4, 25), (12, 25), (12, 26)],
    ),
    (
        2026,
        &[(1, 1), (1, 26), (4, 3), (4, 6), (4, 25), (12, 25), (12, 26)],
    ),
];

/// Calendrier de jours fériés (tables statiques par pays/année + dates ajoutées).
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Tables intégrées ; pays inconnu = calendrier vide.
    pub fn builtin(country: &str) -> Self {
        let table: &[(i32, &[(u32, u32)])] = match country.to_ascii_uppercase().as_str() {
            "AU" => AU_HOLIDAYS,
            _ => &[],
        };
        let dates = table.iter().flat_map(|(year, days)| {
            days.iter()
                .filter_map(move |(m, d)| NaiveDate::from_ymd_opt(*year, *m, *d))
        });
        Self::new(dates)
    }

    pub fn with_dates<I: IntoIterator<Item = NaiveDate>>(mut self, dates: I) -> Self {
        self.dates.extend(dates);
        self
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// 2.0 férié, 1.5 dimanche, sinon 1.0.
pub fn multiplier(date: NaiveDate, holidays: &HolidayCalendar) -> f64 {
    if holidays.is_holiday(date) {
        2.0
    } else if date.weekday() == Weekday::Sun {
        1.5
    } else {
        1.0
    }
}

pub fn shift_duration_hours(start: NaiveTime, end: NaiveTime) -> f64 {
    let mut hours = (end - start).num_minutes() as f64 / 60.0;
    if hours < 0.0 {
        hours += 24.0;
    }
    hours
}

/// Tolérance symétrique, appliquée séparément au début et à la fin.
pub fn times_match(
    start: NaiveTime,
    end: NaiveTime,
    expected_start: NaiveTime,
    expected_end: NaiveTime,
    tolerance_minutes: u32,
) -> bool {
    let tol = i64::from(tolerance_minutes);
    minutes_apart(start, expected_start) <= tol && minutes_apart(end, expected_end) <= tol
}

fn minutes_apart(a: NaiveTime, b: NaiveTime) -> i64 {
    let a = i64::from(a.num_seconds_from_midnight() / 60);
    let b = i64::from(b.num_seconds_from_midnight() / 60);
    (a - b).abs()
}

/// Heures pondérées par le coefficient du jour, par personne.
pub fn weighted_hours(shifts: &[Shift], holidays: &HolidayCalendar) -> BTreeMap<StaffId, f64> {
    let mut out = BTreeMap::new();
    for s in shifts {
        *out.entry(s.staff_id.clone()).or_insert(0.0) +=
            s.duration_hours() * multiplier(s.date, holidays);
    }
    out
}
