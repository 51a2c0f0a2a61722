//! Year, month, day and hour pillars.
//!
//! - Year: `(year − 4) mod 60`, where the year turns at 立春, not Jan 1.
//! - Month: branch from the sectional term in force (立春 opens 寅),
//!   stem from the year stem through the 五虎遁 table.
//! - Day: `(JDN + 49) mod 60`.
//! - Hour: branch from the double hour, stem from the day stem through
//!   the 五鼠遁 table. The 23:00 hour takes the next day's stem.
//!
//! Term boundaries are compared against the true solar birth instant
//! expressed in UTC. Day and hour are read from local true solar time.

use std::fmt;

use bazi_tables::{Branch, Stem, StemBranch};
use bazi_time::{
    SolarTerm, SolarTermEvent, SolarTermSource, civil_datetime, julian_day_number,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ChartError;

/// Sexagenary position of the year 4 CE (甲子).
pub const YEAR_EPOCH: i64 = 4;

/// Added to the JDN before reducing mod 60 (JDN 2451545 → 戊午).
pub const DAY_CYCLE_OFFSET: i64 = 49;

/// Stem of the 寅 month for each `year_stem mod 5` (甲己 → 丙寅 ...).
pub const MONTH_STEM_START: [Stem; 5] = [Stem::Bing, Stem::Wu, Stem::Geng, Stem::Ren, Stem::Jia];

/// Stem of the 子 hour for each `day_stem mod 5` (甲己 → 甲子 ...).
pub const HOUR_STEM_START: [Stem; 5] = [Stem::Jia, Stem::Bing, Stem::Wu, Stem::Geng, Stem::Ren];

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Position of a pillar in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PillarRole {
    Year,
    Month,
    Day,
    Hour,
}

/// All four roles in chart order.
pub const ALL_ROLES: [PillarRole; 4] = [
    PillarRole::Year,
    PillarRole::Month,
    PillarRole::Day,
    PillarRole::Hour,
];

impl PillarRole {
    pub const fn index(self) -> usize {
        match self {
            Self::Year => 0,
            Self::Month => 1,
            Self::Day => 2,
            Self::Hour => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Year => "Year",
            Self::Month => "Month",
            Self::Day => "Day",
            Self::Hour => "Hour",
        }
    }

    pub const fn hanzi(self) -> &'static str {
        match self {
            Self::Year => "年柱",
            Self::Month => "月柱",
            Self::Day => "日柱",
            Self::Hour => "时柱",
        }
    }
}

impl fmt::Display for PillarRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Four pillars
// ---------------------------------------------------------------------------

/// The four pillars of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FourPillars {
    pub year: StemBranch,
    pub month: StemBranch,
    pub day: StemBranch,
    pub hour: StemBranch,
}

impl FourPillars {
    pub const fn new(year: StemBranch, month: StemBranch, day: StemBranch, hour: StemBranch) -> Self {
        Self {
            year,
            month,
            day,
            hour,
        }
    }

    /// Rebuild from stored sexagenary indices (year, month, day, hour).
    pub fn from_indices(indices: [u8; 4]) -> Result<Self, ChartError> {
        let mut out = [StemBranch::wrapping(0); 4];
        for (slot, (role, raw)) in out.iter_mut().zip(ALL_ROLES.iter().zip(indices)) {
            *slot = StemBranch::from_index(raw).ok_or_else(|| {
                ChartError::invariant(format!("{role} pillar index {raw} outside [0, 59]"))
            })?;
        }
        Ok(Self::new(out[0], out[1], out[2], out[3]))
    }

    pub const fn get(&self, role: PillarRole) -> StemBranch {
        match role {
            PillarRole::Year => self.year,
            PillarRole::Month => self.month,
            PillarRole::Day => self.day,
            PillarRole::Hour => self.hour,
        }
    }

    /// Stem of the day pillar.
    pub const fn day_master(&self) -> Stem {
        self.day.stem()
    }

    pub fn indices(&self) -> [u8; 4] {
        self.as_array().map(StemBranch::index)
    }

    pub fn stems(&self) -> [Stem; 4] {
        self.as_array().map(StemBranch::stem)
    }

    pub fn branches(&self) -> [Branch; 4] {
        self.as_array().map(StemBranch::branch)
    }

    pub const fn as_array(&self) -> [StemBranch; 4] {
        [self.year, self.month, self.day, self.hour]
    }

    /// `(role, pillar)` pairs in chart order.
    pub fn iter(&self) -> impl Iterator<Item = (PillarRole, StemBranch)> + '_ {
        ALL_ROLES.iter().map(move |r| (*r, self.get(*r)))
    }
}

impl fmt::Display for FourPillars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.year, self.month, self.day, self.hour)
    }
}

// ---------------------------------------------------------------------------
// Individual pillars
// ---------------------------------------------------------------------------

/// Year pillar of a solar year (the year that began at its 立春).
pub const fn year_pillar(solar_year: i32) -> StemBranch {
    StemBranch::wrapping(solar_year as i64 - YEAR_EPOCH)
}

/// Month pillar from the year stem and the month branch.
pub fn month_pillar(year_stem: Stem, month_branch: Branch) -> Result<StemBranch, ChartError> {
    let first = MONTH_STEM_START[(year_stem.index() % 5) as usize];
    let months_since_yin = (i64::from(month_branch.index()) - 2).rem_euclid(12);
    let stem = first.offset(months_since_yin);
    StemBranch::new(stem, month_branch).ok_or_else(|| {
        ChartError::invariant(format!("month stem {stem:?} does not pair with {month_branch:?}"))
    })
}

/// Day pillar of a calendar date. Independent of time of day.
pub fn day_pillar(date: NaiveDate) -> StemBranch {
    StemBranch::wrapping(julian_day_number(date) + DAY_CYCLE_OFFSET)
}

/// Hour pillar for a local time.
///
/// From 23:00 the hour is 子 of the following day, so its stem is taken
/// from the next day's stem.
pub fn hour_pillar(local: NaiveDateTime) -> Result<StemBranch, ChartError> {
    let hour = local.hour();
    let branch = Branch::from_hour(hour);
    let stem_day = if hour == 23 {
        local
            .date()
            .succ_opt()
            .ok_or_else(|| ChartError::invariant("no day after the last calendar date"))?
    } else {
        local.date()
    };
    let first = HOUR_STEM_START[(day_pillar(stem_day).stem().index() % 5) as usize];
    let stem = first.offset(i64::from(branch.index()));
    StemBranch::new(stem, branch).ok_or_else(|| {
        ChartError::invariant(format!("hour stem {stem:?} does not pair with {branch:?}"))
    })
}

// ---------------------------------------------------------------------------
// Month boundaries
// ---------------------------------------------------------------------------

/// Sectional terms at fixed civil dates, used when no term data covers
/// the birth. Ordered through the calendar year.
pub const FALLBACK_SECTIONAL_DATES: [(SolarTerm, u32, u32); 12] = [
    (SolarTerm::Xiaohan, 1, 6),
    (SolarTerm::Lichun, 2, 4),
    (SolarTerm::Jingzhe, 3, 6),
    (SolarTerm::Qingming, 4, 5),
    (SolarTerm::Lixia, 5, 6),
    (SolarTerm::Mangzhong, 6, 6),
    (SolarTerm::Xiaoshu, 7, 7),
    (SolarTerm::Liqiu, 8, 8),
    (SolarTerm::Bailu, 9, 8),
    (SolarTerm::Hanlu, 10, 8),
    (SolarTerm::Lidong, 11, 7),
    (SolarTerm::Daxue, 12, 7),
];

/// Sectional term in force at `local`, read from the fixed-date table.
pub fn fallback_sectional_before(local: NaiveDateTime) -> Result<SolarTermEvent, ChartError> {
    let at = |year: i32, term: SolarTerm, month: u32, day: u32| {
        civil_datetime(year, month, day, 0, 0, 0)
            .ok()
            .map(|instant| SolarTermEvent { term, instant })
    };
    let year = local.year();
    let this_year = FALLBACK_SECTIONAL_DATES
        .iter()
        .rev()
        .filter_map(|(term, m, d)| at(year, *term, *m, *d))
        .find(|e| e.instant <= local);
    this_year
        .or_else(|| at(year - 1, SolarTerm::Daxue, 12, 7))
        .ok_or_else(|| ChartError::invariant(format!("no fallback term before {local}")))
}

/// How the month boundary was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundarySource {
    /// From the supplied solar-term source.
    TermTable,
    /// From fixed approximate dates; term data was missing.
    FixedDates,
}

/// Pillars plus the boundary information that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarResolution {
    pub pillars: FourPillars,
    /// Year whose 立春 most recently preceded the birth.
    pub solar_year: i32,
    /// Sectional term that opened the birth month.
    pub month_term: SolarTermEvent,
    pub boundary_source: BoundarySource,
}

fn solar_year_of(event: &SolarTermEvent) -> i32 {
    // 小寒 falls in January, before that year's 立春.
    if event.term == SolarTerm::Xiaohan {
        event.instant.year() - 1
    } else {
        event.instant.year()
    }
}

/// Compute all four pillars.
///
/// `birth_utc` locates the birth against term boundaries; `local_solar`
/// (true solar time) fixes the day and hour.
pub fn compute_pillars(
    birth_utc: NaiveDateTime,
    local_solar: NaiveDateTime,
    terms: &dyn SolarTermSource,
) -> Result<PillarResolution, ChartError> {
    let (month_term, boundary_source) = match terms.sectional_before(birth_utc) {
        Some(e) => (e, BoundarySource::TermTable),
        None => {
            warn!(%birth_utc, "no solar-term data for birth; using fixed sectional dates");
            (fallback_sectional_before(local_solar)?, BoundarySource::FixedDates)
        }
    };

    let ordinal = month_term.term.month_ordinal().ok_or_else(|| {
        ChartError::invariant(format!("{:?} does not open a month", month_term.term))
    })?;
    let month_branch = Branch::Yin.offset(i64::from(ordinal));
    let solar_year = solar_year_of(&month_term);

    let year = year_pillar(solar_year);
    let month = month_pillar(year.stem(), month_branch)?;
    let day = day_pillar(local_solar.date());
    let hour = hour_pillar(local_solar)?;

    Ok(PillarResolution {
        pillars: FourPillars::new(year, month, day, hour),
        solar_year,
        month_term,
        boundary_source,
    })
}

/// Signed day span from `from` to `to`, in fractional days.
pub(crate) fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let d: Duration = to - from;
    d.num_milliseconds() as f64 / 86_400_000.0
}
