//! Da-yun (大运) major cycles.
//!
//! Direction: forward for a yang year stem with a male birth or a yin
//! year stem with a female birth, reverse otherwise.
//!
//! Start age (起运): days from birth to the next sectional term (forward)
//! or back to the previous one (reverse), at 3 days per year. Results at
//! or below one year are clamped to 1. Cycles step the month pillar by
//! ±1 per decade, beginning one step from the month pillar.

use bazi_tables::{LifeStage, Stem, StemBranch};
use bazi_time::{SolarTerm, SolarTermEvent, SolarTermSource};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChartError;
use crate::pillar::days_between;

/// Days of life per year of start age.
pub const DAYS_PER_LUCK_YEAR: f64 = 3.0;

/// Start age used when no adjacent term is known.
pub const DEFAULT_START_AGE: u32 = 8;

/// Years spanned by one cycle.
pub const CYCLE_YEARS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DaYunDirection {
    Forward,
    Reverse,
}

impl DaYunDirection {
    /// Sexagenary step between consecutive cycles.
    pub const fn step(self) -> i64 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }
}

/// Direction of the cycles for a year stem and gender.
pub const fn dayun_direction(year_stem: Stem, gender: Gender) -> DaYunDirection {
    let yang = year_stem.polarity().is_yang();
    match (yang, gender) {
        (true, Gender::Male) | (false, Gender::Female) => DaYunDirection::Forward,
        _ => DaYunDirection::Reverse,
    }
}

/// Start age broken into years, months and days (1 day of life = 4
/// months, 2 hours = 10 days).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartOffset {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl StartOffset {
    pub fn from_days(span_days: f64) -> Self {
        let span = span_days.max(0.0);
        let years = (span / DAYS_PER_LUCK_YEAR).floor();
        let rest_days = span - years * DAYS_PER_LUCK_YEAR;
        let months_f = rest_days * 4.0;
        let mut months = months_f.floor();
        let mut days = ((months_f - months) * 30.0).round();
        if days >= 30.0 {
            months += 1.0;
            days = 0.0;
        }
        Self {
            years: years as u32,
            months: months as u32,
            days: days as u32,
        }
    }
}

/// Where the start age came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StartAgeSource {
    /// Counted to an adjacent sectional term.
    SolarTerm { term: SolarTerm, instant: NaiveDateTime, days: f64 },
    /// No term data; the configured default was used.
    Default,
}

/// Start age of the first cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QiYun {
    /// Day span / 3, before clamping or rounding.
    pub raw_years: Option<f64>,
    pub start_age: u32,
    /// The raw value was at or below one year and was raised to 1.
    pub clamped: bool,
    pub source: StartAgeSource,
    pub offset: Option<StartOffset>,
    /// Why the result departs from the plain computation.
    pub explanation: Option<String>,
}

impl QiYun {
    /// Start age from a day span to the adjacent term.
    pub fn from_term(event: SolarTermEvent, span_days: f64) -> Self {
        let raw = span_days / DAYS_PER_LUCK_YEAR;
        let (start_age, clamped, explanation) = if raw <= 1.0 {
            (
                1,
                true,
                Some(format!(
                    "start age {raw:.2} years ({span_days:.2} days to {}) clamped to 1",
                    event.term.hanzi()
                )),
            )
        } else {
            (raw.round() as u32, false, None)
        };
        Self {
            raw_years: Some(raw),
            start_age,
            clamped,
            source: StartAgeSource::SolarTerm {
                term: event.term,
                instant: event.instant,
                days: span_days,
            },
            offset: Some(StartOffset::from_days(span_days)),
            explanation,
        }
    }

    /// Default start age when term data is missing.
    pub fn fallback(default_age: u32, reason: &str) -> Self {
        Self {
            raw_years: None,
            start_age: default_age,
            clamped: false,
            source: StartAgeSource::Default,
            offset: None,
            explanation: Some(format!("{reason}; using default start age {default_age}")),
        }
    }
}

/// One decade-long cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaYunCycle {
    /// 1-based position in the sequence.
    pub order: u8,
    pub pillar: StemBranch,
    pub start_age: u32,
    pub end_age: u32,
    /// Life stage of the day master on the cycle's branch.
    pub day_master_stage: LifeStage,
}

impl DaYunCycle {
    pub const fn contains_age(&self, age: u32) -> bool {
        self.start_age <= age && age <= self.end_age
    }
}

/// Direction, start age and the cycle sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaYun {
    pub direction: DaYunDirection,
    pub qi_yun: QiYun,
    pub cycles: Vec<DaYunCycle>,
}

impl DaYun {
    /// Cycle running at a given age, if any.
    pub fn cycle_at_age(&self, age: u32) -> Option<&DaYunCycle> {
        self.cycles.iter().find(|c| c.contains_age(age))
    }
}

/// Cycle sequence starting one step from the month pillar.
pub fn build_cycles(
    month_pillar: StemBranch,
    day_master: Stem,
    direction: DaYunDirection,
    start_age: u32,
    count: u8,
) -> Vec<DaYunCycle> {
    (0..count)
        .map(|i| {
            let start = start_age + u32::from(i) * CYCLE_YEARS;
            let pillar = month_pillar.offset(direction.step() * (i64::from(i) + 1));
            DaYunCycle {
                order: i + 1,
                pillar,
                start_age: start,
                end_age: start + CYCLE_YEARS - 1,
                day_master_stage: LifeStage::of(day_master, pillar.branch()),
            }
        })
        .collect()
}

/// Compute the da-yun for a birth.
#[allow(clippy::too_many_arguments)]
pub fn compute_dayun(
    birth_utc: NaiveDateTime,
    year_stem: Stem,
    month_pillar: StemBranch,
    day_master: Stem,
    gender: Gender,
    terms: &dyn SolarTermSource,
    cycle_count: u8,
    default_start_age: u32,
) -> Result<DaYun, ChartError> {
    let direction = dayun_direction(year_stem, gender);
    let adjacent = match direction {
        DaYunDirection::Forward => terms.sectional_after(birth_utc),
        DaYunDirection::Reverse => terms.sectional_before(birth_utc),
    };

    let qi_yun = match adjacent {
        Some(event) => {
            let span = days_between(birth_utc, event.instant).abs();
            if !span.is_finite() {
                return Err(ChartError::invariant("non-finite day span to adjacent term"));
            }
            let q = QiYun::from_term(event, span);
            debug!(?direction, span, start_age = q.start_age, "qi-yun from solar term");
            q
        }
        None => {
            warn!(%birth_utc, ?direction, "no adjacent solar term for qi-yun");
            let side = match direction {
                DaYunDirection::Forward => "next",
                DaYunDirection::Reverse => "previous",
            };
            QiYun::fallback(
                default_start_age,
                &format!("no {side} sectional term found for {birth_utc}"),
            )
        }
    };

    let cycles = build_cycles(month_pillar, day_master, direction, qi_yun.start_age, cycle_count);
    Ok(DaYun {
        direction,
        qi_yun,
        cycles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazi_time::TermTable;
    use chrono::{Duration, NaiveDate};

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn event(term: SolarTerm, instant: NaiveDateTime) -> SolarTermEvent {
        SolarTermEvent { term, instant }
    }

    #[test]
    fn direction_rule() {
        assert_eq!(dayun_direction(Stem::Geng, Gender::Male), DaYunDirection::Forward);
        assert_eq!(dayun_direction(Stem::Geng, Gender::Female), DaYunDirection::Reverse);
        assert_eq!(dayun_direction(Stem::Xin, Gender::Male), DaYunDirection::Reverse);
        assert_eq!(dayun_direction(Stem::Xin, Gender::Female), DaYunDirection::Forward);
    }

    #[test]
    fn small_qi_yun_clamps_to_one() {
        // 1.8 days → 0.6 years.
        let q = QiYun::from_term(event(SolarTerm::Lixia, dt(1990, 5, 6, 0)), 1.8);
        assert!((q.raw_years.unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(q.start_age, 1);
        assert!(q.clamped);
        assert!(q.explanation.unwrap().contains("clamped"));
    }

    #[test]
    fn exactly_one_year_is_clamped() {
        let q = QiYun::from_term(event(SolarTerm::Lixia, dt(1990, 5, 6, 0)), 3.0);
        assert_eq!(q.start_age, 1);
        assert!(q.clamped);
    }

    #[test]
    fn larger_qi_yun_rounds() {
        let q = QiYun::from_term(event(SolarTerm::Mangzhong, dt(1990, 6, 6, 0)), 22.5);
        assert_eq!(q.start_age, 8);
        assert!(!q.clamped);
        assert!(q.explanation.is_none());
        assert_eq!(
            q.offset,
            Some(StartOffset {
                years: 7,
                months: 6,
                days: 0
            })
        );
    }

    #[test]
    fn start_offset_breakdown() {
        // 1 day = 4 months, 0.25 day = 1 month.
        assert_eq!(
            StartOffset::from_days(4.25),
            StartOffset {
                years: 1,
                months: 5,
                days: 0
            }
        );
        assert_eq!(StartOffset::from_days(0.0).years, 0);
    }

    #[test]
    fn cycles_are_contiguous() {
        let month: StemBranch = "辛巳".parse().unwrap();
        let cycles = build_cycles(month, Stem::Geng, DaYunDirection::Forward, 8, 8);
        assert_eq!(cycles.len(), 8);
        assert_eq!(cycles[0].pillar.hanzi(), "壬午");
        // 庚 is born in 巳: 午 is its bath, 未 its crown.
        assert_eq!(cycles[0].day_master_stage, LifeStage::Bath);
        assert_eq!(cycles[1].day_master_stage, LifeStage::Crown);
        assert_eq!(cycles[0].start_age, 8);
        assert_eq!(cycles[0].end_age, 17);
        for w in cycles.windows(2) {
            assert_eq!(w[0].end_age + 1, w[1].start_age);
        }
        let back = build_cycles(month, Stem::Geng, DaYunDirection::Reverse, 3, 3);
        assert_eq!(back[0].pillar.hanzi(), "庚辰");
        assert_eq!(back[2].pillar.hanzi(), "戊寅");
    }

    #[test]
    fn missing_terms_default_to_eight() {
        let month: StemBranch = "辛巳".parse().unwrap();
        let d = compute_dayun(
            dt(1990, 5, 15, 6),
            Stem::Geng,
            month,
            Stem::Geng,
            Gender::Male,
            &TermTable::default(),
            8,
            DEFAULT_START_AGE,
        )
        .unwrap();
        assert_eq!(d.qi_yun.start_age, 8);
        assert_eq!(d.qi_yun.source, StartAgeSource::Default);
        assert!(d.qi_yun.explanation.as_deref().unwrap().contains("next"));
        assert_eq!(d.cycles[0].start_age, 8);
    }

    #[test]
    fn forward_counts_to_next_term() {
        let birth = dt(1990, 5, 15, 6);
        let next = birth + Duration::days(21);
        let table = TermTable::new([
            event(SolarTerm::Lixia, dt(1990, 5, 5, 18)),
            event(SolarTerm::Xiaoman, dt(1990, 5, 21, 7)),
            event(SolarTerm::Mangzhong, next),
        ]);
        let month: StemBranch = "辛巳".parse().unwrap();
        let d = compute_dayun(birth, Stem::Geng, month, Stem::Geng, Gender::Male, &table, 8, 8).unwrap();
        assert_eq!(d.direction, DaYunDirection::Forward);
        assert_eq!(d.qi_yun.start_age, 7);
        assert!(matches!(
            d.qi_yun.source,
            StartAgeSource::SolarTerm {
                term: SolarTerm::Mangzhong,
                ..
            }
        ));
        assert_eq!(d.cycle_at_age(7).map(|c| c.order), Some(1));
        assert_eq!(d.cycle_at_age(17).map(|c| c.order), Some(2));
        assert!(d.cycle_at_age(3).is_none());
    }
}
