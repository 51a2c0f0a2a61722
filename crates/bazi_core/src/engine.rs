//! Chart engine: configuration plus shared reference data.

use std::sync::Arc;

use bazi_time::{
    LongitudeSource, MINUTES_PER_DEGREE, SolarTimeCorrection, correct_at_reference,
    correct_to_true_solar, reference_meridian_for_offset,
};
use chrono::{Duration, FixedOffset, NaiveDateTime};
use tracing::debug;

use crate::chart::{BirthInput, Chart, ChartNote, NoteKind};
use crate::config::EngineConfig;
use crate::dayun::compute_dayun;
use crate::error::ChartError;
use crate::pillar::{BoundarySource, compute_pillars};
use crate::reference::{ReferenceData, ReferenceHandle};
use crate::shensha;
use crate::strength::analyze_elements;

/// Chart engine.
///
/// `Engine` is [`Send`] + [`Sync`]. Each chart reads one snapshot of the
/// reference data, so [`Engine::reload`] never affects a chart already in
/// progress.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    reference: ReferenceHandle,
}

impl Engine {
    pub fn new(config: EngineConfig, reference: ReferenceData) -> Result<Self, ChartError> {
        config.validate()?;
        Ok(Self {
            config,
            reference: ReferenceHandle::new(reference),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reference data currently in force.
    pub fn reference(&self) -> Arc<ReferenceData> {
        self.reference.snapshot()
    }

    /// Replace the reference data for later charts. Returns the old data.
    pub fn reload(&self, reference: ReferenceData) -> Arc<ReferenceData> {
        self.reference.replace(reference)
    }

    /// Compute a chart against the current reference data.
    pub fn compute_chart(&self, input: &BirthInput) -> Result<Chart, ChartError> {
        let reference = self.reference.snapshot();
        self.compute_chart_with(input, &reference)
    }

    /// Compute a chart against explicit reference data.
    pub fn compute_chart_with(
        &self,
        input: &BirthInput,
        reference: &ReferenceData,
    ) -> Result<Chart, ChartError> {
        input.validate()?;
        let mut notes = Vec::new();

        let (birth_utc, reference_meridian) = self.locate_in_utc(input)?;
        let location = input
            .location
            .resolve(reference_meridian)
            .map_err(|e| ChartError::InvalidInput(e.to_string()))?;
        if let Some(reason) = &location.fallback_reason {
            notes.push(ChartNote::new(NoteKind::Location, reason.clone()));
        }

        let solar_time = if self.config.apply_solar_time {
            match location.source {
                LongitudeSource::ReferenceFallback => {
                    correct_at_reference(input.civil, reference_meridian)
                }
                LongitudeSource::Explicit | LongitudeSource::CityTable => {
                    correct_to_true_solar(input.civil, location.longitude, reference_meridian)
                }
            }
            .map_err(|e| ChartError::InvalidInput(e.to_string()))?
        } else {
            SolarTimeCorrection::uncorrected(
                input.civil,
                location.longitude,
                reference_meridian,
                "solar time correction disabled",
            )
        };
        if let Some(d) = &solar_time.diagnostic {
            notes.push(ChartNote::new(NoteKind::SolarTime, d.clone()));
        }

        // Term boundaries are compared on the same clock as day and hour.
        let solar_utc = birth_utc + (solar_time.corrected - solar_time.civil);
        let resolution = compute_pillars(solar_utc, solar_time.corrected, reference.terms())?;
        if resolution.boundary_source == BoundarySource::FixedDates {
            notes.push(ChartNote::new(
                NoteKind::MonthBoundary,
                format!(
                    "no solar-term data at {solar_utc} UTC; month opened by {} on its usual date",
                    resolution.month_term.term.hanzi()
                ),
            ));
        }

        let pillars = resolution.pillars;
        let elements = analyze_elements(&pillars)?;
        let shensha = shensha::evaluate(&pillars, reference.rules());

        let dayun = compute_dayun(
            solar_utc,
            pillars.year.stem(),
            pillars.month,
            pillars.day.stem(),
            input.gender,
            reference.terms(),
            self.config.dayun_cycles,
            self.config.default_start_age,
        )?;
        if let Some(e) = &dayun.qi_yun.explanation {
            notes.push(ChartNote::new(NoteKind::QiYun, e.clone()));
        }

        debug!(
            pillars = %pillars,
            label = ?elements.strength.label,
            markers = shensha.markers.len(),
            notes = notes.len(),
            "chart computed"
        );

        Ok(Chart::new(
            input.clone(),
            birth_utc,
            location,
            solar_time,
            resolution,
            elements,
            shensha,
            dayun,
            notes,
        ))
    }

    /// Birth instant in UTC and the meridian of the civil clock.
    fn locate_in_utc(&self, input: &BirthInput) -> Result<(NaiveDateTime, f64), ChartError> {
        let (offset_minutes, meridian) = match input.utc_offset_minutes {
            Some(m) => {
                let offset = FixedOffset::east_opt(m * 60).ok_or_else(|| {
                    ChartError::InvalidInput(format!("UTC offset {m} min is not representable"))
                })?;
                (i64::from(m), reference_meridian_for_offset(offset))
            }
            None => {
                let meridian = self.config.reference_meridian;
                ((meridian * MINUTES_PER_DEGREE).round() as i64, meridian)
            }
        };
        let utc = input
            .civil
            .checked_sub_signed(Duration::minutes(offset_minutes))
            .ok_or_else(|| {
                ChartError::InvalidInput(format!("{} is outside the calendar range", input.civil))
            })?;
        Ok((utc, meridian))
    }
}

#[cfg(test)]
mod tests {
    use bazi_time::{Location, TermTable};
    use chrono::NaiveDate;

    use super::*;
    use crate::dayun::Gender;
    use crate::shensha::RuleSet;

    fn civil(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn engine() -> Engine {
        Engine::new(
            EngineConfig::default(),
            ReferenceData::generated(1989..=1991).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn engine_rejects_bad_config() {
        let config = EngineConfig {
            dayun_cycles: 0,
            ..EngineConfig::default()
        };
        let data = ReferenceData::from_tables(TermTable::default(), RuleSet::default(), "empty");
        assert!(matches!(
            Engine::new(config, data),
            Err(ChartError::InvalidConfig(_))
        ));
    }

    #[test]
    fn implied_offset_follows_reference_meridian() {
        let e = engine();
        let input = BirthInput::new(civil(1990, 5, 15, 14, 30), Gender::Male);
        let (utc, meridian) = e.locate_in_utc(&input).unwrap();
        assert_eq!(utc, civil(1990, 5, 15, 6, 30));
        assert_eq!(meridian, 120.0);

        let tokyo = input.with_offset_minutes(540);
        let (utc, meridian) = e.locate_in_utc(&tokyo).unwrap();
        assert_eq!(utc, civil(1990, 5, 15, 5, 30));
        assert_eq!(meridian, 135.0);
    }

    #[test]
    fn invalid_longitude_rejected_before_pillars() {
        let input = BirthInput::new(civil(1990, 5, 15, 14, 30), Gender::Male)
            .with_location(Location::Longitude(190.0));
        assert!(matches!(
            engine().compute_chart(&input),
            Err(ChartError::InvalidInput(_))
        ));
    }

    #[test]
    fn disabled_solar_time_is_noted() {
        let config = EngineConfig {
            apply_solar_time: false,
            ..EngineConfig::default()
        };
        let e = Engine::new(config, ReferenceData::generated(1989..=1991).unwrap()).unwrap();
        let input = BirthInput::new(civil(1990, 5, 15, 14, 30), Gender::Male)
            .with_location(Location::Longitude(116.4));
        let chart = e.compute_chart(&input).unwrap();
        assert!(!chart.solar_time().correction_applied);
        assert_eq!(chart.solar_time().corrected, input.civil);
        assert!(chart.notes().iter().any(|n| n.kind == NoteKind::SolarTime));
    }

    #[test]
    fn missing_terms_degrade_with_notes() {
        let e = Engine::new(
            EngineConfig::default(),
            ReferenceData::from_tables(TermTable::default(), RuleSet::standard(), "no terms"),
        )
        .unwrap();
        let input = BirthInput::new(civil(1990, 5, 15, 14, 30), Gender::Male)
            .with_location(Location::Longitude(116.4));
        let chart = e.compute_chart(&input).unwrap();
        assert_eq!(chart.pillars().to_string(), "庚午 辛巳 庚辰 癸未");
        assert_eq!(chart.dayun().qi_yun.start_age, 8);
        let kinds: Vec<_> = chart.notes().iter().map(|n| n.kind).collect();
        assert!(kinds.contains(&NoteKind::MonthBoundary));
        assert!(kinds.contains(&NoteKind::QiYun));
        assert!(chart.is_degraded());
    }

    #[test]
    fn reload_swaps_rules_for_later_charts() {
        let e = engine();
        let input = BirthInput::new(civil(1990, 5, 15, 14, 30), Gender::Female)
            .with_location(Location::Longitude(116.4));
        let before = e.compute_chart(&input).unwrap();
        assert!(!before.markers().is_empty());

        let current = e.reference();
        e.reload(current.with_rules(Arc::new(RuleSet::default())));
        let after = e.compute_chart(&input).unwrap();
        assert!(after.markers().is_empty());
        assert_eq!(before.pillars(), after.pillars());
    }

    // Compile-time assertion: Engine must be Send + Sync.
    #[allow(dead_code)]
    const _: () = {
        fn assert_send_sync<T: Send + Sync>() {}
        fn check() {
            assert_send_sync::<Engine>();
        }
    };
}
