//! Chart input and the assembled result.

use bazi_time::{Location, ResolvedLocation, SolarTimeCorrection, parse_civil};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dayun::{DaYun, Gender, StartAgeSource};
use crate::error::ChartError;
use crate::natal::{NatalRelations, PillarDetail, natal_relations, pillar_details};
use crate::pillar::{FourPillars, PillarResolution};
use crate::shensha::{RuleWarning, ShenShaMarker, ShenShaOutcome};
use crate::strength::{DayMasterStrength, ElementScore, ElementalAnalysis, TenGodProfile};

/// Largest UTC offset accepted, in minutes (UTC±14:00).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// What the caller knows about the birth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthInput {
    /// Wall-clock time at the birth place.
    pub civil: NaiveDateTime,
    /// Offset of `civil` from UTC. When absent the engine's reference
    /// meridian implies one.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
    pub gender: Gender,
    #[serde(default)]
    pub location: Location,
}

impl BirthInput {
    pub fn new(civil: NaiveDateTime, gender: Gender) -> Self {
        Self {
            civil,
            utc_offset_minutes: None,
            gender,
            location: Location::Unspecified,
        }
    }

    pub fn with_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = Some(minutes);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Parse a timestamp such as `1990-05-15T14:30` or
    /// `1990-05-15T14:30:00+08:00`.
    pub fn parse(timestamp: &str, gender: Gender, location: Location) -> Result<Self, ChartError> {
        let (civil, offset) =
            parse_civil(timestamp).map_err(|e| ChartError::InvalidInput(e.to_string()))?;
        Ok(Self {
            civil,
            utc_offset_minutes: offset.map(|o| o.local_minus_utc() / 60),
            gender,
            location,
        })
    }

    pub(crate) fn validate(&self) -> Result<(), ChartError> {
        if let Some(m) = self.utc_offset_minutes {
            if m.abs() > MAX_UTC_OFFSET_MINUTES {
                return Err(ChartError::InvalidInput(format!(
                    "UTC offset {m} min is outside ±14:00"
                )));
            }
        }
        Ok(())
    }
}

/// What a note is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Longitude fell back to the reference meridian.
    Location,
    /// True solar time was not applied.
    SolarTime,
    /// Month boundary came from fixed dates.
    MonthBoundary,
    /// Qi-yun age was clamped or defaulted.
    QiYun,
}

/// A recovered condition recorded on the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartNote {
    pub kind: NoteKind,
    pub message: String,
}

impl ChartNote {
    pub fn new(kind: NoteKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A computed chart. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    input: BirthInput,
    birth_utc: NaiveDateTime,
    location: ResolvedLocation,
    solar_time: SolarTimeCorrection,
    resolution: PillarResolution,
    elements: ElementalAnalysis,
    ten_gods: TenGodProfile,
    details: [PillarDetail; 4],
    relations: NatalRelations,
    shensha: ShenShaOutcome,
    dayun: DaYun,
    notes: Vec<ChartNote>,
}

impl Chart {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        input: BirthInput,
        birth_utc: NaiveDateTime,
        location: ResolvedLocation,
        solar_time: SolarTimeCorrection,
        resolution: PillarResolution,
        elements: ElementalAnalysis,
        shensha: ShenShaOutcome,
        dayun: DaYun,
        notes: Vec<ChartNote>,
    ) -> Self {
        let ten_gods = TenGodProfile::of(&resolution.pillars);
        let details = pillar_details(&resolution.pillars);
        let relations = natal_relations(&resolution.pillars);
        Self {
            input,
            birth_utc,
            location,
            solar_time,
            resolution,
            elements,
            ten_gods,
            details,
            relations,
            shensha,
            dayun,
            notes,
        }
    }

    pub fn input(&self) -> &BirthInput {
        &self.input
    }

    pub fn gender(&self) -> Gender {
        self.input.gender
    }

    /// Civil birth instant in UTC.
    pub fn birth_utc(&self) -> NaiveDateTime {
        self.birth_utc
    }

    /// True solar birth instant on the UTC clock; solar-term boundaries
    /// are compared against this.
    pub fn solar_utc(&self) -> NaiveDateTime {
        self.birth_utc + (self.solar_time.corrected - self.solar_time.civil)
    }

    pub fn location(&self) -> &ResolvedLocation {
        &self.location
    }

    pub fn solar_time(&self) -> &SolarTimeCorrection {
        &self.solar_time
    }

    pub fn pillars(&self) -> &FourPillars {
        &self.resolution.pillars
    }

    /// Pillars together with the month boundary that produced them.
    pub fn resolution(&self) -> &PillarResolution {
        &self.resolution
    }

    pub fn element_score(&self) -> &ElementScore {
        &self.elements.score
    }

    pub fn strength(&self) -> &DayMasterStrength {
        &self.elements.strength
    }

    pub fn elements(&self) -> &ElementalAnalysis {
        &self.elements
    }

    pub fn ten_gods(&self) -> &TenGodProfile {
        &self.ten_gods
    }

    /// Na-yin and life stages per pillar, in chart order.
    pub fn pillar_details(&self) -> &[PillarDetail; 4] {
        &self.details
    }

    pub fn natal_relations(&self) -> &NatalRelations {
        &self.relations
    }

    /// Every marker, including those an interaction deactivated.
    pub fn markers(&self) -> &[ShenShaMarker] {
        &self.shensha.markers
    }

    pub fn active_markers(&self) -> impl Iterator<Item = &ShenShaMarker> {
        self.shensha.active()
    }

    pub fn rule_warnings(&self) -> &[RuleWarning] {
        &self.shensha.warnings
    }

    pub fn applied_interactions(&self) -> &[String] {
        &self.shensha.applied_interactions
    }

    pub fn dayun(&self) -> &DaYun {
        &self.dayun
    }

    pub fn notes(&self) -> &[ChartNote] {
        &self.notes
    }

    /// True when any reference data or input had to be substituted.
    pub fn is_degraded(&self) -> bool {
        self.notes.iter().any(|n| n.kind != NoteKind::QiYun)
            || matches!(self.dayun.qi_yun.source, StartAgeSource::Default)
            || !self.shensha.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_explicit_offset() {
        let input =
            BirthInput::parse("1990-05-15T14:30:00+09:00", Gender::Male, Location::Unspecified)
                .unwrap();
        assert_eq!(input.utc_offset_minutes, Some(540));
        assert_eq!(input.civil.format("%H:%M").to_string(), "14:30");
    }

    #[test]
    fn parse_rejects_bare_date() {
        let err = BirthInput::parse("1990-05-15", Gender::Female, Location::Unspecified)
            .unwrap_err();
        assert!(matches!(err, ChartError::InvalidInput(_)));
    }

    #[test]
    fn offset_out_of_range_is_invalid() {
        let input = BirthInput::parse("1990-05-15T14:30", Gender::Male, Location::Unspecified)
            .unwrap()
            .with_offset_minutes(15 * 60);
        assert!(matches!(input.validate(), Err(ChartError::InvalidInput(_))));
    }

    #[test]
    fn input_deserializes_with_defaults() {
        let input: BirthInput =
            serde_json::from_str(r#"{ "civil": "1990-05-15T14:30:00", "gender": "female" }"#)
                .unwrap();
        assert_eq!(input.location, Location::Unspecified);
        assert_eq!(input.utc_offset_minutes, None);
    }
}
