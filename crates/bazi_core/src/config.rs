//! Engine configuration.

use bazi_time::{DEFAULT_REFERENCE_MERIDIAN, MAX_REFERENCE_MERIDIAN};
use serde::{Deserialize, Serialize};

use crate::dayun::DEFAULT_START_AGE;
use crate::error::ChartError;

/// Tunables fixed at engine construction.
///
/// Deserializes with every field optional so a config file only needs the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Meridian of the civil time zone when the input has no UTC offset,
    /// degrees east. Bounded by [`MAX_REFERENCE_MERIDIAN`] like an offset
    /// given with the input.
    pub reference_meridian: f64,
    /// Correct civil time to true solar time before fixing day and hour.
    pub apply_solar_time: bool,
    /// Number of da-yun cycles to list.
    pub dayun_cycles: u8,
    /// Qi-yun age used when no adjacent sectional term is known.
    pub default_start_age: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_meridian: DEFAULT_REFERENCE_MERIDIAN,
            apply_solar_time: true,
            dayun_cycles: 8,
            default_start_age: DEFAULT_START_AGE,
        }
    }
}

impl EngineConfig {
    pub const MAX_DAYUN_CYCLES: u8 = 12;

    pub fn validate(&self) -> Result<(), ChartError> {
        if !self.reference_meridian.is_finite()
            || self.reference_meridian.abs() > MAX_REFERENCE_MERIDIAN
        {
            return Err(ChartError::InvalidConfig(
                "reference_meridian must be within [-210, 210]",
            ));
        }
        if self.dayun_cycles == 0 || self.dayun_cycles > Self::MAX_DAYUN_CYCLES {
            return Err(ChartError::InvalidConfig(
                "dayun_cycles must be between 1 and 12",
            ));
        }
        if self.default_start_age == 0 || self.default_start_age > 20 {
            return Err(ChartError::InvalidConfig(
                "default_start_age must be between 1 and 20",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad_meridian = EngineConfig {
            reference_meridian: 240.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            bad_meridian.validate(),
            Err(ChartError::InvalidConfig(_))
        ));

        let no_cycles = EngineConfig {
            dayun_cycles: 0,
            ..EngineConfig::default()
        };
        assert!(no_cycles.validate().is_err());

        let nan = EngineConfig {
            reference_meridian: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn meridian_bound_matches_utc_plus_14() {
        for reference_meridian in [210.0, -210.0, 195.0] {
            let cfg = EngineConfig {
                reference_meridian,
                ..EngineConfig::default()
            };
            assert!(cfg.validate().is_ok(), "{reference_meridian}");
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{ "dayun_cycles": 10 }"#).unwrap();
        assert_eq!(cfg.dayun_cycles, 10);
        assert_eq!(cfg.reference_meridian, DEFAULT_REFERENCE_MERIDIAN);
        assert!(cfg.apply_solar_time);
    }
}
