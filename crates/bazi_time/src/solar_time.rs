//! Civil time to true (apparent) solar time.
//!
//! corrected = civil + (longitude − reference) × 4 min/deg + EoT(day_of_year)
//!
//! The equation of time uses the common three-term approximation
//! (accurate to about half a minute), evaluated on the civil day of year.

use std::f64::consts::PI;

use chrono::{Duration, FixedOffset, NaiveDateTime};
use serde::Serialize;
use tracing::warn;

use crate::calendar::day_of_year;
use crate::error::TimeError;

/// Reference meridian of UTC+8.
pub const DEFAULT_REFERENCE_MERIDIAN: f64 = 120.0;

/// Minutes of clock time per degree of longitude.
pub const MINUTES_PER_DEGREE: f64 = 4.0;

/// Equation of time in minutes (apparent − mean solar time).
///
/// `B = 2π(doy − 81)/365`, `E = 9.87 sin 2B − 7.53 cos B − 1.5 sin B`.
pub fn equation_of_time_minutes(day_of_year: u32) -> f64 {
    let b = 2.0 * PI * (f64::from(day_of_year) - 81.0) / 365.0;
    9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin()
}

/// Reference meridian implied by a UTC offset (15° per hour).
pub fn reference_meridian_for_offset(offset: FixedOffset) -> f64 {
    f64::from(offset.local_minus_utc()) / 240.0
}

/// Reject non-finite longitudes and those outside [-180, 180].
pub fn validate_longitude(longitude: f64) -> Result<(), TimeError> {
    if longitude.is_finite() && (-180.0..=180.0).contains(&longitude) {
        Ok(())
    } else {
        Err(TimeError::InvalidLongitude(longitude))
    }
}

/// Widest clock meridian in use: UTC+14 keeps 210°E time.
pub const MAX_REFERENCE_MERIDIAN: f64 = 210.0;

fn validate_reference(reference: f64) -> Result<(), TimeError> {
    if reference.is_finite() && reference.abs() <= MAX_REFERENCE_MERIDIAN {
        Ok(())
    } else {
        Err(TimeError::InvalidReferenceMeridian(reference))
    }
}

/// Outcome of a solar-time correction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarTimeCorrection {
    /// Instant as read from the civil clock.
    pub civil: NaiveDateTime,
    /// True solar time, or `civil` when no correction was applied.
    pub corrected: NaiveDateTime,
    pub longitude: f64,
    pub reference_meridian: f64,
    /// (longitude − reference) × 4.
    pub longitude_offset_minutes: f64,
    pub equation_of_time_minutes: f64,
    /// False when `corrected == civil` because the correction was skipped.
    pub correction_applied: bool,
    /// Why the correction was skipped.
    pub diagnostic: Option<String>,
}

impl SolarTimeCorrection {
    /// A record that keeps the civil instant unchanged.
    pub fn uncorrected(
        civil: NaiveDateTime,
        longitude: f64,
        reference_meridian: f64,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self {
            civil,
            corrected: civil,
            longitude,
            reference_meridian,
            longitude_offset_minutes: 0.0,
            equation_of_time_minutes: 0.0,
            correction_applied: false,
            diagnostic: Some(diagnostic.into()),
        }
    }

    /// Total applied shift in minutes (zero when not applied).
    pub fn shift_minutes(&self) -> f64 {
        if self.correction_applied {
            self.longitude_offset_minutes + self.equation_of_time_minutes
        } else {
            0.0
        }
    }
}

/// Shift a civil instant to true solar time.
///
/// Out-of-range longitude or reference meridian is an error. Failures
/// after validation (non-finite shift, calendar overflow) return the civil
/// instant with `correction_applied = false` and a diagnostic.
pub fn correct_to_true_solar(
    civil: NaiveDateTime,
    longitude: f64,
    reference_meridian: f64,
) -> Result<SolarTimeCorrection, TimeError> {
    validate_longitude(longitude)?;
    validate_reference(reference_meridian)?;
    Ok(apply_shift(civil, longitude, reference_meridian))
}

/// Correction for a birth placed on the reference meridian itself.
///
/// Used when no longitude is known: the longitude term is zero and only
/// the equation of time applies. The meridian may lie past ±180° (UTC+13
/// and UTC+14 clocks), so only the reference bound is checked.
pub fn correct_at_reference(
    civil: NaiveDateTime,
    reference_meridian: f64,
) -> Result<SolarTimeCorrection, TimeError> {
    validate_reference(reference_meridian)?;
    Ok(apply_shift(civil, reference_meridian, reference_meridian))
}

fn apply_shift(civil: NaiveDateTime, longitude: f64, reference_meridian: f64) -> SolarTimeCorrection {
    let longitude_offset_minutes = (longitude - reference_meridian) * MINUTES_PER_DEGREE;
    let eot = equation_of_time_minutes(day_of_year(civil.date()));
    let total = longitude_offset_minutes + eot;

    if !total.is_finite() {
        warn!(longitude, reference_meridian, "solar time shift is not finite");
        return SolarTimeCorrection::uncorrected(
            civil,
            longitude,
            reference_meridian,
            "solar time shift is not finite",
        );
    }

    let millis = (total * 60_000.0).round() as i64;
    match civil.checked_add_signed(Duration::milliseconds(millis)) {
        Some(corrected) => SolarTimeCorrection {
            civil,
            corrected,
            longitude,
            reference_meridian,
            longitude_offset_minutes,
            equation_of_time_minutes: eot,
            correction_applied: true,
            diagnostic: None,
        },
        None => {
            warn!(%civil, millis, "corrected instant outside calendar range");
            SolarTimeCorrection::uncorrected(
                civil,
                longitude,
                reference_meridian,
                format!("shifting {civil} by {total:.2} min leaves the calendar range"),
            )
        }
    }
}
