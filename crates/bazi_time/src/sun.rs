//! Approximate solar-term instants from a low-precision solar theory.
//!
//! Apparent solar longitude follows the short series of Meeus,
//! *Astronomical Algorithms* ch. 25 (about 0.01°, so term instants land
//! within roughly fifteen minutes). ΔT is ignored: the Julian date is read
//! as UT. Tables built here are for charts where no published term table
//! is loaded; a published table should be preferred where available.

use std::ops::RangeInclusive;

use tracing::debug;

use crate::calendar::{civil_datetime, from_julian_date, julian_date};
use crate::error::TimeError;
use crate::solar_term::{ALL_SOLAR_TERMS, SolarTerm, SolarTermEvent, TermTable};

const J2000: f64 = 2_451_545.0;
const DAYS_PER_CENTURY: f64 = 36_525.0;
const TROPICAL_YEAR: f64 = 365.242_2;

/// Half-width of the bracket around the mean-sun estimate, in days.
const SEARCH_HALF_WIDTH_DAYS: f64 = 8.0;
const MAX_ITER: u32 = 60;
/// About 0.1 s.
const CONVERGENCE_DAYS: f64 = 1e-6;

/// Apparent geocentric solar longitude in degrees [0, 360).
pub fn apparent_solar_longitude(jd: f64) -> f64 {
    let t = (jd - J2000) / DAYS_PER_CENTURY;
    let l0 = 280.466_46 + 36_000.769_83 * t + 0.000_303_2 * t * t;
    let m = (357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t).to_radians();
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();
    let omega = (125.04 - 1_934.136 * t).to_radians();
    let lambda = l0 + c - 0.005_69 - 0.004_78 * omega.sin();
    lambda.rem_euclid(360.0)
}

/// Signed angular difference `a − b` folded into [-180, 180).
fn wrap_signed(a: f64, b: f64) -> f64 {
    (a - b + 180.0).rem_euclid(360.0) - 180.0
}

fn bisect_zero<F>(
    mut t_a: f64,
    mut f_a: f64,
    mut t_b: f64,
    max_iter: u32,
    convergence_days: f64,
    f_at: &F,
) -> f64
where
    F: Fn(f64) -> f64,
{
    for _ in 0..max_iter {
        let t_mid = 0.5 * (t_a + t_b);
        let f_mid = f_at(t_mid);

        if f_a * f_mid <= 0.0 {
            t_b = t_mid;
        } else {
            t_a = t_mid;
            f_a = f_mid;
        }

        if (t_b - t_a).abs() < convergence_days {
            break;
        }
    }
    0.5 * (t_a + t_b)
}

/// Julian date (UT) at which `term` begins in Gregorian `year`.
///
/// Xiaohan and Dahan fall in January of `year`; every other term follows
/// in the same calendar year.
pub fn solar_term_jd(year: i32, term: SolarTerm) -> Result<f64, TimeError> {
    let target = term.solar_longitude();
    let equinox = civil_datetime(year, 3, 20, 12, 0, 0)?;
    let degrees_from_equinox = if target >= 285.0 { target - 360.0 } else { target };
    let guess = julian_date(equinox) + degrees_from_equinox / 360.0 * TROPICAL_YEAR;

    let f = |jd: f64| wrap_signed(apparent_solar_longitude(jd), target);
    let t_a = guess - SEARCH_HALF_WIDTH_DAYS;
    let t_b = guess + SEARCH_HALF_WIDTH_DAYS;
    let f_a = f(t_a);
    let f_b = f(t_b);
    if f_a * f_b > 0.0 {
        return Err(TimeError::NoConvergence("solar longitude not bracketed"));
    }
    Ok(bisect_zero(t_a, f_a, t_b, MAX_ITER, CONVERGENCE_DAYS, &f))
}

/// UTC instant at which `term` begins in Gregorian `year`.
pub fn solar_term_event(year: i32, term: SolarTerm) -> Result<SolarTermEvent, TimeError> {
    let jd = solar_term_jd(year, term)?;
    Ok(SolarTermEvent {
        term,
        instant: from_julian_date(jd)?,
    })
}

/// Build a table holding all 24 terms of every year in `years`.
pub fn generate_term_table(years: RangeInclusive<i32>) -> Result<TermTable, TimeError> {
    debug!(start = years.start(), end = years.end(), "generating solar term table");
    let mut events = Vec::with_capacity(24 * years.clone().count());
    for year in years {
        for term in ALL_SOLAR_TERMS {
            events.push(solar_term_event(year, term)?);
        }
    }
    Ok(TermTable::new(events))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longitude_at_j2000() {
        // Meeus: about 280.4° at J2000.0.
        let l = apparent_solar_longitude(J2000);
        assert!((l - 280.37).abs() < 0.05, "got {l}");
    }

    #[test]
    fn wrap_signed_folds() {
        assert!((wrap_signed(1.0, 359.0) - 2.0).abs() < 1e-12);
        assert!((wrap_signed(359.0, 1.0) + 2.0).abs() < 1e-12);
        assert!(wrap_signed(10.0, 10.0).abs() < 1e-12);
    }

    #[test]
    fn term_hits_its_longitude() {
        for term in ALL_SOLAR_TERMS {
            let jd = solar_term_jd(2024, term).unwrap();
            let diff = wrap_signed(apparent_solar_longitude(jd), term.solar_longitude());
            assert!(diff.abs() < 1e-4, "{term:?}: {diff}");
        }
    }

    #[test]
    fn table_is_ordered_and_complete() {
        let table = generate_term_table(2023..=2024).unwrap();
        assert_eq!(table.len(), 48);
        assert_eq!(table.events()[0].term, SolarTerm::Xiaohan);
        assert_eq!(table.events()[47].term, SolarTerm::Dongzhi);
    }
}
