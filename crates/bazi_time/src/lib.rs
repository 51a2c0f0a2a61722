//! Time handling for sexagenary charts.
//!
//! This crate provides:
//! - Julian day numbers and civil timestamp parsing
//! - Civil → true solar time correction with an explicit applied flag
//! - Birth location resolution through a built-in city table
//! - The 24 solar terms, the `SolarTermSource` lookup trait and an
//!   in-memory `TermTable`
//! - An approximate solar-term generator for when no published table is loaded

pub mod calendar;
pub mod error;
pub mod location;
pub mod solar_term;
pub mod solar_time;
pub mod sun;

pub use calendar::{
    civil_datetime, day_of_year, from_julian_date, julian_date, julian_day_number, parse_civil,
};
pub use error::TimeError;
pub use location::{CITIES, City, Location, LongitudeSource, ResolvedLocation, find_city};
pub use solar_term::{ALL_SOLAR_TERMS, SolarTerm, SolarTermEvent, SolarTermSource, TermTable};
pub use solar_time::{
    DEFAULT_REFERENCE_MERIDIAN, MAX_REFERENCE_MERIDIAN, MINUTES_PER_DEGREE, SolarTimeCorrection,
    correct_at_reference, correct_to_true_solar, equation_of_time_minutes,
    reference_meridian_for_offset, validate_longitude,
};
pub use sun::{apparent_solar_longitude, generate_term_table, solar_term_event, solar_term_jd};
