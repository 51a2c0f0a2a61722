//! Birth location resolution.
//!
//! A location is an explicit longitude, a city name looked up in a small
//! built-in table, or nothing. Unknown names and missing locations fall
//! back to the reference meridian, which makes the longitude term of the
//! solar-time correction zero.

use serde::{Deserialize, Serialize};

use crate::error::TimeError;
use crate::solar_time::validate_longitude;

/// A city with its longitude in degrees east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub hanzi: &'static str,
    pub longitude: f64,
}

const fn city(name: &'static str, hanzi: &'static str, longitude: f64) -> City {
    City {
        name,
        hanzi,
        longitude,
    }
}

/// Built-in city table.
pub const CITIES: [City; 32] = [
    city("Beijing", "北京", 116.4074),
    city("Shanghai", "上海", 121.4737),
    city("Guangzhou", "广州", 113.2644),
    city("Shenzhen", "深圳", 114.0579),
    city("Hangzhou", "杭州", 120.1551),
    city("Nanjing", "南京", 118.7969),
    city("Wuhan", "武汉", 114.2619),
    city("Chengdu", "成都", 104.0668),
    city("Xi'an", "西安", 108.9402),
    city("Chongqing", "重庆", 106.5516),
    city("Tianjin", "天津", 117.2008),
    city("Shenyang", "沈阳", 123.4315),
    city("Changsha", "长沙", 112.9388),
    city("Jinan", "济南", 117.0009),
    city("Zhengzhou", "郑州", 113.6401),
    city("Harbin", "哈尔滨", 126.6366),
    city("Kunming", "昆明", 102.8329),
    city("Nanchang", "南昌", 115.8921),
    city("Fuzhou", "福州", 119.3063),
    city("Shijiazhuang", "石家庄", 114.5149),
    city("Taiyuan", "太原", 112.5489),
    city("Hohhot", "呼和浩特", 111.7519),
    city("Changchun", "长春", 125.3245),
    city("Nanning", "南宁", 108.3669),
    city("Yinchuan", "银川", 106.2309),
    city("Lanzhou", "兰州", 103.8236),
    city("Xining", "西宁", 101.7782),
    city("Urumqi", "乌鲁木齐", 87.6177),
    city("Lhasa", "拉萨", 91.1322),
    city("Taipei", "台北", 121.5598),
    city("Hong Kong", "香港", 114.1694),
    city("Macau", "澳门", 113.5491),
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Look up a city by English name (case, spaces and punctuation ignored)
/// or by Chinese name, with or without a trailing 市.
pub fn find_city(name: &str) -> Option<&'static City> {
    let trimmed = name.trim();
    let hanzi = trimmed.strip_suffix('市').unwrap_or(trimmed);
    let key = normalize(trimmed);
    CITIES
        .iter()
        .find(|c| c.hanzi == hanzi || normalize(c.name) == key)
}

/// Where the birth took place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Longitude in degrees east.
    Longitude(f64),
    /// Name resolved through the city table.
    Named(String),
    /// No location; the reference meridian is used.
    #[default]
    Unspecified,
}

/// How a longitude was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LongitudeSource {
    Explicit,
    CityTable,
    ReferenceFallback,
}

/// A resolved longitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub longitude: f64,
    pub source: LongitudeSource,
    /// Set when the reference meridian had to stand in.
    pub fallback_reason: Option<String>,
}

impl Location {
    /// Resolve to a longitude, falling back to `reference_meridian`.
    ///
    /// Only an explicit longitude can fail, and only when it is out of range.
    pub fn resolve(&self, reference_meridian: f64) -> Result<ResolvedLocation, TimeError> {
        match self {
            Self::Longitude(lon) => {
                validate_longitude(*lon)?;
                Ok(ResolvedLocation {
                    longitude: *lon,
                    source: LongitudeSource::Explicit,
                    fallback_reason: None,
                })
            }
            Self::Named(name) => match find_city(name) {
                Some(c) => Ok(ResolvedLocation {
                    longitude: c.longitude,
                    source: LongitudeSource::CityTable,
                    fallback_reason: None,
                }),
                None => Ok(ResolvedLocation {
                    longitude: reference_meridian,
                    source: LongitudeSource::ReferenceFallback,
                    fallback_reason: Some(format!(
                        "unknown location {name:?}; using reference meridian {reference_meridian}"
                    )),
                }),
            },
            Self::Unspecified => Ok(ResolvedLocation {
                longitude: reference_meridian,
                source: LongitudeSource::ReferenceFallback,
                fallback_reason: Some(format!(
                    "no location given; using reference meridian {reference_meridian}"
                )),
            }),
        }
    }
}
