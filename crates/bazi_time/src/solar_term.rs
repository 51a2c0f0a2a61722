//! The 24 solar terms and the narrow lookup interface the chart engine
//! uses to find term boundaries around an instant.
//!
//! Terms are numbered from 立春 (Start of Spring, 315° solar longitude) in
//! 15° steps. Even-numbered terms are the twelve sectional terms (节) that
//! open the solar months; odd-numbered ones are the mid-month terms (中气).
//!
//! All instants exchanged through [`SolarTermSource`] are UTC.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One of the 24 solar terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolarTerm {
    Lichun,
    Yushui,
    Jingzhe,
    Chunfen,
    Qingming,
    Guyu,
    Lixia,
    Xiaoman,
    Mangzhong,
    Xiazhi,
    Xiaoshu,
    Dashu,
    Liqiu,
    Chushu,
    Bailu,
    Qiufen,
    Hanlu,
    Shuangjiang,
    Lidong,
    Xiaoxue,
    Daxue,
    Dongzhi,
    Xiaohan,
    Dahan,
}

/// All 24 terms in order (0 = Lichun).
pub const ALL_SOLAR_TERMS: [SolarTerm; 24] = [
    SolarTerm::Lichun,
    SolarTerm::Yushui,
    SolarTerm::Jingzhe,
    SolarTerm::Chunfen,
    SolarTerm::Qingming,
    SolarTerm::Guyu,
    SolarTerm::Lixia,
    SolarTerm::Xiaoman,
    SolarTerm::Mangzhong,
    SolarTerm::Xiazhi,
    SolarTerm::Xiaoshu,
    SolarTerm::Dashu,
    SolarTerm::Liqiu,
    SolarTerm::Chushu,
    SolarTerm::Bailu,
    SolarTerm::Qiufen,
    SolarTerm::Hanlu,
    SolarTerm::Shuangjiang,
    SolarTerm::Lidong,
    SolarTerm::Xiaoxue,
    SolarTerm::Daxue,
    SolarTerm::Dongzhi,
    SolarTerm::Xiaohan,
    SolarTerm::Dahan,
];

const HANZI: [&str; 24] = [
    "立春", "雨水", "惊蛰", "春分", "清明", "谷雨", "立夏", "小满", "芒种", "夏至", "小暑", "大暑",
    "立秋", "处暑", "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至", "小寒", "大寒",
];

const NAMES: [&str; 24] = [
    "Start of Spring",
    "Rain Water",
    "Awakening of Insects",
    "Spring Equinox",
    "Clear and Bright",
    "Grain Rain",
    "Start of Summer",
    "Grain Full",
    "Grain in Ear",
    "Summer Solstice",
    "Minor Heat",
    "Major Heat",
    "Start of Autumn",
    "End of Heat",
    "White Dew",
    "Autumn Equinox",
    "Cold Dew",
    "Frost Descent",
    "Start of Winter",
    "Minor Snow",
    "Major Snow",
    "Winter Solstice",
    "Minor Cold",
    "Major Cold",
];

impl SolarTerm {
    /// 0-based index (Lichun=0 .. Dahan=23).
    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 24 {
            Some(ALL_SOLAR_TERMS[index as usize])
        } else {
            None
        }
    }

    pub const fn name(self) -> &'static str {
        NAMES[self as usize]
    }

    pub const fn hanzi(self) -> &'static str {
        HANZI[self as usize]
    }

    /// Apparent solar longitude of the term, in degrees [0, 360).
    pub const fn solar_longitude(self) -> f64 {
        ((315 + 15 * self.index() as u32) % 360) as f64
    }

    /// True for the twelve month-opening terms (节).
    pub const fn is_sectional(self) -> bool {
        self.index() % 2 == 0
    }

    /// Index 0..=11 of the solar month this term opens (0 = 寅 month),
    /// `None` for mid-month terms.
    pub const fn month_ordinal(self) -> Option<u8> {
        if self.is_sectional() {
            Some(self.index() / 2)
        } else {
            None
        }
    }

    /// Term following this one, wrapping Dahan → Lichun.
    pub const fn next(self) -> Self {
        ALL_SOLAR_TERMS[((self.index() + 1) % 24) as usize]
    }
}

impl fmt::Display for SolarTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hanzi())
    }
}

/// A term and the UTC instant it begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SolarTermEvent {
    pub term: SolarTerm,
    pub instant: NaiveDateTime,
}

/// Read-only source of solar-term boundaries.
///
/// An instant exactly on a boundary is *after* that term: `term_before`
/// includes it and `term_after` does not. Both return `None` when the
/// source cannot answer for that instant.
pub trait SolarTermSource {
    /// Latest term beginning at or before `instant`.
    fn term_before(&self, instant: NaiveDateTime) -> Option<SolarTermEvent>;

    /// Earliest term beginning strictly after `instant`.
    fn term_after(&self, instant: NaiveDateTime) -> Option<SolarTermEvent>;

    /// Latest sectional (month-opening) term at or before `instant`.
    fn sectional_before(&self, instant: NaiveDateTime) -> Option<SolarTermEvent> {
        let mut cursor = instant;
        for _ in 0..3 {
            let e = self.term_before(cursor)?;
            if e.term.is_sectional() {
                return Some(e);
            }
            cursor = e.instant - Duration::nanoseconds(1);
        }
        None
    }

    /// Earliest sectional term strictly after `instant`.
    fn sectional_after(&self, instant: NaiveDateTime) -> Option<SolarTermEvent> {
        let mut cursor = instant;
        for _ in 0..3 {
            let e = self.term_after(cursor)?;
            if e.term.is_sectional() {
                return Some(e);
            }
            cursor = e.instant;
        }
        None
    }
}

/// In-memory term table sorted by instant.
///
/// Coverage is `[first, last]`; queries outside it return `None` so a
/// stale or truncated table never answers with a distant term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<SolarTermEvent>", into = "Vec<SolarTermEvent>")]
pub struct TermTable {
    events: Vec<SolarTermEvent>,
}

impl TermTable {
    /// Build from events in any order; exact duplicates are dropped.
    pub fn new(events: impl IntoIterator<Item = SolarTermEvent>) -> Self {
        let mut events: Vec<SolarTermEvent> = events.into_iter().collect();
        events.sort_by_key(|e| (e.instant, e.term));
        events.dedup();
        Self { events }
    }

    pub fn events(&self) -> &[SolarTermEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// First and last covered instants.
    pub fn coverage(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.events.first()?.instant, self.events.last()?.instant))
    }

    /// The event for `term` in Gregorian `year`, if present.
    pub fn find(&self, year: i32, term: SolarTerm) -> Option<SolarTermEvent> {
        use chrono::Datelike;
        self.events
            .iter()
            .copied()
            .find(|e| e.term == term && e.instant.year() == year)
    }

    /// Merge another table into this one.
    pub fn extend(&mut self, other: &TermTable) {
        self.events.extend_from_slice(&other.events);
        self.events.sort_by_key(|e| (e.instant, e.term));
        self.events.dedup();
    }
}

impl From<Vec<SolarTermEvent>> for TermTable {
    fn from(events: Vec<SolarTermEvent>) -> Self {
        Self::new(events)
    }
}

impl From<TermTable> for Vec<SolarTermEvent> {
    fn from(table: TermTable) -> Self {
        table.events
    }
}

impl SolarTermSource for TermTable {
    fn term_before(&self, instant: NaiveDateTime) -> Option<SolarTermEvent> {
        let (_, last) = self.coverage()?;
        if instant > last {
            return None;
        }
        let n = self.events.partition_point(|e| e.instant <= instant);
        n.checked_sub(1).map(|i| self.events[i])
    }

    fn term_after(&self, instant: NaiveDateTime) -> Option<SolarTermEvent> {
        let (first, _) = self.coverage()?;
        if instant < first {
            return None;
        }
        let n = self.events.partition_point(|e| e.instant <= instant);
        self.events.get(n).copied()
    }
}

impl<T: SolarTermSource + ?Sized> SolarTermSource for &T {
    fn term_before(&self, instant: NaiveDateTime) -> Option<SolarTermEvent> {
        (**self).term_before(instant)
    }

    fn term_after(&self, instant: NaiveDateTime) -> Option<SolarTermEvent> {
        (**self).term_after(instant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample() -> TermTable {
        TermTable::new([
            SolarTermEvent { term: SolarTerm::Dahan, instant: at(2024, 1, 20, 14) },
            SolarTermEvent { term: SolarTerm::Xiaohan, instant: at(2024, 1, 5, 20) },
            SolarTermEvent { term: SolarTerm::Lichun, instant: at(2024, 2, 4, 8) },
            SolarTermEvent { term: SolarTerm::Yushui, instant: at(2024, 2, 19, 4) },
            SolarTermEvent { term: SolarTerm::Jingzhe, instant: at(2024, 3, 5, 2) },
        ])
    }

    #[test]
    fn longitudes_and_sections() {
        assert_eq!(SolarTerm::Lichun.solar_longitude(), 315.0);
        assert_eq!(SolarTerm::Chunfen.solar_longitude(), 0.0);
        assert_eq!(SolarTerm::Dongzhi.solar_longitude(), 270.0);
        assert!(SolarTerm::Xiaohan.is_sectional());
        assert!(!SolarTerm::Dahan.is_sectional());
        assert_eq!(SolarTerm::Xiaohan.month_ordinal(), Some(11));
        assert_eq!(SolarTerm::Daxue.month_ordinal(), Some(10));
        assert_eq!(SolarTerm::Dahan.next(), SolarTerm::Lichun);
        assert_eq!(SolarTerm::Qingming.hanzi(), "清明");
    }

    #[test]
    fn table_sorts_input() {
        let t = sample();
        assert_eq!(t.events()[0].term, SolarTerm::Xiaohan);
        assert_eq!(t.len(), 5);
        assert_eq!(t.find(2024, SolarTerm::Lichun).map(|e| e.instant), Some(at(2024, 2, 4, 8)));
    }

    #[test]
    fn boundary_counts_as_after() {
        let t = sample();
        let lichun = at(2024, 2, 4, 8);
        assert_eq!(t.term_before(lichun).unwrap().term, SolarTerm::Lichun);
        assert_eq!(t.term_after(lichun).unwrap().term, SolarTerm::Yushui);
        let just_before = lichun - Duration::seconds(1);
        assert_eq!(t.term_before(just_before).unwrap().term, SolarTerm::Dahan);
        assert_eq!(t.term_after(just_before).unwrap().term, SolarTerm::Lichun);
    }

    #[test]
    fn sectional_skips_mid_terms() {
        let t = sample();
        let mid_feb = at(2024, 2, 25, 0);
        assert_eq!(t.sectional_before(mid_feb).unwrap().term, SolarTerm::Lichun);
        assert_eq!(t.sectional_after(mid_feb).unwrap().term, SolarTerm::Jingzhe);
        let late_jan = at(2024, 1, 25, 0);
        assert_eq!(t.sectional_before(late_jan).unwrap().term, SolarTerm::Xiaohan);
        assert_eq!(t.sectional_after(late_jan).unwrap().term, SolarTerm::Lichun);
    }

    #[test]
    fn outside_coverage_is_none() {
        let t = sample();
        assert!(t.term_before(at(2023, 12, 31, 0)).is_none());
        assert!(t.term_before(at(2024, 6, 1, 0)).is_none());
        assert!(t.term_after(at(2024, 3, 5, 2)).is_none());
        assert!(t.term_after(at(2023, 1, 1, 0)).is_none());
        assert!(TermTable::default().term_before(at(2024, 1, 1, 0)).is_none());
    }
}
