//! The five elements, yin/yang polarity, and the generating and
//! controlling cycles between elements.
//!
//! Generating cycle: Wood → Fire → Earth → Metal → Water → Wood.
//! Controlling cycle: Wood → Earth → Water → Fire → Metal → Wood.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// One of the five elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

/// All 5 elements in generating order (0 = Wood).
pub const ALL_ELEMENTS: [Element; 5] = [
    Element::Wood,
    Element::Fire,
    Element::Earth,
    Element::Metal,
    Element::Water,
];

impl Element {
    /// 0-based index in generating order (Wood=0 .. Water=4).
    pub const fn index(self) -> u8 {
        match self {
            Self::Wood => 0,
            Self::Fire => 1,
            Self::Earth => 2,
            Self::Metal => 3,
            Self::Water => 4,
        }
    }

    /// Element from a 0-based index.
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 5 {
            Some(ALL_ELEMENTS[index as usize])
        } else {
            None
        }
    }

    /// English name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wood => "Wood",
            Self::Fire => "Fire",
            Self::Earth => "Earth",
            Self::Metal => "Metal",
            Self::Water => "Water",
        }
    }

    /// Chinese character.
    pub const fn hanzi(self) -> &'static str {
        match self {
            Self::Wood => "木",
            Self::Fire => "火",
            Self::Earth => "土",
            Self::Metal => "金",
            Self::Water => "水",
        }
    }

    const fn step(self, n: u8) -> Self {
        ALL_ELEMENTS[((self.index() + n) % 5) as usize]
    }

    /// The element this one generates (Wood → Fire).
    pub const fn generates(self) -> Self {
        self.step(1)
    }

    /// The element that generates this one (Fire ← Wood).
    pub const fn generated_by(self) -> Self {
        self.step(4)
    }

    /// The element this one controls (Wood → Earth).
    pub const fn controls(self) -> Self {
        self.step(2)
    }

    /// The element that controls this one (Wood ← Metal).
    pub const fn controlled_by(self) -> Self {
        self.step(3)
    }

    /// How `other` stands relative to `self`.
    pub const fn relation_to(self, other: Element) -> ElementRelation {
        match (other.index() + 5 - self.index()) % 5 {
            0 => ElementRelation::Same,
            1 => ElementRelation::Generated,
            2 => ElementRelation::Controlled,
            3 => ElementRelation::Controller,
            _ => ElementRelation::Generator,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Element {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        ALL_ELEMENTS
            .iter()
            .copied()
            .find(|e| e.name().eq_ignore_ascii_case(t) || e.hanzi() == t)
            .ok_or_else(|| TableError::unknown("element", s))
    }
}

/// Relation of a second element to a reference element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRelation {
    /// Same element.
    Same,
    /// Reference generates it (output).
    Generated,
    /// Reference controls it (wealth).
    Controlled,
    /// It controls the reference (officer).
    Controller,
    /// It generates the reference (resource).
    Generator,
}

/// Yin/yang polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    /// Polarity of an even (yang) or odd (yin) cycle index.
    pub const fn from_index_parity(index: u8) -> Self {
        if index % 2 == 0 { Self::Yang } else { Self::Yin }
    }

    pub const fn is_yang(self) -> bool {
        matches!(self, Self::Yang)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Yang => "Yang",
            Self::Yin => "Yin",
        }
    }
}

/// Season keyed by the month branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generating_cycle_closes() {
        let mut e = Element::Wood;
        for _ in 0..5 {
            e = e.generates();
        }
        assert_eq!(e, Element::Wood);
        assert_eq!(Element::Water.generates(), Element::Wood);
    }

    #[test]
    fn controlling_pairs() {
        assert_eq!(Element::Wood.controls(), Element::Earth);
        assert_eq!(Element::Earth.controls(), Element::Water);
        assert_eq!(Element::Water.controls(), Element::Fire);
        assert_eq!(Element::Fire.controls(), Element::Metal);
        assert_eq!(Element::Metal.controls(), Element::Wood);
        assert_eq!(Element::Wood.controlled_by(), Element::Metal);
        assert_eq!(Element::Fire.generated_by(), Element::Wood);
    }

    #[test]
    fn relation_to_covers_all_five() {
        let wood = Element::Wood;
        assert_eq!(wood.relation_to(Element::Wood), ElementRelation::Same);
        assert_eq!(wood.relation_to(Element::Fire), ElementRelation::Generated);
        assert_eq!(wood.relation_to(Element::Earth), ElementRelation::Controlled);
        assert_eq!(wood.relation_to(Element::Metal), ElementRelation::Controller);
        assert_eq!(wood.relation_to(Element::Water), ElementRelation::Generator);
    }

    #[test]
    fn parse_accepts_hanzi_and_name() {
        assert_eq!("metal".parse::<Element>(), Ok(Element::Metal));
        assert_eq!("水".parse::<Element>(), Ok(Element::Water));
        assert!("stone".parse::<Element>().is_err());
    }

    #[test]
    fn from_index_bounds() {
        assert_eq!(Element::from_index(4), Some(Element::Water));
        assert_eq!(Element::from_index(5), None);
    }
}
