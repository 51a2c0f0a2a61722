//! The sexagenary (60-pair) cycle.
//!
//! Stems and branches advance in lockstep, so only same-parity pairs
//! occur. Index `i` has stem `i mod 10` and branch `i mod 12`; the inverse
//! is `(6·s − 5·b) mod 60`, which is exact for every same-parity pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::branch::Branch;
use crate::element::Element;
use crate::error::TableError;
use crate::stem::Stem;

/// A stem/branch pair drawn from the 60-cycle.
///
/// Only constructible from a valid index or a same-parity pair, so every
/// value is one of the 60 table entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StemBranch {
    stem: Stem,
    branch: Branch,
}

const fn build_cycle() -> [StemBranch; 60] {
    let mut out = [StemBranch {
        stem: Stem::Jia,
        branch: Branch::Zi,
    }; 60];
    let mut i = 0;
    while i < 60 {
        out[i] = StemBranch {
            stem: Stem::wrapping(i as i64),
            branch: Branch::wrapping(i as i64),
        };
        i += 1;
    }
    out
}

/// All 60 pairs in order (0 = 甲子, 59 = 癸亥).
pub const SEXAGENARY_CYCLE: [StemBranch; 60] = build_cycle();

impl StemBranch {
    /// Pair at a 0-based index, `None` when `index >= 60`.
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 60 {
            Some(SEXAGENARY_CYCLE[index as usize])
        } else {
            None
        }
    }

    /// Pair at any integer position, wrapped with floor modulo.
    pub const fn wrapping(n: i64) -> Self {
        SEXAGENARY_CYCLE[n.rem_euclid(60) as usize]
    }

    /// Pair from its parts, `None` when stem and branch differ in parity.
    pub const fn new(stem: Stem, branch: Branch) -> Option<Self> {
        if stem.index() % 2 == branch.index() % 2 {
            Some(Self { stem, branch })
        } else {
            None
        }
    }

    pub const fn stem(self) -> Stem {
        self.stem
    }

    pub const fn branch(self) -> Branch {
        self.branch
    }

    /// Position in the 60-cycle.
    pub const fn index(self) -> u8 {
        let s = self.stem.index() as i16;
        let b = self.branch.index() as i16;
        (6 * s - 5 * b).rem_euclid(60) as u8
    }

    /// Pair `n` places later in the cycle (negative moves back).
    pub const fn offset(self, n: i64) -> Self {
        Self::wrapping(self.index() as i64 + n)
    }

    /// Decade (旬) number 0..=5: 甲子旬 = 0 .. 甲寅旬 = 5.
    pub const fn xun(self) -> u8 {
        self.index() / 10
    }

    /// The two branches left uncovered by this pair's decade (空亡).
    pub const fn xun_kong(self) -> [Branch; 2] {
        let first = self.index() - self.stem.index();
        let base = Branch::wrapping(first as i64).index() as i64;
        [Branch::wrapping(base + 10), Branch::wrapping(base + 11)]
    }

    /// Na-yin element of this pair.
    pub const fn nayin(self) -> Nayin {
        NAYIN[(self.index() / 2) as usize]
    }

    /// Two-character label, e.g. `甲子`.
    pub fn hanzi(self) -> String {
        format!("{}{}", self.stem.hanzi(), self.branch.hanzi())
    }

    /// Pinyin label, e.g. `Jia-Zi`.
    pub fn name(self) -> String {
        format!("{}-{}", self.stem.name(), self.branch.name())
    }
}

impl fmt::Display for StemBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem.hanzi(), self.branch.hanzi())
    }
}

impl FromStr for StemBranch {
    type Err = TableError;

    /// Accepts `甲子`, `jia-zi`, `jia zi` or `JiaZi`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let bad = || TableError::unknown("pillar", s);
        let mut chars = t.chars();
        if let (Some(a), Some(b), None) = (chars.next(), chars.next(), chars.next()) {
            if !a.is_ascii() && !b.is_ascii() {
                let stem: Stem = a.to_string().parse().map_err(|_| bad())?;
                let branch: Branch = b.to_string().parse().map_err(|_| bad())?;
                return Self::new(stem, branch).ok_or_else(bad);
            }
        }
        let parts: Vec<&str> = t.split(['-', ' ', '_']).filter(|p| !p.is_empty()).collect();
        let (stem_str, branch_str) = match parts.as_slice() {
            [s, b] => (*s, *b),
            [joined] => {
                // CamelCase: split at the second uppercase letter.
                let split = joined
                    .char_indices()
                    .skip(1)
                    .find(|(_, c)| c.is_ascii_uppercase())
                    .map(|(i, _)| i)
                    .ok_or_else(bad)?;
                joined.split_at(split)
            }
            _ => return Err(bad()),
        };
        let stem: Stem = stem_str.parse().map_err(|_| bad())?;
        let branch: Branch = branch_str.parse().map_err(|_| bad())?;
        Self::new(stem, branch).ok_or_else(bad)
    }
}

impl Serialize for StemBranch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hanzi())
    }
}

impl<'de> Deserialize<'de> for StemBranch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Na-yin
// ---------------------------------------------------------------------------

/// Na-yin (纳音) sound element shared by each consecutive pair of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Nayin {
    pub element: Element,
    pub hanzi: &'static str,
    pub name: &'static str,
}

const fn ny(element: Element, hanzi: &'static str, name: &'static str) -> Nayin {
    Nayin {
        element,
        hanzi,
        name,
    }
}

/// Na-yin for cycle indices `2k` and `2k+1`.
pub const NAYIN: [Nayin; 30] = [
    ny(Element::Metal, "海中金", "Gold in the Sea"),
    ny(Element::Fire, "炉中火", "Fire in the Furnace"),
    ny(Element::Wood, "大林木", "Wood of the Great Forest"),
    ny(Element::Earth, "路旁土", "Earth by the Road"),
    ny(Element::Metal, "剑锋金", "Metal of the Sword Tip"),
    ny(Element::Fire, "山头火", "Fire on the Mountain"),
    ny(Element::Water, "涧下水", "Water in the Gully"),
    ny(Element::Earth, "城头土", "Earth on the City Wall"),
    ny(Element::Metal, "白蜡金", "White Wax Metal"),
    ny(Element::Wood, "杨柳木", "Willow Wood"),
    ny(Element::Water, "泉中水", "Water in the Spring"),
    ny(Element::Earth, "屋上土", "Earth on the Roof"),
    ny(Element::Fire, "霹雳火", "Thunderbolt Fire"),
    ny(Element::Wood, "松柏木", "Pine and Cypress Wood"),
    ny(Element::Water, "长流水", "Long Flowing Water"),
    ny(Element::Metal, "砂中金", "Gold in the Sand"),
    ny(Element::Fire, "山下火", "Fire at the Foot of the Mountain"),
    ny(Element::Wood, "平地木", "Wood of the Plains"),
    ny(Element::Earth, "壁上土", "Earth on the Wall"),
    ny(Element::Metal, "金箔金", "Gold Leaf Metal"),
    ny(Element::Fire, "覆灯火", "Lamp Fire"),
    ny(Element::Water, "天河水", "Water of the Milky Way"),
    ny(Element::Earth, "大驿土", "Earth of the Post Road"),
    ny(Element::Metal, "钗钏金", "Hairpin Metal"),
    ny(Element::Wood, "桑柘木", "Mulberry Wood"),
    ny(Element::Water, "大溪水", "Water of the Great Stream"),
    ny(Element::Earth, "沙中土", "Earth in the Sand"),
    ny(Element::Fire, "天上火", "Fire in the Sky"),
    ny(Element::Wood, "石榴木", "Pomegranate Wood"),
    ny(Element::Water, "大海水", "Water of the Great Sea"),
];
