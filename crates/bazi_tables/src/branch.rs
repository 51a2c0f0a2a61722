//! The twelve earthly branches and their hidden stems.
//!
//! Each branch conceals one to three stems. The weight of each hidden
//! stem follows the common 本气/中气/余气 split; the tier is derived from
//! the weight (≥ 0.6 primary, ≥ 0.3 secondary, otherwise residual).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::{Element, Polarity, Season};
use crate::error::TableError;
use crate::stem::Stem;

/// One of the 12 earthly branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Zi,
    Chou,
    Yin,
    Mao,
    Chen,
    Si,
    Wu,
    Wei,
    Shen,
    You,
    Xu,
    Hai,
}

/// All 12 branches in cycle order (0 = Zi).
pub const ALL_BRANCHES: [Branch; 12] = [
    Branch::Zi,
    Branch::Chou,
    Branch::Yin,
    Branch::Mao,
    Branch::Chen,
    Branch::Si,
    Branch::Wu,
    Branch::Wei,
    Branch::Shen,
    Branch::You,
    Branch::Xu,
    Branch::Hai,
];

/// Strength tier of a hidden stem within its branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenTier {
    Primary,
    Secondary,
    Residual,
}

impl HiddenTier {
    /// Tier for a raw hidden-stem weight.
    pub fn from_weight(weight: f64) -> Self {
        if weight >= 0.6 {
            Self::Primary
        } else if weight >= 0.3 {
            Self::Secondary
        } else {
            Self::Residual
        }
    }
}

/// A stem concealed in a branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HiddenStem {
    pub stem: Stem,
    /// Share of the branch's qi carried by this stem (weights sum to 1).
    pub weight: f64,
}

impl HiddenStem {
    const fn new(stem: Stem, weight: f64) -> Self {
        Self { stem, weight }
    }

    pub fn tier(&self) -> HiddenTier {
        HiddenTier::from_weight(self.weight)
    }
}

use Stem::*;

const ZI_HIDDEN: [HiddenStem; 1] = [HiddenStem::new(Gui, 1.0)];
const CHOU_HIDDEN: [HiddenStem; 3] = [
    HiddenStem::new(Ji, 0.6),
    HiddenStem::new(Gui, 0.3),
    HiddenStem::new(Xin, 0.1),
];
const YIN_HIDDEN: [HiddenStem; 3] = [
    HiddenStem::new(Jia, 0.6),
    HiddenStem::new(Bing, 0.3),
    HiddenStem::new(Stem::Wu, 0.1),
];
const MAO_HIDDEN: [HiddenStem; 1] = [HiddenStem::new(Yi, 1.0)];
const CHEN_HIDDEN: [HiddenStem; 3] = [
    HiddenStem::new(Stem::Wu, 0.6),
    HiddenStem::new(Yi, 0.3),
    HiddenStem::new(Gui, 0.1),
];
const SI_HIDDEN: [HiddenStem; 3] = [
    HiddenStem::new(Bing, 0.6),
    HiddenStem::new(Stem::Wu, 0.3),
    HiddenStem::new(Geng, 0.1),
];
const WU_HIDDEN: [HiddenStem; 2] = [HiddenStem::new(Ding, 0.7), HiddenStem::new(Ji, 0.3)];
const WEI_HIDDEN: [HiddenStem; 3] = [
    HiddenStem::new(Ji, 0.6),
    HiddenStem::new(Ding, 0.3),
    HiddenStem::new(Yi, 0.1),
];
const SHEN_HIDDEN: [HiddenStem; 3] = [
    HiddenStem::new(Geng, 0.6),
    HiddenStem::new(Ren, 0.3),
    HiddenStem::new(Stem::Wu, 0.1),
];
const YOU_HIDDEN: [HiddenStem; 1] = [HiddenStem::new(Xin, 1.0)];
const XU_HIDDEN: [HiddenStem; 3] = [
    HiddenStem::new(Stem::Wu, 0.6),
    HiddenStem::new(Xin, 0.3),
    HiddenStem::new(Ding, 0.1),
];
const HAI_HIDDEN: [HiddenStem; 2] = [HiddenStem::new(Ren, 0.7), HiddenStem::new(Jia, 0.3)];

impl Branch {
    /// 0-based cycle index (Zi=0 .. Hai=11).
    pub const fn index(self) -> u8 {
        match self {
            Self::Zi => 0,
            Self::Chou => 1,
            Self::Yin => 2,
            Self::Mao => 3,
            Self::Chen => 4,
            Self::Si => 5,
            Self::Wu => 6,
            Self::Wei => 7,
            Self::Shen => 8,
            Self::You => 9,
            Self::Xu => 10,
            Self::Hai => 11,
        }
    }

    /// Branch from a 0-based index.
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 12 {
            Some(ALL_BRANCHES[index as usize])
        } else {
            None
        }
    }

    /// Branch from any integer, wrapped with floor modulo.
    pub const fn wrapping(n: i64) -> Self {
        ALL_BRANCHES[n.rem_euclid(12) as usize]
    }

    /// Branch `n` places later in the cycle (negative moves back).
    pub const fn offset(self, n: i64) -> Self {
        Self::wrapping(self.index() as i64 + n)
    }

    /// Pinyin name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zi => "Zi",
            Self::Chou => "Chou",
            Self::Yin => "Yin",
            Self::Mao => "Mao",
            Self::Chen => "Chen",
            Self::Si => "Si",
            Self::Wu => "Wu",
            Self::Wei => "Wei",
            Self::Shen => "Shen",
            Self::You => "You",
            Self::Xu => "Xu",
            Self::Hai => "Hai",
        }
    }

    /// Chinese character.
    pub const fn hanzi(self) -> &'static str {
        match self {
            Self::Zi => "子",
            Self::Chou => "丑",
            Self::Yin => "寅",
            Self::Mao => "卯",
            Self::Chen => "辰",
            Self::Si => "巳",
            Self::Wu => "午",
            Self::Wei => "未",
            Self::Shen => "申",
            Self::You => "酉",
            Self::Xu => "戌",
            Self::Hai => "亥",
        }
    }

    /// Zodiac animal.
    pub const fn animal(self) -> &'static str {
        match self {
            Self::Zi => "Rat",
            Self::Chou => "Ox",
            Self::Yin => "Tiger",
            Self::Mao => "Rabbit",
            Self::Chen => "Dragon",
            Self::Si => "Snake",
            Self::Wu => "Horse",
            Self::Wei => "Goat",
            Self::Shen => "Monkey",
            Self::You => "Rooster",
            Self::Xu => "Dog",
            Self::Hai => "Pig",
        }
    }

    pub const fn element(self) -> Element {
        match self {
            Self::Yin | Self::Mao => Element::Wood,
            Self::Si | Self::Wu => Element::Fire,
            Self::Shen | Self::You => Element::Metal,
            Self::Hai | Self::Zi => Element::Water,
            Self::Chen | Self::Xu | Self::Chou | Self::Wei => Element::Earth,
        }
    }

    pub const fn polarity(self) -> Polarity {
        Polarity::from_index_parity(self.index())
    }

    /// Season of the solar month this branch rules.
    pub const fn season(self) -> Season {
        match self {
            Self::Yin | Self::Mao | Self::Chen => Season::Spring,
            Self::Si | Self::Wu | Self::Wei => Season::Summer,
            Self::Shen | Self::You | Self::Xu => Season::Autumn,
            Self::Hai | Self::Zi | Self::Chou => Season::Winter,
        }
    }

    /// Civil hours `[start, end)` covered by this double hour.
    /// Zi wraps midnight: `(23, 1)`.
    pub const fn hour_range(self) -> (u8, u8) {
        let start = (self.index() * 2 + 23) % 24;
        (start, (start + 2) % 24)
    }

    /// Branch of the double hour containing a civil hour (0..=23).
    pub const fn from_hour(hour: u32) -> Self {
        Self::wrapping(((hour as i64 + 1) / 2) % 12)
    }

    /// Hidden stems, strongest first.
    pub const fn hidden_stems(self) -> &'static [HiddenStem] {
        match self {
            Self::Zi => &ZI_HIDDEN,
            Self::Chou => &CHOU_HIDDEN,
            Self::Yin => &YIN_HIDDEN,
            Self::Mao => &MAO_HIDDEN,
            Self::Chen => &CHEN_HIDDEN,
            Self::Si => &SI_HIDDEN,
            Self::Wu => &WU_HIDDEN,
            Self::Wei => &WEI_HIDDEN,
            Self::Shen => &SHEN_HIDDEN,
            Self::You => &YOU_HIDDEN,
            Self::Xu => &XU_HIDDEN,
            Self::Hai => &HAI_HIDDEN,
        }
    }

    /// The primary (本气) hidden stem.
    pub const fn main_stem(self) -> Stem {
        self.hidden_stems()[0].stem
    }

    /// All 12 branches in order.
    pub const fn all() -> &'static [Branch; 12] {
        &ALL_BRANCHES
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hanzi())
    }
}

impl FromStr for Branch {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        ALL_BRANCHES
            .iter()
            .copied()
            .find(|x| x.name().eq_ignore_ascii_case(t) || x.hanzi() == t)
            .ok_or_else(|| TableError::unknown("branch", s))
    }
}
