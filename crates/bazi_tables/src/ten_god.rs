//! Ten gods (十神): the role another stem plays for the day master.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::ElementRelation;
use crate::stem::Stem;

/// Relation of a stem to the day master, split by polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenGod {
    /// 比肩
    Companion,
    /// 劫财
    RobWealth,
    /// 食神
    EatingGod,
    /// 伤官
    HurtingOfficer,
    /// 偏财
    IndirectWealth,
    /// 正财
    DirectWealth,
    /// 七杀
    SevenKillings,
    /// 正官
    DirectOfficer,
    /// 偏印
    IndirectResource,
    /// 正印
    DirectResource,
}

impl TenGod {
    /// Ten god of `other` as seen from `day_master`.
    pub const fn of(day_master: Stem, other: Stem) -> Self {
        let same = day_master.index() % 2 == other.index() % 2;
        match day_master.element().relation_to(other.element()) {
            ElementRelation::Same => {
                if same { Self::Companion } else { Self::RobWealth }
            }
            ElementRelation::Generated => {
                if same { Self::EatingGod } else { Self::HurtingOfficer }
            }
            ElementRelation::Controlled => {
                if same { Self::IndirectWealth } else { Self::DirectWealth }
            }
            ElementRelation::Controller => {
                if same { Self::SevenKillings } else { Self::DirectOfficer }
            }
            ElementRelation::Generator => {
                if same { Self::IndirectResource } else { Self::DirectResource }
            }
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Companion => "Companion",
            Self::RobWealth => "Rob Wealth",
            Self::EatingGod => "Eating God",
            Self::HurtingOfficer => "Hurting Officer",
            Self::IndirectWealth => "Indirect Wealth",
            Self::DirectWealth => "Direct Wealth",
            Self::SevenKillings => "Seven Killings",
            Self::DirectOfficer => "Direct Officer",
            Self::IndirectResource => "Indirect Resource",
            Self::DirectResource => "Direct Resource",
        }
    }

    pub const fn hanzi(self) -> &'static str {
        match self {
            Self::Companion => "比肩",
            Self::RobWealth => "劫财",
            Self::EatingGod => "食神",
            Self::HurtingOfficer => "伤官",
            Self::IndirectWealth => "偏财",
            Self::DirectWealth => "正财",
            Self::SevenKillings => "七杀",
            Self::DirectOfficer => "正官",
            Self::IndirectResource => "偏印",
            Self::DirectResource => "正印",
        }
    }

    /// Element relation group this god belongs to.
    pub const fn relation(self) -> ElementRelation {
        match self {
            Self::Companion | Self::RobWealth => ElementRelation::Same,
            Self::EatingGod | Self::HurtingOfficer => ElementRelation::Generated,
            Self::IndirectWealth | Self::DirectWealth => ElementRelation::Controlled,
            Self::SevenKillings | Self::DirectOfficer => ElementRelation::Controller,
            Self::IndirectResource | Self::DirectResource => ElementRelation::Generator,
        }
    }
}

impl fmt::Display for TenGod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hanzi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stem::ALL_STEMS;

    #[test]
    fn jia_day_master() {
        let dm = Stem::Jia;
        assert_eq!(TenGod::of(dm, Stem::Jia), TenGod::Companion);
        assert_eq!(TenGod::of(dm, Stem::Yi), TenGod::RobWealth);
        assert_eq!(TenGod::of(dm, Stem::Bing), TenGod::EatingGod);
        assert_eq!(TenGod::of(dm, Stem::Ding), TenGod::HurtingOfficer);
        assert_eq!(TenGod::of(dm, Stem::Wu), TenGod::IndirectWealth);
        assert_eq!(TenGod::of(dm, Stem::Ji), TenGod::DirectWealth);
        assert_eq!(TenGod::of(dm, Stem::Geng), TenGod::SevenKillings);
        assert_eq!(TenGod::of(dm, Stem::Xin), TenGod::DirectOfficer);
        assert_eq!(TenGod::of(dm, Stem::Ren), TenGod::IndirectResource);
        assert_eq!(TenGod::of(dm, Stem::Gui), TenGod::DirectResource);
    }

    #[test]
    fn every_day_master_sees_each_god_once() {
        for dm in ALL_STEMS {
            let mut gods: Vec<TenGod> = ALL_STEMS.iter().map(|s| TenGod::of(dm, *s)).collect();
            gods.sort_by_key(|g| g.name());
            gods.dedup();
            assert_eq!(gods.len(), 10, "{dm:?}");
        }
    }

    #[test]
    fn yin_day_master() {
        assert_eq!(TenGod::of(Stem::Xin, Stem::Bing), TenGod::DirectOfficer);
        assert_eq!(TenGod::of(Stem::Xin, Stem::Ding), TenGod::SevenKillings);
        assert_eq!(TenGod::of(Stem::Gui, Stem::Wu).relation(), ElementRelation::Controller);
    }
}
