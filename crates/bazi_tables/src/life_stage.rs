//! Twelve life stages (十二长生) of a stem across the branches.
//!
//! Yang stems run forward from their birth branch, yin stems backward.

use serde::{Deserialize, Serialize};

use crate::branch::Branch;
use crate::stem::Stem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum LifeStage {
    Birth,
    Bath,
    Crown,
    Official,
    Peak,
    Decline,
    Sickness,
    Death,
    Tomb,
    Extinction,
    Conception,
    Nurture,
}

/// All 12 stages in order (0 = Birth).
pub const ALL_LIFE_STAGES: [LifeStage; 12] = [
    LifeStage::Birth,
    LifeStage::Bath,
    LifeStage::Crown,
    LifeStage::Official,
    LifeStage::Peak,
    LifeStage::Decline,
    LifeStage::Sickness,
    LifeStage::Death,
    LifeStage::Tomb,
    LifeStage::Extinction,
    LifeStage::Conception,
    LifeStage::Nurture,
];

/// Birth (长生) branch of each stem.
const fn birth_branch(stem: Stem) -> Branch {
    match stem {
        Stem::Jia => Branch::Hai,
        Stem::Yi => Branch::Wu,
        Stem::Bing | Stem::Wu => Branch::Yin,
        Stem::Ding | Stem::Ji => Branch::You,
        Stem::Geng => Branch::Si,
        Stem::Xin => Branch::Zi,
        Stem::Ren => Branch::Shen,
        Stem::Gui => Branch::Mao,
    }
}

impl LifeStage {
    /// Stage of `stem` when it sits on `branch`.
    pub const fn of(stem: Stem, branch: Branch) -> Self {
        let start = birth_branch(stem).index() as i64;
        let b = branch.index() as i64;
        let step = if stem.polarity().is_yang() {
            b - start
        } else {
            start - b
        };
        ALL_LIFE_STAGES[step.rem_euclid(12) as usize]
    }

    /// Branch where `stem` reaches this stage.
    pub const fn branch_for(self, stem: Stem) -> Branch {
        let start = birth_branch(stem).index() as i64;
        let n = self as i64;
        if stem.polarity().is_yang() {
            Branch::wrapping(start + n)
        } else {
            Branch::wrapping(start - n)
        }
    }

    pub const fn hanzi(self) -> &'static str {
        match self {
            Self::Birth => "长生",
            Self::Bath => "沐浴",
            Self::Crown => "冠带",
            Self::Official => "临官",
            Self::Peak => "帝旺",
            Self::Decline => "衰",
            Self::Sickness => "病",
            Self::Death => "死",
            Self::Tomb => "墓",
            Self::Extinction => "绝",
            Self::Conception => "胎",
            Self::Nurture => "养",
        }
    }

    /// Stages where the stem is considered rooted and vigorous.
    pub const fn is_prosperous(self) -> bool {
        matches!(self, Self::Birth | Self::Crown | Self::Official | Self::Peak)
    }
}
