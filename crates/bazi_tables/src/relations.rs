//! Combination, clash, harm and punishment tables between stems and
//! between branches.

use serde::{Deserialize, Serialize};

use crate::branch::Branch;
use crate::element::Element;
use crate::stem::Stem;

// ---------------------------------------------------------------------------
// Stems
// ---------------------------------------------------------------------------

/// Partner of a stem under the five combinations (甲己, 乙庚, 丙辛, 丁壬, 戊癸).
pub const fn stem_combination_partner(stem: Stem) -> Stem {
    stem.offset(5)
}

/// Element produced when two stems combine, `None` if they do not combine.
pub fn stem_combination(a: Stem, b: Stem) -> Option<Element> {
    if stem_combination_partner(a) != b {
        return None;
    }
    let element = match a.index() % 5 {
        0 => Element::Earth,
        1 => Element::Metal,
        2 => Element::Water,
        3 => Element::Wood,
        _ => Element::Fire,
    };
    Some(element)
}

/// Stem clashes: 甲庚, 乙辛, 丙壬, 丁癸.
///
/// Earth stems (戊己) sit at the centre and clash with nothing.
pub fn stems_clash(a: Stem, b: Stem) -> bool {
    let (lo, hi) = if a.index() <= b.index() {
        (a.index(), b.index())
    } else {
        (b.index(), a.index())
    };
    lo < 4 && hi == lo + 6
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

/// Partner of a branch under the six combinations (子丑, 寅亥, 卯戌, 辰酉, 巳申, 午未).
pub const fn branch_combination_partner(branch: Branch) -> Branch {
    Branch::wrapping(13 - branch.index() as i64)
}

/// Element produced by a six-combination, `None` if the pair does not combine.
pub fn branch_six_combination(a: Branch, b: Branch) -> Option<Element> {
    if branch_combination_partner(a) != b {
        return None;
    }
    let low = a.index().min(b.index());
    let element = match low {
        0 => Element::Earth,
        2 => Element::Wood,
        3 => Element::Fire,
        4 => Element::Metal,
        5 => Element::Water,
        // 午未 (6, 7)
        _ => Element::Earth,
    };
    Some(element)
}

/// Six clashes: branches six places apart (子午, 丑未, 寅申, 卯酉, 辰戌, 巳亥).
pub fn branches_clash(a: Branch, b: Branch) -> bool {
    (a.index() as i16 - b.index() as i16).rem_euclid(12) == 6
}

/// Six harms (子未, 丑午, 寅巳, 卯辰, 申亥, 酉戌).
pub fn branches_harm(a: Branch, b: Branch) -> bool {
    (a.index() + b.index()) % 12 == 7
}

/// Punishments (刑): the ungrateful 寅巳申, the bullying 丑戌未, the rude
/// 子卯, and self-punishment of 辰午酉亥.
pub fn branches_punish(a: Branch, b: Branch) -> bool {
    use Branch::*;
    let ordered = |x, y| (a == x && b == y) || (a == y && b == x);
    ordered(Yin, Si)
        || ordered(Si, Shen)
        || ordered(Shen, Yin)
        || ordered(Chou, Xu)
        || ordered(Xu, Wei)
        || ordered(Wei, Chou)
        || ordered(Zi, Mao)
        || (a == b && matches!(a, Chen | Wu | You | Hai))
}

/// One of the four three-harmony (三合) frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Triad {
    /// 申子辰
    Water,
    /// 亥卯未
    Wood,
    /// 寅午戌
    Fire,
    /// 巳酉丑
    Metal,
}

/// All four triads.
pub const ALL_TRIADS: [Triad; 4] = [Triad::Water, Triad::Wood, Triad::Fire, Triad::Metal];

impl Triad {
    /// Triad a branch belongs to.
    pub const fn of(branch: Branch) -> Self {
        match branch.index() % 4 {
            0 => Self::Water,
            1 => Self::Metal,
            2 => Self::Fire,
            _ => Self::Wood,
        }
    }

    /// Members as (birth, peak, tomb).
    pub const fn members(self) -> [Branch; 3] {
        use Branch::*;
        match self {
            Self::Water => [Shen, Zi, Chen],
            Self::Wood => [Hai, Mao, Wei],
            Self::Fire => [Yin, Wu, Xu],
            Self::Metal => [Si, You, Chou],
        }
    }

    pub const fn element(self) -> Element {
        match self {
            Self::Water => Element::Water,
            Self::Wood => Element::Wood,
            Self::Fire => Element::Fire,
            Self::Metal => Element::Metal,
        }
    }
}

/// Half three-harmony (半合): two distinct members of one triad, one of
/// them its peak branch (子午卯酉).
pub fn half_triad(a: Branch, b: Branch) -> Option<Element> {
    let triad = Triad::of(a);
    let peak = triad.members()[1];
    (a != b && Triad::of(b) == triad && (a == peak || b == peak)).then_some(triad.element())
}

/// Element of a complete three-harmony frame among `branches`, if any.
pub fn complete_triad(branches: &[Branch]) -> Option<Element> {
    ALL_TRIADS
        .iter()
        .find(|t| t.members().iter().all(|m| branches.contains(m)))
        .map(|t| t.element())
}

/// Element of a complete directional meeting (三会) among `branches`.
pub fn directional_meeting(branches: &[Branch]) -> Option<Element> {
    use Branch::*;
    const MEETINGS: [([Branch; 3], Element); 4] = [
        ([Yin, Mao, Chen], Element::Wood),
        ([Si, Wu, Wei], Element::Fire),
        ([Shen, You, Xu], Element::Metal),
        ([Hai, Zi, Chou], Element::Water),
    ];
    MEETINGS
        .iter()
        .find(|(set, _)| set.iter().all(|m| branches.contains(m)))
        .map(|(_, e)| *e)
}
