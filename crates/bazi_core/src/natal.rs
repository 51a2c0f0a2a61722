//! Per-pillar detail and the relations between natal pillars.
//!
//! Each pillar carries its na-yin and the life stage of the day master and
//! of the year stem on its branch. Relations are found pairwise in chart
//! order (year before month before day before hour), plus the complete
//! three-harmony and directional frames across all four branches.

use bazi_tables::{
    Element, LifeStage, Nayin, StemBranch, branch_six_combination, branches_clash, branches_harm,
    branches_punish, complete_triad, directional_meeting, half_triad, stem_combination,
    stems_clash,
};
use serde::Serialize;

use crate::pillar::{ALL_ROLES, FourPillars, PillarRole};

/// One pillar with its derived attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PillarDetail {
    pub role: PillarRole,
    pub pillar: StemBranch,
    pub nayin: Nayin,
    /// Stage of the day stem on this pillar's branch.
    pub day_master_stage: LifeStage,
    /// Stage of the year stem on this pillar's branch.
    pub year_stem_stage: LifeStage,
}

/// Details for all four pillars in chart order.
pub fn pillar_details(pillars: &FourPillars) -> [PillarDetail; 4] {
    let day_master = pillars.day_master();
    let year_stem = pillars.year.stem();
    ALL_ROLES.map(|role| {
        let pillar = pillars.get(role);
        PillarDetail {
            role,
            pillar,
            nayin: pillar.nayin(),
            day_master_stage: LifeStage::of(day_master, pillar.branch()),
            year_stem_stage: LifeStage::of(year_stem, pillar.branch()),
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// 天干五合
    StemCombination,
    /// 天干相冲
    StemClash,
    /// 地支六合
    BranchCombination,
    /// 半合
    HalfTriad,
    /// 六冲
    BranchClash,
    /// 六害
    BranchHarm,
    /// 刑, including self-punishment
    BranchPunishment,
}

impl RelationKind {
    pub const fn hanzi(self) -> &'static str {
        match self {
            Self::StemCombination => "合",
            Self::StemClash => "冲",
            Self::BranchCombination => "六合",
            Self::HalfTriad => "半合",
            Self::BranchClash => "冲",
            Self::BranchHarm => "害",
            Self::BranchPunishment => "刑",
        }
    }
}

/// A relation between two natal pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NatalRelation {
    pub kind: RelationKind,
    /// The two pillars, earlier role first.
    pub roles: [PillarRole; 2],
    /// Element produced, for combinations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
}

/// Every relation found among the four pillars.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NatalRelations {
    pub pairs: Vec<NatalRelation>,
    /// Complete three-harmony (三合) frame.
    pub triad: Option<Element>,
    /// Complete directional meeting (三会).
    pub meeting: Option<Element>,
}

impl NatalRelations {
    pub fn of_kind(&self, kind: RelationKind) -> impl Iterator<Item = &NatalRelation> {
        self.pairs.iter().filter(move |r| r.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.triad.is_none() && self.meeting.is_none()
    }
}

/// Find stem and branch relations between every pair of pillars.
pub fn natal_relations(pillars: &FourPillars) -> NatalRelations {
    let mut pairs = Vec::new();
    for (i, &a) in ALL_ROLES.iter().enumerate() {
        for &b in &ALL_ROLES[i + 1..] {
            relate(pillars.get(a), pillars.get(b), [a, b], &mut pairs);
        }
    }
    let branches = pillars.branches();
    NatalRelations {
        pairs,
        triad: complete_triad(&branches),
        meeting: directional_meeting(&branches),
    }
}

fn relate(a: StemBranch, b: StemBranch, roles: [PillarRole; 2], out: &mut Vec<NatalRelation>) {
    let mut push = |kind, element| out.push(NatalRelation { kind, roles, element });
    let (sa, sb) = (a.stem(), b.stem());
    let (ba, bb) = (a.branch(), b.branch());

    if let Some(e) = stem_combination(sa, sb) {
        push(RelationKind::StemCombination, Some(e));
    }
    if stems_clash(sa, sb) {
        push(RelationKind::StemClash, None);
    }
    if let Some(e) = branch_six_combination(ba, bb) {
        push(RelationKind::BranchCombination, Some(e));
    }
    if let Some(e) = half_triad(ba, bb) {
        push(RelationKind::HalfTriad, Some(e));
    }
    if branches_clash(ba, bb) {
        push(RelationKind::BranchClash, None);
    }
    if branches_harm(ba, bb) {
        push(RelationKind::BranchHarm, None);
    }
    if branches_punish(ba, bb) {
        push(RelationKind::BranchPunishment, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pillars(text: &str) -> FourPillars {
        let p: Vec<StemBranch> = text.split(' ').map(|s| s.parse().unwrap()).collect();
        FourPillars::new(p[0], p[1], p[2], p[3])
    }

    #[test]
    fn details_carry_nayin_and_stages() {
        let d = pillar_details(&pillars("庚午 辛巳 庚辰 癸未"));
        let nayin: Vec<_> = d.iter().map(|x| x.nayin.hanzi).collect();
        assert_eq!(nayin, ["路旁土", "白蜡金", "白蜡金", "杨柳木"]);
        // 庚 is born in 巳 and runs forward.
        let stages: Vec<_> = d.iter().map(|x| x.day_master_stage).collect();
        assert_eq!(
            stages,
            [LifeStage::Bath, LifeStage::Birth, LifeStage::Nurture, LifeStage::Crown]
        );
        assert_eq!(d[0].role, PillarRole::Year);
        assert_eq!(d[3].pillar.to_string(), "癸未");
    }

    #[test]
    fn year_stem_stage_differs_from_day_master() {
        // 甲 year, 丙 day: 甲 is born in 亥, 丙 in 寅.
        let d = pillar_details(&pillars("甲子 丙寅 丙午 己亥"));
        assert_eq!(d[1].year_stem_stage, LifeStage::Official);
        assert_eq!(d[1].day_master_stage, LifeStage::Birth);
        assert_eq!(d[3].year_stem_stage, LifeStage::Birth);
        assert_eq!(d[2].day_master_stage, LifeStage::Peak);
    }

    #[test]
    fn wu_wei_combine_to_earth() {
        let r = natal_relations(&pillars("庚午 辛巳 庚辰 癸未"));
        assert_eq!(
            r.pairs,
            vec![NatalRelation {
                kind: RelationKind::BranchCombination,
                roles: [PillarRole::Year, PillarRole::Hour],
                element: Some(Element::Earth),
            }]
        );
        assert_eq!(r.triad, None);
        assert_eq!(r.meeting, Some(Element::Fire));
    }

    #[test]
    fn pairwise_relations_in_chart_order() {
        let r = natal_relations(&pillars("甲寅 己巳 庚申 丙子"));
        let found: Vec<_> = r.pairs.iter().map(|x| (x.kind, x.roles, x.element)).collect();
        use PillarRole::*;
        use RelationKind::*;
        assert_eq!(
            found,
            vec![
                (StemCombination, [Year, Month], Some(Element::Earth)),
                (BranchHarm, [Year, Month], None),
                (BranchPunishment, [Year, Month], None),
                (StemClash, [Year, Day], None),
                (BranchClash, [Year, Day], None),
                (BranchPunishment, [Year, Day], None),
                (BranchCombination, [Month, Day], Some(Element::Water)),
                (BranchPunishment, [Month, Day], None),
                (HalfTriad, [Day, Hour], Some(Element::Water)),
            ]
        );
        assert_eq!(r.of_kind(BranchPunishment).count(), 3);
        assert_eq!(r.triad, None);
    }

    #[test]
    fn repeated_branch_punishes_itself() {
        let r = natal_relations(&pillars("甲午 庚午 甲子 甲子"));
        assert!(
            r.of_kind(RelationKind::BranchPunishment)
                .any(|x| x.roles == [PillarRole::Year, PillarRole::Month])
        );
        // 子 does not punish itself.
        assert!(
            !r.of_kind(RelationKind::BranchPunishment)
                .any(|x| x.roles == [PillarRole::Day, PillarRole::Hour])
        );
        assert!(!r.is_empty());
    }
}
