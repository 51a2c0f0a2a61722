//! Element distribution and day-master strength.
//!
//! Each stem and branch adds its element at a slot weight; each branch
//! also adds its hidden stems at half the slot weight times the hidden
//! weight. Totals are scaled by the month's seasonal multipliers, then:
//!
//! - ElementScore = adjusted totals normalized to 100
//! - strength = (same + generating) / all, in [0, 1]

use bazi_tables::{ALL_ELEMENTS, Branch, Element, ElementRelation, Stem, TenGod};
use serde::Serialize;

use crate::error::ChartError;
use crate::pillar::FourPillars;

/// Stem weights by role (year, month, day, hour).
pub const STEM_WEIGHTS: [f64; 4] = [1.0, 1.2, 1.0, 1.0];

/// Branch weights by role; the month branch commands the season.
pub const BRANCH_WEIGHTS: [f64; 4] = [1.0, 2.0, 1.0, 1.0];

/// Hidden stems count at this fraction of their branch's slot weight.
pub const HIDDEN_SCALE: f64 = 0.5;

/// Seasonal multipliers `[month branch][element]` (Wood, Fire, Earth,
/// Metal, Water): prosperous 1.4, strengthening 1.2, resting 1.0,
/// imprisoned 0.8, dead 0.7.
pub const SEASONAL_MULTIPLIERS: [[f64; 5]; 12] = [
    [1.2, 0.7, 0.8, 1.0, 1.4], // 子
    [0.8, 1.0, 1.4, 1.2, 0.7], // 丑
    [1.4, 1.2, 0.7, 0.8, 1.0], // 寅
    [1.4, 1.2, 0.7, 0.8, 1.0], // 卯
    [0.8, 1.0, 1.4, 1.2, 0.7], // 辰
    [1.0, 1.4, 1.2, 0.7, 0.8], // 巳
    [1.0, 1.4, 1.2, 0.7, 0.8], // 午
    [0.8, 1.0, 1.4, 1.2, 0.7], // 未
    [0.7, 0.8, 1.0, 1.4, 1.2], // 申
    [0.7, 0.8, 1.0, 1.4, 1.2], // 酉
    [0.8, 1.0, 1.4, 1.2, 0.7], // 戌
    [1.2, 0.7, 0.8, 1.0, 1.4], // 亥
];

const SUM_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Seasonal state
// ---------------------------------------------------------------------------

/// Standing of an element in the birth month (旺相休囚死).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalState {
    Prosperous,
    Strengthening,
    Resting,
    Imprisoned,
    Dead,
}

impl SeasonalState {
    /// State of `element` in the month ruled by `month_branch`.
    pub const fn of(month_branch: Branch, element: Element) -> Self {
        match month_branch.element().relation_to(element) {
            ElementRelation::Same => Self::Prosperous,
            ElementRelation::Generated => Self::Strengthening,
            ElementRelation::Generator => Self::Resting,
            ElementRelation::Controller => Self::Imprisoned,
            ElementRelation::Controlled => Self::Dead,
        }
    }

    pub const fn hanzi(self) -> &'static str {
        match self {
            Self::Prosperous => "旺",
            Self::Strengthening => "相",
            Self::Resting => "休",
            Self::Imprisoned => "囚",
            Self::Dead => "死",
        }
    }
}

// ---------------------------------------------------------------------------
// Element score
// ---------------------------------------------------------------------------

/// Percentage share of each element; the five values sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElementScore {
    pub wood: f64,
    pub fire: f64,
    pub earth: f64,
    pub metal: f64,
    pub water: f64,
}

impl ElementScore {
    fn from_array(v: [f64; 5]) -> Self {
        Self {
            wood: v[0],
            fire: v[1],
            earth: v[2],
            metal: v[3],
            water: v[4],
        }
    }

    pub const fn get(&self, element: Element) -> f64 {
        match element {
            Element::Wood => self.wood,
            Element::Fire => self.fire,
            Element::Earth => self.earth,
            Element::Metal => self.metal,
            Element::Water => self.water,
        }
    }

    pub fn total(&self) -> f64 {
        self.wood + self.fire + self.earth + self.metal + self.water
    }

    /// `(element, percent)` in generating order.
    pub fn iter(&self) -> impl Iterator<Item = (Element, f64)> + '_ {
        ALL_ELEMENTS.iter().map(move |e| (*e, self.get(*e)))
    }

    /// Element with the largest share (first in generating order on ties).
    pub fn strongest(&self) -> Element {
        self.iter()
            .fold((Element::Wood, f64::MIN), |best, (e, v)| if v > best.1 { (e, v) } else { best })
            .0
    }

    /// Element with the smallest share (first in generating order on ties).
    pub fn weakest(&self) -> Element {
        self.iter()
            .fold((Element::Wood, f64::MAX), |best, (e, v)| if v < best.1 { (e, v) } else { best })
            .0
    }

    /// Elements with no share at all.
    pub fn missing(&self) -> Vec<Element> {
        self.iter().filter(|(_, v)| *v <= 0.0).map(|(e, _)| e).collect()
    }
}

// ---------------------------------------------------------------------------
// Day-master strength
// ---------------------------------------------------------------------------

/// Qualitative band of the strength ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLabel {
    VeryStrong,
    Strong,
    Balanced,
    Weak,
    VeryWeak,
}

impl StrengthLabel {
    /// Band for a ratio in [0, 1].
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.65 {
            Self::VeryStrong
        } else if ratio >= 0.55 {
            Self::Strong
        } else if ratio >= 0.45 {
            Self::Balanced
        } else if ratio >= 0.35 {
            Self::Weak
        } else {
            Self::VeryWeak
        }
    }

    pub const fn hanzi(self) -> &'static str {
        match self {
            Self::VeryStrong => "极强",
            Self::Strong => "偏强",
            Self::Balanced => "中和",
            Self::Weak => "偏弱",
            Self::VeryWeak => "极弱",
        }
    }

    pub const fn is_strong(self) -> bool {
        matches!(self, Self::VeryStrong | Self::Strong)
    }

    pub const fn is_weak(self) -> bool {
        matches!(self, Self::VeryWeak | Self::Weak)
    }
}

/// Strength of the day master and the elements that balance it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayMasterStrength {
    pub day_master: Stem,
    pub element: Element,
    /// Seasonally adjusted weight of the same and generating elements.
    pub supporting: f64,
    /// Seasonally adjusted weight of the other three elements.
    pub opposing: f64,
    /// supporting / (supporting + opposing).
    pub ratio: f64,
    pub label: StrengthLabel,
    /// Standing of the day master's element in the birth month.
    pub seasonal_state: SeasonalState,
    /// Some branch hides a stem of the day master's element.
    pub rooted: bool,
    pub favorable: Vec<Element>,
    pub unfavorable: Vec<Element>,
}

/// Ten god of each stem and of each branch's primary hidden stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TenGodProfile {
    /// `None` in the day slot (the day master itself).
    pub stems: [Option<TenGod>; 4],
    pub branches: [TenGod; 4],
}

impl TenGodProfile {
    pub fn of(pillars: &FourPillars) -> Self {
        let dm = pillars.day_master();
        let stems = pillars.stems();
        let branches = pillars.branches();
        Self {
            stems: [
                Some(TenGod::of(dm, stems[0])),
                Some(TenGod::of(dm, stems[1])),
                None,
                Some(TenGod::of(dm, stems[3])),
            ],
            branches: branches.map(|b| TenGod::of(dm, b.main_stem())),
        }
    }
}

/// Output of the elemental scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementalAnalysis {
    pub score: ElementScore,
    /// Element totals before seasonal adjustment.
    pub raw: [f64; 5],
    pub strength: DayMasterStrength,
}

/// Element totals before seasonal adjustment.
pub fn raw_element_weights(pillars: &FourPillars) -> [f64; 5] {
    let mut raw = [0.0f64; 5];
    for (i, sb) in pillars.as_array().iter().enumerate() {
        raw[sb.stem().element().index() as usize] += STEM_WEIGHTS[i];
        let branch = sb.branch();
        raw[branch.element().index() as usize] += BRANCH_WEIGHTS[i];
        for h in branch.hidden_stems() {
            raw[h.stem.element().index() as usize] += BRANCH_WEIGHTS[i] * HIDDEN_SCALE * h.weight;
        }
    }
    raw
}

fn balancing_elements(dm: Element, label: StrengthLabel, score: &ElementScore) -> (Vec<Element>, Vec<Element>) {
    let output = dm.generates();
    let wealth = dm.controls();
    let officer = dm.controlled_by();
    let resource = dm.generated_by();
    if label.is_strong() {
        (vec![output, wealth, officer], vec![resource, dm])
    } else if label.is_weak() {
        (vec![resource, dm], vec![output, wealth, officer])
    } else {
        let weakest = score.weakest();
        let strongest = score.strongest();
        let unfavorable = if strongest == weakest { Vec::new() } else { vec![strongest] };
        (vec![weakest], unfavorable)
    }
}

/// Score the chart's elements and the day master's strength.
pub fn analyze_elements(pillars: &FourPillars) -> Result<ElementalAnalysis, ChartError> {
    let raw = raw_element_weights(pillars);
    let month_branch = pillars.month.branch();
    let season = SEASONAL_MULTIPLIERS[month_branch.index() as usize];

    let mut adjusted = [0.0f64; 5];
    for (i, v) in adjusted.iter_mut().enumerate() {
        *v = raw[i] * season[i];
    }
    let total: f64 = adjusted.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(ChartError::invariant(format!("element total {total} is not positive")));
    }

    let percent = adjusted.map(|v| v / total * 100.0);
    let score = ElementScore::from_array(percent);
    if (score.total() - 100.0).abs() > SUM_TOLERANCE {
        return Err(ChartError::invariant(format!(
            "element score sums to {}",
            score.total()
        )));
    }

    let dm = pillars.day_master();
    let dm_element = dm.element();
    let supporting =
        adjusted[dm_element.index() as usize] + adjusted[dm_element.generated_by().index() as usize];
    let opposing = total - supporting;
    let ratio = supporting / total;
    if !(0.0..=1.0).contains(&ratio) {
        return Err(ChartError::invariant(format!("strength ratio {ratio} outside [0, 1]")));
    }
    let label = StrengthLabel::from_ratio(ratio);
    let rooted = pillars
        .branches()
        .iter()
        .any(|b| b.hidden_stems().iter().any(|h| h.stem.element() == dm_element));
    let (favorable, unfavorable) = balancing_elements(dm_element, label, &score);

    Ok(ElementalAnalysis {
        score,
        raw,
        strength: DayMasterStrength {
            day_master: dm,
            element: dm_element,
            supporting,
            opposing,
            ratio,
            label,
            seasonal_state: SeasonalState::of(month_branch, dm_element),
            rooted,
            favorable,
            unfavorable,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazi_tables::{ALL_BRANCHES, StemBranch};

    fn chart(labels: [&str; 4]) -> FourPillars {
        let p = labels.map(|s| s.parse::<StemBranch>().unwrap());
        FourPillars::new(p[0], p[1], p[2], p[3])
    }

    #[test]
    fn multiplier_table_matches_seasonal_states() {
        for b in ALL_BRANCHES {
            for e in ALL_ELEMENTS {
                let expected = match SeasonalState::of(b, e) {
                    SeasonalState::Prosperous => 1.4,
                    SeasonalState::Strengthening => 1.2,
                    SeasonalState::Resting => 1.0,
                    SeasonalState::Imprisoned => 0.8,
                    SeasonalState::Dead => 0.7,
                };
                assert_eq!(SEASONAL_MULTIPLIERS[b.index() as usize][e.index() as usize], expected);
            }
        }
    }

    #[test]
    fn raw_weights_total() {
        // Stems 4.2 + branches 5.0 + hidden 5.0 × 0.5 = 11.7.
        let p = chart(["庚午", "辛巳", "庚辰", "癸未"]);
        let total: f64 = raw_element_weights(&p).iter().sum();
        assert!((total - 11.7).abs() < 1e-9, "got {total}");
    }

    #[test]
    fn score_sums_to_hundred() {
        let p = chart(["庚午", "辛巳", "庚辰", "癸未"]);
        let a = analyze_elements(&p).unwrap();
        assert!((a.score.total() - 100.0).abs() < 0.01);
        assert!((0.0..=1.0).contains(&a.strength.ratio));
        let s = &a.strength;
        assert!((s.ratio - s.supporting / (s.supporting + s.opposing)).abs() < 1e-12);
        // 0.468: balanced, so the weakest element (Wood) is favoured.
        assert_eq!(s.label, StrengthLabel::Balanced);
        assert_eq!(s.favorable, vec![Element::Wood]);
        assert_eq!(s.unfavorable, vec![Element::Fire]);
    }

    #[test]
    fn metal_heavy_chart_is_strong() {
        // 庚 day master in a 酉 month with metal and earth all around.
        let p = chart(["庚申", "乙酉", "庚申", "戊寅"]);
        let a = analyze_elements(&p).unwrap();
        assert_eq!(a.strength.element, Element::Metal);
        assert_eq!(a.strength.seasonal_state, SeasonalState::Prosperous);
        assert!(a.strength.label.is_strong(), "{:?}", a.strength);
        assert!(a.strength.rooted);
        assert!(a.strength.favorable.contains(&Element::Water));
        assert_eq!(a.score.strongest(), Element::Metal);
    }

    #[test]
    fn wood_day_master_in_autumn_is_weak() {
        let p = chart(["庚申", "乙酉", "甲申", "壬申"]);
        let a = analyze_elements(&p).unwrap();
        assert_eq!(a.strength.seasonal_state, SeasonalState::Dead);
        assert!(a.strength.ratio < 0.45, "{}", a.strength.ratio);
        assert!(a.strength.favorable.contains(&Element::Water));
    }

    #[test]
    fn labels_by_ratio() {
        assert_eq!(StrengthLabel::from_ratio(0.7), StrengthLabel::VeryStrong);
        assert_eq!(StrengthLabel::from_ratio(0.55), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::from_ratio(0.5), StrengthLabel::Balanced);
        assert_eq!(StrengthLabel::from_ratio(0.4), StrengthLabel::Weak);
        assert_eq!(StrengthLabel::from_ratio(0.0), StrengthLabel::VeryWeak);
    }

    #[test]
    fn ten_god_profile() {
        let p = chart(["庚午", "辛巳", "庚辰", "癸未"]);
        let g = TenGodProfile::of(&p);
        assert_eq!(g.stems[0], Some(TenGod::Companion));
        assert_eq!(g.stems[1], Some(TenGod::RobWealth));
        assert_eq!(g.stems[2], None);
        assert_eq!(g.stems[3], Some(TenGod::HurtingOfficer));
        // 午 hides 丁: yin fire controls yang metal.
        assert_eq!(g.branches[0], TenGod::DirectOfficer);
    }
}
