//! Declarative shen-sha rules.
//!
//! Rule content is data: activation rules say where a marker appears,
//! interaction rules say how markers modify each other. Both deserialize
//! from JSON or TOML through serde.

use bazi_tables::{Branch, Season, Stem, StemBranch, Triad};
use serde::{Deserialize, Serialize};

use crate::pillar::PillarRole;

/// Target branches for one base stem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StemLookup {
    pub stem: Stem,
    pub branches: Vec<Branch>,
}

/// Target branches for one base branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchLookup {
    pub branch: Branch,
    pub targets: Vec<Branch>,
}

/// Target branch for each three-harmony frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriadTargets {
    /// 申子辰
    pub water: Branch,
    /// 亥卯未
    pub wood: Branch,
    /// 寅午戌
    pub fire: Branch,
    /// 巳酉丑
    pub metal: Branch,
}

impl TriadTargets {
    pub const fn get(&self, triad: Triad) -> Branch {
        match triad {
            Triad::Water => self.water,
            Triad::Wood => self.wood,
            Triad::Fire => self.fire,
            Triad::Metal => self.metal,
        }
    }
}

/// A stem or a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Stem(Stem),
    Branch(Branch),
}

/// Target symbol for one month branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthLookup {
    pub month: Branch,
    pub target: Symbol,
}

/// Branches that trigger in the given seasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonCase {
    pub seasons: Vec<Season>,
    pub branches: Vec<Branch>,
}

/// How an activation rule finds its marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalcMethod {
    /// Stem of a base pillar selects target branches anywhere in the chart.
    StemToBranch {
        base: Vec<PillarRole>,
        table: Vec<StemLookup>,
    },
    /// Branch of a base pillar selects target branches in the other pillars,
    /// or in all four when `include_base` is set.
    BranchToBranch {
        base: Vec<PillarRole>,
        table: Vec<BranchLookup>,
        #[serde(default)]
        include_base: bool,
    },
    /// Three-harmony frame of a base branch selects one target branch in
    /// the other pillars.
    Triad {
        base: Vec<PillarRole>,
        targets: TriadTargets,
        #[serde(default)]
        include_base: bool,
    },
    /// One of the listed pillars stands at one of the listed roles.
    PillarMatch {
        roles: Vec<PillarRole>,
        pillars: Vec<StemBranch>,
    },
    /// Void branches of the base pillar's decade appear in other pillars.
    VoidBranches { base: PillarRole },
    /// The month branch selects a stem or branch to look for.
    MonthBranchToSymbol { table: Vec<MonthLookup> },
    /// As `MonthBranchToSymbol`, but looks for the target's combination
    /// partner (stem five-combination, branch six-combination).
    MonthBranchCombination { table: Vec<MonthLookup> },
    /// Listed branches at listed roles, chosen by the birth season.
    SeasonalBranch {
        roles: Vec<PillarRole>,
        cases: Vec<SeasonCase>,
    },
}

impl CalcMethod {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::StemToBranch { .. } => "stem_to_branch",
            Self::BranchToBranch { .. } => "branch_to_branch",
            Self::Triad { .. } => "triad",
            Self::PillarMatch { .. } => "pillar_match",
            Self::VoidBranches { .. } => "void_branches",
            Self::MonthBranchToSymbol { .. } => "month_branch_to_symbol",
            Self::MonthBranchCombination { .. } => "month_branch_combination",
            Self::SeasonalBranch { .. } => "seasonal_branch",
        }
    }
}

/// Phase-1 rule: produces a marker when its method fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationRule {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub method: CalcMethod,
    #[serde(default)]
    pub favorable_tags: Vec<String>,
    #[serde(default)]
    pub unfavorable_tags: Vec<String>,
}

/// When an interaction rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Every required marker is present and active.
    #[default]
    AllActive,
    /// At least one required marker is present and active.
    AnyActive,
    /// All active, and they share at least one pillar.
    SharedPillar,
}

/// Change applied to a target marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectAction {
    Activate,
    Deactivate,
    Toggle,
    MultiplyStrength {
        factor: f64,
    },
    AppendTags {
        #[serde(default)]
        favorable: Vec<String>,
        #[serde(default)]
        unfavorable: Vec<String>,
    },
    OverrideDescription {
        description: String,
    },
}

/// One effect of an interaction rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub target: String,
    pub action: EffectAction,
}

/// Phase-2 rule: modifies markers when required markers co-occur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRule {
    pub key: String,
    pub requires: Vec<String>,
    #[serde(default)]
    pub condition: Condition,
    pub effects: Vec<Effect>,
}

/// Read-only source of both rule phases.
pub trait ShenShaRuleSource {
    fn activation_rules(&self) -> &[ActivationRule];

    /// In declaration order; evaluation preserves it.
    fn interaction_rules(&self) -> &[InteractionRule];
}

/// An owned rule set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub activation: Vec<ActivationRule>,
    #[serde(default)]
    pub interaction: Vec<InteractionRule>,
}

impl RuleSet {
    pub fn new(activation: Vec<ActivationRule>, interaction: Vec<InteractionRule>) -> Self {
        Self {
            activation,
            interaction,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.activation.is_empty() && self.interaction.is_empty()
    }
}

impl ShenShaRuleSource for RuleSet {
    fn activation_rules(&self) -> &[ActivationRule] {
        &self.activation
    }

    fn interaction_rules(&self) -> &[InteractionRule] {
        &self.interaction
    }
}
