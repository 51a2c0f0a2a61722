//! Shen-sha (神煞) markers from a two-phase declarative rule set.
//!
//! Phase 1 runs every activation rule independently against the four
//! pillars. Phase 2 walks the interaction rules front to back; each rule
//! sees the markers as left by the rules before it. Misconfigured rules
//! are skipped and reported as [`RuleWarning`]s; evaluation never fails.

mod activation;
mod interaction;
pub mod rule;
mod standard;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use activation::triggered_positions;
pub use rule::{
    ActivationRule, BranchLookup, CalcMethod, Condition, Effect, EffectAction, InteractionRule,
    MonthLookup, RuleSet, SeasonCase, ShenShaRuleSource, StemLookup, Symbol, TriadTargets,
};

use crate::pillar::{FourPillars, PillarRole};

/// A marker produced by an activation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShenShaMarker {
    pub key: String,
    pub name: String,
    /// Pillars that triggered the marker, in chart order.
    pub positions: Vec<PillarRole>,
    /// Never negative.
    pub strength: f64,
    pub active: bool,
    pub favorable_tags: BTreeSet<String>,
    pub unfavorable_tags: BTreeSet<String>,
    pub description: String,
}

impl ShenShaMarker {
    /// Fresh phase-1 marker at strength 1.0.
    pub fn from_rule(rule: &ActivationRule, positions: Vec<PillarRole>) -> Self {
        Self {
            key: rule.key.clone(),
            name: rule.name.clone(),
            positions,
            strength: 1.0,
            active: true,
            favorable_tags: rule.favorable_tags.iter().cloned().collect(),
            unfavorable_tags: rule.unfavorable_tags.iter().cloned().collect(),
            description: rule.description.clone(),
        }
    }

    pub fn at(&self, role: PillarRole) -> bool {
        self.positions.contains(&role)
    }
}

/// Which phase a warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePhase {
    Activation,
    Interaction,
}

/// A rule skipped because it could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleWarning {
    pub rule: String,
    pub phase: RulePhase,
    pub reason: String,
}

impl RuleWarning {
    pub fn new(rule: &str, phase: RulePhase, reason: impl Into<String>) -> Self {
        Self {
            rule: rule.to_owned(),
            phase,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            RulePhase::Activation => "activation",
            RulePhase::Interaction => "interaction",
        };
        write!(f, "{phase} rule '{}' skipped: {}", self.rule, self.reason)
    }
}

/// Result of evaluating a rule set against one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShenShaOutcome {
    /// Every marker phase 1 produced, active or not, in rule order.
    pub markers: Vec<ShenShaMarker>,
    pub warnings: Vec<RuleWarning>,
    /// Keys of interaction rules whose effects were applied, in order.
    pub applied_interactions: Vec<String>,
}

impl ShenShaOutcome {
    pub fn marker(&self, key: &str) -> Option<&ShenShaMarker> {
        self.markers.iter().find(|m| m.key == key)
    }

    pub fn active(&self) -> impl Iterator<Item = &ShenShaMarker> {
        self.markers.iter().filter(|m| m.active)
    }
}

/// Run both phases of `rules` against `pillars`.
pub fn evaluate(pillars: &FourPillars, rules: &dyn ShenShaRuleSource) -> ShenShaOutcome {
    let activation_rules = rules.activation_rules();
    let mut warnings = Vec::new();
    let mut markers = activation::activate(activation_rules, pillars, &mut warnings);

    let declared: BTreeSet<&str> = activation_rules.iter().map(|r| r.key.as_str()).collect();
    let applied = interaction::apply(
        rules.interaction_rules(),
        &declared,
        &mut markers,
        &mut warnings,
    );

    for w in &warnings {
        warn!(rule = %w.rule, reason = %w.reason, "shen-sha rule skipped");
    }
    debug!(
        markers = markers.len(),
        applied = applied.len(),
        warnings = warnings.len(),
        "shen-sha evaluated"
    );

    ShenShaOutcome {
        markers,
        warnings,
        applied_interactions: applied,
    }
}

#[cfg(test)]
mod tests {
    use bazi_tables::{Branch, Stem, StemBranch};

    use super::*;

    fn chart(labels: [&str; 4]) -> FourPillars {
        let p: Vec<StemBranch> = labels.iter().map(|l| l.parse().unwrap()).collect();
        FourPillars::new(p[0], p[1], p[2], p[3])
    }

    fn stem_rule(key: &str, stem: Stem, branch: Branch) -> ActivationRule {
        ActivationRule {
            key: key.into(),
            name: key.to_uppercase(),
            description: format!("{key} marker"),
            method: CalcMethod::StemToBranch {
                base: vec![PillarRole::Day],
                table: vec![StemLookup {
                    stem,
                    branches: vec![branch],
                }],
            },
            favorable_tags: vec![],
            unfavorable_tags: vec![],
        }
    }

    fn deactivate_x_tag_y() -> InteractionRule {
        InteractionRule {
            key: "x_and_y".into(),
            requires: vec!["x".into(), "y".into()],
            condition: Condition::AllActive,
            effects: vec![
                Effect {
                    target: "x".into(),
                    action: EffectAction::Deactivate,
                },
                Effect {
                    target: "y".into(),
                    action: EffectAction::AppendTags {
                        favorable: vec!["reinforced".into()],
                        unfavorable: vec![],
                    },
                },
            ],
        }
    }

    #[test]
    fn interaction_independent_of_discovery_order() {
        let p = chart(["庚午", "辛巳", "庚辰", "癸未"]);
        let x = stem_rule("x", Stem::Geng, Branch::Wu);
        let y = stem_rule("y", Stem::Geng, Branch::Wei);

        for activation in [vec![x.clone(), y.clone()], vec![y.clone(), x.clone()]] {
            let rules = RuleSet::new(activation, vec![deactivate_x_tag_y()]);
            let out = evaluate(&p, &rules);
            let mx = out.marker("x").unwrap();
            let my = out.marker("y").unwrap();
            assert!(!mx.active);
            assert!(my.active);
            assert!(my.favorable_tags.contains("reinforced"));
            assert_eq!(out.applied_interactions, vec!["x_and_y".to_string()]);
            assert!(out.warnings.is_empty());
        }
    }

    #[test]
    fn unknown_key_skips_only_that_rule() {
        let p = chart(["庚午", "辛巳", "庚辰", "癸未"]);
        let bad = InteractionRule {
            key: "bad".into(),
            requires: vec!["x".into(), "missing".into()],
            condition: Condition::AllActive,
            effects: vec![Effect {
                target: "x".into(),
                action: EffectAction::Deactivate,
            }],
        };
        let rules = RuleSet::new(
            vec![
                stem_rule("x", Stem::Geng, Branch::Wu),
                stem_rule("y", Stem::Geng, Branch::Wei),
            ],
            vec![bad, deactivate_x_tag_y()],
        );
        let out = evaluate(&p, &rules);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].rule, "bad");
        assert_eq!(out.warnings[0].phase, RulePhase::Interaction);
        assert_eq!(out.applied_interactions, vec!["x_and_y".to_string()]);
        assert!(!out.marker("x").unwrap().active);
    }

    #[test]
    fn declared_but_absent_marker_is_not_an_error() {
        // y is declared but Geng's Zi never appears.
        let p = chart(["庚午", "辛巳", "庚辰", "癸未"]);
        let rules = RuleSet::new(
            vec![
                stem_rule("x", Stem::Geng, Branch::Wu),
                stem_rule("y", Stem::Geng, Branch::Zi),
            ],
            vec![deactivate_x_tag_y()],
        );
        let out = evaluate(&p, &rules);
        assert!(out.warnings.is_empty());
        assert!(out.applied_interactions.is_empty());
        assert!(out.marker("x").unwrap().active);
        assert!(out.marker("y").is_none());
    }

    #[test]
    fn empty_rule_set_yields_nothing() {
        let out = evaluate(&chart(["庚午", "辛巳", "庚辰", "癸未"]), &RuleSet::default());
        assert_eq!(out, ShenShaOutcome::default());
    }

    #[test]
    fn warning_display_names_rule() {
        let w = RuleWarning::new("r", RulePhase::Interaction, "unknown marker key 'q'");
        assert_eq!(
            w.to_string(),
            "interaction rule 'r' skipped: unknown marker key 'q'"
        );
    }
}
