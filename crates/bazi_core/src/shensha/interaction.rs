//! Phase 2: ordered interaction rules over the phase-1 markers.

use std::collections::BTreeSet;

use tracing::trace;

use super::rule::{Condition, Effect, EffectAction, InteractionRule};
use super::{RulePhase, RuleWarning, ShenShaMarker};
use crate::pillar::ALL_ROLES;

fn check_rule(rule: &InteractionRule, declared: &BTreeSet<&str>) -> Option<String> {
    if rule.requires.is_empty() {
        return Some("no required markers".into());
    }
    if let Some(key) = rule
        .requires
        .iter()
        .chain(rule.effects.iter().map(|e| &e.target))
        .find(|k| !declared.contains(k.as_str()))
    {
        return Some(format!("unknown marker key '{key}'"));
    }
    for effect in &rule.effects {
        if let EffectAction::MultiplyStrength { factor } = effect.action {
            if !factor.is_finite() || factor < 0.0 {
                return Some(format!("invalid strength factor {factor}"));
            }
        }
    }
    None
}

fn find<'a>(markers: &'a [ShenShaMarker], key: &str) -> Option<&'a ShenShaMarker> {
    markers.iter().find(|m| m.key == key)
}

fn is_active(markers: &[ShenShaMarker], key: &str) -> bool {
    find(markers, key).is_some_and(|m| m.active)
}

fn holds(condition: Condition, requires: &[String], markers: &[ShenShaMarker]) -> bool {
    match condition {
        Condition::AllActive => requires.iter().all(|k| is_active(markers, k)),
        Condition::AnyActive => requires.iter().any(|k| is_active(markers, k)),
        Condition::SharedPillar => {
            let Some(found) = requires
                .iter()
                .map(|k| find(markers, k).filter(|m| m.active))
                .collect::<Option<Vec<_>>>()
            else {
                return false;
            };
            ALL_ROLES
                .into_iter()
                .any(|role| found.iter().all(|m| m.at(role)))
        }
    }
}

fn apply_effect(effect: &Effect, markers: &mut [ShenShaMarker]) {
    let Some(marker) = markers.iter_mut().find(|m| m.key == effect.target) else {
        trace!(target_key = %effect.target, "effect target not present");
        return;
    };
    match &effect.action {
        EffectAction::Activate => marker.active = true,
        EffectAction::Deactivate => marker.active = false,
        EffectAction::Toggle => marker.active = !marker.active,
        EffectAction::MultiplyStrength { factor } => marker.strength *= factor,
        EffectAction::AppendTags {
            favorable,
            unfavorable,
        } => {
            marker.favorable_tags.extend(favorable.iter().cloned());
            marker.unfavorable_tags.extend(unfavorable.iter().cloned());
        }
        EffectAction::OverrideDescription { description } => {
            marker.description.clone_from(description);
        }
    }
}

/// Apply `rules` front to back. Returns the keys of rules that fired.
pub(crate) fn apply(
    rules: &[InteractionRule],
    declared: &BTreeSet<&str>,
    markers: &mut [ShenShaMarker],
    warnings: &mut Vec<RuleWarning>,
) -> Vec<String> {
    let mut applied = Vec::new();
    for rule in rules {
        if let Some(reason) = check_rule(rule, declared) {
            warnings.push(RuleWarning::new(&rule.key, RulePhase::Interaction, reason));
            continue;
        }
        if !holds(rule.condition, &rule.requires, markers) {
            continue;
        }
        for effect in &rule.effects {
            apply_effect(effect, markers);
        }
        trace!(rule = %rule.key, effects = rule.effects.len(), "interaction applied");
        applied.push(rule.key.clone());
    }
    applied
}
