//! Phase 1: independent activation of each rule against the pillars.

use std::collections::{BTreeSet, HashSet};

use bazi_tables::{
    Branch, Stem, Triad, branch_combination_partner, stem_combination_partner,
};
use tracing::trace;

use super::rule::{ActivationRule, CalcMethod, Symbol};
use super::{RulePhase, RuleWarning, ShenShaMarker};
use crate::pillar::{ALL_ROLES, FourPillars, PillarRole};

/// Reason a method cannot be evaluated, if any.
pub(crate) fn check_method(method: &CalcMethod) -> Option<&'static str> {
    match method {
        CalcMethod::StemToBranch { base, .. }
        | CalcMethod::BranchToBranch { base, .. }
        | CalcMethod::Triad { base, .. } => {
            base.is_empty().then_some("method has no base pillar")
        }
        CalcMethod::PillarMatch { roles, .. } | CalcMethod::SeasonalBranch { roles, .. } => {
            roles.is_empty().then_some("method has no roles to inspect")
        }
        CalcMethod::VoidBranches { .. }
        | CalcMethod::MonthBranchToSymbol { .. }
        | CalcMethod::MonthBranchCombination { .. } => None,
    }
}

/// Roles at which `method` fires for `pillars`, in chart order.
pub fn triggered_positions(method: &CalcMethod, pillars: &FourPillars) -> Vec<PillarRole> {
    let mut hits = BTreeSet::new();
    match method {
        CalcMethod::StemToBranch { base, table } => {
            for role in base {
                let stem = pillars.get(*role).stem();
                let Some(entry) = table.iter().find(|e| e.stem == stem) else {
                    continue;
                };
                hits.extend(branch_hits(pillars, &entry.branches, None));
            }
        }
        CalcMethod::BranchToBranch {
            base,
            table,
            include_base,
        } => {
            for role in base {
                let branch = pillars.get(*role).branch();
                let Some(entry) = table.iter().find(|e| e.branch == branch) else {
                    continue;
                };
                let skip = (!include_base).then_some(*role);
                hits.extend(branch_hits(pillars, &entry.targets, skip));
            }
        }
        CalcMethod::Triad {
            base,
            targets,
            include_base,
        } => {
            for role in base {
                let target = targets.get(Triad::of(pillars.get(*role).branch()));
                let skip = (!include_base).then_some(*role);
                hits.extend(branch_hits(pillars, &[target], skip));
            }
        }
        CalcMethod::PillarMatch { roles, pillars: wanted } => {
            hits.extend(
                roles
                    .iter()
                    .copied()
                    .filter(|role| wanted.contains(&pillars.get(*role))),
            );
        }
        CalcMethod::VoidBranches { base } => {
            let void = pillars.get(*base).xun_kong();
            hits.extend(branch_hits(pillars, &void, Some(*base)));
        }
        CalcMethod::MonthBranchToSymbol { table } => {
            let month = pillars.month.branch();
            if let Some(entry) = table.iter().find(|e| e.month == month) {
                hits.extend(symbol_hits(pillars, entry.target));
            }
        }
        CalcMethod::MonthBranchCombination { table } => {
            let month = pillars.month.branch();
            if let Some(entry) = table.iter().find(|e| e.month == month) {
                hits.extend(symbol_hits(pillars, combination_partner(entry.target)));
            }
        }
        CalcMethod::SeasonalBranch { roles, cases } => {
            let season = pillars.month.branch().season();
            for case in cases.iter().filter(|c| c.seasons.contains(&season)) {
                hits.extend(
                    roles
                        .iter()
                        .copied()
                        .filter(|role| case.branches.contains(&pillars.get(*role).branch())),
                );
            }
        }
    }
    hits.into_iter().collect()
}

fn branch_hits<'a>(
    pillars: &'a FourPillars,
    targets: &'a [Branch],
    skip: Option<PillarRole>,
) -> impl Iterator<Item = PillarRole> + 'a {
    ALL_ROLES
        .into_iter()
        .filter(move |role| Some(*role) != skip)
        .filter(move |role| targets.contains(&pillars.get(*role).branch()))
}

fn stem_hits(pillars: &FourPillars, target: Stem) -> impl Iterator<Item = PillarRole> + '_ {
    ALL_ROLES
        .into_iter()
        .filter(move |role| pillars.get(*role).stem() == target)
}

fn symbol_hits(pillars: &FourPillars, target: Symbol) -> Vec<PillarRole> {
    match target {
        Symbol::Stem(stem) => stem_hits(pillars, stem).collect(),
        // The month branch selects the target; it does not count as a hit.
        Symbol::Branch(branch) => branch_hits(pillars, &[branch], Some(PillarRole::Month)).collect(),
    }
}

const fn combination_partner(target: Symbol) -> Symbol {
    match target {
        Symbol::Stem(stem) => Symbol::Stem(stem_combination_partner(stem)),
        Symbol::Branch(branch) => Symbol::Branch(branch_combination_partner(branch)),
    }
}

/// Evaluate every activation rule, in declaration order.
///
/// Rules that repeat an earlier key or cannot be evaluated are skipped and
/// reported in `warnings`. Returns the markers that fired.
pub(crate) fn activate(
    rules: &[ActivationRule],
    pillars: &FourPillars,
    warnings: &mut Vec<RuleWarning>,
) -> Vec<ShenShaMarker> {
    let mut seen = HashSet::with_capacity(rules.len());
    let mut markers = Vec::new();
    for rule in rules {
        if !seen.insert(rule.key.as_str()) {
            warnings.push(RuleWarning::new(
                &rule.key,
                RulePhase::Activation,
                "duplicate activation key",
            ));
            continue;
        }
        if let Some(reason) = check_method(&rule.method) {
            warnings.push(RuleWarning::new(&rule.key, RulePhase::Activation, reason));
            continue;
        }
        let positions = triggered_positions(&rule.method, pillars);
        trace!(rule = %rule.key, method = rule.method.name(), hits = positions.len(), "activation");
        if !positions.is_empty() {
            markers.push(ShenShaMarker::from_rule(rule, positions));
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use bazi_tables::{Season, StemBranch};

    use super::*;
    use crate::shensha::rule::{
        BranchLookup, MonthLookup, SeasonCase, StemLookup, TriadTargets,
    };

    fn chart(labels: [&str; 4]) -> FourPillars {
        let p: Vec<StemBranch> = labels.iter().map(|l| l.parse().unwrap()).collect();
        FourPillars::new(p[0], p[1], p[2], p[3])
    }

    #[test]
    fn stem_to_branch_checks_every_branch() {
        // Geng day master: nobleman at Chou and Wei.
        let method = CalcMethod::StemToBranch {
            base: vec![PillarRole::Day],
            table: vec![StemLookup {
                stem: Stem::Geng,
                branches: vec![Branch::Chou, Branch::Wei],
            }],
        };
        let p = chart(["庚午", "辛巳", "庚辰", "癸未"]);
        assert_eq!(triggered_positions(&method, &p), vec![PillarRole::Hour]);
    }

    #[test]
    fn branch_methods_skip_their_base() {
        let method = CalcMethod::BranchToBranch {
            base: vec![PillarRole::Year],
            table: vec![BranchLookup {
                branch: Branch::Wu,
                targets: vec![Branch::Wu],
            }],
            include_base: false,
        };
        let p = chart(["庚午", "辛巳", "庚辰", "壬午"]);
        assert_eq!(triggered_positions(&method, &p), vec![PillarRole::Hour]);

        let inclusive = CalcMethod::BranchToBranch {
            base: vec![PillarRole::Year],
            table: vec![BranchLookup {
                branch: Branch::Wu,
                targets: vec![Branch::Wu],
            }],
            include_base: true,
        };
        assert_eq!(
            triggered_positions(&inclusive, &p),
            vec![PillarRole::Year, PillarRole::Hour]
        );
    }

    #[test]
    fn triad_uses_frame_of_base() {
        // Peach blossom: Wu (fire frame) -> Mao.
        let method = CalcMethod::Triad {
            base: vec![PillarRole::Year],
            targets: TriadTargets {
                water: Branch::You,
                wood: Branch::Zi,
                fire: Branch::Mao,
                metal: Branch::Wu,
            },
            include_base: false,
        };
        assert_eq!(
            triggered_positions(&method, &chart(["庚午", "己卯", "庚辰", "癸未"])),
            vec![PillarRole::Month]
        );
        assert!(triggered_positions(&method, &chart(["庚午", "辛巳", "庚辰", "癸未"])).is_empty());
    }

    #[test]
    fn void_branches_of_day_decade() {
        // 庚辰 sits in the 甲戌 decade: void Shen and You.
        let method = CalcMethod::VoidBranches {
            base: PillarRole::Day,
        };
        let p = chart(["庚申", "乙酉", "庚辰", "癸未"]);
        assert_eq!(
            triggered_positions(&method, &p),
            vec![PillarRole::Year, PillarRole::Month]
        );
    }

    #[test]
    fn month_symbol_and_its_partner() {
        // Si month: heavenly virtue at Xin, its combination at Bing.
        let table = vec![MonthLookup {
            month: Branch::Si,
            target: Symbol::Stem(Stem::Xin),
        }];
        let p = chart(["庚午", "辛巳", "丙辰", "癸巳"]);
        assert_eq!(
            triggered_positions(&CalcMethod::MonthBranchToSymbol { table: table.clone() }, &p),
            vec![PillarRole::Month]
        );
        assert_eq!(
            triggered_positions(&CalcMethod::MonthBranchCombination { table }, &p),
            vec![PillarRole::Day]
        );
    }

    #[test]
    fn month_branch_target_ignores_month_itself() {
        let table = vec![MonthLookup {
            month: Branch::Si,
            target: Symbol::Branch(Branch::Si),
        }];
        let p = chart(["庚午", "辛巳", "丙辰", "癸巳"]);
        assert_eq!(
            triggered_positions(&CalcMethod::MonthBranchToSymbol { table }, &p),
            vec![PillarRole::Hour]
        );
    }

    #[test]
    fn seasonal_branch_picks_case_by_season() {
        let method = CalcMethod::SeasonalBranch {
            roles: vec![PillarRole::Day, PillarRole::Hour],
            cases: vec![
                SeasonCase {
                    seasons: vec![Season::Spring, Season::Autumn],
                    branches: vec![Branch::Yin, Branch::Zi],
                },
                SeasonCase {
                    seasons: vec![Season::Summer, Season::Winter],
                    branches: vec![Branch::Mao, Branch::Wei, Branch::Chen],
                },
            ],
        };
        // Summer month: Chen day and Wei hour both count.
        let p = chart(["庚午", "辛巳", "庚辰", "癸未"]);
        assert_eq!(
            triggered_positions(&method, &p),
            vec![PillarRole::Day, PillarRole::Hour]
        );
    }

    #[test]
    fn duplicate_and_empty_rules_are_skipped() {
        let rule = |key: &str, base: Vec<PillarRole>| ActivationRule {
            key: key.into(),
            name: key.into(),
            description: String::new(),
            method: CalcMethod::StemToBranch {
                base,
                table: vec![StemLookup {
                    stem: Stem::Geng,
                    branches: vec![Branch::Wei],
                }],
            },
            favorable_tags: vec![],
            unfavorable_tags: vec![],
        };
        let rules = vec![
            rule("a", vec![PillarRole::Day]),
            rule("a", vec![PillarRole::Day]),
            rule("b", vec![]),
        ];
        let mut warnings = Vec::new();
        let markers = activate(&rules, &chart(["庚午", "辛巳", "庚辰", "癸未"]), &mut warnings);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].key, "a");
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.phase == RulePhase::Activation));
    }
}
