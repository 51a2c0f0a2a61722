//! Built-in rule set covering the commonly used markers.

use bazi_tables::{Branch, Season, Stem, StemBranch};

use super::rule::Symbol::{Branch as B, Stem as S};
use super::rule::{
    ActivationRule, CalcMethod, Condition, Effect, EffectAction, InteractionRule, MonthLookup,
    RuleSet, SeasonCase, StemLookup, Symbol, TriadTargets,
};
use crate::pillar::PillarRole;

use Branch::*;
use PillarRole::{Day, Hour, Year};

fn rule(
    key: &str,
    name: &str,
    description: &str,
    method: CalcMethod,
    favorable: &[&str],
    unfavorable: &[&str],
) -> ActivationRule {
    ActivationRule {
        key: key.into(),
        name: name.into(),
        description: description.into(),
        method,
        favorable_tags: favorable.iter().map(|t| t.to_string()).collect(),
        unfavorable_tags: unfavorable.iter().map(|t| t.to_string()).collect(),
    }
}

/// One target branch list per stem, in stem order.
fn stem_table(targets: [&[Branch]; 10]) -> Vec<StemLookup> {
    Stem::all()
        .iter()
        .zip(targets)
        .map(|(stem, branches)| StemLookup {
            stem: *stem,
            branches: branches.to_vec(),
        })
        .collect()
}

/// One target per month branch, starting from Yin.
fn month_table(targets: [Symbol; 12]) -> Vec<MonthLookup> {
    (0..12)
        .zip(targets)
        .map(|(i, target)| MonthLookup {
            month: Yin.offset(i),
            target,
        })
        .collect()
}

fn effect(target: &str, action: EffectAction) -> Effect {
    Effect {
        target: target.into(),
        action,
    }
}

fn tags(favorable: &[&str], unfavorable: &[&str]) -> EffectAction {
    EffectAction::AppendTags {
        favorable: favorable.iter().map(|t| t.to_string()).collect(),
        unfavorable: unfavorable.iter().map(|t| t.to_string()).collect(),
    }
}

fn heavenly_virtue() -> [Symbol; 12] {
    // 寅丁 卯申 辰壬 巳辛 午亥 未甲 申癸 酉寅 戌丙 亥乙 子巳 丑庚
    [
        S(Stem::Ding),
        B(Shen),
        S(Stem::Ren),
        S(Stem::Xin),
        B(Hai),
        S(Stem::Jia),
        S(Stem::Gui),
        B(Yin),
        S(Stem::Bing),
        S(Stem::Yi),
        B(Si),
        S(Stem::Geng),
    ]
}

fn activation_rules() -> Vec<ActivationRule> {
    vec![
        rule(
            "tianyi_guiren",
            "天乙贵人",
            "Nobleman star: help arrives from people of standing.",
            CalcMethod::StemToBranch {
                base: vec![Year, Day],
                // 甲戊庚牛羊 乙己鼠猴乡 丙丁猪鸡位 壬癸兔蛇藏 六辛逢马虎
                table: stem_table([
                    &[Chou, Wei],
                    &[Zi, Shen],
                    &[Hai, You],
                    &[Hai, You],
                    &[Chou, Wei],
                    &[Zi, Shen],
                    &[Chou, Wei],
                    &[Wu, Yin],
                    &[Mao, Si],
                    &[Mao, Si],
                ]),
            },
            &["nobility", "support"],
            &[],
        ),
        rule(
            "wenchang",
            "文昌",
            "Literary star: aptitude for study and writing.",
            CalcMethod::StemToBranch {
                base: vec![Year, Day],
                table: stem_table([
                    &[Si],
                    &[Wu],
                    &[Shen],
                    &[You],
                    &[Shen],
                    &[You],
                    &[Hai],
                    &[Zi],
                    &[Yin],
                    &[Mao],
                ]),
            },
            &["scholarship"],
            &[],
        ),
        rule(
            "lushen",
            "禄神",
            "Prosperity: the day master's own seat of office.",
            CalcMethod::StemToBranch {
                base: vec![Day],
                table: stem_table([
                    &[Yin],
                    &[Mao],
                    &[Si],
                    &[Wu],
                    &[Si],
                    &[Wu],
                    &[Shen],
                    &[You],
                    &[Hai],
                    &[Zi],
                ]),
            },
            &["wealth", "stability"],
            &[],
        ),
        rule(
            "yangren",
            "羊刃",
            "Blade: force and decisiveness, prone to excess.",
            CalcMethod::StemToBranch {
                base: vec![Day],
                table: stem_table([
                    &[Mao],
                    &[Chen],
                    &[Wu],
                    &[Wei],
                    &[Wu],
                    &[Wei],
                    &[You],
                    &[Xu],
                    &[Zi],
                    &[Chou],
                ]),
            },
            &["courage"],
            &["conflict", "injury"],
        ),
        rule(
            "taohua",
            "桃花",
            "Peach blossom: charm and attraction.",
            CalcMethod::Triad {
                base: vec![Year, Day],
                targets: TriadTargets {
                    water: You,
                    wood: Zi,
                    fire: Mao,
                    metal: Wu,
                },
                include_base: false,
            },
            &["charm"],
            &["romantic_entanglement"],
        ),
        rule(
            "yima",
            "驿马",
            "Traveling horse: movement, relocation and travel.",
            CalcMethod::Triad {
                base: vec![Year, Day],
                targets: TriadTargets {
                    water: Yin,
                    wood: Si,
                    fire: Shen,
                    metal: Hai,
                },
                include_base: false,
            },
            &["mobility"],
            &["instability"],
        ),
        rule(
            "huagai",
            "华盖",
            "Canopy: solitude, art and spiritual leaning.",
            CalcMethod::Triad {
                base: vec![Year, Day],
                targets: TriadTargets {
                    water: Chen,
                    wood: Wei,
                    fire: Xu,
                    metal: Chou,
                },
                include_base: false,
            },
            &["artistry", "spirituality"],
            &["isolation"],
        ),
        rule(
            "jiangxing",
            "将星",
            "General star: authority and leadership.",
            CalcMethod::Triad {
                base: vec![Year, Day],
                targets: TriadTargets {
                    water: Zi,
                    wood: Mao,
                    fire: Wu,
                    metal: You,
                },
                include_base: false,
            },
            &["leadership"],
            &[],
        ),
        rule(
            "kongwang",
            "空亡",
            "Void: what falls here is weakened or delayed.",
            CalcMethod::VoidBranches { base: Day },
            &[],
            &["emptiness"],
        ),
        rule(
            "kuigang",
            "魁罡",
            "Kui-gang day: strong will and sharp judgement.",
            CalcMethod::PillarMatch {
                roles: vec![Day],
                pillars: [
                    (Stem::Geng, Chen),
                    (Stem::Geng, Xu),
                    (Stem::Ren, Chen),
                    (Stem::Wu, Xu),
                ]
                    .into_iter()
                    .filter_map(|(s, b)| StemBranch::new(s, b))
                    .collect(),
            },
            &["authority"],
            &["stubbornness"],
        ),
        rule(
            "tiande",
            "天德",
            "Heavenly virtue: protection from misfortune.",
            CalcMethod::MonthBranchToSymbol {
                table: month_table(heavenly_virtue()),
            },
            &["protection"],
            &[],
        ),
        rule(
            "yuede",
            "月德",
            "Monthly virtue: kindness returned.",
            CalcMethod::MonthBranchToSymbol {
                // 寅午戌丙 申子辰壬 亥卯未甲 巳酉丑庚
                table: month_table([
                    S(Stem::Bing),
                    S(Stem::Jia),
                    S(Stem::Ren),
                    S(Stem::Geng),
                    S(Stem::Bing),
                    S(Stem::Jia),
                    S(Stem::Ren),
                    S(Stem::Geng),
                    S(Stem::Bing),
                    S(Stem::Jia),
                    S(Stem::Ren),
                    S(Stem::Geng),
                ]),
            },
            &["protection", "benevolence"],
            &[],
        ),
        rule(
            "tiande_he",
            "天德合",
            "Heavenly virtue combination: a softer form of heavenly virtue.",
            CalcMethod::MonthBranchCombination {
                table: month_table(heavenly_virtue()),
            },
            &["protection"],
            &[],
        ),
        rule(
            "tongzi",
            "童子",
            "Child star: sensitive constitution, late marriage.",
            CalcMethod::SeasonalBranch {
                roles: vec![Day, Hour],
                // 春秋寅子 冬夏卯未辰
                cases: vec![
                    SeasonCase {
                        seasons: vec![Season::Spring, Season::Autumn],
                        branches: vec![Yin, Zi],
                    },
                    SeasonCase {
                        seasons: vec![Season::Summer, Season::Winter],
                        branches: vec![Mao, Wei, Chen],
                    },
                ],
            },
            &[],
            &["fragility"],
        ),
    ]
}

fn interaction_rules() -> Vec<InteractionRule> {
    vec![
        InteractionRule {
            key: "guiren_tempers_kongwang".into(),
            requires: vec!["tianyi_guiren".into(), "kongwang".into()],
            condition: Condition::AllActive,
            effects: vec![
                effect("kongwang", EffectAction::MultiplyStrength { factor: 0.5 }),
                effect("kongwang", tags(&["tempered_by_nobleman"], &[])),
            ],
        },
        InteractionRule {
            key: "taohua_with_yima".into(),
            requires: vec!["taohua".into(), "yima".into()],
            condition: Condition::AllActive,
            effects: vec![
                effect("taohua", EffectAction::MultiplyStrength { factor: 1.5 }),
                effect("taohua", tags(&[], &["wandering_romance"])),
            ],
        },
        InteractionRule {
            key: "yangren_with_lushen".into(),
            requires: vec!["yangren".into(), "lushen".into()],
            condition: Condition::AllActive,
            effects: vec![
                effect("yangren", EffectAction::MultiplyStrength { factor: 0.5 }),
                effect("yangren", tags(&["disciplined_force"], &[])),
            ],
        },
        InteractionRule {
            key: "tiande_shields_month".into(),
            requires: vec!["tiande".into(), "yuede".into()],
            condition: Condition::AllActive,
            effects: vec![effect(
                "tiande",
                EffectAction::OverrideDescription {
                    description: "Heavenly and monthly virtue together: strong protection."
                        .into(),
                },
            )],
        },
    ]
}

impl RuleSet {
    /// The built-in markers and their interactions.
    pub fn standard() -> Self {
        Self::new(activation_rules(), interaction_rules())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::pillar::FourPillars;
    use crate::shensha::evaluate;

    fn chart(labels: [&str; 4]) -> FourPillars {
        let p: Vec<StemBranch> = labels.iter().map(|l| l.parse().unwrap()).collect();
        FourPillars::new(p[0], p[1], p[2], p[3])
    }

    #[test]
    fn keys_are_unique_and_interactions_resolve() {
        let rules = RuleSet::standard();
        let keys: HashSet<_> = rules.activation.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys.len(), rules.activation.len());
        assert_eq!(keys.len(), 14);
        for r in &rules.interaction {
            for k in r.requires.iter().chain(r.effects.iter().map(|e| &e.target)) {
                assert!(keys.contains(k.as_str()), "{} -> {k}", r.key);
            }
        }
    }

    #[test]
    fn kuigang_lists_four_days() {
        let rules = RuleSet::standard();
        let kuigang = rules.activation.iter().find(|r| r.key == "kuigang").unwrap();
        let CalcMethod::PillarMatch { pillars, .. } = &kuigang.method else {
            panic!("wrong method");
        };
        assert_eq!(pillars.len(), 4);
    }

    #[test]
    fn standard_set_on_golden_chart() {
        // 庚午 辛巳 庚辰 癸未
        let out = evaluate(&chart(["庚午", "辛巳", "庚辰", "癸未"]), &RuleSet::standard());
        assert!(out.warnings.is_empty());

        let guiren = out.marker("tianyi_guiren").unwrap();
        assert_eq!(guiren.positions, vec![Hour]);
        // Si month: heavenly virtue is Xin, on the month stem.
        assert_eq!(out.marker("tiande").unwrap().positions, vec![PillarRole::Month]);
        assert!(out.marker("kuigang").unwrap().active);
        // 庚辰 decade voids Shen and You: absent here.
        assert!(out.marker("kongwang").is_none());
        // Summer month: Chen day and Wei hour.
        assert_eq!(out.marker("tongzi").unwrap().positions, vec![Day, Hour]);
    }

    #[test]
    fn nobleman_tempers_void() {
        // Jia day voids Xu and Hai (甲子 decade); Jia's nobleman is at Chou/Wei.
        let out = evaluate(&chart(["辛亥", "庚子", "甲子", "辛未"]), &RuleSet::standard());
        let void = out.marker("kongwang").unwrap();
        assert_eq!(void.positions, vec![Year]);
        assert!(out.marker("tianyi_guiren").unwrap().active);
        assert!((void.strength - 0.5).abs() < 1e-12);
        assert!(void.favorable_tags.contains("tempered_by_nobleman"));
        assert!(
            out.applied_interactions
                .contains(&"guiren_tempers_kongwang".to_string())
        );
    }
}
