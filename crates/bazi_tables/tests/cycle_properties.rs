//! Property tests for the sexagenary cycle and relation tables.

use bazi_tables::{
    Branch, Stem, StemBranch, branch_combination_partner, branches_clash,
    stem_combination_partner,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn property_wrapping_matches_floor_mod(n in -100_000i64..100_000) {
        let sb = StemBranch::wrapping(n);
        prop_assert_eq!(i64::from(sb.index()), n.rem_euclid(60));
        prop_assert_eq!(i64::from(sb.stem().index()), n.rem_euclid(10));
        prop_assert_eq!(i64::from(sb.branch().index()), n.rem_euclid(12));
    }

    #[test]
    fn property_offset_composes(start in 0u8..60, a in -500i64..500, b in -500i64..500) {
        let sb = StemBranch::from_index(start).unwrap();
        prop_assert_eq!(sb.offset(a).offset(b), sb.offset(a + b));
    }

    #[test]
    fn property_void_branches_not_in_decade(i in 0u8..60) {
        let sb = StemBranch::from_index(i).unwrap();
        let first = sb.index() - sb.stem().index();
        let void = sb.xun_kong();
        for k in 0..10 {
            let member = StemBranch::from_index(first + k).unwrap();
            prop_assert!(!void.contains(&member.branch()));
        }
    }

    #[test]
    fn property_partners_are_involutions(s in 0u8..10, b in 0u8..12) {
        let stem = Stem::from_index(s).unwrap();
        let branch = Branch::from_index(b).unwrap();
        prop_assert_eq!(stem_combination_partner(stem_combination_partner(stem)), stem);
        prop_assert_eq!(branch_combination_partner(branch_combination_partner(branch)), branch);
        prop_assert!(branches_clash(branch, branch.offset(6)));
    }
}

#[test]
fn hanzi_labels_are_unique() {
    let mut labels: Vec<String> = (0..60u8)
        .filter_map(StemBranch::from_index)
        .map(|sb| sb.hanzi())
        .collect();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), 60);
}
