//! Static domain tables for sexagenary (ganzhi) chart calculation.
//!
//! This crate provides:
//! - The ten stems, twelve branches, five elements and their cycles
//! - Hidden stems of each branch with weights and tiers
//! - The 60-pair sexagenary cycle, decades, void branches and na-yin
//! - Combination, clash, harm and punishment tables
//! - Ten gods and the twelve life stages
//!
//! Everything here is `const` data; nothing allocates except label
//! formatting.

pub mod branch;
pub mod element;
pub mod error;
pub mod life_stage;
pub mod relations;
pub mod sexagenary;
pub mod stem;
pub mod ten_god;

pub use branch::{ALL_BRANCHES, Branch, HiddenStem, HiddenTier};
pub use element::{ALL_ELEMENTS, Element, ElementRelation, Polarity, Season};
pub use error::TableError;
pub use life_stage::{ALL_LIFE_STAGES, LifeStage};
pub use relations::{
    ALL_TRIADS, Triad, branch_combination_partner, branch_six_combination, branches_clash,
    branches_harm, branches_punish, complete_triad, directional_meeting, half_triad,
    stem_combination, stem_combination_partner, stems_clash,
};
pub use sexagenary::{NAYIN, Nayin, SEXAGENARY_CYCLE, StemBranch};
pub use stem::{ALL_STEMS, Stem};
pub use ten_god::TenGod;
