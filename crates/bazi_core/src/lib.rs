//! Four-pillar (八字) chart engine.
//!
//! This crate provides:
//! - Pillar derivation from true solar time and solar-term boundaries
//! - Elemental scoring and day-master strength
//! - Na-yin, life stages and natal stem/branch relations
//! - Da-yun (大运) cycles and their start age
//! - A two-phase declarative shen-sha rule engine
//! - The [`Engine`] that assembles all of the above into a [`Chart`]
//!
//! Reference data (solar terms, rules) is injected at construction and
//! read-only afterwards; computing a chart is a pure function of the input
//! and that data.

pub mod annual;
pub mod chart;
pub mod config;
pub mod dayun;
pub mod engine;
pub mod error;
pub mod natal;
pub mod pillar;
pub mod reference;
pub mod shensha;
pub mod strength;

pub use annual::{AnnualOverlay, annual_overlay};
pub use chart::{BirthInput, Chart, ChartNote, NoteKind};
pub use config::EngineConfig;
pub use dayun::{DaYun, DaYunCycle, DaYunDirection, Gender, QiYun, StartAgeSource, compute_dayun};
pub use engine::Engine;
pub use error::ChartError;
pub use natal::{
    NatalRelation, NatalRelations, PillarDetail, RelationKind, natal_relations, pillar_details,
};
pub use pillar::{
    ALL_ROLES, BoundarySource, FourPillars, PillarResolution, PillarRole, compute_pillars,
    day_pillar, hour_pillar, month_pillar, year_pillar,
};
pub use reference::{ReferenceData, ReferenceHandle, SharedRules, SharedTerms};
pub use shensha::{
    RulePhase, RuleSet, RuleWarning, ShenShaMarker, ShenShaOutcome, ShenShaRuleSource, evaluate,
};
pub use strength::{
    DayMasterStrength, ElementScore, ElementalAnalysis, StrengthLabel, TenGodProfile,
    analyze_elements,
};
