//! Reference data shared by every chart: solar terms and shen-sha rules.
//!
//! A [`ReferenceData`] value is immutable once built. The engine holds it
//! through a [`ReferenceHandle`]; each chart takes one snapshot, and a
//! reload swaps the whole value.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::{Arc, PoisonError, RwLock};

use bazi_time::{SolarTermSource, TermTable, generate_term_table};
use tracing::info;

use crate::error::ChartError;
use crate::shensha::{RuleSet, ShenShaRuleSource};

/// Solar-term source usable across threads.
pub type SharedTerms = Arc<dyn SolarTermSource + Send + Sync>;
/// Rule source usable across threads.
pub type SharedRules = Arc<dyn ShenShaRuleSource + Send + Sync>;

/// Solar-term and rule tables consulted during chart computation.
#[derive(Clone)]
pub struct ReferenceData {
    terms: SharedTerms,
    rules: SharedRules,
    label: String,
}

impl fmt::Debug for ReferenceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceData")
            .field("label", &self.label)
            .field("activation_rules", &self.rules.activation_rules().len())
            .field("interaction_rules", &self.rules.interaction_rules().len())
            .finish()
    }
}

impl ReferenceData {
    pub fn new(terms: SharedTerms, rules: SharedRules, label: impl Into<String>) -> Self {
        Self {
            terms,
            rules,
            label: label.into(),
        }
    }

    /// Owned term table and rule set.
    pub fn from_tables(terms: TermTable, rules: RuleSet, label: impl Into<String>) -> Self {
        Self::new(Arc::new(terms), Arc::new(rules), label)
    }

    /// Approximate terms for `years` with the built-in rule set.
    pub fn generated(years: RangeInclusive<i32>) -> Result<Self, ChartError> {
        let label = format!("generated {}..={}", years.start(), years.end());
        let terms = generate_term_table(years)?;
        Ok(Self::from_tables(terms, RuleSet::standard(), label))
    }

    pub fn terms(&self) -> &(dyn SolarTermSource + Send + Sync) {
        self.terms.as_ref()
    }

    pub fn rules(&self) -> &(dyn ShenShaRuleSource + Send + Sync) {
        self.rules.as_ref()
    }

    /// Free-form name of where the data came from.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Same terms with a different rule set.
    pub fn with_rules(&self, rules: SharedRules) -> Self {
        Self {
            terms: Arc::clone(&self.terms),
            rules,
            label: self.label.clone(),
        }
    }
}

/// Atomically replaceable reference data.
#[derive(Debug)]
pub struct ReferenceHandle {
    current: RwLock<Arc<ReferenceData>>,
}

impl ReferenceHandle {
    pub fn new(data: ReferenceData) -> Self {
        Self {
            current: RwLock::new(Arc::new(data)),
        }
    }

    /// The data in force now. Later reloads do not affect the snapshot.
    pub fn snapshot(&self) -> Arc<ReferenceData> {
        // The guarded value is a single Arc; a poisoned lock still holds a
        // complete one.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in `data`, returning what it replaced.
    pub fn replace(&self, data: ReferenceData) -> Arc<ReferenceData> {
        let next = Arc::new(data);
        info!(label = next.label(), "reference data replaced");
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}
