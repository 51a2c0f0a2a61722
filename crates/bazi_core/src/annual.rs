//! Current-year overlay on a natal chart.

use bazi_tables::{StemBranch, TenGod, branch_combination_partner, branches_clash};
use chrono::Datelike;
use serde::Serialize;

use crate::chart::Chart;
use crate::dayun::DaYunCycle;
use crate::pillar::{PillarRole, year_pillar};

/// How a given year's pillar meets a natal chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualOverlay {
    pub year: i32,
    pub pillar: StemBranch,
    /// Counting the birth year as 1.
    pub nominal_age: i32,
    /// Da-yun cycle running that year, if the year falls inside the list.
    pub dayun: Option<DaYunCycle>,
    /// Ten god of the annual stem for the day master.
    pub stem_ten_god: TenGod,
    /// Ten god of the annual branch's main hidden stem.
    pub branch_ten_god: TenGod,
    /// Natal pillars whose branch the annual branch clashes.
    pub clashes: Vec<PillarRole>,
    /// Natal pillars whose branch six-combines with the annual branch.
    pub combinations: Vec<PillarRole>,
}

/// Overlay `year` on `chart`. The year is reckoned from 立春, so callers
/// pass the solar year they mean.
pub fn annual_overlay(chart: &Chart, year: i32) -> AnnualOverlay {
    let pillar = year_pillar(year);
    let natal = chart.pillars();
    let day_master = natal.day_master();
    let branch = pillar.branch();

    let age = year - chart.input().civil.year();
    let dayun = u32::try_from(age)
        .ok()
        .and_then(|a| chart.dayun().cycle_at_age(a))
        .copied();

    let partner = branch_combination_partner(branch);
    let (mut clashes, mut combinations) = (Vec::new(), Vec::new());
    for (role, p) in natal.iter() {
        if branches_clash(branch, p.branch()) {
            clashes.push(role);
        }
        if p.branch() == partner {
            combinations.push(role);
        }
    }

    AnnualOverlay {
        year,
        pillar,
        nominal_age: age + 1,
        dayun,
        stem_ten_god: TenGod::of(day_master, pillar.stem()),
        branch_ten_god: TenGod::of(day_master, branch.main_stem()),
        clashes,
        combinations,
    }
}
