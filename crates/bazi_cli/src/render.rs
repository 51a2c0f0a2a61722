//! Plain-text output for the CLI.

use bazi_core::{ALL_ROLES, AnnualOverlay, Chart, PillarRole, StartAgeSource};
use bazi_time::SolarTermEvent;
use chrono::Duration;

pub fn chart(chart: &Chart) -> String {
    let mut out = Vec::new();
    let input = chart.input();
    let st = chart.solar_time();

    out.push(format!("Birth:       {} ({:?})", input.civil, chart.gender()));
    out.push(format!(
        "Location:    {:.4}°E ({:?})",
        chart.location().longitude,
        chart.location().source
    ));
    if st.correction_applied {
        out.push(format!(
            "Solar time:  {} ({:+.1} min)",
            st.corrected.format("%Y-%m-%d %H:%M:%S"),
            st.shift_minutes()
        ));
    } else {
        out.push("Solar time:  not applied".to_string());
    }
    out.push(String::new());

    let pillars = chart.pillars();
    let tg = chart.ten_gods();
    out.push(format!("{:<8}{:<8}{:<8}{:<8}", "Year", "Month", "Day", "Hour"));
    out.push(
        pillars
            .iter()
            .map(|(_, p)| format!("{:<6}", p.to_string()))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push(
        tg.stems
            .iter()
            .map(|t| format!("{:<6}", t.map_or("日主".to_string(), |t| t.to_string())))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push(
        tg.branches
            .iter()
            .map(|t| format!("{:<6}", t.to_string()))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push(
        pillars
            .iter()
            .map(|(_, p)| format!("{:<6}", p.nayin().hanzi))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push(
        chart
            .pillar_details()
            .iter()
            .map(|d| format!("{:<6}", d.day_master_stage.hanzi()))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push(String::new());

    let rel = chart.natal_relations();
    if !rel.is_empty() {
        out.push("Relations:".to_string());
        for r in &rel.pairs {
            let element = r.element.map_or(String::new(), |e| format!(" {}", e.hanzi()));
            out.push(format!(
                "  {}-{} {}{}",
                r.roles[0].name(),
                r.roles[1].name(),
                r.kind.hanzi(),
                element
            ));
        }
        if let Some(e) = rel.triad {
            out.push(format!("  三合 {}", e.hanzi()));
        }
        if let Some(e) = rel.meeting {
            out.push(format!("  三会 {}", e.hanzi()));
        }
        out.push(String::new());
    }

    let score = chart.element_score();
    out.push(
        score
            .iter()
            .map(|(e, v)| format!("{} {:.1}%", e.hanzi(), v))
            .collect::<Vec<_>>()
            .join("  "),
    );
    let s = chart.strength();
    out.push(format!(
        "Day master:  {} {} ({}, ratio {:.2})",
        s.day_master,
        s.element.hanzi(),
        s.label.hanzi(),
        s.ratio
    ));
    out.push(format!(
        "Favorable:   {}",
        s.favorable.iter().map(|e| e.hanzi()).collect::<Vec<_>>().join(" ")
    ));
    out.push(String::new());

    out.push("Shen-sha:".to_string());
    for m in chart.markers() {
        let positions: Vec<_> = m.positions.iter().map(|r| r.name()).collect();
        let state = if m.active { "" } else { " (inactive)" };
        out.push(format!(
            "  {:<12} {:<18} x{:.2}{}",
            m.name,
            positions.join(","),
            m.strength,
            state
        ));
    }
    for w in chart.rule_warnings() {
        out.push(format!("  ! {w}"));
    }
    out.push(String::new());

    let dayun = chart.dayun();
    match &dayun.qi_yun.source {
        StartAgeSource::SolarTerm { term, .. } => out.push(format!(
            "Da-yun ({:?}, from {}): starts at age {}",
            dayun.direction,
            term.hanzi(),
            dayun.qi_yun.start_age
        )),
        StartAgeSource::Default => out.push(format!(
            "Da-yun ({:?}, default): starts at age {}",
            dayun.direction, dayun.qi_yun.start_age
        )),
    }
    for c in &dayun.cycles {
        out.push(format!(
            "  {:>3}-{:<3} {} {}",
            c.start_age,
            c.end_age,
            c.pillar,
            c.day_master_stage.hanzi()
        ));
    }

    if !chart.notes().is_empty() {
        out.push(String::new());
        for n in chart.notes() {
            out.push(format!("Note [{:?}]: {}", n.kind, n.message));
        }
    }

    out.push(String::new());
    out.join("\n")
}

/// One line per term, shifted from UTC by `offset_minutes`.
pub fn terms(events: &[SolarTermEvent], offset_minutes: i32) -> String {
    let shift = Duration::minutes(i64::from(offset_minutes));
    let mut out: Vec<String> = events
        .iter()
        .map(|e| {
            format!(
                "{} {:<20} {}",
                e.term.hanzi(),
                e.term.name(),
                (e.instant + shift).format("%Y-%m-%d %H:%M")
            )
        })
        .collect();
    out.push(String::new());
    out.join("\n")
}

pub fn annual(chart: &Chart, overlay: &AnnualOverlay) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "{} {} (nominal age {})",
        overlay.year, overlay.pillar, overlay.nominal_age
    ));
    out.push(format!(
        "Ten gods:    {} / {}",
        overlay.stem_ten_god, overlay.branch_ten_god
    ));
    match &overlay.dayun {
        Some(c) => out.push(format!(
            "Da-yun:      {} (ages {}-{})",
            c.pillar, c.start_age, c.end_age
        )),
        None => out.push("Da-yun:      not started".to_string()),
    }
    let names = |roles: &[PillarRole]| {
        if roles.is_empty() {
            "-".to_string()
        } else {
            roles.iter().map(|r| r.name()).collect::<Vec<_>>().join(",")
        }
    };
    out.push(format!("Clashes:     {}", names(&overlay.clashes)));
    out.push(format!("Combines:    {}", names(&overlay.combinations)));

    let natal: Vec<_> = ALL_ROLES
        .iter()
        .map(|r| format!("{}:{}", r.name(), chart.pillars().get(*r)))
        .collect();
    out.push(format!("Natal:       {}", natal.join(" ")));
    out.push(String::new());
    out.join("\n")
}
