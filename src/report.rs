//! Deterministic plain-text rendering of an expedition report, shared by
//! the CLI summary view and the snapshot tests.

use crate::api::dto::ExpeditionReport;
use std::fmt::Write;

fn resource_rows(report: &ExpeditionReport) -> [(&'static str, &crate::resources::ResourceOutlook); 6] {
    [
        ("fruits", &report.resources.fruits),
        ("steaks", &report.resources.steaks),
        ("fuel", &report.resources.fuel),
        ("oxygen", &report.resources.oxygen),
        ("artefacts", &report.resources.artefacts),
        ("mapFragments", &report.resources.map_fragments),
    ]
}

/// Render the summary the CLI prints for `calculate`.
pub fn render_summary(name: &str, report: &ExpeditionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Expedition Report: {} ===", name);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Crew: {} ({} participating), fighting power {}, grenades {}",
        report.participation_status.len(),
        report.combat.player_count,
        report.combat.fighting_power,
        report.combat.grenade_count
    );
    if let Some(sampling) = &report.sampling {
        let _ = writeln!(
            out,
            "Movement-limited: {} retained compositions",
            sampling.composition_count
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:<14} | {:>9} | {:>9} | {:>9}",
        "Resource", "Pessimist", "Average", "Optimist"
    );
    let _ = writeln!(out, "---------------|-----------|-----------|----------");
    for (label, outlook) in resource_rows(report) {
        let _ = writeln!(
            out,
            "{:<14} | {:>9.2} | {:>9.2} | {:>9.2}",
            label, outlook.pessimist, outlook.average, outlook.optimist
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Fight damage:  optimist {:.1}, average {:.1}, pessimist {:.1}, worst {:.1}",
        report.combat.damage.optimist,
        report.combat.damage.average,
        report.combat.damage.pessimist,
        report.combat.damage.worst_case
    );
    let _ = writeln!(
        out,
        "Event damage:  optimist {:.1}, average {:.1}, pessimist {:.1}, worst {:.1}",
        report.event_damage.damage.optimist,
        report.event_damage.damage.average,
        report.event_damage.damage.pessimist,
        report.event_damage.damage.worst_case
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Health by scenario:");
    let scenarios = [
        ("optimist", &report.health_by_scenario.optimist),
        ("average", &report.health_by_scenario.average),
        ("pessimist", &report.health_by_scenario.pessimist),
        ("worstCase", &report.health_by_scenario.worst_case),
    ];
    for (label, health) in scenarios {
        let _ = writeln!(out, "  {:<10} {:?}", label, health);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::{ExpeditionRequest, PlayerDto};
    use crate::api::runner::calculate;
    use crate::enums::SectorType;

    #[test]
    fn summary_mentions_the_crew_and_resources() {
        let request = ExpeditionRequest {
            sectors: vec![SectorType::Landing, SectorType::Forest],
            team: vec![PlayerDto {
                id: 1,
                avatar: String::new(),
                abilities: Vec::new(),
                items: Vec::new(),
                max_health: 14,
            }],
            ..ExpeditionRequest::default()
        };
        let report = calculate(&request).unwrap();
        let text = render_summary("Test Planet", &report);
        assert!(text.contains("=== Expedition Report: Test Planet ==="));
        assert!(text.contains("Crew: 1 (1 participating), fighting power 1, grenades 0"));
        assert!(text.contains("fruits"));
        assert!(text.contains("Health by scenario:"));
        assert!(!text.contains("Movement-limited"));
    }

    #[test]
    fn summary_is_reproducible() {
        let request = ExpeditionRequest {
            sectors: vec![SectorType::Landing, SectorType::Predator],
            team: vec![PlayerDto {
                id: 1,
                avatar: String::new(),
                abilities: Vec::new(),
                items: Vec::new(),
                max_health: 14,
            }],
            ..ExpeditionRequest::default()
        };
        let a = render_summary("x", &calculate(&request).unwrap());
        let b = render_summary("x", &calculate(&request).unwrap());
        assert_eq!(a, b);
    }
}
