//! Inline snapshots of small deterministic values: the scenario extraction
//! convention and the wire formats are load-bearing for the UI, so their
//! exact shape is pinned here.

use expedition_wasm::distribution::{Pmf, ScenarioQuadruple};
use expedition_wasm::engines::DamageSource;
use expedition_wasm::enums::EventName;
use expedition_wasm::SectorType;

#[test]
fn scenario_extraction_of_a_uniform_pmf() {
    let pmf: Pmf = [(1, 0.25), (2, 0.25), (3, 0.25), (4, 0.25)]
        .into_iter()
        .collect();
    let quadruple = ScenarioQuadruple::extract(&pmf, false);
    insta::assert_snapshot!(
        format!("{:?}", quadruple),
        @"ScenarioQuadruple { optimist: 1, average: 2, pessimist: 3, worst: 4, optimist_prob: 0.25, average_prob: 0.25, pessimist_prob: 0.25, worst_prob: 0.25 }"
    );
}

#[test]
fn two_coin_convolution() {
    let coin = Pmf::bernoulli(0.5);
    let two = coin.convolve(&coin);
    insta::assert_snapshot!(
        format!("{:?}", two.iter().collect::<Vec<_>>()),
        @"[(0, 0.25), (1, 0.5), (2, 0.25)]"
    );
}

#[test]
fn damage_source_wire_format() {
    let source = DamageSource {
        sector_type: SectorType::Forest,
        sector_index: 0,
        probability: 0.5,
        zero_damage: false,
    };
    insta::assert_snapshot!(
        serde_json::to_string(&source).unwrap(),
        @r#"{"sectorType":"FOREST","sectorIndex":0,"probability":0.5}"#
    );
}

#[test]
fn event_wire_names() {
    let names = [
        EventName::Harvest(2),
        EventName::FightFixed(8),
        EventName::FightRandom,
        EventName::Accident35,
        EventName::NothingToReport,
    ]
    .iter()
    .map(|e| e.wire_name())
    .collect::<Vec<_>>()
    .join(", ");
    insta::assert_snapshot!(
        names,
        @"HARVEST_2, FIGHT_8, FIGHT_8_10_12_15_18_32, ACCIDENT_3_5, NOTHING_TO_REPORT"
    );
}
