use std::path::PathBuf;

use card_roi_projection::projection::types::{RewardType, WelcomeBonus};
use card_roi_projection::report::ProjectionReport;
use card_roi_projection::scenario::Scenario;
use pretty_assertions::assert_eq;
use rust_decimal::prelude::*;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join("scenario.json")
}

fn roi(scenario: &Scenario, year: usize, card: &str) -> Decimal {
    scenario.project()[year - 1].roi_by_card[card]
}

#[test]
fn sample_scenario_projects_expected_series() {
    let scenario = Scenario::from_json_file(sample_path()).unwrap();
    assert_eq!(scenario.input().years, 5);
    assert_eq!(scenario.cards().len(), 2);

    // year 1: fees waived, both first bonuses cross
    assert_eq!(roi(&scenario, 1, "Dining Cash"), dec!(3.18));
    assert_eq!(roi(&scenario, 1, "Travel Points"), dec!(12.05));
    // year 2: fees charged, second points bonus not reached yet (24700 < 25000)
    assert_eq!(roi(&scenario, 2, "Dining Cash"), dec!(0.45));
    assert_eq!(roi(&scenario, 2, "Travel Points"), dec!(1.39));
    // year 3: cumulative 36000 crosses 25000
    assert_eq!(roi(&scenario, 3, "Travel Points"), dec!(2.69));
    // year 5 has no spend row
    assert_eq!(roi(&scenario, 5, "Dining Cash"), Decimal::ZERO);
    assert_eq!(roi(&scenario, 5, "Travel Points"), Decimal::ZERO);

    let portfolio = scenario.portfolio();
    assert_eq!(portfolio[0].net, dec!(1676));
    assert_eq!(portfolio[0].roi, dec!(15.24));
    assert_eq!(portfolio[4].roi, Decimal::ZERO);
}

#[test]
fn second_bonus_fires_only_in_crossing_year() {
    let scenario = Scenario::from_json_file(sample_path()).unwrap();
    let bonus_by_year: Vec<Decimal> = scenario
        .breakdown()
        .iter()
        .map(|cards| cards.iter().find(|b| b.card == "Travel Points").map(|b| b.bonus_value).unwrap())
        .collect();

    assert_eq!(
        bonus_by_year,
        vec![dec!(1020), Decimal::ZERO, dec!(255), Decimal::ZERO, Decimal::ZERO]
    );
}

#[test]
fn editing_a_loaded_scenario_recomputes_from_scratch() {
    let mut scenario = Scenario::from_json_file(sample_path()).unwrap();
    let before = scenario.project();

    scenario.toggle_waived(1).unwrap();
    // Dining Cash year 2: 156 with no fee
    assert_eq!(roi(&scenario, 2, "Dining Cash"), dec!(1.14));

    scenario.toggle_waived(1).unwrap();
    assert_eq!(scenario.project(), before);

    scenario.remove_card("Travel Points").unwrap();
    scenario.add_card("Flat Points", RewardType::Points, Decimal::ZERO).unwrap();
    scenario.set_rate("Flat Points", "Generic", dec!(2)).unwrap();
    scenario.add_bonus("Flat Points", WelcomeBonus::new(dec!(1), dec!(1000), Decimal::ZERO)).unwrap();

    let points = scenario.project();
    assert!(points.iter().all(|p| !p.roi_by_card.contains_key("Travel Points")));
    // 6000 * 2 * 0.017 + 17 bonus over 11000 spend
    assert_eq!(points[0].roi_by_card["Flat Points"], dec!(2.01));
}

#[test]
fn missing_file_is_reported() {
    let err = Scenario::from_json_file("does/not/exist.json").unwrap_err();
    assert!(err.to_string().contains("Failed to read scenario file"));
}

#[test]
fn report_json_carries_both_series() {
    let scenario = Scenario::from_json_file(sample_path()).unwrap();
    let report = ProjectionReport::new(scenario.project(), scenario.portfolio());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["points"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["points"][0]["roi_by_card"]["Dining Cash"], "3.18");
    assert_eq!(json["portfolio"][0]["roi"], "15.24");
}
