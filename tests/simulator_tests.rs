use mathquest_combat::analyzer::{
    analyze_adventure, render_report, write_report, DifficultyAnalyzer,
};
use mathquest_combat::config::{load_simulation_config, AnalyzerConfig, SimulationConfig};
use mathquest_combat::model::{AbilityDescriptor, AbilityType, Side, TargetPolicy, Unit, UnitId};
use mathquest_combat::simulator::{simulate_battle, UltimateStrategy};
use mathquest_combat::templates::{builtin_catalog, GrowthCurve};
use std::path::Path;

fn make_companion(id: u32) -> Unit {
    let mut unit = Unit::new(
        UnitId(id),
        format!("Pal{id}"),
        Side::Player,
        60,
        8,
        AbilityDescriptor::new("storm", AbilityType::Damage, 30, TargetPolicy::AllEnemies),
    );
    unit.spirit_gain = 50;
    unit
}

fn make_monster(id: u32) -> Unit {
    Unit::new(
        UnitId(id),
        format!("Ogre{id}"),
        Side::Opponent,
        80,
        9,
        AbilityDescriptor::new("none", AbilityType::Damage, 0, TargetPolicy::SingleEnemy),
    )
}

fn make_battle() -> (Vec<Unit>, Vec<Unit>) {
    (
        vec![make_companion(0), make_companion(1)],
        vec![make_monster(2), make_monster(3)],
    )
}

fn small_config() -> AnalyzerConfig {
    AnalyzerConfig {
        all_success_trials: 20,
        all_fail_trials: 20,
        random_trials: 60,
        max_rounds: 100,
        seed: 42,
    }
}

#[test]
fn successful_specials_win_in_four_rounds() {
    let (party, monsters) = make_battle();
    let result = simulate_battle(&party, &monsters, UltimateStrategy::AllSuccess, 1, 100);
    assert!(result.victory);
    assert_eq!(result.turn_count, 4);
    assert_eq!(result.final_monster_health, 0);
    assert_eq!(result.final_party_health, 120 - 45);
}

#[test]
fn failed_specials_lose_the_same_battle() {
    let (party, monsters) = make_battle();
    let result = simulate_battle(&party, &monsters, UltimateStrategy::AllFail, 1, 100);
    assert!(!result.victory);
    assert_eq!(result.final_party_health, 0);
    assert!(result.turn_count < 100, "party is wiped before the round cap");
}

#[test]
fn same_seed_replays_identically() {
    let (party, monsters) = make_battle();
    let a = simulate_battle(&party, &monsters, UltimateStrategy::Random, 99, 100);
    let b = simulate_battle(&party, &monsters, UltimateStrategy::Random, 99, 100);
    assert_eq!(a, b);
}

#[test]
fn round_cap_counts_as_a_loss() {
    let (party, monsters) = make_battle();
    let result = simulate_battle(&party, &monsters, UltimateStrategy::AllSuccess, 1, 1);
    assert!(!result.victory);
    assert_eq!(result.turn_count, 1);
    assert!(result.final_monster_health > 0);
}

#[test]
fn already_decided_battles_return_immediately() {
    let (party, mut monsters) = make_battle();
    for monster in &mut monsters {
        monster.current_health = 0;
    }
    let result = simulate_battle(&party, &monsters, UltimateStrategy::AllFail, 1, 100);
    assert!(result.victory);
    assert_eq!(result.turn_count, 0);

    let result = simulate_battle(&[], &make_battle().1, UltimateStrategy::AllSuccess, 1, 100);
    assert!(!result.victory);
    assert_eq!(result.turn_count, 0);
}

#[test]
fn win_rates_are_ordered_by_strategy() {
    let (party, monsters) = make_battle();
    let analyzer = DifficultyAnalyzer::new(small_config());
    let results = analyzer.analyze("ogres", &party, &monsters);

    assert_eq!(results.encounter_id, "ogres");
    assert_eq!(results.all_success.trials, 20);
    assert_eq!(results.random.trials, 60);
    assert_eq!(results.all_success.win_rate, 100.0);
    assert_eq!(results.all_success.avg_turns_on_victory, Some(4.0));
    assert_eq!(results.all_fail.win_rate, 0.0);
    assert_eq!(results.all_fail.avg_turns_on_victory, None);
    assert!(results.all_success.win_rate >= results.random.win_rate);
    assert!(results.random.win_rate >= results.all_fail.win_rate);
}

#[test]
fn analysis_is_reproducible_for_a_fixed_seed() {
    let (party, monsters) = make_battle();
    let analyzer = DifficultyAnalyzer::new(small_config());
    let first = analyzer.analyze("ogres", &party, &monsters);
    let second = analyzer.analyze("ogres", &party, &monsters);
    assert_eq!(first, second);
}

#[test]
fn empty_bucket_reports_zero() {
    let (party, monsters) = make_battle();
    let analyzer = DifficultyAnalyzer::new(small_config());
    let stats = analyzer.run_bucket(&party, &monsters, UltimateStrategy::Random, 0, 0);
    assert_eq!(stats.wins, 0);
    assert_eq!(stats.win_rate, 0.0);
    assert_eq!(stats.avg_turns_on_victory, None);
}

#[test]
fn bundled_adventure_analyzes_every_configured_encounter() {
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/simulation.json");
    let simulation = load_simulation_config(&config_path).expect("bundled config loads");
    let analyzer = DifficultyAnalyzer::new(small_config());
    let curve = GrowthCurve::default();
    let results = analyze_adventure(builtin_catalog(), &curve, &simulation, &analyzer)
        .expect("bundled adventure analyzes");

    assert_eq!(results.len(), simulation.encounters.len());
    for row in &results {
        for bucket in [&row.all_success, &row.random, &row.all_fail] {
            assert!((0.0..=100.0).contains(&bucket.win_rate), "{} out of range", row.encounter_id);
        }
    }

    let report = render_report(&results);
    for id in simulation.encounters.keys() {
        assert!(report.contains(id.as_str()), "report is missing {id}");
    }

    let out = std::env::temp_dir().join("mathquest_combat_report_test.json");
    write_report(&results, &out).expect("report written");
    let raw = std::fs::read_to_string(&out).expect("report readable");
    let written: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(written.as_array().map(Vec::len), Some(results.len()));
    assert!(written[0].get("allSuccess").is_some());
    let _ = std::fs::remove_file(out);
}

#[test]
fn unknown_adventure_or_encounter_is_an_error() {
    let analyzer = DifficultyAnalyzer::new(small_config());
    let curve = GrowthCurve::default();
    let missing_adventure: SimulationConfig = serde_json::from_str(
        r#"{ "adventureId": "nowhere",
             "encounters": { "x": { "party": [{ "templateId": "sparky" }] } } }"#,
    )
    .expect("valid config");
    assert!(analyze_adventure(builtin_catalog(), &curve, &missing_adventure, &analyzer).is_err());

    let missing_encounter: SimulationConfig = serde_json::from_str(
        r#"{ "adventureId": "meadow",
             "encounters": { "meadow-99": { "party": [{ "templateId": "sparky" }] } } }"#,
    )
    .expect("valid config");
    let err = analyze_adventure(builtin_catalog(), &curve, &missing_encounter, &analyzer)
        .expect_err("encounter is not in the adventure");
    assert!(err.to_string().contains("meadow-99"));
}
