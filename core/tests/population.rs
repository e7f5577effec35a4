//! Identity pool tests: fixed size, well-formed cards, every draw
//! comes from the pool.

use std::collections::HashSet;
use txgen_core::{
    config::GeneratorConfig,
    identity::CardVendor,
    scenario::ScenarioEngine,
};

#[test]
fn pool_has_configured_size() {
    let engine = ScenarioEngine::build(GeneratorConfig::default(), 42).unwrap();
    assert_eq!(engine.pool().size(), 10_000);

    let engine = ScenarioEngine::build(GeneratorConfig::default_test(), 42).unwrap();
    assert_eq!(engine.pool().size(), 50);
}

#[test]
fn every_card_matches_one_vendor_template() {
    let engine = ScenarioEngine::build(GeneratorConfig::default(), 1234).unwrap();
    for card in engine.pool().cards() {
        let vendor = CardVendor::classify(card);
        assert!(vendor.is_some(), "{card} matches no vendor template");
    }
}

#[test]
fn pool_does_not_change_while_generating() {
    let mut engine = ScenarioEngine::build(GeneratorConfig::default_test(), 9).unwrap();
    let before = engine.pool().cards().to_vec();
    for _ in 0..500 {
        engine.next_scenario().unwrap();
    }
    assert_eq!(engine.pool().cards(), before.as_slice());
}

#[test]
fn generated_cards_come_from_the_pool() {
    let mut engine = ScenarioEngine::build(GeneratorConfig::default_test(), 77).unwrap();
    let pool: HashSet<String> = engine.pool().cards().iter().cloned().collect();
    for _ in 0..500 {
        let scenario = engine.next_scenario().unwrap();
        assert!(pool.contains(scenario.card()), "{} not in pool", scenario.card());
    }
}

#[test]
fn invalid_config_is_a_startup_error() {
    let cfg = GeneratorConfig { identity_pool_size: 0, ..GeneratorConfig::default_test() };
    assert!(ScenarioEngine::build(cfg, 1).is_err());
}
