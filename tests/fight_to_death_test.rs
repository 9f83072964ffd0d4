//! Integration test: fight to the death
//!
//! Builds combatants from character records and checks that the round log
//! accounts for every point of health and damage.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statforge::character::CharacterRecord;
use statforge::combat::{CombatRules, Combatant, RollOverrides};
use statforge::simulator::{fight_to_death, run_duel_series, SimConfig, Side, Winner};

fn fighter(id: u32, name: &str, pairs: &[(&str, f64)]) -> Combatant {
    let record = CharacterRecord::builder(id, name)
        .level(10)
        .attributes(pairs.iter().copied())
        .build()
        .unwrap();
    Combatant::from_record(&record)
}

fn knight() -> Combatant {
    fighter(
        1,
        "Knight",
        &[
            ("attack", 35.0),
            ("defense", 20.0),
            ("health", 500.0),
            ("accuracy", 85.0),
            ("crit", 15.0),
            ("health_regen", 4.0),
            ("agility", 8.0),
        ],
    )
}

fn rogue() -> Combatant {
    fighter(
        2,
        "Rogue",
        &[
            ("attack", 45.0),
            ("defense", 8.0),
            ("health", 380.0),
            ("accuracy", 90.0),
            ("evasion", 20.0),
            ("crit", 35.0),
            ("agility", 8.0),
        ],
    )
}

#[test]
fn test_health_ledger_balances_every_round() {
    let (a, d) = (knight(), rogue());
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let result = fight_to_death(&a, &d, 1000, &CombatRules::default(), &mut rng).unwrap();

    assert_ne!(result.winner, Winner::Draw);
    assert_eq!(result.history.len() as u32, result.rounds);

    for side in [Side::Attacker, Side::Defender] {
        let mut health = result.summary(side).initial_health;
        for round in &result.history {
            let own = round.side(side);
            let taken = round.side(side.other()).damage;
            health = (health + own.regen - taken).max(0.0);
            assert!(
                (health - own.health_after).abs() < 1e-9,
                "round {} {:?}: ledger {} vs logged {}",
                round.round,
                side,
                health,
                own.health_after
            );
            assert!(own.health_after <= result.summary(side).initial_health);
        }
        assert!((health - result.summary(side).final_health).abs() < 1e-9);
    }

    let winner = match result.winner {
        Winner::Attacker => &result.attacker,
        _ => &result.defender,
    };
    assert!(winner.final_health > 0.0);
    assert_eq!(result.winner_name.as_deref(), Some(winner.name.as_str()));
}

#[test]
fn test_damage_totals_match_history() {
    let (a, d) = (knight(), rogue());
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let result = fight_to_death(&a, &d, 1000, &CombatRules::default(), &mut rng).unwrap();

    for side in [Side::Attacker, Side::Defender] {
        let summary = result.summary(side);
        let dealt: f64 = result.history.iter().map(|r| r.side(side).damage).sum();
        let hits = result.history.iter().filter(|r| r.side(side).is_hit).count() as u32;
        assert!((dealt - summary.total_damage).abs() < 1e-6);
        assert_eq!(hits, summary.hit_count);
        assert!((summary.hit_rate - hits as f64 / result.rounds as f64).abs() < 1e-12);
    }
}

#[test]
fn test_round_cap_is_a_draw_with_both_alive() {
    let a = fighter(1, "Pillow", &[("attack", 1.0), ("health", 5000.0)]);
    let d = fighter(2, "Cushion", &[("attack", 1.0), ("health", 5000.0)]);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let result = fight_to_death(&a, &d, 25, &CombatRules::default(), &mut rng).unwrap();

    assert_eq!(result.winner, Winner::Draw);
    assert!(result.max_rounds_reached);
    assert_eq!(result.rounds, 25);
    assert!(result.attacker.final_health > 0.0 && result.defender.final_health > 0.0);
}

#[test]
fn test_higher_agility_always_moves_first() {
    let a = fighter(1, "Hare", &[("attack", 5.0), ("health", 200.0), ("agility", 30.0)]);
    let d = fighter(2, "Tortoise", &[("attack", 5.0), ("health", 200.0), ("agility", 3.0)]);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let result = fight_to_death(&a, &d, 20, &CombatRules::default(), &mut rng).unwrap();

    assert!(result.history.iter().all(|r| r.first_mover == Side::Attacker));
}

#[test]
fn test_agility_tie_flips_every_round() {
    let a = fighter(1, "Left", &[("attack", 1.0), ("health", 10000.0), ("agility", 12.0)]);
    let d = fighter(2, "Right", &[("attack", 1.0), ("health", 10000.0), ("agility", 12.0)]);
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let result = fight_to_death(&a, &d, 200, &CombatRules::default(), &mut rng).unwrap();

    assert_eq!(result.rounds, 200);
    let attacker_first = result
        .history
        .iter()
        .filter(|r| r.first_mover == Side::Attacker)
        .count();
    assert!(attacker_first > 0, "attacker never moved first");
    assert!(attacker_first < 200, "defender never moved first");
}

#[test]
fn test_killing_blow_denies_counterattack() {
    let rules = CombatRules::default().with_overrides(RollOverrides::forced(true, false));
    let a = fighter(1, "Assassin", &[("attack", 200.0), ("health", 50.0), ("agility", 50.0)]);
    let d = fighter(2, "Victim", &[("attack", 200.0), ("health", 50.0), ("agility", 1.0)]);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let result = fight_to_death(&a, &d, 10, &rules, &mut rng).unwrap();

    assert_eq!(result.winner, Winner::Attacker);
    assert_eq!(result.rounds, 1);
    assert!(result.history[0].defender.outcome.is_none());
    assert_eq!(result.attacker.final_health, 50.0);
}

#[test]
fn test_series_counts_add_up() {
    let config = SimConfig {
        max_rounds: 1000,
        ..SimConfig::seeded(30, 11)
    };
    let report = run_duel_series(&knight(), &rogue(), &config).unwrap();

    assert_eq!(report.runs, 30);
    assert_eq!(report.summaries.len(), 30);
    assert_eq!(
        report.attacker_wins + report.defender_wins + report.draws,
        30
    );
    let rate_sum = report.attacker_win_rate + report.defender_win_rate;
    assert!(rate_sum <= 1.0 + 1e-12);
}
