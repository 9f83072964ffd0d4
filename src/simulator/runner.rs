//! Series runner and roster-facing entry points.
//!
//! Stored characters are resolved into combatant snapshots before any
//! simulation starts, so a missing side fails fast with `NotFound`.

use super::config::SimConfig;
use super::duel::{fight_to_death, FightResult};
use super::exchange_sim::{simulate_exchanges, ExchangeReport};
use super::report::{DuelSummary, SeriesReport};
use crate::character::manager::{CharacterManager, CharacterRef};
use crate::combat::Combatant;
use crate::error::{ForgeError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Run `config.num_runs` fights and return a report.
///
/// Run `i` uses `ChaCha8Rng` seeded with `seed + i`, or entropy when no seed
/// is set.
pub fn run_duel_series(
    attacker: &Combatant,
    defender: &Combatant,
    config: &SimConfig,
) -> Result<SeriesReport> {
    if config.num_runs == 0 {
        return Err(ForgeError::invalid_input("a series needs at least 1 run"));
    }

    let mut summaries = Vec::with_capacity(config.num_runs as usize);
    for run_idx in 0..config.num_runs {
        let run_seed = config.seed.map(|seed| seed.wrapping_add(run_idx as u64));
        let mut rng = match run_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let fight = fight_to_death(attacker, defender, config.max_rounds, &config.rules, &mut rng)?;
        tracing::debug!(
            run = run_idx + 1,
            of = config.num_runs,
            winner = ?fight.winner,
            rounds = fight.rounds,
            "duel finished"
        );
        summaries.push(DuelSummary::from_fight(run_idx, run_seed, &fight));
    }

    Ok(SeriesReport::from_runs(
        &attacker.name,
        &defender.name,
        summaries,
    ))
}

/// Loads both characters, failing before any simulation if either is absent.
pub fn resolve_pair(
    manager: &CharacterManager,
    attacker: &CharacterRef,
    defender: &CharacterRef,
) -> Result<(Combatant, Combatant)> {
    let attacker = manager.load(attacker)?;
    let defender = manager.load(defender)?;
    Ok((
        Combatant::from_record(&attacker),
        Combatant::from_record(&defender),
    ))
}

pub fn run_stored_duel(
    manager: &CharacterManager,
    attacker: &CharacterRef,
    defender: &CharacterRef,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Result<FightResult> {
    let (a, d) = resolve_pair(manager, attacker, defender)?;
    fight_to_death(&a, &d, config.max_rounds, &config.rules, rng)
}

pub fn run_stored_exchanges(
    manager: &CharacterManager,
    attacker: &CharacterRef,
    defender: &CharacterRef,
    config: &SimConfig,
    rng: &mut impl Rng,
) -> Result<ExchangeReport> {
    let (a, d) = resolve_pair(manager, attacker, defender)?;
    simulate_exchanges(&a, &d, config.exchange_samples, &config.rules, rng)
}

pub fn run_stored_series(
    manager: &CharacterManager,
    attacker: &CharacterRef,
    defender: &CharacterRef,
    config: &SimConfig,
) -> Result<SeriesReport> {
    let (a, d) = resolve_pair(manager, attacker, defender)?;
    run_duel_series(&a, &d, config)
}
