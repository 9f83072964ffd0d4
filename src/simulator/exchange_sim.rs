//! Repeated independent attacks from one side.

use crate::character::attributes::AttributeType;
use crate::combat::{
    calc_crit_rate, calc_hit_rate, expected_damage, resolve_attack, AttackOutcome, CombatRules,
    Combatant,
};
use crate::error::{ForgeError, Result};
use rand::Rng;
use serde::Serialize;

/// Realized versus theoretical statistics for `samples` attacks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeReport {
    pub attacker: String,
    pub defender: String,
    pub samples: u32,
    pub average_damage: f64,
    pub hit_rate: f64,
    pub crit_rate: f64,
    pub theoretical_hit_rate: f64,
    pub theoretical_crit_rate: f64,
    pub expected_damage: f64,
    pub outcomes: Vec<AttackOutcome>,
}

impl ExchangeReport {
    pub fn total_damage(&self) -> f64 {
        self.outcomes.iter().map(|o| o.final_damage).sum()
    }
}

/// Resolves `count` attacks from `attacker` against `defender`. Health is
/// not tracked and nobody dies.
pub fn simulate_exchanges(
    attacker: &Combatant,
    defender: &Combatant,
    count: u32,
    rules: &CombatRules,
    rng: &mut impl Rng,
) -> Result<ExchangeReport> {
    if count == 0 {
        return Err(ForgeError::invalid_input("sample count must be at least 1"));
    }

    let outcomes: Vec<AttackOutcome> = (0..count)
        .map(|_| resolve_attack(attacker, defender, rules, rng))
        .collect();

    let n = count as f64;
    let total: f64 = outcomes.iter().map(|o| o.final_damage).sum();
    let hits = outcomes.iter().filter(|o| o.is_hit).count() as f64;
    let crits = outcomes.iter().filter(|o| o.is_critical).count() as f64;

    tracing::debug!(
        attacker = %attacker.name,
        defender = %defender.name,
        count,
        "sampled exchanges"
    );

    Ok(ExchangeReport {
        attacker: attacker.name.clone(),
        defender: defender.name.clone(),
        samples: count,
        average_damage: total / n,
        hit_rate: hits / n,
        crit_rate: crits / n,
        theoretical_hit_rate: calc_hit_rate(
            attacker.stat(AttributeType::Accuracy),
            defender.stat(AttributeType::Evasion),
        ),
        theoretical_crit_rate: calc_crit_rate(
            attacker.stat(AttributeType::Crit),
            defender.stat(AttributeType::CritResist),
        ),
        expected_damage: expected_damage(attacker, defender, rules),
        outcomes,
    })
}
