//! Single-attack damage resolution.
//!
//! Pure formulas plus [`resolve_attack`], which rolls hit and crit with an
//! injected RNG unless the rules force them.

use super::types::{AttackOutcome, CombatRules, Combatant};
use crate::character::attributes::AttributeType;
use crate::core::constants::*;
use rand::Rng;

/// Chance to land a hit, clamped to 5%..95%.
pub fn calc_hit_rate(accuracy: f64, evasion: f64) -> f64 {
    ((accuracy - evasion) / RATE_DIVISOR).clamp(MIN_HIT_RATE, MAX_HIT_RATE)
}

pub fn calc_crit_rate(crit: f64, crit_resist: f64) -> f64 {
    ((crit - crit_resist).max(0.0) / RATE_DIVISOR).clamp(0.0, 1.0)
}

/// `attack² / (attack + defense/2)`, never below 1.
pub fn calc_base_damage(attack: f64, defense: f64) -> f64 {
    if attack <= 0.0 {
        return MIN_DAMAGE;
    }
    (attack * (attack / (attack + defense * DEFENSE_WEIGHT))).max(MIN_DAMAGE)
}

/// 5% per level of difference, at most ±50%.
pub fn calc_level_factor(attacker_level: u32, defender_level: u32) -> f64 {
    let diff = attacker_level as f64 - defender_level as f64;
    1.0 + (diff * LEVEL_DIFF_FACTOR).clamp(-MAX_LEVEL_ADJUSTMENT, MAX_LEVEL_ADJUSTMENT)
}

fn boost_factor(attacker: &Combatant) -> f64 {
    1.0 + attacker.stat(AttributeType::DamageBoost) / RATE_DIVISOR
}

fn reduction_factor(defender: &Combatant) -> f64 {
    (1.0 - defender.stat(AttributeType::DamageReduction) / RATE_DIVISOR).max(MIN_REDUCTION_FACTOR)
}

/// Resolves one attack from `attacker` against `defender`.
///
/// The hit roll is drawn before the crit roll; forced rolls draw nothing.
/// A miss always deals exactly 1 damage.
pub fn resolve_attack(
    attacker: &Combatant,
    defender: &Combatant,
    rules: &CombatRules,
    rng: &mut impl Rng,
) -> AttackOutcome {
    let hit_rate = calc_hit_rate(
        attacker.stat(AttributeType::Accuracy),
        defender.stat(AttributeType::Evasion),
    );
    let is_hit = match rules.overrides.is_hit {
        Some(forced) => forced,
        None => rng.gen::<f64>() < hit_rate,
    };

    let base_damage = calc_base_damage(
        attacker.stat(AttributeType::Attack),
        defender.stat(AttributeType::Defense),
    );
    let level_factor = calc_level_factor(attacker.level, defender.level);
    let damage_after_level = base_damage * level_factor;

    let crit_rate = calc_crit_rate(
        attacker.stat(AttributeType::Crit),
        defender.stat(AttributeType::CritResist),
    );
    let is_critical = match rules.overrides.is_critical {
        Some(forced) => forced,
        None => rng.gen::<f64>() < crit_rate,
    };

    let critical_multiplier = if is_critical {
        rules.critical_multiplier
    } else {
        1.0
    };
    let damage_after_crit = damage_after_level * critical_multiplier;

    let boost_factor = boost_factor(attacker);
    let reduction_factor = reduction_factor(defender);

    let final_damage = if is_hit {
        (damage_after_crit * boost_factor * reduction_factor).max(MIN_DAMAGE)
    } else {
        MIN_DAMAGE
    };

    AttackOutcome {
        final_damage,
        is_critical,
        is_hit,
        hit_rate,
        base_damage,
        level_factor,
        damage_after_level,
        crit_rate,
        critical_multiplier,
        damage_after_crit,
        boost_factor,
        reduction_factor,
    }
}

/// Mean final damage of an attack, weighting hit and crit by their rates.
///
/// Forced rolls in `rules` count as certain.
pub fn expected_damage(attacker: &Combatant, defender: &Combatant, rules: &CombatRules) -> f64 {
    let hit_rate = match rules.overrides.is_hit {
        Some(forced) => f64::from(u8::from(forced)),
        None => calc_hit_rate(
            attacker.stat(AttributeType::Accuracy),
            defender.stat(AttributeType::Evasion),
        ),
    };
    let crit_rate = match rules.overrides.is_critical {
        Some(forced) => f64::from(u8::from(forced)),
        None => calc_crit_rate(
            attacker.stat(AttributeType::Crit),
            defender.stat(AttributeType::CritResist),
        ),
    };

    let per_hit = calc_base_damage(
        attacker.stat(AttributeType::Attack),
        defender.stat(AttributeType::Defense),
    ) * calc_level_factor(attacker.level, defender.level)
        * boost_factor(attacker)
        * reduction_factor(defender);

    let normal = per_hit.max(MIN_DAMAGE);
    let critical = (per_hit * rules.critical_multiplier).max(MIN_DAMAGE);
    let on_hit = normal * (1.0 - crit_rate) + critical * crit_rate;

    hit_rate * on_hit + (1.0 - hit_rate) * MIN_DAMAGE
}
