//! Fight-to-the-death between two combatants.
//!
//! Each round: both sides regenerate, initiative is decided by agility, the
//! first mover strikes, and the other side strikes back if it survived.

use crate::character::attributes::AttributeType;
use crate::combat::{resolve_attack, AttackOutcome, CombatRules, Combatant};
use crate::core::constants::DEFAULT_HEALTH;
use crate::error::{ForgeError, Result};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Attacker => 0,
            Side::Defender => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Attacker,
    Defender,
    Draw,
}

/// What one side did and suffered during a round.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SideRound {
    pub damage: f64,
    pub is_critical: bool,
    pub is_hit: bool,
    /// Health actually restored, after the max health cap.
    pub regen: f64,
    pub health_after: f64,
    /// Absent when the side was killed before its turn.
    pub outcome: Option<AttackOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleRoundRecord {
    pub round: u32,
    pub first_mover: Side,
    pub attacker: SideRound,
    pub defender: SideRound,
}

impl BattleRoundRecord {
    pub fn side(&self, side: Side) -> &SideRound {
        match side {
            Side::Attacker => &self.attacker,
            Side::Defender => &self.defender,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideSummary {
    pub name: String,
    pub initial_health: f64,
    pub final_health: f64,
    /// Damage this side dealt.
    pub total_damage: f64,
    pub crit_count: u32,
    pub hit_count: u32,
    pub crit_rate: f64,
    pub hit_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FightResult {
    pub winner: Winner,
    pub winner_name: Option<String>,
    pub rounds: u32,
    pub max_rounds_reached: bool,
    pub attacker: SideSummary,
    pub defender: SideSummary,
    pub history: Vec<BattleRoundRecord>,
}

impl FightResult {
    pub fn summary(&self, side: Side) -> &SideSummary {
        match side {
            Side::Attacker => &self.attacker,
            Side::Defender => &self.defender,
        }
    }
}

/// Mutable per-fight state for one side.
struct Fighter<'a> {
    combatant: &'a Combatant,
    health: f64,
    max_health: f64,
    total_damage: f64,
    crits: u32,
    hits: u32,
}

impl<'a> Fighter<'a> {
    fn new(combatant: &'a Combatant) -> Self {
        let health = combatant.attributes.get_or(AttributeType::Health.key(), DEFAULT_HEALTH);
        Self {
            combatant,
            health,
            max_health: health,
            total_damage: 0.0,
            crits: 0,
            hits: 0,
        }
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Applies positive regen up to max health and returns the amount gained.
    fn regenerate(&mut self) -> f64 {
        let regen = self.combatant.stat(AttributeType::HealthRegen);
        if regen <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + regen).min(self.max_health);
        self.health - before
    }

    fn record_strike(&mut self, outcome: &AttackOutcome) {
        self.total_damage += outcome.final_damage;
        if outcome.is_critical {
            self.crits += 1;
        }
        if outcome.is_hit {
            self.hits += 1;
        }
    }

    fn summary(&self, rounds: u32) -> SideSummary {
        let rate = |count: u32| {
            if rounds > 0 {
                count as f64 / rounds as f64
            } else {
                0.0
            }
        };
        SideSummary {
            name: self.combatant.name.clone(),
            initial_health: self.max_health,
            final_health: self.health.max(0.0),
            total_damage: self.total_damage,
            crit_count: self.crits,
            hit_count: self.hits,
            crit_rate: rate(self.crits),
            hit_rate: rate(self.hits),
        }
    }
}

/// Higher agility acts first; ties are a fresh coin flip.
fn initiative(attacker: &Combatant, defender: &Combatant, rng: &mut impl Rng) -> Side {
    let a = attacker.stat(AttributeType::Agility);
    let d = defender.stat(AttributeType::Agility);
    if a > d {
        Side::Attacker
    } else if d > a {
        Side::Defender
    } else if rng.gen_bool(0.5) {
        Side::Attacker
    } else {
        Side::Defender
    }
}

/// Fights until one side drops to 0 health or `max_rounds` rounds pass.
///
/// Neither combatant is modified.
pub fn fight_to_death(
    attacker: &Combatant,
    defender: &Combatant,
    max_rounds: u32,
    rules: &CombatRules,
    rng: &mut impl Rng,
) -> Result<FightResult> {
    if max_rounds == 0 {
        return Err(ForgeError::invalid_input("max_rounds must be at least 1"));
    }

    let mut fighters = [Fighter::new(attacker), Fighter::new(defender)];
    let mut history = Vec::new();
    let mut rounds = 0;

    while fighters.iter().all(Fighter::is_alive) && rounds < max_rounds {
        rounds += 1;

        let mut record = BattleRoundRecord {
            round: rounds,
            first_mover: Side::Attacker,
            attacker: SideRound::default(),
            defender: SideRound::default(),
        };
        record.attacker.regen = fighters[0].regenerate();
        record.defender.regen = fighters[1].regenerate();

        let first = initiative(attacker, defender, rng);
        record.first_mover = first;

        for side in [first, first.other()] {
            let (striker, target) = (side.index(), side.other().index());
            let outcome = resolve_attack(
                fighters[striker].combatant,
                fighters[target].combatant,
                rules,
                rng,
            );
            fighters[striker].record_strike(&outcome);
            // Not truncated to whole points, unlike projected stats
            fighters[target].health -= outcome.final_damage;

            let entry = match side {
                Side::Attacker => &mut record.attacker,
                Side::Defender => &mut record.defender,
            };
            entry.damage = outcome.final_damage;
            entry.is_critical = outcome.is_critical;
            entry.is_hit = outcome.is_hit;
            entry.outcome = Some(outcome);

            if !fighters[target].is_alive() {
                break;
            }
        }

        record.attacker.health_after = fighters[0].health.max(0.0);
        record.defender.health_after = fighters[1].health.max(0.0);
        tracing::debug!(
            round = rounds,
            first = ?first,
            attacker_health = record.attacker.health_after,
            defender_health = record.defender.health_after,
            "round resolved"
        );
        history.push(record);
    }

    let [a, d] = &fighters;
    let (winner, winner_name) = match (a.is_alive(), d.is_alive()) {
        (true, false) => (Winner::Attacker, Some(attacker.name.clone())),
        (false, true) => (Winner::Defender, Some(defender.name.clone())),
        _ => (Winner::Draw, None),
    };
    let max_rounds_reached = a.is_alive() && d.is_alive();

    Ok(FightResult {
        winner,
        winner_name,
        rounds,
        max_rounds_reached,
        attacker: a.summary(rounds),
        defender: d.summary(rounds),
        history,
    })
}
