use serde::{Deserialize, Serialize};

use crate::character::attributes::{AttributeType, Attributes};
use crate::character::record::CharacterRecord;
use crate::core::config::CombatConfig;
use crate::core::constants::DEFAULT_CRIT_MULTIPLIER;

/// Immutable snapshot of one side of a fight.
///
/// The engine only ever reads combatants, so a fight never touches the
/// record it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub level: u32,
    pub attributes: Attributes,
}

impl Combatant {
    pub fn new(name: impl Into<String>, level: u32, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            level,
            attributes,
        }
    }

    /// A level 1 combatant, for formula checks that ignore levels.
    pub fn from_attributes(name: impl Into<String>, attributes: Attributes) -> Self {
        Self::new(name, 1, attributes)
    }

    pub fn from_record(record: &CharacterRecord) -> Self {
        Self::new(record.name(), record.level(), record.attributes().clone())
    }

    pub fn stat(&self, attr: AttributeType) -> f64 {
        self.attributes.stat(attr)
    }
}

/// Forces hit and crit rolls instead of drawing them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollOverrides {
    pub is_hit: Option<bool>,
    pub is_critical: Option<bool>,
}

impl RollOverrides {
    pub fn forced(is_hit: bool, is_critical: bool) -> Self {
        Self {
            is_hit: Some(is_hit),
            is_critical: Some(is_critical),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatRules {
    pub critical_multiplier: f64,
    pub overrides: RollOverrides,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            critical_multiplier: DEFAULT_CRIT_MULTIPLIER,
            overrides: RollOverrides::default(),
        }
    }
}

impl CombatRules {
    pub fn from_config(config: &CombatConfig) -> Self {
        Self {
            critical_multiplier: config.critical_multiplier,
            ..Self::default()
        }
    }

    pub fn with_overrides(mut self, overrides: RollOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Every intermediate of one resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub final_damage: f64,
    pub is_critical: bool,
    pub is_hit: bool,
    pub hit_rate: f64,
    pub base_damage: f64,
    pub level_factor: f64,
    pub damage_after_level: f64,
    pub crit_rate: f64,
    /// Multiplier actually applied: the crit multiplier on a crit, else 1.
    pub critical_multiplier: f64,
    pub damage_after_crit: f64,
    pub boost_factor: f64,
    pub reduction_factor: f64,
}
