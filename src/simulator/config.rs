//! Simulation configuration.

use crate::combat::CombatRules;
use crate::core::config::ForgeConfig;
use crate::core::constants::{DEFAULT_EXCHANGE_SAMPLES, DEFAULT_MAX_ROUNDS, DEFAULT_SERIES_RUNS};

/// Configuration for a batch of duels or exchange samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Number of fights in a series
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Round cap per fight
    pub max_rounds: u32,

    /// Attacks sampled by exchange simulation
    pub exchange_samples: u32,

    pub rules: CombatRules,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: DEFAULT_SERIES_RUNS,
            seed: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            exchange_samples: DEFAULT_EXCHANGE_SAMPLES,
            rules: CombatRules::default(),
        }
    }
}

impl SimConfig {
    /// Defaults taken from the `[combat]` section of the tool config.
    pub fn from_config(config: &ForgeConfig) -> Self {
        Self {
            num_runs: config.combat.series_runs,
            seed: None,
            max_rounds: config.combat.max_rounds,
            exchange_samples: config.combat.exchange_samples,
            rules: CombatRules::from_config(&config.combat),
        }
    }

    /// Quick config for a reproducible series
    pub fn seeded(num_runs: u32, seed: u64) -> Self {
        Self {
            num_runs,
            seed: Some(seed),
            ..Default::default()
        }
    }
}
