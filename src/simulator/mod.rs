//! Battle simulator for balance analysis.
//!
//! - Sample many independent attacks to compare realized and expected rates
//! - Fight two combatants to the death with a full round log
//! - Run seeded series of fights and aggregate win rates
//!
//! All of it runs on the damage model in `combat::damage`, so simulated
//! numbers match single-attack resolution exactly.

mod config;
mod duel;
mod exchange_sim;
mod report;
mod runner;

pub use config::SimConfig;
pub use duel::{fight_to_death, BattleRoundRecord, FightResult, Side, SideRound, SideSummary, Winner};
pub use exchange_sim::{simulate_exchanges, ExchangeReport};
pub use report::{DuelSummary, SeriesReport};
pub use runner::{
    resolve_pair, run_duel_series, run_stored_duel, run_stored_exchanges, run_stored_series,
};
