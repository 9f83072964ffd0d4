//! Statforge - RPG Balance Library
//!
//! Character stat sheets, growth-curve projection and combat simulation.
//! The `statforge` binary is a thin front end over these modules.

pub mod build_info;
pub mod character;
pub mod combat;
pub mod core;
pub mod curves;
pub mod error;
pub mod simulator;

pub use error::{ForgeError, Result};
