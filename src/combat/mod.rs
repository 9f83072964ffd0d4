//! Combat snapshots, rules and the damage model.

#![allow(unused_imports)]

pub mod damage;
pub mod types;

pub use damage::*;
pub use types::*;
