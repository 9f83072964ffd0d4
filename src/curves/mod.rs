//! Growth curves: the six shape functions, parameter validation and
//! two-point calibration.

#![allow(unused_imports)]

pub mod calibration;
pub mod library;
pub mod types;

pub use calibration::{solve, Calibration};
pub use library::*;
pub use types::*;
