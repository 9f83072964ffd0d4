//! Character records, attribute projection, generation and the roster.

#![allow(unused_imports)]

pub mod attributes;
pub mod generation;
pub mod manager;
pub mod record;
pub mod resolver;

pub use attributes::*;
pub use generation::*;
pub use manager::*;
pub use record::*;
pub use resolver::*;
