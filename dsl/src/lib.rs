//! Provides definitions of the objects that describe industrial I/O
//! configuration symbols and base implementations of common patterns
//! for working with them.

pub mod address;
pub mod configuration;
pub mod core;
pub mod diagnostic;
pub mod literal;
pub mod time;
