// Allow large errors because this is a compiler-like tool - we expect
// large errors.
#![allow(clippy::result_large_err)]

//! Assigns unique hardware identifiers (block numbers and byte/bit
//! memory addresses) to the symbols of one target device and resolves
//! every symbolic type reference to a concrete, typed address.

extern crate s7gen_dsl;

mod block;
mod builtins;
mod cursor;
pub mod export;
mod memory;
mod result;
pub mod stages;
pub mod symbol_table;
