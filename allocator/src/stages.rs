//! The resolution driver.
//!
//! Turns one device's configuration into a resolved symbol table in two
//! passes: register every name, then fix addresses and resolve types.
//! Any error aborts the device; there is no partial output.

use log::debug;

use s7gen_dsl::configuration::DeviceConfiguration;
use s7gen_dsl::diagnostic::Diagnostic;

use crate::symbol_table::{AllocatorSeeds, SymbolTable};

/// Resolves the configuration into a symbol table with default seeds.
pub fn resolve(configuration: &DeviceConfiguration) -> Result<SymbolTable, Vec<Diagnostic>> {
    resolve_with_seeds(configuration, AllocatorSeeds::default())
}

/// Resolves the configuration into a symbol table.
///
/// Sections and the symbols within them are taken in document order.
/// Order is a contract: it determines every automatic assignment, and
/// re-running unchanged configuration must reproduce identical numbers.
pub fn resolve_with_seeds(
    configuration: &DeviceConfiguration,
    seeds: AllocatorSeeds,
) -> Result<SymbolTable, Vec<Diagnostic>> {
    let mut table = SymbolTable::with_seeds(&configuration.device, seeds);

    debug!("Registering symbols for device {}", configuration.device);
    for section in &configuration.sections {
        debug!("Registering section {}", section.name);
        for symbol in &section.symbols {
            table
                .register(symbol, section.default_type.as_ref())
                .map_err(|diagnostic| vec![diagnostic])?;
        }
    }

    debug!("Assigning addresses for device {}", configuration.device);
    table
        .assign_addresses()
        .map_err(|diagnostic| vec![diagnostic])?;

    debug!("Resolving types for device {}", configuration.device);
    table
        .resolve_types()
        .map_err(|diagnostic| vec![diagnostic])?;

    Ok(table)
}
