//! Built-in names known to every device: the primitive type names and
//! the reserved symbols seeded into each registry.

use phf::{phf_set, Set};
use s7gen_dsl::core::Id;

static PRIMITIVE_TYPES_LOWER_CASE: Set<&'static str> = phf_set! {
    "bool",
    "byte",
    "char",
    "word",
    "dword",
    "int",
    "dint",
    "real",
    "time",
    "s5time",
    "date",
    "time_of_day",
    "counter",
    "timer",
};

/// True when the name is a primitive type that resolves without a
/// registry lookup.
pub(crate) fn is_primitive_type(id: &Id) -> bool {
    PRIMITIVE_TYPES_LOWER_CASE.contains(id.lower_case().as_str())
}

/// A reserved symbol seeded into every registry before any user
/// configuration is read.
///
/// The address is a placeholder. User configuration may overwrite it
/// exactly once without raising a duplicate-name error; a zero block
/// number left in place assigns automatically.
pub(crate) struct ReservedSymbol {
    pub name: &'static str,
    pub address: &'static str,
    pub data_type: Option<&'static str>,
    pub comment: &'static str,
}

pub(crate) const RESERVED_SYMBOLS: &[ReservedSymbol] = &[
    ReservedSymbol {
        name: "DB_SYSTEM",
        address: "DB0",
        data_type: None,
        comment: "Generator scratch data",
    },
    ReservedSymbol {
        name: "FC_CLOCK",
        address: "FC0",
        data_type: None,
        comment: "Cyclic clock distribution",
    },
    ReservedSymbol {
        name: "M_ALWAYS_ON",
        address: "M0.0",
        data_type: Some("BOOL"),
        comment: "Flag that is always TRUE",
    },
    ReservedSymbol {
        name: "M_ALWAYS_OFF",
        address: "M0.1",
        data_type: Some("BOOL"),
        comment: "Flag that is always FALSE",
    },
    ReservedSymbol {
        name: "MW_SCAN_COUNT",
        address: "MW*",
        data_type: Some("WORD"),
        comment: "Scan cycle counter",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_primitive_type_when_any_case_then_true() {
        assert!(is_primitive_type(&Id::from("bool")));
        assert!(is_primitive_type(&Id::from("DWord")));
        assert!(!is_primitive_type(&Id::from("Motor_1")));
    }
}
