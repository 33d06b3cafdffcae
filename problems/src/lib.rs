//! Defines the set of problems (errors and warnings) that the symbol
//! generator can detect, each with a stable user-facing code.
//!
//! The enumeration is generated at build time from
//! `resources/problem-codes.csv` so that the list of codes stays in one
//! easily-reviewed place.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_when_symbol_name_in_use_then_returns_stable_code() {
        assert_eq!("P0004", Problem::SymbolNameInUse.code());
    }

    #[test]
    fn message_when_type_not_declared_then_returns_constant_message() {
        assert_eq!(
            "Type name is not declared anywhere in the symbol table",
            Problem::TypeNotDeclared.message()
        );
    }
}
