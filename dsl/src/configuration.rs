//! Provides definitions of the configuration elements that reference or
//! declare symbols.
//!
//! Raw descriptors arrive from the configuration-reading layer already
//! split into the two possible shapes; nothing downstream inspects field
//! presence at runtime to decide what a descriptor is.
use core::fmt;
use std::hash::{Hash, Hasher};

use crate::core::{Id, Located, SourceSpan};

/// Implements a type identifier.
///
/// Types are all identifiers but we use a separate structure because it
/// is convenient to treat types and other identifiers separately.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeName {
    pub name: Id,
}

impl TypeName {
    /// Converts a `&str` into a `TypeName`.
    pub fn from(str: &str) -> Self {
        Self {
            name: Id::from(str),
        }
    }

    pub fn from_id(name: &Id) -> Self {
        Self { name: name.clone() }
    }
}

impl Eq for TypeName {}

impl Hash for TypeName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Located for TypeName {
    fn span(&self) -> SourceSpan {
        self.name.span()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}", &self.name))
    }
}

/// A symbol declared by a configuration entry: a name, an address token,
/// an optional type and an optional comment.
#[derive(Clone, Debug, PartialEq)]
pub struct IntrinsicSymbol {
    pub name: Id,
    /// The raw address token, such as `DB12`, `M204.1` or `MW*`.
    pub address: String,
    pub data_type: Option<TypeName>,
    pub comment: Option<String>,
    pub span: SourceSpan,
}

impl IntrinsicSymbol {
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            name: Id::from(name),
            address: address.to_string(),
            data_type: None,
            comment: None,
            span: SourceSpan::default(),
        }
    }

    pub fn with_type(mut self, data_type: TypeName) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = span;
        self
    }
}

/// A use of a symbol declared elsewhere, possibly later in the
/// configuration than this reference.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolReference {
    pub name: Id,
    pub span: SourceSpan,
}

impl SymbolReference {
    pub fn new(name: &str) -> Self {
        Self {
            name: Id::from(name),
            span: SourceSpan::default(),
        }
    }
}

/// A raw symbol descriptor from a configuration section.
#[derive(Clone, Debug, PartialEq)]
pub enum RawSymbol {
    /// Declares a symbol.
    Intrinsic(IntrinsicSymbol),
    /// References a symbol declared elsewhere.
    Reference(SymbolReference),
}

impl RawSymbol {
    pub fn name(&self) -> &Id {
        match self {
            RawSymbol::Intrinsic(symbol) => &symbol.name,
            RawSymbol::Reference(reference) => &reference.name,
        }
    }
}

impl Located for RawSymbol {
    fn span(&self) -> SourceSpan {
        match self {
            RawSymbol::Intrinsic(symbol) => symbol.span.clone(),
            RawSymbol::Reference(reference) => reference.span.clone(),
        }
    }
}

impl fmt::Display for RawSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawSymbol::Intrinsic(symbol) => {
                write!(f, "{} {}", symbol.name, symbol.address)
            }
            RawSymbol::Reference(reference) => write!(f, "-> {}", reference.name),
        }
    }
}

/// One configuration section: an ordered run of symbol descriptors that
/// share a default type.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub name: Id,
    /// The type assumed for descriptors in this section that carry none.
    pub default_type: Option<TypeName>,
    pub symbols: Vec<RawSymbol>,
}

impl Section {
    pub fn new(name: &str) -> Self {
        Self {
            name: Id::from(name),
            default_type: None,
            symbols: vec![],
        }
    }

    pub fn with_default_type(mut self, default_type: TypeName) -> Self {
        self.default_type = Some(default_type);
        self
    }

    pub fn with_symbol(mut self, symbol: RawSymbol) -> Self {
        self.symbols.push(symbol);
        self
    }
}

/// All configuration sections belonging to one target device, in
/// document order. Document order is load-bearing: re-reading the same
/// configuration in a different order produces different automatic
/// assignments.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceConfiguration {
    pub device: Id,
    pub sections: Vec<Section>,
}

impl DeviceConfiguration {
    pub fn new(device: &str) -> Self {
        Self {
            device: Id::from(device),
            sections: vec![],
        }
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_symbol_when_intrinsic_then_name_and_display() {
        let symbol = RawSymbol::Intrinsic(
            IntrinsicSymbol::new("Motor_1", "DB12").with_comment("drive control"),
        );
        assert_eq!(&Id::from("MOTOR_1"), symbol.name());
        assert_eq!("Motor_1 DB12", format!("{symbol}"));
    }

    #[test]
    fn section_builder_then_keeps_symbol_order() {
        let section = Section::new("motors")
            .with_symbol(RawSymbol::Intrinsic(IntrinsicSymbol::new("A", "DB*")))
            .with_symbol(RawSymbol::Intrinsic(IntrinsicSymbol::new("B", "DB*")));
        assert_eq!(2, section.symbols.len());
        assert_eq!(&Id::from("A"), section.symbols[0].name());
    }
}
