//! Address tokens for hardware entities.
//!
//! An address token names either a program block (`DB12`, `FB*`) or a
//! memory operand (`M204.1`, `MW*`, `PIW256`). The `*` marker requests
//! automatic assignment. Tokens that do not match the grammar are not an
//! error; configuration may reference non-hardware entities and those
//! pass through untouched.
use core::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use s7gen_problems::Problem;

use crate::core::SourceSpan;
use crate::diagnostic::{Diagnostic, Label};

/// A program-organization category that receives a block number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    DataBlock,
    FunctionBlock,
    Function,
}

impl BlockKind {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            BlockKind::DataBlock => "DB",
            BlockKind::FunctionBlock => "FB",
            BlockKind::Function => "FC",
        }
    }
}

impl TryFrom<&str> for BlockKind {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "DB" => Ok(BlockKind::DataBlock),
            "FB" => Ok(BlockKind::FunctionBlock),
            "FC" => Ok(BlockKind::Function),
            _ => Err("Value must be one of DB, FB, FC"),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// An addressable memory area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryArea {
    /// Flag (marker) memory
    Flag,
    /// Process-image input
    Input,
    /// Process-image output
    Output,
    /// Peripheral input (direct I/O read)
    PeripheralInput,
    /// Peripheral output (direct I/O write)
    PeripheralOutput,
}

/// The storage width of a memory-area resource, which determines the
/// required alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    /// 1 bit, no alignment
    Bit,
    /// 8 bits, aligned to a byte boundary
    Byte,
    /// 16 bits, aligned so the field does not straddle an odd byte
    Word,
    /// 32 bits, aligned to a 16-bit boundary
    DoubleWord,
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SizeClass::Bit => "BIT",
            SizeClass::Byte => "BYTE",
            SizeClass::Word => "WORD",
            SizeClass::DoubleWord => "DWORD",
        };
        f.write_str(text)
    }
}

/// The operand mnemonic for an area at a width, as written in source text.
pub fn operand_mnemonic(area: MemoryArea, size: SizeClass) -> &'static str {
    match (area, size) {
        (MemoryArea::Flag, SizeClass::Bit) => "M",
        (MemoryArea::Flag, SizeClass::Byte) => "MB",
        (MemoryArea::Flag, SizeClass::Word) => "MW",
        (MemoryArea::Flag, SizeClass::DoubleWord) => "MD",
        (MemoryArea::Input, SizeClass::Word) => "IW",
        (MemoryArea::Input, _) => "I",
        (MemoryArea::Output, SizeClass::Word) => "QW",
        (MemoryArea::Output, _) => "Q",
        (MemoryArea::PeripheralInput, _) => "PIW",
        (MemoryArea::PeripheralOutput, _) => "PQW",
    }
}

/// A byte.bit position in a memory area.
///
/// The notation is decimal-like but the fractional digit is a bit index
/// 0-7, not a true decimal fraction: `204.1` is byte 204, bit 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitAddress {
    pub byte: u16,
    pub bit: u8,
}

impl BitAddress {
    pub fn new(byte: u16, bit: u8, span: &SourceSpan) -> Result<Self, Diagnostic> {
        if bit > 7 {
            return Err(Diagnostic::problem(
                Problem::InvalidAddress,
                Label::span(span.clone(), "bit index must be 0-7"),
            )
            .with_context("address", &format!("{}.{}", byte, bit)));
        }
        Ok(Self { byte, bit })
    }

    /// The unambiguous integer form of the address.
    pub fn bit_offset(&self) -> u32 {
        u32::from(self.byte) * 8 + u32::from(self.bit)
    }

    /// The inverse of [BitAddress::bit_offset]. Exact for all valid inputs.
    pub fn from_bit_offset(offset: u32) -> Self {
        Self {
            byte: (offset / 8) as u16,
            bit: (offset % 8) as u8,
        }
    }
}

impl fmt::Display for BitAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}.{}", self.byte, self.bit))
    }
}

/// A parsed address token.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressToken {
    /// A program block. `number` is `None` for the `*` marker.
    Block {
        kind: BlockKind,
        number: Option<u16>,
    },
    /// A memory operand. `address` is `None` for the `*` marker.
    Memory {
        area: MemoryArea,
        size: SizeClass,
        address: Option<BitAddress>,
    },
    /// A token outside the recognized grammar, passed through untouched.
    Other(String),
}

lazy_static! {
    static ref BLOCK_ADDRESS: Regex = Regex::new(r"^(DB|FB|FC)\s*(\*|\d+)$").unwrap();
    static ref MEMORY_ADDRESS: Regex =
        Regex::new(r"^(PIW|PQW|MW|MD|IW|QW|M|I|Q)\s*(\*|\d+(?:\.\d+)?)$").unwrap();
}

impl AddressToken {
    /// Parses an address token.
    ///
    /// A token that does not match the grammar at all is `Other`. A token
    /// that matches but carries an invalid position (bit index above 7,
    /// block number above the block range) is an error.
    pub fn parse(raw: &str, span: &SourceSpan) -> Result<Self, Diagnostic> {
        let raw = raw.trim();

        if let Some(cap) = BLOCK_ADDRESS.captures(raw) {
            let kind = BlockKind::try_from(&cap[1]).map_err(|e| {
                Diagnostic::problem(Problem::InvalidAddress, Label::span(span.clone(), e))
            })?;
            let number = match &cap[2] {
                "*" => None,
                digits => Some(digits.parse::<u16>().map_err(|_e| {
                    Diagnostic::problem(
                        Problem::InvalidAddress,
                        Label::span(span.clone(), "block number out of range"),
                    )
                    .with_context("address", raw)
                })?),
            };
            return Ok(AddressToken::Block { kind, number });
        }

        if let Some(cap) = MEMORY_ADDRESS.captures(raw) {
            let (area, size) = match &cap[1] {
                "M" => (MemoryArea::Flag, SizeClass::Bit),
                "MW" => (MemoryArea::Flag, SizeClass::Word),
                "MD" => (MemoryArea::Flag, SizeClass::DoubleWord),
                "I" => (MemoryArea::Input, SizeClass::Bit),
                "IW" => (MemoryArea::Input, SizeClass::Word),
                "PIW" => (MemoryArea::PeripheralInput, SizeClass::Word),
                "Q" => (MemoryArea::Output, SizeClass::Bit),
                "QW" => (MemoryArea::Output, SizeClass::Word),
                "PQW" => (MemoryArea::PeripheralOutput, SizeClass::Word),
                _ => unreachable!("pattern only matches the alternatives above"),
            };
            let address = match &cap[2] {
                "*" => None,
                position => {
                    let (byte, bit) = match position.split_once('.') {
                        Some((byte, bit)) => (byte, bit),
                        None => (position, "0"),
                    };
                    let parse_part = |part: &str| {
                        part.parse::<u16>().map_err(|_e| {
                            Diagnostic::problem(
                                Problem::InvalidAddress,
                                Label::span(span.clone(), "address position out of range"),
                            )
                            .with_context("address", raw)
                        })
                    };
                    let byte = parse_part(byte)?;
                    let bit = parse_part(bit)?;
                    let bit = u8::try_from(bit).map_err(|_e| {
                        Diagnostic::problem(
                            Problem::InvalidAddress,
                            Label::span(span.clone(), "bit index must be 0-7"),
                        )
                        .with_context("address", raw)
                    })?;
                    Some(BitAddress::new(byte, bit, span)?)
                }
            };
            return Ok(AddressToken::Memory {
                area,
                size,
                address,
            });
        }

        Ok(AddressToken::Other(raw.to_string()))
    }

    /// True when the token carries the automatic-assignment marker.
    pub fn is_auto(&self) -> bool {
        matches!(
            self,
            AddressToken::Block { number: None, .. }
                | AddressToken::Memory { address: None, .. }
        )
    }
}

impl fmt::Display for AddressToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressToken::Block { kind, number } => match number {
                Some(number) => write!(f, "{}{}", kind.mnemonic(), number),
                None => write!(f, "{}*", kind.mnemonic()),
            },
            AddressToken::Memory {
                area,
                size,
                address,
            } => match address {
                Some(address) if *size == SizeClass::Bit => {
                    write!(f, "{}{}", operand_mnemonic(*area, *size), address)
                }
                Some(address) => {
                    write!(f, "{}{}", operand_mnemonic(*area, *size), address.byte)
                }
                None => write!(f, "{}*", operand_mnemonic(*area, *size)),
            },
            AddressToken::Other(raw) => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_when_block_with_number_then_block_token() {
        let token = AddressToken::parse("DB12", &SourceSpan::default()).unwrap();
        assert_eq!(
            AddressToken::Block {
                kind: BlockKind::DataBlock,
                number: Some(12)
            },
            token
        );
    }

    #[test]
    fn parse_when_block_wildcard_then_auto() {
        let token = AddressToken::parse("FB*", &SourceSpan::default()).unwrap();
        assert!(token.is_auto());
    }

    #[test]
    fn parse_when_memory_bit_then_byte_and_bit() {
        let token = AddressToken::parse("M204.1", &SourceSpan::default()).unwrap();
        assert_eq!(
            AddressToken::Memory {
                area: MemoryArea::Flag,
                size: SizeClass::Bit,
                address: Some(BitAddress { byte: 204, bit: 1 }),
            },
            token
        );
    }

    #[test]
    fn parse_when_memory_word_then_word_size() {
        let token = AddressToken::parse("PIW256", &SourceSpan::default()).unwrap();
        assert_eq!(
            AddressToken::Memory {
                area: MemoryArea::PeripheralInput,
                size: SizeClass::Word,
                address: Some(BitAddress { byte: 256, bit: 0 }),
            },
            token
        );
    }

    #[test]
    fn parse_when_bit_index_above_seven_then_invalid_address() {
        let err = AddressToken::parse("M2.8", &SourceSpan::default()).unwrap_err();
        assert_eq!("P0003", err.code);
    }

    #[test]
    fn parse_when_outside_grammar_then_passes_through() {
        let token = AddressToken::parse("VAT_1", &SourceSpan::default()).unwrap();
        assert_eq!(AddressToken::Other("VAT_1".to_string()), token);
    }

    #[test]
    fn display_when_memory_word_then_byte_only() {
        let token = AddressToken::parse("MW204", &SourceSpan::default()).unwrap();
        assert_eq!("MW204", format!("{token}"));
    }

    proptest! {
        #[test]
        fn bit_offset_round_trips(byte in 0u16..=u16::MAX, bit in 0u8..8u8) {
            let address = BitAddress { byte, bit };
            let round_tripped = BitAddress::from_bit_offset(address.bit_offset());
            prop_assert_eq!(address, round_tripped);
        }
    }
}
