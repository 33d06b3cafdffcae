//! Numeric literals for generated source text.
//!
//! Literals define how data is expressed and are distinct from but
//! associated with data types. Construction fails when the raw input is
//! outside the range representable by the literal's type so that range
//! problems surface at the configuration entry rather than in generated
//! text.
use core::fmt;
use std::str::FromStr;

use s7gen_problems::Problem;

use crate::core::SourceSpan;
use crate::diagnostic::{Diagnostic, Label};

/// The fixed widths at which integers render as two's-complement
/// hexadecimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexWidth {
    /// 8 bits, rendered as `B#16#XX`.
    Byte,
    /// 16 bits, rendered as `W#16#XXXX`.
    Word,
    /// 32 bits, rendered as `DW#16#XXXXXXXX`.
    DoubleWord,
}

impl HexWidth {
    fn mask(&self) -> u32 {
        match self {
            HexWidth::Byte => 0xFF,
            HexWidth::Word => 0xFFFF,
            HexWidth::DoubleWord => 0xFFFF_FFFF,
        }
    }

    fn digits(&self) -> usize {
        match self {
            HexWidth::Byte => 2,
            HexWidth::Word => 4,
            HexWidth::DoubleWord => 8,
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            HexWidth::Byte => "B#16#",
            HexWidth::Word => "W#16#",
            HexWidth::DoubleWord => "DW#16#",
        }
    }
}

/// Renders a signed value as its two's-complement bit pattern at the
/// given width, in fixed-width hexadecimal.
pub fn encode_twos_complement(value: i32, width: HexWidth) -> String {
    let bits = (value as u32) & width.mask();
    format!(
        "{}{:0digits$X}",
        width.prefix(),
        bits,
        digits = width.digits()
    )
}

/// Recovers the signed value from a two's-complement hexadecimal literal.
///
/// The width is taken from the literal's prefix. Underscores are allowed
/// between digits.
pub fn decode_twos_complement(
    input: &str,
    span: &SourceSpan,
) -> Result<(i32, HexWidth), Diagnostic> {
    let out_of_range = |value: &str| {
        Diagnostic::problem(
            Problem::ValueOutOfRange,
            Label::span(span.clone(), "two's-complement hex literal"),
        )
        .with_context("value", value)
    };

    let width = [HexWidth::DoubleWord, HexWidth::Word, HexWidth::Byte]
        .into_iter()
        .find(|w| input.starts_with(w.prefix()))
        .ok_or_else(|| out_of_range(input))?;

    let digits: String = input[width.prefix().len()..]
        .chars()
        .filter(|c| *c != '_')
        .collect();
    let bits = u32::from_str_radix(digits.as_str(), 16).map_err(|_e| out_of_range(input))?;
    if bits > width.mask() {
        return Err(out_of_range(input));
    }

    // Sign extend from the literal's width.
    let sign_bit = (width.mask() >> 1) + 1;
    let value = if bits & sign_bit != 0 {
        (bits | !width.mask()) as i32
    } else {
        bits as i32
    };
    Ok((value, width))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolLiteral {
    pub value: bool,
    pub span: SourceSpan,
}

impl BoolLiteral {
    pub fn new(value: bool, span: SourceSpan) -> Self {
        Self { value, span }
    }
}

impl fmt::Display for BoolLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.value { "TRUE" } else { "FALSE" })
    }
}

/// A bounded signed 16-bit integer literal.
#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteral {
    pub value: i16,
    pub span: SourceSpan,
}

impl IntLiteral {
    pub fn new(value: i64, span: SourceSpan) -> Result<Self, Diagnostic> {
        let value = i16::try_from(value).map_err(|_e| {
            Diagnostic::problem(Problem::ValueOutOfRange, Label::span(span.clone(), "INT value"))
                .with_context("value", &value.to_string())
        })?;
        Ok(Self { value, span })
    }

    pub fn parse(input: &str, span: SourceSpan) -> Result<Self, Diagnostic> {
        let value = i64::from_str(input).map_err(|_e| {
            Diagnostic::problem(Problem::ValueOutOfRange, Label::span(span.clone(), "INT value"))
                .with_context("value", input)
        })?;
        Self::new(value, span)
    }

    pub fn as_hex(&self, width: HexWidth) -> String {
        encode_twos_complement(self.value as i32, width)
    }
}

impl fmt::Display for IntLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}", self.value))
    }
}

/// A bounded signed 32-bit integer literal.
#[derive(Debug, Clone, PartialEq)]
pub struct DintLiteral {
    pub value: i32,
    pub span: SourceSpan,
}

impl DintLiteral {
    pub fn new(value: i64, span: SourceSpan) -> Result<Self, Diagnostic> {
        let value = i32::try_from(value).map_err(|_e| {
            Diagnostic::problem(
                Problem::ValueOutOfRange,
                Label::span(span.clone(), "DINT value"),
            )
            .with_context("value", &value.to_string())
        })?;
        Ok(Self { value, span })
    }

    pub fn parse(input: &str, span: SourceSpan) -> Result<Self, Diagnostic> {
        let value = i64::from_str(input).map_err(|_e| {
            Diagnostic::problem(
                Problem::ValueOutOfRange,
                Label::span(span.clone(), "DINT value"),
            )
            .with_context("value", input)
        })?;
        Self::new(value, span)
    }

    pub fn as_hex(&self, width: HexWidth) -> String {
        encode_twos_complement(self.value, width)
    }
}

impl fmt::Display for DintLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}", self.value))
    }
}

/// A positive integer with no type-imposed upper bound.
///
/// Block numbers and repetition counts are positive integers. A value of
/// zero is representable because configuration uses zero in number
/// positions to mean "not specified".
#[derive(Debug, Clone, PartialEq)]
pub struct PositiveInteger {
    pub value: u64,
    pub span: SourceSpan,
}

impl PositiveInteger {
    pub fn new(value: i64, span: SourceSpan) -> Result<Self, Diagnostic> {
        let value = u64::try_from(value).map_err(|_e| {
            Diagnostic::problem(
                Problem::ValueOutOfRange,
                Label::span(span.clone(), "positive integer"),
            )
            .with_context("value", &value.to_string())
        })?;
        Ok(Self { value, span })
    }

    pub fn parse(input: &str, span: SourceSpan) -> Result<Self, Diagnostic> {
        // Underscores are allowed as digit separators.
        let digits: String = input.chars().filter(|c| *c != '_').collect();
        let value = u64::from_str(digits.as_str()).map_err(|_e| {
            Diagnostic::problem(
                Problem::ValueOutOfRange,
                Label::span(span.clone(), "positive integer"),
            )
            .with_context("value", input)
        })?;
        Ok(Self { value, span })
    }
}

impl fmt::Display for PositiveInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}", self.value))
    }
}

/// A floating value literal.
#[derive(Debug, Clone, PartialEq)]
pub struct RealLiteral {
    pub value: f64,
    pub span: SourceSpan,
}

impl RealLiteral {
    pub fn parse(input: &str, span: SourceSpan) -> Result<Self, Diagnostic> {
        let filtered: String = input.chars().filter(|c| *c != '_').collect();
        let value = f64::from_str(filtered.as_str())
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                Diagnostic::problem(
                    Problem::ValueOutOfRange,
                    Label::span(span.clone(), "REAL value"),
                )
                .with_context("value", input)
            })?;
        Ok(Self { value, span })
    }
}

impl fmt::Display for RealLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:?}", self.value))
    }
}

/// A text literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub span: SourceSpan,
}

impl StringLiteral {
    pub fn new(value: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            value: value.into(),
            span,
        }
    }
}

impl fmt::Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn int_literal_when_in_range_then_ok() {
        let literal = IntLiteral::new(-1, SourceSpan::default()).unwrap();
        assert_eq!(-1, literal.value);
    }

    #[test]
    fn int_literal_when_out_of_range_then_value_out_of_range() {
        let err = IntLiteral::new(40_000, SourceSpan::default()).unwrap_err();
        assert_eq!("P0001", err.code);
    }

    #[test]
    fn positive_integer_when_negative_then_value_out_of_range() {
        let err = PositiveInteger::new(-3, SourceSpan::default()).unwrap_err();
        assert_eq!("P0001", err.code);
    }

    #[test]
    fn encode_when_negative_one_then_all_bits_set() {
        assert_eq!("B#16#FF", encode_twos_complement(-1, HexWidth::Byte));
        assert_eq!("W#16#FFFF", encode_twos_complement(-1, HexWidth::Word));
        assert_eq!(
            "DW#16#FFFFFFFF",
            encode_twos_complement(-1, HexWidth::DoubleWord)
        );
    }

    #[test]
    fn encode_when_positive_then_zero_padded() {
        assert_eq!("W#16#002A", encode_twos_complement(42, HexWidth::Word));
    }

    #[test]
    fn decode_when_digits_exceed_width_then_value_out_of_range() {
        let err = decode_twos_complement("B#16#1FF", &SourceSpan::default()).unwrap_err();
        assert_eq!("P0001", err.code);
    }

    proptest! {
        #[test]
        fn decode_recovers_byte_values(value in i8::MIN..=i8::MAX) {
            let text = encode_twos_complement(value as i32, HexWidth::Byte);
            let (decoded, width) = decode_twos_complement(&text, &SourceSpan::default()).unwrap();
            prop_assert_eq!(HexWidth::Byte, width);
            prop_assert_eq!(value as i32, decoded);
        }

        #[test]
        fn decode_recovers_word_values(value in i16::MIN..=i16::MAX) {
            let text = encode_twos_complement(value as i32, HexWidth::Word);
            let (decoded, _) = decode_twos_complement(&text, &SourceSpan::default()).unwrap();
            prop_assert_eq!(value as i32, decoded);
        }

        #[test]
        fn decode_recovers_double_word_values(value in i32::MIN..=i32::MAX) {
            let text = encode_twos_complement(value, HexWidth::DoubleWord);
            let (decoded, _) = decode_twos_complement(&text, &SourceSpan::default()).unwrap();
            prop_assert_eq!(value, decoded);
        }
    }
}
