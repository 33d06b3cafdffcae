//! Fixed-column plain-text export of a resolved symbol table.
//!
//! One row per symbol, in registration order. Columns are fixed width
//! and byte-exact; downstream import tooling reads the file by column
//! position, not by delimiter. Every row is 127 characters:
//!
//! ```text
//! 126,<name:23><kind:4><number:>5><bit:2><type-kind:4><type-number:>5><comment:80>
//! ```
//!
//! The record marker `126,` identifies the row format version. Primitive
//! resolved types have no number and occupy the type kind and number
//! columns as one left-justified field. Tokens outside the address
//! grammar occupy the kind, number and bit columns as one left-justified
//! field.

use s7gen_dsl::address::{operand_mnemonic, AddressToken, SizeClass};

use crate::symbol_table::{Symbol, SymbolTable};

pub const RECORD_MARKER: &str = "126,";

const NAME_WIDTH: usize = 23;
const KIND_WIDTH: usize = 4;
const NUMBER_WIDTH: usize = 5;
const BIT_WIDTH: usize = 2;
const COMMENT_WIDTH: usize = 80;

/// Renders the whole registry, one row per symbol, with a trailing
/// newline on every row.
pub fn export(table: &SymbolTable) -> String {
    let mut out = String::new();
    for symbol in table.symbols() {
        export_symbol(&mut out, symbol);
        out.push('\n');
    }
    out
}

fn export_symbol(out: &mut String, symbol: &Symbol) {
    out.push_str(RECORD_MARKER);
    push_left(out, symbol.name.original(), NAME_WIDTH);

    match &symbol.address {
        AddressToken::Block { kind, number } => {
            push_left(out, kind.mnemonic(), KIND_WIDTH);
            let number = number.map(|number| number.to_string()).unwrap_or_default();
            push_right(out, &number, NUMBER_WIDTH);
            push_left(out, "", BIT_WIDTH);
        }
        AddressToken::Memory {
            area,
            size,
            address,
        } => {
            push_left(out, operand_mnemonic(*area, *size), KIND_WIDTH);
            let (byte, bit) = match address {
                Some(address) => {
                    let bit = if *size == SizeClass::Bit {
                        format!(".{}", address.bit)
                    } else {
                        String::new()
                    };
                    (address.byte.to_string(), bit)
                }
                None => (String::new(), String::new()),
            };
            push_right(out, &byte, NUMBER_WIDTH);
            push_left(out, &bit, BIT_WIDTH);
        }
        AddressToken::Other(raw) => {
            push_left(out, raw, KIND_WIDTH + NUMBER_WIDTH + BIT_WIDTH);
        }
    }

    match &symbol.resolved_type {
        Some(resolved) => match resolved.number {
            Some(number) => {
                push_left(out, &resolved.kind, KIND_WIDTH);
                push_right(out, &number.to_string(), NUMBER_WIDTH);
            }
            None => push_left(out, &resolved.kind, KIND_WIDTH + NUMBER_WIDTH),
        },
        None => push_left(out, "", KIND_WIDTH + NUMBER_WIDTH),
    }

    push_left(out, symbol.comment.as_deref().unwrap_or(""), COMMENT_WIDTH);
}

/// Left-justified field, truncated to the column width.
fn push_left(out: &mut String, text: &str, width: usize) {
    let mut written = 0;
    for ch in text.chars().take(width) {
        out.push(ch);
        written += 1;
    }
    for _ in written..width {
        out.push(' ');
    }
}

/// Right-justified field, truncated to the column width.
fn push_right(out: &mut String, text: &str, width: usize) {
    let length = text.chars().count().min(width);
    for _ in length..width {
        out.push(' ');
    }
    for ch in text.chars().take(width) {
        out.push(ch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use s7gen_dsl::configuration::{DeviceConfiguration, IntrinsicSymbol, RawSymbol, Section};

    use crate::stages;

    const ROW_WIDTH: usize = 127;

    fn resolved_table(section: Section) -> SymbolTable {
        let configuration = DeviceConfiguration::new("plc1").with_section(section);
        stages::resolve(&configuration).unwrap()
    }

    fn row_for<'a>(rendered: &'a str, name: &str) -> &'a str {
        rendered
            .lines()
            .find(|line| line[RECORD_MARKER.len()..].starts_with(name))
            .unwrap()
    }

    #[test]
    fn export_when_block_symbol_then_fixed_columns() {
        let table = resolved_table(
            Section::new("blocks")
                .with_symbol(RawSymbol::Intrinsic(IntrinsicSymbol::new("Motor_1", "DB12"))),
        );
        let rendered = export(&table);
        let row = row_for(&rendered, "Motor_1");
        assert_eq!(ROW_WIDTH, row.chars().count());
        assert!(row.starts_with("126,Motor_1                DB     12  DB     12"));
        // Comment column is all blanks.
        assert_eq!(" ".repeat(80), row[row.len() - 80..]);
    }

    #[test]
    fn export_when_bit_symbol_then_bit_suffix_column() {
        let table = resolved_table(
            Section::new("flags")
                .with_symbol(RawSymbol::Intrinsic(IntrinsicSymbol::new("Running", "M10.0"))),
        );
        let rendered = export(&table);
        let row = row_for(&rendered, "Running");
        assert_eq!(ROW_WIDTH, row.chars().count());
        assert!(row.starts_with("126,Running                M      10.0BOOL"));
    }

    #[test]
    fn export_when_word_symbol_then_no_bit_suffix() {
        let table = resolved_table(
            Section::new("inputs")
                .with_symbol(RawSymbol::Intrinsic(IntrinsicSymbol::new("Speed", "PIW256"))),
        );
        let rendered = export(&table);
        let row = row_for(&rendered, "Speed");
        assert!(row.starts_with("126,Speed                  PIW   256  WORD"));
    }

    #[test]
    fn export_when_comment_then_padded_to_comment_column() {
        let table = resolved_table(
            Section::new("blocks").with_symbol(RawSymbol::Intrinsic(
                IntrinsicSymbol::new("Motor_1", "DB12").with_comment("drive control"),
            )),
        );
        let rendered = export(&table);
        let row = row_for(&rendered, "Motor_1");
        assert_eq!(ROW_WIDTH, row.chars().count());
        assert_eq!(
            format!("{:<80}", "drive control"),
            row[row.len() - 80..].to_string()
        );
    }

    #[test]
    fn export_when_other_token_then_spans_address_columns() {
        let table = resolved_table(
            Section::new("tables")
                .with_symbol(RawSymbol::Intrinsic(IntrinsicSymbol::new("Watch", "VAT_1"))),
        );
        let rendered = export(&table);
        let row = row_for(&rendered, "Watch");
        assert_eq!(ROW_WIDTH, row.chars().count());
        assert!(row.starts_with("126,Watch                  VAT_1      "));
    }

    #[test]
    fn export_when_builtin_placeholder_resolved_then_present() {
        let table = resolved_table(Section::new("empty"));
        let rendered = export(&table);
        let row = row_for(&rendered, "MW_SCAN_COUNT");
        assert!(row.starts_with("126,MW_SCAN_COUNT          MW      2  WORD"));
        assert!(row.contains("Scan cycle counter"));
    }

    #[test]
    fn export_when_every_row_then_uniform_width() {
        let table = resolved_table(
            Section::new("mixed")
                .with_symbol(RawSymbol::Intrinsic(IntrinsicSymbol::new("A", "FB*")))
                .with_symbol(RawSymbol::Intrinsic(IntrinsicSymbol::new("B", "MD*")))
                .with_symbol(RawSymbol::Intrinsic(IntrinsicSymbol::new("C", "Q4.7"))),
        );
        let rendered = export(&table);
        for line in rendered.lines() {
            assert_eq!(ROW_WIDTH, line.chars().count());
            assert!(line.starts_with(RECORD_MARKER));
        }
    }
}
