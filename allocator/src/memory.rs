//! Allocates byte.bit addresses within one memory area.

use std::collections::HashSet;

use s7gen_dsl::address::{BitAddress, SizeClass};
use s7gen_dsl::core::SourceSpan;
use s7gen_dsl::diagnostic::{Diagnostic, Label};
use s7gen_problems::Problem;

use crate::cursor::Cursor;

/// The boundary a size class must sit on, applied to a linear bit offset.
fn align(offset: u32, size: SizeClass) -> u32 {
    match size {
        SizeClass::Bit => offset,
        SizeClass::Byte => round_up(offset, 8),
        SizeClass::Word => {
            // Align to a byte first, then make sure the field does not
            // straddle an odd byte.
            let aligned = round_up(offset, 8);
            if aligned % 16 != 0 {
                round_up(aligned, 16)
            } else {
                aligned
            }
        }
        SizeClass::DoubleWord => round_up(offset, 16),
    }
}

/// How far an automatic reservation advances the cursor, in bits.
///
/// A double-word advances by its 16-bit boundary unit rather than its
/// full 32-bit width. Generated projects depend on the resulting
/// numbering, so this is contract, not a rounding mistake to correct.
fn stride(size: SizeClass) -> u32 {
    match size {
        SizeClass::Bit => 1,
        SizeClass::Byte => 8,
        SizeClass::Word => 16,
        SizeClass::DoubleWord => 16,
    }
}

fn round_up(offset: u32, boundary: u32) -> u32 {
    let remainder = offset % boundary;
    if remainder == 0 {
        offset
    } else {
        offset + (boundary - remainder)
    }
}

/// Issues byte.bit addresses from a cursor over linear bit offsets
/// (`byte * 8 + bit`), with duplicate detection keyed on
/// `(offset, size class)`.
///
/// Two reservations with the same linear range but different size
/// classes are not cross-checked. A word at 100.0 and a double-word at
/// 100.0 coexist even though they overlap in the underlying memory.
/// Downstream projects may depend on the lenient behavior, so it is
/// kept as-is.
#[derive(Debug)]
pub(crate) struct MemoryAllocator {
    cursor: Cursor,
    used: HashSet<(u32, SizeClass)>,
}

impl MemoryAllocator {
    /// Creates an allocator whose automatic assignment starts at the
    /// given byte.
    pub fn new(start_byte: u16) -> Self {
        Self {
            cursor: Cursor::new(u32::from(start_byte) * 8),
            used: HashSet::new(),
        }
    }

    /// Allocates an address of the given size class.
    ///
    /// Automatic assignment rounds cursor candidates up to the class
    /// boundary until an unused `(offset, size class)` is found. An
    /// explicit address must already sit on the class boundary and must
    /// not have been issued for the same size class.
    pub fn allocate(
        &mut self,
        explicit: Option<BitAddress>,
        size: SizeClass,
        span: &SourceSpan,
    ) -> Result<BitAddress, Diagnostic> {
        match explicit {
            None => loop {
                let candidate = align(self.cursor.peek(), size);
                self.cursor.reserve(candidate, stride(size));
                if self.used.insert((candidate, size)) {
                    return Ok(BitAddress::from_bit_offset(candidate));
                }
            },
            Some(address) => {
                let offset = address.bit_offset();
                if align(offset, size) != offset {
                    return Err(Diagnostic::problem(
                        Problem::MisalignedAddress,
                        Label::span(span.clone(), "explicit address"),
                    )
                    .with_context("address", &address.to_string())
                    .with_context("size", &size.to_string()));
                }
                if !self.used.insert((offset, size)) {
                    return Err(Diagnostic::problem(
                        Problem::AddressInUse,
                        Label::span(span.clone(), "explicit address"),
                    )
                    .with_context("address", &address.to_string())
                    .with_context("size", &size.to_string()));
                }
                self.cursor.reserve(offset, stride(size));
                Ok(address)
            }
        }
    }

    #[allow(dead_code)]
    pub fn is_used(&self, address: BitAddress, size: SizeClass) -> bool {
        self.used.contains(&(address.bit_offset(), size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(byte: u16, bit: u8) -> BitAddress {
        BitAddress { byte, bit }
    }

    #[test]
    fn allocate_when_mixed_sizes_then_aligned_sequence() {
        let mut allocator = MemoryAllocator::new(200);
        let span = SourceSpan::default();

        assert_eq!(
            at(200, 0),
            allocator.allocate(None, SizeClass::Byte, &span).unwrap()
        );
        assert_eq!(
            at(202, 0),
            allocator
                .allocate(None, SizeClass::DoubleWord, &span)
                .unwrap()
        );
        assert_eq!(
            at(204, 0),
            allocator.allocate(None, SizeClass::Bit, &span).unwrap()
        );
        assert_eq!(
            at(204, 1),
            allocator.allocate(None, SizeClass::Bit, &span).unwrap()
        );
        assert_eq!(
            at(206, 0),
            allocator
                .allocate(None, SizeClass::DoubleWord, &span)
                .unwrap()
        );
        assert_eq!(
            at(220, 0),
            allocator
                .allocate(Some(at(220, 0)), SizeClass::DoubleWord, &span)
                .unwrap()
        );
    }

    #[test]
    fn allocate_when_explicit_duplicate_then_address_in_use() {
        let mut allocator = MemoryAllocator::new(200);
        let span = SourceSpan::default();
        allocator.allocate(None, SizeClass::Byte, &span).unwrap();
        let err = allocator
            .allocate(Some(at(200, 0)), SizeClass::Byte, &span)
            .unwrap_err();
        assert_eq!("P0006", err.code);
    }

    #[test]
    fn allocate_when_same_offset_different_size_then_not_cross_checked() {
        let mut allocator = MemoryAllocator::new(0);
        let span = SourceSpan::default();
        allocator
            .allocate(Some(at(100, 0)), SizeClass::Word, &span)
            .unwrap();
        // Overlapping in memory, but a different size class.
        assert_eq!(
            at(100, 0),
            allocator
                .allocate(Some(at(100, 0)), SizeClass::DoubleWord, &span)
                .unwrap()
        );
    }

    #[rstest]
    #[case(at(2, 1), SizeClass::Byte)]
    #[case(at(3, 0), SizeClass::Word)]
    #[case(at(2, 4), SizeClass::Word)]
    #[case(at(5, 0), SizeClass::DoubleWord)]
    fn allocate_when_explicit_off_boundary_then_misaligned(
        #[case] address: BitAddress,
        #[case] size: SizeClass,
    ) {
        let mut allocator = MemoryAllocator::new(0);
        let err = allocator
            .allocate(Some(address), size, &SourceSpan::default())
            .unwrap_err();
        assert_eq!("P0007", err.code);
    }

    #[rstest]
    #[case(at(0, 5), SizeClass::Bit)]
    #[case(at(3, 0), SizeClass::Byte)]
    #[case(at(4, 0), SizeClass::Word)]
    #[case(at(16, 0), SizeClass::DoubleWord)]
    fn allocate_when_explicit_on_boundary_then_ok(
        #[case] address: BitAddress,
        #[case] size: SizeClass,
    ) {
        let mut allocator = MemoryAllocator::new(0);
        assert_eq!(
            address,
            allocator
                .allocate(Some(address), size, &SourceSpan::default())
                .unwrap()
        );
    }

    #[test]
    fn allocate_never_returns_equal_pairs() {
        let mut allocator = MemoryAllocator::new(0);
        let span = SourceSpan::default();
        let mut seen = HashSet::new();
        allocator
            .allocate(Some(at(1, 3)), SizeClass::Bit, &span)
            .unwrap();
        seen.insert((at(1, 3).bit_offset(), SizeClass::Bit));
        for size in [
            SizeClass::Bit,
            SizeClass::Bit,
            SizeClass::Byte,
            SizeClass::Word,
            SizeClass::Bit,
            SizeClass::DoubleWord,
            SizeClass::Byte,
        ] {
            let address = allocator.allocate(None, size, &span).unwrap();
            assert!(seen.insert((address.bit_offset(), size)));
        }
    }
}
