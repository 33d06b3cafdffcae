//! Allocates small positive integers for program-block numbers.

use std::collections::HashSet;

use s7gen_dsl::core::SourceSpan;
use s7gen_dsl::diagnostic::{Diagnostic, Label};
use s7gen_problems::Problem;

use crate::cursor::Cursor;

/// Issues unique block numbers from a cursor, with an explicit used-set
/// for duplicate detection.
///
/// Every issued number is unique for the allocator's lifetime. Automatic
/// allocation skips forward past numbers that a previous explicit
/// reservation already claimed.
#[derive(Debug)]
pub(crate) struct BlockAllocator {
    cursor: Cursor,
    used: HashSet<u16>,
}

impl BlockAllocator {
    pub fn new(start: u16) -> Self {
        Self {
            cursor: Cursor::new(u32::from(start)),
            used: HashSet::new(),
        }
    }

    /// Allocates a block number.
    ///
    /// An absent or zero explicit number means automatic assignment:
    /// draw from the cursor until a number not already issued is found.
    /// An explicit non-zero number is an error when already issued.
    pub fn allocate(
        &mut self,
        explicit: Option<u16>,
        span: &SourceSpan,
    ) -> Result<u16, Diagnostic> {
        match explicit.filter(|number| *number != 0) {
            None => loop {
                let candidate = self.cursor.peek() as u16;
                self.cursor.reserve(u32::from(candidate), 1);
                if self.used.insert(candidate) {
                    return Ok(candidate);
                }
            },
            Some(number) => {
                if !self.used.insert(number) {
                    return Err(Diagnostic::problem(
                        Problem::BlockNumberInUse,
                        Label::span(span.clone(), "explicit block number"),
                    )
                    .with_context("number", &number.to_string())
                    .with_context("size", "1"));
                }
                self.cursor.reserve(u32::from(number), 1);
                Ok(number)
            }
        }
    }

    #[allow(dead_code)]
    pub fn is_used(&self, number: u16) -> bool {
        self.used.contains(&number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_when_automatic_then_sequential_from_seed() {
        let mut allocator = BlockAllocator::new(8);
        assert_eq!(8, allocator.allocate(None, &SourceSpan::default()).unwrap());
        assert_eq!(9, allocator.allocate(None, &SourceSpan::default()).unwrap());
    }

    #[test]
    fn allocate_when_explicit_then_number_is_reserved() {
        let mut allocator = BlockAllocator::new(8);
        allocator.allocate(None, &SourceSpan::default()).unwrap();
        allocator.allocate(None, &SourceSpan::default()).unwrap();
        assert_eq!(
            12,
            allocator
                .allocate(Some(12), &SourceSpan::default())
                .unwrap()
        );
    }

    #[test]
    fn allocate_when_explicit_duplicate_then_block_number_in_use() {
        let mut allocator = BlockAllocator::new(8);
        allocator.allocate(Some(12), &SourceSpan::default()).unwrap();
        let err = allocator
            .allocate(Some(12), &SourceSpan::default())
            .unwrap_err();
        assert_eq!("P0005", err.code);
    }

    #[test]
    fn allocate_when_zero_then_treated_as_automatic() {
        let mut allocator = BlockAllocator::new(3);
        assert_eq!(
            3,
            allocator.allocate(Some(0), &SourceSpan::default()).unwrap()
        );
    }

    #[test]
    fn allocate_when_cursor_reaches_claimed_number_then_skips_forward() {
        let mut allocator = BlockAllocator::new(8);
        allocator.allocate(None, &SourceSpan::default()).unwrap();
        allocator.allocate(None, &SourceSpan::default()).unwrap();
        // An explicit reservation below the cursor rewinds it, so the
        // following automatic draws walk over the issued numbers and
        // must skip them.
        allocator.allocate(Some(5), &SourceSpan::default()).unwrap();
        assert_eq!(6, allocator.allocate(None, &SourceSpan::default()).unwrap());
        assert_eq!(7, allocator.allocate(None, &SourceSpan::default()).unwrap());
        assert_eq!(10, allocator.allocate(None, &SourceSpan::default()).unwrap());
    }

    #[test]
    fn allocate_never_returns_equal_numbers() {
        let mut allocator = BlockAllocator::new(1);
        let mut seen = HashSet::new();
        allocator.allocate(Some(4), &SourceSpan::default()).unwrap();
        seen.insert(4u16);
        for _ in 0..50 {
            let number = allocator.allocate(None, &SourceSpan::default()).unwrap();
            assert!(seen.insert(number));
        }
    }
}
