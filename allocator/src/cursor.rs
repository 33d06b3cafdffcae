//! The "next free slot" primitive shared by the allocators.

/// Tracks the current position and the size consumed by the most recent
/// reservation.
///
/// The cursor does no validation; validation is the allocator's job.
/// Reservations made out of cursor order do not retroactively create
/// holes that the cursor remembers. Only the most recent stride affects
/// future automatic allocation, which keeps numbering stable for
/// previously generated projects.
#[derive(Debug)]
pub(crate) struct Cursor {
    next_free: u32,
    last_stride: u32,
}

impl Cursor {
    pub fn new(start: u32) -> Self {
        Self {
            next_free: start,
            last_stride: 0,
        }
    }

    /// The current next-free key, without mutation.
    pub fn peek(&self) -> u32 {
        self.next_free
    }

    /// Reserves `size` slots at `key` and returns `key`. The next free
    /// key becomes `key + size`.
    pub fn reserve(&mut self, key: u32, size: u32) -> u32 {
        self.next_free = key + size;
        self.last_stride = size;
        key
    }

    /// The size of the most recent reservation.
    #[allow(dead_code)]
    pub fn last_stride(&self) -> u32 {
        self.last_stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_then_next_free_advances_past_reservation() {
        let mut cursor = Cursor::new(8);
        assert_eq!(8, cursor.peek());
        assert_eq!(8, cursor.reserve(8, 1));
        assert_eq!(9, cursor.peek());
        assert_eq!(1, cursor.last_stride());
    }

    #[test]
    fn reserve_when_out_of_order_then_no_remembered_hole() {
        let mut cursor = Cursor::new(8);
        cursor.reserve(20, 2);
        // The skipped range 8..20 is forgotten.
        assert_eq!(22, cursor.peek());
    }
}
