/// The allocation state of a single block.
#[derive(Debug, PartialEq)]
pub enum State {
    Free,
    Used,
}

/// Tracks which blocks of the backing store are allocated. One bit per block
/// packed into `u64` words; every block starts out free.
///
/// The bitmap is pure in-memory state. Zero-filling freed blocks on the
/// backing store is the caller's job and must happen before `release`.
pub struct FreeBitmap {
    words: Vec<u64>,
    blocks: usize,
    free: usize,
}

impl FreeBitmap {
    pub fn new(blocks: usize) -> Self {
        Self {
            words: vec![0; (blocks + 63) / 64],
            blocks,
            free: blocks,
        }
    }

    pub fn state(&self, blocknr: usize) -> State {
        assert!(blocknr < self.blocks);
        let word = self.words[blocknr / 64];
        let mask = 0b01_u64 << (blocknr % 64);
        if word & mask == 0 {
            State::Free
        } else {
            State::Used
        }
    }

    pub fn free_count(&self) -> usize {
        self.free
    }

    /// Marks a free block as used. Reserving an already-used block is a
    /// caller bug.
    pub fn reserve(&mut self, blocknr: usize) {
        debug_assert_eq!(self.state(blocknr), State::Free);
        self.words[blocknr / 64] |= 0b01_u64 << (blocknr % 64);
        self.free -= 1;
    }

    /// Returns a used block to the pool. Releasing an already-free block is a
    /// caller bug.
    pub fn release(&mut self, blocknr: usize) {
        debug_assert_eq!(self.state(blocknr), State::Used);
        self.words[blocknr / 64] &= !(0b01_u64 << (blocknr % 64));
        self.free += 1;
    }

    /// Reserves `count` free blocks, scanning from the lowest index up so
    /// allocation order is deterministic. Returns `None` without touching the
    /// bitmap if fewer than `count` blocks are free.
    pub fn allocate(&mut self, count: usize) -> Option<Vec<usize>> {
        if count > self.free {
            return None;
        }

        let mut picked = Vec::with_capacity(count);
        for blocknr in 0..self.blocks {
            if picked.len() == count {
                break;
            }
            if let State::Free = self.state(blocknr) {
                picked.push(blocknr);
            }
        }
        debug_assert_eq!(picked.len(), count);

        for &blocknr in &picked {
            self.reserve(blocknr);
        }
        Some(picked)
    }
}
