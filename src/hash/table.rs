// Hash table for fragment matching, plus a pool of scratch tables.
//
// Entries are fragment-relative positions stored as u16 (fragments are at
// most 64 KiB).  An empty bucket reads as position 0; the match finder
// verifies every candidate against the actual bytes, so empty or stale
// buckets only cost a failed comparison.

use super::config::{MAX_TABLE_BITS, MIN_TABLE_BITS};

// ---------------------------------------------------------------------------
// Hash table
// ---------------------------------------------------------------------------

/// Last-write-wins table of `1 << bits` fragment positions.
pub struct HashTable {
    table: Vec<u16>,
    bits: u32,
}

impl HashTable {
    /// Create a zeroed table of `1 << bits` entries.
    pub fn new(bits: u32) -> Self {
        debug_assert!((1..=16).contains(&bits));
        Self {
            table: vec![0u16; 1 << bits],
            bits,
        }
    }

    /// Zero all buckets for a new fragment.
    pub fn reset(&mut self) {
        self.table.fill(0);
    }

    /// Most recent position stored under `bucket`.
    #[inline(always)]
    pub fn lookup(&self, bucket: usize) -> usize {
        self.table[bucket] as usize
    }

    /// Store `pos` under `bucket`, returning the previous entry.
    #[inline(always)]
    pub fn replace(&mut self, bucket: usize, pos: usize) -> usize {
        debug_assert!(pos <= u16::MAX as usize);
        std::mem::replace(&mut self.table[bucket], pos as u16) as usize
    }

    /// Store `pos` under `bucket`.
    #[inline(always)]
    pub fn insert(&mut self, bucket: usize, pos: usize) {
        debug_assert!(pos <= u16::MAX as usize);
        self.table[bucket] = pos as u16;
    }

    /// Table width in bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Bucket count.
    pub fn size(&self) -> usize {
        self.table.len()
    }
}

// ---------------------------------------------------------------------------
// Scratch pool
// ---------------------------------------------------------------------------

const POOL_SLOTS: usize = (MAX_TABLE_BITS - MIN_TABLE_BITS + 1) as usize;

/// Scratch tables keyed by bit width, reused across fragments and calls.
///
/// Owned by a single `Compressor`; there is no process-wide pool.  Every
/// table handed out is zeroed first, and no input bytes are retained, only
/// positions that the match finder re-validates before use.
#[derive(Default)]
pub struct TablePool {
    slots: [Option<HashTable>; POOL_SLOTS],
}

impl TablePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zeroed table of width `bits`, allocated on first request.
    ///
    /// `bits` must be in `MIN_TABLE_BITS..=MAX_TABLE_BITS`.
    pub fn table(&mut self, bits: u32) -> &mut HashTable {
        debug_assert!((MIN_TABLE_BITS..=MAX_TABLE_BITS).contains(&bits));
        let table = self.slots[(bits - MIN_TABLE_BITS) as usize]
            .get_or_insert_with(|| HashTable::new(bits));
        table.reset();
        table
    }

    /// Number of widths that currently hold an allocated table.
    pub fn allocated(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
