//! Table: fixed-capacity slot array with linear probing and a built-in cursor.

use crate::error::MapError;
use crate::exclusive::ExclusiveCheck;
use core::fmt;
use core::mem;

/// Maximum key length in bytes. Longer keys are rejected, never truncated.
pub const KEY_MAX: usize = 32;

/// Inline key buffer; the empty string is the vacant sentinel.
type KeyBuf = heapless::String<KEY_MAX>;

/// Built-in hash for when no hook is injected at creation.
///
/// Mixes only the key's length, first byte, and middle byte, so unrelated
/// keys collide easily. It is kept for compatibility and as a probing
/// stress source; real workloads should inject their own hook via
/// [`Table::with_hasher`]. `capacity` must be non-zero.
pub fn default_hash(key: &str, capacity: usize) -> usize {
    let b = key.as_bytes();
    if b.is_empty() {
        return 0;
    }
    let first = b[0] as usize;
    let mid = b[b.len() / 2] as usize;
    (b.len() + 4 * (first + 4 * mid)) % capacity
}

struct Slot {
    key: KeyBuf,
    cell: Box<[u8]>,
}

impl Slot {
    #[inline]
    fn is_vacant(&self) -> bool {
        self.key.is_empty()
    }
}

/// Fixed-capacity map from short string keys to `cellsz`-byte cells.
///
/// Every slot's cell buffer is allocated up front; insert and erase only
/// flip keys and copy bytes, never allocate. Collisions resolve by scanning
/// forward circularly from the key's home index until a match or a full
/// lap. One iteration cursor is embedded in the table, so a single scan can
/// be in flight at a time.
pub struct Table {
    hash: Box<dyn Fn(&str, usize) -> usize>,
    cellsz: usize,
    slots: Vec<Slot>,
    cursor: usize,
    check: ExclusiveCheck,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("cellsz", &self.cellsz)
            .field("capacity", &self.slots.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl Table {
    /// Create a table with the built-in hash. Fails on zero geometry.
    pub fn new(cellsz: usize, capacity: usize) -> Result<Self, MapError> {
        Self::with_hasher(cellsz, capacity, default_hash)
    }

    /// Create a table with an injected hash hook.
    ///
    /// The hook receives the key and the table capacity and returns a home
    /// index; out-of-range results are reduced modulo capacity.
    pub fn with_hasher<H>(cellsz: usize, capacity: usize, hash: H) -> Result<Self, MapError>
    where
        H: Fn(&str, usize) -> usize + 'static,
    {
        if cellsz == 0 {
            return Err(MapError::InvalidCellSize);
        }
        if capacity == 0 {
            return Err(MapError::InvalidCapacity);
        }
        let slots = (0..capacity)
            .map(|_| Slot {
                key: KeyBuf::new(),
                cell: vec![0u8; cellsz].into_boxed_slice(),
            })
            .collect();
        Ok(Self {
            hash: Box::new(hash),
            cellsz,
            slots,
            cursor: 0,
            check: ExclusiveCheck::new(),
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn cell_size(&self) -> usize {
        self.cellsz
    }

    /// Number of occupied slots. O(capacity) scan.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_vacant()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Slot::is_vacant)
    }

    fn home_index(&self, key: &str) -> usize {
        let cap = self.slots.len();
        (self.hash)(key, cap) % cap
    }

    /// Circular scan from `start` for the slot whose key equals `target`.
    ///
    /// The vacant sentinel is a legal target, which is how insert locates a
    /// free slot. Each non-matching slot examined bumps `misses`. After one
    /// full lap without a match: `None`.
    fn probe(&self, target: &str, start: usize, mut misses: Option<&mut usize>) -> Option<usize> {
        let cap = self.slots.len();
        let start = start % cap;
        for step in 0..cap {
            let i = (start + step) % cap;
            if self.slots[i].key.as_str() == target {
                return Some(i);
            }
            if let Some(m) = misses.as_mut() {
                **m += 1;
            }
        }
        None
    }

    fn check_key(key: &str) -> Result<(), MapError> {
        if key.is_empty() {
            return Err(MapError::EmptyKey);
        }
        if key.len() > KEY_MAX {
            return Err(MapError::KeyTooLong { len: key.len() });
        }
        Ok(())
    }

    /// Register `key` with a copy of `value`, which must be exactly
    /// [`cell_size`](Self::cell_size) bytes.
    pub fn insert(&mut self, key: &str, value: &[u8]) -> Result<(), MapError> {
        let _g = self.check.enter();
        Self::check_key(key)?;
        let mut stored = KeyBuf::new();
        stored
            .push_str(key)
            .map_err(|_| MapError::KeyTooLong { len: key.len() })?;
        if value.len() != self.cellsz {
            return Err(MapError::ValueSizeMismatch {
                expected: self.cellsz,
                got: value.len(),
            });
        }

        let home = self.home_index(key);
        if self.probe(key, home, None).is_some() {
            log::debug!("insert rejected, key {key:?} already registered");
            return Err(MapError::DuplicateKey);
        }
        let Some(i) = self.probe("", home, None) else {
            log::debug!("insert rejected, no vacant slot for key {key:?}");
            return Err(MapError::TableFull);
        };

        let slot = &mut self.slots[i];
        slot.key = stored;
        slot.cell.copy_from_slice(value);
        Ok(())
    }

    /// Borrow the cell registered under `key`, or `Ok(None)` when absent.
    pub fn get(&self, key: &str) -> Result<Option<&[u8]>, MapError> {
        let _g = self.check.enter();
        Self::check_key(key)?;
        let home = self.home_index(key);
        Ok(self.probe(key, home, None).map(|i| &self.slots[i].cell[..]))
    }

    /// Like [`get`](Self::get), but the cell can be written through.
    pub fn get_mut(&mut self, key: &str) -> Result<Option<&mut [u8]>, MapError> {
        let _g = self.check.enter();
        Self::check_key(key)?;
        let home = self.home_index(key);
        match self.probe(key, home, None) {
            Some(i) => Ok(Some(&mut self.slots[i].cell[..])),
            None => Ok(None),
        }
    }

    /// Reset `key`'s slot to vacant. `Ok(true)` when a slot was erased,
    /// `Ok(false)` when the key was not registered. The cell bytes stay in
    /// place until the slot is reused by a later insert.
    pub fn erase(&mut self, key: &str) -> Result<bool, MapError> {
        let _g = self.check.enter();
        Self::check_key(key)?;
        let home = self.home_index(key);
        match self.probe(key, home, None) {
            Some(i) => {
                self.slots[i].key.clear();
                Ok(true)
            }
            None => {
                log::debug!("erase missed, key {key:?} not registered");
                Ok(false)
            }
        }
    }

    /// Reset every slot to vacant. Cell buffers are retained, nothing is
    /// reallocated, and the iteration cursor is left where it was.
    pub fn clear(&mut self) {
        let _g = self.check.enter();
        for slot in &mut self.slots {
            slot.key.clear();
        }
    }

    /// Rewind the iteration cursor to the first slot.
    pub fn begin(&mut self) {
        let _g = self.check.enter();
        self.cursor = 0;
    }

    /// Whether an occupied slot remains at or after the cursor. Does not
    /// move the cursor.
    pub fn has_next(&self) -> bool {
        let _g = self.check.enter();
        self.slots[self.cursor..].iter().any(|s| !s.is_vacant())
    }

    /// Advance to the next occupied slot and borrow its cell.
    ///
    /// Returns `None` once the cursor reaches capacity. Mutating the table
    /// between steps may skip or revisit entries relative to the state at
    /// [`begin`](Self::begin); it never returns a vacant slot's cell.
    pub fn next_value(&mut self) -> Option<&mut [u8]> {
        let _g = self.check.enter();
        if self.cursor >= self.slots.len() {
            return None;
        }
        match (self.cursor..self.slots.len()).find(|&i| !self.slots[i].is_vacant()) {
            Some(i) => {
                self.cursor = i + 1;
                Some(&mut self.slots[i].cell[..])
            }
            None => {
                self.cursor = self.slots.len();
                None
            }
        }
    }

    /// Total wasted probes across all occupied slots: for each key, the
    /// number of non-matching slots a lookup from its home index examines.
    /// 0 means every key sits at its home index.
    pub fn optimum(&self) -> usize {
        let _g = self.check.enter();
        let mut total = 0;
        for slot in self.slots.iter().filter(|s| !s.is_vacant()) {
            let key = slot.key.as_str();
            let mut misses = 0;
            let _ = self.probe(key, self.home_index(key), Some(&mut misses));
            total += misses;
        }
        total
    }

    /// Log every occupied slot (index, key, home index). Diagnostic only;
    /// nothing in the functional contract depends on this output.
    pub fn show(&self) {
        let _g = self.check.enter();
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.is_vacant() {
                continue;
            }
            let key = slot.key.as_str();
            log::info!("[{i:2}] key={key:?} home={}", self.home_index(key));
        }
    }

    /// Tear the table down tier by tier: cell buffers, then the slot
    /// array, then the record itself.
    pub(crate) fn dismantle(mut self) {
        let mut slots = mem::take(&mut self.slots);
        for slot in &mut slots {
            slot.cell = Box::default();
        }
        drop(slots);
        drop(self);
    }
}
