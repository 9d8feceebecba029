//! TableRegistry: owns tables and validates the handles that reach them.
//!
//! A handle is a generational slot-map key plus the serial the registry
//! minted for that table. Resolving a handle is a bounds/generation check
//! followed by a serial match, so a stale, destroyed, or foreign handle
//! fails cleanly instead of reaching freed storage.

use crate::error::MapError;
use crate::table::Table;
use slotmap::{DefaultKey, SlotMap};

/// First serial ever minted. The value itself is arbitrary; zero stays
/// reserved for retired records.
const SERIAL_BASE: u64 = 55;

/// Identity token minted once per table, never recycled.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Serial(u64);

impl Serial {
    /// Sentinel carried by records mid-teardown.
    pub const INVALID: Serial = Serial(0);

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_live(self) -> bool {
        self.0 != 0
    }
}

/// Strictly increasing serial source.
///
/// Each registry owns one; embedders that need serials to stay disjoint
/// across several registries seed each with [`starting_at`]
/// (`SerialAllocator::starting_at`) using distinct bases.
#[derive(Debug)]
pub struct SerialAllocator {
    next: u64,
}

impl SerialAllocator {
    pub const fn new() -> Self {
        Self::starting_at(SERIAL_BASE)
    }

    /// Start minting at `base`; zero is bumped to one to keep the retired
    /// sentinel unmintable.
    pub const fn starting_at(base: u64) -> Self {
        Self {
            next: if base == 0 { 1 } else { base },
        }
    }

    pub fn allocate(&mut self) -> Serial {
        let serial = Serial(self.next);
        self.next += 1;
        serial
    }
}

impl Default for SerialAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque, copyable reference to a table owned by a [`TableRegistry`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TableHandle {
    slot: DefaultKey,
    serial: Serial,
}

impl TableHandle {
    /// The serial minted for the table this handle was issued for.
    #[inline]
    pub fn serial(&self) -> Serial {
        self.serial
    }

    pub fn table<'a>(&self, registry: &'a TableRegistry) -> Result<&'a Table, MapError> {
        registry.table(*self)
    }

    pub fn table_mut<'a>(&self, registry: &'a mut TableRegistry) -> Result<&'a mut Table, MapError> {
        registry.table_mut(*self)
    }
}

struct TableRecord {
    serial: Serial,
    table: Table,
}

/// Owner of every table created through it.
///
/// All access runs through handle resolution, so callers never hold a
/// table reference across its destruction. The registry is an explicit
/// object: there is no process-wide state, and concurrent use is ruled
/// out by ownership rather than by locks.
pub struct TableRegistry {
    tables: SlotMap<DefaultKey, TableRecord>,
    serials: SerialAllocator,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::with_serials(SerialAllocator::new())
    }

    /// Build a registry around a pre-seeded allocator.
    pub fn with_serials(serials: SerialAllocator) -> Self {
        Self {
            tables: SlotMap::with_key(),
            serials,
        }
    }

    /// Create a table with the built-in hash and hand back its handle.
    pub fn create(&mut self, cellsz: usize, capacity: usize) -> Result<TableHandle, MapError> {
        let table = Table::new(cellsz, capacity)?;
        Ok(self.adopt(table))
    }

    /// Create a table with an injected hash hook.
    pub fn create_with_hasher<H>(
        &mut self,
        cellsz: usize,
        capacity: usize,
        hash: H,
    ) -> Result<TableHandle, MapError>
    where
        H: Fn(&str, usize) -> usize + 'static,
    {
        let table = Table::with_hasher(cellsz, capacity, hash)?;
        Ok(self.adopt(table))
    }

    fn adopt(&mut self, table: Table) -> TableHandle {
        let serial = self.serials.allocate();
        let slot = self.tables.insert(TableRecord { serial, table });
        log::debug!(
            "table {} adopted, cellsz={} capacity={}",
            serial.raw(),
            self.tables[slot].table.cell_size(),
            self.tables[slot].table.capacity()
        );
        TableHandle { slot, serial }
    }

    /// Destroy the table behind `handle`, releasing its storage tier by
    /// tier: the record's serial is retired first, then the cell buffers,
    /// the slot array, and the record itself.
    pub fn destroy(&mut self, handle: TableHandle) -> Result<(), MapError> {
        let valid = self
            .tables
            .get(handle.slot)
            .map(|r| r.serial == handle.serial)
            .unwrap_or(false);
        if !valid {
            log::warn!("destroy refused, handle does not resolve to a live table");
            return Err(MapError::StaleHandle);
        }
        let Some(mut record) = self.tables.remove(handle.slot) else {
            return Err(MapError::StaleHandle);
        };
        log::debug!("table {} destroyed", record.serial.raw());
        record.serial = Serial::INVALID;
        record.table.dismantle();
        Ok(())
    }

    /// Resolve a handle to its table, or `StaleHandle`.
    pub fn table(&self, handle: TableHandle) -> Result<&Table, MapError> {
        self.tables
            .get(handle.slot)
            .filter(|r| r.serial == handle.serial)
            .map(|r| &r.table)
            .ok_or(MapError::StaleHandle)
    }

    /// Mutable counterpart of [`table`](Self::table).
    pub fn table_mut(&mut self, handle: TableHandle) -> Result<&mut Table, MapError> {
        self.tables
            .get_mut(handle.slot)
            .filter(|r| r.serial == handle.serial)
            .map(|r| &mut r.table)
            .ok_or(MapError::StaleHandle)
    }

    /// Whether `handle` currently resolves.
    pub fn contains(&self, handle: TableHandle) -> bool {
        self.table(handle).is_ok()
    }

    /// Number of live tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}
