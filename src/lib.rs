//! probemap: a single-threaded, fixed-capacity map from short string keys
//! to fixed-size byte cells, with linear probing and validated handles.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the probing engine and the handle machinery in separate,
//!   independently testable layers.
//! - Layers:
//!   - Table: the engine. A slot array of fixed length, each slot holding
//!     a bounded inline key and an eagerly allocated cell buffer.
//!     Collisions resolve by circular linear probing from the key's home
//!     index; a single iteration cursor lives in the table.
//!   - TableRegistry: owns tables behind generational slot-map keys and
//!     mints a strictly increasing Serial per table. Resolving a
//!     TableHandle is a bounds/generation check plus a serial match, so
//!     stale and foreign handles fail without touching freed storage.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design; a debug-only tripwire
//!   additionally panics on reentrant entry while a table is
//!   mid-operation (the injected hash hook is the only user code that can
//!   run there).
//! - Capacity and cell size are fixed at creation; there is no resizing,
//!   no rehashing, and no storage release before destruction. Erase and
//!   clear only reset keys; cell buffers stay allocated for reuse.
//! - Keys are non-empty UTF-8 of at most [`KEY_MAX`] bytes; the empty
//!   string is the vacant-slot sentinel. Over-length keys error out
//!   rather than truncate.
//! - Values are opaque byte cells of exactly the table's cell size;
//!   `get`/`get_mut` hand out borrows into the live cell, checked by the
//!   borrow checker instead of by caller discipline.
//!
//! Hashing
//! - The hash is a capability injected at creation: any
//!   `Fn(&str, usize) -> usize` mapping key and capacity to a home index.
//!   The built-in [`default_hash`] is deliberately weak and mostly useful
//!   for exercising probe chains.
//!
//! Notes and non-goals
//! - One cursor per table; interleaved mutation during a scan may skip or
//!   revisit entries but never yields a vacant slot's cell.
//! - `len` is an occupancy scan, O(capacity) like every other operation.
//! - The registry is an explicit object owned by the embedder; nothing in
//!   the crate is process-global. Registries seeded with overlapping
//!   serial bases cannot tell each other's handles apart beyond the
//!   generation check; seed them apart when that matters.
//! - Diagnostics (`Table::show`, failure traces) go through `log` and are
//!   not part of any functional contract.

mod error;
mod exclusive;
pub mod registry;
pub mod table;

mod table_proptest;

// Public surface
pub use error::MapError;
pub use registry::{Serial, SerialAllocator, TableHandle, TableRegistry};
pub use table::{default_hash, Table, KEY_MAX};
