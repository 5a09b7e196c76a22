//! strtable: a fixed-capacity, separately-chained hash table from string
//! keys to owned, release-aware values.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the ownership contract for stored values small and
//!   verifiable by building the table in layers, each with a precise
//!   contract that can be reasoned about independently.
//! - Layers:
//!   - Value<T>: an owned payload plus an optional one-shot release
//!     closure. The closure fires exactly once, with the owned payload,
//!     when the value is discarded; exactly-once is enforced by move
//!     semantics and Drop, not by a consumed flag.
//!   - chain (Entry/Bucket): owned singly-linked collision chains. One
//!     mutating search primitive (a link cursor) backs insert, update, and
//!     remove; detachment takes entries out by value and re-points the
//!     predecessor link, so a chain is never observable half-linked.
//!   - Table<V>: a bucket array whose size is fixed at construction,
//!     indexed by a 31-polynomial rolling hash of the key bytes taken
//!     modulo the bucket count. The hash accumulates in wrapping unsigned
//!     arithmetic, so the index is always in range.
//!
//! Ownership contract
//! - A value enters the table by insert or update and is owned exclusively
//!   by the table until it is superseded, removed, or still present when
//!   the table drops; at that moment its release closure (if armed) fires
//!   exactly once.
//! - Insert on an existing key releases the superseded value just as
//!   update does; a silent overwrite would leak the old payload.
//! - update on a missing key refuses ownership and hands the value back in
//!   the error, release unfired.
//! - Release closures run only on values already detached from the
//!   structure and must not re-enter the owning table.
//!
//! Constraints
//! - Single-threaded: mutation requires `&mut Table`; no atomics, no
//!   internal locking. Callers needing shared access wrap the table in
//!   their own exclusion discipline.
//! - Fixed capacity: no resizing or rehashing; load beyond the bucket
//!   count lengthens chains.
//! - String keys only, compared byte for byte. Keys cannot be null
//!   (`&str`); the empty string is an ordinary key, and presence is the
//!   chain link's `Option` discriminant rather than a sentinel.
//!
//! Notes and non-goals
//! - No iteration over entries, no persistence, no non-string keys.
//! - `len`/`is_empty`/`capacity`/`get`/`get_mut` are the observation
//!   surface; they add no iteration and no rehashing.
//! - Public API surface is `Table`, `Value`, and the operation result
//!   types; the chain layer is an implementation detail exposed for
//!   benchmarks.

pub mod chain;
mod chain_proptest;
pub mod table;
pub mod value;

// Public surface
pub use table::{Insert, RemoveError, Table, UpdateError, ZeroCapacity};
pub use value::Value;
