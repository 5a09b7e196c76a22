//! Table: fixed-capacity bucket array and the public operation family.
//!
//! Every operation computes a bucket index from the key and routes through
//! the chain layer's single search primitive, so insert, update, remove,
//! and the read path cannot disagree about where a key lives. The bucket
//! count is fixed at construction; destruction is `Drop`, which releases
//! every stored value exactly once.

use core::fmt;

use crate::chain::{Bucket, Entry};
use crate::value::Value;

/// Rolling hash over the key bytes: `h = 31*h + byte`, accumulated in
/// wrapping unsigned 64-bit arithmetic. Unsigned wrapping fixes the sign
/// convention the classic polynomial hash leaves open: the accumulator
/// never goes negative, so the remainder below is always in range.
fn hash_key(key: &str) -> u64 {
    key.bytes()
        .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(u64::from(b)))
}

/// Error from [`Table::with_capacity`]: a table needs at least one bucket,
/// or indexing would divide by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroCapacity;

impl fmt::Display for ZeroCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("table capacity must be at least one bucket")
    }
}

impl std::error::Error for ZeroCapacity {}

/// Outcome of [`Table::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    /// The key was new; a fresh entry joined its bucket's chain.
    Added,
    /// The key existed; the superseded value was released and replaced.
    Replaced,
}

/// Error from [`Table::update`] when the key is absent. Carries the
/// unconsumed value back to the caller; the table has not fired (and will
/// never fire) its release closure.
#[derive(Debug)]
pub enum UpdateError<V> {
    KeyNotFound(Value<V>),
}

impl<V> UpdateError<V> {
    /// Take back ownership of the value the table declined to consume.
    pub fn into_value(self) -> Value<V> {
        match self {
            UpdateError::KeyNotFound(value) => value,
        }
    }
}

impl<V> fmt::Display for UpdateError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::KeyNotFound(_) => f.write_str("update target key not found"),
        }
    }
}

impl<V: fmt::Debug> std::error::Error for UpdateError<V> {}

/// Error from [`Table::remove`] when the key is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveError {
    KeyNotFound,
}

impl fmt::Display for RemoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoveError::KeyNotFound => f.write_str("remove target key not found"),
        }
    }
}

impl std::error::Error for RemoveError {}

/// A fixed-capacity, separately-chained hash table from string keys to
/// owned [`Value`]s.
///
/// The bucket count is chosen at construction and never changes; load
/// beyond it lengthens collision chains rather than rehashing. The table
/// owns every entry transitively: dropping it releases each stored value
/// exactly once, bucket by bucket, chain by chain.
pub struct Table<V> {
    buckets: Box<[Bucket<V>]>,
    len: usize,
}

impl<V> Table<V> {
    /// Create a table with `capacity` buckets, fixed for the table's
    /// lifetime. Zero is rejected here rather than deferred to a divide by
    /// zero in the hash.
    pub fn with_capacity(capacity: usize) -> Result<Self, ZeroCapacity> {
        if capacity == 0 {
            return Err(ZeroCapacity);
        }
        let buckets = (0..capacity).map(|_| Bucket::new()).collect();
        Ok(Self { buckets, len: 0 })
    }

    /// Number of buckets, as requested at construction.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Deterministic bucket placement: pure in the key bytes and the bucket
    /// count, stable across calls, always in `[0, capacity)`.
    fn bucket_index(&self, key: &str) -> usize {
        (hash_key(key) % self.buckets.len() as u64) as usize
    }

    /// Insert `value` under `key`, taking ownership of the value. A new key
    /// appends a fresh entry owning a copy of `key` (the bucket head if the
    /// bucket was empty, the chain tail otherwise). An existing key has its
    /// current value released and replaced, exactly as
    /// [`update`](Self::update) would.
    pub fn insert(&mut self, key: &str, value: Value<V>) -> Insert {
        let idx = self.bucket_index(key);
        let link = self.buckets[idx].seek(key);
        if let Some(entry) = link.as_deref_mut() {
            let superseded = entry.replace_value(value);
            // The chain is consistent before the superseded value drops and
            // its release fires.
            drop(superseded);
            return Insert::Replaced;
        }
        // Fully construct the boxed entry before linking; no allocation
        // happens with the chain in motion.
        *link = Some(Box::new(Entry::new(key, value)));
        self.len += 1;
        Insert::Added
    }

    /// Replace the value under an existing `key`. On a hit the superseded
    /// value is released and ownership of `value` moves into the table. On
    /// a miss the table is untouched and `value` comes back inside the
    /// error, its release closure unfired; disposing of it is then the
    /// caller's responsibility again.
    pub fn update(&mut self, key: &str, value: Value<V>) -> Result<(), UpdateError<V>> {
        let idx = self.bucket_index(key);
        match self.buckets[idx].find_mut(key) {
            Some(entry) => {
                let superseded = entry.replace_value(value);
                drop(superseded);
                Ok(())
            }
            None => Err(UpdateError::KeyNotFound(value)),
        }
    }

    /// Remove the entry under `key`, releasing its key copy and its value.
    /// The chain stays correctly linked whether the entry was the head,
    /// middle, or tail of its bucket.
    pub fn remove(&mut self, key: &str) -> Result<(), RemoveError> {
        let idx = self.bucket_index(key);
        match self.buckets[idx].detach(key) {
            Some(entry) => {
                self.len -= 1;
                // Already unlinked; dropping the detached entry fires the
                // value's release, if armed.
                drop(entry);
                Ok(())
            }
            None => Err(RemoveError::KeyNotFound),
        }
    }

    /// True iff an entry with exactly this key is present. Non-mutating and
    /// safe for absent keys.
    pub fn contains_key(&self, key: &str) -> bool {
        self.buckets[self.bucket_index(key)].find(key).is_some()
    }

    /// Borrow the payload stored under `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.buckets[self.bucket_index(key)]
            .find(key)
            .map(|entry| entry.value().get())
    }

    /// Mutably borrow the payload stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let idx = self.bucket_index(key);
        self.buckets[idx]
            .find_mut(key)
            .map(|entry| entry.value_mut().get_mut())
    }
}
