//! Chain: owned collision chains of key/value entries.
//!
//! A bucket owns the head link of a singly-linked chain; every entry owns
//! an independently allocated copy of its key, its [`Value`], and the link
//! to its successor. All structural mutation goes through one search
//! primitive, [`Bucket::seek`], which yields a cursor at the matching link
//! or at the tail: writing a fresh entry through a tail cursor appends,
//! taking through a matching cursor unlinks with the predecessor re-pointed
//! in the same move. Removal is therefore "detach and return ownership",
//! never pointer surgery, and a chain is never observable half-linked.
//!
//! This layer runs no user code while the structure is in motion: release
//! closures fire only on values already detached from (or swapped out of)
//! the chain. Exposed for benches; not part of the public API surface.

use crate::value::Value;

/// An owned link in a chain. `None` is both the empty-bucket state and the
/// tail terminator; entry presence is the `Option` discriminant, never a
/// sentinel key value.
pub type Link<V> = Option<Box<Entry<V>>>;

/// One stored key/value pair plus the owned link to its chain successor.
pub struct Entry<V> {
    key: Box<str>,
    value: Value<V>,
    next: Link<V>,
}

impl<V> Entry<V> {
    /// Build an unlinked entry owning a copy of `key` and owning `value`.
    pub fn new(key: &str, value: Value<V>) -> Self {
        Self {
            key: Box::from(key),
            value,
            next: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value<V> {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value<V> {
        &mut self.value
    }

    /// Swap in a new value, returning the superseded one. The entry is
    /// fully consistent before the superseded value can drop, so its
    /// release closure never observes the chain mid-mutation.
    pub fn replace_value(&mut self, value: Value<V>) -> Value<V> {
        core::mem::replace(&mut self.value, value)
    }
}

/// A chain head. Buckets start empty and own every entry reachable from
/// their head link.
pub struct Bucket<V> {
    head: Link<V>,
}

impl<V> Bucket<V> {
    pub fn new() -> Self {
        Self { head: None }
    }

    /// The single mutating search primitive. Returns a cursor at the first
    /// link whose entry's key equals `key` byte for byte, or at the tail
    /// link when the key is absent. Insert, update, and remove all route
    /// through this cursor, so their match and append positions cannot
    /// disagree.
    pub fn seek(&mut self, key: &str) -> &mut Link<V> {
        let mut link = &mut self.head;
        loop {
            // Probe with a shared borrow so the decision is made before the
            // cursor is either returned or advanced.
            let stop = match link.as_deref() {
                Some(entry) => &*entry.key == key,
                None => true, // tail: the append position
            };
            if stop {
                return link;
            }
            link = &mut link.as_mut().expect("probed link is occupied").next;
        }
    }

    /// Shared walk mirroring [`seek`](Self::seek) for the read-only
    /// operations: the entry with exactly this key, if present.
    pub fn find(&self, key: &str) -> Option<&Entry<V>> {
        let mut cur = self.head.as_deref();
        while let Some(entry) = cur {
            if &*entry.key == key {
                return Some(entry);
            }
            cur = entry.next.as_deref();
        }
        None
    }

    pub fn find_mut(&mut self, key: &str) -> Option<&mut Entry<V>> {
        self.seek(key).as_deref_mut()
    }

    /// Detach the entry under `key`, taking ownership and re-pointing the
    /// predecessor's link at the detached entry's successor. Works the same
    /// for head, middle, and tail entries; the rest of the chain stays
    /// linked.
    pub fn detach(&mut self, key: &str) -> Option<Box<Entry<V>>> {
        let link = self.seek(key);
        let mut removed = link.take()?;
        *link = removed.next.take();
        Some(removed)
    }

    /// Number of entries in the chain. Test and bench support.
    pub fn len(&self) -> usize {
        let mut n = 0;
        let mut cur = self.head.as_deref();
        while let Some(entry) = cur {
            n += 1;
            cur = entry.next.as_deref();
        }
        n
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Keys in chain order, head to tail. Test and bench support.
    pub fn keys(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cur = self.head.as_deref();
        while let Some(entry) = cur {
            out.push(&*entry.key);
            cur = entry.next.as_deref();
        }
        out
    }
}

impl<V> Default for Bucket<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for Bucket<V> {
    fn drop(&mut self) {
        // Tear the chain down iteratively; recursive Box drops would exhaust
        // the stack on long chains. Each detached entry drops its key copy
        // and value here, firing any armed release.
        let mut next = self.head.take();
        while let Some(mut entry) = next {
            next = entry.next.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn append<V>(bucket: &mut Bucket<V>, key: &str, value: Value<V>) {
        let link = bucket.seek(key);
        assert!(link.is_none(), "test keys are unique per chain");
        *link = Some(Box::new(Entry::new(key, value)));
    }

    /// Invariant: entries append at the tail, so chain order is insertion
    /// order.
    #[test]
    fn append_preserves_insertion_order() {
        let mut bucket = Bucket::new();
        for k in ["a", "b", "c"] {
            append(&mut bucket, k, Value::new(()));
        }
        assert_eq!(bucket.keys(), ["a", "b", "c"]);
        assert_eq!(bucket.len(), 3);
        assert!(!bucket.is_empty());
    }

    /// Invariant: key equality is byte-for-byte; case and order matter and
    /// the empty string is an ordinary key.
    #[test]
    fn find_is_exact_byte_equality() {
        let mut bucket = Bucket::new();
        append(&mut bucket, "ab", Value::new(1));
        append(&mut bucket, "", Value::new(2));

        assert_eq!(bucket.find("ab").map(|e| *e.value().get()), Some(1));
        assert_eq!(bucket.find("").map(|e| *e.value().get()), Some(2));
        assert!(bucket.find("AB").is_none());
        assert!(bucket.find("ba").is_none());
        assert!(bucket.find("a").is_none());
    }

    /// Invariant: seek lands on the matching link for a present key and on
    /// the tail link for an absent one.
    #[test]
    fn seek_matching_or_tail() {
        let mut bucket = Bucket::new();
        append(&mut bucket, "k1", Value::new(10));
        append(&mut bucket, "k2", Value::new(20));

        let hit = bucket.seek("k1");
        assert_eq!(hit.as_deref().map(Entry::key), Some("k1"));

        let tail = bucket.seek("absent");
        assert!(tail.is_none());
    }

    /// Invariant: detaching head, middle, or tail re-points the predecessor
    /// link and leaves every other entry reachable, in order.
    #[test]
    fn detach_relinks_at_every_position() {
        let mut bucket = Bucket::new();
        for k in ["a", "b", "c", "d"] {
            append(&mut bucket, k, Value::new(()));
        }

        let mid = bucket.detach("b").expect("middle entry present");
        assert_eq!(mid.key(), "b");
        assert_eq!(bucket.keys(), ["a", "c", "d"]);

        let head = bucket.detach("a").expect("head entry present");
        assert_eq!(head.key(), "a");
        assert_eq!(bucket.keys(), ["c", "d"]);

        let tail = bucket.detach("d").expect("tail entry present");
        assert_eq!(tail.key(), "d");
        assert_eq!(bucket.keys(), ["c"]);

        assert!(bucket.detach("absent").is_none());
        assert_eq!(bucket.keys(), ["c"]);
    }

    /// Invariant: a detached entry carries its key and value out by value;
    /// dropping it fires the value's release exactly once.
    #[test]
    fn detached_entry_owns_its_value() {
        let fired = Rc::new(Cell::new(0));
        let sink = Rc::clone(&fired);

        let mut bucket = Bucket::new();
        append(&mut bucket, "k", Value::with_release(9, move |_| {
            sink.set(sink.get() + 1)
        }));

        let entry = bucket.detach("k").expect("present");
        assert!(bucket.is_empty());
        assert_eq!(fired.get(), 0, "release must wait for the entry to drop");

        drop(entry);
        assert_eq!(fired.get(), 1);
        drop(bucket);
        assert_eq!(fired.get(), 1, "bucket drop must not double-release");
    }

    /// Invariant: replace_value swaps in place and hands the superseded
    /// value back without touching chain structure.
    #[test]
    fn replace_value_returns_superseded() {
        let mut bucket = Bucket::new();
        append(&mut bucket, "k", Value::new(1));

        let old = bucket
            .find_mut("k")
            .expect("present")
            .replace_value(Value::new(2));
        assert_eq!(*old.get(), 1);
        assert_eq!(bucket.find("k").map(|e| *e.value().get()), Some(2));
        assert_eq!(bucket.len(), 1);
    }

    /// Invariant: dropping a bucket tears the chain down iteratively; a
    /// chain far deeper than any thread stack must not overflow.
    #[test]
    fn drop_is_iterative_on_long_chains() {
        let mut bucket = Bucket::new();
        let mut link = bucket.seek("head");
        for i in 0..200_000u32 {
            *link = Some(Box::new(Entry::new(&format!("k{i}"), Value::new(()))));
            link = &mut link.as_mut().expect("just written").next;
        }
        drop(bucket);
    }
}
