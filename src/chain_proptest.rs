#![cfg(test)]

// Property tests for the chain layer kept inside the crate so they sit
// next to the internals they exercise.

use crate::chain::{Bucket, Entry};
use crate::value::Value;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug)]
enum Op {
    Upsert(usize, i32),
    Detach(usize),
    Find(usize),
}

fn key(i: usize) -> String {
    format!("k{}", i)
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        (0usize..8, any::<i32>()).prop_map(|(i, v)| Op::Upsert(i, v)),
        (0usize..8).prop_map(Op::Detach),
        (0usize..8).prop_map(Op::Find),
    ];
    proptest::collection::vec(op, 1..80)
}

// Property: state-machine equivalence against an order-preserving Vec
// model. Invariants exercised across random operation sequences:
// - Upsert of a new key appends at the tail; of an existing key replaces
//   in place, preserving chain order and length.
// - Detach removes exactly the matching entry and relinks around it.
// - Find parity with the model for both present and absent keys.
// - At most one entry per key ever exists in the chain.
proptest! {
    #[test]
    fn prop_chain_matches_vec_model(ops in arb_ops()) {
        let mut bucket: Bucket<i32> = Bucket::new();
        let mut model: Vec<(String, i32)> = Vec::new();

        for op in ops {
            match op {
                Op::Upsert(i, v) => {
                    let k = key(i);
                    let link = bucket.seek(&k);
                    match link.as_deref_mut() {
                        Some(entry) => {
                            let _superseded = entry.replace_value(Value::new(v));
                        }
                        None => *link = Some(Box::new(Entry::new(&k, Value::new(v)))),
                    }
                    match model.iter_mut().find(|(mk, _)| *mk == k) {
                        Some(slot) => slot.1 = v,
                        None => model.push((k, v)),
                    }
                }
                Op::Detach(i) => {
                    let k = key(i);
                    let detached = bucket.detach(&k);
                    let pos = model.iter().position(|(mk, _)| *mk == k);
                    prop_assert_eq!(detached.is_some(), pos.is_some());
                    if let Some(entry) = &detached {
                        prop_assert_eq!(entry.key(), k.as_str());
                    }
                    if let Some(p) = pos {
                        model.remove(p);
                    }
                }
                Op::Find(i) => {
                    let k = key(i);
                    let found = bucket.find(&k).map(|e| *e.value().get());
                    let expected = model.iter().find(|(mk, _)| *mk == k).map(|(_, v)| *v);
                    prop_assert_eq!(found, expected);
                }
            }

            // Chain order is append order with in-place replacement.
            let keys: Vec<String> = bucket.keys().iter().map(|s| s.to_string()).collect();
            let expected: Vec<String> = model.iter().map(|(k, _)| k.clone()).collect();
            prop_assert_eq!(keys, expected);
            prop_assert_eq!(bucket.len(), model.len());
        }
    }
}

// Property: dropping a bucket releases every still-stored value exactly
// once, regardless of chain length.
proptest! {
    #[test]
    fn prop_drop_releases_every_entry_once(n in 0usize..64) {
        let fired = Rc::new(RefCell::new(vec![0u32; n]));
        let mut bucket: Bucket<usize> = Bucket::new();

        for i in 0..n {
            let sink = Rc::clone(&fired);
            let k = key(i);
            let link = bucket.seek(&k);
            *link = Some(Box::new(Entry::new(
                &k,
                Value::with_release(i, move |p| sink.borrow_mut()[p] += 1),
            )));
        }

        drop(bucket);
        prop_assert!(fired.borrow().iter().all(|&count| count == 1));
    }
}
