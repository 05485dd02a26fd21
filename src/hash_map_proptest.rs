#![cfg(test)]

// Property tests for HashMap kept inside the crate so they can check the
// displacement layout after every operation.

use crate::Error;
use crate::hash_map::HashMap;
use proptest::prelude::*;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hasher};

// Keeps only the low byte of the written key, so keys that agree modulo 256
// share an ideal bucket and clusters form at every capacity.
#[derive(Default)]
struct LowBitsHasher(u64);

impl Hasher for LowBitsHasher {
    fn finish(&self) -> u64 {
        self.0 & 0xff
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 << 8) | u64::from(b);
        }
    }

    fn write_u32(&mut self, n: u32) {
        self.0 = u64::from(n);
    }
}

#[derive(Clone, Default)]
struct LowBits;

impl BuildHasher for LowBits {
    type Hasher = LowBitsHasher;

    fn build_hasher(&self) -> LowBitsHasher {
        LowBitsHasher::default()
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u32, i32),
    GetOrInsertDefault(u32),
    Remove(u32),
    Find(u32),
    At(u32),
    Mutate(u32, i32),
    Clear,
    Clone,
    Iterate,
}

fn arb_op() -> impl Strategy<Value = Op> {
    // Keys are drawn from a small range so that removes and lookups hit.
    let key = 0u32..2048;
    prop_oneof![
        6 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => key.clone().prop_map(Op::GetOrInsertDefault),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.clone().prop_map(Op::Find),
        1 => key.clone().prop_map(Op::At),
        1 => (key, any::<i32>()).prop_map(|(k, d)| Op::Mutate(k, d)),
        1 => Just(Op::Clear),
        1 => Just(Op::Clone),
        1 => Just(Op::Iterate),
    ]
}

fn assert_matches_model(
    sut: &HashMap<u32, i32, LowBits>,
    model: &BTreeMap<u32, i32>,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(sut.len(), model.len());
    prop_assert_eq!(sut.is_empty(), model.is_empty());
    prop_assert!(sut.len() <= sut.capacity());
    let pairs: BTreeMap<u32, i32> = sut.iter().map(|(k, v)| (*k, *v)).collect();
    prop_assert_eq!(&pairs, model);
    Ok(())
}

// Property: state-machine equivalence against an ordered std model.
// - First insert wins; later inserts of the same key leave the value alone.
// - Lookups, `at` and removals agree with the model.
// - Every occupied slot sits at its recorded displacement after each step.
// - Clones are independent snapshots of the source.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in proptest::collection::vec(arb_op(), 1..400)) {
        let mut sut: HashMap<u32, i32, LowBits> = HashMap::with_hasher(LowBits);
        let mut model: BTreeMap<u32, i32> = BTreeMap::new();
        let mut snapshots: Vec<(HashMap<u32, i32, LowBits>, BTreeMap<u32, i32>)> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let inserted = sut.insert(k, v);
                    prop_assert_eq!(inserted, !model.contains_key(&k));
                    model.entry(k).or_insert(v);
                }
                Op::GetOrInsertDefault(k) => {
                    let stored = *sut.get_or_insert_default(k);
                    prop_assert_eq!(stored, *model.entry(k).or_default());
                }
                Op::Remove(k) => {
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                }
                Op::Find(k) => {
                    prop_assert_eq!(sut.find(&k), model.get_key_value(&k));
                    prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
                }
                Op::At(k) => {
                    let expected = model.get(&k).ok_or(Error::KeyNotFound);
                    prop_assert_eq!(sut.at(&k), expected);
                }
                Op::Mutate(k, d) => {
                    if let Some(v) = sut.get_mut(&k) {
                        *v = v.wrapping_add(d);
                    }
                    if let Some(v) = model.get_mut(&k) {
                        *v = v.wrapping_add(d);
                    }
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                    prop_assert_eq!(sut.capacity(), 1);
                }
                Op::Clone => {
                    let copy = sut.clone();
                    copy.assert_displacements();
                    snapshots.push((copy, model.clone()));
                }
                Op::Iterate => {
                    let keys: BTreeSet<u32> = sut.keys().copied().collect();
                    prop_assert_eq!(keys.len(), sut.len());
                    prop_assert!(keys.iter().eq(model.keys()));
                }
            }

            sut.assert_displacements();
            assert_matches_model(&sut, &model)?;
        }

        for (copy, expected) in &snapshots {
            assert_matches_model(copy, expected)?;
        }
    }
}

// Property: capacity never shrinks across inserts and removes, and only
// `clear` resets it.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_capacity_is_monotonic(
        keys in proptest::collection::vec(0u32..4096, 1..600),
        removals in proptest::collection::vec(0u32..4096, 0..300),
    ) {
        let mut sut: HashMap<u32, (), LowBits> = HashMap::with_hasher(LowBits);
        let mut last = sut.capacity();
        for k in keys {
            sut.insert(k, ());
            prop_assert!(sut.capacity() >= last);
            prop_assert!(sut.capacity().is_power_of_two());
            last = sut.capacity();
        }

        let block_size = sut.block_size();
        for k in removals {
            sut.remove(&k);
            prop_assert_eq!(sut.capacity(), last);
            prop_assert_eq!(sut.block_size(), block_size);
        }
        sut.assert_displacements();
    }
}
