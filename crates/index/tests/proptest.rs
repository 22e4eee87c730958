//! Property-based tests for prism-index using proptest.

use prism_core::{Cid, Record, Value};
use prism_index::{HashIndex, IndexStore, Lookup};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::rc::Rc;

struct Item {
    cid: Cid,
    id: i64,
}

impl Record for Item {
    fn cid(&self) -> Cid {
        self.cid
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::Int64(self.id)),
            _ => None,
        }
    }
}

proptest! {
    /// Test that all inserted keys can be retrieved from a hash index.
    #[test]
    fn hash_insert_get_roundtrip(keys in prop::collection::vec(0i64..1000, 1..300)) {
        let mut index = HashIndex::new();
        for (i, &key) in keys.iter().enumerate() {
            index.add(key, i as u64);
        }
        for (i, &key) in keys.iter().enumerate() {
            prop_assert!(index.get(&key).contains(&(i as u64)));
        }
        prop_assert_eq!(index.len(), keys.len());
    }

    /// Test that a store holds exactly the records put and not deleted.
    #[test]
    fn store_matches_membership(
        ids in prop::collection::vec(0i64..200, 1..100),
        deletes in prop::collection::vec(0usize..100, 0..50)
    ) {
        let records: Vec<Rc<Item>> = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| Rc::new(Item { cid: 10_000 + i as Cid, id }))
            .collect();

        let mut store = IndexStore::new(["id"]);
        for record in &records {
            store.put(record.clone());
        }

        let mut deleted = BTreeSet::new();
        for &i in &deletes {
            if let Some(record) = records.get(i) {
                store.delete(record);
                deleted.insert(i);
            }
        }

        prop_assert_eq!(store.len(), records.len() - deleted.len());
        for (i, record) in records.iter().enumerate() {
            let found = store.lookup(&Lookup::cid(record.cid), None);
            prop_assert_eq!(found.is_some(), !deleted.contains(&i));
        }
        for (i, record) in records.iter().enumerate() {
            if deleted.contains(&i) {
                continue;
            }
            let found = store.lookup(&Lookup::key(record.id), None);
            prop_assert!(found.is_some_and(|r| r.id == record.id));
        }
    }
}
