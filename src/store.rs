//! C2 (typed store) and C3 (type-exclusivity guard).
//!
//! Six maps, one per data-type namespace, all keyed by byte-string. Maps
//! are `BTreeMap`/`BTreeSet` rather than the hash-based collections the
//! teacher's `obj.rs`/`db.rs` use: this executor needs a stable, replayable
//! iteration order for `*SCAN` cursors and for sorted-set tie-breaking by
//! byte-lexicographic member order (`spec.md` §3 invariant 3), and
//! `Vec<u8>`'s `Ord` is already the byte-lexicographic order Redis uses, so
//! a `BTreeMap` gives both for free.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::CommandError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    String,
    List,
    Set,
    Hash,
    SortedSet,
    HyperLogLog,
}

impl Kind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::List => "list",
            Kind::Set => "set",
            Kind::Hash => "hash",
            Kind::SortedSet => "zset",
            Kind::HyperLogLog => "hyperloglog",
        }
    }
}

#[derive(Default)]
pub struct Store {
    strings: BTreeMap<Vec<u8>, Vec<u8>>,
    lists: BTreeMap<Vec<u8>, VecDeque<Vec<u8>>>,
    sets: BTreeMap<Vec<u8>, BTreeSet<Vec<u8>>>,
    hashes: BTreeMap<Vec<u8>, BTreeMap<Vec<u8>, Vec<u8>>>,
    sorted_sets: BTreeMap<Vec<u8>, BTreeMap<Vec<u8>, f64>>,
    hyperloglogs: BTreeMap<Vec<u8>, BTreeSet<Vec<u8>>>,
}

impl Store {
    pub fn new() -> Store {
        Store::default()
    }

    pub fn flush(&mut self) {
        self.strings.clear();
        self.lists.clear();
        self.sets.clear();
        self.hashes.clear();
        self.sorted_sets.clear();
        self.hyperloglogs.clear();
    }

    /// `None` iff `key` is absent from every namespace.
    pub fn kind_of(&self, key: &[u8]) -> Option<Kind> {
        if self.strings.contains_key(key) {
            Some(Kind::String)
        } else if self.lists.contains_key(key) {
            Some(Kind::List)
        } else if self.sets.contains_key(key) {
            Some(Kind::Set)
        } else if self.hashes.contains_key(key) {
            Some(Kind::Hash)
        } else if self.sorted_sets.contains_key(key) {
            Some(Kind::SortedSet)
        } else if self.hyperloglogs.contains_key(key) {
            Some(Kind::HyperLogLog)
        } else {
            None
        }
    }

    pub fn exists(&self, key: &[u8]) -> bool {
        self.kind_of(key).is_some()
    }

    /// C3: true iff `key` is absent from all maps, or present only in the
    /// map for `kind`. Every write path calls this before mutating.
    pub fn check_kind(&self, key: &[u8], kind: Kind) -> Result<(), CommandError> {
        match self.kind_of(key) {
            None => Ok(()),
            Some(existing) if existing == kind => Ok(()),
            Some(_) => Err(CommandError::wrong_type()),
        }
    }

    /// Removes `key` from whichever namespace holds it. Returns `true` iff
    /// a key was actually removed.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        self.strings.remove(key).is_some()
            || self.lists.remove(key).is_some()
            || self.sets.remove(key).is_some()
            || self.hashes.remove(key).is_some()
            || self.sorted_sets.remove(key).is_some()
            || self.hyperloglogs.remove(key).is_some()
    }

    // -- strings --------------------------------------------------------

    pub fn get_string(&self, key: &[u8]) -> Result<Option<&Vec<u8>>, CommandError> {
        self.check_kind(key, Kind::String)?;
        Ok(self.strings.get(key))
    }

    pub fn set_string(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), CommandError> {
        self.check_kind(key, Kind::String)?;
        self.strings.insert(key.to_vec(), value);
        Ok(())
    }

    pub fn strings(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.strings
    }

    // -- lists ------------------------------------------------------------

    pub fn get_list(&self, key: &[u8]) -> Result<Option<&VecDeque<Vec<u8>>>, CommandError> {
        self.check_kind(key, Kind::List)?;
        Ok(self.lists.get(key))
    }

    pub fn list_entry(&mut self, key: &[u8]) -> Result<&mut VecDeque<Vec<u8>>, CommandError> {
        self.check_kind(key, Kind::List)?;
        Ok(self.lists.entry(key.to_vec()).or_default())
    }

    pub fn list_mut(&mut self, key: &[u8]) -> Result<Option<&mut VecDeque<Vec<u8>>>, CommandError> {
        self.check_kind(key, Kind::List)?;
        Ok(self.lists.get_mut(key))
    }

    pub fn remove_list_if_empty(&mut self, key: &[u8]) {
        if matches!(self.lists.get(key), Some(list) if list.is_empty()) {
            self.lists.remove(key);
        }
    }

    // -- sets -------------------------------------------------------------

    pub fn get_set(&self, key: &[u8]) -> Result<Option<&BTreeSet<Vec<u8>>>, CommandError> {
        self.check_kind(key, Kind::Set)?;
        Ok(self.sets.get(key))
    }

    pub fn set_entry(&mut self, key: &[u8]) -> Result<&mut BTreeSet<Vec<u8>>, CommandError> {
        self.check_kind(key, Kind::Set)?;
        Ok(self.sets.entry(key.to_vec()).or_default())
    }

    pub fn put_set(&mut self, key: &[u8], members: BTreeSet<Vec<u8>>) -> Result<(), CommandError> {
        self.check_kind(key, Kind::Set)?;
        if members.is_empty() {
            self.sets.remove(key);
        } else {
            self.sets.insert(key.to_vec(), members);
        }
        Ok(())
    }

    // -- hashes -------------------------------------------------------------

    pub fn get_hash(&self, key: &[u8]) -> Result<Option<&BTreeMap<Vec<u8>, Vec<u8>>>, CommandError> {
        self.check_kind(key, Kind::Hash)?;
        Ok(self.hashes.get(key))
    }

    pub fn hash_entry(&mut self, key: &[u8]) -> Result<&mut BTreeMap<Vec<u8>, Vec<u8>>, CommandError> {
        self.check_kind(key, Kind::Hash)?;
        Ok(self.hashes.entry(key.to_vec()).or_default())
    }

    /// HDEL removes the key once its hash becomes empty (`spec.md` §3
    /// Lifecycle) — the one type with that behavior; the other containers
    /// keep an empty shell (see `SPEC_FULL.md` §3).
    pub fn remove_hash_if_empty(&mut self, key: &[u8]) {
        if matches!(self.hashes.get(key), Some(hash) if hash.is_empty()) {
            self.hashes.remove(key);
        }
    }

    // -- sorted sets --------------------------------------------------------

    pub fn get_zset(&self, key: &[u8]) -> Result<Option<&BTreeMap<Vec<u8>, f64>>, CommandError> {
        self.check_kind(key, Kind::SortedSet)?;
        Ok(self.sorted_sets.get(key))
    }

    pub fn zset_entry(&mut self, key: &[u8]) -> Result<&mut BTreeMap<Vec<u8>, f64>, CommandError> {
        self.check_kind(key, Kind::SortedSet)?;
        Ok(self.sorted_sets.entry(key.to_vec()).or_default())
    }

    pub fn put_zset(&mut self, key: &[u8], members: BTreeMap<Vec<u8>, f64>) -> Result<(), CommandError> {
        self.check_kind(key, Kind::SortedSet)?;
        if members.is_empty() {
            self.sorted_sets.remove(key);
        } else {
            self.sorted_sets.insert(key.to_vec(), members);
        }
        Ok(())
    }

    // -- hyperloglogs ---------------------------------------------------

    pub fn get_hll(&self, key: &[u8]) -> Result<Option<&BTreeSet<Vec<u8>>>, CommandError> {
        self.check_kind(key, Kind::HyperLogLog)?;
        Ok(self.hyperloglogs.get(key))
    }

    pub fn hll_entry(&mut self, key: &[u8]) -> Result<&mut BTreeSet<Vec<u8>>, CommandError> {
        self.check_kind(key, Kind::HyperLogLog)?;
        Ok(self.hyperloglogs.entry(key.to_vec()).or_default())
    }

    pub fn put_hll(&mut self, key: &[u8], members: BTreeSet<Vec<u8>>) -> Result<(), CommandError> {
        self.check_kind(key, Kind::HyperLogLog)?;
        self.hyperloglogs.insert(key.to_vec(), members);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_exclusivity_rejects_conflicting_writes() {
        let mut store = Store::new();
        store.set_string(b"k", b"v".to_vec()).unwrap();
        assert_eq!(store.set_entry(b"k").unwrap_err(), CommandError::wrong_type());
    }

    #[test]
    fn missing_key_is_usable_by_any_kind() {
        let store = Store::new();
        assert_eq!(store.kind_of(b"nope"), None);
        assert_eq!(store.get_string(b"nope").unwrap(), None);
        assert_eq!(store.get_list(b"nope").unwrap(), None);
    }

    #[test]
    fn delete_removes_from_whichever_namespace_holds_it() {
        let mut store = Store::new();
        store.set_entry(b"s").unwrap().insert(b"m".to_vec());
        assert!(store.delete(b"s"));
        assert!(!store.delete(b"s"));
        assert_eq!(store.kind_of(b"s"), None);
    }

    #[test]
    fn hash_key_vanishes_once_emptied_but_set_does_not() {
        let mut store = Store::new();
        store.hash_entry(b"h").unwrap().insert(b"f".to_vec(), b"v".to_vec());
        store.hash_entry(b"h").unwrap().remove(b"f".as_slice());
        store.remove_hash_if_empty(b"h");
        assert_eq!(store.kind_of(b"h"), None);

        store.set_entry(b"s").unwrap().insert(b"m".to_vec());
        store.set_entry(b"s").unwrap().remove(b"m".as_slice());
        assert_eq!(store.kind_of(b"s"), Some(Kind::Set));
    }
}
