use std::collections::BTreeMap;

use crate::backend::interface::{scan, Result, StateEntry, WorldState};

/// Write set of a single transaction, layered over a read-only base.
///
/// Reads see the transaction's own writes first. Nothing reaches the
/// base until the write set is taken and applied with `commit`.
pub struct Overlay<'a> {
    base: &'a dyn WorldState,
    writes: BTreeMap<String, Vec<u8>>
}

impl<'a> Overlay<'a> {
    pub fn new(base: &'a dyn WorldState) -> Overlay<'a> {
        Overlay { base, writes: BTreeMap::new() }
    }

    pub fn is_dirty(&self) -> bool {
        !self.writes.is_empty()
    }

    pub fn into_writes(self) -> BTreeMap<String, Vec<u8>> {
        self.writes
    }

    /// Applies a write set to `target` as one unit: either every write
    /// lands and is flushed, or `target` is left unchanged.
    pub fn commit(writes: BTreeMap<String, Vec<u8>>, target: &mut dyn WorldState) -> Result<()> {
        target.apply(writes)
    }
}

impl<'a> WorldState for Overlay<'a> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.base.get_state(key)
        }
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.writes.insert(key.to_owned(), value);
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<StateEntry>> {
        let mut merged: BTreeMap<String, Vec<u8>> =
            self.base.get_state_by_range(start, end)?.into_iter().collect();
        merged.extend(scan(&self.writes, start, end));
        Ok(merged.into_iter().collect())
    }
}
