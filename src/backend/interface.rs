use std::collections::BTreeMap;
use std::ops::Bound;

use thiserror::Error;

pub type StateEntry = (String, Vec<u8>);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed state file: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("value under {0} is not valid UTF-8")]
    NonUtf8Value(String)
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Key-value store holding the current value of every record.
///
/// Range scans return entries in key order. An empty `start` or `end`
/// leaves that side unbounded; `end` itself is excluded.
pub trait WorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()>;
    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<StateEntry>>;

    /// Makes previously put values durable. No-op for volatile stores.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Writes a whole write set and makes it durable. On error the store
    /// must read as it did before the call; stores whose `put_state` or
    /// `flush` can fail override this.
    fn apply(&mut self, writes: BTreeMap<String, Vec<u8>>) -> Result<()> {
        for (key, value) in writes {
            self.put_state(&key, value)?;
        }
        self.flush()
    }
}

pub(crate) fn range_bounds<'a>(start: &'a str, end: &'a str) -> (Bound<&'a str>, Bound<&'a str>) {
    let lower = if start.is_empty() { Bound::Unbounded } else { Bound::Included(start) };
    let upper = if end.is_empty() { Bound::Unbounded } else { Bound::Excluded(end) };
    (lower, upper)
}

pub(crate) fn scan<V: Clone>(map: &BTreeMap<String, V>, start: &str, end: &str) -> Vec<(String, V)> {
    if !start.is_empty() && !end.is_empty() && start >= end {
        return vec![];
    }
    map.range::<str, _>(range_bounds(start, end))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
