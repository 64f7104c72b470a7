// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Key-value state: the store abstraction, an in-memory store, write-buffering
//! branches and the sled-backed persistent state.

pub mod cache;
pub mod merkle;
pub mod persistent_state;

use std::collections::BTreeMap;
use thiserror::Error;

pub use cache::{CacheKv, WriteSet};

/// Store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("db open")]
    DbOpen,
    #[error("db io")]
    DbIo,
    #[error("tx conflict")]
    TxConflict,
}

/// Key/value pair as stored.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Iterator over a key range, ascending by key bytes.
pub type KvIter<'a> = Box<dyn Iterator<Item = Result<KvPair, StoreError>> + 'a>;

/// Byte-keyed store visible to keepers within one transaction scope.
pub trait KvStore {
    /// Get value.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Put value, overwriting.
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError>;

    /// Delete key (no-op if absent).
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    /// All pairs whose key starts with `prefix`, in key order.
    fn iter_prefix<'a>(&'a self, prefix: &[u8]) -> Result<KvIter<'a>, StoreError>;

    /// Whether `key` is present.
    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-memory store. Used for tests and as a scratch snapshot.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no keys are held.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        self.map.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.map.remove(key);
        Ok(())
    }

    fn iter_prefix<'a>(&'a self, prefix: &[u8]) -> Result<KvIter<'a>, StoreError> {
        let p = prefix.to_vec();
        let it = self
            .map
            .range(p.clone()..)
            .take_while(move |(k, _)| k.starts_with(&p))
            .map(|(k, v)| Ok((k.clone(), v.clone())));
        Ok(Box::new(it))
    }
}
