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

//! Write-buffering branch over a parent store.
//!
//! Reads fall through to the parent unless the key was written in the branch.
//! Nothing reaches the parent until [`CacheKv::write`]; dropping the branch
//! discards every buffered write.

use crate::core::state::{KvIter, KvPair, KvStore, StoreError};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::iter::Peekable;

/// Buffered writes: `Some(value)` for a put, `None` for a delete.
pub type WriteSet = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// Branch of a parent store.
pub struct CacheKv<'a> {
    parent: &'a mut dyn KvStore,
    writes: WriteSet,
}

impl<'a> CacheKv<'a> {
    /// Empty branch over `parent`.
    pub fn new(parent: &'a mut dyn KvStore) -> Self {
        Self::with_writes(parent, WriteSet::new())
    }

    /// Resume a branch from a previously detached write set.
    pub fn with_writes(parent: &'a mut dyn KvStore, writes: WriteSet) -> Self {
        Self { parent, writes }
    }

    /// Whether anything was buffered.
    pub fn is_dirty(&self) -> bool {
        !self.writes.is_empty()
    }

    /// Flush buffered writes into the parent, in key order.
    pub fn write(self) -> Result<(), StoreError> {
        let CacheKv { parent, writes } = self;
        for (k, v) in writes {
            match v {
                Some(v) => parent.set(&k, v)?,
                None => parent.delete(&k)?,
            }
        }
        Ok(())
    }

    /// Detach the buffered writes without touching the parent.
    pub fn into_writes(self) -> WriteSet {
        self.writes
    }
}

impl KvStore for CacheKv<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.writes.get(key) {
            Some(v) => Ok(v.clone()),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        self.writes.insert(key.to_vec(), Some(value));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn iter_prefix<'b>(&'b self, prefix: &[u8]) -> Result<KvIter<'b>, StoreError> {
        let parent = self.parent.iter_prefix(prefix)?.peekable();
        let p = prefix.to_vec();
        let local: LocalIter<'b> = Box::new(
            self.writes
                .range(p.clone()..)
                .take_while(move |(k, _)| k.starts_with(&p)),
        );
        Ok(Box::new(MergeIter {
            parent,
            local: local.peekable(),
        }))
    }
}

type LocalIter<'a> = Box<dyn Iterator<Item = (&'a Vec<u8>, &'a Option<Vec<u8>>)> + 'a>;

/// Ordered merge of a parent scan with the buffered writes over the same
/// range. A buffered entry shadows the parent pair with the same key; a
/// buffered delete hides it. Pulls from the parent one pair at a time.
struct MergeIter<'a> {
    parent: Peekable<KvIter<'a>>,
    local: Peekable<LocalIter<'a>>,
}

impl Iterator for MergeIter<'_> {
    type Item = Result<KvPair, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let order = match (self.parent.peek(), self.local.peek()) {
                (None, None) => return None,
                (Some(_), None) | (Some(Err(_)), Some(_)) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(Ok((pk, _))), Some((lk, _))) => pk.as_slice().cmp(lk.as_slice()),
            };
            match order {
                Ordering::Less => return self.parent.next(),
                Ordering::Equal => {
                    self.parent.next();
                }
                Ordering::Greater => {}
            }
            if let Some((k, Some(v))) = self.local.next() {
                return Some(Ok((k.clone(), v.clone())));
            }
        }
    }
}
