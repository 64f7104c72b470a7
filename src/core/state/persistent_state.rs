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

//! Persistent key-value state using sled. Block write sets are committed in one
//! sled transaction and the app hash is a deterministic Merkle root over all pairs.

use crate::core::state::merkle::{root_of_sorted, Hash32};
use crate::core::state::{KvIter, KvStore, StoreError, WriteSet};
use sled::transaction::{ConflictableTransactionError, TransactionError};

/// State operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KvOp {
    /// Put key/value.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete key.
    Del { key: Vec<u8> },
}

impl KvOp {
    /// Ops for a buffered write set, in key order.
    pub fn from_writes(writes: WriteSet) -> Vec<KvOp> {
        writes
            .into_iter()
            .map(|(key, v)| match v {
                Some(value) => KvOp::Put { key, value },
                None => KvOp::Del { key },
            })
            .collect()
    }
}

/// Persistent state wrapper. Cloning shares the underlying database.
#[derive(Clone)]
pub struct PersistentState {
    db: sled::Db,
}

impl PersistentState {
    /// Open sled DB at path (directory).
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|_| StoreError::DbOpen)?;
        Ok(Self { db })
    }

    /// Atomic commit using a sled transaction.
    pub fn commit_atomic(&self, ops: &[KvOp]) -> Result<(), StoreError> {
        let res: Result<(), TransactionError<StoreError>> = self.db.transaction(|t| {
            for op in ops {
                match op {
                    KvOp::Put { key, value } => {
                        t.insert(key.as_slice(), value.as_slice())?;
                    }
                    KvOp::Del { key } => {
                        t.remove(key.as_slice())?;
                    }
                }
            }
            Ok::<(), ConflictableTransactionError<StoreError>>(())
        });
        match res {
            Ok(()) => {}
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(_)) => return Err(StoreError::DbIo),
        }
        self.db.flush().map_err(|_| StoreError::DbIo)?;
        Ok(())
    }

    /// Deterministic Merkle root over all KV pairs in DB.
    pub fn state_root(&self) -> Result<Hash32, StoreError> {
        // sled iterates in lexicographic key order already.
        let mut pairs: Vec<(sled::IVec, sled::IVec)> = Vec::new();
        for item in self.db.iter() {
            pairs.push(item.map_err(|_| StoreError::DbIo)?);
        }
        Ok(root_of_sorted(
            pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())),
        ))
    }
}

impl KvStore for PersistentState {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let v = self.db.get(key).map_err(|_| StoreError::DbIo)?;
        Ok(v.map(|iv| iv.to_vec()))
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        self.db.insert(key, value).map_err(|_| StoreError::DbIo)?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.db.remove(key).map_err(|_| StoreError::DbIo)?;
        Ok(())
    }

    fn iter_prefix<'a>(&'a self, prefix: &[u8]) -> Result<KvIter<'a>, StoreError> {
        let it = self.db.scan_prefix(prefix).map(|item| {
            item.map(|(k, v)| (k.to_vec(), v.to_vec()))
                .map_err(|_| StoreError::DbIo)
        });
        Ok(Box::new(it))
    }
}
