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

//! Transactional execution context handed to handlers and keepers.

use crate::core::errors::SdkResult;
use crate::core::state::{CacheKv, KvStore};
use crate::core::types::{BlockHeader, Timestamp};
use serde::Serialize;

/// Notification emitted by a state transition, visible to external observers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Event type, e.g. `authz.grant`.
    pub kind: String,
    /// Ordered key/value attributes.
    pub attributes: Vec<(String, String)>,
}

impl Event {
    /// New event without attributes.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    /// First attribute value under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Store, header and event sink for one unit of execution.
pub struct Context<'a> {
    store: &'a mut dyn KvStore,
    header: BlockHeader,
    events: Vec<Event>,
}

impl<'a> Context<'a> {
    /// Context over `store` executing within the block described by `header`.
    pub fn new(store: &'a mut dyn KvStore, header: BlockHeader) -> Self {
        Self {
            store,
            header,
            events: Vec::new(),
        }
    }

    /// Read access to the store.
    pub fn store(&self) -> &(dyn KvStore + 'a) {
        &*self.store
    }

    /// Write access to the store.
    pub fn store_mut(&mut self) -> &mut (dyn KvStore + 'a) {
        &mut *self.store
    }

    /// Current block header.
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Current block time.
    pub fn block_time(&self) -> Timestamp {
        self.header.time
    }

    /// Record an event.
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events recorded so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Take the recorded events, leaving none behind.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Run `f` in a branch of this context.
    ///
    /// On `Ok` the branch's writes and events are merged into `self`; on `Err`
    /// both are discarded and `self` is exactly as before the call.
    pub fn branch<T, F>(&mut self, f: F) -> SdkResult<T>
    where
        F: FnOnce(&mut Context<'_>) -> SdkResult<T>,
    {
        let header = self.header.clone();
        let mut cache = CacheKv::new(&mut *self.store);
        let (out, events) = {
            let mut child = Context::new(&mut cache, header);
            let out = f(&mut child)?;
            (out, child.events)
        };
        cache.write()?;
        self.events.extend(events);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SdkError;
    use crate::core::state::MemStore;

    #[test]
    fn failed_branch_discards_writes_and_events() {
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, BlockHeader::default());

        let res: SdkResult<()> = ctx.branch(|c| {
            c.store_mut().set(b"k", b"v".to_vec())?;
            c.emit(Event::new("touched"));
            Err(SdkError::Unauthorized("nope".into()))
        });
        assert!(res.is_err());
        assert!(ctx.events().is_empty());
        assert_eq!(ctx.store().get(b"k").unwrap(), None);
    }

    #[test]
    fn successful_branch_merges_writes_and_events() {
        let mut store = MemStore::new();
        {
            let mut ctx = Context::new(&mut store, BlockHeader::default());
            let n = ctx
                .branch(|c| {
                    c.store_mut().set(b"k", b"v".to_vec())?;
                    c.emit(Event::new("touched").attr("key", "k"));
                    Ok(7u32)
                })
                .unwrap();
            assert_eq!(n, 7);
            assert_eq!(ctx.events()[0].get("key"), Some("k"));
        }
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
    }
}
