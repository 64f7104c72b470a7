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

//! Grant persistence over a [`KvStore`].

use crate::core::errors::{SdkError, SdkResult};
use crate::core::state::KvStore;
use crate::core::types::{AccAddress, Timestamp};
use crate::x::authz::authorization::AuthorizationRegistry;
use crate::x::authz::grant::{Grant, StoredGrant};
use crate::x::authz::keys::{grant_key, grantee_prefix, pair_prefix, parse_grant_key, GRANT_KEY_PREFIX};
use tracing::{debug, warn};

/// Iterator of `(cursor, grant)` where `cursor` is the key relative to the scanned prefix.
pub type GrantIter<'s> = Box<dyn Iterator<Item = SdkResult<(Vec<u8>, Grant)>> + 's>;

/// CRUD and range scans over grant records.
#[derive(Clone, Copy, Debug)]
pub struct GrantStore<'r> {
    registry: &'r AuthorizationRegistry,
}

impl<'r> GrantStore<'r> {
    /// Store decoding authorizations with `registry`.
    pub fn new(registry: &'r AuthorizationRegistry) -> Self {
        Self { registry }
    }

    /// Upsert by (grantee, granter, msg type). Silently overwrites.
    pub fn save<S: KvStore + ?Sized>(&self, store: &mut S, grant: &Grant) -> SdkResult<()> {
        let key = grant_key(&grant.grantee, &grant.granter, grant.msg_type_url());
        let value = StoredGrant::from_parts(grant.authorization.as_ref(), grant.expiration)?;
        store.set(&key, value.encode()?)?;
        Ok(())
    }

    /// Raw lookup, expired or not.
    pub fn get<S: KvStore + ?Sized>(
        &self,
        store: &S,
        grantee: &AccAddress,
        granter: &AccAddress,
        msg_type_url: &str,
    ) -> SdkResult<Option<Grant>> {
        let key = grant_key(grantee, granter, msg_type_url);
        let Some(bytes) = store.get(&key)? else {
            return Ok(None);
        };
        let stored = StoredGrant::decode(&bytes, self.registry)?;
        Ok(Some(stored.into_grant(*granter, *grantee, self.registry)?))
    }

    /// Lookup that treats an expired grant as absent and deletes it.
    pub fn get_or_prune<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        grantee: &AccAddress,
        granter: &AccAddress,
        msg_type_url: &str,
        now: Timestamp,
    ) -> SdkResult<Option<Grant>> {
        let Some(grant) = self.get(store, grantee, granter, msg_type_url)? else {
            return Ok(None);
        };
        if grant.is_expired(now) {
            debug!(%granter, %grantee, msg_type_url, "pruning expired grant on read");
            store.delete(&grant_key(grantee, granter, msg_type_url))?;
            return Ok(None);
        }
        Ok(Some(grant))
    }

    /// Delete one grant. Fails with `NotFound` if absent.
    pub fn delete<S: KvStore + ?Sized>(
        &self,
        store: &mut S,
        grantee: &AccAddress,
        granter: &AccAddress,
        msg_type_url: &str,
    ) -> SdkResult<()> {
        let key = grant_key(grantee, granter, msg_type_url);
        if !store.has(&key)? {
            return Err(SdkError::NotFound(format!(
                "authorization not found for {msg_type_url} type"
            )));
        }
        store.delete(&key)?;
        Ok(())
    }

    /// Grants held by `grantee`, in key order. A fresh scan on every call.
    pub fn iterate_by_grantee<'s, S: KvStore + ?Sized>(
        &'s self,
        store: &'s S,
        grantee: &AccAddress,
    ) -> SdkResult<GrantIter<'s>> {
        self.scan(store, grantee_prefix(grantee))
    }

    /// Grants from `granter` to `grantee`, in message type URL order.
    pub fn iterate_pair<'s, S: KvStore + ?Sized>(
        &'s self,
        store: &'s S,
        grantee: &AccAddress,
        granter: &AccAddress,
    ) -> SdkResult<GrantIter<'s>> {
        self.scan(store, pair_prefix(grantee, granter))
    }

    /// Every grant in the store.
    pub fn iterate_all<'s, S: KvStore + ?Sized>(&'s self, store: &'s S) -> SdkResult<GrantIter<'s>> {
        self.scan(store, vec![GRANT_KEY_PREFIX])
    }

    fn scan<'s, S: KvStore + ?Sized>(&'s self, store: &'s S, prefix: Vec<u8>) -> SdkResult<GrantIter<'s>> {
        let registry = self.registry;
        let skip = prefix.len();
        let it = store.iter_prefix(&prefix)?.map(move |item| {
            let (key, value) = item?;
            let (grantee, granter, _) = parse_grant_key(&key).map_err(|e| {
                SdkError::InvalidRequest(format!("corrupt grant record: {e}"))
            })?;
            let grant = StoredGrant::decode(&value, registry)?.into_grant(granter, grantee, registry)?;
            Ok((key[skip..].to_vec(), grant))
        });
        Ok(Box::new(it))
    }

    /// Delete every grant expired at `now`. Returns the number removed.
    pub fn prune_expired<S: KvStore + ?Sized>(&self, store: &mut S, now: Timestamp) -> SdkResult<u64> {
        let mut stale: Vec<Vec<u8>> = Vec::new();
        for item in store.iter_prefix(&[GRANT_KEY_PREFIX])? {
            let (key, value) = item?;
            let stored = match StoredGrant::decode(&value, self.registry) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "skipping undecodable grant during prune");
                    continue;
                }
            };
            if matches!(stored.expiration, Some(exp) if now > exp) {
                stale.push(key);
            }
        }
        for key in &stale {
            store.delete(key)?;
        }
        Ok(stale.len() as u64)
    }
}
