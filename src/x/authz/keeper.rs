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
#![deny(missing_docs)]

//! Authz keeper: grant lifecycle and delegated execution.
//!
//! The keeper holds no state of its own between calls; every operation reads
//! the grant records from the context's store.

use crate::core::context::{Context, Event};
use crate::core::errors::{SdkError, SdkResult};
use crate::core::router::{Msg, MsgRouter};
use crate::core::types::{AccAddress, Timestamp};
use crate::x::authz::authorization::{Authorization, AuthorizationRegistry};
use crate::x::authz::grant::Grant;
use crate::x::authz::store::GrantStore;
use crate::x::authz::{EVENT_EXEC, EVENT_GRANT, EVENT_REVOKE};
use std::sync::Arc;
use tracing::debug;

/// Authz keeper.
#[derive(Clone, Debug)]
pub struct Keeper {
    registry: Arc<AuthorizationRegistry>,
}

impl Keeper {
    /// Keeper decoding stored authorizations through `registry`.
    pub fn new(registry: Arc<AuthorizationRegistry>) -> Self {
        Self { registry }
    }

    /// Registry in use.
    pub fn registry(&self) -> &AuthorizationRegistry {
        &self.registry
    }

    pub(crate) fn grants(&self) -> GrantStore<'_> {
        GrantStore::new(&self.registry)
    }

    /// Create or overwrite the grant for (grantee, granter, msg type).
    pub fn grant(
        &self,
        ctx: &mut Context<'_>,
        granter: &AccAddress,
        grantee: &AccAddress,
        authorization: Box<dyn Authorization>,
        expiration: Option<Timestamp>,
    ) -> SdkResult<()> {
        if granter == grantee {
            return Err(SdkError::InvalidRequest(
                "granter and grantee cannot be same".into(),
            ));
        }
        authorization.validate_basic()?;
        if !self.registry.is_registered(authorization.type_url()) {
            return Err(SdkError::PackAny(format!(
                "authorization {} is not registered",
                authorization.type_url()
            )));
        }
        let now = ctx.block_time();
        if let Some(exp) = expiration {
            if exp <= now {
                return Err(SdkError::InvalidRequest(format!(
                    "expiration {exp} must be after block time {now}"
                )));
            }
        }

        let grant = Grant {
            granter: *granter,
            grantee: *grantee,
            authorization,
            expiration,
        };
        self.grants().save(ctx.store_mut(), &grant)?;
        debug!(%granter, %grantee, msg_type_url = grant.msg_type_url(), "grant saved");
        ctx.emit(
            Event::new(EVENT_GRANT)
                .attr("msg_type_url", grant.msg_type_url())
                .attr("granter", granter)
                .attr("grantee", grantee),
        );
        Ok(())
    }

    /// Remove the grant for (grantee, granter, msg type). `NotFound` if absent.
    pub fn revoke(
        &self,
        ctx: &mut Context<'_>,
        granter: &AccAddress,
        grantee: &AccAddress,
        msg_type_url: &str,
    ) -> SdkResult<()> {
        self.grants()
            .delete(ctx.store_mut(), grantee, granter, msg_type_url)?;
        debug!(%granter, %grantee, msg_type_url, "grant revoked");
        ctx.emit(
            Event::new(EVENT_REVOKE)
                .attr("msg_type_url", msg_type_url)
                .attr("granter", granter)
                .attr("grantee", grantee),
        );
        Ok(())
    }

    /// Unexpired grant for the triple, pruning it if it has expired.
    pub fn get_or_revoke_authorization(
        &self,
        ctx: &mut Context<'_>,
        grantee: &AccAddress,
        granter: &AccAddress,
        msg_type_url: &str,
    ) -> SdkResult<Option<Grant>> {
        let now = ctx.block_time();
        self.grants()
            .get_or_prune(ctx.store_mut(), grantee, granter, msg_type_url, now)
    }

    /// Execute `msgs` on behalf of their signers, checking `grantee`'s grants.
    ///
    /// Grant mutations happen in `ctx` directly; use [`Keeper::exec`] for the
    /// all-or-nothing variant.
    pub fn dispatch_actions(
        &self,
        ctx: &mut Context<'_>,
        grantee: &AccAddress,
        msgs: &[Box<dyn Msg>],
        router: &MsgRouter,
    ) -> SdkResult<Vec<Vec<u8>>> {
        let mut results = Vec::with_capacity(msgs.len());
        for msg in msgs {
            let signers = msg.signers();
            let [granter] = signers.as_slice() else {
                return Err(SdkError::InvalidRequest(format!(
                    "authorization can be given to msg with only one signer, {} has {}",
                    msg.type_url(),
                    signers.len()
                )));
            };

            if granter != grantee {
                self.authorize(ctx, grantee, granter, msg.as_ref())?;
            }

            let res = router.dispatch(ctx, msg.as_ref())?;
            results.push(res.data);
        }
        Ok(results)
    }

    /// [`Keeper::dispatch_actions`] inside one branch: any failure rolls back
    /// every grant mutation and message effect of the batch.
    pub fn exec(
        &self,
        ctx: &mut Context<'_>,
        grantee: &AccAddress,
        msgs: &[Box<dyn Msg>],
        router: &MsgRouter,
    ) -> SdkResult<Vec<Vec<u8>>> {
        ctx.branch(|c| self.dispatch_actions(c, grantee, msgs, router))
    }

    fn authorize(
        &self,
        ctx: &mut Context<'_>,
        grantee: &AccAddress,
        granter: &AccAddress,
        msg: &dyn Msg,
    ) -> SdkResult<()> {
        let url = msg.type_url();
        let Some(grant) = self.get_or_revoke_authorization(ctx, grantee, granter, url)? else {
            return Err(SdkError::Unauthorized(format!(
                "no authorization found for {url} granted by {granter} to {grantee}"
            )));
        };

        let resp = grant.authorization.accept(ctx, msg)?;
        if !resp.accept {
            return Err(SdkError::Unauthorized(format!(
                "authorization for {url} granted by {granter} to {grantee} rejected the message"
            )));
        }

        if resp.delete {
            self.grants().delete(ctx.store_mut(), grantee, granter, url)?;
        } else if let Some(updated) = resp.updated {
            let next = Grant {
                authorization: updated,
                ..grant
            };
            self.grants().save(ctx.store_mut(), &next)?;
        }

        debug!(%granter, %grantee, msg_type_url = url, delete = resp.delete, "delegated message accepted");
        ctx.emit(
            Event::new(EVENT_EXEC)
                .attr("msg_type_url", url)
                .attr("granter", granter)
                .attr("grantee", grantee),
        );
        Ok(())
    }

    /// Delete every grant expired at the current block time.
    pub fn prune_expired(&self, ctx: &mut Context<'_>) -> SdkResult<u64> {
        let now = ctx.block_time();
        let n = self.grants().prune_expired(ctx.store_mut(), now)?;
        if n > 0 {
            debug!(pruned = n, "expired grants pruned");
        }
        Ok(n)
    }
}
