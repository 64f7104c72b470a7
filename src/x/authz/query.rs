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

//! Read-only grant queries.
//!
//! Queries apply the same expiration rule as execution: expired grants are
//! never returned and are pruned from the context's store as they are seen.

use crate::core::context::Context;
use crate::core::errors::{SdkError, SdkResult};
use crate::core::pagination::{filtered_paginate, PageRequest, PageResponse};
use crate::core::types::AccAddress;
use crate::x::authz::grant::Grant;
use crate::x::authz::keeper::Keeper;
use crate::x::authz::store::GrantIter;
use serde::Deserialize;

/// Grants from `granter` to `grantee`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryAuthorizationsRequest {
    /// Granter address.
    pub granter: String,
    /// Grantee address.
    pub grantee: String,
    /// Page selector.
    pub pagination: Option<PageRequest>,
}

/// One page of grants.
#[derive(Clone, Debug)]
pub struct QueryGrantsResponse {
    /// Unexpired grants in key order.
    pub grants: Vec<Grant>,
    /// Page metadata.
    pub pagination: PageResponse,
}

/// Single grant lookup.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryAuthorizationRequest {
    /// Granter address.
    pub granter: String,
    /// Grantee address.
    pub grantee: String,
    /// Message type URL governed by the grant.
    pub method_name: String,
}

/// All grants held by one grantee.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryGranteeGrantsRequest {
    /// Grantee address.
    pub grantee: String,
    /// Page selector.
    pub pagination: Option<PageRequest>,
}

impl Keeper {
    /// Query/Authorizations.
    pub fn authorizations(
        &self,
        ctx: &mut Context<'_>,
        req: &QueryAuthorizationsRequest,
    ) -> SdkResult<QueryGrantsResponse> {
        let granter = AccAddress::parse(&req.granter)?;
        let grantee = AccAddress::parse(&req.grantee)?;
        let grants = self.grants();
        let it = grants.iterate_pair(ctx.store(), &grantee, &granter)?;
        let (page, expired) = self.page_unexpired(ctx, it, req.pagination.as_ref())?;
        self.prune(ctx, &expired)?;
        Ok(page)
    }

    /// Query/Authorization.
    pub fn authorization(
        &self,
        ctx: &mut Context<'_>,
        req: &QueryAuthorizationRequest,
    ) -> SdkResult<Grant> {
        if req.method_name.is_empty() {
            return Err(SdkError::InvalidRequest("empty method-name".into()));
        }
        let granter = AccAddress::parse(&req.granter)?;
        let grantee = AccAddress::parse(&req.grantee)?;
        self.get_or_revoke_authorization(ctx, &grantee, &granter, &req.method_name)?
            .ok_or_else(|| {
                SdkError::NotFound(format!(
                    "no authorization found for {} type",
                    req.method_name
                ))
            })
    }

    /// Query/GranteeGrants.
    pub fn grantee_grants(
        &self,
        ctx: &mut Context<'_>,
        req: &QueryGranteeGrantsRequest,
    ) -> SdkResult<QueryGrantsResponse> {
        let grantee = AccAddress::parse(&req.grantee)?;
        let grants = self.grants();
        let it = grants.iterate_by_grantee(ctx.store(), &grantee)?;
        let (page, expired) = self.page_unexpired(ctx, it, req.pagination.as_ref())?;
        self.prune(ctx, &expired)?;
        Ok(page)
    }

    fn page_unexpired(
        &self,
        ctx: &Context<'_>,
        it: GrantIter<'_>,
        pagination: Option<&PageRequest>,
    ) -> SdkResult<(QueryGrantsResponse, Vec<Grant>)> {
        let now = ctx.block_time();
        let mut expired: Vec<Grant> = Vec::new();
        let (grants, pagination) = filtered_paginate(it, pagination, |_, g: Grant| {
            if g.is_expired(now) {
                expired.push(g);
                return Ok(None);
            }
            Ok(Some(g))
        })?;
        Ok((QueryGrantsResponse { grants, pagination }, expired))
    }

    fn prune(&self, ctx: &mut Context<'_>, expired: &[Grant]) -> SdkResult<()> {
        for g in expired {
            self.grants()
                .delete(ctx.store_mut(), &g.grantee, &g.granter, g.msg_type_url())?;
        }
        Ok(())
    }
}
