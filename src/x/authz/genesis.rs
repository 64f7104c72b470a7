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

//! Genesis import/export of grants.

use crate::core::context::Context;
use crate::core::errors::{SdkError, SdkResult};
use crate::core::types::{AccAddress, AnyValue, Timestamp};
use crate::x::authz::authorization::pack;
use crate::x::authz::grant::Grant;
use crate::x::authz::keeper::Keeper;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One exported grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantAuthorization {
    /// Granter.
    pub granter: AccAddress,
    /// Grantee.
    pub grantee: AccAddress,
    /// Packed authorization.
    pub authorization: AnyValue,
    /// Optional expiration.
    pub expiration: Option<Timestamp>,
}

/// Authz module genesis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    /// All grants.
    pub authorization: Vec<GrantAuthorization>,
}

impl GenesisState {
    /// Stateless checks.
    pub fn validate(&self) -> SdkResult<()> {
        for g in &self.authorization {
            if g.granter == g.grantee {
                return Err(SdkError::InvalidRequest(format!(
                    "genesis grant from {} to itself",
                    g.granter
                )));
            }
            if g.authorization.type_url.is_empty() {
                return Err(SdkError::PackAny(format!(
                    "genesis grant from {} to {} has no authorization type",
                    g.granter, g.grantee
                )));
            }
        }
        Ok(())
    }
}

impl Keeper {
    /// Load grants, skipping those already expired at the genesis block time.
    pub fn init_genesis(&self, ctx: &mut Context<'_>, state: &GenesisState) -> SdkResult<()> {
        state.validate()?;
        let now = ctx.block_time();
        let mut loaded = 0usize;
        for entry in &state.authorization {
            let authorization = self.registry().unpack(&entry.authorization)?;
            authorization.validate_basic()?;
            let grant = Grant {
                granter: entry.granter,
                grantee: entry.grantee,
                authorization,
                expiration: entry.expiration,
            };
            if grant.is_expired(now) {
                continue;
            }
            self.grants().save(ctx.store_mut(), &grant)?;
            loaded += 1;
        }
        info!(grants = loaded, "authz genesis loaded");
        Ok(())
    }

    /// Dump every unexpired grant.
    pub fn export_genesis(&self, ctx: &Context<'_>) -> SdkResult<GenesisState> {
        let now = ctx.block_time();
        let grants = self.grants();
        let mut out = Vec::new();
        for item in grants.iterate_all(ctx.store())? {
            let (_, g) = item?;
            if g.is_expired(now) {
                continue;
            }
            out.push(GrantAuthorization {
                granter: g.granter,
                grantee: g.grantee,
                authorization: pack(g.authorization.as_ref())?,
                expiration: g.expiration,
            });
        }
        Ok(GenesisState { authorization: out })
    }
}
