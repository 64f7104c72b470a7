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

//! Routes authz messages to the keeper.

use crate::core::context::Context;
use crate::core::errors::{SdkError, SdkResult};
use crate::core::router::{downcast_msg, Msg, MsgHandler, MsgResult, MsgRouter};
use crate::core::types::{encode_canonical, AccAddress};
use crate::x::authz::keeper::Keeper;
use crate::x::authz::msgs::{
    MsgExec, MsgGrant, MsgRevoke, MSG_EXEC_TYPE_URL, MSG_GRANT_TYPE_URL, MSG_REVOKE_TYPE_URL,
};
use std::sync::Arc;

/// Message handler for the authz module.
#[derive(Clone, Debug)]
pub struct AuthzHandler {
    keeper: Keeper,
}

impl AuthzHandler {
    /// Handler backed by `keeper`.
    pub fn new(keeper: Keeper) -> Self {
        Self { keeper }
    }
}

/// Register the authz handler for all three message types.
pub fn register_handlers(router: &mut MsgRouter, keeper: Keeper) -> SdkResult<()> {
    let h: Arc<dyn MsgHandler> = Arc::new(AuthzHandler::new(keeper));
    router.register(MSG_GRANT_TYPE_URL, h.clone())?;
    router.register(MSG_REVOKE_TYPE_URL, h.clone())?;
    router.register(MSG_EXEC_TYPE_URL, h)?;
    Ok(())
}

impl MsgHandler for AuthzHandler {
    fn handle(
        &self,
        ctx: &mut Context<'_>,
        msg: &dyn Msg,
        router: &MsgRouter,
    ) -> SdkResult<MsgResult> {
        match msg.type_url() {
            MSG_GRANT_TYPE_URL => {
                let m = downcast_msg::<MsgGrant>(msg)?;
                let (granter, grantee) = m.parties()?;
                self.keeper
                    .grant(ctx, &granter, &grantee, m.authorization.clone(), m.expiration)?;
                Ok(MsgResult::default())
            }
            MSG_REVOKE_TYPE_URL => {
                let m = downcast_msg::<MsgRevoke>(msg)?;
                let (granter, grantee) = m.parties()?;
                self.keeper.revoke(ctx, &granter, &grantee, &m.msg_type_url)?;
                Ok(MsgResult::default())
            }
            MSG_EXEC_TYPE_URL => {
                let m = downcast_msg::<MsgExec>(msg)?;
                let grantee = AccAddress::parse(&m.grantee)?;
                let results = self.keeper.exec(ctx, &grantee, &m.msgs, router)?;
                Ok(MsgResult {
                    data: encode_canonical(&results)?,
                })
            }
            other => Err(SdkError::UnknownRequest(format!(
                "unrecognized authz message type: {other}"
            ))),
        }
    }
}
