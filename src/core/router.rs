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

//! Message trait and the type-URL keyed dispatcher.

use crate::core::context::Context;
use crate::core::errors::{SdkError, SdkResult};
use crate::core::types::AccAddress;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A state-transition request.
pub trait Msg: fmt::Debug + Send + Sync + 'static {
    /// Canonical identifier of the message kind, e.g. `/ledgerkit.authz.v1.MsgGrant`.
    fn type_url(&self) -> &str;

    /// Accounts that must have authorized this message.
    fn signers(&self) -> Vec<AccAddress>;

    /// Stateless checks.
    fn validate_basic(&self) -> SdkResult<()> {
        Ok(())
    }

    /// Downcast support for handlers.
    fn as_any(&self) -> &dyn Any;
}

/// Handler output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MsgResult {
    /// Handler-defined response bytes.
    pub data: Vec<u8>,
}

/// Executes one message kind against application state.
pub trait MsgHandler: Send + Sync {
    /// Execute `msg`. `router` allows handlers to dispatch nested messages.
    fn handle(
        &self,
        ctx: &mut Context<'_>,
        msg: &dyn Msg,
        router: &MsgRouter,
    ) -> SdkResult<MsgResult>;
}

/// Downcast a routed message to the concrete type a handler expects.
pub fn downcast_msg<'m, T: Msg>(msg: &'m dyn Msg) -> SdkResult<&'m T> {
    msg.as_any().downcast_ref::<T>().ok_or_else(|| {
        SdkError::InvalidType(format!(
            "unexpected message {} for {}",
            msg.type_url(),
            std::any::type_name::<T>()
        ))
    })
}

/// Routes messages to handlers by type URL.
#[derive(Clone, Default)]
pub struct MsgRouter {
    routes: BTreeMap<String, Arc<dyn MsgHandler>>,
}

impl MsgRouter {
    /// Empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `type_url`. A type URL can be routed only once.
    pub fn register(&mut self, type_url: &str, handler: Arc<dyn MsgHandler>) -> SdkResult<()> {
        if type_url.is_empty() {
            return Err(SdkError::InvalidRequest("empty message type url".into()));
        }
        if self.routes.contains_key(type_url) {
            return Err(SdkError::InvalidRequest(format!(
                "route for {type_url} already registered"
            )));
        }
        self.routes.insert(type_url.to_string(), handler);
        Ok(())
    }

    /// Whether a handler exists for `type_url`.
    pub fn has_route(&self, type_url: &str) -> bool {
        self.routes.contains_key(type_url)
    }

    /// Execute `msg` with its registered handler.
    pub fn dispatch(&self, ctx: &mut Context<'_>, msg: &dyn Msg) -> SdkResult<MsgResult> {
        let handler = self.routes.get(msg.type_url()).ok_or_else(|| {
            SdkError::UnknownRequest(format!("unrecognized message type: {}", msg.type_url()))
        })?;
        debug!(type_url = msg.type_url(), "dispatching message");
        handler.handle(ctx, msg, self)
    }
}

impl fmt::Debug for MsgRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MsgRouter")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}
