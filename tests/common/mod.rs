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

#![allow(dead_code)]

use ledgerkit::core::context::Context;
use ledgerkit::core::errors::{SdkError, SdkResult};
use ledgerkit::core::state::KvStore;
use ledgerkit::core::router::{downcast_msg, Msg, MsgHandler, MsgResult, MsgRouter};
use ledgerkit::core::types::{AccAddress, BlockHeader, Timestamp};
use ledgerkit::x::authz::{msg_server, AuthorizationRegistry, Keeper};
use std::any::Any;
use std::sync::Arc;

pub const MSG_WRITE: &str = "/test.v1.MsgWrite";
pub const MSG_FAIL: &str = "/test.v1.MsgFail";
pub const MSG_MULTI: &str = "/test.v1.MsgMulti";

pub const HOUR_MS: u64 = 60 * 60 * 1000;
pub const T0: u64 = 1_700_000_000_000;

pub fn addr(b: u8) -> AccAddress {
    AccAddress::from_bytes([b; 20])
}

pub fn header(height: u64, time_ms: u64) -> BlockHeader {
    BlockHeader {
        chain_id: "test-chain".into(),
        height,
        time: Timestamp::from_millis(time_ms),
    }
}

pub fn data_key(key: &str) -> Vec<u8> {
    format!("test/{key}").into_bytes()
}

/// Writes `value` under `test/{key}` on behalf of `signer`.
#[derive(Clone, Debug)]
pub struct MsgWrite {
    pub signer: AccAddress,
    pub key: String,
    pub value: String,
}

impl MsgWrite {
    pub fn boxed(signer: AccAddress, key: &str, value: &str) -> Box<dyn Msg> {
        Box::new(Self {
            signer,
            key: key.into(),
            value: value.into(),
        })
    }
}

impl Msg for MsgWrite {
    fn type_url(&self) -> &str {
        MSG_WRITE
    }
    fn signers(&self) -> Vec<AccAddress> {
        vec![self.signer]
    }
    fn validate_basic(&self) -> SdkResult<()> {
        if self.key.is_empty() {
            return Err(SdkError::InvalidRequest("empty key".into()));
        }
        Ok(())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Always fails in its handler.
#[derive(Clone, Debug)]
pub struct MsgFail {
    pub signer: AccAddress,
}

impl Msg for MsgFail {
    fn type_url(&self) -> &str {
        MSG_FAIL
    }
    fn signers(&self) -> Vec<AccAddress> {
        vec![self.signer]
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Carries several signers.
#[derive(Clone, Debug)]
pub struct MsgMulti {
    pub signers: Vec<AccAddress>,
}

impl Msg for MsgMulti {
    fn type_url(&self) -> &str {
        MSG_MULTI
    }
    fn signers(&self) -> Vec<AccAddress> {
        self.signers.clone()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct TestHandler;

impl MsgHandler for TestHandler {
    fn handle(
        &self,
        ctx: &mut Context<'_>,
        msg: &dyn Msg,
        _router: &MsgRouter,
    ) -> SdkResult<MsgResult> {
        match msg.type_url() {
            MSG_WRITE => {
                let m = downcast_msg::<MsgWrite>(msg)?;
                ctx.store_mut()
                    .set(&data_key(&m.key), m.value.as_bytes().to_vec())?;
                Ok(MsgResult {
                    data: m.value.as_bytes().to_vec(),
                })
            }
            MSG_FAIL => Err(SdkError::InvalidRequest("handler failure".into())),
            _ => Ok(MsgResult::default()),
        }
    }
}

pub fn register_test_handlers(router: &mut MsgRouter) {
    let h: Arc<dyn MsgHandler> = Arc::new(TestHandler);
    for url in [MSG_WRITE, MSG_FAIL, MSG_MULTI] {
        router.register(url, h.clone()).unwrap();
    }
}

pub fn keeper() -> Keeper {
    Keeper::new(Arc::new(AuthorizationRegistry::with_builtin()))
}

/// Router with the authz handlers and the test messages.
pub fn router(keeper: &Keeper) -> MsgRouter {
    let mut r = MsgRouter::new();
    msg_server::register_handlers(&mut r, keeper.clone()).unwrap();
    register_test_handlers(&mut r);
    r
}
