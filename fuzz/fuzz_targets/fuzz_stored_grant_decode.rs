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

#![no_main]
#![forbid(unsafe_code)]

use arbitrary::Arbitrary;
use ledgerkit::core::context::Context;
use ledgerkit::core::state::{KvStore, MemStore};
use ledgerkit::core::types::{AccAddress, BlockHeader, Timestamp};
use ledgerkit::x::authz::keys::grant_key;
use ledgerkit::x::authz::query::QueryGranteeGrantsRequest;
use ledgerkit::x::authz::{AuthorizationRegistry, Keeper};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

#[derive(Clone, Debug, Arbitrary)]
struct Input {
    grantee: [u8; 20],
    granter: [u8; 20],
    url: String,
    value: Vec<u8>,
    now: u64,
}

fuzz_target!(|inp: Input| {
    let grantee = AccAddress::from_bytes(inp.grantee);
    let granter = AccAddress::from_bytes(inp.granter);
    let mut store = MemStore::new();
    if store
        .set(&grant_key(&grantee, &granter, &inp.url), inp.value)
        .is_err()
    {
        return;
    }

    let keeper = Keeper::new(Arc::new(AuthorizationRegistry::with_builtin()));
    let header = BlockHeader {
        chain_id: "fuzz".into(),
        height: 1,
        time: Timestamp::from_millis(inp.now),
    };
    let mut ctx = Context::new(&mut store, header);
    let _ = keeper.get_or_revoke_authorization(&mut ctx, &grantee, &granter, &inp.url);
    let req = QueryGranteeGrantsRequest {
        grantee: grantee.to_string(),
        pagination: None,
    };
    let _ = keeper.grantee_grants(&mut ctx, &req);
    let _ = keeper.prune_expired(&mut ctx);
});
