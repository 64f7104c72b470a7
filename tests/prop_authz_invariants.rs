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

mod common;

use common::{header, keeper, T0};
use ledgerkit::core::context::Context;
use ledgerkit::core::errors::SdkError;
use ledgerkit::core::state::MemStore;
use ledgerkit::core::types::{AccAddress, Timestamp};
use ledgerkit::x::authz::keys::{grant_key, grantee_prefix, pair_prefix, parse_grant_key};
use ledgerkit::x::authz::GenericAuthorization;
use proptest::prelude::*;

fn any_addr() -> impl Strategy<Value = AccAddress> {
    any::<[u8; 20]>().prop_map(AccAddress::from_bytes)
}

fn any_url() -> impl Strategy<Value = String> {
    "/[a-z]{1,8}\\.v[0-9]\\.Msg[A-Z][a-z]{0,8}"
}

proptest! {
    #[test]
    fn prop_grant_key_nests_under_its_prefixes(
        grantee in any_addr(),
        granter in any_addr(),
        url in any_url(),
    ) {
        let key = grant_key(&grantee, &granter, &url);
        prop_assert!(key.starts_with(&pair_prefix(&grantee, &granter)));
        prop_assert!(key.starts_with(&grantee_prefix(&grantee)));
        let (ge, gr, u) = parse_grant_key(&key).unwrap();
        prop_assert_eq!((ge, gr, u), (grantee, granter, url));
    }

    #[test]
    fn prop_self_grant_always_fails(who in any_addr(), url in any_url()) {
        let k = keeper();
        let mut store = MemStore::new();
        let mut ctx = Context::new(&mut store, header(1, T0));
        let res = k.grant(&mut ctx, &who, &who, Box::new(GenericAuthorization::new(url)), None);
        prop_assert!(matches!(res, Err(SdkError::InvalidRequest(_))));
        drop(ctx);
        prop_assert!(store.is_empty());
    }

    #[test]
    fn prop_grant_visibility_follows_expiration(
        granter in any_addr(),
        grantee in any_addr(),
        url in any_url(),
        ttl in 1u64..1_000_000,
        later in 0u64..2_000_000,
    ) {
        prop_assume!(granter != grantee);
        let k = keeper();
        let mut store = MemStore::new();
        let exp = Timestamp::from_millis(T0 + ttl);
        {
            let mut ctx = Context::new(&mut store, header(1, T0));
            k.grant(&mut ctx, &granter, &grantee, Box::new(GenericAuthorization::new(url.clone())), Some(exp)).unwrap();
        }
        let mut ctx = Context::new(&mut store, header(2, T0 + later));
        let found = k.get_or_revoke_authorization(&mut ctx, &grantee, &granter, &url).unwrap();
        prop_assert_eq!(found.is_some(), T0 + later <= exp.as_millis());
        if let Some(g) = found {
            prop_assert_eq!(g.expiration, Some(exp));
            prop_assert_eq!(g.msg_type_url(), url.as_str());
        }
    }
}
