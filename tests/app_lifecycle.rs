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

use common::*;
use ledgerkit::core::app::{App, Tx};
use ledgerkit::core::config::AuthzConfig;
use ledgerkit::core::errors::SdkError;
use ledgerkit::core::router::Msg;
use ledgerkit::core::state::persistent_state::PersistentState;
use ledgerkit::core::state::KvStore;
use ledgerkit::core::types::Timestamp;
use ledgerkit::monitoring::metrics::Metrics;
use ledgerkit::x::authz::genesis::GenesisState;
use ledgerkit::x::authz::query::QueryAuthorizationsRequest;
use ledgerkit::x::authz::{GenericAuthorization, MsgExec, MsgGrant, MsgRevoke, EVENT_GRANT};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

fn open_app(dir: &tempfile::TempDir, cfg: &AuthzConfig) -> App {
    let state = PersistentState::open(dir.path().to_str().unwrap()).unwrap();
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut app = App::new(state, cfg, metrics).unwrap();
    register_test_handlers(app.router_mut());
    app
}

fn genesis_app(dir: &tempfile::TempDir, cfg: &AuthzConfig) -> App {
    let mut app = open_app(dir, cfg);
    app.init_chain(header(0, T0), &GenesisState::default())
        .unwrap();
    app.commit().unwrap();
    app
}

fn grant_tx(granter: u8, grantee: u8, url: &str, exp: Option<u64>) -> Tx {
    Tx::new(vec![Box::new(MsgGrant::new(
        &addr(granter),
        &addr(grantee),
        Box::new(GenericAuthorization::new(url)),
        exp.map(Timestamp::from_millis),
    ))])
}

fn pair_grants(app: &App, granter: u8, grantee: u8) -> usize {
    let req = QueryAuthorizationsRequest {
        granter: addr(granter).to_string(),
        grantee: addr(grantee).to_string(),
        pagination: None,
    };
    app.query_service()
        .query(|k, ctx| k.authorizations(ctx, &req))
        .unwrap()
        .grants
        .len()
}

#[test]
fn committed_grant_is_visible_to_queries_and_exec() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = genesis_app(&dir, &AuthzConfig::default());

    app.begin_block(header(1, T0 + 1_000)).unwrap();
    let resp = app.deliver_tx(&grant_tx(1, 2, MSG_WRITE, None));
    assert!(resp.is_ok(), "{}", resp.log);
    assert!(resp.events.iter().any(|e| e.kind == EVENT_GRANT));
    assert_eq!(pair_grants(&app, 1, 2), 0, "uncommitted writes are not queryable");
    app.commit().unwrap();
    assert_eq!(pair_grants(&app, 1, 2), 1);

    app.begin_block(header(2, T0 + 2_000)).unwrap();
    let exec = MsgExec::new(&addr(2), vec![MsgWrite::boxed(addr(1), "k", "v")]);
    let resp = app.deliver_tx(&Tx::new(vec![Box::new(exec)]));
    assert!(resp.is_ok(), "{}", resp.log);
    let revoke = MsgRevoke::new(&addr(1), &addr(2), MSG_WRITE);
    assert!(app.deliver_tx(&Tx::new(vec![Box::new(revoke)])).is_ok());
    app.commit().unwrap();

    assert_eq!(pair_grants(&app, 1, 2), 0);
    let written = app
        .query_service()
        .query(|_, ctx| Ok(ctx.store().get(&data_key("k"))?))
        .unwrap();
    assert_eq!(written, Some(b"v".to_vec()));
}

#[test]
fn failed_tx_leaves_block_state_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = genesis_app(&dir, &AuthzConfig::default());
    app.begin_block(header(1, T0 + 1_000)).unwrap();

    let msgs: Vec<Box<dyn Msg>> = vec![
        MsgWrite::boxed(addr(1), "a", "1"),
        Box::new(MsgFail { signer: addr(1) }),
    ];
    let resp = app.deliver_tx(&Tx::new(msgs));
    assert!(!resp.is_ok());
    assert_eq!(resp.code, SdkError::InvalidRequest(String::new()).code());
    assert_eq!(resp.codespace, "sdk");
    assert!(resp.events.is_empty());

    let self_grant = app.deliver_tx(&grant_tx(3, 3, MSG_WRITE, None));
    assert!(!self_grant.is_ok());

    let unauthorized = MsgExec::new(&addr(2), vec![MsgWrite::boxed(addr(1), "b", "2")]);
    let resp = app.deliver_tx(&Tx::new(vec![Box::new(unauthorized)]));
    assert_eq!(resp.code, SdkError::Unauthorized(String::new()).code());

    assert!(!app.deliver_tx(&Tx::default()).is_ok());
    app.commit().unwrap();

    let queries = app.query_service();
    let hits = queries
        .query(|_, ctx| {
            Ok((
                ctx.store().get(&data_key("a"))?,
                ctx.store().get(&data_key("b"))?,
            ))
        })
        .unwrap();
    assert_eq!(hits, (None, None));
    assert_eq!(queries.last_header().unwrap().height, 1);
}

#[test]
fn block_heights_must_increase() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = genesis_app(&dir, &AuthzConfig::default());
    assert!(matches!(
        app.begin_block(header(0, T0)),
        Err(SdkError::InvalidRequest(_))
    ));
    app.begin_block(header(1, T0)).unwrap();
    assert!(app.begin_block(header(2, T0)).is_err());
    app.commit().unwrap();
    assert!(app.commit().is_err());
    assert!(app
        .init_chain(header(0, T0), &GenesisState::default())
        .is_err());
}

#[test]
fn blocks_need_genesis_and_genesis_needs_an_idle_app() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = open_app(&dir, &AuthzConfig::default());
    assert!(matches!(
        app.begin_block(header(1, T0)),
        Err(SdkError::InvalidRequest(_))
    ));

    app.init_chain(header(0, T0), &GenesisState::default())
        .unwrap();
    assert!(matches!(
        app.init_chain(header(0, T0), &GenesisState::default()),
        Err(SdkError::InvalidRequest(_))
    ));
    assert!(app.begin_block(header(1, T0)).is_err());
    app.commit().unwrap();
    app.begin_block(header(1, T0)).unwrap();
    app.commit().unwrap();
    assert_eq!(app.last_header().unwrap().unwrap().height, 1);
}

#[test]
fn commit_waits_for_running_queries() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = genesis_app(&dir, &AuthzConfig::default());
    let queries = app.query_service();
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let reader = thread::spawn(move || {
        queries
            .query(|_, ctx| {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                Ok((ctx.header().height, ctx.store().get(&data_key("k"))?))
            })
            .unwrap()
    });
    started_rx.recv().unwrap();

    app.begin_block(header(1, T0 + 1_000)).unwrap();
    let write = Tx::new(vec![MsgWrite::boxed(addr(1), "k", "v")]);
    assert!(app.deliver_tx(&write).is_ok());

    let released = Arc::new(AtomicBool::new(false));
    let releaser = {
        let released = Arc::clone(&released);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            released.store(true, Ordering::SeqCst);
            release_tx.send(()).unwrap();
        })
    };
    app.commit().unwrap();
    assert!(
        released.load(Ordering::SeqCst),
        "commit finished while a query was reading"
    );
    releaser.join().unwrap();

    // The reader saw genesis only, never a half-applied block.
    assert_eq!(reader.join().unwrap(), (0, None));
    assert_eq!(app.query_service().last_header().unwrap().height, 1);
}

#[test]
fn identical_blocks_give_identical_app_hashes() {
    let run = || {
        let dir = tempfile::tempdir().unwrap();
        let mut app = genesis_app(&dir, &AuthzConfig::default());
        app.begin_block(header(1, T0 + 1_000)).unwrap();
        assert!(app.deliver_tx(&grant_tx(1, 2, MSG_WRITE, None)).is_ok());
        assert!(app
            .deliver_tx(&grant_tx(1, 3, MSG_FAIL, Some(T0 + HOUR_MS)))
            .is_ok());
        app.commit().unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn end_block_sweeps_expired_grants_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AuthzConfig {
        prune_expired_on_end_block: true,
        ..AuthzConfig::default()
    };
    let mut app = genesis_app(&dir, &cfg);
    app.begin_block(header(1, T0 + 1_000)).unwrap();
    assert!(app
        .deliver_tx(&grant_tx(1, 2, MSG_WRITE, Some(T0 + HOUR_MS)))
        .is_ok());
    assert!(app.deliver_tx(&grant_tx(1, 2, MSG_FAIL, None)).is_ok());
    assert_eq!(app.end_block().unwrap(), 0);
    app.commit().unwrap();

    app.begin_block(header(2, T0 + 2 * HOUR_MS)).unwrap();
    assert_eq!(app.end_block().unwrap(), 1);
    app.commit().unwrap();

    let genesis = app.export_genesis().unwrap();
    assert_eq!(genesis.authorization.len(), 1);
    assert_eq!(genesis.authorization[0].expiration, None);
}

#[test]
fn exported_genesis_loads_into_a_fresh_chain() {
    let src_dir = tempfile::tempdir().unwrap();
    let mut src = genesis_app(&src_dir, &AuthzConfig::default());
    src.begin_block(header(1, T0 + 1_000)).unwrap();
    assert!(src.deliver_tx(&grant_tx(1, 2, MSG_WRITE, None)).is_ok());
    assert!(src
        .deliver_tx(&grant_tx(4, 2, MSG_WRITE, Some(T0 + HOUR_MS)))
        .is_ok());
    src.commit().unwrap();
    let exported = src.export_genesis().unwrap();
    assert_eq!(exported.authorization.len(), 2);

    // One grant is already expired at the new chain's genesis time.
    let dst_dir = tempfile::tempdir().unwrap();
    let mut dst = open_app(&dst_dir, &AuthzConfig::default());
    dst.init_chain(header(0, T0 + 2 * HOUR_MS), &exported)
        .unwrap();
    dst.commit().unwrap();
    assert_eq!(pair_grants(&dst, 1, 2), 1);
    assert_eq!(pair_grants(&dst, 4, 2), 0);
    assert_eq!(dst.export_genesis().unwrap().authorization.len(), 1);
}

#[test]
fn committed_header_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut app = genesis_app(&dir, &AuthzConfig::default());
        app.begin_block(header(1, T0 + 1_000)).unwrap();
        assert!(app.deliver_tx(&grant_tx(1, 2, MSG_WRITE, None)).is_ok());
        app.commit().unwrap();
    }
    let app = open_app(&dir, &AuthzConfig::default());
    let last = app.last_header().unwrap().unwrap();
    assert_eq!(last.height, 1);
    assert_eq!(last.time, Timestamp::from_millis(T0 + 1_000));
    assert_eq!(pair_grants(&app, 1, 2), 1);
}
