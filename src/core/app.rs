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

//! Application assembly and the block lifecycle driven by the consensus engine.
//!
//! Writes of the block in progress are buffered in a pending write set layered
//! over the committed state. Each transaction runs in its own branch of that
//! set, so a failed transaction leaves no trace. `commit` persists the pending
//! set in one sled transaction and returns the app hash.

use crate::core::config::AuthzConfig;
use crate::core::context::{Context, Event};
use crate::core::errors::{SdkError, SdkResult};
use crate::core::router::{Msg, MsgRouter};
use crate::core::state::merkle::Hash32;
use crate::core::state::persistent_state::{KvOp, PersistentState};
use crate::core::state::{CacheKv, KvStore, WriteSet};
use crate::core::types::{
    decode_canonical_limited, encode_canonical, BlockHeader, DEFAULT_MAX_VALUE_BYTES,
};
use crate::monitoring::metrics::Metrics;
use crate::x::authz::genesis::GenesisState;
use crate::x::authz::{
    msg_server, AuthorizationRegistry, Keeper, EVENT_EXEC, EVENT_GRANT, EVENT_REVOKE,
};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use tracing::{info, warn};

/// Store key of the last committed header. Outside every module namespace.
const LAST_HEADER_KEY: &[u8] = b"\x00app/last_header";

/// A signed-and-verified transaction: one or more messages executed atomically.
#[derive(Debug, Default)]
pub struct Tx {
    /// Messages, executed in order.
    pub msgs: Vec<Box<dyn Msg>>,
}

impl Tx {
    /// Transaction of `msgs`.
    pub fn new(msgs: Vec<Box<dyn Msg>>) -> Self {
        Self { msgs }
    }
}

/// Result of `deliver_tx`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxResponse {
    /// `0` on success, otherwise [`SdkError::code`].
    pub code: u32,
    /// Codespace of `code`; empty on success.
    pub codespace: String,
    /// Error description; empty on success.
    pub log: String,
    /// Per-message response data.
    pub data: Vec<Vec<u8>>,
    /// Events of a successful transaction.
    pub events: Vec<Event>,
}

impl TxResponse {
    fn from_error(e: &SdkError) -> Self {
        Self {
            code: e.code(),
            codespace: e.codespace().to_string(),
            log: e.to_string(),
            ..Self::default()
        }
    }

    /// Whether the transaction committed to the block state.
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

fn read_last_header<S: KvStore + ?Sized>(store: &S) -> SdkResult<Option<BlockHeader>> {
    match store.get(LAST_HEADER_KEY)? {
        None => Ok(None),
        Some(raw) => Ok(Some(decode_canonical_limited(&raw, DEFAULT_MAX_VALUE_BYTES)?)),
    }
}

/// The application.
pub struct App {
    state: PersistentState,
    router: MsgRouter,
    authz: Keeper,
    metrics: Arc<Metrics>,
    prune_on_end_block: bool,
    pending: WriteSet,
    header: Option<BlockHeader>,
    commit_guard: Arc<RwLock<()>>,
}

impl App {
    /// Assemble the application over `state` with the authz module registered.
    pub fn new(state: PersistentState, cfg: &AuthzConfig, metrics: Arc<Metrics>) -> SdkResult<Self> {
        let registry =
            AuthorizationRegistry::with_builtin().with_max_value_bytes(cfg.max_value_bytes);
        let authz = Keeper::new(Arc::new(registry));
        let mut router = MsgRouter::new();
        msg_server::register_handlers(&mut router, authz.clone())?;
        Ok(Self {
            state,
            router,
            authz,
            metrics,
            prune_on_end_block: cfg.prune_expired_on_end_block,
            pending: WriteSet::new(),
            header: None,
            commit_guard: Arc::new(RwLock::new(())),
        })
    }

    /// Router, for registering further modules during assembly.
    pub fn router_mut(&mut self) -> &mut MsgRouter {
        &mut self.router
    }

    /// Read-only query handle over committed state.
    pub fn query_service(&self) -> QueryService {
        QueryService {
            state: self.state.clone(),
            keeper: self.authz.clone(),
            commit_guard: Arc::clone(&self.commit_guard),
        }
    }

    /// Header of the last committed block.
    pub fn last_header(&self) -> SdkResult<Option<BlockHeader>> {
        read_last_header(&self.state)
    }

    /// Authz genesis of the committed state.
    pub fn export_genesis(&self) -> SdkResult<GenesisState> {
        self.query_service().query(|k, ctx| k.export_genesis(ctx))
    }

    /// Load genesis within `header` (conventionally height 0). Follow with [`App::commit`].
    pub fn init_chain(&mut self, header: BlockHeader, genesis: &GenesisState) -> SdkResult<()> {
        if self.header.is_some() {
            return Err(SdkError::InvalidRequest("a block is in progress".into()));
        }
        if self.last_header()?.is_some() {
            return Err(SdkError::InvalidRequest("chain already initialized".into()));
        }
        self.header = Some(header);
        let authz = &self.authz;
        let res = with_block_ctx(&mut self.state, &mut self.pending, self.header.as_ref(), |ctx| {
            ctx.branch(|c| authz.init_genesis(c, genesis))
        });
        if res.is_err() {
            self.header = None;
        }
        res
    }

    /// Start executing a block.
    pub fn begin_block(&mut self, header: BlockHeader) -> SdkResult<()> {
        if self.header.is_some() {
            return Err(SdkError::InvalidRequest("previous block not committed".into()));
        }
        let last = self
            .last_header()?
            .ok_or_else(|| SdkError::InvalidRequest("chain not initialized".into()))?;
        if header.height <= last.height {
            return Err(SdkError::InvalidRequest(format!(
                "block height {} does not follow {}",
                header.height, last.height
            )));
        }
        self.header = Some(header);
        Ok(())
    }

    /// Execute a transaction. All of its messages commit to the block state or none do.
    pub fn deliver_tx(&mut self, tx: &Tx) -> TxResponse {
        self.metrics.transactions_total.inc();
        match self.run_tx(tx) {
            Ok((data, events)) => {
                for ev in &events {
                    match ev.kind.as_str() {
                        EVENT_GRANT => self.metrics.authz_grants_total.inc(),
                        EVENT_REVOKE => self.metrics.authz_revokes_total.inc(),
                        EVENT_EXEC => self.metrics.authz_exec_msgs_total.inc(),
                        _ => {}
                    }
                }
                TxResponse {
                    data,
                    events,
                    ..TxResponse::default()
                }
            }
            Err(e) => {
                self.metrics.transactions_failed_total.inc();
                warn!(error = %e, code = e.code(), "transaction failed");
                TxResponse::from_error(&e)
            }
        }
    }

    fn run_tx(&mut self, tx: &Tx) -> SdkResult<(Vec<Vec<u8>>, Vec<Event>)> {
        if tx.msgs.is_empty() {
            return Err(SdkError::InvalidRequest(
                "tx must contain at least one message".into(),
            ));
        }
        for m in &tx.msgs {
            m.validate_basic()?;
        }
        let router = &self.router;
        with_block_ctx(&mut self.state, &mut self.pending, self.header.as_ref(), |ctx| {
            let data = ctx.branch(|c| {
                let mut data = Vec::with_capacity(tx.msgs.len());
                for m in &tx.msgs {
                    data.push(router.dispatch(c, m.as_ref())?.data);
                }
                Ok(data)
            })?;
            Ok((data, ctx.take_events()))
        })
    }

    /// Finish the block. Sweeps expired grants when configured; returns how many were removed.
    pub fn end_block(&mut self) -> SdkResult<u64> {
        if !self.prune_on_end_block {
            return Ok(0);
        }
        let authz = &self.authz;
        let n = with_block_ctx(&mut self.state, &mut self.pending, self.header.as_ref(), |ctx| {
            ctx.branch(|c| authz.prune_expired(c))
        })?;
        self.metrics.authz_pruned_total.inc_by(n);
        Ok(n)
    }

    /// Persist the block and return the app hash.
    pub fn commit(&mut self) -> SdkResult<Hash32> {
        let header = self
            .header
            .take()
            .ok_or_else(|| SdkError::InvalidRequest("no block in progress".into()))?;
        let mut writes = std::mem::take(&mut self.pending);
        writes.insert(LAST_HEADER_KEY.to_vec(), Some(encode_canonical(&header)?));
        let root = {
            let _exclusive = self
                .commit_guard
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            self.state.commit_atomic(&KvOp::from_writes(writes))?;
            self.state.state_root()?
        };
        self.metrics
            .block_height
            .set(i64::try_from(header.height).unwrap_or(i64::MAX));
        info!(height = header.height, app_hash = %hex::encode(root), "block committed");
        Ok(root)
    }
}

/// Run `f` against the pending block state layered over `state`. The pending
/// set is restored whether or not `f` succeeds; callers decide what is kept by
/// branching inside `f`.
fn with_block_ctx<T, F>(
    state: &mut PersistentState,
    pending: &mut WriteSet,
    header: Option<&BlockHeader>,
    f: F,
) -> SdkResult<T>
where
    F: FnOnce(&mut Context<'_>) -> SdkResult<T>,
{
    let header = header
        .cloned()
        .ok_or_else(|| SdkError::InvalidRequest("no block in progress".into()))?;
    let mut block = CacheKv::with_writes(state, std::mem::take(pending));
    let out = {
        let mut ctx = Context::new(&mut block, header);
        f(&mut ctx)
    };
    *pending = block.into_writes();
    out
}

/// Cloneable read-only handle for queries against committed state.
///
/// A query sees one committed block: commits wait for running queries and
/// queries wait for a running commit.
#[derive(Clone)]
pub struct QueryService {
    state: PersistentState,
    keeper: Keeper,
    commit_guard: Arc<RwLock<()>>,
}

impl QueryService {
    /// Header of the last committed block, or the zero header before genesis.
    pub fn last_header(&self) -> SdkResult<BlockHeader> {
        let _shared = self.shared();
        self.committed_header()
    }

    fn committed_header(&self) -> SdkResult<BlockHeader> {
        Ok(read_last_header(&self.state)?.unwrap_or_default())
    }

    fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.commit_guard
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` in a throw-away branch at the last committed block time.
    /// Writes made by `f` (e.g. lazy pruning) are discarded.
    pub fn query<T, F>(&self, f: F) -> SdkResult<T>
    where
        F: FnOnce(&Keeper, &mut Context<'_>) -> SdkResult<T>,
    {
        let _shared = self.shared();
        let header = self.committed_header()?;
        let mut base = self.state.clone();
        let mut scratch = CacheKv::new(&mut base);
        let mut ctx = Context::new(&mut scratch, header);
        f(&self.keeper, &mut ctx)
    }
}
