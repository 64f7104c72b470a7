#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Ledgerkit node entrypoint (systemd-friendly).
//! Opens the state, initializes an empty chain on first start and serves queries.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use ledgerkit::core::app::App;
use ledgerkit::core::config::NodeConfig;
use ledgerkit::core::state::persistent_state::PersistentState;
use ledgerkit::core::types::{BlockHeader, Timestamp};
use ledgerkit::monitoring::{logging, metrics::Metrics};
use ledgerkit::server::{router, HttpState};
use ledgerkit::x::authz::genesis::GenesisState;
use tracing::{info, warn};

fn config_path() -> Option<String> {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LEDGERKIT_CONFIG").ok())
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match config_path() {
        Some(path) => NodeConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => NodeConfig::default(),
    };
    logging::init(&cfg.log);

    info!(
        node = %cfg.node.name,
        version = env!("CARGO_PKG_VERSION"),
        git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        data_dir = %cfg.node.data_dir,
        "ledgerkit node starting"
    );

    let metrics = Arc::new(Metrics::new().context("metrics init failed")?);
    let state = PersistentState::open(&cfg.node.data_dir)
        .with_context(|| format!("opening state at {}", cfg.node.data_dir))?;
    let mut app = App::new(state, &cfg.authz, metrics.clone())?;

    match app.last_header()? {
        Some(h) => info!(height = h.height, chain_id = %h.chain_id, "resuming from committed state"),
        None => {
            let header = BlockHeader {
                chain_id: cfg.node.chain_id.clone(),
                height: 0,
                time: Timestamp::from_millis(now_millis()),
            };
            app.init_chain(header, &GenesisState::default())?;
            let root = app.commit()?;
            info!(app_hash = %hex::encode(root), "initialized empty chain");
        }
    }

    let http = router(HttpState {
        queries: app.query_service(),
        metrics,
    });
    let listener = tokio::net::TcpListener::bind(&cfg.http.listen_addr)
        .await
        .with_context(|| format!("binding {}", cfg.http.listen_addr))?;
    info!(addr = %cfg.http.listen_addr, "http listening");

    axum::serve(listener, http)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;
    Ok(())
}
