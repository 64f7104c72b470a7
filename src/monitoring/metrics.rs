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

use prometheus::{core::Collector, Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus")]
    Prom,
    #[error("text encoding")]
    Encode,
}

/// Metrics container.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Last committed block height.
    pub block_height: IntGauge,
    /// Transactions delivered.
    pub transactions_total: IntCounter,
    /// Transactions that failed and were rolled back.
    pub transactions_failed_total: IntCounter,

    /// Grants created or overwritten.
    pub authz_grants_total: IntCounter,
    /// Grants revoked.
    pub authz_revokes_total: IntCounter,
    /// Delegated messages accepted through exec.
    pub authz_exec_msgs_total: IntCounter,
    /// Expired grants removed by the end-of-block sweep.
    pub authz_pruned_total: IntCounter,
}

fn registered<C: Collector + Clone + 'static>(registry: &Registry, c: C) -> Result<C, MetricsError> {
    registry
        .register(Box::new(c.clone()))
        .map_err(|_| MetricsError::Prom)?;
    Ok(c)
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, MetricsError> {
    let c = IntCounter::new(name, help).map_err(|_| MetricsError::Prom)?;
    registered(registry, c)
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let block_height = IntGauge::new("ledgerkit_block_height", "Last committed block height")
            .map_err(|_| MetricsError::Prom)?;
        let block_height = registered(&registry, block_height)?;

        Ok(Self {
            block_height,
            transactions_total: counter(
                &registry,
                "ledgerkit_transactions_total",
                "Transactions delivered",
            )?,
            transactions_failed_total: counter(
                &registry,
                "ledgerkit_transactions_failed_total",
                "Transactions rolled back",
            )?,
            authz_grants_total: counter(
                &registry,
                "ledgerkit_authz_grants_total",
                "Grants created or overwritten",
            )?,
            authz_revokes_total: counter(
                &registry,
                "ledgerkit_authz_revokes_total",
                "Grants revoked",
            )?,
            authz_exec_msgs_total: counter(
                &registry,
                "ledgerkit_authz_exec_msgs_total",
                "Delegated messages accepted",
            )?,
            authz_pruned_total: counter(
                &registry,
                "ledgerkit_authz_pruned_total",
                "Expired grants swept at end of block",
            )?,
            registry,
        })
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|_| MetricsError::Encode)?;
        String::from_utf8(buf).map_err(|_| MetricsError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_counters() {
        let m = Metrics::new().unwrap();
        m.authz_grants_total.inc();
        let text = m.render().unwrap();
        assert!(text.contains("ledgerkit_authz_grants_total 1"));
        assert!(text.contains("ledgerkit_block_height 0"));
    }
}
