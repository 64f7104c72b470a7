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

//! Node configuration (TOML).
//!
//! ```text
//! [node]
//! name = "node1"
//! data_dir = "/srv/ledgerkit/node1/data"
//! chain_id = "ledgerkit-1"
//!
//! [http]
//! listen_addr = "127.0.0.1:9090"
//!
//! [authz]
//! prune_expired_on_end_block = false
//! max_value_bytes = 65536
//!
//! [log]
//! level = "info"
//! json = false
//! ```
//!
//! Every section and field is optional.

use crate::core::types::DEFAULT_MAX_VALUE_BYTES;
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

/// Config errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("parse config: {0}")]
    Parse(String),
}

/// Node configuration root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node settings.
    pub node: NodeSettings,
    /// HTTP query endpoint.
    pub http: HttpConfig,
    /// Authz module settings.
    pub authz: AuthzConfig,
    /// Logging.
    pub log: LogConfig,
}

impl NodeConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }
}

/// Node settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    /// Human-readable name.
    pub name: String,
    /// Data directory (sled db).
    pub data_dir: String,
    /// Chain identifier stamped on block headers.
    pub chain_id: String,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            name: "ledgerkit".to_string(),
            data_dir: "./data".to_string(),
            chain_id: "ledgerkit-local".to_string(),
        }
    }
}

/// HTTP config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Listen address, e.g. 0.0.0.0:9090.
    pub listen_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Authz module settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Sweep expired grants at the end of every block.
    pub prune_expired_on_end_block: bool,
    /// Decode cap for stored grant values.
    pub max_value_bytes: usize,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            prune_expired_on_end_block: false,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

/// Logging config. `RUST_LOG` takes precedence over `level`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
