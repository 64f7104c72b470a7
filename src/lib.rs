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

//! Ledgerkit - a deterministic application framework with delegated authorization.
//!
//! This repository provides:
//! - Deterministic types & canonical encoding
//! - Transactional key-value state (sled) with deterministic Merkle app hashes
//! - A message router with atomic multi-message transactions
//! - The `authz` module: grants, revocation, delegated execution, lazy expiry
//! - A read-only HTTP query surface with Prometheus metrics and structured logging

/// Core primitives (types, state, context, routing, application lifecycle).
pub mod core;
/// Observability (metrics, structured logging helpers).
pub mod monitoring;
/// HTTP query surface.
pub mod server;
/// Application modules.
pub mod x;
