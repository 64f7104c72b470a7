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

//! Authorization grants: an account (granter) lets another account (grantee)
//! execute specific message types on its behalf, optionally until an
//! expiration time.

pub mod authorization;
pub mod genesis;
pub mod grant;
pub mod keeper;
pub mod keys;
pub mod msg_server;
pub mod msgs;
pub mod query;
pub mod store;

pub use authorization::{
    AcceptResponse, Authorization, AuthorizationRegistry, GenericAuthorization,
    MethodAuthorization, NamedAuthorization,
};
pub use grant::Grant;
pub use keeper::Keeper;
pub use msgs::{MsgExec, MsgGrant, MsgRevoke};

/// Event emitted when a grant is created or overwritten.
pub const EVENT_GRANT: &str = "authz.grant";
/// Event emitted when a grant is revoked.
pub const EVENT_REVOKE: &str = "authz.revoke";
/// Event emitted for each delegated message accepted during exec.
pub const EVENT_EXEC: &str = "authz.exec";
