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

//! Authz transaction messages.

use crate::core::errors::{SdkError, SdkResult};
use crate::core::router::Msg;
use crate::core::types::{AccAddress, Timestamp};
use crate::x::authz::authorization::Authorization;
use std::any::Any;

/// Type URL of [`MsgGrant`].
pub const MSG_GRANT_TYPE_URL: &str = "/ledgerkit.authz.v1.MsgGrant";
/// Type URL of [`MsgRevoke`].
pub const MSG_REVOKE_TYPE_URL: &str = "/ledgerkit.authz.v1.MsgRevoke";
/// Type URL of [`MsgExec`].
pub const MSG_EXEC_TYPE_URL: &str = "/ledgerkit.authz.v1.MsgExec";

fn parse_addr(s: &str, role: &str) -> SdkResult<AccAddress> {
    AccAddress::parse(s).map_err(|e| SdkError::InvalidAddress(format!("invalid {role} address: {e}")))
}

fn parse_pair(granter: &str, grantee: &str) -> SdkResult<(AccAddress, AccAddress)> {
    let granter = parse_addr(granter, "granter")?;
    let grantee = parse_addr(grantee, "grantee")?;
    if granter == grantee {
        return Err(SdkError::InvalidRequest(
            "granter and grantee cannot be same".into(),
        ));
    }
    Ok((granter, grantee))
}

/// Grant `authorization` from `granter` to `grantee`.
#[derive(Clone, Debug)]
pub struct MsgGrant {
    /// Granter address.
    pub granter: String,
    /// Grantee address.
    pub grantee: String,
    /// Capability to grant.
    pub authorization: Box<dyn Authorization>,
    /// Optional expiration.
    pub expiration: Option<Timestamp>,
}

impl MsgGrant {
    /// Build from typed addresses.
    pub fn new(
        granter: &AccAddress,
        grantee: &AccAddress,
        authorization: Box<dyn Authorization>,
        expiration: Option<Timestamp>,
    ) -> Self {
        Self {
            granter: granter.to_string(),
            grantee: grantee.to_string(),
            authorization,
            expiration,
        }
    }

    /// Parsed (granter, grantee).
    pub fn parties(&self) -> SdkResult<(AccAddress, AccAddress)> {
        parse_pair(&self.granter, &self.grantee)
    }
}

impl Msg for MsgGrant {
    fn type_url(&self) -> &str {
        MSG_GRANT_TYPE_URL
    }

    fn signers(&self) -> Vec<AccAddress> {
        AccAddress::parse(&self.granter).into_iter().collect()
    }

    fn validate_basic(&self) -> SdkResult<()> {
        self.parties()?;
        self.authorization.validate_basic()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Revoke the grant governing `msg_type_url`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MsgRevoke {
    /// Granter address.
    pub granter: String,
    /// Grantee address.
    pub grantee: String,
    /// Governed message type URL.
    pub msg_type_url: String,
}

impl MsgRevoke {
    /// Build from typed addresses.
    pub fn new(granter: &AccAddress, grantee: &AccAddress, msg_type_url: impl Into<String>) -> Self {
        Self {
            granter: granter.to_string(),
            grantee: grantee.to_string(),
            msg_type_url: msg_type_url.into(),
        }
    }

    /// Parsed (granter, grantee).
    pub fn parties(&self) -> SdkResult<(AccAddress, AccAddress)> {
        parse_pair(&self.granter, &self.grantee)
    }
}

impl Msg for MsgRevoke {
    fn type_url(&self) -> &str {
        MSG_REVOKE_TYPE_URL
    }

    fn signers(&self) -> Vec<AccAddress> {
        AccAddress::parse(&self.granter).into_iter().collect()
    }

    fn validate_basic(&self) -> SdkResult<()> {
        self.parties()?;
        if self.msg_type_url.is_empty() {
            return Err(SdkError::InvalidRequest("missing method name".into()));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Execute `msgs` as `grantee` on behalf of each message's signer.
#[derive(Debug)]
pub struct MsgExec {
    /// Grantee address.
    pub grantee: String,
    /// Delegated messages.
    pub msgs: Vec<Box<dyn Msg>>,
}

impl MsgExec {
    /// Build from a typed grantee.
    pub fn new(grantee: &AccAddress, msgs: Vec<Box<dyn Msg>>) -> Self {
        Self {
            grantee: grantee.to_string(),
            msgs,
        }
    }
}

impl Msg for MsgExec {
    fn type_url(&self) -> &str {
        MSG_EXEC_TYPE_URL
    }

    fn signers(&self) -> Vec<AccAddress> {
        AccAddress::parse(&self.grantee).into_iter().collect()
    }

    fn validate_basic(&self) -> SdkResult<()> {
        parse_addr(&self.grantee, "grantee")?;
        if self.msgs.is_empty() {
            return Err(SdkError::InvalidRequest("messages cannot be empty".into()));
        }
        for m in &self.msgs {
            m.validate_basic()?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
