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

//! Grant records and their stored form.

use crate::core::errors::SdkResult;
use crate::core::types::{
    decode_canonical_limited, encode_canonical, AccAddress, AnyValue, Timestamp,
};
use crate::x::authz::authorization::{
    pack, same_authorization, Authorization, AuthorizationRegistry,
};
use serde::{Deserialize, Serialize};

/// Authorization granted by `granter` to `grantee`.
#[derive(Clone, Debug)]
pub struct Grant {
    /// Delegating account.
    pub granter: AccAddress,
    /// Receiving account.
    pub grantee: AccAddress,
    /// Capability held by the grantee.
    pub authorization: Box<dyn Authorization>,
    /// After this block time the grant is treated as absent.
    pub expiration: Option<Timestamp>,
}

impl PartialEq for Grant {
    fn eq(&self, other: &Self) -> bool {
        self.granter == other.granter
            && self.grantee == other.grantee
            && self.expiration == other.expiration
            && same_authorization(self.authorization.as_ref(), other.authorization.as_ref())
    }
}

impl Grant {
    /// Message type URL this grant governs.
    pub fn msg_type_url(&self) -> &str {
        self.authorization.msg_type_url()
    }

    /// Expired means strictly past the expiration.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self.expiration, Some(exp) if now > exp)
    }
}

/// Value stored under a grant key. Addresses and type URL live in the key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredGrant {
    pub authorization: AnyValue,
    pub expiration: Option<Timestamp>,
}

impl StoredGrant {
    pub(crate) fn from_parts(
        authorization: &dyn Authorization,
        expiration: Option<Timestamp>,
    ) -> SdkResult<Self> {
        Ok(Self {
            authorization: pack(authorization)?,
            expiration,
        })
    }

    pub(crate) fn encode(&self) -> SdkResult<Vec<u8>> {
        Ok(encode_canonical(self)?)
    }

    pub(crate) fn decode(bytes: &[u8], registry: &AuthorizationRegistry) -> SdkResult<Self> {
        Ok(decode_canonical_limited(bytes, registry.max_value_bytes())?)
    }

    pub(crate) fn into_grant(
        self,
        granter: AccAddress,
        grantee: AccAddress,
        registry: &AuthorizationRegistry,
    ) -> SdkResult<Grant> {
        Ok(Grant {
            granter,
            grantee,
            authorization: registry.unpack(&self.authorization)?,
            expiration: self.expiration,
        })
    }
}
