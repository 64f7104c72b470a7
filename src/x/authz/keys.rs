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

//! Grant key layout.
//!
//! ```text
//! 0x01 || len(grantee) || grantee || len(granter) || granter || msg_type_url
//! ```
//!
//! Grantee comes first so all grants of one grantee form a contiguous range,
//! and (grantee, granter) is a fixed-length prefix of every key of that pair.

use crate::core::types::AccAddress;
use thiserror::Error;

/// Namespace byte of grant records.
pub const GRANT_KEY_PREFIX: u8 = 0x01;

/// Malformed grant key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("wrong namespace")]
    Namespace,
    #[error("truncated key")]
    Truncated,
    #[error("bad address segment")]
    Address,
    #[error("message type url is not utf-8")]
    TypeUrl,
}

fn push_addr(out: &mut Vec<u8>, addr: &AccAddress) {
    let b = addr.as_bytes();
    // Address length always fits in one byte.
    out.push(b.len() as u8);
    out.extend_from_slice(b);
}

/// Prefix of all grants held by `grantee`.
pub fn grantee_prefix(grantee: &AccAddress) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + grantee.as_bytes().len());
    out.push(GRANT_KEY_PREFIX);
    push_addr(&mut out, grantee);
    out
}

/// Prefix of all grants from `granter` to `grantee`.
pub fn pair_prefix(grantee: &AccAddress, granter: &AccAddress) -> Vec<u8> {
    let mut out = grantee_prefix(grantee);
    push_addr(&mut out, granter);
    out
}

/// Full key of one grant.
pub fn grant_key(grantee: &AccAddress, granter: &AccAddress, msg_type_url: &str) -> Vec<u8> {
    let mut out = pair_prefix(grantee, granter);
    out.extend_from_slice(msg_type_url.as_bytes());
    out
}

fn take_addr(rest: &[u8]) -> Result<(AccAddress, &[u8]), KeyError> {
    let (&len, rest) = rest.split_first().ok_or(KeyError::Truncated)?;
    let len = len as usize;
    if rest.len() < len {
        return Err(KeyError::Truncated);
    }
    let (raw, rest) = rest.split_at(len);
    let addr = AccAddress::try_from_slice(raw).map_err(|_| KeyError::Address)?;
    Ok((addr, rest))
}

/// Split a full grant key into `(grantee, granter, msg_type_url)`.
pub fn parse_grant_key(key: &[u8]) -> Result<(AccAddress, AccAddress, String), KeyError> {
    let (&ns, rest) = key.split_first().ok_or(KeyError::Truncated)?;
    if ns != GRANT_KEY_PREFIX {
        return Err(KeyError::Namespace);
    }
    let (grantee, rest) = take_addr(rest)?;
    let (granter, rest) = take_addr(rest)?;
    let url = std::str::from_utf8(rest).map_err(|_| KeyError::TypeUrl)?;
    Ok((grantee, granter, url.to_string()))
}
