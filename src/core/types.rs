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

//! Deterministic core types and canonical encoding helpers.

use bincode::Options;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Canonical serialization error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("serialization")]
    Serialize,
    #[error("deserialization")]
    Deserialize,
    #[error("size limit exceeded")]
    TooLarge,
}

/// Canonical bincode options (deterministic).
fn bincode_opts() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode with deterministic rules. Requires deterministic container ordering (use BTreeMap/BTreeSet).
pub fn encode_canonical<T: Serialize>(v: &T) -> Result<Vec<u8>, CodecError> {
    bincode_opts()
        .serialize(v)
        .map_err(|_| CodecError::Serialize)
}

/// Decode with a hard size cap.
pub fn decode_canonical_limited<T: DeserializeOwned>(
    bytes: &[u8],
    max: usize,
) -> Result<T, CodecError> {
    if bytes.len() > max {
        return Err(CodecError::TooLarge);
    }
    // The deserializer limit also bounds container lengths declared inside the payload.
    bincode_opts()
        .with_limit(max as u64)
        .deserialize(bytes)
        .map_err(|_| CodecError::Deserialize)
}

/// Default decode cap for values read back from the store.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 64 * 1024;

/// Raw account id length in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Account address: 20 raw bytes, rendered as base58.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccAddress([u8; ADDRESS_LEN]);

/// Address parse failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty address string is not allowed")]
    Empty,
    #[error("address {0} is not valid base58")]
    Encoding(String),
    #[error("address {addr} has length {len}, expected 20")]
    Length { addr: String, len: usize },
}

impl AccAddress {
    /// Construct from raw bytes.
    pub fn from_bytes(b: [u8; ADDRESS_LEN]) -> Self {
        Self(b)
    }

    /// Return raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Parse the base58 text form.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let raw = bs58::decode(s)
            .into_vec()
            .map_err(|_| AddressError::Encoding(s.to_string()))?;
        Self::try_from_slice(&raw).map_err(|len| AddressError::Length {
            addr: s.to_string(),
            len,
        })
    }

    /// Interpret a byte slice as an address. On a length mismatch returns the actual length.
    pub fn try_from_slice(raw: &[u8]) -> Result<Self, usize> {
        if raw.len() != ADDRESS_LEN {
            return Err(raw.len());
        }
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(raw);
        Ok(Self(out))
    }
}

impl fmt::Display for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccAddress({self})")
    }
}

/// Block logical time in milliseconds since UNIX epoch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Construct from milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds since epoch.
    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Header of the block currently being executed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Chain identifier.
    pub chain_id: String,
    /// Block height.
    pub height: u64,
    /// Block time agreed by consensus.
    pub time: Timestamp,
}

/// Type-tagged envelope for polymorphic values (authorizations, messages).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnyValue {
    /// Registered type URL of the payload.
    pub type_url: String,
    /// Canonical encoding of the payload.
    pub value: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_text_form_parses_back() {
        let a = AccAddress::from_bytes([7u8; ADDRESS_LEN]);
        let parsed = AccAddress::parse(&a.to_string()).unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn address_rejects_wrong_length_and_garbage() {
        let short = bs58::encode([1u8; 4]).into_string();
        assert!(matches!(
            AccAddress::parse(&short),
            Err(AddressError::Length { len: 4, .. })
        ));
        assert!(matches!(
            AccAddress::parse("0OIl"),
            Err(AddressError::Encoding(_))
        ));
        assert_eq!(AccAddress::parse(""), Err(AddressError::Empty));
    }

    #[test]
    fn decode_rejects_oversized_and_trailing_bytes() {
        let env = AnyValue {
            type_url: "/t".into(),
            value: vec![1, 2, 3],
        };
        let mut bytes = encode_canonical(&env).unwrap();
        assert_eq!(
            decode_canonical_limited::<AnyValue>(&bytes, 4),
            Err(CodecError::TooLarge)
        );
        bytes.push(0);
        assert_eq!(
            decode_canonical_limited::<AnyValue>(&bytes, 1024),
            Err(CodecError::Deserialize)
        );
    }
}
