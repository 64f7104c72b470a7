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

//! SDK-wide error taxonomy surfaced to transaction and query callers.

use crate::core::state::StoreError;
use crate::core::types::{AddressError, CodecError};
use thiserror::Error;

/// Codespace reported next to [`SdkError::code`].
pub const CODESPACE: &str = "sdk";

/// Errors returned by handlers, keepers and queries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SdkError {
    /// Malformed request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Malformed address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Requested record is absent.
    #[error("not found: {0}")]
    NotFound(String),
    /// No valid authorization for the requested action.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Polymorphic value could not be packed or unpacked.
    #[error("can't pack authorization: {0}")]
    PackAny(String),
    /// No handler registered for a message type.
    #[error("unknown request: {0}")]
    UnknownRequest(String),
    /// Handler received a message of a different type.
    #[error("invalid type: {0}")]
    InvalidType(String),
    /// Canonical codec failure.
    #[error("codec: {0}")]
    Codec(#[from] CodecError),
    /// Storage failure.
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

impl SdkError {
    /// Stable numeric code. `0` is reserved for success.
    pub fn code(&self) -> u32 {
        match self {
            SdkError::Unauthorized(_) => 4,
            SdkError::UnknownRequest(_) => 6,
            SdkError::InvalidAddress(_) => 7,
            SdkError::InvalidRequest(_) => 18,
            SdkError::InvalidType(_) => 29,
            SdkError::PackAny(_) => 33,
            SdkError::NotFound(_) => 38,
            SdkError::Codec(_) => 34,
            SdkError::Store(_) => 1,
        }
    }

    /// Codespace of the code.
    pub fn codespace(&self) -> &'static str {
        CODESPACE
    }
}

impl From<AddressError> for SdkError {
    fn from(e: AddressError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}

/// SDK result alias.
pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_and_nonzero() {
        let all = [
            SdkError::InvalidRequest(String::new()),
            SdkError::InvalidAddress(String::new()),
            SdkError::NotFound(String::new()),
            SdkError::Unauthorized(String::new()),
            SdkError::PackAny(String::new()),
            SdkError::UnknownRequest(String::new()),
            SdkError::InvalidType(String::new()),
            SdkError::Codec(CodecError::Deserialize),
            SdkError::Store(StoreError::DbIo),
        ];
        let mut codes: Vec<u32> = all.iter().map(SdkError::code).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
