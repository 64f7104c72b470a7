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
#![deny(missing_docs)]

//! Authorization capabilities and the explicit registry used to decode them.
//!
//! An [`Authorization`] governs exactly one message type URL. When a grantee
//! executes a message on a granter's behalf the stored authorization decides,
//! through [`Authorization::accept`], whether the message may run, whether the
//! grant is spent, and what state the grant should carry afterwards.

use crate::core::context::Context;
use crate::core::errors::{SdkError, SdkResult};
use crate::core::router::Msg;
use crate::core::types::{
    decode_canonical_limited, encode_canonical, AnyValue, CodecError, DEFAULT_MAX_VALUE_BYTES,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of [`Authorization::accept`].
#[derive(Debug, Default)]
pub struct AcceptResponse {
    /// The message may be executed.
    pub accept: bool,
    /// The grant is spent and must be removed.
    pub delete: bool,
    /// Replacement state for the grant's authorization.
    pub updated: Option<Box<dyn Authorization>>,
}

impl AcceptResponse {
    /// Accept without changing the grant.
    pub fn accepted() -> Self {
        Self {
            accept: true,
            ..Self::default()
        }
    }

    /// Reject.
    pub fn rejected() -> Self {
        Self::default()
    }
}

/// Capability describing what a grantee may execute for a granter.
pub trait Authorization: fmt::Debug + Send + Sync + 'static {
    /// Registered type URL of this authorization kind.
    fn type_url(&self) -> &'static str;

    /// Type URL of the message kind this authorization governs.
    fn msg_type_url(&self) -> &str;

    /// Decide whether `msg` may execute under this authorization.
    fn accept(&self, ctx: &Context<'_>, msg: &dyn Msg) -> SdkResult<AcceptResponse>;

    /// Stateless checks run at grant creation.
    fn validate_basic(&self) -> SdkResult<()>;

    /// Canonical encoding of this value (without the type tag).
    fn encode_value(&self) -> Result<Vec<u8>, CodecError>;

    /// Clone into a new box.
    fn clone_box(&self) -> Box<dyn Authorization>;

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;
}

/// Compile-time type URL of a concrete authorization, used for registration.
pub trait NamedAuthorization: Authorization + DeserializeOwned {
    /// Registered type URL.
    const TYPE_URL: &'static str;
}

impl Clone for Box<dyn Authorization> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Same kind and same canonical encoding.
pub fn same_authorization(a: &dyn Authorization, b: &dyn Authorization) -> bool {
    if a.type_url() != b.type_url() {
        return false;
    }
    match (a.encode_value(), b.encode_value()) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

/// Wrap an authorization into its type-tagged envelope.
pub fn pack(a: &dyn Authorization) -> SdkResult<AnyValue> {
    let value = a
        .encode_value()
        .map_err(|e| SdkError::PackAny(format!("can't encode {}: {e}", a.type_url())))?;
    Ok(AnyValue {
        type_url: a.type_url().to_string(),
        value,
    })
}

/// Authorization that accepts any message of one type URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericAuthorization {
    /// Governed message type URL.
    pub msg: String,
}

impl GenericAuthorization {
    /// Authorization for `msg_type_url`.
    pub fn new(msg_type_url: impl Into<String>) -> Self {
        Self {
            msg: msg_type_url.into(),
        }
    }
}

impl NamedAuthorization for GenericAuthorization {
    const TYPE_URL: &'static str = "/ledgerkit.authz.v1.GenericAuthorization";
}

impl Authorization for GenericAuthorization {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn msg_type_url(&self) -> &str {
        &self.msg
    }

    fn accept(&self, _ctx: &Context<'_>, _msg: &dyn Msg) -> SdkResult<AcceptResponse> {
        Ok(AcceptResponse::accepted())
    }

    fn validate_basic(&self) -> SdkResult<()> {
        if self.msg.is_empty() {
            return Err(SdkError::InvalidRequest("missing msg type url".into()));
        }
        Ok(())
    }

    fn encode_value(&self) -> Result<Vec<u8>, CodecError> {
        encode_canonical(self)
    }

    fn clone_box(&self) -> Box<dyn Authorization> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Authorization scoped to one method, optionally limited to a number of uses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodAuthorization {
    /// Governed message type URL.
    pub method_name: String,
    /// Uses left; `None` means unlimited.
    pub remaining_uses: Option<u64>,
}

impl MethodAuthorization {
    /// Unlimited authorization for `method_name`.
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            remaining_uses: None,
        }
    }

    /// Authorization for `method_name` valid for `uses` executions.
    pub fn with_uses(method_name: impl Into<String>, uses: u64) -> Self {
        Self {
            method_name: method_name.into(),
            remaining_uses: Some(uses),
        }
    }
}

impl NamedAuthorization for MethodAuthorization {
    const TYPE_URL: &'static str = "/ledgerkit.authz.v1.MethodAuthorization";
}

impl Authorization for MethodAuthorization {
    fn type_url(&self) -> &'static str {
        Self::TYPE_URL
    }

    fn msg_type_url(&self) -> &str {
        &self.method_name
    }

    fn accept(&self, _ctx: &Context<'_>, msg: &dyn Msg) -> SdkResult<AcceptResponse> {
        if msg.type_url() != self.method_name {
            return Ok(AcceptResponse::rejected());
        }
        match self.remaining_uses {
            None => Ok(AcceptResponse::accepted()),
            Some(0) => Ok(AcceptResponse::rejected()),
            Some(1) => Ok(AcceptResponse {
                accept: true,
                delete: true,
                updated: None,
            }),
            Some(n) => Ok(AcceptResponse {
                accept: true,
                delete: false,
                updated: Some(Box::new(Self {
                    method_name: self.method_name.clone(),
                    remaining_uses: Some(n - 1),
                })),
            }),
        }
    }

    fn validate_basic(&self) -> SdkResult<()> {
        if self.method_name.is_empty() {
            return Err(SdkError::InvalidRequest("missing method name".into()));
        }
        if self.remaining_uses == Some(0) {
            return Err(SdkError::InvalidRequest(format!(
                "authorization for {} has no remaining uses",
                self.method_name
            )));
        }
        Ok(())
    }

    fn encode_value(&self) -> Result<Vec<u8>, CodecError> {
        encode_canonical(self)
    }

    fn clone_box(&self) -> Box<dyn Authorization> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type DecodeFn = fn(&[u8], usize) -> Result<Box<dyn Authorization>, CodecError>;

fn decode_as<T: NamedAuthorization>(
    bytes: &[u8],
    max: usize,
) -> Result<Box<dyn Authorization>, CodecError> {
    let v: T = decode_canonical_limited(bytes, max)?;
    Ok(Box::new(v))
}

/// Type URL → decoder table for stored authorizations.
///
/// Built once during application assembly and shared read-only afterwards.
#[derive(Clone)]
pub struct AuthorizationRegistry {
    decoders: BTreeMap<&'static str, DecodeFn>,
    max_value_bytes: usize,
}

impl Default for AuthorizationRegistry {
    fn default() -> Self {
        Self {
            decoders: BTreeMap::new(),
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

impl AuthorizationRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the authorizations shipped by this module.
    pub fn with_builtin() -> Self {
        let mut r = Self::new();
        r.register::<GenericAuthorization>();
        r.register::<MethodAuthorization>();
        r
    }

    /// Override the decode size cap.
    pub fn with_max_value_bytes(mut self, max: usize) -> Self {
        self.max_value_bytes = max;
        self
    }

    /// Decode size cap applied to stored values.
    pub fn max_value_bytes(&self) -> usize {
        self.max_value_bytes
    }

    /// Register `T` under its type URL, replacing any previous decoder.
    pub fn register<T: NamedAuthorization>(&mut self) {
        self.decoders.insert(T::TYPE_URL, decode_as::<T> as DecodeFn);
    }

    /// Whether `type_url` can be decoded.
    pub fn is_registered(&self, type_url: &str) -> bool {
        self.decoders.contains_key(type_url)
    }

    /// Decode an envelope into a live authorization.
    pub fn unpack(&self, any: &AnyValue) -> SdkResult<Box<dyn Authorization>> {
        let decode = self.decoders.get(any.type_url.as_str()).ok_or_else(|| {
            SdkError::PackAny(format!("no authorization registered for {}", any.type_url))
        })?;
        decode(&any.value, self.max_value_bytes)
            .map_err(|e| SdkError::PackAny(format!("can't decode {}: {e}", any.type_url)))
    }
}

impl fmt::Debug for AuthorizationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationRegistry")
            .field("types", &self.decoders.keys().collect::<Vec<_>>())
            .field("max_value_bytes", &self.max_value_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::MemStore;
    use crate::core::types::{AccAddress, BlockHeader};

    #[derive(Debug)]
    struct Ping;

    impl Msg for Ping {
        fn type_url(&self) -> &str {
            "/test.Ping"
        }
        fn signers(&self) -> Vec<AccAddress> {
            vec![AccAddress::from_bytes([1; 20])]
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn method_authorization_counts_down_then_deletes() {
        let mut store = MemStore::new();
        let ctx = Context::new(&mut store, BlockHeader::default());

        let a = MethodAuthorization::with_uses("/test.Ping", 2);
        let r = a.accept(&ctx, &Ping).unwrap();
        assert!(r.accept && !r.delete);
        let next = r.updated.expect("updated state");
        let next = next.as_any().downcast_ref::<MethodAuthorization>().unwrap();
        assert_eq!(next.remaining_uses, Some(1));

        let r = next.accept(&ctx, &Ping).unwrap();
        assert!(r.accept && r.delete && r.updated.is_none());
    }

    #[test]
    fn method_authorization_rejects_other_methods() {
        let mut store = MemStore::new();
        let ctx = Context::new(&mut store, BlockHeader::default());
        let a = MethodAuthorization::new("/test.Pong");
        assert!(!a.accept(&ctx, &Ping).unwrap().accept);
    }

    #[test]
    fn validate_basic_rejects_empty_method_and_zero_uses() {
        assert!(matches!(
            MethodAuthorization::new("").validate_basic(),
            Err(SdkError::InvalidRequest(_))
        ));
        assert!(matches!(
            MethodAuthorization::with_uses("/x", 0).validate_basic(),
            Err(SdkError::InvalidRequest(_))
        ));
        assert!(matches!(
            GenericAuthorization::new("").validate_basic(),
            Err(SdkError::InvalidRequest(_))
        ));
    }

    #[test]
    fn registry_unpacks_registered_and_rejects_unknown() {
        let reg = AuthorizationRegistry::with_builtin();
        let a: Box<dyn Authorization> = Box::new(MethodAuthorization::with_uses("/m", 3));
        let any = pack(a.as_ref()).unwrap();
        let back = reg.unpack(&any).unwrap();
        assert!(same_authorization(back.as_ref(), a.as_ref()));

        let unknown = AnyValue {
            type_url: "/nope.Authorization".into(),
            value: any.value.clone(),
        };
        assert!(matches!(reg.unpack(&unknown), Err(SdkError::PackAny(_))));

        let empty = AuthorizationRegistry::new();
        assert!(!empty.is_registered(GenericAuthorization::TYPE_URL));
    }
}
