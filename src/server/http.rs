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

//! axum routes over [`QueryService`].
//!
//! Pagination cursors travel as lowercase hex. Addresses are base58.

use crate::core::app::QueryService;
use crate::core::context::Context;
use crate::core::errors::{SdkError, SdkResult, CODESPACE};
use crate::core::pagination::{PageRequest, PageResponse};
use crate::monitoring::metrics::Metrics;
use crate::x::authz::authorization::pack;
use crate::x::authz::query::{
    QueryAuthorizationRequest, QueryAuthorizationsRequest, QueryGranteeGrantsRequest,
    QueryGrantsResponse,
};
use crate::x::authz::{Grant, Keeper};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Shared handler state.
#[derive(Clone)]
pub struct HttpState {
    /// Query handle over committed state.
    pub queries: QueryService,
    /// Node metrics, rendered at `/metrics`.
    pub metrics: Arc<Metrics>,
}

/// Build the HTTP router.
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/authz/v1/grants/:granter/:grantee", get(grants))
        .route("/authz/v1/grants/:granter/:grantee/*msg_type_url", get(grant))
        .route("/authz/v1/grantee/:grantee", get(grantee_grants))
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(state)
}

/// Handler failure, rendered as `{code, codespace, message}`.
#[derive(Debug)]
pub enum ApiError {
    /// The query itself failed.
    Query(SdkError),
    /// The blocking query task did not complete.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u32,
    codespace: &'static str,
    message: String,
}

impl ApiError {
    /// HTTP status for the error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Query(SdkError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Query(SdkError::InvalidRequest(_) | SdkError::InvalidAddress(_)) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SdkError> for ApiError {
    fn from(e: SdkError) -> Self {
        Self::Query(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Query(e) => {
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    warn!(error = %e, "query failed");
                }
                ErrorBody {
                    code: e.code(),
                    codespace: e.codespace(),
                    message: e.to_string(),
                }
            }
            ApiError::Internal(message) => {
                warn!(error = %message, "query task failed");
                ErrorBody {
                    code: 1,
                    codespace: CODESPACE,
                    message,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Run `f` against committed state on the blocking pool. Store reads hit
/// sled and may block on disk.
pub async fn run_query<T, F>(queries: QueryService, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Keeper, &mut Context<'_>) -> SdkResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || queries.query(f))
        .await
        .map_err(|e| ApiError::Internal(format!("query task: {e}")))?
        .map_err(ApiError::from)
}

/// Pagination query string.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// Hex cursor from a previous `next_key`.
    pub key: Option<String>,
    /// Items to skip.
    pub offset: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Whether to count all matches.
    pub count_total: Option<bool>,
}

impl PageParams {
    fn into_request(self) -> Result<Option<PageRequest>, ApiError> {
        if self.key.is_none()
            && self.offset.is_none()
            && self.limit.is_none()
            && self.count_total.is_none()
        {
            return Ok(None);
        }
        let key = match self.key {
            None => None,
            Some(k) => Some(hex::decode(&k).map_err(|_| {
                SdkError::InvalidRequest(format!("pagination key {k} is not hex"))
            })?),
        };
        Ok(Some(PageRequest {
            key,
            offset: self.offset.unwrap_or(0),
            limit: self.limit.unwrap_or(0),
            count_total: self.count_total.unwrap_or(false),
        }))
    }
}

/// JSON form of one grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantView {
    /// Granter address.
    pub granter: String,
    /// Grantee address.
    pub grantee: String,
    /// Type URL of the authorization kind.
    pub authorization_type: String,
    /// Governed message type URL.
    pub msg_type_url: String,
    /// Canonical authorization payload, hex.
    pub authorization_hex: String,
    /// Expiration in ms, if any.
    pub expiration_ms: Option<u64>,
}

impl GrantView {
    fn from_grant(g: &Grant) -> Result<Self, ApiError> {
        let any = pack(g.authorization.as_ref())?;
        Ok(Self {
            granter: g.granter.to_string(),
            grantee: g.grantee.to_string(),
            authorization_type: any.type_url,
            msg_type_url: g.msg_type_url().to_string(),
            authorization_hex: hex::encode(any.value),
            expiration_ms: g.expiration.map(|t| t.as_millis()),
        })
    }
}

/// JSON form of a page of grants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantsView {
    /// Grants on this page.
    pub grants: Vec<GrantView>,
    /// Hex cursor of the next page.
    pub next_key: Option<String>,
    /// Total matches, when requested.
    pub total: Option<u64>,
}

impl GrantsView {
    fn from_response(resp: &QueryGrantsResponse) -> Result<Self, ApiError> {
        let grants = resp
            .grants
            .iter()
            .map(GrantView::from_grant)
            .collect::<Result<Vec<_>, _>>()?;
        let PageResponse { next_key, total } = &resp.pagination;
        Ok(Self {
            grants,
            next_key: next_key.as_ref().map(hex::encode),
            total: *total,
        })
    }
}

/// `GET /authz/v1/grants/{granter}/{grantee}`
pub async fn grants(
    State(st): State<HttpState>,
    Path((granter, grantee)): Path<(String, String)>,
    Query(page): Query<PageParams>,
) -> Result<Json<GrantsView>, ApiError> {
    let req = QueryAuthorizationsRequest {
        granter,
        grantee,
        pagination: page.into_request()?,
    };
    let resp = run_query(st.queries, move |k, ctx| k.authorizations(ctx, &req)).await?;
    Ok(Json(GrantsView::from_response(&resp)?))
}

/// `GET /authz/v1/grants/{granter}/{grantee}/{msg_type_url}`
pub async fn grant(
    State(st): State<HttpState>,
    Path((granter, grantee, msg_type_url)): Path<(String, String, String)>,
) -> Result<Json<GrantView>, ApiError> {
    let method_name = if msg_type_url.starts_with('/') {
        msg_type_url
    } else {
        format!("/{msg_type_url}")
    };
    let req = QueryAuthorizationRequest {
        granter,
        grantee,
        method_name,
    };
    let g = run_query(st.queries, move |k, ctx| k.authorization(ctx, &req)).await?;
    Ok(Json(GrantView::from_grant(&g)?))
}

/// `GET /authz/v1/grantee/{grantee}`
pub async fn grantee_grants(
    State(st): State<HttpState>,
    Path(grantee): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<GrantsView>, ApiError> {
    let req = QueryGranteeGrantsRequest {
        grantee,
        pagination: page.into_request()?,
    };
    let resp = run_query(st.queries, move |k, ctx| k.grantee_grants(ctx, &req)).await?;
    Ok(Json(GrantsView::from_response(&resp)?))
}

/// `GET /metrics` in Prometheus text format.
pub async fn metrics(State(st): State<HttpState>) -> Response {
    match st.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "metrics render failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
