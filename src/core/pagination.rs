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

//! Offset / cursor pagination over ordered scans.

use crate::core::errors::{SdkError, SdkResult};
use serde::{Deserialize, Serialize};

/// Page size used when the request does not set one.
pub const DEFAULT_LIMIT: u64 = 100;

/// Page selector. `key` and `offset` are mutually exclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Resume from this cursor (inclusive), as returned in `next_key`.
    #[serde(default)]
    pub key: Option<Vec<u8>>,
    /// Number of matching items to skip.
    #[serde(default)]
    pub offset: u64,
    /// Page size; `0` selects [`DEFAULT_LIMIT`].
    #[serde(default)]
    pub limit: u64,
    /// Count all matching items (offset mode only).
    #[serde(default)]
    pub count_total: bool,
}

/// Page metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Cursor of the first item of the next page, if any.
    pub next_key: Option<Vec<u8>>,
    /// Total matching items, when requested.
    pub total: Option<u64>,
}

/// Page through `items` (ordered by cursor), keeping those for which `filter`
/// returns `Some`.
pub fn filtered_paginate<I, V, T, F>(
    items: I,
    req: Option<&PageRequest>,
    mut filter: F,
) -> SdkResult<(Vec<T>, PageResponse)>
where
    I: Iterator<Item = SdkResult<(Vec<u8>, V)>>,
    F: FnMut(&[u8], V) -> SdkResult<Option<T>>,
{
    let default_req = PageRequest::default();
    let req = req.unwrap_or(&default_req);
    if req.key.is_some() && req.offset > 0 {
        return Err(SdkError::InvalidRequest(
            "either offset or key is expected, got both".into(),
        ));
    }
    let limit = if req.limit == 0 { DEFAULT_LIMIT } else { req.limit };
    let count_total = req.count_total && req.key.is_none();

    let mut page: Vec<T> = Vec::new();
    let mut next_key: Option<Vec<u8>> = None;
    let mut matched: u64 = 0;

    for item in items {
        let (cursor, value) = item?;
        if let Some(start) = &req.key {
            if cursor.as_slice() < start.as_slice() {
                continue;
            }
        }
        let Some(out) = filter(&cursor, value)? else {
            continue;
        };
        matched += 1;
        if matched <= req.offset {
            continue;
        }
        if page.len() as u64 == limit {
            if next_key.is_none() {
                next_key = Some(cursor);
            }
            if !count_total {
                break;
            }
            continue;
        }
        page.push(out);
    }

    Ok((
        page,
        PageResponse {
            next_key,
            total: count_total.then_some(matched),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: u8) -> impl Iterator<Item = SdkResult<(Vec<u8>, u8)>> {
        (0..n).map(|i| Ok((vec![i], i)))
    }

    fn keep_even(_: &[u8], v: u8) -> SdkResult<Option<u8>> {
        Ok((v % 2 == 0).then_some(v))
    }

    #[test]
    fn cursor_pages_walk_the_filtered_set() {
        let req = PageRequest {
            limit: 2,
            ..PageRequest::default()
        };
        let (p1, r1) = filtered_paginate(items(10), Some(&req), keep_even).unwrap();
        assert_eq!(p1, vec![0, 2]);
        assert_eq!(r1.next_key, Some(vec![4]));

        let req2 = PageRequest {
            key: r1.next_key,
            limit: 2,
            ..PageRequest::default()
        };
        let (p2, _) = filtered_paginate(items(10), Some(&req2), keep_even).unwrap();
        assert_eq!(p2, vec![4, 6]);
    }

    #[test]
    fn offset_with_total() {
        let req = PageRequest {
            offset: 1,
            limit: 2,
            count_total: true,
            ..PageRequest::default()
        };
        let (p, r) = filtered_paginate(items(10), Some(&req), keep_even).unwrap();
        assert_eq!(p, vec![2, 4]);
        assert_eq!(r.total, Some(5));
        assert_eq!(r.next_key, Some(vec![6]));
    }

    #[test]
    fn key_and_offset_together_is_invalid() {
        let req = PageRequest {
            key: Some(vec![1]),
            offset: 1,
            ..PageRequest::default()
        };
        assert!(matches!(
            filtered_paginate(items(3), Some(&req), keep_even),
            Err(SdkError::InvalidRequest(_))
        ));
    }
}
