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

//! Deterministic Merkle root used as the application hash.
//!
//! leaf = H( "Ledgerkit-App-Leaf-v1" || H(key) || H(value) )
//! node = H( "Ledgerkit-App-Node-v1" || left || right )
//!
//! An odd node at the end of a level is paired with itself.

use ring::digest;

/// Hash32 type.
pub type Hash32 = [u8; 32];

/// Root of an empty state.
pub const EMPTY_ROOT: Hash32 = [0u8; 32];

const LEAF_DOMAIN: &[u8] = b"Ledgerkit-App-Leaf-v1";
const NODE_DOMAIN: &[u8] = b"Ledgerkit-App-Node-v1";

fn sha256(parts: &[&[u8]]) -> Hash32 {
    let mut ctx = digest::Context::new(&digest::SHA256);
    for p in parts {
        ctx.update(p);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(ctx.finish().as_ref());
    out
}

/// Leaf hash of one key/value pair.
pub fn leaf_hash(key: &[u8], value: &[u8]) -> Hash32 {
    sha256(&[LEAF_DOMAIN, &sha256(&[key]), &sha256(&[value])])
}

fn parent_level(level: &[Hash32]) -> Vec<Hash32> {
    level
        .chunks(2)
        .map(|pair| {
            let left = pair[0];
            let right = pair.get(1).copied().unwrap_or(left);
            sha256(&[NODE_DOMAIN, &left, &right])
        })
        .collect()
}

/// Root over pairs already sorted by key. Empty input yields [`EMPTY_ROOT`].
pub fn root_of_sorted<'a, I>(pairs: I) -> Hash32
where
    I: IntoIterator<Item = (&'a [u8], &'a [u8])>,
{
    let mut level: Vec<Hash32> = pairs.into_iter().map(|(k, v)| leaf_hash(k, v)).collect();
    if level.is_empty() {
        return EMPTY_ROOT;
    }
    while level.len() > 1 {
        level = parent_level(&level);
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_leaf_is_its_own_root() {
        let root = root_of_sorted([(&b"k"[..], &b"v"[..])]);
        assert_eq!(root, leaf_hash(b"k", b"v"));
    }

    #[test]
    fn value_change_moves_root() {
        let a = root_of_sorted([(&b"a"[..], &b"1"[..]), (&b"b"[..], &b"2"[..])]);
        let b = root_of_sorted([(&b"a"[..], &b"1"[..]), (&b"b"[..], &b"3"[..])]);
        assert_ne!(a, b);
        assert_eq!(root_of_sorted(std::iter::empty()), EMPTY_ROOT);
    }
}
