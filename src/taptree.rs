// Modern, minimalistic & standard-compliant PSET library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2020-2024 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2020-2024 LNP/BP Standards Association. All rights reserved.
// Copyright (C) 2020-2024 Dr Maxim Orlovsky. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::ops::Deref;
use std::{slice, vec};

use amplify::{Bytes32, Wrapper};

use crate::{ByteStr, KeyOrigin};

/// Taproot leaf version for tapscript, as defined in BIP-342.
pub const TAPROOT_LEAF_TAPSCRIPT: u8 = 0xc0;

/// Version of a taproot leaf script, used in the tapscript commitment.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, From)]
#[display("{0:#04x}")]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct LeafVer(u8);

impl Default for LeafVer {
    fn default() -> Self { LeafVer(TAPROOT_LEAF_TAPSCRIPT) }
}

impl LeafVer {
    pub const fn from_consensus_u8(version: u8) -> Self { Self(version) }

    pub const fn to_consensus_u8(self) -> u8 { self.0 }
}

/// Hash committing to a single taproot leaf script, as defined in BIP-341.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From)]
#[wrapper(RangeOps, Hex, FromStr)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct TapLeafHash(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl AsRef<[u8]> for TapLeafHash {
    fn as_ref(&self) -> &[u8] { self.0.as_ref() }
}

impl From<TapLeafHash> for [u8; 32] {
    fn from(value: TapLeafHash) -> Self { value.0.into_inner() }
}

/// Single leaf of a taproot script tree: the leaf script with its version and
/// the depth at which the leaf resides in the tree.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct TapLeaf {
    pub depth: u8,
    pub leaf_ver: LeafVer,
    pub script: ByteStr,
}

impl TapLeaf {
    pub fn new(depth: u8, leaf_ver: LeafVer, script: impl AsRef<[u8]>) -> Self {
        TapLeaf {
            depth,
            leaf_ver,
            script: ByteStr::with(script),
        }
    }

    pub fn with_tap_script(depth: u8, script: impl AsRef<[u8]>) -> Self {
        Self::new(depth, LeafVer::default(), script)
    }
}

/// Taproot script tree, listing its leaf scripts in the depth-first traversal
/// order used by the BIP-371 serialization.
///
/// The type does not check that the leaf depth information assembles into a
/// complete Merkle tree.
#[derive(Clone, Eq, PartialEq, Hash, Default, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct TapTree(Vec<TapLeaf>);

impl Deref for TapTree {
    type Target = Vec<TapLeaf>;
    fn deref(&self) -> &Self::Target { &self.0 }
}

impl IntoIterator for TapTree {
    type Item = TapLeaf;
    type IntoIter = vec::IntoIter<TapLeaf>;

    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'a> IntoIterator for &'a TapTree {
    type Item = &'a TapLeaf;
    type IntoIter = slice::Iter<'a, TapLeaf>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

impl TapTree {
    pub fn with_single_leaf(script: impl AsRef<[u8]>) -> TapTree {
        Self(vec![TapLeaf::with_tap_script(0, script)])
    }

    pub fn from_leaves(leaves: impl IntoIterator<Item = TapLeaf>) -> Self {
        Self(leaves.into_iter().collect())
    }

    pub fn into_vec(self) -> Vec<TapLeaf> { self.0 }
}

/// The leaf hashes of the leaves which involve a public key, followed by the
/// key origin information. The internal key does not participate in any leaf
/// script, so it is indicated with an empty list of hashes.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct TapDerivation {
    pub leaf_hashes: Vec<TapLeafHash>,
    pub origin: KeyOrigin,
}

impl TapDerivation {
    pub fn with_internal_key(origin: KeyOrigin) -> Self {
        TapDerivation {
            leaf_hashes: empty!(),
            origin,
        }
    }
}
