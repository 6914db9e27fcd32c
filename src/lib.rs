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

#[macro_use]
extern crate amplify;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

mod script;
mod path;
mod taptree;
mod keys;
mod maps;
mod data;
mod coders;
#[cfg(feature = "serde")]
pub mod serde_utils;

pub use coders::{Decode, DecodeError, Encode, PsetError, VarInt};
pub use data::{
    AssetCommitment, AssetId, BlindingError, CompressedPk, InternalPk, Output, PsetParseError,
    ValueCommitment,
};
pub use keys::{
    KeyPair, KeyType, KeyValue, OutputKey, OutputProprietaryKey, PropKey, PSET_PROPRIETARY_PREFIX,
};
pub use maps::{KeyAlreadyPresent, KeyData, Map, ValueData};
pub use path::{
    DerivationIndex, DerivationParseError, DerivationPath, Fingerprint, IndexParseError,
    KeyOrigin, OriginParseError, HARDENED_INDEX_BOUNDARY,
};
pub use script::{
    ByteStr, RedeemScript, ScriptPubkey, WitnessScript, OP_PUSHBYTES_32, OP_PUSHNUM_1,
};
pub use taptree::{LeafVer, TapDerivation, TapLeaf, TapLeafHash, TapTree, TAPROOT_LEAF_TAPSCRIPT};
