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

use std::fmt::Debug;
use std::hash::Hash;
use std::io::Sink;

use crate::{ByteStr, Decode, Encode, KeyData, ValueData, VarInt};

pub trait KeyType: Copy + Ord + Eq + Hash + Debug + Encode + Decode + 'static {
    const STANDARD: &'static [Self];
    fn from_u8(val: u8) -> Self;
    fn into_u8(self) -> u8;
    fn to_u8(&self) -> u8 { self.into_u8() }
    fn has_key_data(self) -> bool;
    /// Returns name of the output field matching the key, as used in the PSET
    /// documentation.
    fn field_name(self) -> &'static str;
    fn is_proprietary(self) -> bool;
}

const PSET_OUT_REDEEM_SCRIPT: u8 = 0x00;
const PSET_OUT_WITNESS_SCRIPT: u8 = 0x01;
const PSET_OUT_BIP32_DERIVATION: u8 = 0x02;
const PSET_OUT_AMOUNT: u8 = 0x03;
const PSET_OUT_SCRIPT: u8 = 0x04;
const PSET_OUT_TAP_INTERNAL_KEY: u8 = 0x05;
const PSET_OUT_TAP_TREE: u8 = 0x06;
const PSET_OUT_TAP_BIP32_DERIVATION: u8 = 0x07;
const PSET_OUT_PROPRIETARY: u8 = 0xFC;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum OutputKey {
    /// `PSET_OUT_REDEEM_SCRIPT`
    RedeemScript,

    /// `PSET_OUT_WITNESS_SCRIPT`
    WitnessScript,

    /// `PSET_OUT_BIP32_DERIVATION`
    Bip32Derivation,

    /// `PSET_OUT_AMOUNT`
    Amount,

    /// `PSET_OUT_SCRIPT`
    Script,

    /// `PSET_OUT_TAP_INTERNAL_KEY`
    TapInternalKey,

    /// `PSET_OUT_TAP_TREE`
    TapTree,

    /// `PSET_OUT_TAP_BIP32_DERIVATION`
    TapBip32Derivation,

    /// `PSET_OUT_PROPRIETARY`
    Proprietary,

    /// All unknown keys
    Unknown(u8),
}

impl KeyType for OutputKey {
    const STANDARD: &'static [Self] = &[
        Self::RedeemScript,
        Self::WitnessScript,
        Self::Bip32Derivation,
        Self::Amount,
        Self::Script,
        Self::TapInternalKey,
        Self::TapTree,
        Self::TapBip32Derivation,
    ];

    fn from_u8(val: u8) -> Self {
        match val {
            x if x == Self::RedeemScript.into_u8() => Self::RedeemScript,
            x if x == Self::WitnessScript.into_u8() => Self::WitnessScript,
            x if x == Self::Bip32Derivation.into_u8() => Self::Bip32Derivation,
            x if x == Self::Amount.into_u8() => Self::Amount,
            x if x == Self::Script.into_u8() => Self::Script,

            x if x == Self::TapInternalKey.into_u8() => Self::TapInternalKey,
            x if x == Self::TapTree.into_u8() => Self::TapTree,
            x if x == Self::TapBip32Derivation.into_u8() => Self::TapBip32Derivation,

            x if x == Self::Proprietary.into_u8() => Self::Proprietary,
            unknown => Self::Unknown(unknown),
        }
    }

    fn into_u8(self) -> u8 {
        match self {
            OutputKey::RedeemScript => PSET_OUT_REDEEM_SCRIPT,
            OutputKey::WitnessScript => PSET_OUT_WITNESS_SCRIPT,
            OutputKey::Bip32Derivation => PSET_OUT_BIP32_DERIVATION,
            OutputKey::Amount => PSET_OUT_AMOUNT,
            OutputKey::Script => PSET_OUT_SCRIPT,
            OutputKey::TapInternalKey => PSET_OUT_TAP_INTERNAL_KEY,
            OutputKey::TapTree => PSET_OUT_TAP_TREE,
            OutputKey::TapBip32Derivation => PSET_OUT_TAP_BIP32_DERIVATION,
            OutputKey::Proprietary => PSET_OUT_PROPRIETARY,
            OutputKey::Unknown(key_type) => key_type,
        }
    }

    fn has_key_data(self) -> bool {
        match self {
            OutputKey::RedeemScript | OutputKey::WitnessScript => false,
            OutputKey::Bip32Derivation => true,
            OutputKey::Amount | OutputKey::Script => false,
            OutputKey::TapInternalKey => false,
            OutputKey::TapTree => false,
            OutputKey::TapBip32Derivation => true,
            OutputKey::Proprietary => true,
            OutputKey::Unknown(_) => true,
        }
    }

    fn field_name(self) -> &'static str {
        match self {
            OutputKey::RedeemScript => "redeemScript",
            OutputKey::WitnessScript => "witnessScript",
            OutputKey::Bip32Derivation => "bip32Derivation",
            OutputKey::Amount => "value",
            OutputKey::Script => "script",
            OutputKey::TapInternalKey => "tapInternalKey",
            OutputKey::TapTree => "tapTree",
            OutputKey::TapBip32Derivation => "tapBip32Derivation",
            OutputKey::Proprietary => "proprietary",
            OutputKey::Unknown(_) => "unknown",
        }
    }

    fn is_proprietary(self) -> bool { self == Self::Proprietary }
}

const PSET_ELEMENTS_OUT_VALUE_COMMITMENT: u64 = 0x01;
const PSET_ELEMENTS_OUT_ASSET: u64 = 0x02;
const PSET_ELEMENTS_OUT_ASSET_COMMITMENT: u64 = 0x03;
const PSET_ELEMENTS_OUT_VALUE_RANGEPROOF: u64 = 0x04;
const PSET_ELEMENTS_OUT_ASSET_SURJECTION_PROOF: u64 = 0x05;
const PSET_ELEMENTS_OUT_BLINDING_PUBKEY: u64 = 0x06;
const PSET_ELEMENTS_OUT_ECDH_PUBKEY: u64 = 0x07;
const PSET_ELEMENTS_OUT_BLINDER_INDEX: u64 = 0x08;
const PSET_ELEMENTS_OUT_BLIND_VALUE_PROOF: u64 = 0x09;
const PSET_ELEMENTS_OUT_BLIND_ASSET_PROOF: u64 = 0x0a;

/// Subtypes of the PSET-native proprietary keys carrying Elements confidential
/// output fields.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum OutputProprietaryKey {
    /// `PSET_ELEMENTS_OUT_VALUE_COMMITMENT`
    ValueCommitment,

    /// `PSET_ELEMENTS_OUT_ASSET`
    Asset,

    /// `PSET_ELEMENTS_OUT_ASSET_COMMITMENT`
    AssetCommitment,

    /// `PSET_ELEMENTS_OUT_VALUE_RANGEPROOF`
    ValueRangeproof,

    /// `PSET_ELEMENTS_OUT_ASSET_SURJECTION_PROOF`
    AssetSurjectionProof,

    /// `PSET_ELEMENTS_OUT_BLINDING_PUBKEY`
    BlindingPubkey,

    /// `PSET_ELEMENTS_OUT_ECDH_PUBKEY`
    EcdhPubkey,

    /// `PSET_ELEMENTS_OUT_BLINDER_INDEX`
    BlinderIndex,

    /// `PSET_ELEMENTS_OUT_BLIND_VALUE_PROOF`
    BlindValueProof,

    /// `PSET_ELEMENTS_OUT_BLIND_ASSET_PROOF`
    BlindAssetProof,

    /// All unrecognized subtypes
    Unrecognized(u64),
}

impl OutputProprietaryKey {
    pub const STANDARD: &'static [Self] = &[
        Self::ValueCommitment,
        Self::Asset,
        Self::AssetCommitment,
        Self::ValueRangeproof,
        Self::AssetSurjectionProof,
        Self::BlindingPubkey,
        Self::EcdhPubkey,
        Self::BlinderIndex,
        Self::BlindValueProof,
        Self::BlindAssetProof,
    ];

    pub fn from_u64(val: u64) -> Self {
        match val {
            x if x == Self::ValueCommitment.into_u64() => Self::ValueCommitment,
            x if x == Self::Asset.into_u64() => Self::Asset,
            x if x == Self::AssetCommitment.into_u64() => Self::AssetCommitment,
            x if x == Self::ValueRangeproof.into_u64() => Self::ValueRangeproof,
            x if x == Self::AssetSurjectionProof.into_u64() => Self::AssetSurjectionProof,

            x if x == Self::BlindingPubkey.into_u64() => Self::BlindingPubkey,
            x if x == Self::EcdhPubkey.into_u64() => Self::EcdhPubkey,
            x if x == Self::BlinderIndex.into_u64() => Self::BlinderIndex,

            x if x == Self::BlindValueProof.into_u64() => Self::BlindValueProof,
            x if x == Self::BlindAssetProof.into_u64() => Self::BlindAssetProof,
            unrecognized => Self::Unrecognized(unrecognized),
        }
    }

    pub fn into_u64(self) -> u64 {
        match self {
            OutputProprietaryKey::ValueCommitment => PSET_ELEMENTS_OUT_VALUE_COMMITMENT,
            OutputProprietaryKey::Asset => PSET_ELEMENTS_OUT_ASSET,
            OutputProprietaryKey::AssetCommitment => PSET_ELEMENTS_OUT_ASSET_COMMITMENT,
            OutputProprietaryKey::ValueRangeproof => PSET_ELEMENTS_OUT_VALUE_RANGEPROOF,
            OutputProprietaryKey::AssetSurjectionProof => PSET_ELEMENTS_OUT_ASSET_SURJECTION_PROOF,
            OutputProprietaryKey::BlindingPubkey => PSET_ELEMENTS_OUT_BLINDING_PUBKEY,
            OutputProprietaryKey::EcdhPubkey => PSET_ELEMENTS_OUT_ECDH_PUBKEY,
            OutputProprietaryKey::BlinderIndex => PSET_ELEMENTS_OUT_BLINDER_INDEX,
            OutputProprietaryKey::BlindValueProof => PSET_ELEMENTS_OUT_BLIND_VALUE_PROOF,
            OutputProprietaryKey::BlindAssetProof => PSET_ELEMENTS_OUT_BLIND_ASSET_PROOF,
            OutputProprietaryKey::Unrecognized(subtype) => subtype,
        }
    }

    pub fn to_u64(&self) -> u64 { self.into_u64() }

    /// Returns name of the output field matching the key subtype, as used in
    /// the PSET documentation.
    pub fn field_name(self) -> &'static str {
        match self {
            OutputProprietaryKey::ValueCommitment => "valueCommitment",
            OutputProprietaryKey::Asset => "asset",
            OutputProprietaryKey::AssetCommitment => "assetCommitment",
            OutputProprietaryKey::ValueRangeproof => "valueRangeproof",
            OutputProprietaryKey::AssetSurjectionProof => "assetSurjectionProof",
            OutputProprietaryKey::BlindingPubkey => "blindingPubkey",
            OutputProprietaryKey::EcdhPubkey => "ecdhPubkey",
            OutputProprietaryKey::BlinderIndex => "blinderIndex",
            OutputProprietaryKey::BlindValueProof => "blindValueProof",
            OutputProprietaryKey::BlindAssetProof => "blindAssetProof",
            OutputProprietaryKey::Unrecognized(_) => "proprietary",
        }
    }
}

pub enum KeyValue<T: KeyType> {
    Pair(KeyPair<T, KeyData, ValueData>),
    Separator,
}

pub struct KeyPair<T: KeyType, K, V> {
    pub key_type: T,
    pub key_data: K,
    pub value_data: V,
}

impl<T: KeyType, K, V> KeyPair<T, K, V> {
    pub fn new(key_type: T, key_data: K, value_data: V) -> Self {
        Self {
            key_type,
            key_data,
            value_data,
        }
    }

    pub fn key_len(&self) -> VarInt
    where K: Encode {
        let mut sink = Sink::default();
        let count = self.key_data.encode(&mut sink).expect("sink write doesn't fail");
        let len = count + 1 /* key type byte */;
        VarInt::with(len)
    }

    pub fn value_len(&self) -> VarInt
    where V: Encode {
        let mut sink = Sink::default();
        let len = self.value_data.encode(&mut sink).expect("sink write doesn't fail");
        VarInt::with(len)
    }
}

/// Magic identifier prefixing all PSET-native proprietary keys.
pub const PSET_PROPRIETARY_PREFIX: &[u8] = b"pset";

/// Proprietary key, which may be used by third-party software in the way not
/// standardized by the PSET specification.
///
/// The identifier is kept as raw bytes: the wire format places no text
/// encoding requirements on it.
#[derive(Clone, PartialOrd, Ord, Eq, PartialEq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
#[display("{identifier} {subtype:#x} {data}")]
pub struct PropKey {
    pub identifier: ByteStr,
    pub subtype: u64,
    pub data: ByteStr,
}

impl PropKey {
    /// Constructs proprietary key in the PSET-native namespace with an empty
    /// key data suffix.
    pub fn pset(subtype: u64) -> Self {
        PropKey {
            identifier: PSET_PROPRIETARY_PREFIX.into(),
            subtype,
            data: none!(),
        }
    }

    /// Detects whether the key belongs to the PSET-native namespace.
    ///
    /// The key data suffix does not participate in the detection, matching
    /// keys with any suffix.
    #[inline]
    pub fn is_pset(&self) -> bool { self.identifier.as_slice() == PSET_PROPRIETARY_PREFIX }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn output_key_codes() {
        for key in OutputKey::STANDARD {
            assert_eq!(OutputKey::from_u8(key.into_u8()), *key);
            assert!(!key.is_proprietary());
        }
        assert_eq!(OutputKey::from_u8(0xFC), OutputKey::Proprietary);
        assert_eq!(OutputKey::from_u8(0x42), OutputKey::Unknown(0x42));
        assert_eq!(OutputKey::Unknown(0x42).into_u8(), 0x42);
    }

    #[test]
    fn proprietary_subtype_codes() {
        for subtype in OutputProprietaryKey::STANDARD {
            assert_eq!(OutputProprietaryKey::from_u64(subtype.into_u64()), *subtype);
        }
        assert_eq!(OutputProprietaryKey::from_u64(0x0b), OutputProprietaryKey::Unrecognized(0x0b));
        assert_eq!(OutputProprietaryKey::Unrecognized(0x100).into_u64(), 0x100);
    }

    #[test]
    fn prop_key_namespace() {
        let key = PropKey::pset(0x01);
        assert!(key.is_pset());
        assert!(key.data.is_empty());

        let mut key = PropKey::pset(0x01);
        key.data = ByteStr::with([0xde, 0xad]);
        assert!(key.is_pset());

        let foreign = PropKey {
            identifier: ByteStr::with(b"acme"),
            subtype: 0x01,
            data: none!(),
        };
        assert!(!foreign.is_pset());
    }
}
