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

use amplify::{Bytes, Bytes32, Wrapper};
use indexmap::IndexMap;

pub use self::display_from_str::PsetParseError;
use crate::{
    ByteStr, Decode, KeyData, KeyOrigin, PropKey, PsetError, RedeemScript, ScriptPubkey,
    TapDerivation, TapTree, ValueData, WitnessScript,
};

/// Compressed public key serialized in the standard 33-byte form.
///
/// The key is kept as opaque bytes and is not verified to be a valid curve
/// point.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, From)]
#[wrapper(RangeOps, Hex, FromStr)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct CompressedPk(
    #[from]
    #[from([u8; 33])]
    Bytes<33>,
);

impl AsRef<[u8]> for CompressedPk {
    fn as_ref(&self) -> &[u8] { self.0.as_ref() }
}

impl From<CompressedPk> for [u8; 33] {
    fn from(value: CompressedPk) -> Self { value.0.into_inner() }
}

/// X-only public key used as a taproot internal key.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, From)]
#[wrapper(RangeOps, Hex, FromStr)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct InternalPk(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl AsRef<[u8]> for InternalPk {
    fn as_ref(&self) -> &[u8] { self.0.as_ref() }
}

impl From<InternalPk> for [u8; 32] {
    fn from(value: InternalPk) -> Self { value.0.into_inner() }
}

/// Asset tag of an explicit (non-confidential) asset.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, From)]
#[wrapper(RangeOps, Hex, FromStr)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct AssetId(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

impl AsRef<[u8]> for AssetId {
    fn as_ref(&self) -> &[u8] { self.0.as_ref() }
}

impl From<AssetId> for [u8; 32] {
    fn from(value: AssetId) -> Self { value.0.into_inner() }
}

/// 33-byte Pedersen commitment to the output amount.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, From)]
#[wrapper(RangeOps, Hex, FromStr)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct ValueCommitment(
    #[from]
    #[from([u8; 33])]
    Bytes<33>,
);

impl AsRef<[u8]> for ValueCommitment {
    fn as_ref(&self) -> &[u8] { self.0.as_ref() }
}

impl From<ValueCommitment> for [u8; 33] {
    fn from(value: ValueCommitment) -> Self { value.0.into_inner() }
}

/// 33-byte commitment to the output asset tag.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, From)]
#[wrapper(RangeOps, Hex, FromStr)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct AssetCommitment(
    #[from]
    #[from([u8; 33])]
    Bytes<33>,
);

impl AsRef<[u8]> for AssetCommitment {
    fn as_ref(&self) -> &[u8] { self.0.as_ref() }
}

impl From<AssetCommitment> for [u8; 33] {
    fn from(value: AssetCommitment) -> Self { value.0.into_inner() }
}

/// Inconsistency between the blinding-related fields of a single output.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum BlindingError {
    /// value commitment and blind value proof must be present or absent
    /// together.
    ValueProofPairing,

    /// asset commitment and blind asset proof must be present or absent
    /// together.
    AssetProofPairing,

    /// output is blinded only partially.
    PartiallyBlinded,

    /// fully blinded output must have a zero blinder index.
    NonZeroBlinderIndex,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
// Serde deserialize is not implemented and require manual implementation instead of derive, since
// we need to length-check the fixed-size fields and verify the consistency of the blinding state.
pub struct Output {
    /// The redeem script for this output.
    pub redeem_script: Option<RedeemScript>,

    /// The witness script for this output.
    pub witness_script: Option<WitnessScript>,

    /// A map from public keys needed to spend this output to their corresponding master key
    /// fingerprints and derivation paths.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_utils::indexmap_as_seq"))]
    pub bip32_derivation: IndexMap<CompressedPk, KeyOrigin>,

    /// The explicit amount of the output.
    ///
    /// Absent when the amount is committed to; an explicit zero still gets serialized.
    pub amount: Option<u64>,

    /// The script for this output, also known as the scriptPubKey.
    pub script: ScriptPubkey,

    /// The X-only pubkey used as the internal key in this output.
    pub tap_internal_key: Option<InternalPk>,

    /// One or more tuples representing the depth, leaf version, and script for a leaf in the
    /// taproot tree, allowing the entire tree to be reconstructed. The tuples must be in depth
    /// first search order so that the tree is correctly reconstructed.
    pub tap_tree: Option<TapTree>,

    /// A map from public keys needed to spend this output to the leaf hashes they appear in,
    /// the master key fingerprints and the derivation paths.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_utils::indexmap_as_seq"))]
    pub tap_bip32_derivation: IndexMap<CompressedPk, TapDerivation>,

    /// 33-byte Pedersen commitment to the output amount.
    pub value_commitment: Option<ValueCommitment>,

    /// The explicit asset tag for this output.
    pub asset: Option<AssetId>,

    /// 33-byte commitment to the output asset tag.
    pub asset_commitment: Option<AssetCommitment>,

    /// The rangeproof demonstrating that the committed amount lies within the allowed interval.
    pub value_rangeproof: Option<ByteStr>,

    /// The surjection proof demonstrating that the committed asset belongs to the set of the
    /// transaction input assets.
    pub asset_surjection_proof: Option<ByteStr>,

    /// The public key of the receiver which must be used to blind this output.
    pub blinding_pubkey: Option<CompressedPk>,

    /// The ephemeral public key used in the ECDH exchange at the blinding time.
    pub ecdh_pubkey: Option<CompressedPk>,

    /// Index of the transaction input whose owner is responsible for blinding this output.
    ///
    /// Carries no meaning once the output is fully blinded, and at that point must be reset to
    /// zero.
    pub blinder_index: u32,

    /// An explicit value rangeproof that proves that `amount` matches `value_commitment`.
    pub blind_value_proof: Option<ByteStr>,

    /// An explicit surjection proof that proves that `asset` matches `asset_commitment`.
    pub blind_asset_proof: Option<ByteStr>,

    /// Proprietary keys
    #[cfg_attr(
        feature = "serde",
        serde(with = "crate::serde_utils::indexmap_as_seq_byte_values")
    )]
    pub proprietary: IndexMap<PropKey, ValueData>,

    /// Unknown keys
    pub unknown: IndexMap<u8, IndexMap<KeyData, ValueData>>,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            redeem_script: None,
            witness_script: None,
            bip32_derivation: none!(),
            amount: None,
            script: ScriptPubkey::new(),
            tap_internal_key: None,
            tap_tree: None,
            tap_bip32_derivation: none!(),
            value_commitment: None,
            asset: None,
            asset_commitment: None,
            value_rangeproof: None,
            asset_surjection_proof: None,
            blinding_pubkey: None,
            ecdh_pubkey: None,
            blinder_index: 0,
            blind_value_proof: None,
            blind_asset_proof: None,
            proprietary: none!(),
            unknown: none!(),
        }
    }
}

impl Output {
    /// Constructs an explicit (unblinded) output paying the given amount of
    /// the given asset to the script.
    pub fn new(asset: AssetId, amount: u64, script: ScriptPubkey) -> Self {
        Output {
            amount: Some(amount),
            script,
            asset: Some(asset),
            ..Output::default()
        }
    }

    /// Marks the output for blinding with the receiver key, delegating the
    /// blinding duty to the owner of the input with the given index.
    pub fn with_blinding(mut self, blinding_pubkey: CompressedPk, blinder_index: u32) -> Self {
        self.blinding_pubkey = Some(blinding_pubkey);
        self.blinder_index = blinder_index;
        self
    }

    /// Detects whether the output is meant to be blinded.
    #[inline]
    pub fn needs_blinding(&self) -> bool { self.blinding_pubkey.is_some() }

    /// Detects whether at least one of the five confidential fields is set.
    pub fn is_partially_blinded(&self) -> bool {
        self.value_commitment.is_some()
            || self.asset_commitment.is_some()
            || self.value_rangeproof.is_some()
            || self.asset_surjection_proof.is_some()
            || self.ecdh_pubkey.is_some()
    }

    /// Detects whether all five confidential fields are set, i.e. the
    /// blinding of the output has been completed.
    pub fn is_fully_blinded(&self) -> bool {
        self.value_commitment.is_some()
            && self.asset_commitment.is_some()
            && self.value_rangeproof.is_some()
            && self.asset_surjection_proof.is_some()
            && self.ecdh_pubkey.is_some()
    }

    /// Detects whether the output carries any taproot-related information or
    /// pays to a taproot script pubkey.
    pub fn is_taproot(&self) -> bool {
        self.tap_internal_key.is_some()
            || self.tap_tree.is_some()
            || !self.tap_bip32_derivation.is_empty()
            || self.script.is_p2tr()
    }

    /// Verifies consistency of the blinding-related fields.
    ///
    /// The same check runs at the end of the output decoding; hand-built
    /// outputs should be checked before being encoded.
    pub fn check_blinding(&self) -> Result<(), PsetError> {
        if self.amount.unwrap_or_default() > 0
            && self.value_commitment.is_some() != self.blind_value_proof.is_some()
        {
            return Err(BlindingError::ValueProofPairing.into());
        }

        match self.asset {
            Some(_) if self.asset_commitment.is_some() != self.blind_asset_proof.is_some() => {
                return Err(BlindingError::AssetProofPairing.into());
            }
            None if self.asset_commitment.is_none() => {
                return Err(PsetError::MissingRequiredField("asset"));
            }
            _ => {}
        }

        if self.is_partially_blinded() && !self.is_fully_blinded() {
            return Err(BlindingError::PartiallyBlinded.into());
        }
        if self.is_fully_blinded() && self.blinder_index != 0 {
            return Err(BlindingError::NonZeroBlinderIndex.into());
        }

        Ok(())
    }
}

mod display_from_str {
    use std::fmt::{self, Display, Formatter, LowerHex};
    use std::str::FromStr;

    use amplify::hex::{self, FromHex, ToHex};
    use base64::display::Base64Display;
    use base64::prelude::BASE64_STANDARD;
    use base64::Engine;

    use super::*;

    #[derive(Clone, Debug, Display, Error, From)]
    #[display(inner)]
    pub enum PsetParseError {
        #[from]
        Hex(hex::Error),

        #[from]
        Base64(base64::DecodeError),

        #[from]
        Pset(PsetError),
    }

    impl Output {
        pub fn from_base64(s: &str) -> Result<Output, PsetParseError> {
            Output::deserialize(BASE64_STANDARD.decode(s)?).map_err(PsetParseError::from)
        }

        pub fn from_base16(s: &str) -> Result<Output, PsetParseError> {
            let data = Vec::<u8>::from_hex(s)?;
            Output::deserialize(data).map_err(PsetParseError::from)
        }

        pub fn to_base64(&self) -> String { BASE64_STANDARD.encode(self.serialize()) }

        pub fn to_base16(&self) -> String { self.serialize().to_hex() }
    }

    /// FromStr implementation parses both Hex (Base16) and Base64 encodings.
    impl FromStr for Output {
        type Err = PsetParseError;

        #[inline]
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::from_base16(s).or_else(|_| Self::from_base64(s))
        }
    }

    /// The output record displays as Base16 (hex) by default; the alternate
    /// `{:#}` form selects Base64.
    impl Display for Output {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            if f.alternate() {
                write!(f, "{}", Base64Display::new(&self.serialize(), &BASE64_STANDARD))
            } else {
                LowerHex::fmt(self, f)
            }
        }
    }

    impl LowerHex for Output {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.to_base16()) }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn explicit_output() -> Output {
        let mut asset = [0u8; 32];
        asset[31] = 1;
        Output::new(AssetId::from(asset), 1000, ScriptPubkey::new())
    }

    #[test]
    fn explicit_output_is_consistent() {
        let output = explicit_output();
        assert!(output.check_blinding().is_ok());
        assert!(!output.needs_blinding());
        assert!(!output.is_partially_blinded());
        assert!(!output.is_fully_blinded());

        let zero_amount = Output::new(AssetId::from([1u8; 32]), 0, ScriptPubkey::new());
        assert!(zero_amount.check_blinding().is_ok());
    }

    #[test]
    fn value_commitment_requires_proof() {
        let mut output = explicit_output();
        output.value_commitment = Some(ValueCommitment::from([2u8; 33]));
        assert_eq!(
            output.check_blinding(),
            Err(PsetError::InconsistentBlindingState(BlindingError::ValueProofPairing))
        );
    }

    #[test]
    fn asset_commitment_requires_proof() {
        let mut output = explicit_output();
        output.asset_commitment = Some(AssetCommitment::from([3u8; 33]));
        assert_eq!(
            output.check_blinding(),
            Err(PsetError::InconsistentBlindingState(BlindingError::AssetProofPairing))
        );
    }

    #[test]
    fn absent_asset_requires_commitment() {
        let output = Output::default();
        assert_eq!(output.check_blinding(), Err(PsetError::MissingRequiredField("asset")));
    }

    fn blinded_output() -> Output {
        Output {
            value_commitment: Some(ValueCommitment::from([2u8; 33])),
            asset_commitment: Some(AssetCommitment::from([3u8; 33])),
            value_rangeproof: Some(ByteStr::with([0xA0; 64])),
            asset_surjection_proof: Some(ByteStr::with([0xA1; 64])),
            ecdh_pubkey: Some(CompressedPk::from([4u8; 33])),
            ..Output::default()
        }
    }

    #[test]
    fn partial_blinding_is_rejected() {
        let mut output = explicit_output();
        output.ecdh_pubkey = Some(CompressedPk::from([4u8; 33]));
        assert_eq!(
            output.check_blinding(),
            Err(PsetError::InconsistentBlindingState(BlindingError::PartiallyBlinded))
        );
    }

    #[test]
    fn full_blinding_resets_blinder_index() {
        let output = blinded_output();
        assert!(output.is_fully_blinded());
        assert!(output.check_blinding().is_ok());

        let mut output = blinded_output();
        output.blinder_index = 5;
        assert_eq!(
            output.check_blinding(),
            Err(PsetError::InconsistentBlindingState(BlindingError::NonZeroBlinderIndex))
        );
    }

    #[test]
    fn taproot_classification() {
        let mut output = explicit_output();
        assert!(!output.is_taproot());

        output.tap_internal_key = Some(InternalPk::from([5u8; 32]));
        assert!(output.is_taproot());

        let mut output = explicit_output();
        let mut script = vec![0x51, 0x20];
        script.extend([5u8; 32]);
        output.script = ScriptPubkey::from(script);
        assert!(output.is_taproot());
    }

    #[test]
    fn raw_array_conversion() {
        assert_eq!(<[u8; 33]>::from(CompressedPk::from([0x02; 33])), [0x02; 33]);
        assert_eq!(<[u8; 32]>::from(InternalPk::from([0x50; 32])), [0x50; 32]);
        assert_eq!(<[u8; 32]>::from(AssetId::from([0x11; 32])), [0x11; 32]);
        assert_eq!(<[u8; 33]>::from(ValueCommitment::from([0x08; 33])), [0x08; 33]);
        assert_eq!(<[u8; 33]>::from(AssetCommitment::from([0x0A; 33])), [0x0A; 33]);
    }
}
