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

use std::collections::BTreeMap;
use std::io::Read;

use amplify::Wrapper;
use indexmap::IndexMap;

use crate::keys::KeyValue;
use crate::{
    AssetCommitment, AssetId, ByteStr, CompressedPk, Decode, DecodeError, InternalPk, KeyOrigin,
    KeyType, Output, OutputKey, OutputProprietaryKey, PropKey, PsetError, RedeemScript,
    ScriptPubkey, TapDerivation, TapTree, ValueCommitment, WitnessScript,
};

pub type KeyData = ByteStr;

#[derive(Wrapper, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From)]
#[wrapper(Deref, Index, RangeOps, AsSlice, BorrowSlice, Hex)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct ValueData(ByteStr);

impl From<Vec<u8>> for ValueData {
    fn from(vec: Vec<u8>) -> Self { ByteStr::from(vec).into() }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display("proprietary key '{0}' is already present")]
pub struct KeyAlreadyPresent(pub PropKey);

/// Key-value pairs of a single output keymap, sorted into standard, proprietary
/// and unknown buckets but not yet interpreted.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Map<K: KeyType> {
    pub singular: BTreeMap<K, ValueData>,
    pub plural: BTreeMap<K, BTreeMap<KeyData, ValueData>>,
    pub proprietary: IndexMap<PropKey, ValueData>,
    pub unknown: IndexMap<u8, IndexMap<KeyData, ValueData>>,
}

impl<K: KeyType> Map<K> {
    fn new() -> Self {
        Map {
            singular: empty!(),
            plural: empty!(),
            proprietary: empty!(),
            unknown: empty!(),
        }
    }

    /// Reads key-value pairs from the stream up to (and including) the keymap
    /// separator, detecting repeated keys but deferring the interpretation of
    /// the values.
    pub fn parse(stream: &mut impl Read) -> Result<Self, DecodeError> {
        let mut map = Map::<K>::new();

        while let KeyValue::<K>::Pair(pair) = KeyValue::<K>::decode(stream)? {
            if map.singular.contains_key(&pair.key_type) {
                return Err(PsetError::DuplicateField(pair.key_type.field_name()).into());
            }
            if pair.key_type.is_proprietary() {
                let prop_key = PropKey::deserialize(pair.key_data)?;
                if map.proprietary.contains_key(&prop_key) {
                    return Err(PsetError::DuplicatePropKey(prop_key).into());
                }
                map.proprietary.insert(prop_key, pair.value_data);
            } else if K::STANDARD.contains(&pair.key_type) {
                if pair.key_type.has_key_data() {
                    let submap = map.plural.entry(pair.key_type).or_default();
                    if submap.insert(pair.key_data, pair.value_data).is_some() {
                        return Err(PsetError::DuplicateField(pair.key_type.field_name()).into());
                    }
                } else {
                    if !pair.key_data.is_empty() {
                        return Err(PsetError::NonEmptyKeyData(pair.key_type.field_name()).into());
                    }
                    map.singular.insert(pair.key_type, pair.value_data);
                }
            } else {
                let submap = map.unknown.entry(pair.key_type.to_u8()).or_default();
                if submap.contains_key(&pair.key_data) {
                    return Err(PsetError::DuplicateUnknownKey(pair.key_type.to_u8()).into());
                }
                submap.insert(pair.key_data, pair.value_data);
            }
        }

        Ok(map)
    }
}

fn fixed<T: From<[u8; LEN]>, const LEN: usize>(
    field: &'static str,
    data: &[u8],
) -> Result<T, PsetError> {
    if data.len() != LEN {
        return Err(PsetError::InvalidLength {
            field,
            expected: LEN,
            actual: data.len(),
        });
    }
    let mut buf = [0u8; LEN];
    buf.copy_from_slice(data);
    Ok(T::from(buf))
}

impl Output {
    /// Fills in the output fields from a parsed keymap, checking value
    /// lengths, repeated proprietary subtypes and the blinding state.
    pub fn parse_map(&mut self, map: Map<OutputKey>) -> Result<(), PsetError> {
        for (key_type, value) in map.singular {
            match key_type {
                OutputKey::RedeemScript => {
                    self.redeem_script = Some(RedeemScript::deserialize(value)?)
                }
                OutputKey::WitnessScript => {
                    self.witness_script = Some(WitnessScript::deserialize(value)?)
                }
                OutputKey::Amount => {
                    let amount = fixed::<[u8; 8], 8>("value", value.as_slice())?;
                    self.amount = Some(u64::from_le_bytes(amount));
                }
                OutputKey::Script => self.script = ScriptPubkey::deserialize(value)?,
                OutputKey::TapInternalKey => {
                    self.tap_internal_key =
                        Some(fixed::<InternalPk, 32>("tapInternalKey", value.as_slice())?)
                }
                OutputKey::TapTree => self.tap_tree = Some(TapTree::deserialize(value)?),

                OutputKey::Bip32Derivation | OutputKey::TapBip32Derivation => unreachable!(),

                OutputKey::Proprietary | OutputKey::Unknown(_) => unreachable!(),
            }
        }

        for (key_type, submap) in map.plural {
            for (key_data, value_data) in submap {
                match key_type {
                    OutputKey::RedeemScript
                    | OutputKey::WitnessScript
                    | OutputKey::Amount
                    | OutputKey::Script
                    | OutputKey::TapInternalKey
                    | OutputKey::TapTree => unreachable!(),

                    OutputKey::Bip32Derivation => {
                        let pk = fixed::<CompressedPk, 33>("bip32Derivation", &key_data)?;
                        let origin = KeyOrigin::deserialize(value_data)?;
                        self.bip32_derivation.insert(pk, origin);
                    }
                    OutputKey::TapBip32Derivation => {
                        let pk = fixed::<CompressedPk, 33>("tapBip32Derivation", &key_data)?;
                        let derivation = TapDerivation::deserialize(value_data)?;
                        self.tap_bip32_derivation.insert(pk, derivation);
                    }

                    OutputKey::Proprietary | OutputKey::Unknown(_) => unreachable!(),
                }
            }
        }

        let mut blinder_index = None;
        for (prop_key, value) in map.proprietary {
            if !prop_key.is_pset() {
                self.proprietary.insert(prop_key, value);
                continue;
            }
            // The key data suffix does not participate in the dispatch, so a
            // subtype repeated under distinct suffixes is still a repeated
            // field.
            let subtype = OutputProprietaryKey::from_u64(prop_key.subtype);
            let field = subtype.field_name();
            match subtype {
                OutputProprietaryKey::ValueCommitment => {
                    if self.value_commitment.is_some() {
                        return Err(PsetError::DuplicateField(field));
                    }
                    self.value_commitment =
                        Some(fixed::<ValueCommitment, 33>(field, value.as_slice())?);
                }
                OutputProprietaryKey::Asset => {
                    if self.asset.is_some() {
                        return Err(PsetError::DuplicateField(field));
                    }
                    self.asset = Some(fixed::<AssetId, 32>(field, value.as_slice())?);
                }
                OutputProprietaryKey::AssetCommitment => {
                    if self.asset_commitment.is_some() {
                        return Err(PsetError::DuplicateField(field));
                    }
                    self.asset_commitment =
                        Some(fixed::<AssetCommitment, 33>(field, value.as_slice())?);
                }
                OutputProprietaryKey::ValueRangeproof => {
                    if self.value_rangeproof.is_some() {
                        return Err(PsetError::DuplicateField(field));
                    }
                    self.value_rangeproof = Some(value.into_inner());
                }
                OutputProprietaryKey::AssetSurjectionProof => {
                    if self.asset_surjection_proof.is_some() {
                        return Err(PsetError::DuplicateField(field));
                    }
                    self.asset_surjection_proof = Some(value.into_inner());
                }
                OutputProprietaryKey::BlindingPubkey => {
                    if self.blinding_pubkey.is_some() {
                        return Err(PsetError::DuplicateField(field));
                    }
                    self.blinding_pubkey =
                        Some(fixed::<CompressedPk, 33>(field, value.as_slice())?);
                }
                OutputProprietaryKey::EcdhPubkey => {
                    if self.ecdh_pubkey.is_some() {
                        return Err(PsetError::DuplicateField(field));
                    }
                    self.ecdh_pubkey = Some(fixed::<CompressedPk, 33>(field, value.as_slice())?);
                }
                OutputProprietaryKey::BlinderIndex => {
                    if blinder_index.is_some() {
                        return Err(PsetError::DuplicateField(field));
                    }
                    let index = fixed::<[u8; 4], 4>(field, value.as_slice())?;
                    blinder_index = Some(u32::from_le_bytes(index));
                }
                OutputProprietaryKey::BlindValueProof => {
                    if self.blind_value_proof.is_some() {
                        return Err(PsetError::DuplicateField(field));
                    }
                    self.blind_value_proof = Some(value.into_inner());
                }
                OutputProprietaryKey::BlindAssetProof => {
                    if self.blind_asset_proof.is_some() {
                        return Err(PsetError::DuplicateField(field));
                    }
                    self.blind_asset_proof = Some(value.into_inner());
                }
                OutputProprietaryKey::Unrecognized(_) => {
                    self.proprietary.insert(prop_key, value);
                }
            }
        }
        self.blinder_index = blinder_index.unwrap_or_default();

        for (key_type, submap) in map.unknown {
            for (key_data, value_data) in submap {
                self.unknown.entry(key_type).or_default().insert(key_data, value_data);
            }
        }

        self.check_blinding()?;
        Ok(())
    }

    pub fn has_proprietary(&self, key: &PropKey) -> bool { self.proprietary(key).is_some() }

    pub fn proprietary(&self, key: &PropKey) -> Option<&ValueData> { self.proprietary.get(key) }

    pub fn proprietary_mut(&mut self, key: &PropKey) -> Option<&mut ValueData> {
        self.proprietary.get_mut(key)
    }

    /// Adds a proprietary key to the output.
    ///
    /// Returns `Ok(false)` if the same key with the same value was already
    /// present, and errors if the key is present with a different value.
    pub fn push_proprietary(
        &mut self,
        key: PropKey,
        value: impl Into<ValueData>,
    ) -> Result<bool, KeyAlreadyPresent> {
        let value = value.into();
        if let Some(existing) = self.proprietary(&key) {
            if &value != existing {
                Err(KeyAlreadyPresent(key))
            } else {
                Ok(false)
            }
        } else {
            self.proprietary.insert(key, value);
            Ok(true)
        }
    }

    pub fn remove_proprietary(&mut self, key: &PropKey) -> Option<ValueData> {
        self.proprietary.shift_remove(key)
    }
}
