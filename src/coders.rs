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

use std::io::{self, Cursor, Read, Write};

use amplify::{IoError, Wrapper};

use crate::keys::KeyValue;
use crate::{
    AssetCommitment, AssetId, BlindingError, ByteStr, CompressedPk, DerivationIndex,
    DerivationPath, Fingerprint, InternalPk, KeyData, KeyOrigin, KeyPair, KeyType, LeafVer, Map,
    Output, OutputKey, OutputProprietaryKey, PropKey, RedeemScript, ScriptPubkey, TapDerivation,
    TapLeaf, TapLeafHash, TapTree, ValueCommitment, ValueData, WitnessScript,
};

#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(inner)]
pub enum DecodeError {
    #[from]
    #[from(io::Error)]
    Io(IoError),

    #[from]
    #[from(BlindingError)]
    Pset(PsetError),
}

#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum PsetError {
    /// unexpected end of data.
    UnexpectedEod,

    /// PSET data are followed by some excessive bytes.
    DataNotConsumed,

    /// repeated output field {0}.
    DuplicateField(&'static str),

    /// repeated proprietary key {0}.
    DuplicatePropKey(PropKey),

    /// repeated unknown key {0:#02x}.
    DuplicateUnknownKey(u8),

    /// key of the output field {0} must not contain additional key data.
    NonEmptyKeyData(&'static str),

    /// output field {field} has invalid length {actual} (expected {expected} bytes).
    InvalidLength {
        /// Name of the output field.
        field: &'static str,
        /// Byte length mandated for the field value.
        expected: usize,
        /// Byte length actually present on the wire.
        actual: usize,
    },

    /// required output field {0} is absent.
    MissingRequiredField(&'static str),

    #[from]
    #[display(inner)]
    InconsistentBlindingState(BlindingError),
}

impl From<DecodeError> for PsetError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Pset(e) => e,
            DecodeError::Io(_) => PsetError::UnexpectedEod,
        }
    }
}

pub trait Encode {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError>;
}

impl<'a, T: Encode> Encode for &'a T {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> { (*self).encode(writer) }
}

pub trait Decode
where Self: Sized
{
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError>;
    fn deserialize(bytes: impl AsRef<[u8]>) -> Result<Self, PsetError> {
        let bytes = bytes.as_ref();
        let mut cursor = Cursor::new(bytes);
        let me = Self::decode(&mut cursor)?;
        if cursor.position() != bytes.len() as u64 {
            return Err(PsetError::DataNotConsumed);
        }
        Ok(me)
    }
}

/// Reads a byte string declared by a length prefix. The allocation is bounded
/// by the bytes actually present in the stream, and a short read yields
/// `UnexpectedEod`.
fn read_vec(reader: &mut impl Read, len: u64) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    if reader.by_ref().take(len).read_to_end(&mut buf)? as u64 != len {
        return Err(PsetError::UnexpectedEod.into());
    }
    Ok(buf)
}

impl Output {
    pub(crate) const SEPARATOR: [u8; 1] = [0x0];

    pub fn encode_vec(&self, writer: &mut Vec<u8>) -> usize {
        self.encode(writer).expect("in-memory encoding can't error")
    }

    /// Serializes the output record into a newly allocated byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let mut vec = Vec::with_capacity(self.serialized_len());
        self.encode_vec(&mut vec);
        vec
    }

    /// Computes the byte length of the serialized output record without
    /// allocating.
    pub fn serialized_len(&self) -> usize {
        let mut sink = io::Sink::default();
        self.encode(&mut sink).expect("sink write doesn't fail")
    }
}

impl Encode for Output {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        let mut counter = 0;

        if let Some(redeem_script) = &self.redeem_script {
            counter += KeyPair::new(OutputKey::RedeemScript, &(), redeem_script).encode(writer)?;
        }

        if let Some(witness_script) = &self.witness_script {
            counter +=
                KeyPair::new(OutputKey::WitnessScript, &(), witness_script).encode(writer)?;
        }

        for (key, origin) in &self.bip32_derivation {
            counter += KeyPair::new(OutputKey::Bip32Derivation, key, origin).encode(writer)?;
        }

        for (key, derivation) in &self.tap_bip32_derivation {
            counter +=
                KeyPair::new(OutputKey::TapBip32Derivation, key, derivation).encode(writer)?;
        }

        if let Some(tap_tree) = &self.tap_tree {
            counter += KeyPair::new(OutputKey::TapTree, &(), tap_tree).encode(writer)?;
        }

        if let Some(internal_key) = &self.tap_internal_key {
            counter += KeyPair::new(OutputKey::TapInternalKey, &(), internal_key).encode(writer)?;
        }

        counter += KeyPair::new(OutputKey::Amount, &(), &self.amount.unwrap_or_default())
            .encode(writer)?;

        counter += KeyPair::new(OutputKey::Script, &(), &self.script).encode(writer)?;

        if let Some(value_commitment) = &self.value_commitment {
            counter += KeyPair::new(
                OutputKey::Proprietary,
                &PropKey::pset(OutputProprietaryKey::ValueCommitment.into_u64()),
                value_commitment,
            )
            .encode(writer)?;
        }

        if let Some(asset_commitment) = &self.asset_commitment {
            counter += KeyPair::new(
                OutputKey::Proprietary,
                &PropKey::pset(OutputProprietaryKey::AssetCommitment.into_u64()),
                asset_commitment,
            )
            .encode(writer)?;
        }

        if let Some(asset) = &self.asset {
            counter += KeyPair::new(
                OutputKey::Proprietary,
                &PropKey::pset(OutputProprietaryKey::Asset.into_u64()),
                asset,
            )
            .encode(writer)?;
        }

        if let Some(value_rangeproof) = &self.value_rangeproof {
            counter += KeyPair::new(
                OutputKey::Proprietary,
                &PropKey::pset(OutputProprietaryKey::ValueRangeproof.into_u64()),
                value_rangeproof,
            )
            .encode(writer)?;
        }

        if let Some(surjection_proof) = &self.asset_surjection_proof {
            counter += KeyPair::new(
                OutputKey::Proprietary,
                &PropKey::pset(OutputProprietaryKey::AssetSurjectionProof.into_u64()),
                surjection_proof,
            )
            .encode(writer)?;
        }

        if let Some(blinding_pubkey) = &self.blinding_pubkey {
            counter += KeyPair::new(
                OutputKey::Proprietary,
                &PropKey::pset(OutputProprietaryKey::BlindingPubkey.into_u64()),
                blinding_pubkey,
            )
            .encode(writer)?;
        }

        if let Some(ecdh_pubkey) = &self.ecdh_pubkey {
            counter += KeyPair::new(
                OutputKey::Proprietary,
                &PropKey::pset(OutputProprietaryKey::EcdhPubkey.into_u64()),
                ecdh_pubkey,
            )
            .encode(writer)?;
        }

        counter += KeyPair::new(
            OutputKey::Proprietary,
            &PropKey::pset(OutputProprietaryKey::BlinderIndex.into_u64()),
            &self.blinder_index,
        )
        .encode(writer)?;

        if let Some(blind_value_proof) = &self.blind_value_proof {
            counter += KeyPair::new(
                OutputKey::Proprietary,
                &PropKey::pset(OutputProprietaryKey::BlindValueProof.into_u64()),
                blind_value_proof,
            )
            .encode(writer)?;
        }

        if let Some(blind_asset_proof) = &self.blind_asset_proof {
            counter += KeyPair::new(
                OutputKey::Proprietary,
                &PropKey::pset(OutputProprietaryKey::BlindAssetProof.into_u64()),
                blind_asset_proof,
            )
            .encode(writer)?;
        }

        for (key, value) in &self.proprietary {
            counter += KeyPair::new(OutputKey::Proprietary, key, value).encode(writer)?;
        }

        for (key_type, map) in &self.unknown {
            for (key_data, value_data) in map {
                counter += KeyPair::new(OutputKey::Unknown(*key_type), key_data, value_data)
                    .encode(writer)?;
            }
        }

        counter += Self::SEPARATOR.len();
        writer.write_all(&Self::SEPARATOR)?;

        Ok(counter)
    }
}

impl Decode for Output {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        let map = Map::<OutputKey>::parse(reader)?;
        let mut output = Output::default();
        output.parse_map(map)?;
        Ok(output)
    }
}

impl Encode for OutputKey {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        self.to_u8().encode(writer)
    }
}

impl Decode for OutputKey {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        u8::decode(reader).map(Self::from_u8)
    }
}

impl<T: KeyType, K: Encode, V: Encode> Encode for KeyPair<T, K, V> {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        let mut counter = 0;

        counter += self.key_len().encode(writer)?;
        counter += self.key_type.encode(writer)?;
        counter += self.key_data.encode(writer)?;

        counter += self.value_len().encode(writer)?;
        counter += self.value_data.encode(writer)?;

        Ok(counter)
    }
}

impl<T: KeyType> Decode for KeyValue<T> {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        let key_len = VarInt::decode(reader)?;
        if key_len == 0u64 {
            return Ok(KeyValue::Separator);
        }

        let key_type = T::decode(reader)?;
        let key_data = read_vec(reader, key_len.to_u64() - 1)?;

        let value_len = VarInt::decode(reader)?;
        let value_data = read_vec(reader, value_len.to_u64())?;

        Ok(KeyValue::Pair(KeyPair {
            key_type,
            key_data: KeyData::from(key_data),
            value_data: ValueData::from(value_data),
        }))
    }
}

impl Encode for PropKey {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        let mut counter = self.identifier.len();
        let len = VarInt::with(counter);
        counter += len.encode(writer)?;

        writer.write_all(&self.identifier)?;
        counter += VarInt::new(self.subtype).encode(writer)?;
        counter += self.data.len();
        writer.write_all(&self.data)?;

        Ok(counter)
    }
}

impl Decode for PropKey {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        let len = VarInt::decode(reader)?;
        let identifier = ByteStr::from(read_vec(reader, len.to_u64())?);

        let subtype = VarInt::decode(reader)?.to_u64();

        let mut data = Vec::<u8>::new();
        reader.read_to_end(&mut data)?;

        Ok(PropKey {
            identifier,
            subtype,
            data: ByteStr::from(data),
        })
    }
}

impl Encode for KeyOrigin {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        writer.write_all(self.master_fp().as_ref())?;
        for index in self.derivation() {
            index.index().encode(writer)?;
        }
        Ok(4 + self.derivation().len() * 4)
    }
}

impl Decode for KeyOrigin {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        let master_fp = Fingerprint::from(buf);
        let mut derivation = DerivationPath::new();
        while let Ok(index) = u32::decode(reader) {
            derivation.push(DerivationIndex::from_index(index));
        }
        Ok(KeyOrigin::new(master_fp, derivation))
    }
}

impl Encode for ScriptPubkey {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        self.as_inner().encode(writer)
    }
}

impl Decode for ScriptPubkey {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        ByteStr::decode(reader).map(Self::from_inner)
    }
}

impl Encode for RedeemScript {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        self.as_inner().encode(writer)
    }
}

impl Decode for RedeemScript {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        ByteStr::decode(reader).map(Self::from_inner)
    }
}

impl Encode for WitnessScript {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        self.as_inner().encode(writer)
    }
}

impl Decode for WitnessScript {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        ByteStr::decode(reader).map(Self::from_inner)
    }
}

impl Encode for LeafVer {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        self.to_consensus_u8().encode(writer)
    }
}

impl Decode for LeafVer {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        u8::decode(reader).map(Self::from_consensus_u8)
    }
}

impl Encode for TapLeafHash {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        writer.write_all(self.as_ref())?;
        Ok(32)
    }
}

impl Decode for TapLeafHash {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        let mut buf = [0u8; 32];
        reader.read_exact(&mut buf)?;
        Ok(TapLeafHash::from(buf))
    }
}

impl Encode for TapTree {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        let mut counter = 0;
        for leaf in self {
            counter += leaf.depth.encode(writer)?;
            counter += leaf.leaf_ver.encode(writer)?;
            counter += VarInt::with(leaf.script.len()).encode(writer)?;
            counter += leaf.script.encode(writer)?;
        }
        Ok(counter)
    }
}

impl Decode for TapTree {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        let mut leaves = Vec::new();
        while let Ok(depth) = u8::decode(reader) {
            let leaf_ver = LeafVer::decode(reader)?;
            let script_len = VarInt::decode(reader)?;
            let script = read_vec(reader, script_len.to_u64())?;
            leaves.push(TapLeaf {
                depth,
                leaf_ver,
                script: ByteStr::from(script),
            });
        }
        Ok(TapTree::from_leaves(leaves))
    }
}

impl Encode for TapDerivation {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        let mut counter = VarInt::with(self.leaf_hashes.len()).encode(writer)?;
        for leaf_hash in &self.leaf_hashes {
            counter += leaf_hash.encode(writer)?;
        }
        counter += self.origin.encode(writer)?;
        Ok(counter)
    }
}

impl Decode for TapDerivation {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        let count = VarInt::decode(reader)?;
        let mut leaf_hashes = Vec::new();
        for _ in 0..count.to_u64() {
            leaf_hashes.push(TapLeafHash::decode(reader)?);
        }
        let origin = KeyOrigin::decode(reader)?;
        Ok(TapDerivation {
            leaf_hashes,
            origin,
        })
    }
}

impl Encode for CompressedPk {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        writer.write_all(self.as_ref())?;
        Ok(33)
    }
}

impl Encode for InternalPk {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        writer.write_all(self.as_ref())?;
        Ok(32)
    }
}

impl Encode for ValueCommitment {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        writer.write_all(self.as_ref())?;
        Ok(33)
    }
}

impl Encode for AssetCommitment {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        writer.write_all(self.as_ref())?;
        Ok(33)
    }
}

impl Encode for AssetId {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        writer.write_all(self.as_ref())?;
        Ok(32)
    }
}

/// Variable-length integer in the Bitcoin compact size encoding.
///
/// Values are always encoded in the minimal form; decoding accepts
/// non-minimal encodings without re-checking minimality.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From)]
#[display(inner)]
pub struct VarInt(pub u64);

impl PartialEq<u64> for VarInt {
    fn eq(&self, other: &u64) -> bool { self.0 == *other }
}

impl VarInt {
    pub const fn new(value: u64) -> Self { VarInt(value) }

    pub fn with(len: usize) -> Self { VarInt(len as u64) }

    /// Returns the byte length of the encoded value.
    pub const fn len(&self) -> usize {
        match self.0 {
            0..=0xFC => 1,
            0xFD..=0xFFFF => 3,
            0x10000..=0xFFFF_FFFF => 5,
            _ => 9,
        }
    }

    pub const fn to_u64(&self) -> u64 { self.0 }

    pub fn to_usize(&self) -> usize {
        usize::try_from(self.0).expect("PSET data don't fit a 16-bit platform")
    }
}

impl Encode for VarInt {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        match self.0 {
            0..=0xFC => (self.0 as u8).encode(writer),
            0xFD..=0xFFFF => {
                0xFD_u8.encode(writer)?;
                (self.0 as u16).encode(writer)?;
                Ok(3)
            }
            0x10000..=0xFFFF_FFFF => {
                0xFE_u8.encode(writer)?;
                (self.0 as u32).encode(writer)?;
                Ok(5)
            }
            _ => {
                0xFF_u8.encode(writer)?;
                self.0.encode(writer)?;
                Ok(9)
            }
        }
    }
}

impl Decode for VarInt {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        match u8::decode(reader)? {
            0xFF => u64::decode(reader).map(VarInt::new),
            0xFE => u32::decode(reader).map(|val| VarInt::new(val as u64)),
            0xFD => u16::decode(reader).map(|val| VarInt::new(val as u64)),
            val => Ok(VarInt::new(val as u64)),
        }
    }
}

macro_rules! pset_code_int {
    ($ty:ty, $len:literal) => {
        impl Encode for $ty {
            fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
                writer.write_all(&self.to_le_bytes())?;
                Ok($len)
            }
        }

        impl Decode for $ty {
            fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
                let mut buf = [0u8; $len];
                reader.read_exact(&mut buf)?;
                Ok(<$ty>::from_le_bytes(buf))
            }
        }
    };
}

pset_code_int!(u8, 1);
pset_code_int!(u16, 2);
pset_code_int!(u32, 4);
pset_code_int!(u64, 8);

impl Encode for ByteStr {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        writer.write_all(self.as_slice())?;
        Ok(self.len())
    }
}

impl Decode for ByteStr {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        let mut data = Vec::<u8>::new();
        reader.read_to_end(&mut data)?;
        Ok(ByteStr::from(data))
    }
}

impl Encode for ValueData {
    fn encode(&self, writer: &mut impl Write) -> Result<usize, IoError> {
        self.as_inner().encode(writer)
    }
}

impl Decode for ValueData {
    fn decode(reader: &mut impl Read) -> Result<Self, DecodeError> {
        ByteStr::decode(reader).map(Self::from_inner)
    }
}

impl Encode for () {
    fn encode(&self, _writer: &mut impl Write) -> Result<usize, IoError> { Ok(0) }
}

impl Decode for () {
    fn decode(_reader: &mut impl Read) -> Result<Self, DecodeError> { Ok(()) }
}

#[cfg(test)]
mod test {
    use super::*;

    fn encode_to_vec(item: &impl Encode) -> Vec<u8> {
        let mut data = Vec::new();
        item.encode(&mut data).expect("in-memory encoding can't error");
        data
    }

    #[test]
    fn varint_encoded_len() {
        for (value, len) in [
            (0u64, 1usize),
            (0xFC, 1),
            (0xFD, 3),
            (0xFFFF, 3),
            (0x10000, 5),
            (0xFFFF_FFFF, 5),
            (0x1_0000_0000, 9),
        ] {
            let varint = VarInt::new(value);
            assert_eq!(varint.len(), len);
            let data = encode_to_vec(&varint);
            assert_eq!(data.len(), len);
            assert_eq!(VarInt::deserialize(&data).unwrap(), varint);
        }
    }

    #[test]
    fn varint_wire_form() {
        assert_eq!(encode_to_vec(&VarInt::new(0xAB)), vec![0xAB]);
        assert_eq!(encode_to_vec(&VarInt::new(0xFD)), vec![0xFD, 0xFD, 0x00]);
        assert_eq!(encode_to_vec(&VarInt::new(0xFFFF)), vec![0xFD, 0xFF, 0xFF]);
        assert_eq!(encode_to_vec(&VarInt::new(0x10000)), vec![0xFE, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(encode_to_vec(&VarInt::new(0x1_0000_0000)), vec![
            0xFF, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00
        ]);
    }

    #[test]
    fn zero_length_key_is_separator() {
        match KeyValue::<OutputKey>::deserialize([0x00]).unwrap() {
            KeyValue::Separator => {}
            KeyValue::Pair(_) => panic!("zero-length key must decode as a separator"),
        }
    }

    #[test]
    fn key_pair_layout() {
        let pair = KeyPair::new(OutputKey::Amount, &(), &42u64);
        let data = encode_to_vec(&pair);
        assert_eq!(data, vec![0x01, 0x03, 0x08, 42, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn prop_key_roundtrip() {
        let mut key = PropKey::pset(0x08);
        key.data = ByteStr::with([0x01, 0x02]);
        let data = encode_to_vec(&key);
        assert_eq!(data[0], 0x04);
        assert_eq!(&data[1..5], b"pset");
        assert_eq!(data[5], 0x08);
        assert_eq!(&data[6..], [0x01, 0x02]);
        assert_eq!(PropKey::deserialize(data).unwrap(), key);
    }

    #[test]
    fn key_origin_layout() {
        let origin = KeyOrigin::new(
            Fingerprint::from([0xde, 0xad, 0xbe, 0xef]),
            DerivationPath::from(
                &[DerivationIndex::hardened(86), DerivationIndex::normal(1)][..],
            ),
        );
        let data = encode_to_vec(&origin);
        assert_eq!(data.len(), 12);
        assert_eq!(&data[..4], [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&data[4..8], [0x56, 0x00, 0x00, 0x80]);
        assert_eq!(&data[8..], [0x01, 0x00, 0x00, 0x00]);
        assert_eq!(KeyOrigin::deserialize(data).unwrap(), origin);
    }

    #[test]
    fn tap_tree_roundtrip() {
        let tree = TapTree::from_leaves([
            TapLeaf::with_tap_script(1, [0x51, 0x93, 0x52]),
            TapLeaf::with_tap_script(1, [0x52, 0x93, 0x51, 0x87, 0x51]),
        ]);
        let data = encode_to_vec(&tree);
        assert_eq!(data, vec![
            0x01, 0xc0, 0x03, 0x51, 0x93, 0x52, //
            0x01, 0xc0, 0x05, 0x52, 0x93, 0x51, 0x87, 0x51,
        ]);
        assert_eq!(TapTree::deserialize(data).unwrap(), tree);
    }

    #[test]
    fn tap_derivation_layout() {
        let origin = KeyOrigin::new(Fingerprint::from([1, 2, 3, 4]), DerivationPath::from(
            &[DerivationIndex::normal(7)][..],
        ));
        let derivation = TapDerivation {
            leaf_hashes: vec![TapLeafHash::from([0xAA; 32])],
            origin,
        };
        let data = encode_to_vec(&derivation);
        assert_eq!(data.len(), 1 + 32 + 4 + 4);
        assert_eq!(data[0], 0x01);
        assert_eq!(&data[1..33], [0xAA; 32]);
        assert_eq!(TapDerivation::deserialize(data).unwrap(), derivation);
    }
}
