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

use std::str::FromStr;

use pset::{
    AssetCommitment, AssetId, BlindingError, ByteStr, CompressedPk, Decode, Encode, InternalPk,
    KeyOrigin, KeyPair, Output, OutputKey, OutputProprietaryKey, PropKey, PsetError, RedeemScript,
    ScriptPubkey, TapDerivation, TapLeaf, TapLeafHash, TapTree, ValueCommitment, ValueData,
    WitnessScript, OP_PUSHBYTES_32, OP_PUSHNUM_1,
};

fn roundtrip(output: &Output) -> Output {
    let copy = Output::deserialize(output.serialize()).unwrap();
    assert_eq!(&copy, output);
    copy
}

// Liquid bitcoin asset tag.
fn asset() -> AssetId {
    AssetId::from_str("6f0279e9ed041c3d710a9f57d0c02928416460c4b722ae3457a11eec381c526d").unwrap()
}

fn blinded() -> Output {
    let mut script = vec![0x00, 0x14];
    script.extend([0x88; 20]);
    Output {
        script: ScriptPubkey::from(script),
        value_commitment: Some(ValueCommitment::from([0x08; 33])),
        asset_commitment: Some(AssetCommitment::from([0x0A; 33])),
        value_rangeproof: Some(ByteStr::with([0x60; 512])),
        asset_surjection_proof: Some(ByteStr::with([0x61; 128])),
        ecdh_pubkey: Some(CompressedPk::from([0x02; 33])),
        ..Output::default()
    }
}

/// Case: unblinded output paying to a P2WSH script, with both the redeem and witness scripts and
/// a BIP32 derivation for the signing key.
#[test]
fn explicit_output() {
    let mut witness_program = vec![0x00, 0x20];
    witness_program.extend([0x77; 32]);

    let mut output = Output::new(asset(), 100_000, ScriptPubkey::from(witness_program.clone()));
    output.redeem_script = Some(RedeemScript::from(witness_program));
    output.witness_script = Some(WitnessScript::from(vec![0x51, 0xAC]));
    let origin = KeyOrigin::from_str("8f54e2b9/84h/1h/0h/0/5").unwrap();
    output.bip32_derivation.insert(CompressedPk::from([0x02; 33]), origin);

    let copy = roundtrip(&output);
    assert!(!copy.needs_blinding());
    assert!(!copy.is_taproot());
}

/// Case: field emission order on the wire. The amount, the script and the blinder index are
/// emitted even when empty; the remaining keys are emitted only when the field is present.
#[test]
fn emission_order() {
    let mut output = Output::new(AssetId::from([0x11; 32]), 1, ScriptPubkey::new());
    output.redeem_script = Some(RedeemScript::from(vec![0x51]));

    let mut expected = vec![
        0x01, 0x00, 0x01, 0x51, // redeem script
        0x01, 0x03, 0x08, 0x01, 0, 0, 0, 0, 0, 0, 0, // value
        0x01, 0x04, 0x00, // script pubkey
        0x07, 0xFC, 0x04, b'p', b's', b'e', b't', 0x02, 0x20, // asset key
    ];
    expected.extend([0x11; 32]); // asset tag
    // blinder index
    expected.extend([0x07, 0xFC, 0x04, b'p', b's', b'e', b't', 0x08, 0x04, 0, 0, 0, 0]);
    expected.push(0x00); // separator

    assert_eq!(output.serialize(), expected);
    assert_eq!(Output::deserialize(expected).unwrap(), output);
}

/// Case: output blinded with the explicit amount and asset kept alongside their commitments and
/// blind proofs, carrying every field defined for the v2 output keymap.
#[test]
fn full_output() {
    let origin = KeyOrigin::from_str("8f54e2b9/86h/1h/0h/0/5").unwrap();
    let mut script = vec![OP_PUSHNUM_1, OP_PUSHBYTES_32];
    script.extend([0x55; 32]);

    let mut output = Output::new(asset(), 100_000, ScriptPubkey::from(script));
    output.redeem_script = Some(RedeemScript::from(vec![0x00, 0x14, 0x0A, 0x0B]));
    output.witness_script = Some(WitnessScript::from(vec![0x51, 0xAC]));
    output.bip32_derivation.insert(CompressedPk::from([0x02; 33]), origin.clone());
    output.bip32_derivation.insert(CompressedPk::from([0x03; 33]), origin.clone());
    output.tap_internal_key = Some(InternalPk::from([0x50; 32]));
    output.tap_tree = Some(TapTree::from_leaves([
        TapLeaf::with_tap_script(1, [0x51]),
        TapLeaf::with_tap_script(1, [0x52, 0x93, 0x52]),
    ]));
    output
        .tap_bip32_derivation
        .insert(CompressedPk::from([0x02; 33]), TapDerivation::with_internal_key(origin.clone()));
    output.tap_bip32_derivation.insert(CompressedPk::from([0x03; 33]), TapDerivation {
        leaf_hashes: vec![TapLeafHash::from([0xAA; 32])],
        origin,
    });
    output.value_commitment = Some(ValueCommitment::from([0x08; 33]));
    output.asset_commitment = Some(AssetCommitment::from([0x0A; 33]));
    output.value_rangeproof = Some(ByteStr::with([0x60; 512]));
    output.asset_surjection_proof = Some(ByteStr::with([0x61; 128]));
    output.blinding_pubkey = Some(CompressedPk::from([0x02; 33]));
    output.ecdh_pubkey = Some(CompressedPk::from([0x03; 33]));
    output.blind_value_proof = Some(ByteStr::with([0x62; 64]));
    output.blind_asset_proof = Some(ByteStr::with([0x63; 64]));
    output.push_proprietary(PropKey::pset(0x20), vec![0x01]).unwrap();
    output.unknown.entry(0x42).or_default().insert(ByteStr::with([0x01]), vec![0xFE].into());

    let copy = roundtrip(&output);
    assert_eq!(output.serialized_len(), output.serialize().len());
    assert!(copy.is_fully_blinded());
    assert!(copy.is_taproot());
}

/// Case: output marked for blinding with the index of the input whose owner must perform the
/// blinding.
#[test]
fn pending_blinding() {
    let output = Output::new(asset(), 900, ScriptPubkey::new())
        .with_blinding(CompressedPk::from([0x03; 33]), 2);
    assert!(output.needs_blinding());
    assert!(!output.is_partially_blinded());

    let copy = roundtrip(&output);
    assert_eq!(copy.blinder_index, 2);
}

/// Case: fully blinded output with the explicit amount removed. The amount key is still emitted,
/// so the value decodes as an explicit zero.
#[test]
fn blinded_output() {
    let output = blinded();
    output.check_blinding().unwrap();

    let copy = Output::deserialize(output.serialize()).unwrap();
    assert_eq!(copy.amount, Some(0));
    assert_eq!(copy.asset, None);
    assert_eq!(copy.value_commitment, output.value_commitment);
    assert!(copy.is_fully_blinded());
}

/// Case: fully blinded output with a non-zero blinder index. The index carries no meaning once
/// the blinding is complete and must be zeroed.
#[test]
fn blinder_index_after_blinding() {
    let output = Output {
        blinder_index: 5,
        ..blinded()
    };
    assert_eq!(
        Output::deserialize(output.serialize()),
        Err(PsetError::InconsistentBlindingState(BlindingError::NonZeroBlinderIndex))
    );

    Output::deserialize(blinded().serialize()).unwrap();
}

/// Case: output carrying the ECDH key as the only confidential field; an output blinded just
/// partially must be reported as invalid.
#[test]
fn partially_blinded() {
    let output = Output {
        ecdh_pubkey: Some(CompressedPk::from([0x02; 33])),
        ..Output::new(asset(), 600, ScriptPubkey::new())
    };
    assert_eq!(
        Output::deserialize(output.serialize()),
        Err(PsetError::InconsistentBlindingState(BlindingError::PartiallyBlinded))
    );
}

/// Case: output with an explicit non-zero amount and a value commitment, but no blind value proof
/// demonstrating that the two match.
#[test]
fn missing_value_proof() {
    let output = Output {
        value_commitment: Some(ValueCommitment::from([0x08; 33])),
        ..Output::new(asset(), 600, ScriptPubkey::new())
    };
    assert_eq!(
        Output::deserialize(output.serialize()),
        Err(PsetError::InconsistentBlindingState(BlindingError::ValueProofPairing))
    );
}

/// Case: output with both the explicit asset and the asset commitment, but no blind asset proof
/// demonstrating that the two match.
#[test]
fn missing_asset_proof() {
    let output = Output {
        asset_commitment: Some(AssetCommitment::from([0x0A; 33])),
        ..Output::new(asset(), 600, ScriptPubkey::new())
    };
    assert_eq!(
        Output::deserialize(output.serialize()),
        Err(PsetError::InconsistentBlindingState(BlindingError::AssetProofPairing))
    );
}

/// Case: output with neither the explicit asset tag nor the asset commitment.
#[test]
fn missing_asset() {
    let mut data = Vec::new();
    KeyPair::new(OutputKey::Amount, &(), &600u64).encode(&mut data).unwrap();
    KeyPair::new(OutputKey::Script, &(), &ScriptPubkey::new()).encode(&mut data).unwrap();
    data.push(0x00);

    assert_eq!(Output::deserialize(data), Err(PsetError::MissingRequiredField("asset")));
}

/// Case: the value commitment subtype repeated under two different proprietary key suffixes. The
/// suffix is not a part of the field identity, so this is a repeated field.
#[test]
fn repeated_commitment_suffixes() {
    let mut key = PropKey::pset(OutputProprietaryKey::ValueCommitment.into_u64());

    let mut data = Vec::new();
    KeyPair::new(OutputKey::Proprietary, &key, &ValueCommitment::from([0x08; 33]))
        .encode(&mut data)
        .unwrap();
    key.data = ByteStr::with([0x01]);
    KeyPair::new(OutputKey::Proprietary, &key, &ValueCommitment::from([0x09; 33]))
        .encode(&mut data)
        .unwrap();
    data.push(0x00);

    assert_eq!(Output::deserialize(data), Err(PsetError::DuplicateField("valueCommitment")));
}

/// Case: BIP32 derivation key carrying a 32-byte x-only public key instead of a compressed one.
#[test]
fn short_bip32_key() {
    let origin = KeyOrigin::from_str("01020304").unwrap();

    let mut data = Vec::new();
    KeyPair::new(OutputKey::Bip32Derivation, &ByteStr::with([0x02; 32]), &origin)
        .encode(&mut data)
        .unwrap();
    data.push(0x00);

    assert_eq!(Output::deserialize(data), Err(PsetError::InvalidLength {
        field: "bip32Derivation",
        expected: 33,
        actual: 32,
    }));
}

/// Case: taproot output with the internal key, a two-leaf script tree and key derivations for
/// both the internal key and a script-path key.
#[test]
fn taproot_output() {
    let origin = KeyOrigin::from_str("8f54e2b9/86h/1h/0h/1/12").unwrap();
    let mut script = vec![OP_PUSHNUM_1, OP_PUSHBYTES_32];
    script.extend([0x55; 32]);

    let mut output = Output::new(asset(), 25_000, ScriptPubkey::from(script));
    output.tap_internal_key = Some(InternalPk::from([0x50; 32]));
    output.tap_tree = Some(TapTree::from_leaves([
        TapLeaf::with_tap_script(1, [0x20, 0x51, 0xAC]),
        TapLeaf::with_tap_script(1, [0x20, 0x52, 0xAC, 0x7C, 0x93]),
    ]));
    output
        .tap_bip32_derivation
        .insert(CompressedPk::from([0x02; 33]), TapDerivation::with_internal_key(origin.clone()));
    output.tap_bip32_derivation.insert(CompressedPk::from([0x03; 33]), TapDerivation {
        leaf_hashes: vec![TapLeafHash::from([0xAA; 32])],
        origin,
    });

    let copy = roundtrip(&output);
    assert!(copy.is_taproot());
    assert_eq!(copy.tap_tree.unwrap().len(), 2);
}

/// Case: taproot derivation whose leaf hash count exceeds the data available in the value.
#[test]
fn tap_derivation_truncated() {
    let mut value = vec![0x02];
    value.extend([0xAA; 32]);
    value.extend([0xDE, 0xAD, 0xBE, 0xEF]);

    let mut data = Vec::new();
    KeyPair::new(OutputKey::TapBip32Derivation, &ByteStr::with([0x02; 33]), &ByteStr::from(value))
        .encode(&mut data)
        .unwrap();
    data.push(0x00);

    assert_eq!(Output::deserialize(data), Err(PsetError::UnexpectedEod));
}

/// Case: output with a key of an unknown type, which must be preserved and re-emitted after all
/// recognized fields.
#[test]
fn unknown_keys() {
    let asset_key = PropKey::pset(OutputProprietaryKey::Asset.into_u64());

    let mut data = Vec::new();
    KeyPair::new(OutputKey::Amount, &(), &1000u64).encode(&mut data).unwrap();
    KeyPair::new(OutputKey::Script, &(), &ScriptPubkey::new()).encode(&mut data).unwrap();
    KeyPair::new(OutputKey::Proprietary, &asset_key, &asset()).encode(&mut data).unwrap();
    KeyPair::new(OutputKey::Unknown(0x42), &ByteStr::with([0x01]), &ByteStr::with([0xAF, 0xFE]))
        .encode(&mut data)
        .unwrap();
    data.push(0x00);

    let output = Output::deserialize(&data).unwrap();
    assert_eq!(output.unknown[&0x42][&ByteStr::with([0x01])], ValueData::from(vec![0xAF, 0xFE]));

    let mut tail = Vec::new();
    KeyPair::new(OutputKey::Unknown(0x42), &ByteStr::with([0x01]), &ByteStr::with([0xAF, 0xFE]))
        .encode(&mut tail)
        .unwrap();
    tail.push(0x00);
    assert!(output.serialize().ends_with(&tail));

    assert_eq!(Output::deserialize(output.serialize()).unwrap(), output);
}

/// Case: proprietary keys of a third-party namespace and unrecognized PSET subtypes must survive
/// the round trip untouched.
#[test]
fn proprietary_keys() {
    let foreign = PropKey {
        identifier: ByteStr::with(b"acme"),
        subtype: 0x01,
        data: ByteStr::with([0x0F]),
    };
    let unrecognized = PropKey::pset(0x20);

    let mut output = Output::new(asset(), 5000, ScriptPubkey::new());
    output.push_proprietary(foreign.clone(), vec![0xCA, 0xFE]).unwrap();
    output.push_proprietary(unrecognized.clone(), vec![0x00]).unwrap();

    let copy = roundtrip(&output);
    assert_eq!(copy.proprietary(&foreign), Some(&ValueData::from(vec![0xCA, 0xFE])));
    assert_eq!(copy.proprietary(&unrecognized), Some(&ValueData::from(vec![0x00])));
}

/// Case: proprietary identifiers are raw bytes without a text encoding. Identifiers differing
/// only in a non-ASCII byte are distinct keys and their wire form is preserved verbatim.
#[test]
fn binary_proprietary_identifier() {
    let first = PropKey {
        identifier: ByteStr::with([0xFF]),
        subtype: 0x01,
        data: ByteStr::new(),
    };
    let second = PropKey {
        identifier: ByteStr::with([0xFE]),
        subtype: 0x01,
        data: ByteStr::new(),
    };

    let mut output = Output::new(asset(), 700, ScriptPubkey::new());
    output.push_proprietary(first.clone(), vec![0xAA]).unwrap();
    output.push_proprietary(second.clone(), vec![0xBB]).unwrap();

    let mut tail = vec![0x04, 0xFC, 0x01, 0xFF, 0x01, 0x01, 0xAA];
    tail.extend([0x04, 0xFC, 0x01, 0xFE, 0x01, 0x01, 0xBB]);
    tail.push(0x00);
    assert!(output.serialize().ends_with(&tail));

    let copy = roundtrip(&output);
    assert_eq!(copy.proprietary(&first), Some(&ValueData::from(vec![0xAA])));
    assert_eq!(copy.proprietary(&second), Some(&ValueData::from(vec![0xBB])));
}

/// Case: key length varint cut off in the middle of the stream.
#[test]
fn truncated_varint() {
    assert_eq!(Output::deserialize([0xFD, 0x01]), Err(PsetError::UnexpectedEod));
}

/// Case: key length declaring more data than the stream can ever hold. The declared length must
/// not be trusted for allocation; the parse must fail on the bytes actually present.
#[test]
fn oversized_key_length() {
    let mut data = vec![0xFF];
    data.extend([0xFF; 8]); // key length of 2^64 - 1
    data.push(0x05); // tapInternalKey

    assert_eq!(Output::deserialize(data), Err(PsetError::UnexpectedEod));
}

/// Case: value length declaring more data than the stream holds.
#[test]
fn oversized_value_length() {
    let mut data = vec![0x01, 0x03]; // value key
    data.push(0xFF);
    data.extend([0xFF; 8]); // value length of 2^64 - 1

    assert_eq!(Output::deserialize(data), Err(PsetError::UnexpectedEod));
}

/// Case: proprietary identifier length exceeding the key data carrying the identifier.
#[test]
fn oversized_proprietary_identifier() {
    let mut key_data = vec![0xFF];
    key_data.extend([0xFF; 8]); // identifier length of 2^64 - 1

    let mut data = Vec::new();
    KeyPair::new(OutputKey::Proprietary, &ByteStr::from(key_data), &ByteStr::with([0x00]))
        .encode(&mut data)
        .unwrap();
    data.push(0x00);

    assert_eq!(Output::deserialize(data), Err(PsetError::UnexpectedEod));
}

/// Case: taproot leaf script length exceeding the data available in the tree value.
#[test]
fn oversized_leaf_script_length() {
    let mut value = vec![0x01, 0xC0]; // depth, leaf version
    value.push(0xFF);
    value.extend([0xFF; 8]); // script length of 2^64 - 1

    let mut data = Vec::new();
    KeyPair::new(OutputKey::TapTree, &(), &ByteStr::from(value)).encode(&mut data).unwrap();
    data.push(0x00);

    assert_eq!(Output::deserialize(data), Err(PsetError::UnexpectedEod));
}

/// Case: stream ending without the zero-length separator key.
#[test]
fn missing_separator() {
    let mut data = Vec::new();
    KeyPair::new(OutputKey::Amount, &(), &600u64).encode(&mut data).unwrap();

    assert_eq!(Output::deserialize(data), Err(PsetError::UnexpectedEod));
}

/// Case: excessive bytes after the separator key.
#[test]
fn trailing_data() {
    let mut data = Output::new(asset(), 1, ScriptPubkey::new()).serialize();
    data.push(0xAA);

    assert_eq!(Output::deserialize(data), Err(PsetError::DataNotConsumed));
}

/// Case: the default display is Base16, the alternate display is Base64; parsing accepts both.
#[test]
fn text_encoding() {
    let output = Output::new(asset(), 42, ScriptPubkey::new());
    let base16 = output.to_string();
    let base64 = format!("{output:#}");

    assert!(base16.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(base16, base64);
    assert_eq!(Output::from_str(&base16).unwrap(), output);
    assert_eq!(Output::from_str(&base64).unwrap(), output);

    assert!(Output::from_str("not a pset").is_err());
}

/// Case: the human-readable serde encoding renders key maps as sequences of pairs and opaque
/// byte values as hex strings.
#[cfg(feature = "serde")]
#[test]
fn serde_json_form() {
    let origin = KeyOrigin::from_str("8f54e2b9/84h/1h/0h/0/5").unwrap();
    let mut output = Output::new(asset(), 1000, ScriptPubkey::new());
    output.bip32_derivation.insert(CompressedPk::from([0x02; 33]), origin);
    output.push_proprietary(PropKey::pset(0x20), vec![0xCA, 0xFE]).unwrap();

    let json = serde_json::to_value(&output).unwrap();

    let derivation = json["bip32Derivation"].as_array().unwrap();
    assert_eq!(derivation.len(), 1);
    assert!(derivation[0].is_array());

    let pair = json["proprietary"][0].as_array().unwrap();
    assert_eq!(pair[0]["identifier"], "70736574");
    assert_eq!(pair[1], "cafe");
}
