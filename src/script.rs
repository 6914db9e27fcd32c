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

use std::fmt::{self, Formatter, LowerHex, UpperHex};

use amplify::hex::{self, FromHex, ToHex};

/// `OP_PUSHBYTES_32` script code.
pub const OP_PUSHBYTES_32: u8 = 0x20;
/// `OP_1`, pushing number one on the stack.
pub const OP_PUSHNUM_1: u8 = 0x51;

/// Arbitrary-length byte string, which may contain non-Unicode sequences and
/// thus can't be represented with a `String`.
#[derive(
    Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From
)]
#[wrapper(Deref, Index, RangeOps, AsSlice, BorrowSlice)]
#[wrapper_mut(DerefMut)]
#[display(LowerHex)]
pub struct ByteStr(Vec<u8>);

impl From<&[u8]> for ByteStr {
    fn from(slice: &[u8]) -> Self { Self(slice.to_vec()) }
}

impl ByteStr {
    pub fn new() -> Self { Self::default() }

    pub fn with(slice: impl AsRef<[u8]>) -> Self { Self(slice.as_ref().to_vec()) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn into_vec(self) -> Vec<u8> { self.0 }
}

impl LowerHex for ByteStr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.0.to_hex()) }
}

impl UpperHex for ByteStr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex().to_ascii_uppercase())
    }
}

impl FromHex for ByteStr {
    fn from_byte_iter<I>(iter: I) -> Result<Self, hex::Error>
    where I: Iterator<Item = Result<u8, hex::Error>> + ExactSizeIterator + DoubleEndedIterator {
        Vec::<u8>::from_byte_iter(iter).map(Self)
    }
}

#[cfg(feature = "serde")]
mod _serde {
    use amplify::hex::{FromHex, ToHex};
    use serde_crate::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    impl Serialize for ByteStr {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.to_hex())
            } else {
                serializer.serialize_bytes(self.as_slice())
            }
        }
    }

    impl<'de> Deserialize<'de> for ByteStr {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
            if deserializer.is_human_readable() {
                let s = String::deserialize(deserializer)?;
                ByteStr::from_hex(&s)
                    .map_err(|err| de::Error::custom(format!("invalid hex bytes; {err}")))
            } else {
                let v = Vec::<u8>::deserialize(deserializer)?;
                Ok(ByteStr::from(v))
            }
        }
    }
}

/// Script for spending conditions of an output (`scriptPubkey`).
#[derive(
    Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From
)]
#[wrapper(Deref, Index, RangeOps, AsSlice, BorrowSlice, Hex)]
#[wrapper_mut(DerefMut)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct ScriptPubkey(ByteStr);

impl From<Vec<u8>> for ScriptPubkey {
    fn from(vec: Vec<u8>) -> Self { ByteStr::from(vec).into() }
}

impl ScriptPubkey {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Checks whether the script matches the BIP-341 output script pattern
    /// `OP_1 <32-byte x-only key>`.
    pub fn is_p2tr(&self) -> bool {
        self.len() == 34 && self.0[0] == OP_PUSHNUM_1 && self.0[1] == OP_PUSHBYTES_32
    }
}

/// Script committed to by a P2SH `scriptPubkey` hash.
#[derive(
    Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From
)]
#[wrapper(Deref, Index, RangeOps, AsSlice, BorrowSlice, Hex)]
#[wrapper_mut(DerefMut)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct RedeemScript(ByteStr);

impl From<Vec<u8>> for RedeemScript {
    fn from(vec: Vec<u8>) -> Self { ByteStr::from(vec).into() }
}

impl RedeemScript {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// Script committed to by a P2WSH `scriptPubkey` hash.
#[derive(
    Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From
)]
#[wrapper(Deref, Index, RangeOps, AsSlice, BorrowSlice, Hex)]
#[wrapper_mut(DerefMut)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct WitnessScript(ByteStr);

impl From<Vec<u8>> for WitnessScript {
    fn from(vec: Vec<u8>) -> Self { ByteStr::from(vec).into() }
}

impl WitnessScript {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
