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

use core::fmt::{self, Display, Formatter};
use core::num::ParseIntError;
use core::str::FromStr;

use amplify::{hex, Bytes4, Wrapper};

/// Constant determining BIP32 boundary for u32 values after which the index
/// is treated as hardened.
pub const HARDENED_INDEX_BOUNDARY: u32 = 1 << 31;

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum IndexParseError {
    /// invalid index string representation - {0}
    #[from]
    Parse(ParseIntError),

    /// index {0} exceeds the maximum child number of 2^31-1
    OutOfBoundary(u32),
}

/// Index of a single BIP32 derivation step, which may be hardened or
/// unhardened.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct DerivationIndex(u32);

impl DerivationIndex {
    /// Constructs index from a raw `u32` value, as present in BIP32 key
    /// serialization.
    pub const fn from_index(index: u32) -> Self { Self(index) }

    /// Constructs unhardened index from a child number.
    ///
    /// Child numbers must be below 2^31; the most significant bit of larger
    /// values is discarded.
    pub const fn normal(child_number: u32) -> Self { Self(child_number & !HARDENED_INDEX_BOUNDARY) }

    /// Constructs hardened index from a child number.
    ///
    /// Child numbers must be below 2^31; the most significant bit of larger
    /// values is discarded.
    pub const fn hardened(child_number: u32) -> Self {
        Self(child_number | HARDENED_INDEX_BOUNDARY)
    }

    /// Returns raw index value, as present in BIP32 key serialization.
    pub const fn index(self) -> u32 { self.0 }

    /// Returns child number, i.e. the index value with the hardening bit
    /// stripped off.
    pub const fn child_number(self) -> u32 { self.0 & !HARDENED_INDEX_BOUNDARY }

    pub const fn is_hardened(self) -> bool { self.0 & HARDENED_INDEX_BOUNDARY != 0 }
}

impl Display for DerivationIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.child_number(), f)?;
        if self.is_hardened() {
            f.write_str(if f.alternate() { "'" } else { "h" })?;
        }
        Ok(())
    }
}

impl FromStr for DerivationIndex {
    type Err = IndexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (s, hardened) = match s.strip_suffix(['h', 'H', '\'']) {
            Some(s) => (s, true),
            None => (s, false),
        };
        let child_number = u32::from_str(s)?;
        if child_number >= HARDENED_INDEX_BOUNDARY {
            return Err(IndexParseError::OutOfBoundary(child_number));
        }
        Ok(match hardened {
            true => Self::hardened(child_number),
            false => Self::normal(child_number),
        })
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum DerivationParseError {
    /// unable to parse derivation path '{0}' - {1}
    InvalidIndex(String, IndexParseError),
    /// invalid derivation path format '{0}'
    InvalidFormat(String),
}

/// Derivation path from a master extended key down to a concrete public key.
#[derive(Wrapper, WrapperMut, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, From)]
#[wrapper(Deref)]
#[wrapper_mut(DerefMut)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct DerivationPath(Vec<DerivationIndex>);

impl From<&[DerivationIndex]> for DerivationPath {
    fn from(path: &[DerivationIndex]) -> Self { Self(path.to_vec()) }
}

impl Display for DerivationPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            f.write_str("/")?;
            Display::fmt(segment, f)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = DerivationParseError;

    fn from_str(mut s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('/') {
            s = &s[1..];
        }
        let inner = s
            .split('/')
            .map(DerivationIndex::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| DerivationParseError::InvalidIndex(s.to_owned(), err))?;
        if inner.is_empty() {
            return Err(DerivationParseError::InvalidFormat(s.to_owned()));
        }
        Ok(Self(inner))
    }
}

impl IntoIterator for DerivationPath {
    type Item = DerivationIndex;
    type IntoIter = std::vec::IntoIter<DerivationIndex>;

    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl<'path> IntoIterator for &'path DerivationPath {
    type Item = DerivationIndex;
    type IntoIter = std::iter::Copied<std::slice::Iter<'path, DerivationIndex>>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter().copied() }
}

impl FromIterator<DerivationIndex> for DerivationPath {
    fn from_iter<T: IntoIterator<Item = DerivationIndex>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl DerivationPath {
    /// Constructs empty derivation path.
    pub fn new() -> Self { Self(vec![]) }
}

/// Fingerprint of the master extended public key, given by the first four
/// bytes of its identity hash.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default, Debug, Display, From)]
#[wrapper(RangeOps, Hex, FromStr)]
#[display(LowerHex)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct Fingerprint(
    #[from]
    #[from([u8; 4])]
    Bytes4,
);

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] { self.0.as_ref() }
}

impl From<Fingerprint> for [u8; 4] {
    fn from(value: Fingerprint) -> Self { value.0.into_inner() }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum OriginParseError {
    /// invalid derivation path - {0}
    #[from]
    DerivationPath(DerivationParseError),

    /// invalid master key fingerprint - {0}
    #[from]
    InvalidMasterFp(hex::Error),
}

/// Information on the genesis of a public key: the master key fingerprint and
/// the derivation path leading from the master to the key.
#[derive(Getters, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display("{master_fp}{derivation}", alt = "{master_fp}{derivation:#}")]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct KeyOrigin {
    #[getter(as_copy)]
    master_fp: Fingerprint,
    derivation: DerivationPath,
}

impl FromStr for KeyOrigin {
    type Err = OriginParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (master_fp, path) = match s.split_once('/') {
            None => (Fingerprint::from_str(s)?, ""),
            Some(("00000000", p)) | Some(("m", p)) => (Fingerprint::default(), p),
            Some((fp, p)) => (Fingerprint::from_str(fp)?, p),
        };
        let derivation = match path.is_empty() {
            true => DerivationPath::new(),
            false => DerivationPath::from_str(path)?,
        };
        Ok(KeyOrigin {
            master_fp,
            derivation,
        })
    }
}

impl KeyOrigin {
    pub fn new(master_fp: Fingerprint, derivation: DerivationPath) -> Self {
        KeyOrigin {
            master_fp,
            derivation,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn index_display_fromstr() {
        let index = DerivationIndex::hardened(86);
        assert_eq!(index.to_string(), "86h");
        assert_eq!(format!("{index:#}"), "86'");
        assert_eq!(DerivationIndex::from_str("86h"), Ok(index));
        assert_eq!(DerivationIndex::from_str("86H"), Ok(index));
        assert_eq!(DerivationIndex::from_str("86'"), Ok(index));

        let index = DerivationIndex::normal(10);
        assert_eq!(index.to_string(), "10");
        assert_eq!(DerivationIndex::from_str("10"), Ok(index));

        assert_eq!(
            DerivationIndex::from_str("2147483648"),
            Err(IndexParseError::OutOfBoundary(HARDENED_INDEX_BOUNDARY))
        );
        assert!(matches!(DerivationIndex::from_str("x"), Err(IndexParseError::Parse(_))));
    }

    #[test]
    fn index_hardening_bit() {
        let index = DerivationIndex::hardened(0);
        assert!(index.is_hardened());
        assert_eq!(index.index(), HARDENED_INDEX_BOUNDARY);
        assert_eq!(index.child_number(), 0);

        let index = DerivationIndex::from_index(0x80000056);
        assert!(index.is_hardened());
        assert_eq!(index.child_number(), 0x56);

        let index = DerivationIndex::normal(0x56);
        assert!(!index.is_hardened());
        assert_eq!(index.index(), 0x56);
    }

    #[test]
    fn path_display_fromstr() {
        let path = DerivationPath::from_str("86h/1h/0h/0/5").unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.to_string(), "/86h/1h/0h/0/5");
        assert_eq!(format!("{path:#}"), "/86'/1'/0'/0/5");
        assert_eq!(DerivationPath::from_str("/86h/1h/0h/0/5").unwrap(), path);

        assert!(DerivationPath::from_str("").is_err());
        assert!(DerivationPath::from_str("86x/1").is_err());
    }

    #[test]
    fn origin_display_fromstr() {
        let origin = KeyOrigin::from_str("8f54e2b9/86h/1h/0h/0/5").unwrap();
        assert_eq!(origin.master_fp().to_string(), "8f54e2b9");
        assert_eq!(origin.derivation().len(), 5);
        assert_eq!(origin.to_string(), "8f54e2b9/86h/1h/0h/0/5");
        assert_eq!(KeyOrigin::from_str(&origin.to_string()).unwrap(), origin);

        let origin = KeyOrigin::from_str("m/0h").unwrap();
        assert_eq!(origin.master_fp(), Fingerprint::default());
        assert_eq!(origin.derivation().len(), 1);
    }

    #[test]
    fn fingerprint_raw_bytes() {
        let fp = Fingerprint::from([0x8F, 0x54, 0xE2, 0xB9]);
        assert_eq!(<[u8; 4]>::from(fp), [0x8F, 0x54, 0xE2, 0xB9]);
    }
}
