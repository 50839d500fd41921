//! Weighted-threshold authorization records and their structural validation.
//!
//! A [`Permission`] is a threshold over weighted group references and a [`Group`] is a threshold
//! over weighted public keys. Both are validated by the same rule: entries must be strictly
//! ordered (which also forbids duplicates), every weight must be nonzero, and the weights must sum
//! to at least the threshold. Permissions are ordered by decreasing group id, groups by increasing
//! key.

use crate::codec::{
    hex_decode, hex_encode, read_string, read_vec, serde_public_key_hex, string_encode_size,
    vec_encode_size, write_string, write_vec,
};
use crate::constants::{MAX_GROUP_KEYS, MAX_NAME_LENGTH, MAX_PERMISSION_GROUPS};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{ed25519::PublicKey, sha256::Sha256, Hasher};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error as ThisError;

pub const GROUP_ID_LENGTH: usize = 32;

/// Identifier of a group, derived from the group's originating key.
///
/// The all-zero id is reserved as the owner placeholder: a permission entry that refers to
/// whoever currently owns the token being acted on.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId([u8; GROUP_ID_LENGTH]);

impl GroupId {
    pub const OWNER: Self = Self([0u8; GROUP_ID_LENGTH]);

    pub const fn new(bytes: [u8; GROUP_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derives the id of the group originating from `key`.
    pub fn from_key(key: &PublicKey) -> Self {
        let digest = Sha256::hash(key.as_ref());
        let mut bytes = [0u8; GROUP_ID_LENGTH];
        bytes.copy_from_slice(digest.as_ref());
        Self(bytes)
    }

    pub fn is_owner(&self) -> bool {
        *self == Self::OWNER
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex_encode(&self.0))
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({self})")
    }
}

impl Serialize for GroupId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex_encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for GroupId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex_decode(&s).map_err(serde::de::Error::custom)?;
        let bytes: [u8; GROUP_ID_LENGTH] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid group id length"))?;
        Ok(Self(bytes))
    }
}

impl Write for GroupId {
    fn write(&self, writer: &mut impl BufMut) {
        writer.put_slice(&self.0);
    }
}

impl Read for GroupId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        if reader.remaining() < GROUP_ID_LENGTH {
            return Err(Error::EndOfBuffer);
        }
        let mut bytes = [0u8; GROUP_ID_LENGTH];
        reader.copy_to_slice(&mut bytes);
        Ok(Self(bytes))
    }
}

impl EncodeSize for GroupId {
    fn encode_size(&self) -> usize {
        GROUP_ID_LENGTH
    }
}

/// Reason a weighted-threshold set failed structural validation.
#[derive(Debug, Clone, ThisError, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("threshold must be positive")]
    ZeroThreshold,
    #[error("entry {index} is duplicated or out of order")]
    Unordered { index: usize },
    #[error("entry {index} has zero weight")]
    ZeroWeight { index: usize },
    #[error("total weight {total} is below threshold {threshold}")]
    BelowThreshold { total: u64, threshold: u32 },
}

/// Walks `entries` once, requiring each key to compare as `order` against its predecessor.
fn check_weighted<'a, K: Ord + 'a>(
    entries: impl IntoIterator<Item = (&'a K, u16)>,
    order: Ordering,
    threshold: u32,
) -> Result<(), ThresholdError> {
    let mut total = 0u64;
    let mut prev: Option<&K> = None;
    for (index, (key, weight)) in entries.into_iter().enumerate() {
        if prev.is_some_and(|prev| key.cmp(prev) != order) {
            return Err(ThresholdError::Unordered { index });
        }
        if weight == 0 {
            return Err(ThresholdError::ZeroWeight { index });
        }
        total += u64::from(weight);
        prev = Some(key);
    }
    if total < u64::from(threshold) {
        return Err(ThresholdError::BelowThreshold { total, threshold });
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupWeight {
    pub id: GroupId,
    pub weight: u16,
}

impl GroupWeight {
    pub fn new(id: GroupId, weight: u16) -> Self {
        Self { id, weight }
    }

    /// Reference to the current owner of the object the permission guards.
    pub fn owner(weight: u16) -> Self {
        Self {
            id: GroupId::OWNER,
            weight,
        }
    }
}

impl Write for GroupWeight {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.weight.write(writer);
    }
}

impl Read for GroupWeight {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: GroupId::read(reader)?,
            weight: u16::read(reader)?,
        })
    }
}

impl EncodeSize for GroupWeight {
    fn encode_size(&self) -> usize {
        GROUP_ID_LENGTH + u16::SIZE
    }
}

/// A named threshold over group references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub name: String,
    pub threshold: u32,
    pub groups: Vec<GroupWeight>,
}

impl Permission {
    /// Checks ordering (strictly decreasing ids), weights and the threshold sum.
    ///
    /// A zero threshold is accepted here; whether a role may have one is decided by the caller.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        check_weighted(
            self.groups.iter().map(|g| (&g.id, g.weight)),
            Ordering::Less,
            self.threshold,
        )
    }

    pub fn references_owner(&self) -> bool {
        self.groups.iter().any(|g| g.id.is_owner())
    }
}

impl Write for Permission {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.name, writer);
        self.threshold.write(writer);
        write_vec(&self.groups, writer);
    }
}

impl Read for Permission {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            name: read_string(reader, MAX_NAME_LENGTH)?,
            threshold: u32::read(reader)?,
            groups: read_vec(reader, MAX_PERMISSION_GROUPS)?,
        })
    }
}

impl EncodeSize for Permission {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.name) + u32::SIZE + vec_encode_size(&self.groups)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWeight {
    #[serde(with = "serde_public_key_hex")]
    pub key: PublicKey,
    pub weight: u16,
}

impl KeyWeight {
    pub fn new(key: PublicKey, weight: u16) -> Self {
        Self { key, weight }
    }
}

impl Write for KeyWeight {
    fn write(&self, writer: &mut impl BufMut) {
        self.key.write(writer);
        self.weight.write(writer);
    }
}

impl Read for KeyWeight {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            key: PublicKey::read(reader)?,
            weight: u16::read(reader)?,
        })
    }
}

impl EncodeSize for KeyWeight {
    fn encode_size(&self) -> usize {
        PublicKey::SIZE + u16::SIZE
    }
}

/// A threshold over weighted public keys, addressable by id from any permission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(with = "serde_public_key_hex")]
    pub key: PublicKey,
    pub threshold: u32,
    pub keys: Vec<KeyWeight>,
}

impl Group {
    /// Checks the threshold is positive, keys are strictly increasing, weights are nonzero and
    /// sum to at least the threshold.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if self.threshold == 0 {
            return Err(ThresholdError::ZeroThreshold);
        }
        check_weighted(
            self.keys.iter().map(|k| (&k.key, k.weight)),
            Ordering::Greater,
            self.threshold,
        )
    }

    /// Whether `id` is the one derived from `key`.
    pub fn has_derived_id(&self) -> bool {
        self.id == GroupId::from_key(&self.key)
    }
}

impl Write for Group {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.key.write(writer);
        self.threshold.write(writer);
        write_vec(&self.keys, writer);
    }
}

impl Read for Group {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: GroupId::read(reader)?,
            key: PublicKey::read(reader)?,
            threshold: u32::read(reader)?,
            keys: read_vec(reader, MAX_GROUP_KEYS)?,
        })
    }
}

impl EncodeSize for Group {
    fn encode_size(&self) -> usize {
        GROUP_ID_LENGTH + PublicKey::SIZE + u32::SIZE + vec_encode_size(&self.keys)
    }
}
