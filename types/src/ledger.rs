//! Records persisted in the ledger store.

use crate::asset::Asset;
use crate::codec::{
    read_public_keys, read_string, serde_public_key_hex, serde_public_keys_hex,
    string_encode_size, vec_encode_size, write_string, write_vec,
};
use crate::constants::{MAX_NAME_LENGTH, MAX_OWNER_KEYS};
use crate::permission::Permission;
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use serde::{Deserialize, Serialize};

/// A namespace of tokens with its own issue, transfer and manage rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    #[serde(with = "serde_public_key_hex")]
    pub issuer: PublicKey,
    /// Ledger time (ms) of creation.
    pub issue_time: u64,
    pub issue: Permission,
    pub transfer: Permission,
    pub manage: Permission,
}

impl Write for Domain {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.name, writer);
        self.issuer.write(writer);
        self.issue_time.write(writer);
        self.issue.write(writer);
        self.transfer.write(writer);
        self.manage.write(writer);
    }
}

impl Read for Domain {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            name: read_string(reader, MAX_NAME_LENGTH)?,
            issuer: PublicKey::read(reader)?,
            issue_time: u64::read(reader)?,
            issue: Permission::read(reader)?,
            transfer: Permission::read(reader)?,
            manage: Permission::read(reader)?,
        })
    }
}

impl EncodeSize for Domain {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.name)
            + PublicKey::SIZE
            + u64::SIZE
            + self.issue.encode_size()
            + self.transfer.encode_size()
            + self.manage.encode_size()
    }
}

/// A non-fungible token, unique by `(domain, name)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub domain: String,
    pub name: String,
    #[serde(with = "serde_public_keys_hex")]
    pub owner: Vec<PublicKey>,
}

impl Write for Token {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.domain, writer);
        write_string(&self.name, writer);
        write_vec(&self.owner, writer);
    }
}

impl Read for Token {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            domain: read_string(reader, MAX_NAME_LENGTH)?,
            name: read_string(reader, MAX_NAME_LENGTH)?,
            owner: read_public_keys(reader, MAX_OWNER_KEYS)?,
        })
    }
}

impl EncodeSize for Token {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.domain)
            + string_encode_size(&self.name)
            + vec_encode_size(&self.owner)
    }
}

/// A balance-holding account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub creator: String,
    pub balance: Asset,
    pub frozen_balance: Asset,
    #[serde(with = "serde_public_keys_hex")]
    pub owner: Vec<PublicKey>,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        write_string(&self.name, writer);
        write_string(&self.creator, writer);
        self.balance.write(writer);
        self.frozen_balance.write(writer);
        write_vec(&self.owner, writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            name: read_string(reader, MAX_NAME_LENGTH)?,
            creator: read_string(reader, MAX_NAME_LENGTH)?,
            balance: Asset::read(reader)?,
            frozen_balance: Asset::read(reader)?,
            owner: read_public_keys(reader, MAX_OWNER_KEYS)?,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        string_encode_size(&self.name)
            + string_encode_size(&self.creator)
            + self.balance.encode_size()
            + self.frozen_balance.encode_size()
            + vec_encode_size(&self.owner)
    }
}
