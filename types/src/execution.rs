use crate::asset::Asset;
use crate::codec::{
    option_encode_size, read_public_keys, read_string, read_strings, read_vec,
    serde_public_key_hex, serde_public_keys_hex, string_encode_size, strings_encode_size,
    vec_encode_size, write_option, write_string, write_strings, write_vec,
};
use crate::constants::{
    MAX_ACTION_GROUPS, MAX_GROUP_KEYS, MAX_ISSUE_NAMES, MAX_NAME_LENGTH, MAX_OWNER_KEYS,
};
use crate::ledger::{Account, Domain, Token};
use crate::permission::{Group, GroupId, KeyWeight, Permission, GROUP_ID_LENGTH};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use serde::{Deserialize, Serialize};

/// Create a domain together with the groups its permissions introduce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDomain {
    pub name: String,
    #[serde(with = "serde_public_key_hex")]
    pub issuer: PublicKey,
    pub groups: Vec<Group>,
    pub issue: Permission,
    pub transfer: Permission,
    pub manage: Permission,
}

/// Issue tokens named `names` in `domain`, all owned by `owner`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTokens {
    pub domain: String,
    pub names: Vec<String>,
    #[serde(with = "serde_public_keys_hex")]
    pub owner: Vec<PublicKey>,
}

/// Hand token `(domain, name)` to a new owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferToken {
    pub domain: String,
    pub name: String,
    #[serde(with = "serde_public_keys_hex")]
    pub to: Vec<PublicKey>,
}

/// Replace an existing group wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateGroup {
    pub id: GroupId,
    #[serde(with = "serde_public_key_hex")]
    pub key: PublicKey,
    pub threshold: u32,
    pub keys: Vec<KeyWeight>,
}

impl UpdateGroup {
    /// The group record this request would store.
    pub fn proposed(&self) -> Group {
        Group {
            id: self.id,
            key: self.key.clone(),
            threshold: self.threshold,
            keys: self.keys.clone(),
        }
    }
}

/// Replace any subset of a domain's permissions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDomain {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub issue: Option<Permission>,
    #[serde(default)]
    pub transfer: Option<Permission>,
    #[serde(default)]
    pub manage: Option<Permission>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccount {
    pub name: String,
    #[serde(with = "serde_public_keys_hex")]
    pub owner: Vec<PublicKey>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOwner {
    pub name: String,
    #[serde(with = "serde_public_keys_hex")]
    pub owner: Vec<PublicKey>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferBalance {
    pub from: String,
    pub to: String,
    pub amount: Asset,
}

/// A decoded, already-authenticated ledger action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[allow(clippy::large_enum_variant)]
pub enum Action {
    /// Binary: [0] [name] [issuer] [groups] [issue] [transfer] [manage]
    CreateDomain(CreateDomain),
    /// Binary: [1] [domain] [names] [owner]
    IssueTokens(IssueTokens),
    /// Binary: [2] [domain] [name] [to]
    TransferToken(TransferToken),
    /// Binary: [3] [id:32] [key] [threshold:u32] [keys]
    UpdateGroup(UpdateGroup),
    /// Binary: [4] [name] [groups] [issue?] [transfer?] [manage?]
    UpdateDomain(UpdateDomain),
    /// Binary: [5] [name] [owner]
    CreateAccount(CreateAccount),
    /// Binary: [6] [name] [owner]
    UpdateOwner(UpdateOwner),
    /// Binary: [7] [from] [to] [amount:u64]
    TransferBalance(TransferBalance),
}

impl Action {
    /// Short, stable name used in logs and rejection events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateDomain(_) => "create-domain",
            Self::IssueTokens(_) => "issue-tokens",
            Self::TransferToken(_) => "transfer-token",
            Self::UpdateGroup(_) => "update-group",
            Self::UpdateDomain(_) => "update-domain",
            Self::CreateAccount(_) => "create-account",
            Self::UpdateOwner(_) => "update-owner",
            Self::TransferBalance(_) => "transfer-balance",
        }
    }
}

impl Write for Action {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::CreateDomain(act) => {
                0u8.write(writer);
                write_string(&act.name, writer);
                act.issuer.write(writer);
                write_vec(&act.groups, writer);
                act.issue.write(writer);
                act.transfer.write(writer);
                act.manage.write(writer);
            }
            Self::IssueTokens(act) => {
                1u8.write(writer);
                write_string(&act.domain, writer);
                write_strings(&act.names, writer);
                write_vec(&act.owner, writer);
            }
            Self::TransferToken(act) => {
                2u8.write(writer);
                write_string(&act.domain, writer);
                write_string(&act.name, writer);
                write_vec(&act.to, writer);
            }
            Self::UpdateGroup(act) => {
                3u8.write(writer);
                act.id.write(writer);
                act.key.write(writer);
                act.threshold.write(writer);
                write_vec(&act.keys, writer);
            }
            Self::UpdateDomain(act) => {
                4u8.write(writer);
                write_string(&act.name, writer);
                write_vec(&act.groups, writer);
                write_option(&act.issue, writer);
                write_option(&act.transfer, writer);
                write_option(&act.manage, writer);
            }
            Self::CreateAccount(act) => {
                5u8.write(writer);
                write_string(&act.name, writer);
                write_vec(&act.owner, writer);
            }
            Self::UpdateOwner(act) => {
                6u8.write(writer);
                write_string(&act.name, writer);
                write_vec(&act.owner, writer);
            }
            Self::TransferBalance(act) => {
                7u8.write(writer);
                write_string(&act.from, writer);
                write_string(&act.to, writer);
                act.amount.write(writer);
            }
        }
    }
}

fn read_option<T: Read<Cfg = ()>>(reader: &mut impl Buf) -> Result<Option<T>, Error> {
    Ok(if bool::read(reader)? {
        Some(T::read(reader)?)
    } else {
        None
    })
}

impl Read for Action {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        let action = match kind {
            0 => Self::CreateDomain(CreateDomain {
                name: read_string(reader, MAX_NAME_LENGTH)?,
                issuer: PublicKey::read(reader)?,
                groups: read_vec(reader, MAX_ACTION_GROUPS)?,
                issue: Permission::read(reader)?,
                transfer: Permission::read(reader)?,
                manage: Permission::read(reader)?,
            }),
            1 => Self::IssueTokens(IssueTokens {
                domain: read_string(reader, MAX_NAME_LENGTH)?,
                names: read_strings(reader, MAX_ISSUE_NAMES, MAX_NAME_LENGTH)?,
                owner: read_public_keys(reader, MAX_OWNER_KEYS)?,
            }),
            2 => Self::TransferToken(TransferToken {
                domain: read_string(reader, MAX_NAME_LENGTH)?,
                name: read_string(reader, MAX_NAME_LENGTH)?,
                to: read_public_keys(reader, MAX_OWNER_KEYS)?,
            }),
            3 => Self::UpdateGroup(UpdateGroup {
                id: GroupId::read(reader)?,
                key: PublicKey::read(reader)?,
                threshold: u32::read(reader)?,
                keys: read_vec(reader, MAX_GROUP_KEYS)?,
            }),
            4 => Self::UpdateDomain(UpdateDomain {
                name: read_string(reader, MAX_NAME_LENGTH)?,
                groups: read_vec(reader, MAX_ACTION_GROUPS)?,
                issue: read_option(reader)?,
                transfer: read_option(reader)?,
                manage: read_option(reader)?,
            }),
            5 => Self::CreateAccount(CreateAccount {
                name: read_string(reader, MAX_NAME_LENGTH)?,
                owner: read_public_keys(reader, MAX_OWNER_KEYS)?,
            }),
            6 => Self::UpdateOwner(UpdateOwner {
                name: read_string(reader, MAX_NAME_LENGTH)?,
                owner: read_public_keys(reader, MAX_OWNER_KEYS)?,
            }),
            7 => Self::TransferBalance(TransferBalance {
                from: read_string(reader, MAX_NAME_LENGTH)?,
                to: read_string(reader, MAX_NAME_LENGTH)?,
                amount: Asset::read(reader)?,
            }),
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(action)
    }
}

impl EncodeSize for Action {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::CreateDomain(act) => {
                    string_encode_size(&act.name)
                        + PublicKey::SIZE
                        + vec_encode_size(&act.groups)
                        + act.issue.encode_size()
                        + act.transfer.encode_size()
                        + act.manage.encode_size()
                }
                Self::IssueTokens(act) => {
                    string_encode_size(&act.domain)
                        + strings_encode_size(&act.names)
                        + vec_encode_size(&act.owner)
                }
                Self::TransferToken(act) => {
                    string_encode_size(&act.domain)
                        + string_encode_size(&act.name)
                        + vec_encode_size(&act.to)
                }
                Self::UpdateGroup(act) => {
                    GROUP_ID_LENGTH
                        + PublicKey::SIZE
                        + u32::SIZE
                        + vec_encode_size(&act.keys)
                }
                Self::UpdateDomain(act) => {
                    string_encode_size(&act.name)
                        + vec_encode_size(&act.groups)
                        + option_encode_size(&act.issue)
                        + option_encode_size(&act.transfer)
                        + option_encode_size(&act.manage)
                }
                Self::CreateAccount(act) => {
                    string_encode_size(&act.name) + vec_encode_size(&act.owner)
                }
                Self::UpdateOwner(act) => {
                    string_encode_size(&act.name) + vec_encode_size(&act.owner)
                }
                Self::TransferBalance(act) => {
                    string_encode_size(&act.from)
                        + string_encode_size(&act.to)
                        + act.amount.encode_size()
                }
            }
    }
}

/// Outcome of applying one action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    DomainCreated {
        name: String,
    },
    TokensIssued {
        domain: String,
        names: Vec<String>,
    },
    TokenTransferred {
        domain: String,
        name: String,
    },
    GroupUpdated {
        id: GroupId,
    },
    DomainUpdated {
        name: String,
    },
    AccountCreated {
        name: String,
    },
    OwnerUpdated {
        name: String,
    },
    BalanceTransferred {
        from: String,
        to: String,
        amount: Asset,
    },
    /// The action failed validation and changed nothing.
    Rejected {
        action: String,
        reason: String,
    },
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Domain by name (tag 0)
    Domain(String),
    /// Token by domain and name (tag 1)
    Token { domain: String, name: String },
    /// Group by id (tag 2)
    Group(GroupId),
    /// Account by name (tag 3)
    Account(String),
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Domain(name) => {
                0u8.write(writer);
                write_string(name, writer);
            }
            Self::Token { domain, name } => {
                1u8.write(writer);
                write_string(domain, writer);
                write_string(name, writer);
            }
            Self::Group(id) => {
                2u8.write(writer);
                id.write(writer);
            }
            Self::Account(name) => {
                3u8.write(writer);
                write_string(name, writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Domain(read_string(reader, MAX_NAME_LENGTH)?),
            1 => Self::Token {
                domain: read_string(reader, MAX_NAME_LENGTH)?,
                name: read_string(reader, MAX_NAME_LENGTH)?,
            },
            2 => Self::Group(GroupId::read(reader)?),
            3 => Self::Account(read_string(reader, MAX_NAME_LENGTH)?),
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Domain(name) | Self::Account(name) => string_encode_size(name),
                Self::Token { domain, name } => {
                    string_encode_size(domain) + string_encode_size(name)
                }
                Self::Group(_) => GROUP_ID_LENGTH,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum Value {
    Domain(Domain),
    Token(Token),
    Group(Group),
    Account(Account),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Domain(domain) => {
                0u8.write(writer);
                domain.write(writer);
            }
            Self::Token(token) => {
                1u8.write(writer);
                token.write(writer);
            }
            Self::Group(group) => {
                2u8.write(writer);
                group.write(writer);
            }
            Self::Account(account) => {
                3u8.write(writer);
                account.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Domain(Domain::read(reader)?),
            1 => Self::Token(Token::read(reader)?),
            2 => Self::Group(Group::read(reader)?),
            3 => Self::Account(Account::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Domain(domain) => domain.encode_size(),
                Self::Token(token) => token.encode_size(),
                Self::Group(group) => group.encode_size(),
                Self::Account(account) => account.encode_size(),
            }
    }
}
