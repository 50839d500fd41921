//! Shared binary and JSON encoding helpers.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use commonware_utils::{from_hex, hex};

/// Helper to write a string as length-prefixed UTF-8 bytes.
pub fn write_string(s: &str, writer: &mut impl BufMut) {
    let bytes = s.as_bytes();
    (bytes.len() as u32).write(writer);
    writer.put_slice(bytes);
}

/// Helper to read a string from length-prefixed UTF-8 bytes.
pub fn read_string(reader: &mut impl Buf, max_len: usize) -> Result<String, Error> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(Error::Invalid("String", "too long"));
    }
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|_| Error::Invalid("String", "invalid UTF-8"))
}

/// Helper to get encode size of a string.
pub fn string_encode_size(s: &str) -> usize {
    u32::SIZE + s.len()
}

/// Writes a list of names as a `u32` count followed by each length-prefixed name.
pub fn write_strings(names: &[String], writer: &mut impl BufMut) {
    (names.len() as u32).write(writer);
    for name in names {
        write_string(name, writer);
    }
}

pub fn read_strings(
    reader: &mut impl Buf,
    max_items: usize,
    max_len: usize,
) -> Result<Vec<String>, Error> {
    let count = u32::read(reader)? as usize;
    if count > max_items {
        return Err(Error::Invalid("Vec<String>", "too many items"));
    }
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        names.push(read_string(reader, max_len)?);
    }
    Ok(names)
}

pub fn strings_encode_size(names: &[String]) -> usize {
    u32::SIZE + names.iter().map(|n| string_encode_size(n)).sum::<usize>()
}

/// Writes an optional value as a presence flag followed by the value.
pub fn write_option<T: Write>(value: &Option<T>, writer: &mut impl BufMut) {
    match value {
        Some(value) => {
            true.write(writer);
            value.write(writer);
        }
        None => false.write(writer),
    }
}

pub fn option_encode_size<T: EncodeSize>(value: &Option<T>) -> usize {
    bool::SIZE + value.as_ref().map(EncodeSize::encode_size).unwrap_or(0)
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    hex(bytes)
}

pub(crate) fn hex_decode(s: &str) -> Result<Vec<u8>, String> {
    from_hex(s).ok_or_else(|| "invalid hex string".to_string())
}

pub(crate) mod serde_public_key_hex {
    use super::{hex_decode, hex_encode};
    use commonware_codec::ReadExt;
    use commonware_cryptography::ed25519::PublicKey;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(public_key: &PublicKey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex_encode(public_key.as_ref()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<PublicKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex_decode(&s).map_err(serde::de::Error::custom)?;
        let mut reader = bytes.as_slice();
        PublicKey::read(&mut reader).map_err(|_| serde::de::Error::custom("invalid public key"))
    }
}

pub(crate) mod serde_public_keys_hex {
    use super::{hex_decode, hex_encode};
    use commonware_codec::ReadExt;
    use commonware_cryptography::ed25519::PublicKey;
    use serde::{Deserialize, Deserializer, Serialize as _, Serializer};

    pub fn serialize<S>(keys: &[PublicKey], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded: Vec<String> = keys.iter().map(|pk| hex_encode(pk.as_ref())).collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<PublicKey>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        let mut keys = Vec::with_capacity(raw.len());
        for s in raw {
            let bytes = hex_decode(&s).map_err(serde::de::Error::custom)?;
            let mut reader = bytes.as_slice();
            keys.push(
                PublicKey::read(&mut reader)
                    .map_err(|_| serde::de::Error::custom("invalid public key"))?,
            );
        }
        Ok(keys)
    }
}

/// Writes a list as a `u32` count followed by each item.
pub fn write_vec<T: Write>(items: &[T], writer: &mut impl BufMut) {
    (items.len() as u32).write(writer);
    for item in items {
        item.write(writer);
    }
}

pub fn read_vec<T: Read<Cfg = ()>>(
    reader: &mut impl Buf,
    max_items: usize,
) -> Result<Vec<T>, Error> {
    let count = u32::read(reader)? as usize;
    if count > max_items {
        return Err(Error::Invalid("Vec", "too many items"));
    }
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(T::read(reader)?);
    }
    Ok(items)
}

pub fn vec_encode_size<T: EncodeSize>(items: &[T]) -> usize {
    u32::SIZE + items.iter().map(EncodeSize::encode_size).sum::<usize>()
}

/// Reads an owner key list, rejecting lists longer than `max_keys`.
pub fn read_public_keys(
    reader: &mut impl Buf,
    max_keys: usize,
) -> Result<Vec<PublicKey>, Error> {
    read_vec(reader, max_keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    #[test]
    fn read_string_rejects_too_long() {
        let mut buf = BytesMut::new();
        (5u32).write(&mut buf);
        buf.extend_from_slice(b"hello");

        let mut reader = buf.as_ref();
        let err = read_string(&mut reader, 4).expect_err("should reject too-long string");
        assert!(matches!(err, Error::Invalid("String", "too long")));
    }

    #[test]
    fn read_string_rejects_truncated_buffers() {
        let mut buf = BytesMut::new();
        (3u32).write(&mut buf);
        buf.extend_from_slice(b"ab");

        let mut reader = buf.as_ref();
        let err = read_string(&mut reader, 10).expect_err("should reject truncated buffer");
        assert!(matches!(err, Error::EndOfBuffer));
    }

    #[test]
    fn read_strings_rejects_too_many_items() {
        let mut buf = BytesMut::new();
        write_strings(&["a".to_string(), "b".to_string(), "c".to_string()], &mut buf);

        let mut reader = buf.as_ref();
        let err = read_strings(&mut reader, 2, 8).expect_err("should reject item count");
        assert!(matches!(err, Error::Invalid("Vec<String>", "too many items")));
    }

    #[test]
    fn read_strings_handles_malformed_inputs() {
        let mut rng = StdRng::seed_from_u64(0x7e55_e7a0);
        for _ in 0..500 {
            let len = (rng.next_u32() as usize) % 256;
            let mut buf = vec![0u8; len];
            rng.fill_bytes(&mut buf);
            let mut reader = buf.as_slice();
            if let Ok(names) = read_strings(&mut reader, 16, 32) {
                assert!(names.len() <= 16);
                assert!(names.iter().all(|n| n.len() <= 32));
            }
        }
    }
}
