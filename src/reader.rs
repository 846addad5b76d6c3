//! Decoding of the indexed format. Mirrors [`Writer`][crate::writer::Writer] step for step.

use crate::coder::Coder;
use crate::error::{Error, Result};
use crate::record::*;
use crate::value::{Msg, Value};
use crate::varint::*;
use crate::{DATA_VERSION, MAX_DEPTH};

#[derive(Clone, Debug)]
pub struct Reader<'a> {
    strings: &'a [u8],
    data: &'a [u8],
    depth: usize,
}

impl<'a> Reader<'a> {
    /// Parse the header of an encoded record and set up to read its index data.
    pub fn new(buf: &'a [u8]) -> Result<Reader<'a>> {
        let mut buf = buf;
        let version = read_uvarint(&mut buf)?;
        if version != DATA_VERSION {
            return Err(Error::OldVersion(version));
        }
        let strings_len = read_uvarint(&mut buf)?;
        let data_len = read_uvarint(&mut buf)?;
        let total = usize::try_from(strings_len)
            .ok()
            .zip(usize::try_from(data_len).ok())
            .and_then(|(s, d)| s.checked_add(d).map(|t| (s, t)));
        let (strings_len, total) = match total {
            Some(v) => v,
            None => {
                return Err(Error::BadEncode(String::from(
                    "section lengths overflow the address space",
                )))
            }
        };
        if total > buf.len() {
            return Err(Error::LengthTooShort {
                step: "get record sections",
                actual: buf.len(),
                expected: total,
            });
        }
        if total < buf.len() {
            return Err(Error::BadEncode(format!(
                "{} trailing bytes after record",
                buf.len() - total
            )));
        }
        let (strings, data) = buf.split_at(strings_len);
        Ok(Reader {
            strings,
            data,
            depth: 0,
        })
    }

    /// Index data not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        self.data
    }

    pub fn coder(&mut self) -> Result<Coder> {
        let (&n, data) = self.data.split_first().ok_or(Error::LengthTooShort {
            step: "decode coder",
            actual: 0,
            expected: 1,
        })?;
        self.data = data;
        Coder::from_u8(n).ok_or_else(|| Error::BadEncode(format!("Got unrecognized coder {}", n)))
    }

    pub fn uvarint(&mut self) -> Result<u64> {
        read_uvarint(&mut self.data)
    }

    pub fn varint(&mut self) -> Result<i64> {
        read_varint(&mut self.data)
    }

    pub fn int32(&mut self) -> Result<i32> {
        read_varint32(&mut self.data)
    }

    pub fn uint32(&mut self) -> Result<u32> {
        read_uvarint32(&mut self.data)
    }

    pub fn int64(&mut self) -> Result<i64> {
        self.varint()
    }

    pub fn uint64(&mut self) -> Result<u64> {
        self.uvarint()
    }

    /// Read a string offset and resolve it against the string data.
    pub fn string(&mut self) -> Result<&'a str> {
        let off = self.uvarint()?;
        let off = usize::try_from(off)
            .ok()
            .filter(|&o| o < self.strings.len())
            .ok_or_else(|| {
                Error::BadEncode(format!(
                    "string offset {} outside of {} bytes of string data",
                    off,
                    self.strings.len()
                ))
            })?;
        let strings = self.strings;
        let mut s = &strings[off..];
        let len = read_uvarint(&mut s)?;
        if len > s.len() as u64 {
            return Err(Error::LengthTooShort {
                step: "get string content",
                actual: s.len(),
                expected: len as usize,
            });
        }
        std::str::from_utf8(&s[..len as usize]).map_err(|e| Error::BadEncode(format!("{}", e)))
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::ParseLimit("Depth limit exceeded".to_string()));
        }
        Ok(())
    }

    fn count(&mut self, step: &'static str) -> Result<usize> {
        let n = self.uvarint()?;
        // Every element takes at least one byte.
        if n > self.data.len() as u64 {
            return Err(Error::LengthTooShort {
                step,
                actual: self.data.len(),
                expected: usize::try_from(n).unwrap_or(usize::MAX),
            });
        }
        Ok(n as usize)
    }

    /// Read a segment map that has no discriminant in front of it.
    pub fn msg(&mut self) -> Result<Msg> {
        let len = self.count("decode msg length")?;
        let mut msg = Msg::new();
        for _ in 0..len {
            let k = self.string()?;
            let v = self.value()?;
            if msg.insert(k, v).is_some() {
                return Err(Error::BadEncode(format!("Duplicate segment key {:?}", k)));
            }
        }
        Ok(msg)
    }

    pub fn array_msg(&mut self) -> Result<Vec<Msg>> {
        let len = self.count("decode msg array length")?;
        let mut array = Vec::with_capacity(len);
        for _ in 0..len {
            array.push(self.msg()?);
        }
        Ok(array)
    }

    /// Read a polymorphic value.
    pub fn value(&mut self) -> Result<Value> {
        let v = match self.coder()? {
            Coder::Nil => Value::Nil,
            Coder::Int => Value::Int(self.varint()?),
            Coder::Uint => Value::Uint(self.uvarint()?),
            Coder::Int32 => Value::Int32(self.int32()?),
            Coder::Uint32 => Value::Uint32(self.uint32()?),
            Coder::Int64 => Value::Int64(self.int64()?),
            Coder::Uint64 => Value::Uint64(self.uint64()?),
            Coder::String => Value::String(self.string()?.to_string()),
            Coder::Msg => {
                self.enter()?;
                let m = self.msg()?;
                self.depth -= 1;
                Value::Msg(m)
            }
            Coder::ArrayMsg => {
                self.enter()?;
                let a = self.array_msg()?;
                self.depth -= 1;
                Value::ArrayMsg(a)
            }
            Coder::Struct => {
                return Err(Error::BadEncode(String::from(
                    "Struct coder found where a value was expected",
                )))
            }
        };
        Ok(v)
    }

    /// Read the discriminant in front of an optional structure.
    fn presence(&mut self) -> Result<bool> {
        match self.coder()? {
            Coder::Struct => Ok(true),
            Coder::Nil => Ok(false),
            c => Err(Error::BadEncode(format!(
                "Expected Struct or Nil coder, got {:?}",
                c
            ))),
        }
    }

    pub fn message_attribute(&mut self) -> Result<Option<MessageAttribute>> {
        if !self.presence()? {
            return Ok(None);
        }
        Ok(Some(MessageAttribute {
            message_seq: self.int32()?,
            internal_id: self.int32()?,
            sender_uin: self.int64()?,
            sender_name: self.string()?.to_string(),
            timestamp: self.int64()?,
        }))
    }

    pub fn guild_message_attribute(&mut self) -> Result<Option<GuildMessageAttribute>> {
        if !self.presence()? {
            return Ok(None);
        }
        Ok(Some(GuildMessageAttribute {
            message_seq: self.uint64()?,
            internal_id: self.uint64()?,
            sender_tiny_id: self.uint64()?,
            sender_name: self.string()?.to_string(),
            timestamp: self.int64()?,
        }))
    }

    pub fn quoted_info(&mut self) -> Result<Option<QuotedInfo>> {
        if !self.presence()? {
            return Ok(None);
        }
        Ok(Some(QuotedInfo {
            prev_id: self.string()?.to_string(),
            prev_global_id: self.int32()?,
            quoted_content: self.array_msg()?,
        }))
    }

    pub fn group_message(&mut self) -> Result<Option<GroupMessage>> {
        if !self.presence()? {
            return Ok(None);
        }
        Ok(Some(GroupMessage {
            id: self.string()?.to_string(),
            global_id: self.int32()?,
            attribute: self.message_attribute()?,
            sub_type: self.string()?.to_string(),
            quoted_info: self.quoted_info()?,
            group_code: self.int64()?,
            anonymous_id: self.string()?.to_string(),
            content: self.array_msg()?,
        }))
    }

    pub fn private_message(&mut self) -> Result<Option<PrivateMessage>> {
        if !self.presence()? {
            return Ok(None);
        }
        Ok(Some(PrivateMessage {
            id: self.string()?.to_string(),
            global_id: self.int32()?,
            attribute: self.message_attribute()?,
            sub_type: self.string()?.to_string(),
            quoted_info: self.quoted_info()?,
            session_uin: self.int64()?,
            target_uin: self.int64()?,
            content: self.array_msg()?,
        }))
    }

    pub fn guild_channel_message(&mut self) -> Result<Option<GuildChannelMessage>> {
        if !self.presence()? {
            return Ok(None);
        }
        Ok(Some(GuildChannelMessage {
            id: self.string()?.to_string(),
            attribute: self.guild_message_attribute()?,
            guild_id: self.uint64()?,
            channel_id: self.uint64()?,
            quoted_info: self.quoted_info()?,
            content: self.array_msg()?,
        }))
    }

    /// Read the kind marker and the record it announces.
    pub fn stored_message(&mut self) -> Result<StoredMessage> {
        let kind = RecordKind::try_from(self.uvarint()?)?;
        Ok(match kind {
            RecordKind::Group => StoredMessage::Group(self.group_message()?),
            RecordKind::Private => StoredMessage::Private(self.private_message()?),
            RecordKind::GuildChannel => StoredMessage::GuildChannel(self.guild_channel_message()?),
        })
    }
}

/// Decode a complete encoded record.
pub fn decode_message(buf: &[u8]) -> Result<StoredMessage> {
    let mut reader = Reader::new(buf)?;
    let m = reader.stored_message()?;
    if !reader.remaining().is_empty() {
        return Err(Error::BadEncode(format!(
            "{} unread bytes after record",
            reader.remaining().len()
        )));
    }
    Ok(m)
}
