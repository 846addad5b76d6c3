//! Encoding of stored messages into the indexed format.
//!
//! An encoded record is laid out as (all integers are uvarints):
//!
//! ```text
//! | version | string data length | index data length | string data | index data |
//! ```
//!
//! The string data is the session's [`StringTable`]. The index data starts with the record kind
//! marker, followed by the record itself. Polymorphic values are a [`Coder`] byte and a payload;
//! strings in the index data are offsets into the string data.

use crate::coder::Coder;
use crate::record::*;
use crate::string_table::StringTable;
use crate::value::{Msg, Value};
use crate::varint::{write_uvarint, write_varint};
use crate::DATA_VERSION;

/// An encoding session for one record.
#[derive(Debug, Default)]
pub struct Writer {
    data: Vec<u8>,
    strings: StringTable,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coder(&mut self, c: Coder) {
        self.data.push(c.into());
    }

    pub fn uvarint(&mut self, x: u64) {
        write_uvarint(&mut self.data, x);
    }

    pub fn varint(&mut self, x: i64) {
        write_varint(&mut self.data, x);
    }

    pub fn nil(&mut self) {
        self.coder(Coder::Nil);
    }

    pub fn int32(&mut self, x: i32) {
        self.varint(x as i64);
    }

    pub fn uint32(&mut self, x: u32) {
        self.uvarint(x as u64);
    }

    pub fn int64(&mut self, x: i64) {
        self.varint(x);
    }

    pub fn uint64(&mut self, x: u64) {
        self.uvarint(x);
    }

    pub fn string(&mut self, s: &str) {
        self.strings.encode(&mut self.data, s);
    }

    /// Write a segment map without its discriminant.
    pub fn msg(&mut self, m: &Msg) {
        self.uvarint(m.len() as u64);
        for (k, v) in m.iter() {
            self.string(k);
            self.value(v);
        }
    }

    /// Write a sequence of segment maps without a discriminant. Elements carry no discriminant
    /// either.
    pub fn array_msg(&mut self, a: &[Msg]) {
        self.uvarint(a.len() as u64);
        for m in a {
            self.msg(m);
        }
    }

    /// Write a polymorphic value: its discriminant, then its payload.
    pub fn value(&mut self, v: &Value) {
        match v {
            Value::Nil => self.nil(),
            Value::Int(x) => {
                self.coder(Coder::Int);
                self.int64(*x);
            }
            Value::Uint(x) => {
                self.coder(Coder::Uint);
                self.uint64(*x);
            }
            Value::Int32(x) => {
                self.coder(Coder::Int32);
                self.int32(*x);
            }
            Value::Uint32(x) => {
                self.coder(Coder::Uint32);
                self.uint32(*x);
            }
            Value::Int64(x) => {
                self.coder(Coder::Int64);
                self.int64(*x);
            }
            Value::Uint64(x) => {
                self.coder(Coder::Uint64);
                self.uint64(*x);
            }
            Value::String(s) => {
                self.coder(Coder::String);
                self.string(s);
            }
            Value::Msg(m) => {
                self.coder(Coder::Msg);
                self.msg(m);
            }
            Value::ArrayMsg(a) => {
                self.coder(Coder::ArrayMsg);
                self.array_msg(a);
            }
        }
    }

    /// Write the discriminant for an optional structure. Returns the structure if its fields
    /// should follow.
    fn presence<'a, T>(&mut self, x: Option<&'a T>) -> Option<&'a T> {
        match x {
            Some(x) => {
                self.coder(Coder::Struct);
                Some(x)
            }
            None => {
                self.nil();
                None
            }
        }
    }

    pub fn message_attribute(&mut self, x: Option<&MessageAttribute>) {
        let x = match self.presence(x) {
            Some(x) => x,
            None => return,
        };
        self.int32(x.message_seq);
        self.int32(x.internal_id);
        self.int64(x.sender_uin);
        self.string(&x.sender_name);
        self.int64(x.timestamp);
    }

    pub fn guild_message_attribute(&mut self, x: Option<&GuildMessageAttribute>) {
        let x = match self.presence(x) {
            Some(x) => x,
            None => return,
        };
        self.uint64(x.message_seq);
        self.uint64(x.internal_id);
        self.uint64(x.sender_tiny_id);
        self.string(&x.sender_name);
        self.int64(x.timestamp);
    }

    pub fn quoted_info(&mut self, x: Option<&QuotedInfo>) {
        let x = match self.presence(x) {
            Some(x) => x,
            None => return,
        };
        self.string(&x.prev_id);
        self.int32(x.prev_global_id);
        self.array_msg(&x.quoted_content);
    }

    pub fn group_message(&mut self, x: Option<&GroupMessage>) {
        let x = match self.presence(x) {
            Some(x) => x,
            None => return,
        };
        self.string(&x.id);
        self.int32(x.global_id);
        self.message_attribute(x.attribute.as_ref());
        self.string(&x.sub_type);
        self.quoted_info(x.quoted_info.as_ref());
        self.int64(x.group_code);
        self.string(&x.anonymous_id);
        self.array_msg(&x.content);
    }

    pub fn private_message(&mut self, x: Option<&PrivateMessage>) {
        let x = match self.presence(x) {
            Some(x) => x,
            None => return,
        };
        self.string(&x.id);
        self.int32(x.global_id);
        self.message_attribute(x.attribute.as_ref());
        self.string(&x.sub_type);
        self.quoted_info(x.quoted_info.as_ref());
        self.int64(x.session_uin);
        self.int64(x.target_uin);
        self.array_msg(&x.content);
    }

    pub fn guild_channel_message(&mut self, x: Option<&GuildChannelMessage>) {
        let x = match self.presence(x) {
            Some(x) => x,
            None => return,
        };
        self.string(&x.id);
        self.guild_message_attribute(x.attribute.as_ref());
        self.uint64(x.guild_id);
        self.uint64(x.channel_id);
        self.quoted_info(x.quoted_info.as_ref());
        self.array_msg(&x.content);
    }

    /// Write the kind marker followed by the record.
    pub fn stored_message(&mut self, m: &StoredMessage) {
        self.uvarint(m.kind().into_u8() as u64);
        match m {
            StoredMessage::Group(x) => self.group_message(x.as_ref()),
            StoredMessage::Private(x) => self.private_message(x.as_ref()),
            StoredMessage::GuildChannel(x) => self.guild_channel_message(x.as_ref()),
        }
    }

    /// The index data written so far.
    pub fn index_data(&self) -> &[u8] {
        &self.data
    }

    pub fn string_data(&self) -> &[u8] {
        self.strings.data()
    }

    /// Finish the session and produce the complete encoded record.
    pub fn into_bytes(self) -> Vec<u8> {
        let strings = self.strings.into_data();
        let mut out = Vec::with_capacity(3 * 2 + strings.len() + self.data.len());
        write_uvarint(&mut out, DATA_VERSION);
        write_uvarint(&mut out, strings.len() as u64);
        write_uvarint(&mut out, self.data.len() as u64);
        out.extend_from_slice(&strings);
        out.extend_from_slice(&self.data);
        out
    }
}

/// Encode one stored message with a fresh session.
pub fn encode_message(m: &StoredMessage) -> Vec<u8> {
    let mut w = Writer::new();
    w.stored_message(m);
    w.into_bytes()
}
