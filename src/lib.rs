//! A compact, self-describing binary encoding for stored chat messages, and the tooling to
//! migrate a key-value store of legacy-encoded messages into it.
//!
//! Each encoded record carries its own string table. Every distinct string in a record is stored
//! once, and every use of it in the record's index data is a varint offset into that table.
//! Integers are little-endian base-128 varints (zig-zag for signed types). Polymorphic segment
//! values are preceded by a one-byte [`Coder`] discriminant; the record structs themselves are
//! written field by field in a fixed order, with a `Struct` or `Nil` discriminant marking whether
//! an optional structure is present.
//!
//! - [`Writer`] / [`encode_message`] produce encoded records.
//! - [`Reader`] / [`decode_message`] read them back.
//! - [`Migrator`] moves a whole store from the legacy format, through a [`LegacyDecoder`].

mod coder;
mod error;
mod legacy;
mod migrate;
mod reader;
mod record;
mod string_table;
mod value;
mod writer;

pub mod store;
pub mod varint;

pub use coder::Coder;
pub use error::{Error, Result};
pub use legacy::{to_legacy_value, JsonLegacyDecoder, LegacyDecoder};
pub use migrate::{FailureCause, MigrationReport, Migrator, RecordFailure};
pub use reader::{decode_message, Reader};
pub use record::{
    GroupMessage, GuildChannelMessage, GuildMessageAttribute, MessageAttribute, PrivateMessage,
    QuotedInfo, RecordKind, StoredMessage,
};
pub use string_table::StringTable;
pub use value::{Content, Msg, Value};
pub use writer::{encode_message, Writer};

/// Format version written at the start of every encoded record.
pub const DATA_VERSION: u64 = 1;

/// Maximum nesting of segment maps the reader will follow.
pub const MAX_DEPTH: usize = 100;
