//! Stored chat message records.
//!
//! Field order in each struct matches the order the fields are written in; a reader of the
//! encoded form has no field names, only positions. Optional sub-structures are `Option`s and
//! are encoded as a bare `nil` when absent.
//!
//! The serde field names are those of the legacy store's records.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::value::Content;

/// Which kind of message a record holds. Stored as the first byte of every legacy value and as
/// the first uvarint of every encoded index stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Group,
    Private,
    GuildChannel,
}

impl RecordKind {
    pub fn from_u8(n: u8) -> Option<RecordKind> {
        match n {
            0 => Some(RecordKind::Group),
            1 => Some(RecordKind::Private),
            2 => Some(RecordKind::GuildChannel),
            _ => None,
        }
    }

    pub fn into_u8(self) -> u8 {
        match self {
            RecordKind::Group => 0,
            RecordKind::Private => 1,
            RecordKind::GuildChannel => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Group => "group",
            RecordKind::Private => "private",
            RecordKind::GuildChannel => "guild channel",
        }
    }
}

impl From<RecordKind> for u8 {
    fn from(val: RecordKind) -> u8 {
        val.into_u8()
    }
}

impl TryFrom<u64> for RecordKind {
    type Error = Error;

    fn try_from(n: u64) -> Result<Self, Error> {
        if n > u8::MAX as u64 {
            return Err(Error::UnknownKind(n));
        }
        RecordKind::from_u8(n as u8).ok_or(Error::UnknownKind(n))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttribute {
    #[serde(rename = "MessageSeq")]
    pub message_seq: i32,
    #[serde(rename = "InternalID")]
    pub internal_id: i32,
    #[serde(rename = "SenderUin")]
    pub sender_uin: i64,
    #[serde(rename = "SenderName")]
    pub sender_name: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMessageAttribute {
    #[serde(rename = "MessageSeq")]
    pub message_seq: u64,
    #[serde(rename = "InternalID")]
    pub internal_id: u64,
    #[serde(rename = "SenderTinyID")]
    pub sender_tiny_id: u64,
    #[serde(rename = "SenderName")]
    pub sender_name: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
}

/// A reference to an earlier message that this one replies to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotedInfo {
    #[serde(rename = "PrevID")]
    pub prev_id: String,
    #[serde(rename = "PrevGlobalID")]
    pub prev_global_id: i32,
    #[serde(rename = "QuotedContent", default)]
    pub quoted_content: Content,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupMessage {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "GlobalID")]
    pub global_id: i32,
    #[serde(rename = "Attribute", default)]
    pub attribute: Option<MessageAttribute>,
    #[serde(rename = "SubType")]
    pub sub_type: String,
    #[serde(rename = "QuotedInfo", default)]
    pub quoted_info: Option<QuotedInfo>,
    #[serde(rename = "GroupCode")]
    pub group_code: i64,
    #[serde(rename = "AnonymousID", default)]
    pub anonymous_id: String,
    #[serde(rename = "Content", default)]
    pub content: Content,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrivateMessage {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "GlobalID")]
    pub global_id: i32,
    #[serde(rename = "Attribute", default)]
    pub attribute: Option<MessageAttribute>,
    #[serde(rename = "SubType")]
    pub sub_type: String,
    #[serde(rename = "QuotedInfo", default)]
    pub quoted_info: Option<QuotedInfo>,
    #[serde(rename = "SessionUin")]
    pub session_uin: i64,
    #[serde(rename = "TargetUin")]
    pub target_uin: i64,
    #[serde(rename = "Content", default)]
    pub content: Content,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GuildChannelMessage {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Attribute", default)]
    pub attribute: Option<GuildMessageAttribute>,
    #[serde(rename = "GuildID")]
    pub guild_id: u64,
    #[serde(rename = "ChannelID")]
    pub channel_id: u64,
    #[serde(rename = "QuotedInfo", default)]
    pub quoted_info: Option<QuotedInfo>,
    #[serde(rename = "Content", default)]
    pub content: Content,
}

/// A record of any kind. The inner `None` is a record that was stored as null; it still carries
/// its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum StoredMessage {
    Group(Option<GroupMessage>),
    Private(Option<PrivateMessage>),
    GuildChannel(Option<GuildChannelMessage>),
}

impl StoredMessage {
    pub fn kind(&self) -> RecordKind {
        match self {
            StoredMessage::Group(_) => RecordKind::Group,
            StoredMessage::Private(_) => RecordKind::Private,
            StoredMessage::GuildChannel(_) => RecordKind::GuildChannel,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            StoredMessage::Group(m) => m.is_none(),
            StoredMessage::Private(m) => m.is_none(),
            StoredMessage::GuildChannel(m) => m.is_none(),
        }
    }
}

impl From<GroupMessage> for StoredMessage {
    fn from(m: GroupMessage) -> Self {
        StoredMessage::Group(Some(m))
    }
}

impl From<PrivateMessage> for StoredMessage {
    fn from(m: PrivateMessage) -> Self {
        StoredMessage::Private(Some(m))
    }
}

impl From<GuildChannelMessage> for StoredMessage {
    fn from(m: GuildChannelMessage) -> Self {
        StoredMessage::GuildChannel(Some(m))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kind_markers() {
        assert_eq!(RecordKind::from_u8(0), Some(RecordKind::Group));
        assert_eq!(RecordKind::from_u8(1), Some(RecordKind::Private));
        assert_eq!(RecordKind::from_u8(2), Some(RecordKind::GuildChannel));
        assert_eq!(RecordKind::from_u8(3), None);
        for kind in [RecordKind::Group, RecordKind::Private, RecordKind::GuildChannel] {
            assert_eq!(RecordKind::from_u8(kind.into()), Some(kind));
        }
    }

    #[test]
    fn kind_from_wide() {
        assert_eq!(RecordKind::try_from(2u64).unwrap(), RecordKind::GuildChannel);
        assert!(matches!(
            RecordKind::try_from(258u64),
            Err(Error::UnknownKind(258))
        ));
    }

    #[test]
    fn legacy_field_names() {
        let json = r#"{
            "ID": "m1",
            "GlobalID": 7,
            "Attribute": null,
            "SubType": "normal",
            "GroupCode": 123456,
            "Content": [{"text": {"string": "hi"}}]
        }"#;
        let m: GroupMessage = serde_json::from_str(json).unwrap();
        assert_eq!(m.id, "m1");
        assert_eq!(m.global_id, 7);
        assert!(m.attribute.is_none());
        assert!(m.quoted_info.is_none());
        assert_eq!(m.anonymous_id, "");
        assert_eq!(m.content.len(), 1);
    }
}
