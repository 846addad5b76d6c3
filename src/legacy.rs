//! The boundary to the legacy record format.
//!
//! A legacy store value is `[kind: 1 byte][payload]`. How the payload is decoded is up to the
//! [`LegacyDecoder`] handed to the migrator.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::record::{RecordKind, StoredMessage};

pub trait LegacyDecoder {
    /// Decode a legacy payload of the given kind.
    fn decode(&self, kind: RecordKind, payload: &[u8]) -> Result<StoredMessage>;
}

impl<F> LegacyDecoder for F
where
    F: Fn(RecordKind, &[u8]) -> Result<StoredMessage>,
{
    fn decode(&self, kind: RecordKind, payload: &[u8]) -> Result<StoredMessage> {
        self(kind, payload)
    }
}

/// Reads legacy payloads exported as JSON, using the legacy records' field names. A `null`
/// payload is a record stored as null.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonLegacyDecoder;

impl LegacyDecoder for JsonLegacyDecoder {
    fn decode(&self, kind: RecordKind, payload: &[u8]) -> Result<StoredMessage> {
        Ok(match kind {
            RecordKind::Group => StoredMessage::Group(serde_json::from_slice(payload)?),
            RecordKind::Private => StoredMessage::Private(serde_json::from_slice(payload)?),
            RecordKind::GuildChannel => {
                StoredMessage::GuildChannel(serde_json::from_slice(payload)?)
            }
        })
    }
}

/// Produce a complete legacy store value (kind byte and JSON payload) for a message.
pub fn to_legacy_value(m: &StoredMessage) -> Result<Vec<u8>> {
    fn payload<T: Serialize>(buf: &mut Vec<u8>, x: &Option<T>) -> Result<()> {
        serde_json::to_writer(buf, x).map_err(Error::LegacyDecode)
    }
    let mut buf = vec![m.kind().into_u8()];
    match m {
        StoredMessage::Group(x) => payload(&mut buf, x)?,
        StoredMessage::Private(x) => payload(&mut buf, x)?,
        StoredMessage::GuildChannel(x) => payload(&mut buf, x)?,
    }
    Ok(buf)
}
