use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Occurs when an encoded record carries a format version this crate doesn't read.
    OldVersion(u64),
    /// Basic encoding failure: malformed varints, bad string offsets, unknown discriminants.
    BadEncode(String),
    /// Encoded record ended too early.
    LengthTooShort {
        step: &'static str,
        actual: usize,
        expected: usize,
    },
    /// Decoding hit the nesting limit.
    ParseLimit(String),
    /// The record kind marker wasn't one of group, private, or guild channel.
    UnknownKind(u64),
    /// The legacy payload couldn't be turned into a stored message.
    LegacyDecode(serde_json::Error),
    /// Failure within the embedded key-value store.
    Store(sled::Error),
    /// Occurs when a destination rejects a write or commit for reasons of its own.
    Rejected(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::OldVersion(v) => write!(f, "Unsupported data version {}", v),
            Error::BadEncode(ref err) => write!(f, "Basic data encoding failure: {}", err),
            Error::LengthTooShort {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Expected data length {}, but got {} on step [{}]",
                expected, actual, step
            ),
            Error::ParseLimit(ref err) => write!(f, "Hit parsing limit: {}", err),
            Error::UnknownKind(k) => write!(f, "Unknown record kind marker {}", k),
            Error::LegacyDecode(ref err) => write!(f, "Legacy decode failed: {}", err),
            Error::Store(ref err) => write!(f, "Store failure: {}", err),
            Error::Rejected(ref err) => write!(f, "Write rejected: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::LegacyDecode(ref err) => Some(err),
            Error::Store(ref err) => Some(err),
            _ => None,
        }
    }
}

impl std::convert::From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        Self::Store(e)
    }
}

impl std::convert::From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::LegacyDecode(e)
    }
}
