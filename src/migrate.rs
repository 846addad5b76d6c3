//! Store-to-store migration from the legacy format into the indexed format.
//!
//! Every source record is decoded with the [`LegacyDecoder`], re-encoded with a fresh
//! [`Writer`][crate::writer::Writer] session, and put into the destination under the same key.
//! All puts go through one destination transaction, committed once at the end. A record that
//! fails to decode or write is reported and skipped; it never stops the run.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::legacy::LegacyDecoder;
use crate::record::RecordKind;
use crate::store::{DestinationStore, SourceStore, Transaction};
use crate::writer::encode_message;

/// Why a single record couldn't be migrated.
#[derive(Debug)]
pub enum FailureCause {
    /// The leading kind byte wasn't a known record kind.
    UnknownKind(u8),
    /// The legacy decoder rejected the payload.
    Decode { kind: RecordKind, error: Error },
    /// The destination rejected the encoded record.
    Write(Error),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FailureCause::UnknownKind(k) => write!(f, "unknown record kind marker {}", k),
            FailureCause::Decode { kind, ref error } => {
                write!(f, "decode {} message failed: {}", kind.name(), error)
            }
            FailureCause::Write(ref error) => write!(f, "put to destination failed: {}", error),
        }
    }
}

#[derive(Debug)]
pub struct RecordFailure {
    pub key: Vec<u8>,
    pub cause: FailureCause,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "record \"{}\": {}", self.key.escape_ascii(), self.cause)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Records written to the destination.
    pub migrated: usize,
    /// Records with an empty value, which are not carried over.
    pub skipped: usize,
    /// Failed records, in source order.
    pub failures: Vec<RecordFailure>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Migrator<D> {
    decoder: D,
}

impl<D: LegacyDecoder> Migrator<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Convert one legacy store value. Returns `None` for an empty value.
    pub fn convert(&self, value: &[u8]) -> Result<Option<Vec<u8>>, FailureCause> {
        let (&marker, payload) = match value.split_first() {
            Some(v) => v,
            None => return Ok(None),
        };
        let kind = RecordKind::from_u8(marker).ok_or(FailureCause::UnknownKind(marker))?;
        let message = self
            .decoder
            .decode(kind, payload)
            .map_err(|error| FailureCause::Decode { kind, error })?;
        if message.kind() != kind {
            return Err(FailureCause::Decode {
                kind,
                error: Error::BadEncode(format!(
                    "decoder produced a {} message",
                    message.kind().name()
                )),
            });
        }
        Ok(Some(encode_message(&message)))
    }

    /// Migrate every record of `source` into `destination`.
    ///
    /// Per-record failures are collected in the report. An `Err` means the run as a whole can't
    /// be trusted: the source couldn't be read, or the destination transaction couldn't be
    /// opened or committed.
    pub fn run<S, T>(&self, source: &S, destination: &T) -> Result<MigrationReport>
    where
        S: SourceStore,
        T: DestinationStore,
    {
        info!("migration started");
        let mut txn = destination.transaction()?;
        let mut report = MigrationReport::default();

        for record in source.records() {
            let (key, value) = record?;
            let cause = match self.convert(&value) {
                Ok(None) => {
                    debug!(key = %key.escape_ascii(), "skipping empty record");
                    report.skipped += 1;
                    continue;
                }
                Ok(Some(encoded)) => match txn.put(&key, &encoded) {
                    Ok(()) => {
                        debug!(key = %key.escape_ascii(), bytes = encoded.len(), "record migrated");
                        report.migrated += 1;
                        continue;
                    }
                    Err(e) => FailureCause::Write(e),
                },
                Err(cause) => cause,
            };
            let failure = RecordFailure { key, cause };
            warn!("{}", failure);
            report.failures.push(failure);
        }

        txn.commit()?;
        info!(
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failures.len(),
            "migration finished"
        );
        Ok(report)
    }
}
