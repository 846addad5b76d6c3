//! Source and destination stores.
//!
//! The migrator only needs ordered iteration over the source and a transactional writer on the
//! destination. [`SledStore`] provides both on top of an embedded sled database.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

pub type Record = (Vec<u8>, Vec<u8>);

pub trait SourceStore {
    /// Every record in key order.
    fn records(&self) -> Box<dyn Iterator<Item = Result<Record>> + '_>;
}

pub trait DestinationStore {
    type Txn: Transaction;

    /// Open a transaction. Nothing put through it is visible until it commits.
    fn transaction(&self) -> Result<Self::Txn>;

    /// Flush and close the store.
    fn close(self) -> Result<()>;
}

pub trait Transaction {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    fn commit(self) -> Result<()>;
}

/// A sled database, used through its default tree.
///
/// A transaction stages every put in one in-memory [`sled::Batch`] and applies it atomically on
/// commit, so memory use during a migration grows with the total size of the migrated records.
#[derive(Clone, Debug)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!(path = %path.as_ref().display(), "opening store");
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// A store that lives only as long as this handle.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// The value stored under `key`, read outside any transaction.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    /// Store a value immediately, bypassing the transaction batch.
    pub fn insert(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl SourceStore for SledStore {
    fn records(&self) -> Box<dyn Iterator<Item = Result<Record>> + '_> {
        Box::new(self.db.iter().map(|r| {
            r.map(|(k, v)| (k.to_vec(), v.to_vec()))
                .map_err(Error::from)
        }))
    }
}

/// Puts staged in a sled batch, applied atomically on commit. The batch holds every staged
/// key and value in memory until then.
pub struct SledTransaction {
    tree: sled::Tree,
    batch: sled::Batch,
    staged: usize,
}

impl Transaction for SledTransaction {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.batch.insert(key, value);
        self.staged += 1;
        Ok(())
    }

    fn commit(self) -> Result<()> {
        debug!(puts = self.staged, "committing batch");
        self.tree.apply_batch(self.batch)?;
        self.tree.flush()?;
        Ok(())
    }
}

impl DestinationStore for SledStore {
    type Txn = SledTransaction;

    fn transaction(&self) -> Result<SledTransaction> {
        Ok(SledTransaction {
            tree: (*self.db).clone(),
            batch: sled::Batch::default(),
            staged: 0,
        })
    }

    fn close(self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
