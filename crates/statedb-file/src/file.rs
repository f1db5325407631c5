use std::path::Path;
use std::time::SystemTime;

use statedb_engine::{Database, Transaction};
use statedb_log::{magic, Locking, Log, Mode};
use statedb_model::Schema;

use crate::error::{Error, Result};
use crate::policy::CompactionPolicy;
use crate::snapshot::write_snapshot;

/// Options controlling [`DatabaseFile::open`].
pub struct OpenOptions {
    /// If present, open under this schema instead of the on-disk one, in
    /// *converting* mode (unknown tables/columns are silently skipped).
    pub alt_schema: Option<Schema>,
    pub read_only: bool,
    pub locking: Locking,
    pub policy: CompactionPolicy,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            alt_schema: None,
            read_only: false,
            locking: Locking::Auto,
            policy: CompactionPolicy::default(),
        }
    }
}

/// A database bound to its backing log: the owner of both, driving replay,
/// live commits, and compaction.
///
/// The in-memory [`Database`] is surfaced to callers for query execution but
/// is owned here for the duration of the file's lifetime, so compaction can
/// snapshot it consistently; closing the file hands ownership back instead
/// of destroying it.
pub struct DatabaseFile {
    log: Log,
    db: Database,
    converting: bool,
    read_only: bool,
    policy: CompactionPolicy,
    last_compact: SystemTime,
    next_compact: SystemTime,
    n_transactions: u64,
    snapshot_size: u64,
}

impl DatabaseFile {
    /// Create a new database file containing only a schema record.
    pub fn create(path: impl AsRef<Path>, schema: Schema) -> Result<Self> {
        let mut log = Log::open(path, magic::STANDALONE, Mode::CreateExclusive, Locking::Auto)?;
        log.write(&schema.to_json())?;
        log.commit()?;
        let now = SystemTime::now();
        Ok(Self {
            log,
            db: Database::create(schema),
            converting: false,
            read_only: false,
            policy: CompactionPolicy::default(),
            last_compact: now,
            next_compact: now,
            n_transactions: 0,
            snapshot_size: 0,
        })
    }

    /// Open an existing database file, replaying its transaction deltas.
    ///
    /// A log whose replay fails partway through (after record 0) is
    /// truncated at the first bad record: the error is logged and the open
    /// still succeeds with whatever replayed cleanly.
    pub fn open(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let mode = if options.read_only { Mode::ReadOnly } else { Mode::ReadWrite };
        let mut log = Log::open(path, magic::STANDALONE, mode, options.locking)?;

        let record0 = log.read()?.ok_or(Error::MissingSchemaRecord)?;
        let on_disk_schema = Schema::from_json(&record0)?;
        let (schema, converting) = match options.alt_schema {
            Some(alt) => (alt, true),
            None => (on_disk_schema, false),
        };

        let mut db = Database::create(schema);
        let mut n_transactions = 0u64;
        let mut snapshot_size = 0u64;
        let mut record_index = 0u64;

        loop {
            let offset_before = log.read_offset();
            let record = match log.read() {
                Ok(None) => break,
                Ok(Some(record)) => record,
                Err(e) => {
                    log::warn!("statedb: stopping replay at offset {offset_before}: {e}");
                    break;
                }
            };

            let replay_result = statedb_codec::decode(&record, &db, converting).and_then(|txn| txn.commit(&mut db).map_err(Into::into));
            match replay_result {
                Ok(_changes) => {
                    record_index += 1;
                    n_transactions += 1;
                    if record_index == 1 {
                        snapshot_size = log.read_offset().saturating_sub(offset_before);
                    }
                }
                Err(e) => {
                    log::warn!("statedb: dropping malformed record at offset {offset_before}: {e}");
                    log.unread();
                    break;
                }
            }
        }

        let now = SystemTime::now();
        Ok(Self {
            log,
            db,
            converting,
            read_only: options.read_only,
            policy: options.policy,
            last_compact: now,
            next_compact: now,
            n_transactions,
            snapshot_size,
        })
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    pub fn is_converting(&self) -> bool {
        self.converting
    }

    pub fn transaction_count(&self) -> u64 {
        self.n_transactions
    }

    pub fn last_compact(&self) -> SystemTime {
        self.last_compact
    }

    pub fn snapshot_size(&self) -> u64 {
        self.snapshot_size
    }

    /// Apply a transaction's operations, encode the resulting change set,
    /// and append it to the log; possibly triggers compaction.
    pub fn commit(&mut self, txn: Transaction, durable: bool) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnly);
        }

        let comment = txn.comment().map(str::to_string);
        let changes = txn.commit(&mut self.db)?;
        let now_millis = crate::now_millis();

        if let Some(delta) = statedb_codec::encode(&changes, &self.db.schema, comment.as_deref(), now_millis) {
            self.log.write(&delta)?;
            if durable {
                self.log.commit()?;
            }
            self.n_transactions += 1;
        }

        self.maybe_compact();
        Ok(())
    }

    fn maybe_compact(&mut self) {
        let now = SystemTime::now();
        if now < self.next_compact {
            return;
        }
        if !self.policy.should_compact(self.log.offset(), self.n_transactions, self.snapshot_size) {
            return;
        }
        if let Err(e) = self.compact_at(now) {
            log::warn!("statedb: compaction failed, retrying later: {e}");
            self.next_compact = now + self.policy.retry_interval;
        }
    }

    /// Force a compaction regardless of the gate.
    pub fn compact(&mut self) -> Result<()> {
        self.compact_at(SystemTime::now())
    }

    fn compact_at(&mut self, now: SystemTime) -> Result<()> {
        let mut replacement = self.log.replace_start()?;
        let comment = format!(
            "compacted {} table(s)",
            self.db.tables().filter(|(_, t)| !t.is_empty()).count()
        );
        let snapshot_size = write_snapshot(&mut replacement, &self.db, Some(&comment))?;
        self.log.replace_commit(replacement)?;

        self.last_compact = now;
        self.next_compact = now + self.policy.min_interval;
        self.n_transactions = 1;
        self.snapshot_size = snapshot_size;
        Ok(())
    }

    /// Write a fresh snapshot of this database to a different path, leaving
    /// this file's own log untouched.
    pub fn snapshot_to(&self, dst: impl AsRef<Path>) -> Result<()> {
        let mut new_log = Log::open(dst, magic::STANDALONE, Mode::CreateExclusive, Locking::Auto)?;
        write_snapshot(&mut new_log, &self.db, Some("snapshot"))?;
        new_log.close();
        Ok(())
    }

    /// Release the log and hand ownership of the in-memory database back to
    /// the caller.
    pub fn close(self) -> Database {
        self.log.close();
        self.db
    }
}

/// Read just record 0 of a database file as a [`Schema`], without replaying
/// the rest of the log. Backs `db-name`/`db-version`/`db-cksum`.
pub fn peek_schema(path: impl AsRef<Path>) -> Result<Schema> {
    let mut log = Log::open(path, magic::STANDALONE, Mode::ReadOnly, Locking::Auto)?;
    let record0 = log.read()?.ok_or(Error::MissingSchemaRecord)?;
    Ok(Schema::from_json(&record0)?)
}

/// Read a standalone schema file (not a database log): just a bare schema
/// JSON document on disk, no record framing. Backs
/// `schema-name`/`schema-version`/`schema-cksum`.
pub fn read_schema_file(path: impl AsRef<Path>) -> Result<Schema> {
    let bytes = std::fs::read(path.as_ref()).map_err(statedb_log::Error::from)?;
    let json = serde_json::from_slice(&bytes)?;
    Ok(Schema::from_json(&json)?)
}

/// True iff a database currently open under `current` would have to be
/// reopened in converting mode to load `candidate`.
pub fn schema_needs_conversion(current: &Schema, candidate: &Schema) -> bool {
    current != candidate
}
