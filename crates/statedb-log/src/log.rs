use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde_json::Value;
use sha1::{Digest, Sha1};
use tempfile::{NamedTempFile, TempPath};

use crate::error::{Error, Result};

/// Header lines are bounded so a corrupt or foreign file can't make us
/// allocate an unbounded buffer while hunting for a newline.
const MAX_HEADER_LEN: usize = 256;

/// How a [`Log`] may be opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    ReadOnly,
    ReadWrite,
    /// Fails if the path already exists.
    CreateExclusive,
}

/// Advisory file locking policy for [`Log::open`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locking {
    Yes,
    No,
    /// Lock iff opening for write.
    Auto,
}

impl Locking {
    fn should_lock(self, mode: Mode) -> bool {
        match self {
            Locking::Yes => true,
            Locking::No => false,
            Locking::Auto => mode != Mode::ReadOnly,
        }
    }
}

/// An open log file.
///
/// Holds two independent handles to the same file: one used for positioned,
/// unbuffered reads (so [`Log::unread`] is just "rewind a cursor"), and one
/// buffered writer appending at EOF. Neither aliases the other's notion of
/// position, unlike a single `BufReader` over a file shared with a writer.
pub struct Log {
    final_path: PathBuf,
    temp: Option<TempPath>,
    magic: &'static str,
    mode: Mode,
    locking: Locking,
    reader: File,
    writer: Option<io::BufWriter<File>>,
    read_pos: u64,
    last_record_start: Option<u64>,
    write_pos: u64,
    _lock: Option<File>,
}

impl Log {
    /// Open the log at `path` with the given `magic`, `mode` and `locking`.
    pub fn open(path: impl AsRef<Path>, magic: &'static str, mode: Mode, locking: Locking) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if mode == Mode::CreateExclusive && path.exists() {
            return Err(Error::AlreadyExists(path));
        }

        let mut open_opts = OpenOptions::new();
        match mode {
            Mode::ReadOnly => {
                open_opts.read(true);
            }
            Mode::ReadWrite => {
                open_opts.read(true).write(true).create(true);
            }
            Mode::CreateExclusive => {
                open_opts.read(true).write(true).create_new(true);
            }
        }
        let file = open_opts.open(&path)?;
        let write_pos = file.metadata()?.len();

        let lock = if locking.should_lock(mode) {
            Some(lock_file(&path, mode)?)
        } else {
            None
        };

        let reader = file.try_clone()?;
        let writer = if mode == Mode::ReadOnly {
            None
        } else {
            Some(io::BufWriter::new(file))
        };

        log::debug!("opened log {} at offset {}", path.display(), write_pos);

        Ok(Self {
            final_path: path,
            temp: None,
            magic,
            mode,
            locking,
            reader,
            writer,
            read_pos: 0,
            last_record_start: None,
            write_pos,
            _lock: lock,
        })
    }

    /// The path this log observes. While a replacement log created by
    /// [`Log::replace_start`] is pending, this is the path it will be
    /// persisted to on [`Log::replace_commit`], not its current location.
    pub fn path(&self) -> &Path {
        &self.final_path
    }

    /// Read the next record's JSON payload, or `None` at end-of-file.
    ///
    /// On an integrity failure the log position is left just before the bad
    /// record, so a subsequent `read` (after fixing the file, or none at
    /// all) observes the same failure again rather than skipping past it.
    pub fn read(&mut self) -> Result<Option<Value>> {
        let start = self.read_pos;
        self.reader.seek(SeekFrom::Start(start))?;

        let mut header = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte)? {
                0 if header.is_empty() => return Ok(None),
                0 => {
                    return Err(Error::Truncated {
                        offset: start,
                        expected: 0,
                    })
                }
                _ => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    header.push(byte[0]);
                    if header.len() > MAX_HEADER_LEN {
                        return Err(Error::BadHeader {
                            offset: start,
                            reason: "header line exceeds maximum length".into(),
                        });
                    }
                }
            }
        }
        let header_len = header.len() as u64 + 1;
        let header = String::from_utf8(header).map_err(|_| Error::BadHeader {
            offset: start,
            reason: "header is not valid UTF-8".into(),
        })?;

        let mut parts = header.splitn(3, ' ');
        let magic = parts.next().unwrap_or_default();
        let len_str = parts.next().ok_or_else(|| Error::BadHeader {
            offset: start,
            reason: "missing length field".into(),
        })?;
        let sha_str = parts.next().ok_or_else(|| Error::BadHeader {
            offset: start,
            reason: "missing checksum field".into(),
        })?;

        if magic != self.magic {
            return Err(Error::MagicMismatch {
                offset: start,
                expected: self.magic,
                found: magic.to_string(),
            });
        }
        let len: u64 = len_str.parse().map_err(|_| Error::BadHeader {
            offset: start,
            reason: format!("invalid length field {len_str:?}"),
        })?;
        if sha_str.len() != 40 || !sha_str.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::BadHeader {
                offset: start,
                reason: format!("invalid checksum field {sha_str:?}"),
            });
        }

        let remaining = self.reader.metadata()?.len().saturating_sub(start + header_len);
        if len > remaining {
            return Err(Error::Truncated {
                offset: start,
                expected: len,
            });
        }

        let mut payload = vec![0u8; len as usize];
        if let Err(e) = self.reader.read_exact(&mut payload) {
            return Err(match e.kind() {
                io::ErrorKind::UnexpectedEof => Error::Truncated {
                    offset: start,
                    expected: len,
                },
                _ => e.into(),
            });
        }
        let mut trailing = [0u8; 1];
        match self.reader.read_exact(&mut trailing) {
            Ok(()) if trailing[0] == b'\n' => {}
            Ok(()) => {
                return Err(Error::BadHeader {
                    offset: start,
                    reason: "record is missing its trailing newline".into(),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(Error::Truncated {
                    offset: start,
                    expected: 1,
                })
            }
            Err(e) => return Err(e.into()),
        }

        let digest = hex_digest(&payload);
        if digest != sha_str {
            return Err(Error::ChecksumMismatch { offset: start });
        }

        let value: Value = serde_json::from_slice(&payload).map_err(|source| Error::InvalidJson { offset: start, source })?;

        self.last_record_start = Some(start);
        self.read_pos = start + header_len + len + 1;

        Ok(Some(value))
    }

    /// Push back the most recently read record so the next [`Log::read`]
    /// returns it again.
    ///
    /// Panics if called without a preceding successful `read`, or twice in a
    /// row without an intervening `read` -- there is at most one record to
    /// push back at a time.
    pub fn unread(&mut self) {
        let start = self.last_record_start.take().expect("unread called without a prior read");
        self.read_pos = start;
    }

    /// Append a record. Buffered; not guaranteed durable until [`Log::commit`].
    pub fn write(&mut self, value: &Value) -> Result<()> {
        let payload = serde_json::to_vec(value)?;
        let digest = hex_digest(&payload);

        let writer = self.writer.as_mut().ok_or(Error::ReadOnly)?;
        write!(writer, "{} {} {}\n", self.magic, payload.len(), digest)?;
        writer.write_all(&payload)?;
        writer.write_all(b"\n")?;

        self.write_pos += self.magic.len() as u64 + 1 + count_digits(payload.len() as u64) + 1 + 40 + 1 + payload.len() as u64 + 1;
        Ok(())
    }

    /// `fsync` the underlying file.
    pub fn commit(&mut self) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(Error::ReadOnly)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Byte position just past the last successfully written record.
    pub fn offset(&self) -> u64 {
        self.write_pos
    }

    /// Byte position just past the last successfully read record. Distinct
    /// from [`Log::offset`]: replaying an existing log advances this
    /// without appending anything, so callers measuring how much of the
    /// file a given record occupied during replay (e.g. the snapshot-size
    /// bookkeeping in `statedb-file`) want this, not the write cursor.
    pub fn read_offset(&self) -> u64 {
        self.read_pos
    }

    /// Start a replacement log: a sibling temporary file in the same
    /// directory, opened for write with the same magic. Write the
    /// replacement contents into the returned [`Log`], then pass it to
    /// [`Log::replace_commit`] to swap it in atomically.
    pub fn replace_start(&self) -> Result<Log> {
        let dir = self.final_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let named = NamedTempFile::new_in(dir)?;
        let (file, temp_path) = named.into_parts();
        let reader = file.try_clone()?;
        let writer = io::BufWriter::new(file);

        Ok(Log {
            final_path: self.final_path.clone(),
            temp: Some(temp_path),
            magic: self.magic,
            mode: Mode::ReadWrite,
            locking: Locking::No,
            reader,
            writer: Some(writer),
            read_pos: 0,
            last_record_start: None,
            write_pos: 0,
            _lock: None,
        })
    }

    /// Atomically swap `new_log`'s file into this log's path, reassigning
    /// `self` to observe the new file. On failure the original file is
    /// untouched.
    pub fn replace_commit(&mut self, mut new_log: Log) -> Result<()> {
        new_log.commit()?;
        let temp = new_log
            .temp
            .take()
            .expect("replace_commit called with a log that was not created by replace_start");

        temp.persist(&self.final_path).map_err(|e| e.error)?;
        if let Some(dir) = self.final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Ok(dir_file) = File::open(dir) {
                let _ = dir_file.sync_all();
            }
        }

        let file = OpenOptions::new().read(true).write(true).open(&self.final_path)?;
        let write_pos = file.metadata()?.len();
        let lock = if self.locking.should_lock(self.mode) {
            Some(lock_file(&self.final_path, self.mode)?)
        } else {
            None
        };

        self.reader = file.try_clone()?;
        self.writer = Some(io::BufWriter::new(file));
        self.read_pos = 0;
        self.last_record_start = None;
        self.write_pos = write_pos;
        self._lock = lock;

        log::debug!("replaced log {} ({} bytes)", self.final_path.display(), write_pos);
        Ok(())
    }

    /// Release OS resources and the advisory lock, if any.
    pub fn close(self) {}
}

/// Read just the magic token of the first record's header, without
/// validating the rest of the file. Used to dispatch between the
/// standalone and clustered formats before choosing which magic to open
/// with.
pub fn peek_magic(path: impl AsRef<Path>) -> Result<String> {
    let mut file = File::open(path.as_ref())?;
    let mut header = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match file.read(&mut byte)? {
            0 => {
                return Err(Error::Truncated {
                    offset: 0,
                    expected: 1,
                })
            }
            _ if byte[0] == b'\n' || byte[0] == b' ' => break,
            _ => {
                header.push(byte[0]);
                if header.len() > MAX_HEADER_LEN {
                    return Err(Error::BadHeader {
                        offset: 0,
                        reason: "header line exceeds maximum length".into(),
                    });
                }
            }
        }
    }
    String::from_utf8(header).map_err(|_| Error::BadHeader {
        offset: 0,
        reason: "magic is not valid UTF-8".into(),
    })
}

fn lock_file(path: &Path, mode: Mode) -> Result<File> {
    let file = File::open(path).or_else(|_| OpenOptions::new().read(true).write(true).create(true).open(path))?;
    let result = if mode == Mode::ReadOnly {
        file.try_lock_shared()
    } else {
        file.try_lock_exclusive()
    };
    result.map_err(|_| {
        Error::Io(io::Error::new(
            io::ErrorKind::WouldBlock,
            format!("{} is locked by another process", path.display()),
        ))
    })?;
    Ok(file)
}

fn hex_digest(payload: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(payload);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(40);
    for byte in digest {
        write!(out, "{byte:02x}").unwrap();
    }
    out
}

fn count_digits(mut n: u64) -> u64 {
    if n == 0 {
        return 1;
    }
    let mut count = 0;
    while n > 0 {
        n /= 10;
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enable_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const MAGIC: &str = "TESTLOG";

    #[test]
    fn write_read_roundtrip() {
        enable_logging();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");

        let mut log = Log::open(&path, MAGIC, Mode::CreateExclusive, Locking::Yes).unwrap();
        log.write(&json!({"a": 1})).unwrap();
        log.write(&json!({"b": [1, 2, 3]})).unwrap();
        log.commit().unwrap();

        assert_eq!(log.read().unwrap(), Some(json!({"a": 1})));
        assert_eq!(log.read().unwrap(), Some(json!({"b": [1, 2, 3]})));
        assert_eq!(log.read().unwrap(), None);
    }

    #[test]
    fn unread_replays_the_same_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        let mut log = Log::open(&path, MAGIC, Mode::CreateExclusive, Locking::No).unwrap();
        log.write(&json!(1)).unwrap();
        log.write(&json!(2)).unwrap();
        log.commit().unwrap();

        assert_eq!(log.read().unwrap(), Some(json!(1)));
        assert_eq!(log.read().unwrap(), Some(json!(2)));
        log.unread();
        assert_eq!(log.read().unwrap(), Some(json!(2)));
        assert_eq!(log.read().unwrap(), None);
    }

    #[test]
    fn create_exclusive_fails_if_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        Log::open(&path, MAGIC, Mode::CreateExclusive, Locking::No).unwrap();
        let err = Log::open(&path, MAGIC, Mode::CreateExclusive, Locking::No).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));
    }

    #[test]
    fn checksum_mismatch_is_detected_and_position_does_not_advance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        {
            let mut log = Log::open(&path, MAGIC, Mode::CreateExclusive, Locking::No).unwrap();
            log.write(&json!("hello")).unwrap();
            log.commit().unwrap();
        }
        // Flip a byte inside the payload.
        let mut bytes = fs::read(&path).unwrap();
        let payload_start = bytes.iter().position(|&b| b == b'\n').unwrap() + 1;
        bytes[payload_start] ^= 0xff;
        fs::write(&path, &bytes).unwrap();

        let mut log = Log::open(&path, MAGIC, Mode::ReadOnly, Locking::No).unwrap();
        let err = log.read().unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { offset: 0 }));
        let err2 = log.read().unwrap_err();
        assert!(matches!(err2, Error::ChecksumMismatch { offset: 0 }));
    }

    #[test]
    fn magic_mismatch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        {
            let mut log = Log::open(&path, "OTHER", Mode::CreateExclusive, Locking::No).unwrap();
            log.write(&json!(1)).unwrap();
            log.commit().unwrap();
        }
        let mut log = Log::open(&path, MAGIC, Mode::ReadOnly, Locking::No).unwrap();
        let err = log.read().unwrap_err();
        assert!(matches!(err, Error::MagicMismatch { .. }));
    }

    #[test]
    fn truncated_tail_is_reported_without_mutating_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        {
            let mut log = Log::open(&path, MAGIC, Mode::CreateExclusive, Locking::No).unwrap();
            log.write(&json!(1)).unwrap();
            log.write(&json!(2)).unwrap();
            log.commit().unwrap();
        }
        let len = fs::metadata(&path).unwrap().len();
        let mut file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(len - 1).unwrap();
        drop(file);

        let mut log = Log::open(&path, MAGIC, Mode::ReadOnly, Locking::No).unwrap();
        assert_eq!(log.read().unwrap(), Some(json!(1)));
        let err = log.read().unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));
        let contents_after = fs::read(&path).unwrap();
        assert_eq!(contents_after.len(), (len - 1) as usize);
    }

    #[test]
    fn replace_start_commit_swaps_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        let mut log = Log::open(&path, MAGIC, Mode::CreateExclusive, Locking::No).unwrap();
        log.write(&json!("old")).unwrap();
        log.write(&json!("old2")).unwrap();
        log.commit().unwrap();

        let mut replacement = log.replace_start().unwrap();
        replacement.write(&json!("new")).unwrap();
        log.replace_commit(replacement).unwrap();

        assert_eq!(log.read().unwrap(), Some(json!("new")));
        assert_eq!(log.read().unwrap(), None);

        // Reopening from disk confirms the swap was durable.
        let mut reopened = Log::open(&path, MAGIC, Mode::ReadOnly, Locking::No).unwrap();
        assert_eq!(reopened.read().unwrap(), Some(json!("new")));
    }

    #[test]
    fn peek_magic_reads_just_the_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.db");
        let mut log = Log::open(&path, "SOMEMAGIC", Mode::CreateExclusive, Locking::No).unwrap();
        log.write(&json!(1)).unwrap();
        log.commit().unwrap();

        assert_eq!(peek_magic(&path).unwrap(), "SOMEMAGIC");
    }
}
