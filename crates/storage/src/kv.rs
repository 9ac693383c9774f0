// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL key-value log.
//!
//! Every put appends one line and fsyncs before returning; an in-memory
//! key directory maps each key to the offset of its latest line, so reads
//! are a single seek. Old versions stay in the file until [`KvLog::compact`]
//! rewrites it.
//!
//! Each entry is a single line of JSON:
//! `{"seq":N,"key":"<hex>","value":"<text>"}\n`
//!
//! `seq` is the log's persistent sequence counter as of that write, which
//! gives callers an auto-increment that survives restarts and compaction.

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur in KvLog operations
#[derive(Debug, Error)]
pub enum KvError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Corrupt entry at offset {offset}: {message}")]
    Corrupt { offset: u64, message: String },
    #[error("database is locked by another process: {}", .0.display())]
    Locked(PathBuf),
}

#[derive(Serialize)]
struct RecordRef<'a> {
    seq: u64,
    key: &'a str,
    value: &'a str,
}

#[derive(Deserialize)]
struct Record {
    seq: u64,
    key: String,
    value: String,
}

/// Result of scanning the log from the start.
#[derive(Default)]
struct Scan {
    keydir: BTreeMap<Vec<u8>, u64>,
    sequence: u64,
    stale: usize,
    end: u64,
    corrupt: bool,
}

pub struct KvLog {
    file: File,
    /// Persistent read handle (cloned once at open) for point reads
    read_file: File,
    path: PathBuf,
    /// Held for the lifetime of the log; the advisory lock lives here
    #[allow(dead_code)]
    lock_file: File,
    /// Latest offset for every live key, in key order
    keydir: BTreeMap<Vec<u8>, u64>,
    /// Highest sequence handed out
    sequence: u64,
    /// Superseded lines still in the file
    stale: usize,
    /// Byte length of the file
    end: u64,
}

impl KvLog {
    /// Open or create a log at `path`, taking an exclusive lock on
    /// `<path>.lock`.
    ///
    /// A corrupt tail (torn write, garbage) is rotated to `.bak` and the
    /// valid prefix is kept.
    pub fn open(path: &Path) -> Result<Self, KvError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock_path = lock_path(path);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(KvError::Locked(lock_path));
        }

        let mut file = open_append(path)?;
        let mut scan = Self::scan(&file)?;

        if scan.corrupt {
            let valid_lines = Self::read_valid_lines(&file)?;
            drop(file);

            let bak_path = crate::backup::rotate_bak_path(path);
            warn!(
                path = %path.display(),
                bak = %bak_path.display(),
                valid_entries = valid_lines.len(),
                "Corrupt key-value log detected, rotating to .bak and preserving valid entries",
            );
            std::fs::rename(path, &bak_path)?;

            {
                let mut new_file = File::create(path)?;
                for line in &valid_lines {
                    new_file.write_all(line.as_bytes())?;
                    new_file.write_all(b"\n")?;
                }
                new_file.sync_all()?;
            }

            file = open_append(path)?;
            scan = Self::scan(&file)?;
        }

        let read_file = file.try_clone()?;
        debug!(
            path = %path.display(),
            keys = scan.keydir.len(),
            stale = scan.stale,
            sequence = scan.sequence,
            "opened key-value log",
        );

        Ok(Self {
            file,
            read_file,
            path: path.to_owned(),
            lock_file,
            keydir: scan.keydir,
            sequence: scan.sequence,
            stale: scan.stale,
            end: scan.end,
        })
    }

    /// Build the key directory. Stops at the first unparseable line and
    /// flags it as corrupt.
    fn scan(file: &File) -> Result<Scan, KvError> {
        let mut reader = BufReader::new(file.try_clone()?);
        reader.seek(SeekFrom::Start(0))?;

        let mut scan = Scan::default();
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    scan.corrupt = true;
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                scan.end += bytes_read as u64;
                continue;
            }

            // A missing trailing newline means a torn write.
            let parsed = serde_json::from_str::<Record>(trimmed)
                .ok()
                .filter(|_| line.ends_with('\n'))
                .and_then(|r| decode_key(&r.key).map(|k| (r.seq, k)));
            let Some((seq, key)) = parsed else {
                scan.corrupt = true;
                break;
            };

            scan.sequence = scan.sequence.max(seq);
            if scan.keydir.insert(key, scan.end).is_some() {
                scan.stale += 1;
            }
            scan.end += bytes_read as u64;
        }

        Ok(scan)
    }

    /// Read all valid lines, stopping at the first corrupt entry.
    fn read_valid_lines(file: &File) -> Result<Vec<String>, KvError> {
        let mut reader = BufReader::new(file.try_clone()?);
        reader.seek(SeekFrom::Start(0))?;

        let mut valid_lines = Vec::new();
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidData => break,
                Err(e) => return Err(e.into()),
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !line.ends_with('\n') {
                break;
            }
            match serde_json::from_str::<Record>(trimmed) {
                Ok(r) if decode_key(&r.key).is_some() => valid_lines.push(trimmed.to_string()),
                _ => break,
            }
        }

        Ok(valid_lines)
    }

    /// Reserve the next value of the persistent sequence.
    ///
    /// The counter is written with the next put, so a value is never
    /// handed out twice once anything using it has been stored.
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Raise the sequence to at least `value`, e.g. for a key chosen
    /// elsewhere. Never lowers it.
    pub fn advance_sequence(&mut self, value: u64) {
        self.sequence = self.sequence.max(value);
    }

    /// Append a value for `key` and sync it to disk.
    pub fn put(&mut self, key: &[u8], value: &str) -> Result<(), KvError> {
        let hex = encode_key(key);
        let record = RecordRef {
            seq: self.sequence,
            key: &hex,
            value,
        };
        let mut json_bytes = serde_json::to_vec(&record)?;
        json_bytes.push(b'\n');

        self.file.write_all(&json_bytes)?;
        self.file.sync_data()?;

        let offset = self.end;
        self.end += json_bytes.len() as u64;
        if self.keydir.insert(key.to_vec(), offset).is_some() {
            self.stale += 1;
        }
        Ok(())
    }

    /// Latest value for `key`.
    pub fn get(&self, key: &[u8]) -> Result<Option<String>, KvError> {
        match self.keydir.get(key) {
            Some(&offset) => self.read_at(offset).map(Some),
            None => Ok(None),
        }
    }

    fn read_at(&self, offset: u64) -> Result<String, KvError> {
        let mut reader = BufReader::new(&self.read_file);
        reader.seek(SeekFrom::Start(offset))?;

        let mut line = String::new();
        reader.read_line(&mut line)?;
        let record: Record =
            serde_json::from_str(line.trim()).map_err(|e| KvError::Corrupt {
                offset,
                message: e.to_string(),
            })?;
        Ok(record.value)
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.keydir.contains_key(key)
    }

    /// Every live key with its latest value, in key order.
    pub fn entries(&self) -> Result<Vec<(Vec<u8>, String)>, KvError> {
        self.keydir
            .iter()
            .map(|(key, &offset)| Ok((key.clone(), self.read_at(offset)?)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keydir.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keydir.is_empty()
    }

    /// Number of superseded lines that compaction would drop.
    pub fn stale(&self) -> usize {
        self.stale
    }

    /// Compaction pays off once dead lines outnumber live ones.
    pub fn needs_compaction(&self) -> bool {
        self.stale > 0 && self.stale >= self.keydir.len()
    }

    /// Rewrite the log keeping only the latest line per key.
    ///
    /// Writes a temp file and renames it over the log, so a crash leaves
    /// either the old or the new file intact.
    pub fn compact(&mut self) -> Result<(), KvError> {
        let tmp_path = self.path.with_extension("tmp");

        let mut new_keydir = BTreeMap::new();
        let mut offset = 0u64;
        {
            let mut tmp_file = File::create(&tmp_path)?;
            for (key, value) in self.entries()? {
                let hex = encode_key(&key);
                let record = RecordRef {
                    seq: self.sequence,
                    key: &hex,
                    value: &value,
                };
                let mut json_bytes = serde_json::to_vec(&record)?;
                json_bytes.push(b'\n');
                tmp_file.write_all(&json_bytes)?;
                new_keydir.insert(key, offset);
                offset += json_bytes.len() as u64;
            }
            tmp_file.sync_all()?;
        }

        std::fs::rename(&tmp_path, &self.path)?;

        self.file = open_append(&self.path)?;
        self.read_file = self.file.try_clone()?;
        let dropped = self.stale;
        self.keydir = new_keydir;
        self.stale = 0;
        self.end = offset;

        debug!(path = %self.path.display(), dropped, "compacted key-value log");
        Ok(())
    }

    /// Flush file metadata as well as data.
    pub fn sync(&self) -> Result<(), KvError> {
        self.file.sync_all()?;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
}

fn lock_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.lock"))
}

fn encode_key(key: &[u8]) -> String {
    key.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_key(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
#[path = "kv_tests.rs"]
mod tests;
