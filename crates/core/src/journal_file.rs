//! File-backed JSONL journal with a SHA-256 hash chain.
//!
//! Line 1 is a header carrying `format_version`, `build_id`, and the layout
//! digest; every following line is one input record chained to its
//! predecessor via `hex(SHA-256(body_json || prev_digest))`. Each record is
//! flushed as it is written so a crash loses at most the line in flight, and
//! loading stops with a typed error at the first malformed or chain-broken
//! line.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::journal::{InputJournal, InputPayload, InputRecord};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct FileHeader {
    format_version: u16,
    build_id: String,
    layout_hash: u64,
}

/// The digested portion of a record line, serialized to JSON as the hash
/// input.
#[derive(Serialize)]
struct RecordBody<'a> {
    seq: u64,
    payload: &'a InputPayload,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct FileRecord {
    seq: u64,
    payload: InputPayload,
    prev_digest: String,
    digest: String,
}

/// Previous-digest value for the first record of a chain.
const CHAIN_SEED: &str = "0000000000000000000000000000000000000000000000000000000000000000";

fn record_digest(body_json: &str, prev_digest: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body_json.as_bytes());
    hasher.update(prev_digest.as_bytes());
    let digest = hasher.finalize();
    format!("{digest:064x}")
}

/// Appends session inputs to a JSONL file, one chained record per line.
pub struct JournalWriter {
    writer: BufWriter<File>,
    last_digest: String,
    next_seq: u64,
}

impl JournalWriter {
    /// Create the journal file and write the header line immediately.
    pub fn create(path: &Path, build_id: &str, layout_hash: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);

        let header =
            FileHeader { format_version: 1, build_id: build_id.to_string(), layout_hash };
        let header_json = serde_json::to_string(&header).map_err(io::Error::other)?;
        writeln!(writer, "{header_json}")?;
        writer.flush()?;

        Ok(Self { writer, last_digest: CHAIN_SEED.to_string(), next_seq: 0 })
    }

    /// Append one input and flush it to disk.
    pub fn append(&mut self, payload: &InputPayload) -> io::Result<()> {
        let body = RecordBody { seq: self.next_seq, payload };
        let body_json = serde_json::to_string(&body).map_err(io::Error::other)?;
        let digest = record_digest(&body_json, &self.last_digest);

        let record = FileRecord {
            seq: self.next_seq,
            payload: *payload,
            prev_digest: self.last_digest.clone(),
            digest: digest.clone(),
        };
        let record_json = serde_json::to_string(&record).map_err(io::Error::other)?;
        writeln!(self.writer, "{record_json}")?;
        self.writer.flush()?;

        self.last_digest = digest;
        self.next_seq += 1;
        Ok(())
    }
}

/// Why a journal file could not be loaded in full.
#[derive(Debug)]
pub enum JournalError {
    Io(io::Error),
    Empty,
    BadHeader { line: usize, message: String },
    BadRecord { line: usize, message: String },
    /// The file ended mid-line, for example without a trailing newline.
    Truncated { line: usize },
    /// A prev-digest link or a recomputed digest does not match.
    ChainBroken { line: usize },
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "journal I/O error: {e}"),
            Self::Empty => write!(f, "journal file is empty"),
            Self::BadHeader { line, message } => {
                write!(f, "invalid journal header at line {line}: {message}")
            }
            Self::BadRecord { line, message } => {
                write!(f, "invalid journal record at line {line}: {message}")
            }
            Self::Truncated { line } => write!(f, "journal truncated at line {line}"),
            Self::ChainBroken { line } => {
                write!(f, "SHA-256 chain broken at line {line}")
            }
        }
    }
}

/// Load and validate a JSONL journal written by `JournalWriter`.
pub fn load_journal(path: &Path) -> Result<InputJournal, JournalError> {
    let content = fs::read_to_string(path).map_err(JournalError::Io)?;
    if content.is_empty() {
        return Err(JournalError::Empty);
    }
    let lines: Vec<&str> = content.lines().collect();
    if !content.ends_with('\n') {
        return Err(JournalError::Truncated { line: lines.len() });
    }

    let header: FileHeader = serde_json::from_str(lines[0])
        .map_err(|e| JournalError::BadHeader { line: 1, message: e.to_string() })?;

    let mut journal = InputJournal {
        format_version: header.format_version,
        build_id: header.build_id,
        layout_hash: header.layout_hash,
        records: Vec::new(),
    };

    let mut prev_digest = CHAIN_SEED.to_string();
    let mut next_seq: u64 = 0;

    for (line_index, line) in lines.iter().skip(1).enumerate() {
        let line_number = line_index + 2; // 1-indexed, header is line 1

        let record: FileRecord = serde_json::from_str(line)
            .map_err(|e| JournalError::BadRecord { line: line_number, message: e.to_string() })?;

        if record.seq != next_seq {
            return Err(JournalError::BadRecord {
                line: line_number,
                message: format!("expected seq {next_seq}, found {}", record.seq),
            });
        }
        if record.prev_digest != prev_digest {
            return Err(JournalError::ChainBroken { line: line_number });
        }

        let body = RecordBody { seq: record.seq, payload: &record.payload };
        let body_json = serde_json::to_string(&body)
            .map_err(|e| JournalError::BadRecord { line: line_number, message: e.to_string() })?;
        if record.digest != record_digest(&body_json, &prev_digest) {
            return Err(JournalError::ChainBroken { line: line_number });
        }

        journal.records.push(InputRecord { seq: record.seq, payload: record.payload });
        prev_digest = record.digest;
        next_seq += 1;
    }

    Ok(journal)
}
