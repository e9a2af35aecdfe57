//! Host inputs persisted as JSONL with a SHA-256 hash chain.
//!
//! Line 1 is a header carrying the seed, tick length and content hash. Every
//! following line is one [`HostInput`] plus `prev_sha256_hex`/`sha256_hex`.
//! A run that ends cleanly appends a footer with the final tick count.
//! Loading stops at the first line that fails to parse or breaks the chain.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::journal::{HostInput, InputJournal, InputRecord, JOURNAL_FORMAT_VERSION};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct FileHeader {
    format_version: u16,
    build_id: String,
    content_hash: u64,
    seed: u64,
    tick_ms: u32,
}

#[derive(Serialize)]
struct RecordBody<'a> {
    seq: u64,
    tick: u64,
    input: &'a HostInput,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "line", rename_all = "snake_case")]
enum FileLine {
    Input {
        seq: u64,
        tick: u64,
        input: HostInput,
        prev_sha256_hex: String,
        sha256_hex: String,
    },
    End {
        run_ticks: u64,
        prev_sha256_hex: String,
        sha256_hex: String,
    },
}

const INITIAL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

fn chain_sha256(body_json: &str, prev_sha256_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body_json.as_bytes());
    hasher.update(prev_sha256_hex.as_bytes());
    format!("{:064x}", hasher.finalize())
}

fn end_body(run_ticks: u64) -> String {
    format!("{{\"run_ticks\":{run_ticks}}}")
}

pub struct JournalWriter {
    writer: BufWriter<File>,
    last_sha256_hex: String,
    next_seq: u64,
}

impl JournalWriter {
    pub fn create(
        path: &Path,
        seed: u64,
        tick_ms: u32,
        build_id: &str,
        content_hash: u64,
    ) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        let header = FileHeader {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: build_id.to_string(),
            content_hash,
            seed,
            tick_ms,
        };
        writeln!(writer, "{}", serde_json::to_string(&header).map_err(io::Error::other)?)?;
        writer.flush()?;
        Ok(Self { writer, last_sha256_hex: INITIAL_HASH.to_string(), next_seq: 0 })
    }

    /// Reopens a journal for appending; the chain state comes from [`LoadedJournal`].
    pub fn resume(path: &Path, last_sha256_hex: String, next_seq: u64) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self { writer: BufWriter::new(file), last_sha256_hex, next_seq })
    }

    /// Appends one input and flushes, so a crash loses at most the current line.
    pub fn append(&mut self, tick: u64, input: &HostInput) -> io::Result<()> {
        let body = RecordBody { seq: self.next_seq, tick, input };
        let body_json = serde_json::to_string(&body).map_err(io::Error::other)?;
        let sha256_hex = chain_sha256(&body_json, &self.last_sha256_hex);
        let line = FileLine::Input {
            seq: self.next_seq,
            tick,
            input: input.clone(),
            prev_sha256_hex: self.last_sha256_hex.clone(),
            sha256_hex: sha256_hex.clone(),
        };
        self.write_line(&line)?;
        self.last_sha256_hex = sha256_hex;
        self.next_seq += 1;
        Ok(())
    }

    /// Seals the journal with the number of ticks the run lasted.
    pub fn finish(mut self, run_ticks: u64) -> io::Result<()> {
        let sha256_hex = chain_sha256(&end_body(run_ticks), &self.last_sha256_hex);
        let line = FileLine::End {
            run_ticks,
            prev_sha256_hex: self.last_sha256_hex.clone(),
            sha256_hex,
        };
        self.write_line(&line)
    }

    fn write_line(&mut self, line: &FileLine) -> io::Result<()> {
        writeln!(self.writer, "{}", serde_json::to_string(line).map_err(io::Error::other)?)?;
        self.writer.flush()
    }
}

/// Writes a whole in-memory journal, footer included.
pub fn save_journal_to_file(path: &Path, journal: &InputJournal) -> io::Result<()> {
    let mut writer = JournalWriter::create(
        path,
        journal.seed,
        journal.tick_ms,
        &journal.build_id,
        journal.content_hash,
    )?;
    for record in &journal.inputs {
        writer.append(record.tick, &record.input)?;
    }
    writer.finish(journal.run_ticks)
}

#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: InputJournal,
    pub last_sha256_hex: String,
    pub next_seq: u64,
    /// Whether the footer was present; unsealed journals come from interrupted runs.
    pub sealed: bool,
}

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("journal file is empty")]
    EmptyFile,
    #[error("invalid journal header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },
    #[error("unsupported journal format version {0}")]
    UnsupportedVersion(u16),
    #[error("invalid journal record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
    #[error("incomplete journal line at line {line}")]
    IncompleteLine { line: usize },
    #[error("SHA-256 hash chain broken at line {line}")]
    HashChainBroken { line: usize },
    #[error("journal continues after its end marker at line {line}")]
    TrailingRecord { line: usize },
}

pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalError> {
    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Err(JournalError::EmptyFile);
    }
    if !content.ends_with('\n') {
        return Err(JournalError::IncompleteLine { line: lines.len() });
    }

    let header: FileHeader = serde_json::from_str(lines[0])
        .map_err(|e| JournalError::InvalidHeader { line: 1, message: e.to_string() })?;
    if header.format_version != JOURNAL_FORMAT_VERSION {
        return Err(JournalError::UnsupportedVersion(header.format_version));
    }

    let mut journal = InputJournal {
        format_version: header.format_version,
        build_id: header.build_id,
        content_hash: header.content_hash,
        seed: header.seed,
        tick_ms: header.tick_ms,
        run_ticks: 0,
        inputs: Vec::new(),
    };
    let mut prev_sha256_hex = INITIAL_HASH.to_string();
    let mut next_seq = 0u64;
    let mut sealed = false;

    for (index, text) in lines.iter().enumerate().skip(1) {
        let line = index + 1;
        if sealed {
            return Err(JournalError::TrailingRecord { line });
        }
        let parsed: FileLine = serde_json::from_str(text)
            .map_err(|e| JournalError::InvalidRecord { line, message: e.to_string() })?;

        match parsed {
            FileLine::Input { seq, tick, input, prev_sha256_hex: prev, sha256_hex } => {
                if seq != next_seq {
                    return Err(JournalError::InvalidRecord {
                        line,
                        message: format!("expected seq {next_seq}, found {seq}"),
                    });
                }
                if let Some(last) = journal.inputs.last()
                    && tick < last.tick
                {
                    return Err(JournalError::InvalidRecord {
                        line,
                        message: format!("tick {tick} precedes tick {}", last.tick),
                    });
                }
                let body_json = serde_json::to_string(&RecordBody { seq, tick, input: &input })
                    .map_err(|e| JournalError::InvalidRecord { line, message: e.to_string() })?;
                if prev != prev_sha256_hex || sha256_hex != chain_sha256(&body_json, &prev_sha256_hex) {
                    return Err(JournalError::HashChainBroken { line });
                }
                journal.inputs.push(InputRecord { seq, tick, input });
                prev_sha256_hex = sha256_hex;
                next_seq += 1;
            }
            FileLine::End { run_ticks, prev_sha256_hex: prev, sha256_hex } => {
                if prev != prev_sha256_hex
                    || sha256_hex != chain_sha256(&end_body(run_ticks), &prev_sha256_hex)
                {
                    return Err(JournalError::HashChainBroken { line });
                }
                journal.run_ticks = run_ticks;
                prev_sha256_hex = sha256_hex;
                sealed = true;
            }
        }
    }

    if !sealed {
        journal.run_ticks = journal.inputs.last().map_or(0, |record| record.tick);
    }
    Ok(LoadedJournal { journal, last_sha256_hex: prev_sha256_hex, next_seq, sealed })
}

#[cfg(test)]
mod tests;
