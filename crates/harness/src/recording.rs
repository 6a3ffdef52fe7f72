// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session transcripts: a JSONL event log and a raw output dump.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::error::{HarnessError, Result};
use crate::process::ExitState;

/// One line of the JSONL log.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Event<'a> {
    Spawn {
        program: &'a str,
        args: &'a [String],
        cwd: &'a str,
        pid: u32,
    },
    Match {
        pattern: &'a str,
        offset: usize,
    },
    NotFound {
        pattern: &'a str,
    },
    Timeout {
        pattern: &'a str,
    },
    Send {
        input: &'a str,
    },
    Eof {
        trailing: usize,
    },
    Exit {
        state: String,
    },
}

#[derive(Serialize)]
struct Entry<'a> {
    ms: u64,
    #[serde(flatten)]
    event: &'a Event<'a>,
}

pub struct Recording {
    start: Instant,
    jsonl: BufWriter<File>,
    raw: BufWriter<File>,
}

impl Recording {
    /// Open `<label>.jsonl` and `<label>.raw` under `dir`, appending so
    /// repeated invocations of the same subcommand keep every run.
    pub fn new(dir: &Path, label: &str) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| HarnessError::filesystem(dir, e))?;
        let stem = file_stem(label);
        Ok(Self {
            start: Instant::now(),
            jsonl: BufWriter::new(open_append(dir.join(format!("{stem}.jsonl")))?),
            raw: BufWriter::new(open_append(dir.join(format!("{stem}.raw")))?),
        })
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn log(&mut self, event: &Event<'_>) -> Result<()> {
        let entry = Entry {
            ms: self.elapsed_ms(),
            event,
        };
        serde_json::to_writer(&mut self.jsonl, &entry).map_err(std::io::Error::from)?;
        self.jsonl.write_all(b"\n")?;
        Ok(())
    }

    pub fn log_exit(&mut self, state: ExitState) -> Result<()> {
        self.log(&Event::Exit {
            state: state.to_string(),
        })
    }

    pub fn append_raw(&mut self, data: &[u8]) -> Result<()> {
        self.raw.write_all(data)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.jsonl.flush()?;
        self.raw.flush()?;
        Ok(())
    }
}

fn open_append(path: PathBuf) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| HarnessError::filesystem(path, e))
}

/// `sinan xref` -> `sinan-xref`
fn file_stem(label: &str) -> String {
    let stem: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "session".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
#[path = "recording_tests.rs"]
mod tests;
