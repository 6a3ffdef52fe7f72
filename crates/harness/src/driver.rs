// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process driver.
//!
//! A [`Session`] owns one child process and walks its output as a linear
//! transcript: each `expect` waits for the next requested pattern at or after
//! the cursor, skipping anything in between, and never rewinds. The stream
//! closing before a match is a failure; so is the configured bound elapsing.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::pattern::{describe, earliest, Pattern};
use crate::process::{CommandLine, ExitState, Process};
use crate::recording::{Event, Recording};

const EOF_PATTERN: &str = "end of stream";

/// Most output absorbed between two pattern scans.
const MAX_BATCH: usize = 1024 * 1024;

/// A successful `expect`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    /// Output skipped between the previous cursor and the match.
    pub before: String,
    /// The matched text.
    pub matched: String,
    /// Stream offset where the match starts.
    pub offset: usize,
}

enum Chunk {
    Data(Vec<u8>),
    Closed,
    TimedOut,
}

/// A live child process and the harness's view of its output.
pub struct Session {
    label: String,
    process: Process,
    output: mpsc::UnboundedReceiver<Vec<u8>>,
    transcript: Vec<u8>,
    /// Offset into `transcript` of the first byte not yet consumed.
    cursor: usize,
    closed: bool,
    drained: bool,
    timeout: Option<Duration>,
    max_trailing_output: Option<usize>,
    recording: Option<Recording>,
}

impl Session {
    /// Start `command`. Must be called from within a tokio runtime.
    ///
    /// The executable is resolved against `PATH` first, so a missing tool is
    /// reported here rather than as a silent child exit.
    pub fn spawn(command: &CommandLine, config: &HarnessConfig) -> Result<Self> {
        let spawn_error = |source: std::io::Error| HarnessError::Spawn {
            command: command.label.clone(),
            source,
        };

        let program = which::which(&command.program)
            .map_err(|e| spawn_error(std::io::Error::new(std::io::ErrorKind::NotFound, e)))
            .and_then(|path| std::path::absolute(path).map_err(spawn_error))?;
        if !command.cwd.is_dir() {
            return Err(spawn_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("working directory {} does not exist", command.cwd.display()),
            )));
        }

        let (process, output) = Process::spawn(&program, command, config).map_err(spawn_error)?;
        tracing::debug!(
            command = %command.label,
            program = %program.display(),
            args = ?command.args,
            cwd = %command.cwd.display(),
            pid = process.pid(),
            "spawned"
        );

        let mut recording = config
            .record_dir
            .as_deref()
            .map(|dir| Recording::new(dir, &command.label))
            .transpose()?;
        if let Some(ref mut rec) = recording {
            rec.log(&Event::Spawn {
                program: &program.to_string_lossy(),
                args: &command.args,
                cwd: &command.cwd.to_string_lossy(),
                pid: process.pid(),
            })?;
        }

        Ok(Self {
            label: command.label.clone(),
            process,
            output,
            transcript: Vec::new(),
            cursor: 0,
            closed: false,
            drained: false,
            timeout: config.timeout,
            max_trailing_output: config.max_trailing_output,
            recording,
        })
    }

    /// Name of the invocation, as used in error messages.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pid(&self) -> u32 {
        self.process.pid()
    }

    /// Stream offset consumed so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Everything read from the child so far.
    pub fn transcript(&self) -> String {
        String::from_utf8_lossy(&self.transcript).into_owned()
    }

    /// Output read but not yet consumed by a match.
    pub fn pending(&self) -> String {
        String::from_utf8_lossy(self.unconsumed()).into_owned()
    }

    /// Current exit state without blocking.
    pub fn exit_state(&mut self) -> Result<ExitState> {
        Ok(self.process.try_wait()?)
    }

    /// Override the wait bound for subsequent calls.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Wait until `pattern` appears at or after the cursor, then move the
    /// cursor past it.
    pub async fn expect(&mut self, pattern: impl Into<Pattern>) -> Result<Match> {
        let pattern = pattern.into();
        let (_, found) = self.expect_first(std::slice::from_ref(&pattern)).await?;
        Ok(found)
    }

    /// Wait for whichever of `patterns` appears first. Returns the index of
    /// the pattern that matched; on a tie the lower index wins.
    pub async fn expect_any(&mut self, patterns: &[Pattern]) -> Result<(usize, Match)> {
        self.expect_first(patterns).await
    }

    async fn expect_first(&mut self, patterns: &[Pattern]) -> Result<(usize, Match)> {
        let deadline = self.deadline();
        let mut scanned = 0;
        loop {
            if let Some((index, range)) = earliest(patterns, self.unconsumed(), scanned) {
                let found = self.consume(range.start, range.end);
                let described = patterns[index].to_string();
                tracing::debug!(command = %self.label, pattern = %described, offset = found.offset, "matched");
                if let Some(ref mut rec) = self.recording {
                    rec.log(&Event::Match {
                        pattern: &described,
                        offset: found.offset,
                    })?;
                }
                return Ok((index, found));
            }
            scanned = self.unconsumed().len();

            if self.closed {
                let pattern = describe(patterns);
                tracing::warn!(command = %self.label, pattern = %pattern, "stream closed before match");
                if let Some(ref mut rec) = self.recording {
                    rec.log(&Event::NotFound { pattern: &pattern })?;
                    rec.flush()?;
                }
                return Err(HarnessError::PatternNotFound {
                    command: self.label.clone(),
                    pattern,
                    tail: self.pending(),
                });
            }
            if is_past(deadline) {
                return Err(self.timed_out(describe(patterns)).await);
            }

            match self.next_chunk(deadline).await {
                Chunk::Data(bytes) => self.absorb(bytes)?,
                Chunk::Closed => self.closed = true,
                Chunk::TimedOut => return Err(self.timed_out(describe(patterns)).await),
            }
        }
    }

    /// Wait for the child to close its output, then reap it.
    ///
    /// Output left unmatched is drained, unless `max_trailing_output` is set
    /// and exceeded. Calling this again after success returns the same exit
    /// state without waiting.
    pub async fn expect_eof(&mut self) -> Result<ExitState> {
        let deadline = self.deadline();
        if !self.drained {
            while !self.closed {
                self.check_trailing()?;
                if is_past(deadline) {
                    return Err(self.timed_out(EOF_PATTERN.to_string()).await);
                }
                match self.next_chunk(deadline).await {
                    Chunk::Data(bytes) => self.absorb(bytes)?,
                    Chunk::Closed => self.closed = true,
                    Chunk::TimedOut => {
                        return Err(self.timed_out(EOF_PATTERN.to_string()).await)
                    }
                }
            }
            self.check_trailing()?;

            let trailing = self.unconsumed().len();
            self.consume(trailing, trailing);
            self.drained = true;
            tracing::debug!(command = %self.label, trailing, "end of stream");
            if let Some(ref mut rec) = self.recording {
                rec.log(&Event::Eof { trailing })?;
            }
        }

        let exit = match deadline {
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, self.process.wait()).await {
                    Ok(exit) => exit?,
                    Err(_) => return Err(self.timed_out("process exit".to_string()).await),
                }
            }
            None => self.process.wait().await?,
        };
        if let Some(ref mut rec) = self.recording {
            rec.log_exit(exit)?;
            rec.flush()?;
        }
        Ok(exit)
    }

    /// Write raw bytes to the child's input.
    pub async fn send(&mut self, data: impl AsRef<[u8]>) -> Result<()> {
        let data = data.as_ref();
        if let Some(ref mut rec) = self.recording {
            rec.log(&Event::Send {
                input: &String::from_utf8_lossy(data),
            })?;
        }
        self.process.write(data).await?;
        Ok(())
    }

    /// Write `line` followed by a newline.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        self.send(format!("{line}\n")).await
    }

    /// Release the child: kill it if still running and reap it.
    pub async fn close(mut self) -> Result<ExitState> {
        let exit = self.process.terminate().await?;
        tracing::debug!(command = %self.label, %exit, "closed");
        if let Some(ref mut rec) = self.recording {
            rec.log_exit(exit)?;
            rec.flush()?;
        }
        Ok(exit)
    }

    fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|timeout| Instant::now() + timeout)
    }

    async fn next_chunk(&mut self, deadline: Option<Instant>) -> Chunk {
        let received = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, self.output.recv()).await {
                Ok(received) => received,
                Err(_) => return Chunk::TimedOut,
            },
            None => self.output.recv().await,
        };
        match received {
            Some(bytes) => Chunk::Data(bytes),
            None => Chunk::Closed,
        }
    }

    /// Append `bytes` and whatever else is already queued, up to
    /// [`MAX_BATCH`], so a fast writer costs one scan per batch.
    fn absorb(&mut self, bytes: Vec<u8>) -> Result<()> {
        let mut batch = bytes.len();
        self.append(&bytes)?;
        while batch < MAX_BATCH {
            let Ok(bytes) = self.output.try_recv() else {
                break;
            };
            batch += bytes.len();
            self.append(&bytes)?;
        }
        Ok(())
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(ref mut rec) = self.recording {
            rec.append_raw(bytes)?;
        }
        self.transcript.extend_from_slice(bytes);
        Ok(())
    }

    fn unconsumed(&self) -> &[u8] {
        &self.transcript[self.cursor..]
    }

    /// Advance the cursor past a match at `start..end` of the unconsumed output.
    fn consume(&mut self, start: usize, end: usize) -> Match {
        let rest = self.unconsumed();
        let found = Match {
            before: String::from_utf8_lossy(&rest[..start]).into_owned(),
            matched: String::from_utf8_lossy(&rest[start..end]).into_owned(),
            offset: self.cursor + start,
        };
        self.cursor += end;
        found
    }

    fn check_trailing(&self) -> Result<()> {
        match self.max_trailing_output {
            Some(limit) if self.unconsumed().len() > limit => Err(HarnessError::UnexpectedOutput {
                command: self.label.clone(),
                output: self.pending(),
            }),
            _ => Ok(()),
        }
    }

    /// Terminate the child after a wait ran out of time.
    async fn timed_out(&mut self, pattern: String) -> HarnessError {
        tracing::warn!(command = %self.label, pattern = %pattern, timeout = ?self.timeout, "timed out");
        if let Err(e) = self.process.terminate().await {
            tracing::warn!(command = %self.label, error = %e, "failed to terminate child");
        }
        if let Some(ref mut rec) = self.recording {
            if let Err(e) = rec.log(&Event::Timeout { pattern: &pattern }).and_then(|()| rec.flush()) {
                tracing::warn!(command = %self.label, error = %e, "failed to record timeout");
            }
        }
        HarnessError::Timeout {
            command: self.label.clone(),
            pattern,
            after: self.timeout.unwrap_or_default(),
            tail: self.pending(),
        }
    }
}

fn is_past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("label", &self.label)
            .field("pid", &self.process.pid())
            .field("cursor", &self.cursor)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
