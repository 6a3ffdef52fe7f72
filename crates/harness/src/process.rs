// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Child process plumbing shared by both spawn modes.
//!
//! Whatever the mode, the child's output is pumped by background tasks into
//! an unbounded channel, so the child never blocks on a harness that is busy
//! elsewhere. The channel closes when every reader has seen end of stream.

use std::fmt;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use nix::sys::signal::Signal;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{HarnessConfig, SpawnMode};
use crate::pty::{Exec, Pty};

const READ_CHUNK: usize = 4096;

/// A program, its arguments and the directory it runs in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Name used in logs and error messages.
    pub label: String,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let label = program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Self {
            program,
            args: Vec::new(),
            cwd: cwd.into(),
            label,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Terminal state of a child process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitState {
    Running,
    Exited(i32),
    Signaled(i32),
}

impl ExitState {
    pub fn success(self) -> bool {
        self == Self::Exited(0)
    }

    /// Exit code, with signals folded in shell style (`128 + signal`).
    pub fn code(self) -> Option<i32> {
        match self {
            Self::Running => None,
            Self::Exited(code) => Some(code),
            Self::Signaled(sig) => Some(128 + sig),
        }
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "still running"),
            Self::Exited(code) => write!(f, "exit code {code}"),
            Self::Signaled(sig) => write!(f, "signal {sig}"),
        }
    }
}

enum Kind {
    Pty(Arc<Pty>),
    Piped {
        child: Child,
        stdin: Option<ChildStdin>,
    },
}

/// A spawned child plus the tasks reading its output.
pub struct Process {
    kind: Kind,
    readers: Vec<JoinHandle<()>>,
    pid: u32,
    exit: Option<ExitState>,
}

impl Process {
    /// Start `command` with an already-resolved absolute `program`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        program: &Path,
        command: &CommandLine,
        config: &HarnessConfig,
    ) -> io::Result<(Self, mpsc::UnboundedReceiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let process = match config.spawn_mode {
            SpawnMode::Pty => Self::spawn_pty(program, command, config, tx)?,
            SpawnMode::Pipes => Self::spawn_piped(program, command, config, tx)?,
        };
        Ok((process, rx))
    }

    fn spawn_pty(
        program: &Path,
        command: &CommandLine,
        config: &HarnessConfig,
        tx: mpsc::UnboundedSender<Vec<u8>>,
    ) -> io::Result<Self> {
        let mut env = vec![("TERM".to_string(), config.term.clone())];
        env.extend(config.env.iter().cloned());
        let exec = Exec::new(program, &command.args, &command.cwd, &env)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let pty = Arc::new(Pty::spawn(&exec, config.cols, config.rows)?);
        let pid = pty.pid();
        let reader = tokio::spawn(pump_pty(Arc::clone(&pty), tx));

        Ok(Self {
            kind: Kind::Pty(pty),
            readers: vec![reader],
            pid,
            exit: None,
        })
    }

    fn spawn_piped(
        program: &Path,
        command: &CommandLine,
        config: &HarnessConfig,
        tx: mpsc::UnboundedSender<Vec<u8>>,
    ) -> io::Result<Self> {
        let mut child = tokio::process::Command::new(program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .envs(config.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let pid = child.id().unwrap_or_default();
        let stdin = child.stdin.take();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(pump(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(pump(stderr, tx)));
        }

        Ok(Self {
            kind: Kind::Piped { child, stdin },
            readers,
            pid,
            exit: None,
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Write to the child's input.
    pub async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        match &mut self.kind {
            Kind::Pty(pty) => pty.write(data).await,
            Kind::Piped { stdin, .. } => match stdin {
                Some(stdin) => {
                    stdin.write_all(data).await?;
                    stdin.flush().await
                }
                None => Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "child stdin is closed",
                )),
            },
        }
    }

    /// Current exit state without blocking.
    pub fn try_wait(&mut self) -> io::Result<ExitState> {
        if let Some(exit) = self.exit {
            return Ok(exit);
        }
        let reaped = match &mut self.kind {
            Kind::Pty(pty) => pty.try_wait()?,
            Kind::Piped { child, .. } => child.try_wait()?.map(exit_state),
        };
        self.exit = reaped;
        Ok(reaped.unwrap_or(ExitState::Running))
    }

    /// Wait for the child to exit.
    pub async fn wait(&mut self) -> io::Result<ExitState> {
        if let Some(exit) = self.exit {
            return Ok(exit);
        }
        let exit = match &mut self.kind {
            Kind::Pty(pty) => pty.wait().await?,
            Kind::Piped { child, .. } => exit_state(child.wait().await?),
        };
        self.exit = Some(exit);
        Ok(exit)
    }

    /// Force termination. Safe to call on an exited child.
    pub fn kill(&mut self) -> io::Result<()> {
        if self.exit.is_some() {
            return Ok(());
        }
        match &mut self.kind {
            Kind::Pty(pty) => pty.kill(Signal::SIGKILL),
            Kind::Piped { child, .. } => match child.start_kill() {
                // Already reaped by tokio
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
                other => other,
            },
        }
    }

    /// Kill if still running, then reap.
    pub async fn terminate(&mut self) -> io::Result<ExitState> {
        if self.try_wait()? == ExitState::Running {
            self.kill()?;
        }
        self.wait().await
    }

    fn stop_readers(&mut self) {
        for reader in self.readers.drain(..) {
            reader.abort();
        }
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        self.stop_readers();
        if self.exit.is_some() {
            return;
        }
        // Piped children are covered by kill_on_drop.
        if let Kind::Pty(pty) = &self.kind {
            if pty.kill(Signal::SIGKILL).is_ok() {
                if let Err(e) = pty.wait_blocking() {
                    tracing::debug!(pid = self.pid, error = %e, "failed to reap child");
                }
            }
        }
    }
}

fn exit_state(status: std::process::ExitStatus) -> ExitState {
    match (status.code(), status.signal()) {
        (Some(code), _) => ExitState::Exited(code),
        (None, Some(sig)) => ExitState::Signaled(sig),
        (None, None) => ExitState::Exited(1),
    }
}

async fn pump_pty(pty: Arc<Pty>, tx: mpsc::UnboundedSender<Vec<u8>>) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match pty.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "pty read failed");
                break;
            }
        }
    }
}

async fn pump<R: AsyncRead + Unpin>(mut stream: R, tx: mpsc::UnboundedSender<Vec<u8>>) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "pipe read failed");
                break;
            }
        }
    }
}
