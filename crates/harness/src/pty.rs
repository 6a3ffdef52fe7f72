// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pseudo-terminal spawning.
//!
//! The child runs on the slave side of a fresh PTY as its session leader;
//! the harness reads and writes the non-blocking master through tokio.

use std::ffi::{CString, NulError};
use std::io;
use std::os::fd::{AsRawFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::Duration;

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::pty::{forkpty, Winsize};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{ForkResult, Pid};
use tokio::io::unix::AsyncFd;

use crate::process::ExitState;

const REAP_INTERVAL: Duration = Duration::from_millis(10);

/// Everything the child needs after `fork`, converted up front so the child
/// only calls `chdir` and `execve`.
pub struct Exec {
    program: CString,
    argv: Vec<CString>,
    envp: Vec<CString>,
    cwd: CString,
}

impl Exec {
    pub fn new(
        program: &Path,
        args: &[String],
        cwd: &Path,
        env: &[(String, String)],
    ) -> Result<Self, NulError> {
        let program = CString::new(program.as_os_str().as_bytes())?;
        let mut argv = vec![program.clone()];
        for arg in args {
            argv.push(CString::new(arg.as_bytes())?);
        }

        let overridden = |key: &[u8]| env.iter().any(|(k, _)| k.as_bytes() == key);
        let mut envp = Vec::new();
        for (key, value) in std::env::vars_os() {
            if overridden(key.as_bytes()) {
                continue;
            }
            let mut entry = key.as_bytes().to_vec();
            entry.push(b'=');
            entry.extend_from_slice(value.as_bytes());
            envp.push(CString::new(entry)?);
        }
        for (key, value) in env {
            envp.push(CString::new(format!("{key}={value}"))?);
        }

        Ok(Self {
            program,
            argv,
            envp,
            cwd: CString::new(cwd.as_os_str().as_bytes())?,
        })
    }
}

/// A running PTY session with a child process.
pub struct Pty {
    master: AsyncFd<OwnedFd>,
    child_pid: Pid,
}

impl Pty {
    /// Spawn a prepared command in a new PTY.
    pub fn spawn(exec: &Exec, cols: u16, rows: u16) -> io::Result<Self> {
        let winsize = Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };

        // SAFETY: the child touches only the pre-built `Exec` before execve
        // or _exit, so no allocator or lock state from other threads is used.
        let result = unsafe { forkpty(&winsize, None)? };

        match result.fork_result {
            ForkResult::Child => {
                // SAFETY: single-threaded child, before exec.
                unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl).ok() };
                if nix::unistd::chdir(exec.cwd.as_c_str()).is_ok() {
                    let _ = nix::unistd::execve(&exec.program, &exec.argv, &exec.envp);
                }
                // SAFETY: no destructors may run in the forked copy.
                unsafe { nix::libc::_exit(127) }
            }
            ForkResult::Parent { child } => {
                let master = result.master;
                let flags = OFlag::from_bits_truncate(fcntl(master.as_raw_fd(), FcntlArg::F_GETFL)?);
                fcntl(master.as_raw_fd(), FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;
                Ok(Self {
                    master: AsyncFd::new(master)?,
                    child_pid: child,
                })
            }
        }
    }

    pub fn pid(&self) -> u32 {
        self.child_pid.as_raw() as u32
    }

    /// Read from the master side. `Ok(0)` is end of stream.
    pub async fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let mut guard = self.master.readable().await?;
            if let Ok(result) = guard.try_io(|fd| read_master(fd.get_ref(), buf)) {
                return result;
            }
        }
    }

    /// Write all of `data` to the master side, i.e. the child's input.
    pub async fn write(&self, mut data: &[u8]) -> io::Result<()> {
        while !data.is_empty() {
            let mut guard = self.master.writable().await?;
            if let Ok(result) = guard.try_io(|fd| Ok(nix::unistd::write(fd.get_ref(), data)?)) {
                data = &data[result?..];
            }
        }
        Ok(())
    }

    /// Send a signal to the child process.
    pub fn kill(&self, signal: Signal) -> io::Result<()> {
        match nix::sys::signal::kill(self.child_pid, signal) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reap the child if it has already exited.
    pub fn try_wait(&self) -> io::Result<Option<ExitState>> {
        let status = waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG))?;
        Ok(exit_state(status))
    }

    /// Block the current thread until the child exits.
    pub fn wait_blocking(&self) -> io::Result<ExitState> {
        let status = waitpid(self.child_pid, None)?;
        Ok(exit_state(status).unwrap_or(ExitState::Exited(1)))
    }

    /// Wait for the child process to exit without blocking the runtime.
    ///
    /// Polls with `WNOHANG`; dropping the future leaves no `waitpid` pending.
    pub async fn wait(&self) -> io::Result<ExitState> {
        loop {
            if let Some(state) = self.try_wait()? {
                return Ok(state);
            }
            tokio::time::sleep(REAP_INTERVAL).await;
        }
    }
}

/// Linux reports a PTY whose slave side is gone as `EIO` rather than EOF.
fn read_master(fd: &OwnedFd, buf: &mut [u8]) -> io::Result<usize> {
    match nix::unistd::read(fd.as_raw_fd(), buf) {
        Ok(n) => Ok(n),
        Err(Errno::EIO) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

fn exit_state(status: WaitStatus) -> Option<ExitState> {
    match status {
        WaitStatus::Exited(_, code) => Some(ExitState::Exited(code)),
        WaitStatus::Signaled(_, sig, _) => Some(ExitState::Signaled(sig as i32)),
        _ => None,
    }
}
