use super::{ExitLog, Status};
use anyhow::Context;
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use signal_hook::consts::signal;
use signal_hook::iterator::Signals;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

/// Owner of every child that nobody is blocking on.
///
/// Asynchronous launches hand their pids over with [`Reaper::adopt`]; a
/// SIGCHLD hook then collects them without blocking. Synchronous launches are
/// waited for with [`Reaper::wait`], which only ever waits on the given pid,
/// so the two never race for the same child.
#[derive(Debug)]
pub struct Reaper(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    adopted: Mutex<Vec<Pid>>,
    log: ExitLog,
}

impl Clone for Reaper {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl Reaper {
    pub fn new(log: ExitLog) -> Self {
        Self(Arc::new(Inner {
            adopted: Mutex::new(Vec::new()),
            log,
        }))
    }

    /// Creates a reaper and starts the SIGCHLD hook that drives it.
    pub fn install(log: ExitLog) -> anyhow::Result<Self> {
        let reaper = Self::new(log);
        let mut signals =
            Signals::new(&[signal::SIGCHLD]).context("Failed to initialize signals.")?;

        let hooked = reaper.clone();
        thread::Builder::new()
            .name(String::from("reaper"))
            .spawn(move || {
                for _ in signals.forever() {
                    hooked.sweep();
                }
            })
            .context("Failed to spawn the reaper thread.")?;

        Ok(reaper)
    }

    pub fn log(&self) -> &ExitLog {
        &self.0.log
    }

    /// Takes ownership of a running child. A child that already exited
    /// before it got here is collected right away.
    pub fn adopt(&self, pid: Pid) {
        tracing::debug!(%pid, "adopted background child");
        match self.lock() {
            Ok(mut adopted) => adopted.push(pid),
            Err(e) => {
                tracing::warn!("{}", e);
                return;
            }
        }
        self.sweep();
    }

    /// Pids adopted and not reaped yet.
    pub fn pending(&self) -> Vec<Pid> {
        self.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Collects every adopted child that has terminated, without blocking.
    /// Returns how many were reaped.
    pub fn sweep(&self) -> usize {
        let mut adopted = match self.lock() {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!("{}", e);
                return 0;
            }
        };

        let before = adopted.len();
        let log = &self.0.log;
        adopted.retain(|&pid| match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(Errno::EINTR) => true,
            Ok(status) => match Status::from_wait(status) {
                Some((pid, status)) => {
                    tracing::debug!(%pid, %status, "reaped background child");
                    log.record(pid, status);
                    false
                }
                None => true,
            },
            Err(e) => {
                tracing::warn!(%pid, "dropping unreapable child: {}", e);
                false
            }
        });
        before - adopted.len()
    }

    /// Blocks until `pid` terminates and records it.
    pub fn wait(&self, pid: Pid) -> nix::Result<Status> {
        loop {
            match waitpid(pid, None) {
                Ok(status) => {
                    if let Some((pid, status)) = Status::from_wait(status) {
                        self.0.log.record(pid, status);
                        return Ok(status);
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Vec<Pid>>> {
        match self.0.adopted.lock() {
            Ok(l) => Ok(l),
            Err(e) => anyhow::bail!("Failed to get the lock: {}", e),
        }
    }
}
