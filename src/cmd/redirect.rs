use crate::error::{ExecError, ExecResult};
use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};
use std::io::Write;
use std::os::unix::io::RawFd;
use std::path::PathBuf;

pub const STDIN: RawFd = 0;
pub const STDOUT: RawFd = 1;
pub const STDERR: RawFd = 2;

/// One descriptor rewiring, applied in the process whose table it changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Redirect {
    /// Makes `source` refer to whatever `target` refers to.
    DuplicateFd {
        source: RawFd,
        target: RawFd,
        keep_target_open: bool,
    },
    /// Opens `path` and binds it to `source`.
    OpenFile {
        source: RawFd,
        path: PathBuf,
        flags: OFlag,
        mode: Mode,
    },
}

impl Redirect {
    /// `source` becomes a copy of `target`; `target` stays open.
    pub fn dup(source: RawFd, target: RawFd) -> Self {
        Self::DuplicateFd {
            source,
            target,
            keep_target_open: true,
        }
    }

    /// `source` takes over `target`, which is closed afterwards.
    pub fn move_fd(source: RawFd, target: RawFd) -> Self {
        Self::DuplicateFd {
            source,
            target,
            keep_target_open: false,
        }
    }

    pub fn open<P: Into<PathBuf>>(source: RawFd, path: P, flags: OFlag) -> Self {
        Self::OpenFile {
            source,
            path: path.into(),
            flags,
            mode: Mode::from_bits_truncate(0o644),
        }
    }

    /// `> file`, `2> file`
    pub fn output<P: Into<PathBuf>>(source: RawFd, path: P) -> Self {
        Self::open(
            source,
            path,
            OFlag::O_CREAT | OFlag::O_WRONLY | OFlag::O_TRUNC,
        )
    }

    /// `>> file`
    pub fn append<P: Into<PathBuf>>(source: RawFd, path: P) -> Self {
        Self::open(
            source,
            path,
            OFlag::O_CREAT | OFlag::O_WRONLY | OFlag::O_APPEND,
        )
    }

    /// `< file`
    pub fn input<P: Into<PathBuf>>(source: RawFd, path: P) -> Self {
        Self::open(source, path, OFlag::O_RDONLY)
    }

    pub fn source(&self) -> RawFd {
        match self {
            Self::DuplicateFd { source, .. } | Self::OpenFile { source, .. } => *source,
        }
    }

    /// What a failure of this redirect is reported against.
    pub fn describe(&self) -> String {
        match self {
            Self::DuplicateFd { target, .. } => format!("fd {}", target),
            Self::OpenFile { path, .. } => path.display().to_string(),
        }
    }

    pub fn apply(&self) -> ExecResult<()> {
        self.rewire().map_err(|e| ExecError::io(self.describe(), e))
    }

    /// [`Redirect::apply`] without building an error value; safe to call
    /// between fork and exec.
    pub(crate) fn rewire(&self) -> nix::Result<()> {
        match self {
            Self::DuplicateFd {
                source,
                target,
                keep_target_open,
            } => {
                if source == target {
                    return Ok(());
                }
                dup2(*target, *source)?;
                if !keep_target_open {
                    close(*target)?;
                }
            }
            Self::OpenFile {
                source,
                path,
                flags,
                mode,
            } => {
                let fd = open(path.as_path(), *flags, *mode)?;
                if fd != *source {
                    let res = dup2(fd, *source);
                    let _ = close(fd);
                    res?;
                }
            }
        }
        Ok(())
    }
}

/// Applies redirects inside the interpreter itself and puts the touched
/// descriptors back when dropped. Builtins run under one of these.
#[derive(Debug)]
pub struct Scoped {
    saved: Vec<(RawFd, Option<RawFd>)>,
}

impl Scoped {
    pub fn apply<'a, I>(redirects: I) -> ExecResult<Self>
    where
        I: IntoIterator<Item = &'a Redirect>,
    {
        let mut scoped = Self { saved: Vec::new() };
        for red in redirects {
            scoped.save(red.source());
            red.apply()?;
        }
        Ok(scoped)
    }

    fn save(&mut self, fd: RawFd) {
        if self.saved.iter().any(|(s, _)| *s == fd) {
            return;
        }
        flush(fd);
        // A descriptor that was closed has nothing to restore except its absence.
        let backup = fcntl(fd, FcntlArg::F_DUPFD_CLOEXEC(10)).ok();
        self.saved.push((fd, backup));
    }
}

impl Drop for Scoped {
    fn drop(&mut self) {
        for (fd, backup) in self.saved.drain(..).rev() {
            flush(fd);
            match backup {
                Some(b) => {
                    if let Err(e) = dup2(b, fd) {
                        tracing::warn!(fd, "failed to restore descriptor: {}", e);
                    }
                    let _ = close(b);
                }
                None => {
                    let _ = close(fd);
                }
            }
        }
    }
}

fn flush(fd: RawFd) {
    let _ = match fd {
        STDOUT => std::io::stdout().flush(),
        STDERR => std::io::stderr().flush(),
        _ => Ok(()),
    };
}
