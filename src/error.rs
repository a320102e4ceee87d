use nix::errno::Errno;

/// Failures raised while executing a command line.
///
/// `Usage`, `NotFound` and `Io` are recovered where they happen and only
/// surface as an exit status of 1. `Resource` means the interpreter can't
/// safely keep wiring descriptors and is propagated to the session.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("{0}")]
    Usage(String),
    #[error("{name}: No such file or directory")]
    NotFound { name: String },
    #[error("{target}: {}", .source.desc())]
    Io { target: String, source: Errno },
    #[error("{op}: {}", .source.desc())]
    Resource { op: &'static str, source: Errno },
}

impl ExecError {
    pub fn usage<T: Into<String>>(msg: T) -> Self {
        Self::Usage(msg.into())
    }

    pub fn io<T: Into<String>>(target: T, source: Errno) -> Self {
        Self::Io {
            target: target.into(),
            source,
        }
    }

    /// Same as [`ExecError::io`] for failures reported through `std::io`.
    pub fn os<T: Into<String>>(target: T, err: std::io::Error) -> Self {
        let errno = err.raw_os_error().map_or(Errno::EIO, Errno::from_i32);
        Self::io(target, errno)
    }

    pub fn resource(op: &'static str, source: Errno) -> Self {
        Self::Resource { op, source }
    }

    /// Exit status reported for a locally recovered failure.
    pub fn status(&self) -> i32 {
        1
    }
}

pub type ExecResult<T> = Result<T, ExecError>;
