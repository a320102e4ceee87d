use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use std::fmt;

/// How a reaped child ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Exited(i32),
    Signaled(Signal),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Exited(c) => write!(f, "exited with status {}", c),
            Status::Signaled(s) => write!(f, "was terminated by signal {}", *s as i32),
        }
    }
}

impl Status {
    /// Splits a wait result into the pid and its final status. Stops,
    /// continues and "still alive" are not terminations.
    pub fn from_wait(status: WaitStatus) -> Option<(Pid, Self)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, Self::Exited(code))),
            WaitStatus::Signaled(pid, sig, _) => Some((pid, Self::Signaled(sig))),
            _ => None,
        }
    }

    /// Shell-visible exit code; signal deaths map to 128 + N.
    pub fn code(self) -> i32 {
        match self {
            Status::Exited(c) => c,
            Status::Signaled(s) => 128 + s as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(Status::Exited(0).code(), 0);
        assert_eq!(Status::Exited(3).code(), 3);
        assert_eq!(Status::Signaled(Signal::SIGKILL).code(), 137);
    }

    #[test]
    fn display() {
        assert_eq!(Status::Exited(2).to_string(), "exited with status 2");
        assert_eq!(
            Status::Signaled(Signal::SIGTERM).to_string(),
            "was terminated by signal 15"
        );
    }

    #[test]
    fn from_wait() {
        let pid = Pid::from_raw(42);
        assert_eq!(
            Status::from_wait(WaitStatus::Exited(pid, 1)),
            Some((pid, Status::Exited(1)))
        );
        assert_eq!(
            Status::from_wait(WaitStatus::Signaled(pid, Signal::SIGINT, false)),
            Some((pid, Status::Signaled(Signal::SIGINT)))
        );
        assert_eq!(Status::from_wait(WaitStatus::StillAlive), None);
    }
}
