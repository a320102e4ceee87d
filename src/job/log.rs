use super::Status;
use chrono::Local;
use nix::unistd::Pid;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only record of terminated children, one line per child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExitLog {
    path: PathBuf,
}

impl ExitLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry. Failures are traced and otherwise ignored.
    pub fn record(&self, pid: Pid, status: Status) {
        if let Err(e) = self.append(&Self::line(pid, status)) {
            tracing::warn!(path = %self.path.display(), "failed to append exit log: {}", e);
        }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }

    fn line(pid: Pid, status: Status) -> String {
        format!(
            "[ {}] Child process {} {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            pid,
            status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use nix::sys::signal::Signal;

    #[test]
    #[serial]
    fn appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = ExitLog::new(dir.path().join("log.txt"));

        log.record(Pid::from_raw(100), Status::Exited(0));
        log.record(Pid::from_raw(101), Status::Signaled(Signal::SIGKILL));

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[ "));
        assert!(lines[0].ends_with("] Child process 100 exited with status 0"));
        assert!(lines[1].ends_with("] Child process 101 was terminated by signal 9"));
    }

    #[test]
    #[serial]
    fn swallows_failures() {
        let log = ExitLog::new("/nonexistent-dir/for/sure/log.txt");
        log.record(Pid::from_raw(1), Status::Exited(1));
    }
}
