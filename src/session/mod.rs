mod io;
mod prompt;

pub use io::IOReader;
pub use prompt::PromptReader;

use crate::error::ExecError;
use crate::job::Reaper;
use crate::parse::parse_line;
use anyhow::Context;

pub struct Session<T> {
    reader: T,
    reaper: Reaper,
    status: i32,
}

pub trait Reader: Sized {
    fn init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
    fn next_line(&mut self) -> anyhow::Result<Option<String>>;
}

impl<T: Reader> Session<T> {
    pub fn new(mut reader: T, reaper: Reaper) -> anyhow::Result<Self> {
        reader.init()?;
        Ok(Self {
            reader,
            reaper,
            status: 0,
        })
    }

    /// Status of the last line that was run.
    pub fn status(&self) -> i32 {
        self.status
    }

    /// Reads and runs one line. Returns `false` once the input is exhausted.
    pub fn next(&mut self) -> anyhow::Result<bool> {
        let line = match self.reader.next_line() {
            Ok(Some(s)) => s,
            Ok(None) => return Ok(false),
            Err(e) => {
                eprintln!("Readline Error: {}", e);
                return Ok(true);
            }
        };

        let list = match parse_line(line.as_str()) {
            Ok(list) => list,
            Err(e) => {
                eprintln!("Parse Error: {}", e);
                self.status = 1;
                return Ok(true);
            }
        };

        tracing::debug!(?list, "parsed");
        self.status = match list.execute(&self.reaper) {
            Ok(status) => status,
            Err(e @ ExecError::Resource { .. }) => {
                return Err(e).context("Cannot continue without system resources.")
            }
            Err(e) => {
                eprintln!("{}", e);
                e.status()
            }
        };

        Ok(true)
    }

    /// Runs every remaining line and returns the last status.
    pub fn all(&mut self) -> anyhow::Result<i32> {
        loop {
            if !self.next()? {
                break;
            }
        }

        Ok(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::ExitLog;
    use serial_test::serial;
    use std::io::Cursor;

    fn session(script: &str, dir: &tempfile::TempDir) -> Session<IOReader<Cursor<String>>> {
        let reaper = Reaper::new(ExitLog::new(dir.path().join("log.txt")));
        Session::new(IOReader::new(Cursor::new(String::from(script))), reaper).unwrap()
    }

    #[test]
    #[serial]
    fn runs_every_line() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let script = format!(
            "echo one > {0}\n\n# comment\necho two >> {0}\nfalse\n",
            out.display()
        );

        let mut session = session(&script, &dir);
        assert_eq!(session.all().unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "one\ntwo\n");
    }

    #[test]
    #[serial]
    fn parse_errors_do_not_stop_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session("echo 'open\ntrue\n", &dir);

        assert!(session.next().unwrap());
        assert_eq!(session.status(), 1);
        assert!(session.next().unwrap());
        assert_eq!(session.status(), 0);
        assert!(!session.next().unwrap());
    }
}
