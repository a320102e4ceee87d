use super::redirect::{Redirect, STDIN, STDOUT};
use super::simple::{self, Launched, SimpleCommand};
use super::ExecMode;
use crate::error::{ExecError, ExecResult};
use crate::job::Reaper;
use nix::fcntl::OFlag;
use nix::unistd::{close, pipe2};
use std::os::unix::io::RawFd;

/// Stages joined by `|`.
///
/// Every stage but the last is started without waiting so the next pipe can
/// be wired; `mode` only decides whether the pipeline as a whole is waited
/// for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<SimpleCommand>,
    mode: ExecMode,
}

impl From<SimpleCommand> for Pipeline {
    fn from(cmd: SimpleCommand) -> Self {
        Self {
            stages: vec![cmd],
            mode: ExecMode::Sync,
        }
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pipe(mut self, cmd: SimpleCommand) -> Self {
        self.push(cmd);
        self
    }

    pub fn push(&mut self, cmd: SimpleCommand) {
        self.stages.push(cmd);
    }

    pub fn set_async(&mut self) {
        self.mode = ExecMode::Async;
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    pub fn stages(&self) -> &[SimpleCommand] {
        &self.stages
    }

    /// Runs the pipeline and returns the status of its last stage.
    ///
    /// Fails only when a pipe can't be created; stages already started are
    /// handed to the reaper first.
    pub fn execute(&self, reaper: &Reaper) -> ExecResult<i32> {
        let (last, init) = match self.stages.split_last() {
            None => return Ok(0),
            Some((last, [])) => return Ok(last.execute(self.mode, reaper)),
            Some(split) => split,
        };

        let mut launched = Vec::with_capacity(self.stages.len());
        let mut prev_read: Option<RawFd> = None;

        for stage in init {
            let (read, write) = match pipe2(OFlag::O_CLOEXEC) {
                Ok(ends) => ends,
                Err(e) => {
                    close_quietly(prev_read);
                    abandon(&launched, reaper);
                    return Err(ExecError::resource("pipe", e));
                }
            };
            tracing::debug!(read, write, program = stage.program(), "created pipe");

            let before: Vec<_> = prev_read.map(|fd| Redirect::dup(STDIN, fd)).into_iter().collect();
            launched.push(stage.launch(&before, &[Redirect::dup(STDOUT, write)]));

            close_quietly(Some(write));
            close_quietly(prev_read);
            prev_read = Some(read);
        }

        let before: Vec<_> = prev_read.map(|fd| Redirect::dup(STDIN, fd)).into_iter().collect();
        launched.push(last.launch(&before, &[]));
        close_quietly(prev_read);

        Ok(match self.mode {
            ExecMode::Async => {
                abandon(&launched, reaper);
                match launched.last() {
                    Some(Launched::Done(status)) => *status,
                    _ => 0,
                }
            }
            ExecMode::Sync => {
                let mut status = 0;
                for l in launched {
                    status = match l {
                        Launched::Done(status) => status,
                        Launched::Child(pid) => simple::wait(pid, reaper),
                    };
                }
                status
            }
        })
    }
}

/// Hands every started child to the reaper.
fn abandon(launched: &[Launched], reaper: &Reaper) {
    for l in launched {
        if let Launched::Child(pid) = l {
            reaper.adopt(*pid);
        }
    }
}

fn close_quietly(fd: Option<RawFd>) {
    if let Some(fd) = fd {
        if let Err(e) = close(fd) {
            tracing::warn!(fd, "failed to close pipe end: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::ExitLog;
    use serial_test::serial;
    use std::time::{Duration, Instant};

    fn reaper(dir: &tempfile::TempDir) -> Reaper {
        Reaper::new(ExitLog::new(dir.path().join("log.txt")))
    }

    fn open_fds() -> usize {
        std::fs::read_dir("/proc/self/fd").unwrap().count()
    }

    #[test]
    #[serial]
    fn empty_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Pipeline::new().execute(&reaper(&dir)).unwrap(), 0);
    }

    #[test]
    #[serial]
    fn two_stages() {
        let dir = tempfile::tempdir().unwrap();
        let reaper = reaper(&dir);
        let out = dir.path().join("out.txt");

        let before = open_fds();
        let pipeline = Pipeline::from(SimpleCommand::new("echo").arg("hello")).pipe(
            SimpleCommand::new("wc")
                .arg("-c")
                .redirect(Redirect::output(STDOUT, &out)),
        );
        assert_eq!(pipeline.execute(&reaper).unwrap(), 0);
        assert_eq!(open_fds(), before);

        assert_eq!(std::fs::read_to_string(&out).unwrap().trim(), "6");
    }

    #[test]
    #[serial]
    fn three_stages() {
        let dir = tempfile::tempdir().unwrap();
        let reaper = reaper(&dir);
        let out = dir.path().join("out.txt");

        let before = open_fds();
        let pipeline = Pipeline::from(SimpleCommand::new("printf").arg("b\\na\\nb\\n"))
            .pipe(SimpleCommand::new("sort").arg("-u"))
            .pipe(SimpleCommand::new("wc").arg("-l").redirect(Redirect::output(STDOUT, &out)));
        assert_eq!(pipeline.execute(&reaper).unwrap(), 0);
        assert_eq!(open_fds(), before);

        assert_eq!(std::fs::read_to_string(&out).unwrap().trim(), "2");
    }

    #[test]
    #[serial]
    fn status_is_last_stage() {
        let dir = tempfile::tempdir().unwrap();
        let reaper = reaper(&dir);

        let pipeline = Pipeline::from(SimpleCommand::new("true")).pipe(SimpleCommand::new("false"));
        assert_eq!(pipeline.execute(&reaper).unwrap(), 1);

        let pipeline = Pipeline::from(SimpleCommand::new("false")).pipe(SimpleCommand::new("true"));
        assert_eq!(pipeline.execute(&reaper).unwrap(), 0);
    }

    #[test]
    #[serial]
    fn early_reader_exit_does_not_hang() {
        let dir = tempfile::tempdir().unwrap();
        let reaper = reaper(&dir);

        let pipeline = Pipeline::from(SimpleCommand::new("yes"))
            .pipe(SimpleCommand::new("head").arg("-n").arg("1").redirect(
                Redirect::output(STDOUT, dir.path().join("out.txt")),
            ));
        assert_eq!(pipeline.execute(&reaper).unwrap(), 0);
    }

    #[test]
    #[serial]
    fn builtin_stage_feeds_pipe() {
        let dir = tempfile::tempdir().unwrap();
        let reaper = reaper(&dir);
        let out = dir.path().join("out.txt");

        let pipeline = Pipeline::from(SimpleCommand::new("pwd"))
            .pipe(SimpleCommand::new("cat").redirect(Redirect::output(STDOUT, &out)));
        assert_eq!(pipeline.execute(&reaper).unwrap(), 0);

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            format!("{}\n", cwd.display())
        );
    }

    #[test]
    #[serial]
    fn async_pipeline_goes_to_reaper() {
        let dir = tempfile::tempdir().unwrap();
        let reaper = reaper(&dir);

        let mut pipeline =
            Pipeline::from(SimpleCommand::new("sleep").arg("1")).pipe(SimpleCommand::new("cat"));
        pipeline.set_async();

        let start = Instant::now();
        assert_eq!(pipeline.execute(&reaper).unwrap(), 0);
        assert!(start.elapsed() < Duration::from_millis(900));
        assert_eq!(reaper.pending().len(), 2);

        let deadline = Instant::now() + Duration::from_secs(5);
        while !reaper.pending().is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
            reaper.sweep();
        }
        assert!(reaper.pending().is_empty());
    }
}
