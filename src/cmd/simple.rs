use super::redirect::{Redirect, Scoped};
use super::{Builtin, ExecMode};
use crate::job::{Pid, Reaper};
use nix::libc;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::unistd::{fork, ForkResult};
use std::ffi::CString;

/// A program name, its arguments and the redirects to apply before it runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimpleCommand {
    program: String,
    args: Vec<String>,
    redirects: Vec<Redirect>,
}

/// What starting a command produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Launched {
    /// Ran to completion in-process.
    Done(i32),
    /// A child that somebody still has to wait for.
    Child(Pid),
}

impl SimpleCommand {
    pub fn new<T: Into<String>>(program: T) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            redirects: Vec::new(),
        }
    }

    pub fn arg<T: Into<String>>(mut self, arg: T) -> Self {
        self.push_arg(arg);
        self
    }

    pub fn redirect(mut self, red: Redirect) -> Self {
        self.push_redirect(red);
        self
    }

    pub fn push_arg<T: Into<String>>(&mut self, arg: T) {
        self.args.push(arg.into());
    }

    pub fn push_redirect(&mut self, red: Redirect) {
        self.redirects.push(red);
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn redirects(&self) -> &[Redirect] {
        &self.redirects
    }

    /// Runs the command. In `Sync` mode the status is the child's; in `Async`
    /// mode the child goes to the reaper and the status is 0.
    pub fn execute(&self, mode: ExecMode, reaper: &Reaper) -> i32 {
        match self.launch(&[], &[]) {
            Launched::Done(status) => status,
            Launched::Child(pid) => match mode {
                ExecMode::Async => {
                    reaper.adopt(pid);
                    0
                }
                ExecMode::Sync => wait(pid, reaper),
            },
        }
    }

    /// Starts the command without waiting for it. `before` and `after` are
    /// applied around the command's own redirects; pipelines wire stages with
    /// them.
    pub(crate) fn launch(&self, before: &[Redirect], after: &[Redirect]) -> Launched {
        let redirects = before.iter().chain(&self.redirects).chain(after);

        if let Some(builtin) = Builtin::classify(&self.program) {
            let _scoped = match Scoped::apply(redirects) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}", e);
                    return Launched::Done(e.status());
                }
            };
            return Launched::Done(builtin.run(self.args.as_slice()));
        }

        let argv = match self.argv() {
            Some(argv) => argv,
            None => {
                eprintln!("{}: argument contains a NUL byte", self.program);
                return Launched::Done(1);
            }
        };
        // Nothing below may allocate once forked, so every pointer and
        // message the child can need is prepared here.
        let argv_ptrs: Vec<*const libc::c_char> = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();
        let redirects: Vec<&Redirect> = redirects.collect();
        let labels: Vec<String> = redirects
            .iter()
            .map(|red| format!("{}: ", red.describe()))
            .collect();
        let not_found = format!("Command not found: {}\n", self.program);

        match unsafe { fork() } {
            Ok(ForkResult::Child) => {
                // The interpreter ignores SIGPIPE; programs expect the default.
                let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };
                for (red, label) in redirects.iter().zip(&labels) {
                    if let Err(e) = red.rewire() {
                        child_exit(&[label.as_str(), e.desc(), "\n"]);
                    }
                }
                unsafe { libc::execvp(argv_ptrs[0], argv_ptrs.as_ptr()) };
                child_exit(&[not_found.as_str()])
            }
            Ok(ForkResult::Parent { child }) => {
                tracing::debug!(pid = %child, program = %self.program, "forked");
                Launched::Child(child)
            }
            Err(e) => {
                eprintln!("fork: {}", e);
                Launched::Done(1)
            }
        }
    }

    fn argv(&self) -> Option<Vec<CString>> {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| CString::new(s.as_bytes()).ok())
            .collect()
    }
}

/// Waits for a foreground child and turns its end into an exit status.
pub(crate) fn wait(pid: Pid, reaper: &Reaper) -> i32 {
    match reaper.wait(pid) {
        Ok(status) => status.code(),
        Err(e) => {
            eprintln!("wait: {}", e);
            1
        }
    }
}

/// Leaves a forked child that failed before exec. Only raw writes and
/// `_exit` here: other interpreter threads may hold std's locks.
fn child_exit(parts: &[&str]) -> ! {
    unsafe {
        for part in parts {
            libc::write(
                libc::STDERR_FILENO,
                part.as_ptr() as *const libc::c_void,
                part.len(),
            );
        }
        libc::_exit(1)
    }
}
