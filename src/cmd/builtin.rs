use crate::error::{ExecError, ExecResult};
use std::io::Write;

/// Commands run inside the interpreter instead of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Exit,
    Pwd,
}

impl Builtin {
    /// `None` means "not a builtin, run it as a program".
    pub fn classify<T: AsRef<str>>(name: T) -> Option<Self> {
        Some(match name.as_ref() {
            "cd" => Self::Cd,
            "exit" => Self::Exit,
            "pwd" => Self::Pwd,
            _ => return None,
        })
    }

    /// Runs the builtin and returns its exit status. Failures are reported on
    /// stderr.
    pub fn run<T: AsRef<str>>(self, args: &[T]) -> i32 {
        let res = match self {
            Self::Cd => cd(args),
            Self::Exit => exit(),
            Self::Pwd => pwd(),
        };
        match res {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{}", e);
                e.status()
            }
        }
    }
}

fn cd<T: AsRef<str>>(args: &[T]) -> ExecResult<()> {
    let path: &str = match args {
        [] => return Err(ExecError::usage("cd: missing argument")),
        [path] => path.as_ref(),
        _ => return Err(ExecError::usage("cd: too many arguments")),
    };

    std::env::set_current_dir(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ExecError::NotFound {
            name: format!("cd: {}", path),
        },
        _ => ExecError::os(format!("cd: {}", path), e),
    })
}

fn exit() -> ExecResult<()> {
    let _ = std::io::stdout().flush();
    std::process::exit(0);
}

fn pwd() -> ExecResult<()> {
    let dir = std::env::current_dir().map_err(|e| ExecError::os("pwd", e))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", dir.display())
        .and_then(|_| out.flush())
        .map_err(|e| ExecError::os("pwd", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn classify() {
        assert_eq!(Builtin::classify("cd"), Some(Builtin::Cd));
        assert_eq!(Builtin::classify("exit"), Some(Builtin::Exit));
        assert_eq!(Builtin::classify("pwd"), Some(Builtin::Pwd));
        assert_eq!(Builtin::classify("ls"), None);
        assert_eq!(Builtin::classify(""), None);
    }

    #[test]
    #[serial]
    fn cd_without_argument() {
        let before = std::env::current_dir().unwrap();
        let none: [&str; 0] = [];
        assert_eq!(Builtin::Cd.run(&none), 1);
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn cd_into_missing_directory() {
        let before = std::env::current_dir().unwrap();
        assert_eq!(Builtin::Cd.run(&["/nonexistent-dir/for/sure"]), 1);
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn cd_with_extra_arguments() {
        let before = std::env::current_dir().unwrap();
        assert_eq!(Builtin::Cd.run(&["/", "/tmp"]), 1);
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    #[serial]
    fn cd_changes_directory() {
        let before = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().canonicalize().unwrap();

        assert_eq!(Builtin::Cd.run(&[target.to_str().unwrap()]), 0);
        assert_eq!(std::env::current_dir().unwrap(), target);

        std::env::set_current_dir(before).unwrap();
    }

    #[test]
    #[serial]
    fn cd_reports_the_real_cause() {
        let before = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "").unwrap();
        let file = file.display().to_string();

        match cd(&[file.as_str()]) {
            Err(e @ ExecError::Io { .. }) => {
                assert_eq!(e.to_string(), format!("cd: {}: Not a directory", file))
            }
            other => panic!("unexpected: {:?}", other),
        }
        match cd(&["/nonexistent-dir/for/sure"]) {
            Err(ExecError::NotFound { name }) => assert_eq!(name, "cd: /nonexistent-dir/for/sure"),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
