extern crate rustyline;

use super::Reader;
use crate::sighook::sighook;
use rustyline::{error::ReadlineError, Editor};
use std::env;
use std::path::{Path, PathBuf};

pub struct PromptReader(Editor<()>);

impl Reader for PromptReader {
    fn init(&mut self) -> anyhow::Result<()> {
        sighook()
    }

    fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        match self.0.readline(&prompt()) {
            Ok(s) => {
                if !s.trim().is_empty() {
                    self.0.add_history_entry(s.as_str());
                }
                Ok(Some(s))
            }
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl PromptReader {
    pub fn new() -> Self {
        Self(Editor::new())
    }
}

fn prompt() -> String {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("?"));
    let home = env::var_os("HOME").map(PathBuf::from);
    render(&cwd, home.as_deref())
}

/// `cwd` with a leading `home` shown as `~`, followed by ` $ `.
fn render(cwd: &Path, home: Option<&Path>) -> String {
    let shown = match home.map(|home| cwd.strip_prefix(home)) {
        Some(Ok(rest)) if rest.as_os_str().is_empty() => String::from("~"),
        Some(Ok(rest)) => format!("~/{}", rest.display()),
        _ => cwd.display().to_string(),
    };
    format!("{} $ ", shown)
}
