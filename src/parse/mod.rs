mod chars;
mod command;
mod line;
mod redirect;

pub use chars::{spaces, word, Word};
pub use command::{command, pipeline};
pub use redirect::redirect;

use crate::cmd::CommandList;
use combine::EasyParser;

/// Parses one input line. An empty or comment-only line gives an empty list.
pub fn parse_line(input: &str) -> anyhow::Result<CommandList> {
    match line::line().easy_parse(input) {
        Ok((entries, _)) => line::assemble(entries),
        Err(e) => anyhow::bail!(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{JoinMode, Redirect};

    #[test]
    fn full_line() {
        let list = parse_line("ls -l | grep src > out.txt && cat out.txt # show it").unwrap();
        assert_eq!(list.joins(), &[JoinMode::And]);

        let first = &list.pipelines()[0];
        assert_eq!(first.stages().len(), 2);
        assert_eq!(first.stages()[1].args(), &["src"]);
        assert_eq!(first.stages()[1].redirects(), &[Redirect::output(1, "out.txt")]);

        let second = &list.pipelines()[1];
        assert_eq!(second.stages()[0].program(), "cat");
    }

    #[test]
    fn errors() {
        assert!(parse_line("echo 'unterminated").is_err());
        assert!(parse_line("| wc").is_err());
        assert!(parse_line("echo >").is_err());
        assert!(parse_line("true ;; false").is_err());
    }
}
