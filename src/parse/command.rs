use super::{redirect, spaces, word, Word};
use crate::cmd::{Pipeline, Redirect, SimpleCommand};
use combine::{attempt, look_ahead, many, satisfy, sep_by1, token};
use combine::{Parser, Stream};
use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Arg {
    Word(Word),
    Redirect(Redirect),
}

impl Arg {
    fn parse<I: Stream<Token = char>>() -> impl Parser<I, Output = Self> {
        attempt(redirect().map(Self::Redirect)).or(word().map(Self::Word))
    }
}

/// `program { word | redirect }`
pub fn command<I: Stream<Token = char>>() -> impl Parser<I, Output = SimpleCommand> {
    (word().skip(spaces()), many(Arg::parse().skip(spaces()))).map(
        |(name, args): (Word, Vec<Arg>)| {
            let mut cmd = SimpleCommand::new(name.text);
            for arg in args {
                match arg {
                    Arg::Word(w) => {
                        for expanded in expand(w) {
                            cmd.push_arg(expanded);
                        }
                    }
                    Arg::Redirect(r) => cmd.push_redirect(r),
                }
            }
            cmd
        },
    )
}

/// `command { '|' command }`; a `||` is left for the list parser.
pub fn pipeline<I: Stream<Token = char>>() -> impl Parser<I, Output = Pipeline> {
    sep_by1(
        command(),
        attempt(token('|').skip(look_ahead(satisfy(|c| c != '|')))).skip(spaces()),
    )
    .map(|stages: Vec<SimpleCommand>| {
        let mut pipeline = Pipeline::new();
        for stage in stages {
            pipeline.push(stage);
        }
        pipeline
    })
}

/// Expands a leading `~` and then glob patterns in an unquoted word. A
/// pattern with no match stays literal.
fn expand(word: Word) -> Vec<String> {
    if word.quoted {
        return vec![word.text];
    }
    let home = env::var("HOME").ok();
    let text = expand_tilde(word.text, home.as_deref());
    if !text.contains(|c: char| c == '*' || c == '?' || c == '[') {
        return vec![text];
    }

    let matches: Vec<String> = match glob::glob(&text) {
        Ok(paths) => paths
            .filter_map(Result::ok)
            .map(|p| p.display().to_string())
            .collect(),
        Err(e) => {
            tracing::debug!(pattern = %text, "invalid glob pattern: {}", e);
            Vec::new()
        }
    };

    if matches.is_empty() {
        vec![text]
    } else {
        matches
    }
}

/// `~` and `~/rest` name the home directory; `~user` is left alone.
fn expand_tilde(text: String, home: Option<&str>) -> String {
    let home = match home {
        Some(home) if !home.is_empty() => home,
        _ => return text,
    };
    if text == "~" {
        String::from(home)
    } else if let Some(rest) = text.strip_prefix("~/") {
        format!("{}/{}", home.trim_end_matches('/'), rest)
    } else {
        text
    }
}
