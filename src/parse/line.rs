use super::{pipeline, spaces};
use crate::cmd::{CommandList, JoinMode, Pipeline};
use combine::parser::char;
use combine::{attempt, choice, eof, many, optional, token};
use combine::{Parser, Stream};

/// What follows a pipeline on the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sep {
    And,
    Or,
    Semi,
    Background,
}

impl Sep {
    fn parse<I: Stream<Token = char>>() -> impl Parser<I, Output = Self> {
        choice((
            attempt(char::string("&&")).map(|_| Self::And),
            attempt(char::string("||")).map(|_| Self::Or),
            token(';').map(|_| Self::Semi),
            token('&').map(|_| Self::Background),
        ))
    }

    fn join(self) -> JoinMode {
        match self {
            Self::And => JoinMode::And,
            Self::Or => JoinMode::Or,
            Self::Semi | Self::Background => JoinMode::Then,
        }
    }
}

/// Every pipeline of the line with the separator written after it.
pub fn line<I: Stream<Token = char>>() -> impl Parser<I, Output = Vec<(Pipeline, Option<Sep>)>> {
    spaces()
        .with(many(
            pipeline().and(optional(Sep::parse().skip(spaces()))),
        ))
        .skip(eof())
}

/// Folds parsed pipelines into a command list. `&&`/`||` need a right-hand
/// side; `;` and `&` may end the line.
pub fn assemble(entries: Vec<(Pipeline, Option<Sep>)>) -> anyhow::Result<CommandList> {
    let mut list = CommandList::new();
    let mut last = None;

    for (mut pipeline, sep) in entries {
        let join = match last {
            Some(prev) => Sep::join(prev),
            None if list.is_empty() => JoinMode::Then,
            None => anyhow::bail!("Missing operator between commands."),
        };
        if sep == Some(Sep::Background) {
            pipeline.set_async();
        }
        list.push(join, pipeline);
        last = sep;
    }

    match last {
        Some(Sep::And) => anyhow::bail!("Expected a command after \"&&\"."),
        Some(Sep::Or) => anyhow::bail!("Expected a command after \"||\"."),
        _ => Ok(list),
    }
}
