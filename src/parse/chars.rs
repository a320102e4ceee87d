use combine::parser::char;
use combine::{any, attempt, choice, look_ahead, many, many1, optional, satisfy, skip_many, token};
use combine::{Parser, Stream};

/// Characters that end a bare word.
const SPECIAL: &str = "|&;<>'\"";

/// One argument as typed: its text after quote removal, and whether any
/// part of it was quoted (quoted words are never glob-expanded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub quoted: bool,
}

/// Blanks, then an optional `#` comment running to the end of the input.
pub fn spaces<I: Stream<Token = char>>() -> impl Parser<I, Output = ()> {
    skip_many(satisfy(|c: char| c.is_whitespace()))
        .with(optional(token('#').with(skip_many(any()))))
        .map(|_| ())
}

pub fn word<I: Stream<Token = char>>() -> impl Parser<I, Output = Word> {
    look_ahead(satisfy(|c| c != '#'))
        .with(many1(choice((
            raw_str().map(|s| (s, true)),
            lit_str().map(|s| (s, true)),
            bare().map(|s| (s, false)),
        ))))
        .map(|parts: Vec<(String, bool)>| {
            let quoted = parts.iter().any(|(_, q)| *q);
            let text = parts.into_iter().map(|(s, _)| s).collect();
            Word { text, quoted }
        })
}

fn bare<I: Stream<Token = char>>() -> impl Parser<I, Output = String> {
    many1(satisfy(|c: char| !c.is_whitespace() && !SPECIAL.contains(c)))
}

fn lit_str<I: Stream<Token = char>>() -> impl Parser<I, Output = String> {
    token('"')
        .with(many(satisfy(|c| c != '"').then(|c| {
            if c == '\\' {
                choice((
                    token('n').map(|_| '\n'),
                    token('t').map(|_| '\t'),
                    token('\\'),
                    token('"'),
                ))
                .left()
            } else {
                combine::value(c).right()
            }
        })))
        .skip(token('"'))
}

fn raw_str<I: Stream<Token = char>>() -> impl Parser<I, Output = String> {
    token('\'')
        .with(many(choice((
            attempt(char::string("\\\\")).map(|_| '\\'),
            attempt(char::string("\\'")).map(|_| '\''),
            satisfy(|c| c != '\''),
        ))))
        .skip(token('\''))
}
