use super::{spaces, word};
use crate::cmd::redirect::{Redirect, STDIN, STDOUT};
use combine::parser::char::{self, digit};
use combine::{attempt, choice, optional, token};
use combine::{Parser, Stream};
use std::os::unix::io::RawFd;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    /// `>`
    Overwrite,
    /// `>>`
    Append,
    /// `<`
    Input,
    /// `>&`
    Duplicate,
}

impl Op {
    fn parse<I: Stream<Token = char>>() -> impl Parser<I, Output = Self> {
        choice((
            attempt(char::string(">>")).map(|_| Self::Append),
            attempt(char::string(">&")).map(|_| Self::Duplicate),
            token('>').map(|_| Self::Overwrite),
            token('<').map(|_| Self::Input),
        ))
    }

    fn default_fd(self) -> RawFd {
        match self {
            Self::Input => STDIN,
            _ => STDOUT,
        }
    }
}

/// `[n]> word`, `[n]>> word`, `[n]< word`, `[n]>&m`
pub fn redirect<I: Stream<Token = char>>() -> impl Parser<I, Output = Redirect> {
    (optional(digit()), Op::parse()).then(|(fd, op)| {
        let source = fd.map_or(op.default_fd(), fd_number);
        match op {
            Op::Duplicate => spaces()
                .with(digit())
                .map(move |target| Redirect::dup(source, fd_number(target)))
                .left(),
            _ => spaces()
                .with(word())
                .map(move |target| match op {
                    Op::Append => Redirect::append(source, target.text),
                    Op::Input => Redirect::input(source, target.text),
                    _ => Redirect::output(source, target.text),
                })
                .right(),
        }
    })
}

fn fd_number(c: char) -> RawFd {
    c.to_digit(10).map_or(0, |d| d as RawFd)
}
