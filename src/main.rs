extern crate anyhow;

use anyhow::Context;
use minish::config::Config;
use minish::job::{ExitLog, Reaper};
use minish::session::{IOReader, PromptReader, Session};
use std::env;
use std::io::Cursor;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let status = run().unwrap_or_else(|e| {
        eprintln!("{:#}", e);
        1
    });
    process::exit(status);
}

fn run() -> anyhow::Result<i32> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.trace))
        .with_writer(std::io::stderr)
        .init();

    let reaper = Reaper::install(ExitLog::new(config.log_file))?;
    let args: Vec<String> = env::args().skip(1).collect();

    match args.as_slice() {
        [] => Session::new(PromptReader::new(), reaper)?.all(),
        [flag, line] if flag == "-c" => {
            Session::new(IOReader::new(Cursor::new(line.clone())), reaper)?.all()
        }
        [path] => {
            let reader = IOReader::new_file(path).with_context(|| format!("{}: cannot open", path))?;
            Session::new(reader, reaper)?.all()
        }
        _ => anyhow::bail!("Usage: minish [FILE | -c LINE]"),
    }
}
