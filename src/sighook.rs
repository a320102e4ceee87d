extern crate signal_hook;

use anyhow::Context;
use signal_hook::consts::signal;
use signal_hook::iterator::Signals;
use std::io::{self, Write};
use std::thread;

/// Keeps SIGINT from killing the interpreter. The foreground child still gets
/// it from the terminal, since exec restores the default disposition.
pub fn sighook() -> anyhow::Result<()> {
    let mut signals = Signals::new(&[signal::SIGINT]).context("Failed to initialize signals.")?;

    thread::spawn(move || {
        for _ in signals.forever() {
            let mut stdout = io::stdout();
            let _ = writeln!(stdout).and_then(|_| stdout.flush());
        }
    });
    Ok(())
}
