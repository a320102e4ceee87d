mod log;
mod reaper;
mod status;

pub use log::ExitLog;
pub use nix::sys::signal::Signal;
pub use nix::unistd::Pid;
pub use reaper::Reaper;
pub use status::Status;
