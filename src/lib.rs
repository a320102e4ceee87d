extern crate anyhow;
extern crate combine;

pub mod cmd;
pub mod config;
pub mod error;
pub mod job;
pub mod parse;
pub mod session;
pub mod sighook;
