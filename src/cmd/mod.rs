//! The execution engine: commands, pipelines and lists of pipelines.

mod builtin;
mod list;
mod pipeline;
pub mod redirect;
mod simple;

pub use builtin::Builtin;
pub use list::{CommandList, JoinMode};
pub use pipeline::Pipeline;
pub use redirect::Redirect;
pub use simple::SimpleCommand;

use crate::error::ExecResult;
use crate::job::Reaper;

/// Whether the caller waits for what it starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    Sync,
    Async,
}

impl Default for ExecMode {
    fn default() -> Self {
        Self::Sync
    }
}

/// Anything the grammar can hand over for execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Executable {
    Command(SimpleCommand),
    Pipeline(Pipeline),
    List(CommandList),
}

impl From<SimpleCommand> for Executable {
    fn from(cmd: SimpleCommand) -> Self {
        Self::Command(cmd)
    }
}

impl From<Pipeline> for Executable {
    fn from(pipeline: Pipeline) -> Self {
        Self::Pipeline(pipeline)
    }
}

impl From<CommandList> for Executable {
    fn from(list: CommandList) -> Self {
        Self::List(list)
    }
}

impl Executable {
    pub fn execute(&self, reaper: &Reaper) -> ExecResult<i32> {
        match self {
            Self::Command(cmd) => Ok(cmd.execute(ExecMode::Sync, reaper)),
            Self::Pipeline(pipeline) => pipeline.execute(reaper),
            Self::List(list) => list.execute(reaper),
        }
    }
}
