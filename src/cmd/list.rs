use super::Pipeline;
use crate::error::ExecResult;
use crate::job::Reaper;

/// How a pipeline is chained to the one before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinMode {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `;` or `&`
    Then,
}

/// Pipelines run one after another, short-circuited by their joins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandList {
    pipelines: Vec<Pipeline>,
    joins: Vec<JoinMode>,
}

impl From<Pipeline> for CommandList {
    fn from(pipeline: Pipeline) -> Self {
        Self {
            pipelines: vec![pipeline],
            joins: Vec::new(),
        }
    }
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `pipeline` joined to the current last one by `join`. The join
    /// is dropped when the list is still empty.
    pub fn push(&mut self, join: JoinMode, pipeline: Pipeline) {
        if !self.pipelines.is_empty() {
            self.joins.push(join);
        }
        self.pipelines.push(pipeline);
    }

    pub fn and(mut self, pipeline: Pipeline) -> Self {
        self.push(JoinMode::And, pipeline);
        self
    }

    pub fn or(mut self, pipeline: Pipeline) -> Self {
        self.push(JoinMode::Or, pipeline);
        self
    }

    pub fn then(mut self, pipeline: Pipeline) -> Self {
        self.push(JoinMode::Then, pipeline);
        self
    }

    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }

    pub fn joins(&self) -> &[JoinMode] {
        &self.joins
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Runs the pipelines in order and returns the status of the last one
    /// that actually ran.
    pub fn execute(&self, reaper: &Reaper) -> ExecResult<i32> {
        let mut status = 0;
        for (i, pipeline) in self.pipelines.iter().enumerate() {
            status = pipeline.execute(reaper)?;

            match self.joins.get(i) {
                Some(JoinMode::And) if status != 0 => break,
                Some(JoinMode::Or) if status == 0 => break,
                _ => (),
            }
        }
        Ok(status)
    }
}
