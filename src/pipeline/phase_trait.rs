use super::context::PipelineContext;
use crate::error::Result;

pub trait WorkflowPhase {
    fn execute(&self, context: &mut PipelineContext<'_>) -> Result<()>;
}
