use super::context::PipelineContext;
use super::phase_trait::WorkflowPhase;
use super::phases::{
    build::BuildPhase, descriptor::DescriptorPhase, discover::DiscoverPhase, image::ImagePhase,
    stage::StagePhase,
};
use crate::error::Result;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct PipelineOrchestrator {
    skip_build: bool,
}

impl PipelineOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse artifacts already in the target directory instead of building
    pub fn skip_build(mut self, skip: bool) -> Self {
        self.skip_build = skip;
        self
    }

    fn phases(&self) -> Vec<(Box<dyn WorkflowPhase>, &'static str)> {
        let mut phases: Vec<(Box<dyn WorkflowPhase>, &'static str)> =
            vec![(Box::new(DescriptorPhase), "DescriptorPhase")];
        if !self.skip_build {
            phases.push((Box::new(BuildPhase), "BuildPhase"));
        }
        phases.push((Box::new(DiscoverPhase), "DiscoverPhase"));
        phases.push((Box::new(StagePhase), "StagePhase"));
        phases.push((Box::new(ImagePhase), "ImagePhase"));
        phases
    }

    pub fn execute(&self, context: &mut PipelineContext<'_>) -> Result<()> {
        let start = Instant::now();
        info!(
            "Starting pipeline for: {}",
            context.project_dir.display()
        );

        for (phase, phase_name) in self.phases() {
            debug!("Phase: {}", phase_name);
            let phase_start = Instant::now();
            phase.execute(context)?;
            debug!(
                "Phase {} complete in {:?}",
                phase_name,
                phase_start.elapsed()
            );
        }

        info!("Pipeline complete in {:.1?}", start.elapsed());
        Ok(())
    }
}
