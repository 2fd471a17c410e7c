use crate::config::JarboxConfig;
use crate::error::Result;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::process::{BuildResult, CommandRunner, Invocation};
use std::path::Path;
use tracing::info;

const STEP: &str = "Maven build";

pub fn build_invocation(config: &JarboxConfig, project_dir: &Path) -> Invocation {
    Invocation::new(config.build_tool.clone(), config.build_args.iter().cloned())
        .current_dir(project_dir)
}

/// Runs `<build-tool> clean package` and returns its result, failed or not
pub fn run_build(
    runner: &dyn CommandRunner,
    config: &JarboxConfig,
    project_dir: &Path,
) -> Result<BuildResult> {
    let invocation = build_invocation(config, project_dir);
    info!("Running `{}` in {}", invocation.display(), project_dir.display());
    runner.run(&invocation)
}

pub struct BuildPhase;

impl WorkflowPhase for BuildPhase {
    fn execute(&self, context: &mut PipelineContext<'_>) -> Result<()> {
        let result = run_build(context.runner, context.config, &context.project_dir)?;

        if !result.success {
            return Err(result.into_error(STEP));
        }

        info!("{} succeeded", STEP);
        if !result.stdout.trim().is_empty() {
            info!("{}", result.stdout.trim_end());
        }
        context.build = Some(result);
        Ok(())
    }
}
