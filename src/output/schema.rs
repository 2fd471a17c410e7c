//! Run report
//!
//! Summary of one pipeline run, rendered as human text or JSON by the CLI.

use crate::pipeline::phases::descriptor::ProjectDescriptor;
use crate::pipeline::phases::image::ImageBuild;
use crate::pipeline::phases::stage::StagingArea;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub project_dir: PathBuf,
    pub descriptor: ProjectDescriptor,
    /// The build tool was not run (`--skip-build`)
    pub build_skipped: bool,
    /// Artifact locations as discovered, before staging moved them
    pub artifacts: Vec<PathBuf>,
    pub staging: Option<StagingArea>,
    pub image: Option<ImageBuild>,
}
