//! State carried from one pipeline phase to the next

use super::phases::{
    descriptor::ProjectDescriptor, discover::ArtifactSet, image::ImageBuild, stage::StagingArea,
};
use crate::config::JarboxConfig;
use crate::error::{PipelineError, Result};
use crate::output::schema::PipelineReport;
use crate::process::{BuildResult, CommandRunner};
use std::path::{Path, PathBuf};

/// Where the project lives on disk
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub project_dir: PathBuf,
    pub descriptor_path: PathBuf,
    /// Build output tree scanned for artifacts
    pub target_dir: PathBuf,
}

impl ProjectLayout {
    /// Maven conventions: `pom.xml` and `target/` under the project directory
    pub fn maven(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            descriptor_path: project_dir.join("pom.xml"),
            target_dir: project_dir.join("target"),
            project_dir,
        }
    }

    /// Relative paths are taken from the project directory
    pub fn with_descriptor(mut self, path: impl AsRef<Path>) -> Self {
        self.descriptor_path = self.project_dir.join(path);
        self
    }

    /// Relative paths are taken from the project directory
    pub fn with_target_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.target_dir = self.project_dir.join(path);
        self
    }
}

pub struct PipelineContext<'a> {
    pub config: &'a JarboxConfig,
    pub runner: &'a dyn CommandRunner,

    pub project_dir: PathBuf,
    pub descriptor_path: PathBuf,
    pub target_dir: PathBuf,

    pub descriptor: Option<ProjectDescriptor>,
    pub build: Option<BuildResult>,
    pub artifacts: Option<ArtifactSet>,
    pub staging: Option<StagingArea>,
    pub image: Option<ImageBuild>,
}

impl<'a> PipelineContext<'a> {
    pub fn new(
        config: &'a JarboxConfig,
        runner: &'a dyn CommandRunner,
        layout: ProjectLayout,
    ) -> Self {
        Self {
            config,
            runner,
            project_dir: layout.project_dir,
            descriptor_path: layout.descriptor_path,
            target_dir: layout.target_dir,
            descriptor: None,
            build: None,
            artifacts: None,
            staging: None,
            image: None,
        }
    }

    pub fn require_artifacts(&self, phase: &'static str) -> Result<&ArtifactSet> {
        self.artifacts.as_ref().ok_or(PipelineError::MissingInput {
            phase,
            input: "the artifact set",
        })
    }

    pub fn require_staging(&self, phase: &'static str) -> Result<&StagingArea> {
        self.staging.as_ref().ok_or(PipelineError::MissingInput {
            phase,
            input: "the staging area",
        })
    }

    pub fn into_report(self) -> PipelineReport {
        PipelineReport {
            project_dir: self.project_dir,
            descriptor: self.descriptor.unwrap_or_default(),
            build_skipped: self.build.is_none(),
            artifacts: self
                .artifacts
                .map(|set| set.into_paths())
                .unwrap_or_default(),
            staging: self.staging,
            image: self.image,
        }
    }
}
