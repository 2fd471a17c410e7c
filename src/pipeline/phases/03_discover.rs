use crate::error::{PipelineError, Result};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Artifact paths in the order the directory walk produced them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
    paths: Vec<PathBuf>,
}

impl ArtifactSet {
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

impl FromIterator<PathBuf> for ArtifactSet {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

/// Every regular file under `root` whose name ends with `suffix`
pub fn locate_artifacts(root: &Path, suffix: &str) -> Result<ArtifactSet> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| PipelineError::Scan {
            path: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            debug!("Found artifact {}", entry.path().display());
            paths.push(entry.into_path());
        }
    }

    Ok(ArtifactSet { paths })
}

pub struct DiscoverPhase;

impl WorkflowPhase for DiscoverPhase {
    fn execute(&self, context: &mut PipelineContext<'_>) -> Result<()> {
        let artifacts = locate_artifacts(&context.target_dir, &context.config.artifact_suffix)?;

        if artifacts.is_empty() {
            warn!(
                "No {} files found under {}",
                context.config.artifact_suffix,
                context.target_dir.display()
            );
        } else {
            let listing: Vec<String> = artifacts
                .paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            info!("Found {} artifact(s): {}", artifacts.len(), listing.join(", "));
        }

        context.artifacts = Some(artifacts);
        Ok(())
    }
}
