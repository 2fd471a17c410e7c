use super::discover::ArtifactSet;
use crate::error::{PipelineError, Result};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

const STAGING_PREFIX: &str = "jarbox-";

/// What to do when two artifacts share a file name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Fail before moving the second file
    #[default]
    Reject,
    /// Stage the later file as `name-1.jar`, `name-2.jar`, ...
    Rename,
    /// Later file replaces the earlier one
    Overwrite,
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(CollisionPolicy::Reject),
            "rename" => Ok(CollisionPolicy::Rename),
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            other => Err(format!(
                "Invalid collision policy: {}. Valid options: reject, rename, overwrite",
                other
            )),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollisionPolicy::Reject => "reject",
            CollisionPolicy::Rename => "rename",
            CollisionPolicy::Overwrite => "overwrite",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedArtifact {
    pub source: PathBuf,
    pub staged: PathBuf,
}

/// Temporary directory holding the artifacts that go into the image
#[derive(Debug, Clone, Serialize)]
pub struct StagingArea {
    pub path: PathBuf,
    pub artifacts: Vec<StagedArtifact>,
}

/// Creates a uniquely named directory that outlives the process
pub fn create_staging_dir(parent: Option<&Path>) -> Result<PathBuf> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(STAGING_PREFIX);

    let dir = match parent {
        Some(parent) => builder.tempdir_in(parent),
        None => builder.tempdir(),
    }
    .map_err(PipelineError::StagingCreate)?;

    #[allow(deprecated)]
    let path = dir.into_path();
    Ok(path)
}

/// Moves every artifact into `staging_dir`, flattening source directories
pub fn stage_artifacts(
    artifacts: &ArtifactSet,
    staging_dir: &Path,
    policy: CollisionPolicy,
) -> Result<Vec<StagedArtifact>> {
    let mut staged: Vec<StagedArtifact> = Vec::with_capacity(artifacts.len());
    let mut claimed: HashMap<OsString, PathBuf> = HashMap::new();

    for source in artifacts.paths() {
        let Some(name) = source.file_name() else {
            warn!("Skipping artifact without a file name: {}", source.display());
            continue;
        };
        let mut destination = staging_dir.join(name);

        if let Some(existing) = claimed.get(name) {
            match policy {
                CollisionPolicy::Reject => {
                    return Err(PipelineError::Collision {
                        name: name.to_string_lossy().into_owned(),
                        existing: existing.clone(),
                        incoming: source.clone(),
                    });
                }
                CollisionPolicy::Overwrite => {
                    warn!(
                        "{} replaces {} in the staging area",
                        source.display(),
                        existing.display()
                    );
                    staged.retain(|artifact| artifact.staged != destination);
                }
                CollisionPolicy::Rename => {
                    destination = next_free_name(staging_dir, name);
                    debug!(
                        "Staging {} as {}",
                        source.display(),
                        destination.display()
                    );
                }
            }
        }

        move_file(source, &destination)?;

        if let Some(staged_name) = destination.file_name() {
            claimed.insert(staged_name.to_os_string(), source.clone());
        }
        staged.push(StagedArtifact {
            source: source.clone(),
            staged: destination,
        });
    }

    Ok(staged)
}

fn next_free_name(dir: &Path, name: &std::ffi::OsStr) -> PathBuf {
    let original = Path::new(name);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = dir.join(format!("{}-{}{}", stem, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Rename, falling back to copy + delete across filesystems
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    let move_error = |source| PipelineError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    fs::copy(from, to).map_err(move_error)?;
    fs::remove_file(from).map_err(move_error)?;
    Ok(())
}

pub struct StagePhase;

impl WorkflowPhase for StagePhase {
    fn execute(&self, context: &mut PipelineContext<'_>) -> Result<()> {
        let artifacts = context.require_artifacts("Stage")?;
        let staging_dir = create_staging_dir(context.config.staging_parent.as_deref())?;
        let staged = stage_artifacts(artifacts, &staging_dir, context.config.collision_policy)?;

        info!(
            "Moved {} artifact(s) to staging area {}",
            staged.len(),
            staging_dir.display()
        );
        context.staging = Some(StagingArea {
            path: staging_dir,
            artifacts: staged,
        });
        Ok(())
    }
}
