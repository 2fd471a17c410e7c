use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the pipeline steps
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read project descriptor {path:?}: {source}")]
    DescriptorRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed project descriptor {path:?}: {source}")]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("{tool} not found. Install it or point jarbox at it with the matching --*-tool flag")]
    ToolNotFound {
        tool: String,
        #[source]
        source: which::Error,
    },

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{step} failed: `{command}` exited with {status}")]
    ToolFailed {
        step: &'static str,
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to scan {path:?} for artifacts: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to create staging area: {0}")]
    StagingCreate(#[source] io::Error),

    #[error("Failed to move {from:?} to {to:?}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Artifact name collision on {name}: {existing:?} and {incoming:?}")]
    Collision {
        name: String,
        existing: PathBuf,
        incoming: PathBuf,
    },

    #[error("Failed to list staging area {path:?}: {source}")]
    StagingList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Staging area {path:?} contains no artifacts")]
    EmptyStagingArea { path: PathBuf },

    #[error("Primary artifact {name} is not in the staging area (staged: {})", .staged.join(", "))]
    PrimaryNotFound { name: String, staged: Vec<String> },

    #[error("Failed to write {path:?}: {source}")]
    WriteDockerfile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{phase} ran before {input} was available")]
    MissingInput {
        phase: &'static str,
        input: &'static str,
    },
}

impl PipelineError {
    /// Captured stderr of a failed tool, if this error carries one
    pub fn tool_stderr(&self) -> Option<&str> {
        match self {
            PipelineError::ToolFailed { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
