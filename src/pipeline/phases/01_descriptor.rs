//! Maven project descriptor (pom.xml)

use crate::error::{PipelineError, Result};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use roxmltree::{Document, Node};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

pub const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";

/// Shown in place of a field the descriptor does not declare
pub const NOT_FOUND: &str = "Not found";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectDescriptor {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

impl ProjectDescriptor {
    pub fn parse(content: &str) -> Result<Self, roxmltree::Error> {
        let doc = Document::parse(content)?;
        let root = doc.root_element();

        Ok(Self {
            group_id: pom_child_text(root, "groupId"),
            artifact_id: pom_child_text(root, "artifactId"),
            version: pom_child_text(root, "version"),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| PipelineError::DescriptorRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content).map_err(|source| PipelineError::DescriptorParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// File name Maven gives the main artifact: `<artifactId>-<version><suffix>`
    pub fn default_artifact_name(&self, suffix: &str) -> Option<String> {
        match (&self.artifact_id, &self.version) {
            (Some(artifact_id), Some(version)) => {
                Some(format!("{}-{}{}", artifact_id, version, suffix))
            }
            _ => None,
        }
    }
}

impl fmt::Display for ProjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |field: &Option<String>| field.clone().unwrap_or_else(|| NOT_FOUND.to_string());
        write!(
            f,
            "groupId: {}, artifactId: {}, version: {}",
            show(&self.group_id),
            show(&self.artifact_id),
            show(&self.version)
        )
    }
}

/// Text of a direct child of `<project>` in the POM namespace
fn pom_child_text(root: Node<'_, '_>, name: &str) -> Option<String> {
    root.children()
        .filter(|child| child.is_element())
        .find(|child| {
            child.tag_name().name() == name && child.tag_name().namespace() == Some(POM_NAMESPACE)
        })
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

pub struct DescriptorPhase;

impl WorkflowPhase for DescriptorPhase {
    fn execute(&self, context: &mut PipelineContext<'_>) -> Result<()> {
        let descriptor = ProjectDescriptor::from_path(&context.descriptor_path)?;
        info!("POM info: {}", descriptor);
        context.descriptor = Some(descriptor);
        Ok(())
    }
}
