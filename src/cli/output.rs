//! Output formatting for run reports and descriptors
//!
//! # Example
//!
//! ```ignore
//! use jarbox::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! println!("{}", formatter.format_report(&report)?);
//! ```

use anyhow::{Context, Result};

use crate::output::schema::PipelineReport;
use crate::pipeline::phases::descriptor::{ProjectDescriptor, NOT_FOUND};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &PipelineReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
            }
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_descriptor(&self, descriptor: &ProjectDescriptor) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(descriptor)
                .context("Failed to serialize descriptor to JSON"),
            OutputFormat::Human => Ok(self.format_descriptor_human(descriptor)),
        }
    }

    fn format_descriptor_human(&self, descriptor: &ProjectDescriptor) -> String {
        let show = |field: &Option<String>| field.as_deref().unwrap_or(NOT_FOUND).to_string();
        let mut output = String::new();
        output.push_str(&format!("\u{251C}\u{2500} Group:     {}\n", show(&descriptor.group_id)));
        output.push_str(&format!(
            "\u{251C}\u{2500} Artifact:  {}\n",
            show(&descriptor.artifact_id)
        ));
        output.push_str(&format!("\u{2514}\u{2500} Version:   {}\n", show(&descriptor.version)));
        output
    }

    fn format_report_human(&self, report: &PipelineReport) -> String {
        let mut output = String::new();

        if report.image.is_some() {
            output.push_str("\u{2713} Image Build Result\n");
        } else {
            output.push_str("\u{26A0} Image Build Result (incomplete)\n");
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Project:  {}\n\n", report.project_dir.display()));
        output.push_str("Descriptor:\n");
        output.push_str(&self.format_descriptor_human(&report.descriptor));
        output.push('\n');

        if report.build_skipped {
            output.push_str("Build:    skipped\n\n");
        }

        output.push_str("Artifacts:\n");
        if report.artifacts.is_empty() {
            output.push_str("\u{2514}\u{2500} (none found)\n");
        } else {
            for (i, artifact) in report.artifacts.iter().enumerate() {
                let is_last = i == report.artifacts.len() - 1;
                let connector = if is_last { "\u{2514}" } else { "\u{251C}" };
                output.push_str(&format!("{}\u{2500} {}\n", connector, artifact.display()));
            }
        }
        output.push('\n');

        if let Some(staging) = &report.staging {
            output.push_str(&format!("Staging:  {}\n", staging.path.display()));
        }

        if let Some(image) = &report.image {
            output.push_str("Image:\n");
            output.push_str(&format!("\u{251C}\u{2500} Tag:         {}\n", image.tag));
            output.push_str(&format!(
                "\u{251C}\u{2500} Entry Point: java -jar {}\n",
                image.primary_artifact
            ));
            output.push_str(&format!(
                "\u{2514}\u{2500} Dockerfile:  {}\n",
                image.dockerfile.display()
            ));
        }

        output
    }
}
