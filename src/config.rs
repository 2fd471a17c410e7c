use crate::pipeline::phases::stage::CollisionPolicy;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_BUILD_TOOL: &str = "mvn";
const DEFAULT_CONTAINER_TOOL: &str = "docker";
const DEFAULT_IMAGE_TAG: &str = "my-java-app";
const DEFAULT_BASE_IMAGE: &str = "openjdk:8-jdk-alpine";
const DEFAULT_WORKDIR: &str = "/app";
const DEFAULT_ARTIFACT_SUFFIX: &str = ".jar";
const DEFAULT_OUTPUT_LIMIT: usize = 1_048_576; // 1MB per stream
const MIN_OUTPUT_LIMIT: usize = 1024;
const MAX_OUTPUT_LIMIT: usize = 268_435_456;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct JarboxConfig {
    pub build_tool: String,
    pub build_args: Vec<String>,
    pub container_tool: String,
    pub image_tag: String,
    pub base_image: String,
    pub workdir: String,
    pub artifact_suffix: String,
    /// Bytes of trailing output kept per captured stream
    pub output_limit: usize,
    pub collision_policy: CollisionPolicy,
    pub primary_artifact: Option<String>,
    /// Parent directory for the staging area, system temp dir when unset
    pub staging_parent: Option<PathBuf>,
}

impl Default for JarboxConfig {
    fn default() -> Self {
        Self {
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
            build_args: vec!["clean".to_string(), "package".to_string()],
            container_tool: DEFAULT_CONTAINER_TOOL.to_string(),
            image_tag: DEFAULT_IMAGE_TAG.to_string(),
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            workdir: DEFAULT_WORKDIR.to_string(),
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
            output_limit: DEFAULT_OUTPUT_LIMIT,
            collision_policy: CollisionPolicy::default(),
            primary_artifact: None,
            staging_parent: None,
        }
    }
}

impl JarboxConfig {
    /// Built-in defaults overridden by `JARBOX_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(tool) = env_string("JARBOX_BUILD_TOOL") {
            config.build_tool = tool;
        }
        if let Some(args) = env_string("JARBOX_BUILD_ARGS") {
            config.build_args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Some(tool) = env_string("JARBOX_CONTAINER_TOOL") {
            config.container_tool = tool;
        }
        if let Some(tag) = env_string("JARBOX_IMAGE_TAG") {
            config.image_tag = tag;
        }
        if let Some(image) = env_string("JARBOX_BASE_IMAGE") {
            config.base_image = image;
        }
        if let Some(workdir) = env_string("JARBOX_WORKDIR") {
            config.workdir = workdir;
        }
        if let Some(suffix) = env_string("JARBOX_ARTIFACT_SUFFIX") {
            config.artifact_suffix = suffix;
        }
        if let Some(limit) = env_string("JARBOX_OUTPUT_LIMIT") {
            config.output_limit = limit.parse::<usize>().map_err(|e| ConfigError::ParseError {
                field: "JARBOX_OUTPUT_LIMIT".to_string(),
                error: e.to_string(),
            })?;
        }
        if let Some(policy) = env_string("JARBOX_COLLISION_POLICY") {
            config.collision_policy =
                policy
                    .parse::<CollisionPolicy>()
                    .map_err(|error| ConfigError::ParseError {
                        field: "JARBOX_COLLISION_POLICY".to_string(),
                        error,
                    })?;
        }
        config.primary_artifact = env_string("JARBOX_PRIMARY_ARTIFACT");
        config.staging_parent = env_string("JARBOX_STAGING_PARENT").map(PathBuf::from);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("Build tool", &self.build_tool),
            ("Container tool", &self.container_tool),
            ("Image tag", &self.image_tag),
            ("Base image", &self.base_image),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }

        // These end up verbatim in Dockerfile lines or on a command line
        let single_line = [
            ("Build tool", &self.build_tool),
            ("Container tool", &self.container_tool),
            ("Image tag", &self.image_tag),
            ("Base image", &self.base_image),
            ("Image working directory", &self.workdir),
            ("Artifact suffix", &self.artifact_suffix),
        ]
        .into_iter()
        .chain(self.build_args.iter().map(|arg| ("Build argument", arg)))
        .chain(
            self.primary_artifact
                .iter()
                .map(|primary| ("Primary artifact", primary)),
        );
        for (name, value) in single_line {
            if value.chars().any(char::is_control) {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must not contain control characters, got {:?}",
                    name, value
                )));
            }
        }

        if self.artifact_suffix.len() < 2 || !self.artifact_suffix.starts_with('.') {
            return Err(ConfigError::ValidationFailed(format!(
                "Artifact suffix must look like '.jar', got '{}'",
                self.artifact_suffix
            )));
        }

        if !self.workdir.starts_with('/') {
            return Err(ConfigError::ValidationFailed(format!(
                "Image working directory must be absolute, got '{}'",
                self.workdir
            )));
        }

        if self.output_limit < MIN_OUTPUT_LIMIT {
            return Err(ConfigError::ValidationFailed(
                "Output limit must be at least 1KB".to_string(),
            ));
        }
        if self.output_limit > MAX_OUTPUT_LIMIT {
            return Err(ConfigError::ValidationFailed(
                "Output limit cannot exceed 256MB".to_string(),
            ));
        }

        if let Some(primary) = &self.primary_artifact {
            if primary.contains('/') || primary.contains('\\') {
                return Err(ConfigError::ValidationFailed(format!(
                    "Primary artifact must be a file name, got '{}'",
                    primary
                )));
            }
        }

        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl fmt::Display for JarboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Jarbox Configuration:")?;
        writeln!(
            f,
            "  Build Command: {} {}",
            self.build_tool,
            self.build_args.join(" ")
        )?;
        writeln!(f, "  Container Tool: {}", self.container_tool)?;
        writeln!(f, "  Image Tag: {}", self.image_tag)?;
        writeln!(f, "  Base Image: {}", self.base_image)?;
        writeln!(f, "  Workdir: {}", self.workdir)?;
        writeln!(f, "  Artifact Suffix: {}", self.artifact_suffix)?;
        writeln!(f, "  Output Limit: {} bytes", self.output_limit)?;
        writeln!(f, "  Collision Policy: {}", self.collision_policy)?;
        if let Some(ref primary) = self.primary_artifact {
            writeln!(f, "  Primary Artifact: {}", primary)?;
        }
        if let Some(ref parent) = self.staging_parent {
            writeln!(f, "  Staging Parent: {}", parent.display())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "JARBOX_BUILD_TOOL",
        "JARBOX_BUILD_ARGS",
        "JARBOX_WORKDIR",
        "JARBOX_CONTAINER_TOOL",
        "JARBOX_IMAGE_TAG",
        "JARBOX_BASE_IMAGE",
        "JARBOX_ARTIFACT_SUFFIX",
        "JARBOX_OUTPUT_LIMIT",
        "JARBOX_COLLISION_POLICY",
        "JARBOX_PRIMARY_ARTIFACT",
        "JARBOX_STAGING_PARENT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = JarboxConfig::default();
        assert_eq!(config.build_tool, "mvn");
        assert_eq!(config.build_args, vec!["clean", "package"]);
        assert_eq!(config.container_tool, "docker");
        assert_eq!(config.image_tag, "my-java-app");
        assert_eq!(config.base_image, "openjdk:8-jdk-alpine");
        assert_eq!(config.collision_policy, CollisionPolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var("JARBOX_BUILD_TOOL", "./mvnw");
        env::set_var("JARBOX_IMAGE_TAG", "demo:1.0.0");
        env::set_var("JARBOX_COLLISION_POLICY", "rename");
        env::set_var("JARBOX_OUTPUT_LIMIT", "4096");
        env::set_var("JARBOX_BUILD_ARGS", " -B  clean verify ");
        env::set_var("JARBOX_WORKDIR", "/opt/app");

        let config = JarboxConfig::from_env().unwrap();
        assert_eq!(config.build_tool, "./mvnw");
        assert_eq!(config.image_tag, "demo:1.0.0");
        assert_eq!(config.collision_policy, CollisionPolicy::Rename);
        assert_eq!(config.output_limit, 4096);
        assert_eq!(config.build_args, vec!["-B", "clean", "verify"]);
        assert_eq!(config.workdir, "/opt/app");
        assert_eq!(config.container_tool, "docker");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_values() {
        clear_env();
        env::set_var("JARBOX_OUTPUT_LIMIT", "lots");
        assert!(matches!(
            JarboxConfig::from_env(),
            Err(ConfigError::ParseError { .. })
        ));

        clear_env();
        env::set_var("JARBOX_COLLISION_POLICY", "merge");
        let err = JarboxConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("JARBOX_COLLISION_POLICY"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_blank_env_values_are_ignored() {
        clear_env();
        env::set_var("JARBOX_CONTAINER_TOOL", "  ");
        let config = JarboxConfig::from_env().unwrap();
        assert_eq!(config.container_tool, "docker");
        clear_env();
    }

    #[test]
    fn test_validate_suffix() {
        let config = JarboxConfig {
            artifact_suffix: "jar".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_output_limit_bounds() {
        let small = JarboxConfig {
            output_limit: 10,
            ..Default::default()
        };
        assert!(small.validate().is_err());

        let large = JarboxConfig {
            output_limit: MAX_OUTPUT_LIMIT + 1,
            ..Default::default()
        };
        assert!(large.validate().is_err());
    }

    #[test]
    fn test_validate_workdir_and_primary() {
        let relative = JarboxConfig {
            workdir: "app".to_string(),
            ..Default::default()
        };
        assert!(relative.validate().is_err());

        let nested_primary = JarboxConfig {
            primary_artifact: Some("target/app.jar".to_string()),
            ..Default::default()
        };
        assert!(nested_primary.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_relative_workdir_from_env_fails_validation() {
        clear_env();
        env::set_var("JARBOX_WORKDIR", "app");
        let config = JarboxConfig::from_env().unwrap();
        assert!(config.validate().is_err());
        clear_env();
    }

    #[test]
    fn test_validate_rejects_control_characters() {
        let base_image = JarboxConfig {
            base_image: "alpine\nRUN rm -rf /".to_string(),
            ..Default::default()
        };
        let err = base_image.validate().unwrap_err();
        assert!(err.to_string().contains("Base image"));

        let tag = JarboxConfig {
            image_tag: "demo\r".to_string(),
            ..Default::default()
        };
        assert!(tag.validate().is_err());

        let workdir = JarboxConfig {
            workdir: "/app\nUSER root".to_string(),
            ..Default::default()
        };
        assert!(workdir.validate().is_err());

        let build_arg = JarboxConfig {
            build_args: vec!["clean".to_string(), "pack\u{0}age".to_string()],
            ..Default::default()
        };
        assert!(build_arg.validate().is_err());
    }

    #[test]
    fn test_display() {
        let display = JarboxConfig::default().to_string();
        assert!(display.contains("Build Command: mvn clean package"));
        assert!(display.contains("Collision Policy: reject"));
        assert!(!display.contains("Primary Artifact"));
    }
}
