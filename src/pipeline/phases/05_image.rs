use super::descriptor::ProjectDescriptor;
use crate::config::JarboxConfig;
use crate::error::{PipelineError, Result};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::process::{BuildResult, CommandRunner, Invocation};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const STEP: &str = "Docker build";
pub const DOCKERFILE_NAME: &str = "Dockerfile";

#[derive(Debug, Clone, Serialize)]
pub struct ImageBuild {
    pub tag: String,
    pub primary_artifact: String,
    pub dockerfile: PathBuf,
}

/// Inputs for the generated Dockerfile
#[derive(Debug, Clone)]
pub struct DockerfileSpec<'a> {
    pub base_image: &'a str,
    pub workdir: &'a str,
    pub artifact_suffix: &'a str,
    pub primary_artifact: &'a str,
    pub descriptor: Option<&'a ProjectDescriptor>,
}

impl DockerfileSpec<'_> {
    pub fn render(&self) -> String {
        let workdir = match self.workdir.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        let copy_target = if workdir == "/" {
            "/".to_string()
        } else {
            format!("{}/", workdir)
        };

        let mut lines = vec![format!("FROM {}", self.base_image)];

        if let Some(descriptor) = self.descriptor {
            let labels = [
                ("org.opencontainers.image.title", &descriptor.artifact_id),
                ("org.opencontainers.image.version", &descriptor.version),
                ("org.opencontainers.image.vendor", &descriptor.group_id),
            ];
            for (key, value) in labels {
                if let Some(value) = value {
                    lines.push(format!("LABEL {}={}", key, quote(value)));
                }
            }
        }

        lines.push(format!("COPY *{} {}", self.artifact_suffix, copy_target));
        lines.push(format!("WORKDIR {}", workdir));
        lines.push(format!(
            "CMD {}",
            exec_form(&["java", "-jar", self.primary_artifact])
        ));

        let mut dockerfile = lines.join("\n");
        dockerfile.push('\n');
        dockerfile
    }
}

fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn exec_form(args: &[&str]) -> String {
    let quoted: Vec<String> = args.iter().map(|arg| quote(arg)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Artifact file names directly inside the staging directory, sorted
pub fn list_staged(staging_dir: &Path, suffix: &str) -> Result<Vec<String>> {
    let list_error = |source| PipelineError::StagingList {
        path: staging_dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(staging_dir).map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        if !entry.file_type().map_err(list_error)?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(suffix) {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Picks the artifact named in the launch command
///
/// An explicitly configured name wins. Without one, Maven's
/// `<artifactId>-<version>` jar is preferred when it was staged, and the
/// first name in sorted order otherwise.
pub fn select_primary(
    staging_dir: &Path,
    staged: &[String],
    configured: Option<&str>,
    descriptor: Option<&ProjectDescriptor>,
    suffix: &str,
) -> Result<String> {
    if staged.is_empty() {
        return Err(PipelineError::EmptyStagingArea {
            path: staging_dir.to_path_buf(),
        });
    }

    if let Some(name) = configured {
        return staged
            .iter()
            .find(|staged_name| staged_name.as_str() == name)
            .cloned()
            .ok_or_else(|| PipelineError::PrimaryNotFound {
                name: name.to_string(),
                staged: staged.to_vec(),
            });
    }

    if let Some(maven_name) = descriptor.and_then(|d| d.default_artifact_name(suffix)) {
        if staged.contains(&maven_name) {
            return Ok(maven_name);
        }
    }

    Ok(staged[0].clone())
}

pub fn write_dockerfile(staging_dir: &Path, content: &str) -> Result<PathBuf> {
    let path = staging_dir.join(DOCKERFILE_NAME);
    fs::write(&path, content).map_err(|source| PipelineError::WriteDockerfile {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

pub fn image_invocation(config: &JarboxConfig, staging_dir: &Path) -> Invocation {
    Invocation::new(
        config.container_tool.clone(),
        [
            "build".to_string(),
            "-t".to_string(),
            config.image_tag.clone(),
            staging_dir.display().to_string(),
        ],
    )
}

/// Runs `<container-tool> build -t <tag> <staging-dir>`
pub fn build_image(
    runner: &dyn CommandRunner,
    config: &JarboxConfig,
    staging_dir: &Path,
) -> Result<BuildResult> {
    let invocation = image_invocation(config, staging_dir);
    info!("Running `{}`", invocation.display());
    runner.run(&invocation)
}

pub struct ImagePhase;

impl WorkflowPhase for ImagePhase {
    fn execute(&self, context: &mut PipelineContext<'_>) -> Result<()> {
        let config = context.config;
        let staging_dir = context.require_staging("Image")?.path.clone();

        let staged = list_staged(&staging_dir, &config.artifact_suffix)?;
        let primary = select_primary(
            &staging_dir,
            &staged,
            config.primary_artifact.as_deref(),
            context.descriptor.as_ref(),
            &config.artifact_suffix,
        )?;
        info!("Primary artifact: {}", primary);

        let dockerfile = DockerfileSpec {
            base_image: &config.base_image,
            workdir: &config.workdir,
            artifact_suffix: &config.artifact_suffix,
            primary_artifact: &primary,
            descriptor: context.descriptor.as_ref(),
        }
        .render();
        let dockerfile_path = write_dockerfile(&staging_dir, &dockerfile)?;

        let result = build_image(context.runner, config, &staging_dir)?;
        if !result.success {
            return Err(result.into_error(STEP));
        }

        info!("{} succeeded: {}", STEP, config.image_tag);
        if !result.stdout.trim().is_empty() {
            info!("{}", result.stdout.trim_end());
        }
        context.image = Some(ImageBuild {
            tag: config.image_tag.clone(),
            primary_artifact: primary,
            dockerfile: dockerfile_path,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn spec<'a>(primary: &'a str, descriptor: Option<&'a ProjectDescriptor>) -> DockerfileSpec<'a> {
        DockerfileSpec {
            base_image: "openjdk:8-jdk-alpine",
            workdir: "/app",
            artifact_suffix: ".jar",
            primary_artifact: primary,
            descriptor,
        }
    }

    #[test]
    fn test_render_without_descriptor() {
        let dockerfile = spec("app.jar", None).render();
        assert_eq!(
            dockerfile,
            "FROM openjdk:8-jdk-alpine\n\
             COPY *.jar /app/\n\
             WORKDIR /app\n\
             CMD [\"java\", \"-jar\", \"app.jar\"]\n"
        );
    }

    #[test]
    fn test_render_labels_present_fields_only() {
        let descriptor = ProjectDescriptor {
            group_id: None,
            artifact_id: Some("demo".to_string()),
            version: Some("1.0.0".to_string()),
        };
        let dockerfile = spec("demo-1.0.0.jar", Some(&descriptor)).render();

        assert!(dockerfile.contains("LABEL org.opencontainers.image.title=\"demo\"\n"));
        assert!(dockerfile.contains("LABEL org.opencontainers.image.version=\"1.0.0\"\n"));
        assert!(!dockerfile.contains("vendor"));
        assert!(dockerfile.ends_with("CMD [\"java\", \"-jar\", \"demo-1.0.0.jar\"]\n"));
    }

    #[test]
    fn test_render_escapes_quotes() {
        let dockerfile = spec("we\"ird.jar", None).render();
        assert!(dockerfile.contains(r#"CMD ["java", "-jar", "we\"ird.jar"]"#));
    }

    #[test]
    fn test_render_label_newlines_stay_on_one_line() {
        let descriptor = ProjectDescriptor {
            group_id: None,
            artifact_id: Some("demo\nRUN rm -rf /".to_string()),
            version: None,
        };
        let dockerfile = spec("app.jar", Some(&descriptor)).render();

        assert!(dockerfile.contains("LABEL org.opencontainers.image.title=\"demo\\nRUN rm -rf /\"\n"));
        assert!(!dockerfile.lines().any(|line| line.starts_with("RUN")));
    }

    #[test]
    fn test_render_trailing_slash_workdir() {
        let dockerfile = DockerfileSpec {
            workdir: "/opt/app/",
            ..spec("app.jar", None)
        }
        .render();
        assert!(dockerfile.contains("COPY *.jar /opt/app/\n"));
        assert!(dockerfile.contains("WORKDIR /opt/app\n"));
    }

    #[test]
    fn test_select_primary_empty_fails() {
        let err = select_primary(Path::new("/tmp/x"), &[], None, None, ".jar").unwrap_err();
        assert!(matches!(err, PipelineError::EmptyStagingArea { .. }));
    }

    #[test]
    fn test_select_primary_configured() {
        let staged = names(&["app.jar", "lib.jar"]);
        let primary =
            select_primary(Path::new("/s"), &staged, Some("lib.jar"), None, ".jar").unwrap();
        assert_eq!(primary, "lib.jar");

        let err =
            select_primary(Path::new("/s"), &staged, Some("main.jar"), None, ".jar").unwrap_err();
        assert!(matches!(err, PipelineError::PrimaryNotFound { .. }));
    }

    #[test]
    fn test_select_primary_prefers_maven_name() {
        let descriptor = ProjectDescriptor {
            group_id: Some("com.example".to_string()),
            artifact_id: Some("demo".to_string()),
            version: Some("1.0.0".to_string()),
        };
        let staged = names(&["commons-lang3-3.14.0.jar", "demo-1.0.0.jar"]);
        let primary =
            select_primary(Path::new("/s"), &staged, None, Some(&descriptor), ".jar").unwrap();
        assert_eq!(primary, "demo-1.0.0.jar");
    }

    #[test]
    fn test_select_primary_falls_back_to_first_sorted() {
        let descriptor = ProjectDescriptor {
            group_id: Some("com.example".to_string()),
            artifact_id: Some("demo".to_string()),
            version: Some("1.0.0".to_string()),
        };
        let staged = names(&["app.jar", "lib.jar"]);
        let primary =
            select_primary(Path::new("/s"), &staged, None, Some(&descriptor), ".jar").unwrap();
        assert_eq!(primary, "app.jar");
    }

    #[test]
    fn test_list_staged_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("lib.jar"), "").unwrap();
        fs::write(temp.path().join("app.jar"), "").unwrap();
        fs::write(temp.path().join("Dockerfile"), "").unwrap();
        fs::create_dir(temp.path().join("nested.jar")).unwrap();

        let staged = list_staged(temp.path(), ".jar").unwrap();
        assert_eq!(staged, names(&["app.jar", "lib.jar"]));
    }

    #[test]
    fn test_image_invocation() {
        let config = JarboxConfig::default();
        let invocation = image_invocation(&config, Path::new("/tmp/jarbox-abc"));
        assert_eq!(
            invocation.display(),
            "docker build -t my-java-app /tmp/jarbox-abc"
        );
        assert!(invocation.cwd.is_none());
    }

    #[test]
    fn test_write_dockerfile() {
        let temp = TempDir::new().unwrap();
        let path = write_dockerfile(temp.path(), "FROM scratch\n").unwrap();
        assert_eq!(path, temp.path().join("Dockerfile"));
        assert_eq!(fs::read_to_string(path).unwrap(), "FROM scratch\n");
    }
}
