use crate::config::JarboxConfig;
use crate::pipeline::phases::stage::CollisionPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Build a Maven project and package its jars into a container image
#[derive(Parser, Debug)]
#[command(
    name = "jarbox",
    about = "Build a Maven project and package its jars into a container image",
    version,
    author,
    long_about = "jarbox reads pom.xml, runs `mvn clean package`, moves the produced jars \
                  into a fresh staging directory, writes a Dockerfile there and runs \
                  `docker build` on it."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        ignore_case = true,
        help = "Set logging level"
    )]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Build the project and its container image",
        long_about = "Runs the full pipeline: read pom.xml, build with Maven, collect jars \
                      from the target directory, stage them and build the image.\n\n\
                      Examples:\n  \
                      jarbox build\n  \
                      jarbox build /path/to/project --tag demo:1.0.0\n  \
                      jarbox build --skip-build --primary demo-1.0.0.jar\n  \
                      jarbox build --build-tool ./mvnw --container-tool podman"
    )]
    Build(BuildArgs),

    #[command(
        about = "Print the coordinates declared in a pom.xml",
        long_about = "Reads groupId, artifactId and version from the project element of a \
                      pom.xml without building anything.\n\n\
                      Examples:\n  \
                      jarbox inspect\n  \
                      jarbox inspect path/to/pom.xml --format json"
    )]
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        value_name = "PROJECT_DIR",
        help = "Project directory (defaults to current directory)"
    )]
    pub project_dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Project descriptor, relative to PROJECT_DIR [default: pom.xml]"
    )]
    pub pom: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory scanned for artifacts, relative to PROJECT_DIR [default: target]"
    )]
    pub target_dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "TOOL",
        help = "Build tool to run, relative paths resolve in PROJECT_DIR [default: mvn]"
    )]
    pub build_tool: Option<String>,

    #[arg(
        long = "build-arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        help = "Argument passed to the build tool, repeatable [default: clean package]"
    )]
    pub build_args: Vec<String>,

    #[arg(long, value_name = "TOOL", help = "Container tool to run [default: docker]")]
    pub container_tool: Option<String>,

    #[arg(short = 't', long, value_name = "TAG", help = "Image tag [default: my-java-app]")]
    pub tag: Option<String>,

    #[arg(long, value_name = "IMAGE", help = "Base image [default: openjdk:8-jdk-alpine]")]
    pub base_image: Option<String>,

    #[arg(long, value_name = "DIR", help = "Working directory inside the image [default: /app]")]
    pub workdir: Option<String>,

    #[arg(
        long,
        value_name = "FILE_NAME",
        help = "Artifact to launch (defaults to <artifactId>-<version>.jar, else the first jar by name)"
    )]
    pub primary: Option<String>,

    #[arg(long, value_enum, help = "What to do when two artifacts share a file name [default: reject]")]
    pub collision: Option<CollisionArg>,

    #[arg(long, help = "Use artifacts already in the target directory")]
    pub skip_build: bool,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Report format")]
    pub format: OutputFormatArg,
}

impl BuildArgs {
    /// Layer the flags given on the command line over `config`
    pub fn apply(&self, mut config: JarboxConfig) -> JarboxConfig {
        if let Some(tool) = &self.build_tool {
            config.build_tool = tool.clone();
        }
        if !self.build_args.is_empty() {
            config.build_args = self.build_args.clone();
        }
        if let Some(tool) = &self.container_tool {
            config.container_tool = tool.clone();
        }
        if let Some(tag) = &self.tag {
            config.image_tag = tag.clone();
        }
        if let Some(image) = &self.base_image {
            config.base_image = image.clone();
        }
        if let Some(workdir) = &self.workdir {
            config.workdir = workdir.clone();
        }
        if let Some(primary) = &self.primary {
            config.primary_artifact = Some(primary.clone());
        }
        if let Some(collision) = self.collision {
            config.collision_policy = collision.into();
        }
        config
    }
}

#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    #[arg(value_name = "POM", help = "Path to pom.xml (defaults to ./pom.xml)")]
    pub pom: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value = "human", help = "Output format")]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionArg {
    Reject,
    Rename,
    Overwrite,
}

impl From<CollisionArg> for CollisionPolicy {
    fn from(arg: CollisionArg) -> Self {
        match arg {
            CollisionArg::Reject => CollisionPolicy::Reject,
            CollisionArg::Rename => CollisionPolicy::Rename,
            CollisionArg::Overwrite => CollisionPolicy::Overwrite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::parse_level;
    use clap::CommandFactory;
    use tracing::Level;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_build_args() {
        let args = CliArgs::parse_from(["jarbox", "build"]);
        match args.command {
            Commands::Build(build_args) => {
                assert!(build_args.project_dir.is_none());
                assert!(build_args.pom.is_none());
                assert!(build_args.collision.is_none());
                assert!(!build_args.skip_build);
                assert_eq!(build_args.format, OutputFormatArg::Human);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_build_with_options() {
        let args = CliArgs::parse_from([
            "jarbox",
            "build",
            "/tmp/project",
            "--tag",
            "demo:1.0.0",
            "--build-tool",
            "./mvnw",
            "--collision",
            "rename",
            "--primary",
            "demo-1.0.0.jar",
            "--skip-build",
            "--build-arg",
            "-B",
            "--build-arg",
            "verify",
            "--workdir",
            "/srv",
            "--format",
            "json",
        ]);

        match args.command {
            Commands::Build(build_args) => {
                assert_eq!(build_args.project_dir, Some(PathBuf::from("/tmp/project")));
                assert_eq!(build_args.collision, Some(CollisionArg::Rename));
                assert!(build_args.skip_build);
                assert_eq!(build_args.format, OutputFormatArg::Json);

                let config = build_args.apply(JarboxConfig::default());
                assert_eq!(config.image_tag, "demo:1.0.0");
                assert_eq!(config.build_tool, "./mvnw");
                assert_eq!(config.container_tool, "docker");
                assert_eq!(config.collision_policy, CollisionPolicy::Rename);
                assert_eq!(config.primary_artifact.as_deref(), Some("demo-1.0.0.jar"));
                assert_eq!(config.build_args, vec!["-B", "verify"]);
                assert_eq!(config.workdir, "/srv");
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_apply_keeps_config_when_flags_absent() {
        let args = CliArgs::parse_from(["jarbox", "build"]);
        let Commands::Build(build_args) = args.command else {
            panic!("Expected Build command");
        };
        let base = JarboxConfig {
            image_tag: "from-env".to_string(),
            collision_policy: CollisionPolicy::Overwrite,
            ..Default::default()
        };
        let config = build_args.apply(base);
        assert_eq!(config.image_tag, "from-env");
        assert_eq!(config.collision_policy, CollisionPolicy::Overwrite);
        assert_eq!(config.build_args, vec!["clean", "package"]);
        assert_eq!(config.workdir, "/app");
    }

    #[test]
    fn test_inspect_command() {
        let args = CliArgs::parse_from(["jarbox", "inspect", "demo/pom.xml", "-f", "json"]);
        match args.command {
            Commands::Inspect(inspect_args) => {
                assert_eq!(inspect_args.pom, Some(PathBuf::from("demo/pom.xml")));
                assert_eq!(inspect_args.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["jarbox", "-v", "build"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["jarbox", "--log-level", "debug", "inspect"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        assert!(CliArgs::try_parse_from(["jarbox", "--log-level", "loud", "build"]).is_err());

        let args = CliArgs::parse_from(["jarbox", "--log-level", "WARN", "build"]);
        assert_eq!(args.log_level.as_deref().map(parse_level), Some(Level::WARN));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(CliArgs::try_parse_from(["jarbox", "-q", "-v", "build"]).is_err());
    }
}
