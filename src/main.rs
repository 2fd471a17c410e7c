use jarbox::cli::commands::{BuildArgs, CliArgs, Commands, InspectArgs};
use jarbox::cli::output::OutputFormatter;
use jarbox::util::{init_logging, parse_level, LoggingConfig};
use jarbox::{
    JarboxConfig, PipelineContext, PipelineOrchestrator, ProjectDescriptor, ProjectLayout,
    SystemRunner, NAME, VERSION,
};

use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process;
use tracing::{debug, error, info, Level};

const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 2;

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Build(build_args) => handle_build(build_args),
        Commands::Inspect(inspect_args) => handle_inspect(inspect_args),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    init_logging(config);
}

fn handle_build(args: &BuildArgs) -> i32 {
    let config = match JarboxConfig::from_env() {
        Ok(config) => args.apply(config),
        Err(e) => {
            error!("{}", e);
            return EXIT_CONFIG;
        }
    };
    if let Err(e) = config.validate() {
        error!("{}", e);
        return EXIT_CONFIG;
    }
    debug!("{}", config);

    let project_dir = match &args.project_dir {
        Some(dir) => dir.clone(),
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to get current directory: {}", e);
                return EXIT_FAILURE;
            }
        },
    };

    if !project_dir.is_dir() {
        error!(
            "Project path is not a directory: {}",
            project_dir.display()
        );
        return EXIT_FAILURE;
    }

    let project_dir: PathBuf = match project_dir.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to canonicalize project path: {}", e);
            return EXIT_FAILURE;
        }
    };

    let mut layout = ProjectLayout::maven(project_dir);
    if let Some(pom) = &args.pom {
        layout = layout.with_descriptor(pom);
    }
    if let Some(target_dir) = &args.target_dir {
        layout = layout.with_target_dir(target_dir);
    }

    let runner = SystemRunner::new(config.output_limit);
    let mut context = PipelineContext::new(&config, &runner, layout);
    let result = PipelineOrchestrator::new()
        .skip_build(args.skip_build)
        .execute(&mut context);

    if let Err(e) = result {
        error!("{}", e);
        if let Some(stderr) = e.tool_stderr() {
            eprintln!("{}", stderr.trim_end());
        }
        if let Some(staging) = &context.staging {
            info!("Staging area left at {}", staging.path.display());
        }
        return EXIT_FAILURE;
    }

    let report = context.into_report();
    match OutputFormatter::new(args.format.into()).format_report(&report) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    }
}

fn handle_inspect(args: &InspectArgs) -> i32 {
    let pom = args
        .pom
        .clone()
        .unwrap_or_else(|| PathBuf::from("pom.xml"));

    let descriptor = match ProjectDescriptor::from_path(&pom) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            error!("{}", e);
            return EXIT_FAILURE;
        }
    };

    match OutputFormatter::new(args.format.into()).format_descriptor(&descriptor) {
        Ok(output) => {
            println!("{}", output.trim_end());
            0
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    }
}
