//! jarbox - build a Maven project and package its jars into a container image
//!
//! The pipeline runs five phases in order, stopping at the first failure:
//!
//! 1. read `groupId`, `artifactId` and `version` from `pom.xml`
//! 2. run `mvn clean package`
//! 3. collect every `*.jar` under `target/`
//! 4. move the jars into a fresh staging directory
//! 5. write a Dockerfile there and run `docker build`
//!
//! # Example Usage
//!
//! ```no_run
//! use jarbox::{JarboxConfig, PipelineContext, PipelineOrchestrator, ProjectLayout, SystemRunner};
//!
//! # fn main() -> Result<(), jarbox::PipelineError> {
//! let config = JarboxConfig::default();
//! let runner = SystemRunner::new(config.output_limit);
//! let mut context = PipelineContext::new(&config, &runner, ProjectLayout::maven("."));
//!
//! PipelineOrchestrator::new().execute(&mut context)?;
//! println!("{:?}", context.into_report().image);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod util;

pub use config::{ConfigError, JarboxConfig};
pub use error::PipelineError;
pub use output::PipelineReport;
pub use pipeline::phases::descriptor::ProjectDescriptor;
pub use pipeline::phases::stage::CollisionPolicy;
pub use pipeline::{PipelineContext, PipelineOrchestrator, ProjectLayout};
pub use process::{BuildResult, CommandRunner, Invocation, SystemRunner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
