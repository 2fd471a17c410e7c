pub mod commands;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, InspectArgs};
pub use output::{OutputFormat, OutputFormatter};
