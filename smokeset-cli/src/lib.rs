// smokeset-cli/src/lib.rs
//
// Library portion of the Smokeset CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ExtractArgs, SplitArgs, SubsampleArgs};
pub use commands::extract::run_extract;
pub use commands::split::run_split;
pub use commands::subsample::run_subsample;
pub use error::{CliErrorContext, CliResult};
pub use logging::init_logging;
