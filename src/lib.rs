// Library interface for ninjagen
// The binary and the acceptance tests both drive the pipeline through here

pub mod cli_utils;
pub mod env_file;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod shell;
pub mod substitute;
pub mod template;

// Re-export commonly used types
pub use env_file::EnvContext;
pub use error::{Error, RegionKind, Result};
pub use pipeline::{GenerateSummary, Generator};
pub use template::{Expander, MacroTable};
