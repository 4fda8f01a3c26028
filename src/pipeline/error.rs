use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors. Any of these aborts the whole run with a non-zero status.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Error opening output file `{}`: {source}", .path.display())]
    OutputFile { path: PathBuf, source: io::Error },

    #[error("Error writing output: {0}")]
    OutputWrite(#[source] io::Error),

    #[error("Too many input files: {count} [MAX={max}]")]
    TooManySources { count: usize, max: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to allocate shared pipeline state: {0}")]
    Allocation(String),

    #[error("Failed to create worker `{name}`: {source}")]
    WorkerSpawn { name: String, source: io::Error },

    #[error("Worker `{0}` panicked")]
    WorkerPanicked(String),

    #[error("Run interrupted before all hostnames were resolved")]
    Interrupted,
}
