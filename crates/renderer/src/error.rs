use std::path::PathBuf;

use thiserror::Error;

/// Device-level failures: resource allocation and shader build problems.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Failed to allocate {0}")]
    ResourceAllocation(&'static str),

    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("Shader program failed to link: {log}")]
    ProgramLink { log: String },

    #[error("Failed to read shader source {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
