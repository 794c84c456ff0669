use std::path::PathBuf;

/// Errors that stop a run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {source} ({path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("malformed line {line} in {path}: {msg}")]
    Parse {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    #[error("no weighted intervals to sample from in {path}")]
    EmptyInput { path: PathBuf },

    #[error("interval length {length} runs past the last coordinate from position {last}")]
    Length { length: u64, last: u64 },

    #[error("could not serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an `io::Error` with the path it came from
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            msg: msg.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
