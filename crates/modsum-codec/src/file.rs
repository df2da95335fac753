//! Reading and writing summary files on disk

use crate::{decode, encode_with, CodecError, EncodeOptions};
use modsum_summary::ModuleSummaryStore;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File suffix for per-module summaries
pub const SUMMARY_FILE_SUFFIX: &str = ".swiftmodule.summary";

/// Conventional summary file name for a module
pub fn summary_file_name(module: &str) -> String {
    format!("{module}{SUMMARY_FILE_SUFFIX}")
}

/// Errors from summary file I/O, tagged with the file involved
#[derive(Debug, Error)]
pub enum SummaryFileError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

impl SummaryFileError {
    pub fn path(&self) -> &Path {
        match self {
            SummaryFileError::Io { path, .. } | SummaryFileError::Codec { path, .. } => {
                path.as_path()
            }
        }
    }
}

/// Read and decode a summary file
pub fn read_summary_file(path: impl AsRef<Path>) -> Result<ModuleSummaryStore, SummaryFileError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| SummaryFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "read summary file");

    decode(&bytes).map_err(|source| SummaryFileError::Codec {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode a store and write it to `path`, replacing any existing file
pub fn write_summary_file(
    path: impl AsRef<Path>,
    store: &ModuleSummaryStore,
    options: &EncodeOptions,
) -> Result<(), SummaryFileError> {
    let path = path.as_ref();
    let bytes = encode_with(store, options);
    fs::write(path, &bytes).map_err(|source| SummaryFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote summary file");
    Ok(())
}
