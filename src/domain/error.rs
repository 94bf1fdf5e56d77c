use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure taxonomy shared by every content provider.
///
/// Each variant carries enough context (path, status code, field name) to be
/// logged meaningfully at the point where it is swallowed or surfaced.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("provider configuration error: {message}")]
    Configuration { message: String },
    #[error("file system error at `{path}`: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse `{path}`: {message}")]
    Parse { path: String, message: String },
    #[error("provider API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("authorization failed: {message}")]
    Authorization { message: String },
    #[error("validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },
    #[error("{entity} not found: `{identifier}`")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },
}

impl StoreError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn file_system(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            identifier: identifier.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
