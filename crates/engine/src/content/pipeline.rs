use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};

use super::compiler::{parse_json_document, ContentCompileError};
use super::hashing::hash_document_bytes;
use super::validation::ContentValidationErrors;

#[derive(Debug, Error)]
pub enum ContentPipelineError {
    #[error("failed to read content file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Compile(#[from] ContentCompileError),
    #[error("content file {path} failed validation: {errors}")]
    Validation {
        path: PathBuf,
        errors: ContentValidationErrors,
    },
}

#[derive(Debug, Clone)]
pub struct LoadedDocument<T> {
    pub value: T,
    pub path: PathBuf,
    pub content_hash_sha256_hex: String,
}

pub fn load_json_document<T: DeserializeOwned>(
    path: &Path,
) -> Result<LoadedDocument<T>, ContentPipelineError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentPipelineError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let content_hash_sha256_hex = hash_document_bytes(raw.as_bytes());
    let value = parse_json_document::<T>(&raw, path)?;
    info!(
        path = %path.display(),
        bytes = raw.len(),
        content_hash = %content_hash_sha256_hex,
        "content_loaded"
    );
    Ok(LoadedDocument {
        value,
        path: path.to_path_buf(),
        content_hash_sha256_hex,
    })
}

/// Loads a document and runs `validate` over it; nothing downstream ever
/// sees a document that failed validation.
pub fn load_validated_document<T, V, F>(
    path: &Path,
    validate: F,
) -> Result<LoadedDocument<V>, ContentPipelineError>
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Result<V, ContentValidationErrors>,
{
    let loaded = load_json_document::<T>(path)?;
    match validate(loaded.value) {
        Ok(value) => Ok(LoadedDocument {
            value,
            path: loaded.path,
            content_hash_sha256_hex: loaded.content_hash_sha256_hex,
        }),
        Err(errors) => {
            for issue in errors.issues() {
                warn!(
                    path = %loaded.path.display(),
                    code = ?issue.code,
                    field = %issue.field_path,
                    message = %issue.message,
                    "content_validation_issue"
                );
            }
            Err(ContentPipelineError::Validation {
                path: loaded.path,
                errors,
            })
        }
    }
}
