use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::error::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    ReadFile,
    JsonMalformed,
    UnknownField,
    MissingField,
    InvalidValue,
    MalformedBounds,
    DuplicateId,
    InconsistentDataset,
}

/// A document that could not be turned into typed content at all.
#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub field_path: Option<String>,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)?;
        if let Some(field_path) = &self.field_path {
            write!(f, " (field={field_path})")?;
        }
        match self.location {
            Some(loc) => write!(
                f,
                " (file={}, line={}, column={})",
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(f, " (file={})", self.file_path.display()),
        }
    }
}

impl std::error::Error for ContentCompileError {}

/// Deserializes a JSON document, reporting the failing field path and
/// source position on error.
pub fn parse_json_document<T: DeserializeOwned>(
    raw: &str,
    file_path: &Path,
) -> Result<T, ContentCompileError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let value = match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(value) => value,
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            let field_path = (!path.is_empty() && path != ".").then_some(path);
            return Err(json_error(source, file_path, field_path));
        }
    };
    deserializer
        .end()
        .map_err(|error| json_error(error, file_path, None))?;
    Ok(value)
}

fn json_error(
    error: serde_json::Error,
    file_path: &Path,
    field_path: Option<String>,
) -> ContentCompileError {
    let location = (error.line() > 0).then(|| SourceLocation {
        line: error.line(),
        column: error.column(),
    });
    ContentCompileError {
        code: classify_json_error(&error),
        message: format!("invalid JSON content: {error}"),
        file_path: file_path.to_path_buf(),
        field_path,
        location,
    }
}

fn classify_json_error(error: &serde_json::Error) -> ContentErrorCode {
    match error.classify() {
        Category::Io | Category::Syntax | Category::Eof => ContentErrorCode::JsonMalformed,
        Category::Data => {
            let message = error.to_string();
            if message.starts_with("missing field") {
                ContentErrorCode::MissingField
            } else if message.starts_with("unknown field") {
                ContentErrorCode::UnknownField
            } else {
                ContentErrorCode::InvalidValue
            }
        }
    }
}
