mod compiler;
mod hashing;
mod pipeline;
mod validation;

pub use compiler::{parse_json_document, ContentCompileError, ContentErrorCode, SourceLocation};
pub use pipeline::{load_json_document, load_validated_document, ContentPipelineError, LoadedDocument};
pub use validation::{ContentIssue, ContentValidationErrors, ValidationReport};
