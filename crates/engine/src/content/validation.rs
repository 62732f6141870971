use std::fmt;

use super::compiler::ContentErrorCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentIssue {
    pub code: ContentErrorCode,
    pub field_path: String,
    pub message: String,
}

impl fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}: {}", self.code, self.field_path, self.message)
    }
}

/// Every semantic problem found in one document, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentValidationErrors {
    issues: Vec<ContentIssue>,
}

impl ContentValidationErrors {
    pub fn issues(&self) -> &[ContentIssue] {
        &self.issues
    }

    pub fn has_code(&self, code: ContentErrorCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }

    pub fn has_issue_at(&self, field_path: &str) -> bool {
        self.issues.iter().any(|issue| issue.field_path == field_path)
    }
}

impl fmt::Display for ContentValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ContentValidationErrors {}

#[derive(Debug, Default)]
pub struct ValidationReport {
    issues: Vec<ContentIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        code: ContentErrorCode,
        field_path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.issues.push(ContentIssue {
            code,
            field_path: field_path.into(),
            message: message.into(),
        });
    }

    pub fn require_non_empty(&mut self, field_path: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(
                ContentErrorCode::MissingField,
                field_path,
                "must not be empty",
            );
        }
    }

    pub fn require_positive(&mut self, field_path: &str, value: f32) {
        if !value.is_finite() || value <= 0.0 {
            self.push(
                ContentErrorCode::InvalidValue,
                field_path,
                format!("expected a finite number > 0, got {value}"),
            );
        }
    }

    pub fn require_non_negative(&mut self, field_path: &str, value: f32) {
        if !value.is_finite() || value < 0.0 {
            self.push(
                ContentErrorCode::InvalidValue,
                field_path,
                format!("expected a finite number >= 0, got {value}"),
            );
        }
    }

    pub fn require_in_range(&mut self, field_path: &str, value: i32, min: i32, max: i32) {
        if value < min || value > max {
            self.push(
                ContentErrorCode::InvalidValue,
                field_path,
                format!("expected a value in [{min}, {max}], got {value}"),
            );
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn finish<T>(self, value: T) -> Result<T, ContentValidationErrors> {
        if self.issues.is_empty() {
            Ok(value)
        } else {
            Err(ContentValidationErrors {
                issues: self.issues,
            })
        }
    }
}
