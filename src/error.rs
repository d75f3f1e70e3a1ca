//! Error types for the resource inliner

use crate::types::StyleDialect;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InlineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed annotation: {message}")]
    MalformedAnnotation { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("{dialect} compile error in {path}: {message}")]
    Compile {
        dialect: StyleDialect,
        path: String,
        message: String,
    },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, InlineError>;

impl InlineError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedAnnotation {
            message: message.into(),
        }
    }

    pub fn file_not_found(path: &Path, cause: impl std::fmt::Display) -> Self {
        Self::FileNotFound {
            path: format!("{}: {}", path.display(), cause),
        }
    }

    pub fn compile(dialect: StyleDialect, path: &Path, message: impl Into<String>) -> Self {
        Self::Compile {
            dialect,
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_display() {
        let err = InlineError::compile(StyleDialect::Scss, Path::new("app/main.scss"), "expected \";\"");
        assert_eq!(
            err.to_string(),
            "SCSS compile error in app/main.scss: expected \";\""
        );
    }

    #[test]
    fn test_file_not_found_keeps_cause() {
        let err = InlineError::file_not_found(Path::new("missing.css"), "No such file or directory");
        match err {
            InlineError::FileNotFound { path } => {
                assert!(path.starts_with("missing.css"));
                assert!(path.contains("No such file"));
            }
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }
}
