//! Core types and constants for the resource inliner

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Base directory used when none is configured
pub const DEFAULT_BASE: &str = "./";

/// Executable invoked for LESS stylesheets
pub const DEFAULT_LESS_COMMAND: &str = "lessc";

/// Fallback LESS search path when the base is empty
pub const DEFAULT_LESS_PATH: &str = ".";

/// File extension of the host-language sources the CLI walks
pub const SOURCE_EXTENSION: &str = "ts";

/// Stylesheet dialect, decided from the suffix of a style URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleDialect {
    Css,
    Less,
    Scss,
    /// Anything else; the file content is inlined as-is
    Unsupported,
}

impl StyleDialect {
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "css" => Self::Css,
            "less" => Self::Less,
            "scss" => Self::Scss,
            _ => Self::Unsupported,
        }
    }
}

impl fmt::Display for StyleDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Css => "CSS",
            Self::Less => "LESS",
            Self::Scss => "SCSS",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// One style URL taken from a `styleUrls` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    /// URL as written in the annotation
    pub url: String,
    /// URL without leading `.`/`/` characters and without its extension
    pub stem: String,
    /// Location the URL resolves to
    pub path: PathBuf,
    pub dialect: StyleDialect,
}

/// Which annotation a match belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationKind {
    StyleUrls,
    TemplateUrl,
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StyleUrls => f.write_str("styleUrls"),
            Self::TemplateUrl => f.write_str("templateUrl"),
        }
    }
}
