//! Component Resource Inliner
//!
//! Rewrites component source files so that their external resources are embedded: every
//! `styleUrls: [...]` annotation becomes `styles: ['...']` holding the compiled stylesheets,
//! and every `templateUrl: "..."` becomes `template: "..."` holding the minified HTML. The
//! result bundles without any runtime file access.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use nginline::{transform_file, InlineOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let options = InlineOptions {
//!         relative: true,
//!         ..InlineOptions::default()
//!     };
//!     let inlined = transform_file("src/app/app.component.ts", &options)?;
//!     println!("{}", inlined);
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. **Style pass** - locate `styleUrls`, compile each stylesheet (CSS as-is, SCSS via
//!    `grass`, LESS via `lessc`), minify or flatten it, escape it and splice it in
//! 2. **Template pass** - locate `templateUrl`, minify the HTML, escape it and splice it in
//!
//! Matching is regex based, not a parse of the host language. With `parse_only_template`
//! the style pass is skipped.

pub mod annotation;
pub mod cli;
pub mod error;
pub mod escape;
pub mod host;
pub mod html_minifier;
pub mod path_resolver;
pub mod style_compiler;
pub mod style_resolver;
pub mod template_resolver;
pub mod types;

#[cfg(test)]
mod testing;

use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export commonly used types and functions
pub use annotation::{AnnotationScanner, ScanReport, ScannedAnnotation};
pub use error::{InlineError, Result};
pub use host::{FsHost, ResourceHost};
pub use html_minifier::{HtmlMinifier, HtmlMinifyOptions};
pub use path_resolver::resolve_url;
pub use style_resolver::StyleResolver;
pub use template_resolver::TemplateResolver;
pub use types::*;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Options for one inlining run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineOptions {
    /// Root for URL resolution when `relative` is off
    pub base: String,

    /// Resolve URLs against the directory of the file being transformed
    pub relative: bool,

    /// Extra search roots for SCSS imports, in order
    pub include_paths: Vec<String>,

    /// Minify stylesheets and strip template comments
    pub compress: bool,

    /// Skip the style pass
    pub parse_only_template: bool,

    /// Executable used to compile LESS
    pub less_command: String,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE.to_string(),
            relative: false,
            include_paths: Vec::new(),
            compress: false,
            parse_only_template: false,
            less_command: DEFAULT_LESS_COMMAND.to_string(),
        }
    }
}

impl InlineOptions {
    /// Fill in defaults for fields left empty
    pub fn normalized(mut self) -> Self {
        if self.base.is_empty() {
            self.base = DEFAULT_BASE.to_string();
        }
        if self.less_command.is_empty() {
            self.less_command = DEFAULT_LESS_COMMAND.to_string();
        }
        self
    }
}

/// Inline the resources of `content`, reading them from the file system.
///
/// `target_dir` is the directory of the file being transformed; it is needed when
/// `options.relative` is set.
pub async fn transform(content: &str, options: &InlineOptions, target_dir: Option<&Path>) -> Result<String> {
    transform_with_host(content, options, target_dir, &FsHost).await
}

/// Inline the resources of `content`, reading them through `host`.
///
/// Runs the style pass and feeds its output to the template pass. Any failure aborts the
/// whole run; no partially rewritten text is returned.
pub async fn transform_with_host<H: ResourceHost>(
    content: &str,
    options: &InlineOptions,
    target_dir: Option<&Path>,
    host: &H,
) -> Result<String> {
    let options = options.clone().normalized();
    log::debug!("Transforming {} bytes with {:?}", content.len(), options);

    let templates = TemplateResolver::new(&options, target_dir, host);
    if options.parse_only_template {
        return templates.resolve(content).await;
    }

    let styled = StyleResolver::new(&options, target_dir, host).resolve(content).await?;
    templates.resolve(&styled).await
}

/// Blocking form of [`transform`]
pub fn transform_blocking(content: &str, options: &InlineOptions, target_dir: Option<&Path>) -> Result<String> {
    futures::executor::block_on(transform(content, options, target_dir))
}

/// Read a source file and inline its resources; the file's directory is the target directory.
pub fn transform_file(input_path: impl AsRef<Path>, options: &InlineOptions) -> Result<String> {
    let input_path = input_path.as_ref();
    let source = std::fs::read_to_string(input_path)
        .map_err(|e| InlineError::file_not_found(input_path, e))?;

    let target_dir = input_path.parent();
    log::info!("Inlining resources of {}", input_path.display());
    transform_blocking(&source, options, target_dir)
}

/// List the annotations of `content` without touching any resource
pub fn scan(content: &str) -> Result<ScanReport> {
    AnnotationScanner::new().scan(content)
}
