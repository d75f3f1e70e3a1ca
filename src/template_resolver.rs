//! `templateUrl` pass: inline the referenced HTML as a `template` string

use crate::annotation::{splice, AnnotationScanner};
use crate::error::Result;
use crate::escape::{escape_quote, join_lines};
use crate::host::ResourceHost;
use crate::html_minifier::{HtmlMinifier, HtmlMinifyOptions};
use crate::path_resolver::resolve_url;
use crate::InlineOptions;
use std::path::Path;

pub struct TemplateResolver<'a, H> {
    options: &'a InlineOptions,
    target_dir: Option<&'a Path>,
    host: &'a H,
    scanner: AnnotationScanner,
    minifier: HtmlMinifier,
}

impl<'a, H: ResourceHost> TemplateResolver<'a, H> {
    pub fn new(options: &'a InlineOptions, target_dir: Option<&'a Path>, host: &'a H) -> Self {
        Self {
            options,
            target_dir,
            host,
            scanner: AnnotationScanner::new(),
            minifier: HtmlMinifier::new(HtmlMinifyOptions::for_templates(options.compress)),
        }
    }

    /// Replace every uncommented `templateUrl: "..."` with `template: "..."`, keeping the
    /// quote style of the annotation. Commented-out annotations stay as they are.
    pub async fn resolve(&self, text: &str) -> Result<String> {
        let matches = self.scanner.find_template_urls(text);
        if matches.is_empty() {
            return Ok(text.to_string());
        }

        let mut replacements = Vec::with_capacity(matches.len());
        for annotation in matches.iter().filter(|m| !m.is_commented_out()) {
            let path = resolve_url(annotation.url, self.options, self.target_dir);
            log::debug!("Inlining template {}", path.display());

            let html = self.host.read_file(&path).await?;
            let inlined = self.inline_template(&html, annotation.quote);
            replacements.push((annotation.span.clone(), inlined));
        }

        Ok(splice(text, &replacements))
    }

    fn inline_template(&self, html: &str, quote: char) -> String {
        let minified = self.minifier.minify(html);
        let escaped = escape_quote(&minified, quote);
        format!("template: {quote}{}{quote}", join_lines(&escaped, quote))
    }
}
