//! `styleUrls` pass: inline referenced stylesheets as a `styles` array

use crate::annotation::{splice, AnnotationScanner};
use crate::error::Result;
use crate::host::ResourceHost;
use crate::path_resolver::UrlClassifier;
use crate::style_compiler::StyleCompiler;
use crate::InlineOptions;
use futures::future::try_join_all;
use std::path::Path;

pub struct StyleResolver<'a, H> {
    options: &'a InlineOptions,
    target_dir: Option<&'a Path>,
    host: &'a H,
    scanner: AnnotationScanner,
    classifier: UrlClassifier,
}

impl<'a, H: ResourceHost> StyleResolver<'a, H> {
    pub fn new(options: &'a InlineOptions, target_dir: Option<&'a Path>, host: &'a H) -> Self {
        Self {
            options,
            target_dir,
            host,
            scanner: AnnotationScanner::new(),
            classifier: UrlClassifier::new(),
        }
    }

    /// Replace every `styleUrls: [...]` in `text` with `styles: ['...']`.
    ///
    /// Annotations are handled one after another; the URLs of a single annotation are read
    /// and compiled together and joined in list order. A commented-out annotation becomes
    /// `styles: ['']`.
    pub async fn resolve(&self, text: &str) -> Result<String> {
        let matches = self.scanner.find_style_urls(text);
        if matches.is_empty() {
            return Ok(text.to_string());
        }

        let compiler = StyleCompiler::new(self.options, self.target_dir);
        let mut replacements = Vec::with_capacity(matches.len());

        for annotation in &matches {
            let urls = annotation.urls()?;

            if annotation.is_commented_out() {
                log::debug!("Dropping commented-out styleUrls {}", annotation.list);
                replacements.push((annotation.span.clone(), inline_styles("")));
                continue;
            }

            log::debug!("Inlining {} stylesheet(s): {:?}", urls.len(), urls);
            let joined = self.compile_all(&compiler, &urls).await?;
            replacements.push((annotation.span.clone(), inline_styles(&joined)));
        }

        Ok(splice(text, &replacements))
    }

    async fn compile_all(&self, compiler: &StyleCompiler<'_>, urls: &[String]) -> Result<String> {
        let pending = urls.iter().map(|url| {
            let reference = self.classifier.reference(url, self.options, self.target_dir);
            async move {
                let source = self.host.read_file(&reference.path).await?;
                compiler.process(&reference, source)
            }
        });

        let compiled = try_join_all(pending).await?;
        Ok(compiled.concat())
    }
}

fn inline_styles(css: &str) -> String {
    format!("styles: ['{}']", css)
}
