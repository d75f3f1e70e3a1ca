//! Locating `styleUrls` and `templateUrl` annotations in source text
//!
//! Matching is textual: a locator pattern finds each annotation together with any comment
//! opener written directly in front of it, then the payload (URL list or single URL) is parsed
//! on its own. Every match is returned as an immutable record carrying its byte span, so the
//! resolvers can compute replacements first and splice them in one go afterwards.

use crate::error::{InlineError, Result};
use crate::types::AnnotationKind;
use regex::{Captures, Regex};
use serde::Serialize;
use std::ops::Range;

/// A `styleUrls: [...]` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleUrlsMatch<'t> {
    pub span: Range<usize>,
    /// Comment opener (`//`, `/*`, ...) directly preceding the key, possibly empty
    pub prefix: &'t str,
    /// The bracketed URL list as written
    pub list: &'t str,
}

impl<'t> StyleUrlsMatch<'t> {
    pub fn is_commented_out(&self) -> bool {
        !self.prefix.trim().is_empty()
    }

    /// Parse the URL list. Single quotes are turned into double quotes and the result must be
    /// a JSON array of strings.
    pub fn urls(&self) -> Result<Vec<String>> {
        parse_url_list(self.list)
    }
}

/// A `templateUrl: "..."` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateUrlMatch<'t> {
    pub span: Range<usize>,
    pub prefix: &'t str,
    pub url: &'t str,
    /// Quote character that delimited the URL
    pub quote: char,
}

impl<'t> TemplateUrlMatch<'t> {
    pub fn is_commented_out(&self) -> bool {
        !self.prefix.trim().is_empty()
    }
}

/// One entry of a [`ScanReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedAnnotation {
    pub kind: AnnotationKind,
    /// 1-based line of the annotation key
    pub line: usize,
    pub urls: Vec<String>,
    pub commented_out: bool,
}

/// Every annotation found in a buffer, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub annotations: Vec<ScannedAnnotation>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// URLs of annotations that would be inlined
    pub fn active_urls(&self) -> impl Iterator<Item = &str> {
        self.annotations
            .iter()
            .filter(|a| !a.commented_out)
            .flat_map(|a| a.urls.iter().map(String::as_str))
    }
}

pub struct AnnotationScanner {
    style_urls_regex: Regex,
    template_url_regex: Regex,
}

impl AnnotationScanner {
    pub fn new() -> Self {
        Self {
            style_urls_regex: Regex::new(
                r"([/*]*|[/*]+\s*)styleUrls\s*:\s*(\[(?s:.)(?:.(?s:.)*?)\])",
            )
            .unwrap(),
            template_url_regex: Regex::new(
                r#"([/*]*|[/*]+\s*)templateUrl\s*:\s*(?:"([^"]+)"|'([^']+)')"#,
            )
            .unwrap(),
        }
    }

    pub fn find_style_urls<'t>(&self, text: &'t str) -> Vec<StyleUrlsMatch<'t>> {
        self.style_urls_regex
            .captures_iter(text)
            .map(|caps| StyleUrlsMatch {
                span: whole_span(&caps),
                prefix: group(&caps, 1),
                list: group(&caps, 2),
            })
            .collect()
    }

    pub fn find_template_urls<'t>(&self, text: &'t str) -> Vec<TemplateUrlMatch<'t>> {
        self.template_url_regex
            .captures_iter(text)
            .map(|caps| {
                let (url, quote) = match caps.get(2) {
                    Some(m) => (m.as_str(), '"'),
                    None => (group(&caps, 3), '\''),
                };
                TemplateUrlMatch {
                    span: whole_span(&caps),
                    prefix: group(&caps, 1),
                    url,
                    quote,
                }
            })
            .collect()
    }

    /// List every annotation without reading any resource.
    pub fn scan(&self, text: &str) -> Result<ScanReport> {
        let mut annotations = Vec::new();

        for m in self.find_style_urls(text) {
            annotations.push(ScannedAnnotation {
                kind: AnnotationKind::StyleUrls,
                line: line_of(text, m.span.start + m.prefix.len()),
                urls: m.urls()?,
                commented_out: m.is_commented_out(),
            });
        }
        for m in self.find_template_urls(text) {
            annotations.push(ScannedAnnotation {
                kind: AnnotationKind::TemplateUrl,
                line: line_of(text, m.span.start + m.prefix.len()),
                urls: vec![m.url.to_string()],
                commented_out: m.is_commented_out(),
            });
        }

        annotations.sort_by_key(|a| a.line);
        Ok(ScanReport { annotations })
    }
}

impl Default for AnnotationScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a bracketed URL list such as `['a.css', "b.scss"]`
pub fn parse_url_list(list: &str) -> Result<Vec<String>> {
    let normalized = list.replace('\'', "\"");
    serde_json::from_str::<Vec<String>>(&normalized)
        .map_err(|e| InlineError::malformed(format!("invalid styleUrls list {}: {}", list, e)))
}

/// Rebuild `text` with each span replaced. Spans must be sorted and non-overlapping.
pub fn splice(text: &str, replacements: &[(Range<usize>, String)]) -> String {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for (span, replacement) in replacements {
        result.push_str(&text[last..span.start]);
        result.push_str(replacement);
        last = span.end;
    }
    result.push_str(&text[last..]);
    result
}

fn whole_span(caps: &Captures<'_>) -> Range<usize> {
    caps.get(0).map_or(0..0, |m| m.range())
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
