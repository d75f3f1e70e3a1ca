//! Resolution of resource URLs to file paths

use crate::types::{ResourceReference, StyleDialect, DEFAULT_BASE};
use crate::InlineOptions;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

/// Resolve a URL against the target directory (relative mode) or the configured base.
///
/// Never fails; a bad path shows up later when the file is read.
pub fn resolve_url(url: &str, options: &InlineOptions, target_dir: Option<&Path>) -> PathBuf {
    let root = if options.relative {
        target_dir.unwrap_or(Path::new(""))
    } else if options.base.is_empty() {
        Path::new(DEFAULT_BASE)
    } else {
        Path::new(&options.base)
    };
    join_lexically(root, Path::new(url))
}

/// Join two paths the way a build tool does: the second path is always appended (even when
/// absolute) and `.`/`..` segments are folded without consulting the file system.
pub fn join_lexically(root: &Path, tail: &Path) -> PathBuf {
    let mut joined = PathBuf::new();
    let mut depth = 0usize;

    for component in root.components() {
        push_component(&mut joined, &mut depth, component, true);
    }
    for component in tail.components() {
        push_component(&mut joined, &mut depth, component, false);
    }

    if joined.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        joined
    }
}

fn push_component(joined: &mut PathBuf, depth: &mut usize, component: Component<'_>, leading: bool) {
    match component {
        Component::Prefix(_) | Component::RootDir => {
            if leading {
                joined.push(component.as_os_str());
            }
        }
        Component::CurDir => {}
        Component::ParentDir => {
            if *depth > 0 {
                joined.pop();
                *depth -= 1;
            } else if !joined.has_root() {
                joined.push("..");
            }
        }
        Component::Normal(part) => {
            joined.push(part);
            *depth += 1;
        }
    }
}

/// Classifies style URLs by their suffix
pub struct UrlClassifier {
    suffix_regex: Regex,
}

impl UrlClassifier {
    pub fn new() -> Self {
        Self {
            suffix_regex: Regex::new(r"(?s)^[./]*(.*)\.(css|less|scss)$").unwrap(),
        }
    }

    /// Split a URL into its stem and dialect; URLs without a known suffix are `Unsupported`
    /// and keep the whole URL as stem.
    pub fn classify<'u>(&self, url: &'u str) -> (&'u str, StyleDialect) {
        match self.suffix_regex.captures(url) {
            Some(caps) => {
                let stem = caps.get(1).map_or("", |m| m.as_str());
                let extension = caps.get(2).map_or("", |m| m.as_str());
                (stem, StyleDialect::from_extension(extension))
            }
            None => (url, StyleDialect::Unsupported),
        }
    }

    /// Build the full reference record for one style URL
    pub fn reference(
        &self,
        url: &str,
        options: &InlineOptions,
        target_dir: Option<&Path>,
    ) -> ResourceReference {
        let (stem, dialect) = self.classify(url);
        ResourceReference {
            url: url.to_string(),
            stem: stem.to_string(),
            path: resolve_url(url, options, target_dir),
            dialect,
        }
    }
}

impl Default for UrlClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_mode_uses_target_dir() {
        let options = InlineOptions {
            relative: true,
            ..InlineOptions::default()
        };
        let path = resolve_url("x.css", &options, Some(Path::new("/app/src")));
        assert_eq!(path, PathBuf::from("/app/src/x.css"));
    }

    #[test]
    fn test_base_mode_uses_base() {
        let options = InlineOptions {
            base: "/root".to_string(),
            ..InlineOptions::default()
        };
        let path = resolve_url("x.css", &options, Some(Path::new("/app/src")));
        assert_eq!(path, PathBuf::from("/root/x.css"));
    }

    #[test]
    fn test_default_base_is_current_dir() {
        let options = InlineOptions {
            base: String::new(),
            ..InlineOptions::default()
        };
        assert_eq!(resolve_url("./styles/a.css", &options, None), PathBuf::from("styles/a.css"));
    }

    #[test]
    fn test_join_folds_dot_segments() {
        assert_eq!(
            join_lexically(Path::new("/app/src"), Path::new("../shared/./theme.scss")),
            PathBuf::from("/app/shared/theme.scss")
        );
        assert_eq!(
            join_lexically(Path::new("./"), Path::new("../up.css")),
            PathBuf::from("../up.css")
        );
        assert_eq!(join_lexically(Path::new("/"), Path::new("../../a.css")), PathBuf::from("/a.css"));
        assert_eq!(join_lexically(Path::new("."), Path::new(".")), PathBuf::from("."));
    }

    #[test]
    fn test_join_appends_absolute_tail() {
        assert_eq!(
            join_lexically(Path::new("/root"), Path::new("/x.css")),
            PathBuf::from("/root/x.css")
        );
    }

    #[test]
    fn test_classify_urls() {
        let classifier = UrlClassifier::new();
        assert_eq!(classifier.classify("./app.component.css"), ("app.component", StyleDialect::Css));
        assert_eq!(classifier.classify("../theme/vars.less"), ("theme/vars", StyleDialect::Less));
        assert_eq!(classifier.classify("/styles/main.scss"), ("styles/main", StyleDialect::Scss));
        assert_eq!(classifier.classify("main.sass"), ("main.sass", StyleDialect::Unsupported));
        assert_eq!(classifier.classify("style"), ("style", StyleDialect::Unsupported));
    }

    #[test]
    fn test_reference_carries_resolved_path() {
        let classifier = UrlClassifier::new();
        let options = InlineOptions {
            base: "/project".to_string(),
            ..InlineOptions::default()
        };
        let reference = classifier.reference("./button.less", &options, None);
        assert_eq!(reference.url, "./button.less");
        assert_eq!(reference.stem, "button");
        assert_eq!(reference.path, PathBuf::from("/project/button.less"));
        assert_eq!(reference.dialect, StyleDialect::Less);
    }
}
