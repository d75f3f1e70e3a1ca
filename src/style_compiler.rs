//! Stylesheet compilation: dialect dispatch, minification and escaping

use crate::error::{InlineError, Result};
use crate::escape::{escape_style, strip_line_breaks};
use crate::path_resolver::join_lexically;
use crate::types::{ResourceReference, StyleDialect, DEFAULT_LESS_PATH};
use crate::InlineOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[cfg(windows)]
const PATH_LIST_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_LIST_SEPARATOR: &str = ":";

/// Turns the raw content of a style resource into the text placed inside `styles: ['...']`
pub struct StyleCompiler<'a> {
    options: &'a InlineOptions,
    target_dir: Option<&'a Path>,
}

impl<'a> StyleCompiler<'a> {
    pub fn new(options: &'a InlineOptions, target_dir: Option<&'a Path>) -> Self {
        Self { options, target_dir }
    }

    /// Compile, normalize and escape one resource
    pub fn process(&self, reference: &ResourceReference, source: String) -> Result<String> {
        let css = self.compile(reference, source)?;
        let normalized = if self.options.compress {
            minify_css(&css, &reference.path)
        } else {
            strip_line_breaks(&css)
        };
        Ok(escape_style(&normalized))
    }

    /// Dispatch on the dialect. Plain CSS and unknown types pass through untouched.
    pub fn compile(&self, reference: &ResourceReference, source: String) -> Result<String> {
        match reference.dialect {
            StyleDialect::Scss => compile_scss(&source, &reference.path, &self.options.include_paths),
            StyleDialect::Less => self.compile_less(reference, &source),
            StyleDialect::Css => Ok(source),
            StyleDialect::Unsupported => {
                log::warn!("No compiler for '{}', inlining as-is", reference.url);
                Ok(source)
            }
        }
    }

    /// File name reported to the LESS compiler for diagnostics and relative imports
    pub fn less_filename(&self, reference: &ResourceReference) -> PathBuf {
        match self.target_dir {
            Some(dir) => join_lexically(dir, Path::new(&reference.stem)),
            None => PathBuf::from(&reference.stem),
        }
    }

    /// Arguments for the LESS executable; the source itself is piped on stdin.
    pub fn less_arguments(&self, reference: &ResourceReference) -> Vec<OsString> {
        let base = if self.options.base.is_empty() {
            DEFAULT_LESS_PATH
        } else {
            self.options.base.as_str()
        };

        let mut search_paths = vec![base.to_string()];
        if let Some(dir) = self.less_filename(reference).parent() {
            if !dir.as_os_str().is_empty() {
                search_paths.push(dir.display().to_string());
            }
        }

        let mut args = vec![OsString::from(format!(
            "--include-path={}",
            search_paths.join(PATH_LIST_SEPARATOR)
        ))];
        if self.options.compress {
            args.push(OsString::from("--compress"));
        }
        args.push(OsString::from("-"));
        args
    }

    fn compile_less(&self, reference: &ResourceReference, source: &str) -> Result<String> {
        let filename = self.less_filename(reference);
        let command = &self.options.less_command;
        let args = self.less_arguments(reference);
        log::debug!("Running {} {:?} for {}", command, args, filename.display());

        let mut child = Command::new(command)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                InlineError::compile(
                    StyleDialect::Less,
                    &filename,
                    format!("failed to run '{}': {}", command, e),
                )
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes()).map_err(|e| {
                InlineError::compile(StyleDialect::Less, &filename, format!("failed to write source: {}", e))
            })?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InlineError::compile(StyleDialect::Less, &filename, stderr.trim()));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| InlineError::compile(StyleDialect::Less, &filename, e.to_string()))
    }
}

/// Compile SCSS. The file's own directory is searched before the configured include paths.
pub fn compile_scss(source: &str, path: &Path, include_paths: &[String]) -> Result<String> {
    let mut load_paths: Vec<PathBuf> = Vec::with_capacity(include_paths.len() + 1);
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            load_paths.push(dir.to_path_buf());
        }
    }
    load_paths.extend(include_paths.iter().map(PathBuf::from));

    let options = grass::Options::default().load_paths(&load_paths);
    grass::from_string(source.to_string(), &options)
        .map_err(|e| InlineError::compile(StyleDialect::Scss, path, e.to_string()))
}

/// Minify CSS. Input the minifier cannot handle is kept with only its line breaks removed.
pub fn minify_css(css: &str, path: &Path) -> String {
    match try_minify_css(css, path) {
        Ok(minified) => minified,
        Err(e) => {
            log::warn!("Not minifying {}: {}", path.display(), e);
            strip_line_breaks(css)
        }
    }
}

fn try_minify_css(css: &str, path: &Path) -> Result<String> {
    let parser_options = ParserOptions {
        filename: path.display().to_string(),
        ..ParserOptions::default()
    };
    let mut stylesheet = StyleSheet::parse(css, parser_options)
        .map_err(|e| InlineError::compile(StyleDialect::Css, path, e.to_string()))?;

    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|e| InlineError::compile(StyleDialect::Css, path, e.to_string()))?;

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| InlineError::compile(StyleDialect::Css, path, e.to_string()))?;

    Ok(printed.code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_resolver::UrlClassifier;
    use std::fs;
    use tempfile::TempDir;

    fn reference(url: &str, options: &InlineOptions, target_dir: Option<&Path>) -> ResourceReference {
        UrlClassifier::new().reference(url, options, target_dir)
    }

    #[test]
    fn test_css_passes_through_without_line_breaks() {
        let options = InlineOptions::default();
        let compiler = StyleCompiler::new(&options, None);
        let css = compiler
            .process(&reference("a.css", &options, None), "body {\n color: red;\n}".to_string())
            .unwrap();
        assert_eq!(css, "body { color: red;}");
    }

    #[test]
    fn test_unsupported_type_passes_through() {
        let options = InlineOptions::default();
        let compiler = StyleCompiler::new(&options, None);
        let raw = "raw\r\ncontent 'quoted'";
        let css = compiler.process(&reference("theme.styl", &options, None), raw.to_string()).unwrap();
        assert_eq!(css, r"rawcontent \'quoted\'");
    }

    #[test]
    fn test_compress_minifies() {
        let options = InlineOptions {
            compress: true,
            ..InlineOptions::default()
        };
        let compiler = StyleCompiler::new(&options, None);
        let css = compiler
            .process(&reference("a.css", &options, None), "body {\n color: red;\n}\n".to_string())
            .unwrap();
        assert_eq!(css, "body{color:red}");
    }

    #[test]
    fn test_compress_keeps_css_the_minifier_rejects() {
        let options = InlineOptions {
            compress: true,
            ..InlineOptions::default()
        };
        let compiler = StyleCompiler::new(&options, None);
        let css = compiler
            .process(&reference("a.css", &options, None), ".ie {\n  *zoom: 1;\n  _height: 1px;\n}\n".to_string())
            .unwrap();
        assert_eq!(css, ".ie {  *zoom: 1;  _height: 1px;}");

        let css = compiler
            .process(&reference("b.css", &options, None), "a..b { color: red }".to_string())
            .unwrap();
        assert_eq!(css, "a..b { color: red }");
    }

    #[test]
    fn test_compress_keeps_unsupported_type() {
        let options = InlineOptions {
            compress: true,
            ..InlineOptions::default()
        };
        let compiler = StyleCompiler::new(&options, None);
        let css = compiler
            .process(&reference("a.styl", &options, None), "body\n  color red\n".to_string())
            .unwrap();
        assert_eq!(css, "body  color red");
    }

    #[test]
    fn test_minify_css_falls_back_to_input() {
        assert_eq!(minify_css("p {\n  margin: 0;\n}", Path::new("p.css")), "p{margin:0}");
        assert_eq!(
            minify_css(".ie { *zoom: 1; _height: 1px; }\n", Path::new("ie.css")),
            ".ie { *zoom: 1; _height: 1px; }"
        );
    }

    #[test]
    fn test_compile_scss() {
        let css = compile_scss("$accent: red;\n.btn { color: $accent; }", Path::new("btn.scss"), &[]).unwrap();
        assert!(css.contains(".btn"));
        assert!(css.contains("color: red;"));
    }

    #[test]
    fn test_compile_scss_uses_include_paths() {
        let temp_dir = TempDir::new().unwrap();
        let shared = temp_dir.path().join("shared");
        fs::create_dir(&shared).unwrap();
        fs::write(shared.join("_vars.scss"), "$gap: 4px;").unwrap();

        let css = compile_scss(
            "@import \"vars\";\n.row { margin: $gap; }",
            &temp_dir.path().join("app").join("row.scss"),
            &[shared.display().to_string()],
        )
        .unwrap();
        assert!(css.contains("margin: 4px;"));
    }

    #[test]
    fn test_compile_scss_error() {
        let result = compile_scss(".a { color: $missing; }", Path::new("broken.scss"), &[]);
        match result {
            Err(InlineError::Compile { dialect, path, .. }) => {
                assert_eq!(dialect, StyleDialect::Scss);
                assert_eq!(path, "broken.scss");
            }
            other => panic!("Expected SCSS compile error, got {:?}", other),
        }
    }

    #[test]
    fn test_less_arguments() {
        let options = InlineOptions {
            base: "/project".to_string(),
            compress: true,
            ..InlineOptions::default()
        };
        let target = Path::new("/project/src/app");
        let compiler = StyleCompiler::new(&options, Some(target));
        let reference = reference("./theme/button.less", &options, Some(target));

        assert_eq!(compiler.less_filename(&reference), PathBuf::from("/project/src/app/theme/button"));

        let args = compiler.less_arguments(&reference);
        let expected_paths = format!("/project{}/project/src/app/theme", PATH_LIST_SEPARATOR);
        assert_eq!(args[0], OsString::from(format!("--include-path={}", expected_paths)));
        assert_eq!(args[1], OsString::from("--compress"));
        assert_eq!(args.last(), Some(&OsString::from("-")));
    }

    #[test]
    fn test_less_without_target_dir_uses_stem() {
        let options = InlineOptions::default();
        let compiler = StyleCompiler::new(&options, None);
        let reference = reference("button.less", &options, None);

        assert_eq!(compiler.less_filename(&reference), PathBuf::from("button"));
        assert_eq!(
            compiler.less_arguments(&reference),
            vec![OsString::from("--include-path=./"), OsString::from("-")]
        );
    }

    #[test]
    fn test_less_missing_compiler() {
        let options = InlineOptions {
            less_command: "nginline-test-no-such-lessc".to_string(),
            ..InlineOptions::default()
        };
        let compiler = StyleCompiler::new(&options, None);
        let result = compiler.compile(&reference("a.less", &options, None), "@c: red;".to_string());

        match result {
            Err(InlineError::Compile { dialect, message, .. }) => {
                assert_eq!(dialect, StyleDialect::Less);
                assert!(message.contains("failed to run"));
            }
            other => panic!("Expected LESS compile error, got {:?}", other),
        }
    }
}
