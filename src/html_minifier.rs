//! Whitespace-collapsing HTML minifier for component templates
//!
//! Custom fragments (by default property bindings `[name]="..."` and event bindings
//! `(name)="..."`) are swapped for placeholders before minification and restored afterwards,
//! so binding expressions reach the output byte for byte. Contents of `pre`, `textarea`,
//! `script` and `style` elements are never touched.

use regex::Regex;
use std::borrow::Cow;

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Elements whose content is copied verbatim
const VERBATIM_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style"];

/// Elements that flow with text; a single space next to them is significant
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "b", "bdi", "bdo", "big", "br", "button", "cite", "code", "del",
    "dfn", "em", "font", "i", "img", "input", "ins", "kbd", "label", "mark", "math", "nobr",
    "object", "q", "rp", "rt", "rtc", "ruby", "s", "samp", "select", "small", "span", "strike",
    "strong", "sub", "sup", "svg", "textarea", "time", "tt", "u", "var", "wbr",
];

/// Inline elements without content
const VOID_ELEMENTS: &[&str] = &["br", "img", "input", "wbr"];

/// Property bindings: ` [name]="value"`
pub const PROPERTY_BINDING_PATTERN: &str = r#"\s\[.*\]="[^"]*""#;

/// Event bindings: ` (name)="value"`
pub const EVENT_BINDING_PATTERN: &str = r#"\s\([^)"]+\)="[^"]*""#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlMinifyOptions {
    /// Keep tag names as written instead of lowercasing them
    pub case_sensitive: bool,
    pub collapse_whitespace: bool,
    /// Drop comments, except conditional comments
    pub remove_comments: bool,
}

impl HtmlMinifyOptions {
    /// Settings used for component templates; `compress` additionally strips comments
    pub fn for_templates(compress: bool) -> Self {
        Self {
            case_sensitive: true,
            collapse_whitespace: true,
            remove_comments: compress,
        }
    }
}

impl Default for HtmlMinifyOptions {
    fn default() -> Self {
        Self::for_templates(false)
    }
}

#[derive(Debug)]
enum Token<'h> {
    Text(Cow<'h, str>),
    Tag {
        raw: &'h str,
        name: String,
        closing: bool,
    },
    Comment(&'h str),
    Verbatim(&'h str),
}

pub struct HtmlMinifier {
    options: HtmlMinifyOptions,
    ignored_fragments: Vec<Regex>,
    placeholder_regex: Regex,
}

impl HtmlMinifier {
    pub fn new(options: HtmlMinifyOptions) -> Self {
        Self {
            options,
            ignored_fragments: vec![
                Regex::new(PROPERTY_BINDING_PATTERN).unwrap(),
                Regex::new(EVENT_BINDING_PATTERN).unwrap(),
            ],
            placeholder_regex: Regex::new("\u{E000}([0-9]+)\u{E001}").unwrap(),
        }
    }

    pub fn minify(&self, html: &str) -> String {
        let mut fragments = Vec::new();
        let protected = self.protect_fragments(html, &mut fragments);

        let tokens = self.tokenize(&protected);
        let tokens = self.drop_comments(tokens);
        let minified = self.render(&tokens);

        self.placeholder_regex
            .replace_all(&minified, |caps: &regex::Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| fragments.get(index))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn protect_fragments(&self, html: &str, fragments: &mut Vec<String>) -> String {
        let mut protected = html.to_string();
        for regex in &self.ignored_fragments {
            protected = regex
                .replace_all(&protected, |caps: &regex::Captures<'_>| {
                    fragments.push(caps[0].to_string());
                    format!("{}{}{}", PLACEHOLDER_OPEN, fragments.len() - 1, PLACEHOLDER_CLOSE)
                })
                .into_owned();
        }
        protected
    }

    fn tokenize<'h>(&self, html: &'h str) -> Vec<Token<'h>> {
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < html.len() {
            let rest = &html[pos..];

            if rest.starts_with("<!--") {
                let end = rest[4..].find("-->").map_or(rest.len(), |i| i + 4 + 3);
                tokens.push(Token::Comment(&rest[..end]));
                pos += end;
                continue;
            }

            if starts_tag(rest) {
                if let Some(end) = find_tag_end(rest) {
                    let raw = &rest[..end];
                    pos += end;

                    if raw.starts_with("<!") || raw.starts_with("<?") {
                        tokens.push(Token::Verbatim(raw));
                        continue;
                    }

                    let name = tag_name(raw).to_ascii_lowercase();
                    let closing = raw.starts_with("</");
                    let self_closing = raw.ends_with("/>");
                    let verbatim = !closing && !self_closing && VERBATIM_ELEMENTS.contains(&name.as_str());
                    tokens.push(Token::Tag {
                        raw,
                        name: name.clone(),
                        closing,
                    });

                    if verbatim {
                        let content_end = find_closing_tag(&html[pos..], &name).unwrap_or(html.len() - pos);
                        if content_end > 0 {
                            tokens.push(Token::Verbatim(&html[pos..pos + content_end]));
                        }
                        pos += content_end;
                    }
                    continue;
                }
            }

            // Text runs up to the next tag opener; a stray '<' is part of the text.
            let text_end = rest
                .char_indices()
                .skip(1)
                .find(|(i, c)| *c == '<' && (starts_tag(&rest[*i..]) || rest[*i..].starts_with("<!--")))
                .map_or(rest.len(), |(i, _)| i);
            tokens.push(Token::Text(Cow::Borrowed(&rest[..text_end])));
            pos += text_end;
        }

        tokens
    }

    fn drop_comments<'h>(&self, tokens: Vec<Token<'h>>) -> Vec<Token<'h>> {
        let mut kept: Vec<Token<'h>> = Vec::with_capacity(tokens.len());

        for token in tokens {
            if let Token::Comment(raw) = &token {
                if self.options.remove_comments && !is_conditional_comment(raw) {
                    continue;
                }
            }
            if let Token::Text(text) = &token {
                if let Some(Token::Text(previous)) = kept.last_mut() {
                    previous.to_mut().push_str(text);
                    continue;
                }
            }
            kept.push(token);
        }
        kept
    }

    fn render(&self, tokens: &[Token<'_>]) -> String {
        let mut out = String::new();

        for (index, token) in tokens.iter().enumerate() {
            match token {
                Token::Text(text) => {
                    if !self.options.collapse_whitespace {
                        out.push_str(text);
                        continue;
                    }
                    let mut collapsed = collapse_whitespace(text);
                    let before = index.checked_sub(1).and_then(|i| tokens.get(i));
                    if !keeps_space_after(before) {
                        collapsed = collapsed.trim_start().to_string();
                    }
                    if !keeps_space_before(tokens.get(index + 1)) {
                        collapsed = collapsed.trim_end().to_string();
                    }
                    out.push_str(&collapsed);
                }
                Token::Tag { raw, .. } => {
                    let tag = if self.options.collapse_whitespace {
                        collapse_tag(raw)
                    } else {
                        raw.to_string()
                    };
                    if self.options.case_sensitive {
                        out.push_str(&tag);
                    } else {
                        out.push_str(&lowercase_tag_name(&tag));
                    }
                }
                Token::Comment(raw) | Token::Verbatim(raw) => out.push_str(raw),
            }
        }

        out
    }
}

fn starts_tag(s: &str) -> bool {
    let mut chars = s.chars();
    if chars.next() != Some('<') {
        return false;
    }
    match chars.next() {
        Some('/') => chars.next().map_or(false, |c| c.is_ascii_alphabetic()),
        Some('!') | Some('?') => true,
        Some(c) => c.is_ascii_alphabetic(),
        None => false,
    }
}

/// Byte length of the tag starting at `s`, quotes respected
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, ch) in s.char_indices().skip(1) {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == '>' => return Some(i + 1),
            None => {}
        }
    }
    None
}

fn tag_name(raw: &str) -> &str {
    let start = if raw.starts_with("</") { 2 } else { 1 };
    let rest = &raw[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
        .unwrap_or(rest.len());
    &rest[..end]
}

fn find_closing_tag(s: &str, name: &str) -> Option<usize> {
    let needle = format!("</{}", name);
    let lower = s.to_ascii_lowercase();
    lower.find(&needle)
}

fn is_conditional_comment(raw: &str) -> bool {
    raw.starts_with("<!--[if") || raw.starts_with("<!--<!") || raw.ends_with("<![endif]-->")
}

/// Whether whitespace following `token` is kept as a single space
fn keeps_space_after(token: Option<&Token<'_>>) -> bool {
    match token {
        Some(Token::Tag { name, closing, .. }) => {
            INLINE_ELEMENTS.contains(&name.as_str()) && (*closing || VOID_ELEMENTS.contains(&name.as_str()))
        }
        Some(Token::Comment(_)) | Some(Token::Text(_)) => true,
        Some(Token::Verbatim(_)) | None => false,
    }
}

/// Whether whitespace preceding `token` is kept as a single space
fn keeps_space_before(token: Option<&Token<'_>>) -> bool {
    match token {
        Some(Token::Tag { name, closing, .. }) => !*closing && INLINE_ELEMENTS.contains(&name.as_str()),
        Some(Token::Comment(_)) | Some(Token::Text(_)) => true,
        Some(Token::Verbatim(_)) | None => false,
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Collapse whitespace between attributes. Quoted values and placeholders, which carry their
/// own leading whitespace, are left alone.
fn collapse_tag(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let closes = ch == '>' || (ch == '/' && chars.peek() == Some(&'>'));
            if !closes && ch != PLACEHOLDER_OPEN {
                out.push(' ');
            }
            pending_space = false;
        }
        if ch == '"' || ch == '\'' {
            quote = Some(ch);
        }
        out.push(ch);
    }
    out
}

fn lowercase_tag_name(tag: &str) -> String {
    let start = if tag.starts_with("</") { 2 } else { 1 };
    let name_len = tag_name(tag).len();
    format!(
        "{}{}{}",
        &tag[..start],
        tag[start..start + name_len].to_ascii_lowercase(),
        &tag[start + name_len..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minify(html: &str, compress: bool) -> String {
        HtmlMinifier::new(HtmlMinifyOptions::for_templates(compress)).minify(html)
    }

    #[test]
    fn test_property_binding_survives() {
        assert_eq!(minify("<div [foo]=\"bar\">\n  Hi\n</div>", false), "<div [foo]=\"bar\">Hi</div>");
    }

    #[test]
    fn test_event_binding_survives() {
        let html = "<button   class=\"btn\"\n   (click)=\"save( item )\"  >\n  Save\n</button>";
        assert_eq!(
            minify(html, false),
            "<button class=\"btn\" (click)=\"save( item )\">Save</button>"
        );
    }

    #[test]
    fn test_collapses_whitespace_between_blocks() {
        let html = "<ul>\n  <li>One</li>\n  <li>Two   words</li>\n</ul>\n";
        assert_eq!(minify(html, false), "<ul><li>One</li><li>Two words</li></ul>");
    }

    #[test]
    fn test_keeps_space_around_inline_elements() {
        let html = "<p>\n  Hello   <b>big</b>\n  world\n</p>";
        assert_eq!(minify(html, false), "<p>Hello <b>big</b> world</p>");
    }

    #[test]
    fn test_case_is_preserved() {
        let html = "<ng-Container *ngIf=\"x\"><MyWidget></MyWidget></ng-Container>";
        assert_eq!(minify(html, false), html);

        let lowered = HtmlMinifier::new(HtmlMinifyOptions {
            case_sensitive: false,
            ..HtmlMinifyOptions::default()
        })
        .minify("<DIV Class=\"A\"></DIV>");
        assert_eq!(lowered, "<div Class=\"A\"></div>");
    }

    #[test]
    fn test_comments_kept_unless_compressing() {
        let html = "<div>\n  <!-- note -->\n  <span>x</span>\n</div>";
        assert_eq!(minify(html, false), "<div><!-- note --> <span>x</span></div>");
        assert_eq!(minify(html, true), "<div><span>x</span></div>");
    }

    #[test]
    fn test_conditional_comments_survive_compression() {
        let html = "<!--[if IE]><p>old</p><![endif]-->";
        assert_eq!(minify(html, true), html);
    }

    #[test]
    fn test_pre_content_is_verbatim() {
        let html = "<div>\n  <pre>  line one\n    line two</pre>\n</div>";
        assert_eq!(minify(html, false), "<div><pre>  line one\n    line two</pre></div>");
    }

    #[test]
    fn test_interpolation_and_stray_angle_bracket() {
        let html = "<span>{{ a < b ? 'yes' : \"no\" }}</span>";
        assert_eq!(minify(html, false), html);
    }

    #[test]
    fn test_bindings_on_separate_lines_join_the_tag() {
        let html = "<input\n  [value]=\"name\"\n  (input)=\"name = $event.target.value\">";
        assert_eq!(
            minify(html, false),
            "<input [value]=\"name\" (input)=\"name = $event.target.value\">"
        );
    }
}
