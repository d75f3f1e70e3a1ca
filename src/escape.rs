//! Escaping and line normalization for inlined resources

/// Remove every carriage return and newline so a stylesheet fits on one line
pub fn strip_line_breaks(css: &str) -> String {
    css.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// Escape a stylesheet for a single-quoted literal.
///
/// Backslashes go first; escaping quotes first would double the backslashes it inserts.
pub fn escape_style(css: &str) -> String {
    css.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Put a backslash in front of every `quote` character
pub fn escape_quote(text: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == quote {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Turn each run of line breaks into a string concatenation, so
/// `a\n\nb` becomes `a" +\n"b` for `quote = '"'`.
pub fn join_lines(text: &str, quote: char) -> String {
    let separator = format!("{quote} +\n{quote}");
    let mut joined = String::with_capacity(text.len());
    let mut in_break = false;

    for ch in text.chars() {
        if matches!(ch, '\r' | '\n') {
            if !in_break {
                joined.push_str(&separator);
                in_break = true;
            }
        } else {
            joined.push(ch);
            in_break = false;
        }
    }
    joined
}
