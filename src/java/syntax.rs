//! Text helpers shared by the parser, the analyzers and the code generator

use tree_sitter::Node;

use super::ast::Span;

// ============================================================================
// Node text
// ============================================================================

/// Get text content of a node
pub fn node_text(node: &Node, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

pub fn span_of(node: &Node) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// Normalize whitespace: collapse multiple spaces/newlines to single space
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Line geometry
// ============================================================================

/// Offset of the first byte of the line containing `offset`
pub fn line_start(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Offset just past the newline ending the line containing `offset`
/// (or the end of the text on the last line)
pub fn line_end_inclusive(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    source[offset..]
        .find('\n')
        .map(|i| offset + i + 1)
        .unwrap_or(source.len())
}

/// Whether only whitespace precedes `offset` on its line
pub fn first_on_line(source: &str, offset: usize) -> bool {
    let start = line_start(source, offset);
    source[start..offset].chars().all(|c| c == ' ' || c == '\t')
}

/// Whether only whitespace follows `offset` on its line
pub fn last_on_line(source: &str, offset: usize) -> bool {
    let offset = offset.min(source.len());
    let rest = &source[offset..];
    let line = rest.split('\n').next().unwrap_or("");
    line.trim_end_matches('\r').chars().all(|c| c == ' ' || c == '\t')
}

/// Leading whitespace of the line containing `offset`
pub fn indentation_at(source: &str, offset: usize) -> &str {
    let start = line_start(source, offset);
    let line = &source[start..];
    let width = line
        .char_indices()
        .find(|(_, c)| *c != ' ' && *c != '\t')
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..width]
}

/// 1-based line number of `offset`
pub fn line_number(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}

/// Indentation unit used by the file: the smallest non-zero leading run of
/// spaces, or a tab when lines are tab-indented. Defaults to two spaces.
pub fn detect_indent_unit(source: &str) -> String {
    let mut smallest: Option<usize> = None;
    for line in source.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('\t') {
            return "\t".to_string();
        }
        let spaces = line.len() - line.trim_start_matches(' ').len();
        if spaces > 0 && smallest.map_or(true, |s| spaces < s) {
            smallest = Some(spaces);
        }
    }
    " ".repeat(smallest.unwrap_or(2))
}

/// Expand a span to whole lines when it is the only content on them, so that
/// deleting it leaves no blank line behind. Otherwise the span is returned as is.
pub fn whole_line_span(source: &str, span: Span) -> Span {
    if first_on_line(source, span.start) && last_on_line(source, span.end) {
        Span::new(
            line_start(source, span.start),
            line_end_inclusive(source, span.end),
        )
    } else {
        span
    }
}
