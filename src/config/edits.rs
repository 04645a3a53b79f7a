use crate::hcl::Span;

/// A replacement of one byte range of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn delete(span: Span) -> Self {
        Self::replace(span, String::new())
    }
}

/// Applies non-overlapping edits to `src`. Edits are applied back to front so
/// earlier spans stay valid; overlapping edits after the first are dropped.
pub fn apply_edits(src: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by_key(|edit| (edit.span.start, edit.span.end));

    let mut accepted: Vec<TextEdit> = Vec::with_capacity(edits.len());
    for edit in edits {
        match accepted.last() {
            Some(prev) if edit.span.start < prev.span.end => {
                log::debug!(
                    "Dropping overlapping edit at {}..{}",
                    edit.span.start,
                    edit.span.end
                );
            }
            _ => accepted.push(edit),
        }
    }

    let mut out = src.to_string();
    for edit in accepted.iter().rev() {
        out.replace_range(edit.span.start..edit.span.end, &edit.replacement);
    }
    out
}

/// The leading whitespace of the line containing `offset`.
pub fn line_indent(src: &str, offset: usize) -> &str {
    let line_start = src[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &src[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Widens `span` to cover its whole line (including the trailing newline)
/// when nothing but whitespace shares the line with it.
pub fn line_extent(src: &str, span: Span) -> Span {
    let line_start = src[..span.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = src[span.end..]
        .find('\n')
        .map_or(src.len(), |i| span.end + i);

    let alone_before = src[line_start..span.start].trim().is_empty();
    let alone_after = src[span.end..line_end].trim().is_empty();
    if !(alone_before && alone_after) {
        return span;
    }
    let end = if line_end < src.len() {
        line_end + 1
    } else {
        line_end
    };
    Span::new(line_start, end)
}

/// Like [`line_extent`], but also takes one blank line next to a block that
/// sits alone on its lines, preferring the one above it.
pub fn removal_extent(src: &str, span: Span) -> Span {
    let line = line_extent(src, span);
    if line == span {
        return span;
    }
    if line.start > 0 {
        let above = src[..line.start - 1].rfind('\n').map_or(0, |i| i + 1);
        if src[above..line.start].trim().is_empty() {
            return Span::new(above, line.end);
        }
    }
    match src[line.end..].find('\n').map(|i| line.end + i + 1) {
        Some(below) if src[line.end..below].trim().is_empty() => Span::new(line.start, below),
        _ => line,
    }
}

/// Joins overlapping or touching spans.
pub fn merge_spans(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by_key(|span| span.start);
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// The line ending the document uses: `\r\n` when any line ends with it.
pub fn newline(src: &str) -> &'static str {
    if src.contains("\r\n") { "\r\n" } else { "\n" }
}
