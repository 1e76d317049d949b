// src/render/markup.rs
//
// Markdown subset used by the advice text.
//
// Supported:
// - **bold** and "quoted phrase" emphasis (quotes are dropped)
// - #, ## and ### headings: a blank line, then the heading in bold
// - "- item" bullets; two leading spaces per nesting level
// - continuation lines under a bullet keep the bullet's text indent
//
// `translate` produces styled lines, `layout` wraps them to a width. The
// summary height is measured with the same `layout` that draws it.

use std::sync::OnceLock;

use regex::Regex;

use crate::render::surface::FontStyle;
use crate::render::text_metrics::text_width;

/// Width of one indent step, in spaces.
const INDENT_SPACES: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: FontStyle,
}

impl Span {
    fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: FontStyle::Regular,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: FontStyle::Bold,
        }
    }
}

/// One source line after translation. An empty `spans` is a blank line.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupLine {
    /// Indent of the first wrapped row, in space widths.
    pub indent: usize,
    /// Indent of the following wrapped rows, in space widths.
    pub hanging_indent: usize,
    pub spans: Vec<Span>,
}

impl MarkupLine {
    fn blank() -> Self {
        Self {
            indent: 0,
            hanging_indent: 0,
            spans: Vec::new(),
        }
    }

    fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// A laid-out row: runs positioned relative to the left edge of the text box.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub runs: Vec<(f32, Span)>,
}

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(#{1,3})\s+(.*)$").expect("valid heading regex"))
}

fn bullet_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\s*)-\s+(.*)$").expect("valid bullet regex"))
}

fn emphasis_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\*\*(.*?)\*\*|"([^"]+)""#).expect("valid emphasis regex")
    })
}

/// Splits inline emphasis into styled spans.
pub fn parse_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;
    for captures in emphasis_pattern().captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::regular(&text[last..whole.start()]));
        }
        let inner = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        if !inner.is_empty() {
            spans.push(Span::bold(inner));
        }
        last = whole.end();
    }
    if last < text.len() {
        spans.push(Span::regular(&text[last..]));
    }
    spans
}

pub fn translate(text: &str) -> Vec<MarkupLine> {
    let mut lines = Vec::new();
    let mut continuation: Option<usize> = None;

    for raw in text.lines() {
        if let Some(captures) = heading_pattern().captures(raw) {
            let heading = captures.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            let heading = heading.replace("**", "");
            lines.push(MarkupLine::blank());
            lines.push(MarkupLine {
                indent: 0,
                hanging_indent: 0,
                spans: vec![Span::bold(heading)],
            });
            continuation = None;
            continue;
        }

        if let Some(captures) = bullet_pattern().captures(raw) {
            let leading = captures.get(1).map(|m| m.as_str().len()).unwrap_or(0);
            let content = captures.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            let level = leading / 2;
            let indent = level * INDENT_SPACES;
            let marker = if level == 1 { "- " } else { "• " };

            let mut spans = vec![Span::regular(marker)];
            spans.extend(parse_inline(content));
            lines.push(MarkupLine {
                indent,
                hanging_indent: indent + 2,
                spans,
            });
            continuation = Some(indent + 2);
            continue;
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            lines.push(MarkupLine::blank());
            continuation = None;
            continue;
        }

        let indent = continuation.unwrap_or(0);
        lines.push(MarkupLine {
            indent,
            hanging_indent: indent,
            spans: parse_inline(trimmed),
        });
    }
    lines
}

/// Wraps translated lines into rows no wider than `max_width`.
pub fn layout(lines: &[MarkupLine], size: f32, max_width: f32) -> Vec<Row> {
    let space = text_width(" ", size, FontStyle::Regular);
    let mut rows = Vec::new();

    for line in lines {
        if line.spans.is_empty() || line.plain_text().trim().is_empty() {
            rows.push(Row { runs: Vec::new() });
            continue;
        }

        let first_x = line.indent as f32 * space;
        let hanging_x = line.hanging_indent as f32 * space;
        let mut row = Row { runs: Vec::new() };
        let mut x = first_x;
        let mut row_start = true;

        for span in &line.spans {
            let leading_space = span.text.starts_with(char::is_whitespace);
            let is_marker = span.style == FontStyle::Regular && (span.text == "• " || span.text == "- ");
            if is_marker {
                let width = text_width(&span.text, size, span.style);
                row.runs.push((x, span.clone()));
                x += width;
                row_start = false;
                continue;
            }

            for (index, word) in span.text.split_whitespace().enumerate() {
                let needs_space =
                    !row_start && !ends_with_space(&row) && (index > 0 || leading_space);
                let gap = if needs_space { space } else { 0.0 };
                let width = text_width(word, size, span.style);

                if !row_start && x + gap + width > max_width {
                    rows.push(std::mem::replace(&mut row, Row { runs: Vec::new() }));
                    x = hanging_x;
                    row.runs.push((x, Span { text: word.to_string(), style: span.style }));
                    x += width;
                    continue;
                }

                x += gap;
                row.runs.push((x, Span { text: word.to_string(), style: span.style }));
                x += width;
                row_start = false;
            }

            if span.text.ends_with(char::is_whitespace) {
                if let Some((_, last)) = row.runs.last_mut() {
                    if !last.text.ends_with(' ') {
                        last.text.push(' ');
                        x += space;
                    }
                }
            }
        }
        rows.push(row);
    }
    rows
}

fn ends_with_space(row: &Row) -> bool {
    row.runs
        .last()
        .map(|(_, span)| span.text.ends_with(' '))
        .unwrap_or(false)
}

/// Height of the laid-out text at `leading` points per row.
pub fn measure(text: &str, size: f32, leading: f32, max_width: f32) -> f32 {
    layout(&translate(text), size, max_width).len() as f32 * leading
}
