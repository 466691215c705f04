//! Byte-offset spans and line/column lookup.
//!
//! Ported from the teacher's `Position`/`Code` pair: a span is cheap to carry on every
//! token, while the line/column lookup (only needed for error messages) is computed
//! lazily and memoized once per source buffer.

use once_cell::unsync::OnceCell;

/// A half-open byte range `[start, end)` into the original source.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn point(at: usize) -> Self {
        Self { start: at, end: at }
    }
}

/// Human-facing line/column, both 1-indexed.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A source buffer with a lazily-built index of line-break offsets.
pub struct Source<'s> {
    pub text: &'s str,
    line_breaks: OnceCell<Vec<usize>>,
}

impl<'s> From<&'s str> for Source<'s> {
    fn from(text: &'s str) -> Self {
        Source::new(text)
    }
}

impl<'s> Source<'s> {
    pub fn new(text: &'s str) -> Self {
        Self {
            text,
            line_breaks: OnceCell::new(),
        }
    }

    fn line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.text
                .bytes()
                .enumerate()
                .filter_map(|(i, b)| if b == b'\n' { Some(i) } else { None })
                .collect()
        })
    }

    /// Resolve a byte offset to a 1-indexed line/column pair.
    pub fn position_at(&self, offset: usize) -> LineCol {
        let breaks = self.line_breaks();
        let index = match breaks.binary_search(&offset) {
            Ok(i) | Err(i) => i,
        };
        if index == 0 {
            LineCol {
                line: 1,
                column: offset + 1,
            }
        } else {
            let line_start = breaks[index - 1] + 1;
            LineCol {
                line: index + 1,
                column: offset - line_start + 1,
            }
        }
    }
}
