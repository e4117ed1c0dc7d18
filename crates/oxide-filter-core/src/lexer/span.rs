//! Byte ranges into the filter text.

/// A half-open byte range `start..end` in the filter text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the text of `input` covered by this span.
    #[must_use]
    pub fn slice(self, input: &str) -> &str {
        &input[self.start..self.end]
    }

    /// Returns the smallest span covering both.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
