use serde::Serialize;

/// A point in source text.
///
/// `index` counts characters from the start of the buffer, `line` is
/// 1-based and `column` is 0-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub index: usize,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    #[must_use]
    pub const fn new(index: usize, line: u32, column: u32) -> Self {
        Self {
            index,
            line,
            column,
        }
    }
}

/// Half-open range `[start, end)` in source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceSpan {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceSpan {
    #[must_use]
    pub const fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// Number of characters covered by the span.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.index.saturating_sub(self.start.index)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies entirely inside this span.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.start.index <= other.start.index && other.end.index <= self.end.index
    }
}

/// Owned source text with character-indexed random access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    text: String,
    chars: Vec<char>,
}

impl SourceBuffer {
    /// Character returned for any index past the end of the text.
    pub const SENTINEL: char = '\0';

    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = text.chars().collect();
        Self { text, chars }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Character at `index`, or [`Self::SENTINEL`] past the end.
    #[must_use]
    pub fn char_at(&self, index: usize) -> char {
        self.chars.get(index).copied().unwrap_or(Self::SENTINEL)
    }

    /// Text of 1-based line `line`, without its line terminator.
    #[must_use]
    pub fn line(&self, line: u32) -> Option<&str> {
        let n = usize::try_from(line).ok()?.checked_sub(1)?;
        self.text
            .split('\n')
            .nth(n)
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
    }

    /// Lines `start..=end` (1-based), clamped to the lines that exist.
    #[must_use]
    pub fn lines(&self, start: u32, end: u32) -> Vec<&str> {
        if end < start {
            return Vec::new();
        }
        (start.max(1)..=end)
            .map_while(|line| self.line(line))
            .collect()
    }

    /// Text covered by `span`.
    #[must_use]
    pub fn slice(&self, span: &SourceSpan) -> String {
        let end = span.end.index.min(self.chars.len());
        let start = span.start.index.min(end);
        self.chars[start..end].iter().collect()
    }
}

impl From<&str> for SourceBuffer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SourceBuffer {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_at_past_end_is_sentinel() {
        let src = SourceBuffer::new("ab");
        assert_eq!(src.char_at(1), 'b');
        assert_eq!(src.char_at(2), SourceBuffer::SENTINEL);
        assert_eq!(src.char_at(usize::MAX), SourceBuffer::SENTINEL);
    }

    #[test]
    fn lines_are_one_based_and_clamped() {
        let src = SourceBuffer::new("one\r\ntwo\nthree");
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(1), Some("one"));
        assert_eq!(src.lines(2, 3), vec!["two", "three"]);
        assert_eq!(src.lines(3, 9), vec!["three"]);
        assert!(src.lines(3, 2).is_empty());
    }

    #[test]
    fn slice_uses_char_indices() {
        let src = SourceBuffer::new("héllo");
        let span = SourceSpan::new(
            SourceLocation::new(1, 1, 1),
            SourceLocation::new(3, 1, 3),
        );
        assert_eq!(src.slice(&span), "él");
        assert_eq!(span.len(), 2);
    }

    #[test]
    fn equality_is_structural() {
        let a = SourceLocation::new(3, 1, 3);
        let b = SourceLocation::new(3, 2, 3);
        assert_ne!(a, b);
        assert_eq!(a, SourceLocation::new(3, 1, 3));
    }
}
