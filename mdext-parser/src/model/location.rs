use serde::Serialize;

/// A byte range into the document source.
///
/// Every node stores spans instead of owned text; the text is recovered from the
/// [`Document`](crate::Document) source when needed.
#[derive(Debug, Default, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty span positioned at `offset`.
    #[must_use]
    pub const fn empty_at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// The text covered by this span, or an empty string when the span does not
    /// belong to `source`.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or_default()
    }

    /// Whether the characters of `self` continue contiguously into `next`.
    #[must_use]
    pub const fn is_continued_by(&self, next: Span) -> bool {
        self.end == next.start
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    #[must_use]
    pub const fn shifted(self, offset: usize) -> Span {
        Span {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    /// Validates that this span can be used to slice `input`.
    ///
    /// Checks:
    /// - `start <= end` (valid range)
    /// - `end <= input.len()` (within bounds)
    /// - Both offsets are on UTF-8 character boundaries
    ///
    /// # Errors
    /// Returned as strings for easier debugging.
    pub fn validate(&self, input: &str) -> Result<(), String> {
        if self.start > self.end {
            return Err(format!(
                "Invalid range: start {} > end {}",
                self.start, self.end
            ));
        }
        if self.end > input.len() {
            return Err(format!(
                "End offset {} exceeds input length {}",
                self.end,
                input.len()
            ));
        }
        if !input.is_char_boundary(self.start) {
            return Err(format!("Start offset {} not on UTF-8 boundary", self.start));
        }
        if !input.is_char_boundary(self.end) {
            return Err(format!("End offset {} not on UTF-8 boundary", self.end));
        }
        Ok(())
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A `Location` represents a human-readable region in a document, used when
/// reporting errors.
#[derive(Debug, Default, Clone, Hash, Eq, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Location {
    /// The absolute start position of the location.
    pub absolute_start: usize,
    /// The absolute end position of the location.
    pub absolute_end: usize,

    /// The start position of the location.
    pub start: Position,
    /// The end position of the location.
    pub end: Position,
}

impl Location {
    #[must_use]
    pub fn new(span: Span, start: Position, end: Position) -> Self {
        Self {
            absolute_start: span.start,
            absolute_end: span.end,
            start,
            end,
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.absolute_start, self.absolute_end)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "location.start({}), location.end({})",
            self.start, self.end
        )
    }
}

/// A `Position` represents a human-readable position in a document.
///
/// This is purely for display/error reporting purposes. For byte offsets,
/// use [`Span`].
#[derive(Debug, Default, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Position {
    /// The line number of the position (1-indexed).
    pub line: usize,
    /// The column number of the position (1-indexed, counted as Unicode scalar values).
    #[serde(rename = "col")]
    pub column: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line: {}, column: {}", self.line, self.column)
    }
}
