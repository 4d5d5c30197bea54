use crate::{Location, Position, Span};

/// Line start offsets of a source, used to turn byte offsets into line/column
/// positions for diagnostics.
///
/// Built once per document in O(n); lookups are a binary search.
#[derive(Debug, Clone, Default)]
pub(crate) struct LineMap {
    line_starts: Vec<usize>,
}

impl LineMap {
    pub(crate) fn new(input: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            input
                .char_indices()
                .filter(|(_, ch)| *ch == '\n')
                .map(|(offset, _)| offset + 1),
        );
        Self { line_starts }
    }

    /// Columns are counted as Unicode scalar values, not bytes. Offsets beyond the
    /// input are clamped, offsets inside a multi-byte character round backwards.
    pub(crate) fn offset_to_position(&self, offset: usize, input: &str) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index,
        };
        let line_start = self
            .line_starts
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or(0);

        let mut adjusted = offset.min(input.len());
        while adjusted > 0 && !input.is_char_boundary(adjusted) {
            adjusted -= 1;
        }

        let column = input
            .get(line_start..adjusted)
            .map_or(0, |s| s.chars().count());
        Position::new(line, column + 1)
    }

    pub(crate) fn location(&self, span: Span, input: &str) -> Location {
        Location::new(
            span,
            self.offset_to_position(span.start, input),
            self.offset_to_position(span.end, input),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_map_positions() {
        let input = "# Title\n\nSome text[^1]\n\n[^1]: note";
        let line_map = LineMap::new(input);
        assert_eq!(line_map.line_starts, vec![0, 8, 9, 23, 24]);

        assert_eq!(line_map.offset_to_position(0, input), Position::new(1, 1));
        assert_eq!(line_map.offset_to_position(8, input), Position::new(2, 1));
        assert_eq!(line_map.offset_to_position(18, input), Position::new(3, 10));
        assert_eq!(line_map.offset_to_position(24, input), Position::new(5, 1));
    }

    #[test]
    fn test_line_map_multibyte_columns() {
        let input = "é{.x}";
        let line_map = LineMap::new(input);
        // 'é' is two bytes but a single column.
        assert_eq!(line_map.offset_to_position(2, input), Position::new(1, 2));
        // Offset 1 is inside 'é' and rounds back to its start.
        assert_eq!(line_map.offset_to_position(1, input), Position::new(1, 1));
    }

    #[test]
    fn test_line_map_beyond_input_is_clamped() {
        let input = "Hello";
        let line_map = LineMap::new(input);
        assert_eq!(line_map.offset_to_position(100, input), Position::new(1, 6));
    }

    #[test]
    fn test_line_map_location() {
        let input = "a\n{.x}";
        let location = LineMap::new(input).location(Span::new(2, 6), input);
        assert_eq!(location.start, Position::new(2, 1));
        assert_eq!(location.end, Position::new(2, 5));
    }
}
