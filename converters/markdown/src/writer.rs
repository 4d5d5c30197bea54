//! Line-aware output buffer for formatted Markdown.

use std::{io, ops::Range};

/// Accumulates Markdown, writing the active line prefixes before the first
/// character of every non-blank line.
///
/// Text appended through [`MarkdownWriter::append_non_translating`] is
/// recorded so a translation export can tell translators which byte ranges
/// to leave alone.
#[derive(Debug, Default)]
pub struct MarkdownWriter {
    output: String,
    prefixes: Vec<String>,
    non_translating: Vec<Range<usize>>,
}

impl MarkdownWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_prefix(&mut self, prefix: impl Into<String>) {
        self.prefixes.push(prefix.into());
    }

    pub fn pop_prefix(&mut self) {
        self.prefixes.pop();
    }

    fn at_line_start(&self) -> bool {
        self.output.is_empty() || self.output.ends_with('\n')
    }

    fn write_prefixes(&mut self) {
        for prefix in &self.prefixes {
            self.output.push_str(prefix);
        }
    }

    pub fn append(&mut self, text: &str) {
        for piece in text.split_inclusive('\n') {
            if self.at_line_start() && piece != "\n" {
                self.write_prefixes();
            }
            self.output.push_str(piece);
        }
    }

    /// Append `text` and mark it as off limits for translators.
    pub fn append_non_translating(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start() && !text.starts_with('\n') {
            self.write_prefixes();
        }
        let start = self.output.len();
        self.output.push_str(text);
        self.non_translating.push(start..self.output.len());
    }

    /// Drop spaces and tabs at the end of the open line. Text marked as
    /// non-translating is never trimmed.
    pub fn trim_line_end(&mut self) {
        let floor = self.non_translating.last().map_or(0, |range| range.end);
        let kept = self.output.trim_end_matches([' ', '\t']).len().max(floor);
        self.output.truncate(kept);
    }

    /// End the current line, if one is open.
    pub fn line(&mut self) {
        if !self.at_line_start() {
            self.output.push('\n');
        }
    }

    /// Make sure the output ends with an empty line, unless nothing was
    /// written yet.
    pub fn blank_line(&mut self) {
        self.line();
        if !self.output.is_empty() && !self.output.ends_with("\n\n") {
            self.output.push('\n');
        }
    }

    /// The output ending in exactly one newline (empty when nothing was
    /// written), and the non-translating ranges.
    #[must_use]
    pub fn finish(self) -> (String, Vec<Range<usize>>) {
        let Self {
            mut output,
            non_translating,
            ..
        } = self;
        output.truncate(output.trim_end_matches('\n').len());
        if !output.is_empty() {
            output.push('\n');
        }
        let len = output.len();
        let non_translating = non_translating
            .into_iter()
            .filter(|range| range.start < len)
            .map(|range| range.start..range.end.min(len))
            .collect();
        (output, non_translating)
    }
}

impl io::Write for MarkdownWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text =
            std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.append(text);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_prefix_skips_blank_lines() {
        let mut writer = MarkdownWriter::new();
        writer.append("[^1]: ");
        writer.push_prefix("    ");
        writer.append("first\nsecond\n\nthird");
        writer.pop_prefix();
        writer.blank_line();
        writer.append("after");
        let (output, _) = writer.finish();
        assert_eq!(output, "[^1]: first\n    second\n\n    third\n\nafter\n");
    }

    #[test]
    fn test_blank_line_collapses() {
        let mut writer = MarkdownWriter::new();
        writer.blank_line();
        writer.append("a");
        writer.blank_line();
        writer.blank_line();
        writer.append("b\n\n\n");
        let (output, _) = writer.finish();
        assert_eq!(output, "a\n\nb\n");
    }

    #[test]
    fn test_non_translating_ranges() -> Result<(), io::Error> {
        let mut writer = MarkdownWriter::new();
        writer.push_prefix("  ");
        write!(writer, "id ")?;
        writer.append_non_translating("#_1_");
        writer.append("\n");
        writer.append_non_translating("x");
        let (output, ranges) = writer.finish();
        assert_eq!(output, "  id #_1_\n  x\n");
        let marked: Vec<&str> = ranges
            .iter()
            .filter_map(|range| output.get(range.clone()))
            .collect();
        assert_eq!(marked, vec!["#_1_", "x"]);
        Ok(())
    }
}
