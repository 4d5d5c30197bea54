//! Output format backend types.
//!
//! Defines the available converter backends (HTML, Markdown).

use std::str::FromStr;

/// Output format backend type.
///
/// Used by converters to identify themselves and by the CLI for backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// HTML output format.
    #[default]
    Html,
    /// Reformatted Markdown output.
    Markdown,
}

impl Backend {
    /// File extension used for output written next to the input.
    #[must_use]
    pub fn output_extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "formatted.md",
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(format!("invalid backend: '{s}', expected: html, markdown")),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() -> Result<(), String> {
        assert_eq!(Backend::from_str("html")?, Backend::Html);
        assert_eq!(Backend::from_str("HTML")?, Backend::Html);
        assert_eq!(Backend::from_str("markdown")?, Backend::Markdown);
        assert_eq!(Backend::from_str("md")?, Backend::Markdown);
        assert!(Backend::from_str("manpage").is_err());
        Ok(())
    }

    #[test]
    fn test_display() {
        assert_eq!(Backend::Html.to_string(), "html");
        assert_eq!(Backend::Markdown.to_string(), "markdown");
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(Backend::Html.output_extension(), "html");
        assert_eq!(Backend::Markdown.output_extension(), "formatted.md");
    }
}
