use std::fmt;

use crate::{Location, NodeId, Position};

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The tree contradicts an invariant the grammar guarantees. Processing of
    /// the document must stop: output built from it cannot be trusted.
    #[error("invariant violation: {1}, position: {0}")]
    InvariantViolation(Box<Detail>, String),

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("invalid options: {0}")]
    Deserialize(String),
}

impl Error {
    #[must_use]
    pub fn invariant_violation(location: Location, message: impl Into<String>) -> Self {
        Self::InvariantViolation(Box::new(Detail { location }), message.into())
    }

    /// Extract location information from this error if available.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::InvariantViolation(detail, ..) => Some(&detail.location),
            Self::UnknownNode(_) | Self::Deserialize(_) => None,
        }
    }

    /// Get advice for this error if available.
    #[must_use]
    pub fn advice(&self) -> Option<&'static str> {
        match self {
            Self::InvariantViolation(..) => Some(
                "Implicit attributes must be a class (`.name`) or an id (`#name`); this indicates a bug in tag construction",
            ),
            Self::UnknownNode(_) => {
                Some("Node ids are only valid for the document that allocated them")
            }
            Self::Deserialize(_) => None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Detail {
    pub location: Location,
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Location {
            start:
                Position {
                    line: start_line,
                    column: start_column,
                },
            end:
                Position {
                    line: end_line,
                    column: end_column,
                },
            ..
        } = self.location;

        write!(
            f,
            "start(line: {start_line}, column: {start_column}), end(line: {end_line}, column: {end_column})",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;

    #[test]
    fn test_error_detail_display() {
        let detail = Detail {
            location: Location::new(Span::new(2, 20), Position::new(1, 2), Position::new(3, 4)),
        };
        assert_eq!(
            format!("{detail}"),
            "start(line: 1, column: 2), end(line: 3, column: 4)"
        );
    }

    #[test]
    fn test_invariant_violation_display() {
        let error = Error::invariant_violation(
            Location::new(Span::new(5, 9), Position::new(1, 6), Position::new(1, 10)),
            "implicit attribute `%` is neither class nor id",
        );
        assert_eq!(
            format!("{error}"),
            "invariant violation: implicit attribute `%` is neither class nor id, position: start(line: 1, column: 6), end(line: 1, column: 10)"
        );
        assert_eq!(error.location().map(Location::span), Some(Span::new(5, 9)));
        assert!(error.advice().is_some());
    }
}
