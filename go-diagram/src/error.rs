use std::fmt;

use crate::Point;

/// Rule violations reported by [`crate::Board`] and [`crate::Position`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoError {
    Overwrite,
    Suicide,
    NotOnBoard,
    KoViolation,
}

impl fmt::Display for GoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoError::Overwrite => write!(f, "overwrite"),
            GoError::Suicide => write!(f, "suicide"),
            GoError::NotOnBoard => write!(f, "not on board"),
            GoError::KoViolation => write!(f, "ko violation"),
        }
    }
}

impl std::error::Error for GoError {}

/// Construction-time failures. Each carries the message shown in place of the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramError {
    MalformedBoard(String),
    SizeConflict(String),
    MarkError(String),
    SequenceError(String),
    ReplayError(String),
    ConfigError(String),
}

impl DiagramError {
    pub fn message(&self) -> &str {
        match self {
            DiagramError::MalformedBoard(msg)
            | DiagramError::SizeConflict(msg)
            | DiagramError::MarkError(msg)
            | DiagramError::SequenceError(msg)
            | DiagramError::ReplayError(msg)
            | DiagramError::ConfigError(msg) => msg,
        }
    }
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramError::MalformedBoard(msg) => write!(f, "Malformed board: {msg}"),
            DiagramError::SizeConflict(msg) => write!(f, "Board size conflict: {msg}"),
            DiagramError::MarkError(msg) => write!(f, "Mark error: {msg}"),
            DiagramError::SequenceError(msg) => write!(f, "Sequence error: {msg}"),
            DiagramError::ReplayError(msg) => write!(f, "Replay error: {msg}"),
            DiagramError::ConfigError(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for DiagramError {}

/// Human-readable, 1-based rendering of a point for error messages.
pub(crate) fn describe(point: Point) -> String {
    format!("column {}, row {}", point.0 + 1, point.1 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_kind() {
        let err = DiagramError::ReplayError("move 2 is missing".to_string());
        assert_eq!(err.to_string(), "Replay error: move 2 is missing");
        assert_eq!(err.message(), "move 2 is missing");
    }

    #[test]
    fn describes_points_one_based() {
        assert_eq!(describe((0, 2)), "column 1, row 3");
    }
}
