//! Diagram source text: type keyword, board rows and configuration block.

pub mod config;
pub mod grid;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use config::{DiagramConfig, ListItem, ListValue, MoveRef, TurnMode};
pub use grid::{GridOptions, ParsedBoard, RowSplit};

use crate::Point;
use crate::error::{DiagramError, describe};
use crate::stone::Stone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Static,
    Problem,
    Freeplay,
    Replay,
}

impl DiagramKind {
    /// Board validation rules for this kind of diagram.
    ///
    /// Freeplay boards are strict: any token other than a stone or an empty
    /// point is a `MalformedBoard`, so freeplay sources cannot use marks and
    /// with them the `black`/`white` and shape lists.
    pub fn grid_options(self, config: &DiagramConfig) -> GridOptions {
        let (allow_empty, strict, unique_marks) = match self {
            DiagramKind::Static => (false, false, false),
            DiagramKind::Problem => (false, false, true),
            DiagramKind::Freeplay => (true, true, false),
            DiagramKind::Replay => (false, false, false),
        };
        GridOptions {
            size: config.size,
            prefixes: config.area_colors.keys().copied().collect(),
            strict,
            unique_marks,
            allow_empty,
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramKind::Static => write!(f, "static"),
            DiagramKind::Problem => write!(f, "problem"),
            DiagramKind::Freeplay => write!(f, "freeplay"),
            DiagramKind::Replay => write!(f, "replay"),
        }
    }
}

impl std::str::FromStr for DiagramKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(DiagramKind::Static),
            "problem" => Ok(DiagramKind::Problem),
            "freeplay" => Ok(DiagramKind::Freeplay),
            "replay" => Ok(DiagramKind::Replay),
            _ => Err(format!("unknown diagram type: {s}")),
        }
    }
}

/// Everything read from a diagram's source text.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub kind: DiagramKind,
    pub board: ParsedBoard,
    pub config: DiagramConfig,
}

/// Parse and validate a diagram source.
///
/// The `black`/`white` options are applied to the parsed board here, so
/// `board.board` is the diagram's starting position.
pub fn parse(text: &str) -> Result<ParsedSource, DiagramError> {
    let lines: Vec<&str> = text.lines().collect();
    let keyword_index = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .ok_or_else(|| DiagramError::ConfigError("the diagram source is empty".to_string()))?;
    let kind: DiagramKind = lines[keyword_index]
        .parse()
        .map_err(DiagramError::ConfigError)?;

    let split = grid::split_rows(&lines, keyword_index);
    let config = DiagramConfig::parse(&lines[split.config_start_index..])?;
    let mut board = ParsedBoard::parse(&split, &kind.grid_options(&config))?;
    place_listed_stones(&mut board, &config)?;

    Ok(ParsedSource {
        kind,
        board,
        config,
    })
}

fn place_listed_stones(parsed: &mut ParsedBoard, config: &DiagramConfig) -> Result<(), DiagramError> {
    let black: BTreeSet<&str> = config.black.iter().map(String::as_str).collect();
    if let Some(mark) = config.white.iter().find(|m| black.contains(m.as_str())) {
        return Err(DiagramError::MarkError(format!(
            "mark '{mark}' is listed as both black and white"
        )));
    }

    let mut placements: BTreeMap<Point, Stone> = BTreeMap::new();
    for (marks, stone) in [(&config.black, Stone::Black), (&config.white, Stone::White)] {
        for mark in marks {
            for &point in parsed.mark_points(mark)? {
                placements.insert(point, stone);
            }
        }
    }

    for (point, stone) in placements {
        parsed.board = parsed.board.play(point, stone).map_err(|e| {
            DiagramError::MalformedBoard(format!(
                "cannot place {stone} at {}: {e}",
                describe(point)
            ))
        })?;
    }
    Ok(())
}

/// Marks consumed by `black`/`white`, which no longer label anything.
pub fn stone_marks(config: &DiagramConfig) -> impl Iterator<Item = &str> {
    config.black.iter().chain(&config.white).map(String::as_str)
}
