use serde::{Deserialize, Serialize};

use crate::Point;
use crate::stone::Stone;

/// One action in a freeplay diagram's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HistoryEntry {
    Play { point: Point, stone: Stone },
    Pass { stone: Stone },
}

impl HistoryEntry {
    pub fn stone(&self) -> Stone {
        match *self {
            HistoryEntry::Play { stone, .. } | HistoryEntry::Pass { stone } => stone,
        }
    }

    pub fn point(&self) -> Option<Point> {
        match *self {
            HistoryEntry::Play { point, .. } => Some(point),
            HistoryEntry::Pass { .. } => None,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, HistoryEntry::Pass { .. })
    }
}
