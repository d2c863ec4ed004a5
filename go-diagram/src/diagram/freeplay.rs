use std::collections::BTreeSet;

use super::{Controls, Layout, RenderState};
use crate::Point;
use crate::error::DiagramError;
use crate::history::HistoryEntry;
use crate::position::Position;
use crate::source::{DiagramKind, ParsedSource, TurnMode};
use crate::stone::Stone;

/// An open board with undo/redo.
#[derive(Debug, Clone)]
pub struct FreeplayDiagram {
    layout: Layout,
    turn_mode: TurnMode,
    /// Color of the first action only.
    first_turn: Option<Stone>,
    enforce_ko: bool,
    history: Vec<HistoryEntry>,
    /// `positions[i]` is the position after `i` actions; always one longer than `history`.
    positions: Vec<Position>,
    cursor: usize,
}

impl FreeplayDiagram {
    pub fn new(source: &ParsedSource) -> Result<Self, DiagramError> {
        let config = &source.config;
        Ok(FreeplayDiagram {
            layout: Layout::new(source, &BTreeSet::new())?,
            turn_mode: config.turn,
            first_turn: config.to_play,
            enforce_ko: config.ko,
            history: Vec::new(),
            positions: vec![Position::new(source.board.board.clone())],
            cursor: 0,
        })
    }

    /// Color of the action at history index `index`.
    fn color_at(&self, index: usize) -> Stone {
        match self.turn_mode {
            TurnMode::Alternate => self.first_turn.unwrap_or(Stone::Black).after(index),
            TurnMode::Black | TurnMode::White => {
                let fixed = if self.turn_mode == TurnMode::Black {
                    Stone::Black
                } else {
                    Stone::White
                };
                match self.first_turn {
                    Some(first) if index == 0 => first,
                    _ => fixed,
                }
            }
        }
    }

    pub fn turn(&self) -> Stone {
        self.color_at(self.cursor)
    }

    pub fn position(&self) -> &Position {
        &self.positions[self.cursor]
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history[..self.cursor]
    }

    pub fn click(&mut self, point: Point) -> bool {
        if !self.layout.contains(point) {
            return false;
        }
        let stone = self.turn();
        match self.position().play(point, stone, self.enforce_ko) {
            Ok(next) => {
                self.push(HistoryEntry::Play { point, stone }, next);
                true
            }
            Err(e) => {
                tracing::trace!("{stone} at {point:?} rejected: {e}");
                false
            }
        }
    }

    pub fn pass(&mut self) -> bool {
        let stone = self.turn();
        let next = self.position().pass();
        self.push(HistoryEntry::Pass { stone }, next);
        true
    }

    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.cursor == self.history.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn reset(&mut self) -> bool {
        if self.history.is_empty() {
            return false;
        }
        self.history.clear();
        self.positions.truncate(1);
        self.cursor = 0;
        true
    }

    pub fn render_state(&self) -> RenderState {
        let position = self.position();
        RenderState {
            last_move: self.history().last().and_then(HistoryEntry::point),
            captures: position.captures,
            move_number: self.cursor,
            controls: Controls {
                undo: self.cursor > 0,
                redo: self.cursor < self.history.len(),
                pass: true,
                reset: !self.history.is_empty(),
                ..Controls::default()
            },
            turn: Some(self.turn()),
            ko: position.ko.map(|k| k.point),
            ..self.layout.render(DiagramKind::Freeplay, &position.board)
        }
    }

    /// Record an action at the cursor, dropping any redo history.
    fn push(&mut self, entry: HistoryEntry, next: Position) {
        self.history.truncate(self.cursor);
        self.positions.truncate(self.cursor + 1);
        self.history.push(entry);
        self.positions.push(next);
        self.cursor += 1;
    }
}
