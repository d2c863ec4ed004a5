use std::collections::BTreeSet;

use super::{Controls, Layout, RenderState};
use crate::error::DiagramError;
use crate::moves::{self, ParsedMove};
use crate::position::Position;
use crate::source::{DiagramKind, MoveRef, ParsedSource};
use crate::stone::Stone;

/// A fixed game record stepped through with navigation buttons.
#[derive(Debug, Clone)]
pub struct ReplayDiagram {
    layout: Layout,
    moves: Vec<ParsedMove>,
    /// `positions[n]` is the board after the first `n` moves.
    positions: Vec<Position>,
    start: Stone,
    /// Number of moves currently shown.
    cursor: usize,
}

impl ReplayDiagram {
    pub fn new(source: &ParsedSource) -> Result<Self, DiagramError> {
        let config = &source.config;
        let start = config.to_play.unwrap_or(Stone::Black);
        let moves = moves::build_moves(&source.board, &config.moves, start)?;
        let initial = Position::new(source.board.board.clone());
        let positions = moves::replay_moves(&moves, &initial, config.ko)?;

        let initial_move = config.initial_move.unwrap_or(0);
        let cursor = usize::try_from(initial_move)
            .ok()
            .filter(|&n| n <= moves.len())
            .ok_or_else(|| {
                DiagramError::ReplayError(format!(
                    "initial-move {initial_move} is outside 0 to {}",
                    moves.len()
                ))
            })?;

        let referenced = config.moves.values().filter_map(|r| match r {
            MoveRef::Mark(mark) => Some(mark.as_str()),
            MoveRef::Number(_) => None,
        });
        let hidden: BTreeSet<&str> = source
            .board
            .other_marks
            .keys()
            .map(String::as_str)
            .filter(|mark| moves::move_number(mark).is_some())
            .chain(referenced)
            .collect();

        Ok(ReplayDiagram {
            layout: Layout::new(source, &hidden)?,
            moves,
            positions,
            start,
            cursor,
        })
    }

    pub fn moves(&self) -> &[ParsedMove] {
        &self.moves
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn position(&self) -> &Position {
        &self.positions[self.cursor]
    }

    /// Show the board after `n` moves.
    pub fn go_to_move(&mut self, n: usize) -> bool {
        if n > self.moves.len() || n == self.cursor {
            return false;
        }
        self.cursor = n;
        true
    }

    pub fn first(&mut self) -> bool {
        self.go_to_move(0)
    }

    pub fn previous(&mut self) -> bool {
        self.cursor > 0 && self.go_to_move(self.cursor - 1)
    }

    pub fn next(&mut self) -> bool {
        self.go_to_move(self.cursor + 1)
    }

    pub fn last(&mut self) -> bool {
        self.go_to_move(self.moves.len())
    }

    pub fn render_state(&self) -> RenderState {
        let position = self.position();
        let at_start = self.cursor == 0;
        let at_end = self.cursor == self.moves.len();
        RenderState {
            last_move: self.cursor.checked_sub(1).map(|i| self.moves[i].point),
            captures: position.captures,
            move_number: self.cursor,
            controls: Controls {
                first: !at_start,
                previous: !at_start,
                next: !at_end,
                last: !at_end,
                ..Controls::default()
            },
            turn: (!at_end).then(|| self.start.after(self.cursor)),
            ko: position.ko.map(|k| k.point),
            ..self.layout.render(DiagramKind::Replay, &position.board)
        }
    }
}
