use crate::Point;
use crate::board::Board;
use crate::captures::{Captures, count_captures};
use crate::error::GoError;
use crate::ko::{self, Ko};
use crate::stone::Stone;

/// A board together with the counters every interactive diagram derives from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub captures: Captures,
    pub ko: Option<Ko>,
}

impl Position {
    pub fn new(board: Board) -> Self {
        Position {
            board,
            captures: Captures::new(),
            ko: None,
        }
    }

    /// Apply one move: ko check, pure board update, capture diff and ko derivation.
    pub fn play(&self, point: Point, stone: Stone, enforce_ko: bool) -> Result<Position, GoError> {
        if enforce_ko && self.ko.is_some_and(|k| k.forbids(point, stone)) {
            return Err(GoError::KoViolation);
        }

        let board = self.board.play(point, stone)?;
        let mut captures = self.captures;
        captures += count_captures(&self.board, &board);
        let ko = ko::derive(&self.board, &board, point, stone);

        Ok(Position {
            board,
            captures,
            ko,
        })
    }

    /// A pass leaves the board alone and clears ko.
    pub fn pass(&self) -> Position {
        Position {
            ko: None,
            ..self.clone()
        }
    }
}
