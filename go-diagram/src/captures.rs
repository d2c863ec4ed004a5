use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::stone::Stone;

/// Stones removed from the board, by the color of the removed stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Captures {
    pub black: u32,
    pub white: u32,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stone: Stone) -> u32 {
        match stone {
            Stone::Black => self.black,
            Stone::White => self.white,
        }
    }

    pub fn total(&self) -> u32 {
        self.black + self.white
    }
}

impl AddAssign for Captures {
    fn add_assign(&mut self, rhs: Self) {
        self.black += rhs.black;
        self.white += rhs.white;
    }
}

/// Count the points that held a stone in `before` and are empty in `after`.
pub fn count_captures(before: &Board, after: &Board) -> Captures {
    before
        .stones()
        .iter()
        .zip(after.stones())
        .fold(Captures::new(), |mut acc, (&was, &now)| {
            if now == 0 {
                match Stone::from_int(was) {
                    Some(Stone::Black) => acc.black += 1,
                    Some(Stone::White) => acc.white += 1,
                    None => {}
                }
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::board_from_layout;

    #[test]
    fn no_captures_for_plain_move() {
        let before = Board::new(4);
        let after = before.play((1, 1), Stone::Black).unwrap();
        assert_eq!(count_captures(&before, &after), Captures::new());
    }

    #[test]
    fn counts_removed_stones_by_color() {
        let before = board_from_layout(&["+BB+", "BWWB", "W+WB", "WWB+"]);
        let after = before.play((1, 2), Stone::Black).unwrap();
        let captures = count_captures(&before, &after);
        assert_eq!(captures.white, 6);
        assert_eq!(captures.black, 0);
        assert_eq!(captures.get(Stone::White), 6);
    }

    #[test]
    fn accumulates() {
        let mut total = Captures { black: 1, white: 0 };
        total += Captures { black: 2, white: 3 };
        assert_eq!(total, Captures { black: 3, white: 3 });
        assert_eq!(total.total(), 6);
    }
}
