use arrayvec::ArrayVec;
use serde::Serialize;

use crate::Point;
use crate::error::GoError;
use crate::stone::Stone;

pub const MIN_SIZE: u8 = 2;
pub const MAX_SIZE: u8 = 19;

/// An immutable square Go board stored as a flat array.
///
/// Every mutation returns a new `Board`; captures and ko are tracked by
/// [`crate::Position`], not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    stones: Vec<i8>,
    size: u8,
}

impl Board {
    /// Create an empty `size`×`size` board.
    pub fn new(size: u8) -> Self {
        Board {
            stones: vec![0i8; size as usize * size as usize],
            size,
        }
    }

    /// Rule-checked construction: places each stone in order as a move,
    /// rejecting occupied points and suicide.
    pub fn with_placements(size: u8, placements: &[(Point, Stone)]) -> Result<Self, GoError> {
        placements
            .iter()
            .try_fold(Board::new(size), |board, &(point, stone)| board.play(point, stone))
    }

    // -- Accessors --

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn stones(&self) -> &[i8] {
        &self.stones
    }

    pub fn stone_at(&self, point: Point) -> Option<Stone> {
        if self.on_board(point) {
            Stone::from_int(self.stones[self.idx(point)])
        } else {
            None
        }
    }

    pub fn on_board(&self, (col, row): Point) -> bool {
        col < self.size && row < self.size
    }

    pub fn is_empty(&self) -> bool {
        self.stones.iter().all(|&s| s == 0)
    }

    /// All points holding a stone of the given color, in row-major order.
    pub fn points_of(&self, stone: Stone) -> impl Iterator<Item = Point> + '_ {
        let size = self.size;
        self.stones
            .iter()
            .enumerate()
            .filter(move |&(_, &v)| Stone::from_int(v) == Some(stone))
            .map(move |(i, _)| ((i % size as usize) as u8, (i / size as usize) as u8))
    }

    // -- Construction without rules --

    /// Force-place (or clear, with `None`) a point, ignoring captures and suicide.
    /// Used for illustrative positions parsed from diagram text.
    pub fn place_unchecked(&self, point: Point, stone: Option<Stone>) -> Result<Board, GoError> {
        if !self.on_board(point) {
            return Err(GoError::NotOnBoard);
        }
        let mut board = self.clone();
        let i = board.idx(point);
        board.stones[i] = stone.map_or(0, Stone::to_int);
        Ok(board)
    }

    // -- Rules --

    /// Play a stone, removing captured chains. Returns a new board or the rule broken.
    pub fn play(&self, point: Point, stone: Stone) -> Result<Board, GoError> {
        if !self.on_board(point) {
            return Err(GoError::NotOnBoard);
        }
        if self.stone_at(point).is_some() {
            return Err(GoError::Overwrite);
        }

        let mut board = self.clone();
        let i = board.idx(point);
        board.stones[i] = stone.to_int();

        for chain in board.opponent_neighbor_chains(point) {
            if board.chain_liberties(&chain).is_empty() {
                for p in chain {
                    let pi = board.idx(p);
                    board.stones[pi] = 0;
                }
            }
        }

        if board.liberties(point).is_empty() {
            return Err(GoError::Suicide);
        }

        Ok(board)
    }

    pub fn is_legal(&self, point: Point, stone: Stone) -> bool {
        self.play(point, stone).is_ok()
    }

    // -- Graph algorithms --

    /// Get the 4-connected neighbors that are on the board.
    pub fn neighbors(&self, (col, row): Point) -> ArrayVec<Point, 4> {
        let mut result = ArrayVec::new();
        if col > 0 {
            result.push((col - 1, row));
        }
        if col + 1 < self.size {
            result.push((col + 1, row));
        }
        if row > 0 {
            result.push((col, row - 1));
        }
        if row + 1 < self.size {
            result.push((col, row + 1));
        }
        result
    }

    /// Flood-fill connected group of same-colored stones.
    pub fn chain(&self, point: Point) -> Vec<Point> {
        let mut visited = vec![false; self.stones.len()];
        self.chain_from(point, &mut visited)
    }

    /// Get the liberties of a single stone's connected group.
    pub fn liberties(&self, point: Point) -> Vec<Point> {
        let chain = self.chain(point);
        self.chain_liberties(&chain)
    }

    /// Get the liberties of a chain (pre-computed group of points).
    pub fn chain_liberties(&self, chain: &[Point]) -> Vec<Point> {
        let mut seen = vec![false; self.stones.len()];
        let mut libs = Vec::new();
        for &p in chain {
            for n in self.neighbors(p) {
                let ni = self.idx(n);
                if !seen[ni] && self.stone_at(n).is_none() {
                    seen[ni] = true;
                    libs.push(n);
                }
            }
        }
        libs
    }

    fn opponent_neighbor_chains(&self, point: Point) -> Vec<Vec<Point>> {
        let Some(stone) = self.stone_at(point) else {
            return Vec::new();
        };
        let opponent = stone.opp();

        let mut chains = Vec::new();
        let mut visited = vec![false; self.stones.len()];
        for n in self.neighbors(point) {
            if self.stone_at(n) != Some(opponent) || visited[self.idx(n)] {
                continue;
            }
            chains.push(self.chain_from(n, &mut visited));
        }
        chains
    }

    /// Chain flood-fill using a shared visited bitset.
    fn chain_from(&self, point: Point, visited: &mut [bool]) -> Vec<Point> {
        let Some(stone) = self.stone_at(point) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut stack = vec![point];
        while let Some(p) = stack.pop() {
            let vi = self.idx(p);
            if visited[vi] {
                continue;
            }
            visited[vi] = true;
            result.push(p);
            for n in self.neighbors(p) {
                if self.stone_at(n) == Some(stone) && !visited[self.idx(n)] {
                    stack.push(n);
                }
            }
        }
        result
    }

    #[inline]
    fn idx(&self, (col, row): Point) -> usize {
        row as usize * self.size as usize + col as usize
    }
}
