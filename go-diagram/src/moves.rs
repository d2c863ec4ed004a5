//! Numbered move lists for replay diagrams.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::Point;
use crate::error::{DiagramError, describe};
use crate::position::Position;
use crate::source::{MoveRef, ParsedBoard};
use crate::stone::Stone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMove {
    pub move_number: u32,
    pub point: Point,
    pub stone: Stone,
}

/// Whether a mark is a move number (an optionally signed integer).
pub fn move_number(mark: &str) -> Option<i64> {
    let digits = mark.strip_prefix(['-', '+']).unwrap_or(mark);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    mark.parse().ok()
}

/// Resolve numbered marks and the `moves` table into a gap-free move list.
///
/// Board numbers resolve to their own point. Table entries point at an
/// earlier move number (followed transitively) or at a mark.
pub fn build_moves(
    parsed: &ParsedBoard,
    references: &BTreeMap<i64, MoveRef>,
    start: Stone,
) -> Result<Vec<ParsedMove>, DiagramError> {
    let mut on_board: BTreeMap<i64, Point> = BTreeMap::new();
    for (mark, points) in &parsed.other_marks {
        let Some(number) = move_number(mark) else {
            continue;
        };
        if number <= 0 {
            return Err(DiagramError::ReplayError(format!(
                "move number {number} must be positive"
            )));
        }
        if points.len() > 1 || on_board.insert(number, points[0]).is_some() {
            return Err(DiagramError::ReplayError(format!(
                "move {number} appears more than once on the board"
            )));
        }
    }

    for &number in references.keys() {
        if number <= 0 {
            return Err(DiagramError::ReplayError(format!(
                "move number {number} must be positive"
            )));
        }
        if on_board.contains_key(&number) {
            return Err(DiagramError::ReplayError(format!(
                "move {number} is both on the board and in the moves table"
            )));
        }
    }

    let numbers: BTreeSet<i64> = on_board.keys().chain(references.keys()).copied().collect();
    let count = numbers.len() as i64;
    if count == 0 {
        return Err(DiagramError::ReplayError(
            "a replay needs at least one numbered move".to_string(),
        ));
    }
    if let Some(missing) = (1..=count).find(|n| !numbers.contains(n)) {
        return Err(DiagramError::ReplayError(format!(
            "moves must be numbered 1 to {count} without gaps; move {missing} is missing"
        )));
    }

    (1..=count)
        .map(|number| {
            let point = resolve(number, &on_board, references, parsed)?;
            Ok(ParsedMove {
                move_number: number as u32,
                point,
                stone: start.after(number as usize - 1),
            })
        })
        .collect()
}

/// Follow the reference chain for `number` down to a point.
fn resolve(
    number: i64,
    on_board: &BTreeMap<i64, Point>,
    references: &BTreeMap<i64, MoveRef>,
    parsed: &ParsedBoard,
) -> Result<Point, DiagramError> {
    let mut visited = BTreeSet::from([number]);
    let mut current = number;
    loop {
        if let Some(&point) = on_board.get(&current) {
            return Ok(point);
        }
        match references.get(&current) {
            Some(MoveRef::Mark(mark)) => return parsed.mark_point(mark),
            Some(&MoveRef::Number(target)) => {
                if target < 1 || target >= current {
                    return Err(DiagramError::ReplayError(format!(
                        "move {current} refers to move {target}, which is not earlier"
                    )));
                }
                if !visited.insert(target) {
                    return Err(DiagramError::ReplayError(format!(
                        "move {number} has a circular reference through move {target}"
                    )));
                }
                current = target;
            }
            None => {
                return Err(DiagramError::ReplayError(format!(
                    "move {current} has no position"
                )));
            }
        }
    }
}

/// Play the whole sequence from the starting position.
///
/// Returns every position along the way: `start` first, then one per move.
pub fn replay_moves(
    moves: &[ParsedMove],
    start: &Position,
    enforce_ko: bool,
) -> Result<Vec<Position>, DiagramError> {
    let mut positions = Vec::with_capacity(moves.len() + 1);
    positions.push(start.clone());
    for m in moves {
        let current = &positions[positions.len() - 1];
        let next = current.play(m.point, m.stone, enforce_ko).map_err(|e| {
            DiagramError::ReplayError(format!(
                "move {} ({}) at {} is illegal: {e}",
                m.move_number,
                m.stone,
                describe(m.point)
            ))
        })?;
        positions.push(next);
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::grid::{GridOptions, split_rows};

    fn board(rows: &str) -> ParsedBoard {
        let text = format!("replay\n{rows}");
        let lines: Vec<&str> = text.lines().collect();
        ParsedBoard::parse(&split_rows(&lines, 0), &GridOptions::default()).unwrap()
    }

    fn refs(entries: &[(i64, MoveRef)]) -> BTreeMap<i64, MoveRef> {
        entries.iter().cloned().collect()
    }

    #[test]
    fn recognizes_move_numbers() {
        assert_eq!(move_number("12"), Some(12));
        assert_eq!(move_number("-3"), Some(-3));
        assert_eq!(move_number("0"), Some(0));
        assert_eq!(move_number("a"), None);
        assert_eq!(move_number("1a"), None);
        assert_eq!(move_number("-"), None);
    }

    #[test]
    fn numbers_on_board_alternate_colors() {
        let parsed = board("1 2 .\n. 3 .\n. . .");
        let moves = build_moves(&parsed, &BTreeMap::new(), Stone::Black).unwrap();
        assert_eq!(
            moves,
            vec![
                ParsedMove {
                    move_number: 1,
                    point: (0, 0),
                    stone: Stone::Black
                },
                ParsedMove {
                    move_number: 2,
                    point: (1, 0),
                    stone: Stone::White
                },
                ParsedMove {
                    move_number: 3,
                    point: (1, 1),
                    stone: Stone::Black
                },
            ]
        );
    }

    #[test]
    fn start_color_sets_parity() {
        let parsed = board("1 2\n. .");
        let moves = build_moves(&parsed, &BTreeMap::new(), Stone::White).unwrap();
        assert_eq!(moves[0].stone, Stone::White);
        assert_eq!(moves[1].stone, Stone::Black);
    }

    #[test]
    fn gap_in_numbering_is_rejected() {
        let parsed = board("1 . 3\n. . .\n. . .");
        let err = build_moves(&parsed, &BTreeMap::new(), Stone::Black).unwrap_err();
        assert!(matches!(err, DiagramError::ReplayError(_)));
    }

    #[test]
    fn non_positive_and_duplicate_numbers_are_rejected() {
        let parsed = board("0 1\n. .");
        assert!(matches!(
            build_moves(&parsed, &BTreeMap::new(), Stone::Black),
            Err(DiagramError::ReplayError(_))
        ));

        let parsed = board("1 01\n. .");
        assert!(matches!(
            build_moves(&parsed, &BTreeMap::new(), Stone::Black),
            Err(DiagramError::ReplayError(_))
        ));

        let parsed = board("1 1\n. .");
        assert!(matches!(
            build_moves(&parsed, &BTreeMap::new(), Stone::Black),
            Err(DiagramError::ReplayError(_))
        ));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let parsed = board(". .\n. .");
        assert!(build_moves(&parsed, &BTreeMap::new(), Stone::Black).is_err());
    }

    #[test]
    fn references_follow_chains_and_marks() {
        let parsed = board("1 2 a\n. . .\n. . .");
        let table = refs(&[
            (3, MoveRef::Mark("a".to_string())),
            (4, MoveRef::Number(1)),
            (5, MoveRef::Number(4)),
        ]);
        let moves = build_moves(&parsed, &table, Stone::Black).unwrap();
        assert_eq!(moves.len(), 5);
        assert_eq!(moves[2].point, (2, 0));
        assert_eq!(moves[3].point, (0, 0));
        assert_eq!(moves[4].point, (0, 0));
    }

    #[test]
    fn forward_and_self_references_are_rejected() {
        let parsed = board("1 2\n. .");
        let forward = refs(&[(3, MoveRef::Number(4)), (4, MoveRef::Number(1))]);
        assert!(matches!(
            build_moves(&parsed, &forward, Stone::Black),
            Err(DiagramError::ReplayError(_))
        ));

        let own = refs(&[(3, MoveRef::Number(3))]);
        assert!(matches!(
            build_moves(&parsed, &own, Stone::Black),
            Err(DiagramError::ReplayError(_))
        ));
    }

    #[test]
    fn table_cannot_repeat_a_board_number() {
        let parsed = board("1 2\n. .");
        let table = refs(&[(2, MoveRef::Number(1))]);
        assert!(matches!(
            build_moves(&parsed, &table, Stone::Black),
            Err(DiagramError::ReplayError(_))
        ));
    }

    #[test]
    fn unknown_reference_mark_is_a_mark_error() {
        let parsed = board("1 .\n. .");
        let table = refs(&[(2, MoveRef::Mark("z".to_string()))]);
        assert!(matches!(
            build_moves(&parsed, &table, Stone::Black),
            Err(DiagramError::MarkError(_))
        ));
    }

    #[test]
    fn validation_replays_captures() {
        // Move 4 repeats the still-occupied point of move 1.
        let parsed = board(". 1 . .\n2 3 . .\n. . . .\n. . . .");
        let moves = build_moves(&parsed, &BTreeMap::new(), Stone::Black).unwrap();
        let start = Position::new(parsed.board.clone());
        let positions = replay_moves(&moves, &start, true).unwrap();
        assert_eq!(positions.len(), 4);
        assert_eq!(positions[3].board.stone_at((1, 1)), Some(Stone::Black));

        let table = refs(&[(4, MoveRef::Number(1))]);
        let parsed = board(". 1 . .\n2 3 . .\n. . . .\n. . . .");
        let moves = build_moves(&parsed, &table, Stone::Black).unwrap();
        let err = replay_moves(&moves, &start, true).unwrap_err();
        assert!(matches!(err, DiagramError::ReplayError(_)));
    }
}
