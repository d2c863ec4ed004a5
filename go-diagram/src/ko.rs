use serde::{Deserialize, Serialize};

use crate::Point;
use crate::board::Board;
use crate::stone::Stone;

/// Ko status. The locked point and the stone color that cannot play there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ko {
    pub point: Point,
    pub illegal: Stone,
}

impl Ko {
    pub fn forbids(&self, point: Point, stone: Stone) -> bool {
        self.point == point && self.illegal == stone
    }
}

/// Derive the ko created by `stone` playing at `point`, turning `before` into `after`.
///
/// A ko exists when exactly one stone was captured and the played stone is
/// alone with the vacated point as its only liberty.
pub fn derive(before: &Board, after: &Board, point: Point, stone: Stone) -> Option<Ko> {
    let mut captured = before
        .points_of(stone.opp())
        .filter(|&p| after.stone_at(p).is_none());
    let vacated = captured.next()?;
    if captured.next().is_some() {
        return None;
    }

    let lone = after
        .neighbors(point)
        .iter()
        .all(|&n| after.stone_at(n) != Some(stone));
    let liberties = after.liberties(point);

    (lone && liberties == [vacated]).then_some(Ko {
        point: vacated,
        illegal: stone.opp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::board_from_layout;

    #[test]
    fn single_stone_recapture_creates_ko() {
        let before = board_from_layout(&["+BW+", "BW+W", "+BW+", "++++"]);
        let after = before.play((2, 1), Stone::Black).unwrap();
        let ko = derive(&before, &after, (2, 1), Stone::Black);
        assert_eq!(
            ko,
            Some(Ko {
                point: (1, 1),
                illegal: Stone::White
            })
        );
        assert!(ko.unwrap().forbids((1, 1), Stone::White));
        assert!(!ko.unwrap().forbids((1, 1), Stone::Black));
    }

    #[test]
    fn no_ko_without_capture() {
        let before = Board::new(4);
        let after = before.play((0, 0), Stone::Black).unwrap();
        assert_eq!(derive(&before, &after, (0, 0), Stone::Black), None);
    }

    #[test]
    fn no_ko_when_two_stones_captured() {
        let before = board_from_layout(&["+WWB", "BBB+", "++++", "++++"]);
        let after = before.play((0, 0), Stone::Black).unwrap();
        assert_eq!(derive(&before, &after, (0, 0), Stone::Black), None);
    }

    #[test]
    fn no_ko_when_capturing_stone_has_other_liberties() {
        let before = board_from_layout(&["WB++", "++++", "++++", "++++"]);
        let after = before.play((0, 1), Stone::Black).unwrap();
        assert_eq!(after.stone_at((0, 0)), None);
        assert_eq!(derive(&before, &after, (0, 1), Stone::Black), None);
    }
}
