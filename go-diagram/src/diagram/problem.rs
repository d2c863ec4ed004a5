use std::collections::BTreeSet;
use std::fmt;

use super::{Controls, Layout, RenderState};
use crate::Point;
use crate::error::DiagramError;
use crate::position::Position;
use crate::reply::{PendingReply, ReplySource, ReplyToken};
use crate::sequence::{NodeId, SequenceResult, SequenceTree, WILDCARD};
use crate::source::{DiagramKind, ParsedSource};
use crate::stone::Stone;

/// A problem: the user plays `player`'s moves, the diagram answers from the
/// solution tree after a delay.
pub struct ProblemDiagram {
    layout: Layout,
    tree: SequenceTree,
    initial: Position,
    position: Position,
    player: Stone,
    enforce_ko: bool,
    /// Node of the last move played; `None` once play left the tree.
    cursor: Option<NodeId>,
    result: SequenceResult,
    last_move: Option<Point>,
    move_count: usize,
    generation: u64,
    pending: Option<ReplyToken>,
    replies: Box<dyn ReplySource>,
}

impl ProblemDiagram {
    pub fn new(source: &ParsedSource, replies: Box<dyn ReplySource>) -> Result<Self, DiagramError> {
        let config = &source.config;
        let player = config.to_play.unwrap_or(Stone::Black);
        let initial = Position::new(source.board.board.clone());

        let paths = config
            .solutions
            .iter()
            .map(|p| (p.as_str(), true))
            .chain(config.sequences.iter().map(|p| (p.as_str(), false)));
        let tree = SequenceTree::build(paths, &source.board, &initial, player, config.ko)?;

        let hidden: BTreeSet<&str> = config
            .solutions
            .iter()
            .chain(&config.sequences)
            .flat_map(|p| p.split('>').map(str::trim))
            .filter(|mark| *mark != WILDCARD)
            .collect();
        let layout = Layout::new(source, &hidden)?;

        Ok(ProblemDiagram {
            layout,
            cursor: Some(tree.root()),
            tree,
            position: initial.clone(),
            initial,
            player,
            enforce_ko: config.ko,
            result: SequenceResult::Incomplete,
            last_move: None,
            move_count: 0,
            generation: 0,
            pending: None,
            replies,
        })
    }

    pub fn result(&self) -> SequenceResult {
        self.result
    }

    pub fn player(&self) -> Stone {
        self.player
    }

    /// Color of the next move.
    pub fn turn(&self) -> Stone {
        self.player.after(self.move_count)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// A user move. Ignored while a reply is pending or when illegal.
    pub fn click(&mut self, point: Point) -> bool {
        if self.pending.is_some() || !self.layout.contains(point) {
            return false;
        }
        let stone = self.turn();
        let next = match self.position.play(point, stone, self.enforce_ko) {
            Ok(next) => next,
            Err(e) => {
                tracing::trace!("{stone} at {point:?} rejected: {e}");
                return false;
            }
        };
        self.advance(point, next);

        let matched = self.cursor.and_then(|id| self.tree.follow(id, point));
        self.adopt(matched);
        if stone == self.player
            && let Some(id) = self.cursor
            && !self.tree.node(id).children.is_empty()
        {
            self.pending = Some(ReplyToken {
                generation: self.generation,
            });
        }
        true
    }

    pub fn pending_reply(&self) -> Option<PendingReply> {
        self.pending.map(PendingReply::new)
    }

    /// Play the opponent's answer for `token`. Tokens from before a reset, or
    /// already fired, change nothing.
    pub fn fire_reply(&mut self, token: ReplyToken) -> bool {
        if self.pending != Some(token) {
            tracing::warn!(
                "stale reply for generation {} ignored (current {})",
                token.generation,
                self.generation
            );
            return false;
        }
        self.pending = None;
        let Some(id) = self.cursor else {
            return false;
        };

        let stone = self.turn();
        let candidates: Vec<(Point, NodeId, Position)> = self
            .tree
            .node(id)
            .children
            .iter()
            .filter_map(|(&point, &child)| {
                let next = self.position.play(point, stone, self.enforce_ko).ok()?;
                Some((point, child, next))
            })
            .collect();
        if candidates.is_empty() {
            tracing::trace!("no legal reply from node {id}");
            return false;
        }

        let pick = self.replies.pick(candidates.len()).min(candidates.len() - 1);
        let Some((point, child, next)) = candidates.into_iter().nth(pick) else {
            return false;
        };
        self.advance(point, next);
        self.adopt(Some(child));
        true
    }

    /// Back to the starting position. Any scheduled reply goes stale.
    pub fn reset(&mut self) -> bool {
        let changed = self.move_count > 0 || self.pending.is_some();
        self.generation += 1;
        self.pending = None;
        self.position = self.initial.clone();
        self.cursor = Some(self.tree.root());
        self.result = SequenceResult::Incomplete;
        self.last_move = None;
        self.move_count = 0;
        changed
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            last_move: self.last_move,
            captures: self.position.captures,
            move_number: self.move_count,
            controls: Controls {
                reset: self.move_count > 0,
                ..Controls::default()
            },
            result: Some(self.result),
            turn: Some(self.turn()),
            ko: self.position.ko.map(|k| k.point),
            ..self.layout.render(DiagramKind::Problem, &self.position.board)
        }
    }

    fn advance(&mut self, point: Point, next: Position) {
        self.position = next;
        self.last_move = Some(point);
        self.move_count += 1;
    }

    fn adopt(&mut self, matched: Option<NodeId>) {
        self.cursor = matched;
        let result = match matched {
            Some(id) => self.tree.node(id).result,
            None => SequenceResult::Failure,
        };
        if self.result != SequenceResult::Success {
            self.result = result;
        }
    }
}

impl fmt::Debug for ProblemDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemDiagram")
            .field("player", &self.player)
            .field("cursor", &self.cursor)
            .field("result", &self.result)
            .field("move_count", &self.move_count)
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source;

    fn problem(text: &str, replies: impl FnMut(usize) -> usize + 'static) -> ProblemDiagram {
        ProblemDiagram::new(&source::parse(text).unwrap(), Box::new(replies)).unwrap()
    }

    fn fire(d: &mut ProblemDiagram) -> bool {
        let pending = d.pending_reply().unwrap();
        d.fire_reply(pending.token)
    }

    const TWO_REPLIES: &str = "problem\na b c\nd e .\n. . .\n\nsolutions: a>b>d\nsequences: a>c>e";

    #[test]
    fn solving_reaches_success() {
        let mut d = problem("problem\na b .\n\nsize: 3\nto-play: black\nsolutions: a>b", |_| 0);
        assert!(d.click((0, 0)));
        assert_eq!(d.result(), SequenceResult::Incomplete);
        assert!(fire(&mut d));
        assert_eq!(d.position().board.stone_at((1, 0)), Some(Stone::White));
        assert_eq!(d.result(), SequenceResult::Success);
        assert!(d.pending_reply().is_none());
    }

    #[test]
    fn off_tree_move_fails_and_stays_playable() {
        let mut d = problem(TWO_REPLIES, |_| 0);
        assert!(d.click((2, 2)));
        assert_eq!(d.result(), SequenceResult::Failure);
        assert!(d.pending_reply().is_none());
        // Exploration continues with alternating colors.
        assert!(d.click((1, 2)));
        assert_eq!(d.position().board.stone_at((1, 2)), Some(Stone::White));
    }

    #[test]
    fn reply_source_chooses_among_continuations() {
        let mut d = problem(TWO_REPLIES, |count| count - 1);
        d.click((0, 0));
        fire(&mut d);
        assert_eq!(d.position().board.stone_at((2, 0)), Some(Stone::White));
        d.click((1, 1));
        assert_eq!(d.result(), SequenceResult::Failure);
    }

    #[test]
    fn success_is_sticky() {
        let mut d = problem(TWO_REPLIES, |_| 0);
        d.click((0, 0));
        fire(&mut d);
        d.click((0, 1));
        assert_eq!(d.result(), SequenceResult::Success);
        d.click((2, 2));
        assert_eq!(d.result(), SequenceResult::Success);
    }

    #[test]
    fn clicks_wait_for_the_reply() {
        let mut d = problem(TWO_REPLIES, |_| 0);
        d.click((0, 0));
        assert!(!d.click((2, 2)));
        assert_eq!(d.position().board.stone_at((2, 2)), None);
    }

    #[test]
    fn reset_invalidates_pending_reply() {
        let mut d = problem(TWO_REPLIES, |_| 0);
        d.click((0, 0));
        let token = d.pending_reply().unwrap().token;
        assert!(d.reset());
        assert!(!d.fire_reply(token));
        assert!(d.position().board.is_empty());
        assert_eq!(d.result(), SequenceResult::Incomplete);
        assert!(!d.fire_reply(token));
    }

    #[test]
    fn illegal_and_outside_clicks_are_ignored() {
        let mut d = problem("problem\nX a\n. .\n\nsize: 4\nsolutions: a", |_| 0);
        assert!(!d.click((0, 0)));
        assert!(!d.click((3, 3)));
        assert_eq!(d.render_state().move_number, 0);
    }

    #[test]
    fn wildcard_accepts_any_player_move() {
        let mut d = problem("problem\na b .\n. . .\n. . .\n\nsolutions: *>b", |_| 0);
        assert!(d.click((2, 2)));
        assert_eq!(d.result(), SequenceResult::Incomplete);
        assert!(fire(&mut d));
        assert_eq!(d.result(), SequenceResult::Success);
    }

    #[test]
    fn path_marks_are_hidden() {
        let d = problem("problem\na b z\n. . .\n. . .\n\nsolutions: a>b", |_| 0);
        let labels: Vec<_> = d
            .render_state()
            .annotations
            .into_iter()
            .filter_map(|a| a.label)
            .collect();
        assert_eq!(labels, vec!["z"]);
    }
}
