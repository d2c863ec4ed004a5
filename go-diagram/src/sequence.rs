//! Solution trees for problem diagrams.
//!
//! Paths such as `a>b>*>c` are parsed against the board's marks, checked by
//! replaying them, and merged into one tree. Nodes live in an append-only
//! arena: building and merging only ever push new nodes, so a `NodeId`
//! handed out earlier always describes the same subtree.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::Point;
use crate::error::{DiagramError, describe};
use crate::position::Position;
use crate::source::ParsedBoard;
use crate::stone::Stone;

pub type NodeId = usize;

/// Path token matching any player move.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceResult {
    Success,
    Failure,
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Play(Point),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceNode {
    pub result: SequenceResult,
    pub children: BTreeMap<Point, NodeId>,
    pub wildcard: Option<NodeId>,
}

impl SequenceNode {
    fn leaf(result: SequenceResult) -> Self {
        SequenceNode {
            result,
            children: BTreeMap::new(),
            wildcard: None,
        }
    }

    fn with_step(step: Step, child: NodeId) -> Self {
        let mut node = SequenceNode::leaf(SequenceResult::Incomplete);
        match step {
            Step::Play(point) => {
                node.children.insert(point, child);
            }
            Step::Wildcard => node.wildcard = Some(child),
        }
        node
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.wildcard.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct SequenceTree {
    nodes: Vec<SequenceNode>,
    root: NodeId,
}

impl SequenceTree {
    pub fn new() -> Self {
        SequenceTree {
            nodes: vec![SequenceNode::leaf(SequenceResult::Incomplete)],
            root: 0,
        }
    }

    /// Build a tree from `(path, is_solution)` pairs, validating each path
    /// against the starting position. `player` moves at even path indices.
    pub fn build<'a>(
        paths: impl IntoIterator<Item = (&'a str, bool)>,
        parsed: &ParsedBoard,
        start: &Position,
        player: Stone,
        enforce_ko: bool,
    ) -> Result<Self, DiagramError> {
        let mut tree = SequenceTree::new();
        for (path, is_solution) in paths {
            let steps = parse_path(path, parsed)?;
            validate_path(path, &steps, start, player, enforce_ko)?;
            let result = if is_solution {
                SequenceResult::Success
            } else {
                SequenceResult::Failure
            };
            tree.insert(&steps, result);
        }
        Ok(tree)
    }

    /// Add one path. The previous root stays valid; `root()` moves to the merged tree.
    pub fn insert(&mut self, steps: &[Step], result: SequenceResult) {
        let Some((&first, rest)) = steps.split_first() else {
            return;
        };

        let mut below: Option<(Step, NodeId)> = None;
        for &step in rest.iter().rev() {
            let node = match below {
                Some((next, id)) => SequenceNode::with_step(next, id),
                None => SequenceNode::leaf(result),
            };
            below = Some((step, self.push(node)));
        }
        let head = match below {
            Some((next, id)) => SequenceNode::with_step(next, id),
            None => SequenceNode::leaf(result),
        };
        let head = self.push(head);

        let addition = self.push(SequenceNode::with_step(first, head));
        self.root = self.merge(self.root, addition);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SequenceNode {
        &self.nodes[id]
    }

    /// The continuation for a move at `point`: an explicit child, else the wildcard.
    pub fn follow(&self, from: NodeId, point: Point) -> Option<NodeId> {
        let node = self.node(from);
        node.children.get(&point).copied().or(node.wildcard)
    }

    /// Every leaf as (path, result), used to compare trees structurally.
    pub fn outcomes(&self) -> BTreeSet<(Vec<Step>, SequenceResult)> {
        let mut out = BTreeSet::new();
        let mut stack = vec![(self.root, Vec::new())];
        while let Some((id, path)) = stack.pop() {
            let node = self.node(id);
            if node.is_leaf() {
                out.insert((path, node.result));
                continue;
            }
            for (&point, &child) in &node.children {
                let mut next = path.clone();
                next.push(Step::Play(point));
                stack.push((child, next));
            }
            if let Some(child) = node.wildcard {
                let mut next = path;
                next.push(Step::Wildcard);
                stack.push((child, next));
            }
        }
        out
    }

    fn push(&mut self, node: SequenceNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Merge two nodes for the same move into a new node.
    ///
    /// The result is Incomplete whenever the merge has continuations;
    /// otherwise the earlier node's result wins.
    fn merge(&mut self, earlier: NodeId, later: NodeId) -> NodeId {
        let a = self.nodes[earlier].clone();
        let b = self.nodes[later].clone();

        let children = self.merge_maps(&a.children, &b.children);
        // A lone wildcard child merges as a one-entry map.
        let wrap = |id: Option<NodeId>| -> BTreeMap<(), NodeId> {
            id.map(|id| ((), id)).into_iter().collect()
        };
        let wildcards = self.merge_maps(&wrap(a.wildcard), &wrap(b.wildcard));
        let wildcard = wildcards.get(&()).copied();

        let result = if children.is_empty() && wildcard.is_none() {
            a.result
        } else {
            SequenceResult::Incomplete
        };
        self.push(SequenceNode {
            result,
            children,
            wildcard,
        })
    }

    fn merge_maps<K: Ord + Copy>(
        &mut self,
        earlier: &BTreeMap<K, NodeId>,
        later: &BTreeMap<K, NodeId>,
    ) -> BTreeMap<K, NodeId> {
        let mut merged = earlier.clone();
        for (&key, &id) in later {
            let entry = match earlier.get(&key) {
                Some(&existing) => self.merge(existing, id),
                None => id,
            };
            merged.insert(key, entry);
        }
        merged
    }
}

impl Default for SequenceTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a `>`-joined path and resolve its marks.
pub fn parse_path(path: &str, parsed: &ParsedBoard) -> Result<Vec<Step>, DiagramError> {
    let mut steps = Vec::new();
    for (i, token) in path.split('>').map(str::trim).enumerate() {
        if token.is_empty() {
            return Err(DiagramError::SequenceError(format!(
                "sequence '{path}' has an empty step at position {}",
                i + 1
            )));
        }
        if token == WILDCARD {
            if steps.last() == Some(&Step::Wildcard) {
                return Err(DiagramError::SequenceError(format!(
                    "sequence '{path}' has consecutive wildcards at position {}",
                    i + 1
                )));
            }
            if i % 2 != 0 {
                return Err(DiagramError::SequenceError(format!(
                    "sequence '{path}' has a wildcard on an opponent move at position {}",
                    i + 1
                )));
            }
            steps.push(Step::Wildcard);
        } else {
            steps.push(Step::Play(parsed.mark_point(token)?));
        }
    }
    Ok(steps)
}

/// Replay a path from the starting position, skipping wildcards.
fn validate_path(
    path: &str,
    steps: &[Step],
    start: &Position,
    player: Stone,
    enforce_ko: bool,
) -> Result<(), DiagramError> {
    let mut position = start.clone();
    for (i, step) in steps.iter().enumerate() {
        position = match *step {
            Step::Wildcard => position.pass(),
            Step::Play(point) => position
                .play(point, player.after(i), enforce_ko)
                .map_err(|e| {
                    DiagramError::SequenceError(format!(
                        "move {} of sequence '{path}' at {} is illegal: {e}",
                        i + 1,
                        describe(point)
                    ))
                })?,
        };
    }
    Ok(())
}
