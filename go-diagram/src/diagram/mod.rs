//! Interactive diagram controllers.
//!
//! [`Diagram`] is the closed set of diagram kinds. Renderers drive it with
//! [`Input`] events and pull a [`RenderState`] after each one.

mod freeplay;
mod problem;
mod replay;
mod still;

use std::collections::BTreeSet;

use serde::Serialize;

pub use freeplay::FreeplayDiagram;
pub use problem::ProblemDiagram;
pub use replay::ReplayDiagram;
pub use still::StillDiagram;

use crate::Point;
use crate::annotation::{self, Annotation, Area};
use crate::board::Board;
use crate::captures::Captures;
use crate::error::DiagramError;
use crate::reply::{self, PendingReply, ReplySource, ReplyToken};
use crate::sequence::SequenceResult;
use crate::source::{self, DiagramKind, ParsedSource};
use crate::stone::Stone;

/// Events a renderer forwards from its own widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Click(Point),
    Undo,
    Redo,
    Pass,
    Reset,
    First,
    Previous,
    Next,
    Last,
    GoToMove(usize),
}

/// Which buttons the renderer should enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Controls {
    pub undo: bool,
    pub redo: bool,
    pub pass: bool,
    pub reset: bool,
    pub first: bool,
    pub previous: bool,
    pub next: bool,
    pub last: bool,
}

/// Snapshot of everything a renderer draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    pub kind: DiagramKind,
    pub board: Board,
    pub row_count: u8,
    pub column_count: u8,
    pub annotations: Vec<Annotation>,
    pub areas: Vec<Area>,
    pub last_move: Option<Point>,
    pub captures: Captures,
    pub move_number: usize,
    pub controls: Controls,
    pub result: Option<SequenceResult>,
    pub turn: Option<Stone>,
    pub ko: Option<Point>,
}

/// Window size and static markings shared by every diagram kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub row_count: u8,
    pub column_count: u8,
    pub annotations: Vec<Annotation>,
    pub areas: Vec<Area>,
}

impl Layout {
    /// `hidden` marks are not drawn; marks turned into stones never are.
    pub fn new(source: &ParsedSource, hidden: &BTreeSet<&str>) -> Result<Self, DiagramError> {
        let mut hidden = hidden.clone();
        hidden.extend(source::stone_marks(&source.config));
        Ok(Layout {
            row_count: source.board.row_count,
            column_count: source.board.column_count,
            annotations: annotation::annotate(&source.board, &source.config, &hidden)?,
            areas: annotation::areas(&source.board, &source.config),
        })
    }

    pub fn contains(&self, (col, row): Point) -> bool {
        col < self.column_count && row < self.row_count
    }

    fn render(&self, kind: DiagramKind, board: &Board) -> RenderState {
        RenderState {
            kind,
            board: board.clone(),
            row_count: self.row_count,
            column_count: self.column_count,
            annotations: self.annotations.clone(),
            areas: self.areas.clone(),
            last_move: None,
            captures: Captures::new(),
            move_number: 0,
            controls: Controls::default(),
            result: None,
            turn: None,
            ko: None,
        }
    }
}

pub enum Diagram {
    Static(StillDiagram),
    Problem(ProblemDiagram),
    Freeplay(FreeplayDiagram),
    Replay(ReplayDiagram),
}

impl Diagram {
    /// Build a diagram from its source text, with the default reply source.
    pub fn parse(text: &str) -> Result<Self, DiagramError> {
        Self::parse_with_replies(text, reply::default_source())
    }

    /// Build a diagram, drawing problem replies from `replies`.
    pub fn parse_with_replies(
        text: &str,
        replies: Box<dyn ReplySource>,
    ) -> Result<Self, DiagramError> {
        let source = source::parse(text)?;
        let kind = source.kind;
        let diagram = match kind {
            DiagramKind::Static => Diagram::Static(StillDiagram::new(&source)?),
            DiagramKind::Problem => Diagram::Problem(ProblemDiagram::new(&source, replies)?),
            DiagramKind::Freeplay => Diagram::Freeplay(FreeplayDiagram::new(&source)?),
            DiagramKind::Replay => Diagram::Replay(ReplayDiagram::new(&source)?),
        };
        tracing::debug!(
            "built {kind} diagram: {}x{} window, size {}",
            source.board.row_count,
            source.board.column_count,
            source.board.board.size()
        );
        Ok(diagram)
    }

    pub fn kind(&self) -> DiagramKind {
        match self {
            Diagram::Static(_) => DiagramKind::Static,
            Diagram::Problem(_) => DiagramKind::Problem,
            Diagram::Freeplay(_) => DiagramKind::Freeplay,
            Diagram::Replay(_) => DiagramKind::Replay,
        }
    }

    /// Apply one input. Returns whether the diagram changed; inputs that do
    /// not apply to this kind, or illegal moves, change nothing.
    pub fn apply_input(&mut self, input: Input) -> bool {
        let changed = match (&mut *self, input) {
            (Diagram::Problem(d), Input::Click(point)) => d.click(point),
            (Diagram::Problem(d), Input::Reset) => d.reset(),
            (Diagram::Freeplay(d), Input::Click(point)) => d.click(point),
            (Diagram::Freeplay(d), Input::Undo) => d.undo(),
            (Diagram::Freeplay(d), Input::Redo) => d.redo(),
            (Diagram::Freeplay(d), Input::Pass) => d.pass(),
            (Diagram::Freeplay(d), Input::Reset) => d.reset(),
            (Diagram::Replay(d), Input::First) => d.first(),
            (Diagram::Replay(d), Input::Previous) => d.previous(),
            (Diagram::Replay(d), Input::Next) => d.next(),
            (Diagram::Replay(d), Input::Last) => d.last(),
            (Diagram::Replay(d), Input::GoToMove(n)) => d.go_to_move(n),
            _ => false,
        };
        if !changed {
            tracing::trace!("{input:?} ignored by {} diagram", self.kind());
        }
        changed
    }

    pub fn render_state(&self) -> RenderState {
        match self {
            Diagram::Static(d) => d.render_state(),
            Diagram::Problem(d) => d.render_state(),
            Diagram::Freeplay(d) => d.render_state(),
            Diagram::Replay(d) => d.render_state(),
        }
    }

    /// The opponent reply waiting to be fired, if any.
    pub fn pending_reply(&self) -> Option<PendingReply> {
        match self {
            Diagram::Problem(d) => d.pending_reply(),
            _ => None,
        }
    }

    /// Deliver a scheduled reply. Stale tokens are no-ops.
    pub fn fire_reply(&mut self, token: ReplyToken) -> bool {
        match self {
            Diagram::Problem(d) => d.fire_reply(token),
            _ => false,
        }
    }

    pub fn on_board_click(&mut self, point: Point) -> bool {
        self.apply_input(Input::Click(point))
    }

    pub fn on_undo(&mut self) -> bool {
        self.apply_input(Input::Undo)
    }

    pub fn on_redo(&mut self) -> bool {
        self.apply_input(Input::Redo)
    }

    pub fn on_pass(&mut self) -> bool {
        self.apply_input(Input::Pass)
    }

    pub fn on_reset(&mut self) -> bool {
        self.apply_input(Input::Reset)
    }

    pub fn on_first(&mut self) -> bool {
        self.apply_input(Input::First)
    }

    pub fn on_previous(&mut self) -> bool {
        self.apply_input(Input::Previous)
    }

    pub fn on_next(&mut self) -> bool {
        self.apply_input(Input::Next)
    }

    pub fn on_last(&mut self) -> bool {
        self.apply_input(Input::Last)
    }
}

impl std::fmt::Debug for Diagram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagram")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}
