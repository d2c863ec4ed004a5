use std::collections::BTreeSet;

use super::{Layout, RenderState};
use crate::board::Board;
use crate::error::DiagramError;
use crate::source::{DiagramKind, ParsedSource};

/// A board with markings and no interaction.
#[derive(Debug, Clone)]
pub struct StillDiagram {
    layout: Layout,
    board: Board,
}

impl StillDiagram {
    pub fn new(source: &ParsedSource) -> Result<Self, DiagramError> {
        Ok(StillDiagram {
            layout: Layout::new(source, &BTreeSet::new())?,
            board: source.board.board.clone(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn render_state(&self) -> RenderState {
        self.layout.render(DiagramKind::Static, &self.board)
    }
}
