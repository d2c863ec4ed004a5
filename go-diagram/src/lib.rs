pub mod annotation;
pub mod board;
pub mod captures;
pub mod diagram;
pub mod error;
pub mod history;
pub mod ko;
pub mod moves;
pub mod position;
pub mod reply;
pub mod sequence;
pub mod source;
pub mod stone;

pub type Point = (u8, u8);

pub use annotation::{Annotation, Area, Shape};
pub use board::Board;
pub use captures::Captures;
pub use diagram::{Controls, Diagram, Input, RenderState};
pub use error::{DiagramError, GoError};
pub use history::HistoryEntry;
pub use ko::Ko;
pub use moves::ParsedMove;
pub use position::Position;
pub use reply::{PendingReply, REPLY_DELAY, ReplySource, ReplyToken};
pub use sequence::{NodeId, SequenceResult, SequenceTree};
pub use source::DiagramKind;
pub use stone::Stone;
