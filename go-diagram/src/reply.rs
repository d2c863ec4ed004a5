use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delay between a player's move and the opponent's answer in problem diagrams.
pub const REPLY_DELAY: Duration = Duration::from_millis(500);

/// Identifies one scheduled reply. A token from before a reset never matches again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplyToken {
    pub generation: u64,
}

/// A reply the host should deliver back through `fire_reply` once `delay_ms` has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReply {
    pub token: ReplyToken,
    pub delay_ms: u64,
}

impl PendingReply {
    pub fn new(token: ReplyToken) -> Self {
        PendingReply {
            token,
            delay_ms: REPLY_DELAY.as_millis() as u64,
        }
    }
}

/// Chooses which of `count` continuations the opponent plays.
pub trait ReplySource {
    /// Returns an index in `0..count`; `count` is never zero.
    fn pick(&mut self, count: usize) -> usize;
}

impl<F: FnMut(usize) -> usize> ReplySource for F {
    fn pick(&mut self, count: usize) -> usize {
        self(count)
    }
}

/// Uniform choice from the thread-local generator.
#[cfg(feature = "rand")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomReply;

#[cfg(feature = "rand")]
impl ReplySource for RandomReply {
    fn pick(&mut self, count: usize) -> usize {
        use rand::RngExt;
        rand::rng().random_range(0..count)
    }
}

/// The source used when the caller does not inject one.
///
/// Without the `rand` feature this always answers with the first
/// continuation, which is not uniform. Builds with `default-features = false`
/// should pass their own source to `Diagram::parse_with_replies`, as the wasm
/// bindings do with `Math.random`.
pub fn default_source() -> Box<dyn ReplySource> {
    #[cfg(feature = "rand")]
    {
        Box::new(RandomReply)
    }
    #[cfg(not(feature = "rand"))]
    {
        Box::new(|_: usize| 0)
    }
}
