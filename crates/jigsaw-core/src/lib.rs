//! Core engine for a browser-style picture puzzle: an image is partitioned
//! into a row/column grid of rectangular pieces, the pieces are scattered
//! across a viewport (or grid-arranged for deterministic play), and the
//! arrangement is checked for completion after every user mutation.
//!
//! The engine holds no rendering, input, or image-decoding code. Those live
//! in front ends that consume the boundary contracts exposed here: the
//! [`ImageCutter`] trait for pixel slicing, the [`CelebrationSchedule`]
//! trait for the solved overlay, and the read-only piece view on
//! [`PuzzleInstance`].

mod completion;
mod config;
mod geometry;
mod partition;
mod placer;
mod puzzle;
mod store;

pub use completion::{
    normalize_angle, CompletionEvaluator, SolvedTransition, POSITION_TOLERANCE,
    ROTATION_TOLERANCE_DEG,
};
pub use config::{LayoutMode, PuzzleConfig, Viewport};
pub use geometry::{Point, Rect};
pub use partition::{
    partition, BitmapHandle, GridShape, ImageCutter, ImageHandle, ImageInfo, PieceDescriptor,
};
pub use placer::{ScatterPlacer, PADDING};
pub use puzzle::{CelebrationSchedule, PuzzleInstance, DISMISS_DELAY, REVEAL_DELAY};
pub use store::{LivePieceState, PieceStateStore};

use thiserror::Error;

/// Errors surfaced to the embedding application. The failure surface is
/// intentionally small: puzzle state is transient and recreated wholesale,
/// so there are no retries and no partial-failure recovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// Rejected synchronously at puzzle-creation time; no partial piece set
    /// is created.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A mutation referenced a slot index no piece carries. The store is
    /// left untouched.
    #[error("no piece with slot index {0}")]
    UnknownSlot(u32),

    /// The operation is only defined for the other layout mode (e.g. the
    /// legacy swap interaction in a free-positioning puzzle).
    #[error("operation requires the {expected:?} layout mode")]
    WrongLayoutMode { expected: LayoutMode },
}
