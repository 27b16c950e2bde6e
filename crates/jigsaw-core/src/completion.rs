use crate::{GridShape, LayoutMode, LivePieceState};

/// Maximum per-axis deviation, in viewport units, from the ideal solved
/// position that still counts as placed.
pub const POSITION_TOLERANCE: f64 = 50.0;

/// Maximum deviation from upright, in degrees, that still counts as solved.
pub const ROTATION_TOLERANCE_DEG: f64 = 15.0;

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_angle(deg: f64) -> f64 {
    let mut angle = deg % 360.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    angle
}

/// Within tolerance of upright, accounting for the wrap boundary (e.g.
/// 370 degrees normalizes to 10 and passes; 350 passes from the other side).
fn is_upright(rotation: f64) -> bool {
    let angle = normalize_angle(rotation);
    angle < ROTATION_TOLERANCE_DEG || angle > 360.0 - ROTATION_TOLERANCE_DEG
}

/// Outcome of one completion evaluation at a settle point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolvedTransition {
    NotSolved,
    /// First evaluation after the not-solved -> solved edge. Celebration
    /// side effects key off this variant and it is reported at most once
    /// per edge.
    BecameSolved,
    /// Solved on this and the previous evaluation.
    StillSolved,
}

impl SolvedTransition {
    pub fn is_solved(&self) -> bool {
        !matches!(self, SolvedTransition::NotSolved)
    }
}

/// Decides whether the current arrangement counts as solved and tracks the
/// solved edge so the celebration fires once per transition.
///
/// The evaluator only reads piece state. It is cheap enough to run after
/// every mutation, including drag move ticks.
#[derive(Debug, Clone, Default)]
pub struct CompletionEvaluator {
    was_solved: bool,
}

impl CompletionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure solved test; does not touch the edge latch. Used by drag move
    /// ticks, which update displayed state but trigger no side effects.
    pub fn is_solved(&self, pieces: &[LivePieceState], grid: GridShape, mode: LayoutMode) -> bool {
        match mode {
            LayoutMode::Grid => grid_solved(pieces),
            LayoutMode::FreePositioning => free_solved(pieces, grid),
        }
    }

    /// Evaluate at a settle point, advancing the edge latch. Repeated calls
    /// on an unchanged solved state report `StillSolved`; leaving solved
    /// re-arms the latch.
    pub fn evaluate(
        &mut self,
        pieces: &[LivePieceState],
        grid: GridShape,
        mode: LayoutMode,
    ) -> SolvedTransition {
        let solved = self.is_solved(pieces, grid, mode);
        let transition = match (self.was_solved, solved) {
            (false, true) => SolvedTransition::BecameSolved,
            (true, true) => SolvedTransition::StillSolved,
            (_, false) => SolvedTransition::NotSolved,
        };
        self.was_solved = solved;
        transition
    }

    /// Forget the solved edge (used when pieces are re-scattered).
    pub fn reset(&mut self) {
        self.was_solved = false;
    }
}

/// Grid layout: solved iff the records form the identity permutation over
/// container order. No tolerance is involved.
fn grid_solved(pieces: &[LivePieceState]) -> bool {
    !pieces.is_empty() && pieces.iter().enumerate().all(|(i, p)| p.slot as usize == i)
}

/// Free layout: every piece upright within tolerance, and every piece
/// within tolerance of its expected position relative to the slot-0 anchor.
/// Anchoring makes the check translation-invariant: a correctly assembled
/// puzzle is recognized wherever the player dragged it.
fn free_solved(pieces: &[LivePieceState], grid: GridShape) -> bool {
    if pieces.is_empty() {
        return false;
    }
    if !pieces.iter().all(|p| is_upright(p.rotation)) {
        return false;
    }
    // The store invariant guarantees an anchor, but a missing one must read
    // as unsolved rather than crash.
    let anchor = match pieces.iter().find(|p| p.slot == 0) {
        Some(piece) => piece,
        None => return false,
    };
    pieces.iter().all(|piece| {
        let (row, col) = grid.position_of(piece.slot);
        let expected_x = anchor.x + col as f64 * piece.width;
        let expected_y = anchor.y + row as f64 * piece.height;
        (piece.x - expected_x).abs() < POSITION_TOLERANCE
            && (piece.y - expected_y).abs() < POSITION_TOLERANCE
    })
}
