use crate::{BitmapHandle, GridShape, LayoutMode, PuzzleError, Rect};
use serde::{Deserialize, Serialize};

/// Live transform of one piece: its permanent slot identity plus its
/// current on-screen position and rotation. Owned exclusively by the
/// [`PieceStateStore`] for the lifetime of one puzzle instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LivePieceState {
    /// Row-major position in the solved layout; the piece's identity.
    pub slot: u32,
    /// Top-left corner in viewport coordinates.
    pub x: f64,
    pub y: f64,
    /// Degrees. Purely additive at write time; can exceed 360 or go
    /// negative. Normalized only when completion is evaluated.
    pub rotation: f64,
    pub width: f64,
    pub height: f64,
    /// Opaque bitmap handle for the view layer.
    pub bitmap: BitmapHandle,
}

impl LivePieceState {
    pub fn bounding_box(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// The authoritative collection of live piece records for one puzzle
/// instance, consulted by both placement and completion checking.
///
/// The slot invariant (exactly one record per slot in `{0..rows*cols}`) is
/// maintained by construction: the store is created wholesale from a full
/// partition and replaced wholesale when a new image is loaded. No
/// individual piece is ever added or removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PieceStateStore {
    pieces: Vec<LivePieceState>,
}

impl PieceStateStore {
    pub fn new(pieces: Vec<LivePieceState>) -> Self {
        Self { pieces }
    }

    /// All pieces in container (array) order. In grid layout this order is
    /// the on-screen cell order; in free layout it is creation order.
    pub fn pieces(&self) -> &[LivePieceState] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Look up a piece by its slot identity.
    pub fn piece(&self, slot: u32) -> Option<&LivePieceState> {
        self.pieces.iter().find(|p| p.slot == slot)
    }

    fn index_of(&self, slot: u32) -> Result<usize, PuzzleError> {
        self.pieces
            .iter()
            .position(|p| p.slot == slot)
            .ok_or(PuzzleError::UnknownSlot(slot))
    }

    /// Set a piece's position (drag tick).
    pub fn move_piece(&mut self, slot: u32, x: f64, y: f64) -> Result<(), PuzzleError> {
        let idx = self.index_of(slot)?;
        self.pieces[idx].x = x;
        self.pieces[idx].y = y;
        Ok(())
    }

    /// Add to a piece's rotation. No wraparound is applied at write time.
    pub fn rotate_piece(&mut self, slot: u32, delta_deg: f64) -> Result<(), PuzzleError> {
        let idx = self.index_of(slot)?;
        self.pieces[idx].rotation += delta_deg;
        Ok(())
    }

    /// Legacy grid-mode swap: exchanges the two records' slot associations
    /// and nothing else. Position and rotation stay with the container the
    /// record occupies.
    pub fn swap_pieces(&mut self, slot_a: u32, slot_b: u32) -> Result<(), PuzzleError> {
        let ia = self.index_of(slot_a)?;
        let ib = self.index_of(slot_b)?;
        self.pieces[ia].slot = slot_b;
        self.pieces[ib].slot = slot_a;
        Ok(())
    }

    /// Snap every piece onto the solved geometry (auto-solve end state).
    ///
    /// Free layout anchors at the slot-0 piece's current position so the
    /// assembly happens wherever the player left it; grid layout reorders
    /// records into identity and reassigns home-cell coordinates.
    pub(crate) fn snap_to_solved(&mut self, grid: GridShape, mode: LayoutMode) {
        match mode {
            LayoutMode::Grid => {
                self.pieces.sort_by_key(|p| p.slot);
                for (i, piece) in self.pieces.iter_mut().enumerate() {
                    let (row, col) = grid.position_of(i as u32);
                    piece.x = col as f64 * piece.width;
                    piece.y = row as f64 * piece.height;
                    piece.rotation = 0.0;
                }
            }
            LayoutMode::FreePositioning => {
                let anchor = match self.pieces.iter().find(|p| p.slot == 0) {
                    Some(piece) => (piece.x, piece.y),
                    None => return,
                };
                for piece in &mut self.pieces {
                    let (row, col) = grid.position_of(piece.slot);
                    piece.x = anchor.0 + col as f64 * piece.width;
                    piece.y = anchor.1 + row as f64 * piece.height;
                    piece.rotation = 0.0;
                }
            }
        }
    }
}
