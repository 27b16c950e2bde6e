use crate::{LayoutMode, PuzzleError, Rect, Viewport};
use serde::{Deserialize, Serialize};

/// Opaque handle to a decoded image held by the ingestion layer. The engine
/// receives it once decoding completes and never re-reads the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle(pub u64);

/// Opaque handle to one piece bitmap produced by the external image cutter.
/// The engine never inspects pixel contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitmapHandle(pub u64);

/// A decoded image as the engine sees it: a handle plus pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub handle: ImageHandle,
    pub width: f64,
    pub height: f64,
}

impl ImageInfo {
    pub fn new(handle: ImageHandle, width: f64, height: f64) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }
}

/// Boundary to the external image cutter: given the image and a grid shape,
/// it yields one same-sized rectangular bitmap per slot, in row-major slot
/// order.
pub trait ImageCutter {
    fn cut(&mut self, image: ImageInfo, grid: GridShape) -> Vec<BitmapHandle>;
}

/// Row/column shape of the solved layout, with the slot-index math used
/// throughout placement and completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: u32,
    pub cols: u32,
}

impl GridShape {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    pub fn piece_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// Row-major slot index of a grid cell.
    pub fn slot_of(&self, row: u32, col: u32) -> u32 {
        row * self.cols + col
    }

    /// `(row, col)` of a slot index.
    pub fn position_of(&self, slot: u32) -> (u32, u32) {
        (slot / self.cols, slot % self.cols)
    }
}

/// Immutable identity of one piece, created by partitioning. The slot index
/// is the piece's permanent identity: its row-major position in the solved
/// layout, never reassigned after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PieceDescriptor {
    pub slot: u32,
    /// Region of the original image this piece shows, in source pixels.
    /// Consumed by the image cutter, not by the engine itself.
    pub source: Rect,
    /// Rendered size in viewport units, uniform across the puzzle.
    pub width: f64,
    pub height: f64,
}

/// Fraction of the smaller viewport dimension a single piece may occupy at
/// grid size 1; larger grids scale the assembled puzzle up proportionally.
const VIEWPORT_FILL: f64 = 0.4;

/// Partition an image into `rows x cols` pieces.
///
/// Source rectangles tile the image exactly with no remainder loss (the
/// division stays in floating point; pixel rounding is the image cutter's
/// concern). Output is in row-major slot order.
///
/// In [`LayoutMode::Grid`] pieces render at exact 1:1 source-pixel size.
/// In [`LayoutMode::FreePositioning`] the assembled puzzle's largest
/// dimension is fit to `min(vw, vh) * 0.4 * max(rows, cols)`, then
/// multiplied by the user's `scale_factor`.
pub fn partition(
    image: ImageInfo,
    grid: GridShape,
    scale_factor: f64,
    viewport: Viewport,
    mode: LayoutMode,
) -> Result<Vec<PieceDescriptor>, PuzzleError> {
    if grid.rows == 0 || grid.cols == 0 {
        return Err(PuzzleError::InvalidConfig {
            reason: format!(
                "grid must be at least 1x1, got {}x{}",
                grid.rows, grid.cols
            ),
        });
    }
    if scale_factor <= 0.0 {
        return Err(PuzzleError::InvalidConfig {
            reason: format!("scale factor must be positive, got {scale_factor}"),
        });
    }

    let src_w = image.width / grid.cols as f64;
    let src_h = image.height / grid.rows as f64;

    let render_scale = match mode {
        // Deterministic layout renders at exact source-pixel size.
        LayoutMode::Grid => 1.0,
        LayoutMode::FreePositioning => {
            let target = viewport.width.min(viewport.height)
                * VIEWPORT_FILL
                * grid.rows.max(grid.cols) as f64;
            target / image.width.max(image.height) * scale_factor
        }
    };

    let mut pieces = Vec::with_capacity(grid.piece_count() as usize);
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            pieces.push(PieceDescriptor {
                slot: grid.slot_of(row, col),
                source: Rect::new(col as f64 * src_w, row as f64 * src_h, src_w, src_h),
                width: src_w * render_scale,
                height: src_h * render_scale,
            });
        }
    }
    Ok(pieces)
}
