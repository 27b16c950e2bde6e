use std::time::Duration;

use crate::{
    partition, CompletionEvaluator, GridShape, ImageCutter, ImageInfo, LayoutMode, LivePieceState,
    PieceStateStore, Point, PuzzleConfig, PuzzleError, Rect, ScatterPlacer, SolvedTransition,
    Viewport,
};

/// Delay between the solving mutation settling and the celebration overlay
/// appearing, so the final drag's visual settles first.
pub const REVEAL_DELAY: Duration = Duration::from_millis(100);

/// Lifetime of the celebration overlay before it auto-dismisses.
pub const DISMISS_DELAY: Duration = Duration::from_millis(3000);

/// Deferred-callback seam owned by the embedding UI.
///
/// Called exactly once per not-solved -> solved transition. Both delays are
/// one-shot and non-cancellable; display specifics beyond the timing are
/// the UI's concern.
pub trait CelebrationSchedule {
    fn on_solved(&mut self, reveal_after: Duration, dismiss_after: Duration);
}

/// One puzzle: an immutable configuration snapshot plus the live piece
/// state, the completion evaluator, and the scatter placer's RNG.
///
/// Replacing the puzzle (new image, new grid size, new scale) means
/// constructing a new instance and dropping this one; no field is ever
/// re-gridded in place.
pub struct PuzzleInstance {
    config: PuzzleConfig,
    viewport: Viewport,
    grid: GridShape,
    store: PieceStateStore,
    evaluator: CompletionEvaluator,
    placer: ScatterPlacer,
    celebration: Option<Box<dyn CelebrationSchedule>>,
}

impl PuzzleInstance {
    /// Create a puzzle from a decoded image. Partitioning, bitmap cutting,
    /// and initial placement happen together; on any error no piece state
    /// is created.
    pub fn new(
        image: ImageInfo,
        config: PuzzleConfig,
        viewport: Viewport,
        cutter: &mut dyn ImageCutter,
    ) -> Result<Self, PuzzleError> {
        let placer = ScatterPlacer::new(viewport);
        Self::build(image, config, viewport, cutter, placer)
    }

    /// Like [`PuzzleInstance::new`] but with a fixed RNG seed, so scatter
    /// layouts (and grid-mode shuffles) are reproducible.
    pub fn with_seed(
        image: ImageInfo,
        config: PuzzleConfig,
        viewport: Viewport,
        cutter: &mut dyn ImageCutter,
        seed: u64,
    ) -> Result<Self, PuzzleError> {
        let placer = ScatterPlacer::with_seed(viewport, seed);
        Self::build(image, config, viewport, cutter, placer)
    }

    fn build(
        image: ImageInfo,
        config: PuzzleConfig,
        viewport: Viewport,
        cutter: &mut dyn ImageCutter,
        mut placer: ScatterPlacer,
    ) -> Result<Self, PuzzleError> {
        config.validate()?;
        let grid = GridShape::new(config.rows, config.cols);
        let descriptors = partition(
            image,
            grid,
            config.scale_factor(),
            viewport,
            config.layout_mode,
        )?;

        let bitmaps = cutter.cut(image, grid);
        if bitmaps.len() != descriptors.len() {
            return Err(PuzzleError::InvalidConfig {
                reason: format!(
                    "image cutter returned {} bitmaps for {} slots",
                    bitmaps.len(),
                    descriptors.len()
                ),
            });
        }

        let mut pieces: Vec<LivePieceState> = descriptors
            .iter()
            .map(|desc| LivePieceState {
                slot: desc.slot,
                x: 0.0,
                y: 0.0,
                rotation: 0.0,
                width: desc.width,
                height: desc.height,
                bitmap: bitmaps[desc.slot as usize],
            })
            .collect();

        match config.layout_mode {
            LayoutMode::Grid => {
                // Shuffle which piece sits in which fixed cell, then assign
                // the home-cell coordinates by container index.
                placer.shuffle(&mut pieces);
                assign_grid_cells(&mut pieces, grid);
            }
            LayoutMode::FreePositioning => {
                scatter(&mut pieces, &mut placer);
            }
        }

        Ok(Self {
            config,
            viewport,
            grid,
            store: PieceStateStore::new(pieces),
            evaluator: CompletionEvaluator::new(),
            placer,
            celebration: None,
        })
    }

    /// Subscribe the celebration sink. One subscription serves every
    /// mutation path; there is no per-callsite completion wiring.
    pub fn set_celebration(&mut self, sink: Box<dyn CelebrationSchedule>) {
        self.celebration = Some(sink);
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn grid(&self) -> GridShape {
        self.grid
    }

    /// Read-only view contract: everything the rendering layer needs to
    /// draw and position each piece.
    pub fn pieces(&self) -> &[LivePieceState] {
        self.store.pieces()
    }

    /// Current solved reading without advancing the edge latch.
    pub fn is_solved(&self) -> bool {
        self.evaluator
            .is_solved(self.store.pieces(), self.grid, self.config.layout_mode)
    }

    /// Drag move tick: commit the position and report the current solved
    /// reading for display. No celebration bookkeeping happens here; a drag
    /// that never reaches [`PuzzleInstance::drop_piece`] simply leaves the
    /// piece at its last tick position.
    pub fn move_piece(&mut self, slot: u32, x: f64, y: f64) -> Result<bool, PuzzleError> {
        self.store.move_piece(slot, x, y)?;
        Ok(self.is_solved())
    }

    /// Drag end: a settle point. The position was already committed by the
    /// last move tick.
    pub fn drop_piece(&mut self, slot: u32) -> Result<SolvedTransition, PuzzleError> {
        if self.store.piece(slot).is_none() {
            return Err(PuzzleError::UnknownSlot(slot));
        }
        Ok(self.settle())
    }

    /// Rotate a piece by a delta in degrees, then settle.
    pub fn rotate_piece(&mut self, slot: u32, delta_deg: f64) -> Result<SolvedTransition, PuzzleError> {
        self.store.rotate_piece(slot, delta_deg)?;
        Ok(self.settle())
    }

    /// Legacy grid-mode interaction: exchange two pieces' slot
    /// associations, then settle.
    pub fn swap_pieces(&mut self, slot_a: u32, slot_b: u32) -> Result<SolvedTransition, PuzzleError> {
        if self.config.layout_mode != LayoutMode::Grid {
            return Err(PuzzleError::WrongLayoutMode {
                expected: LayoutMode::Grid,
            });
        }
        self.store.swap_pieces(slot_a, slot_b)?;
        Ok(self.settle())
    }

    /// Auto-solve end state: snap every piece onto the solved geometry
    /// (anchored at the slot-0 piece's current position in free layout)
    /// and settle. The interpolated animation is the view's concern; only
    /// this end state is part of the engine contract.
    pub fn solve(&mut self) -> SolvedTransition {
        self.store.snap_to_solved(self.grid, self.config.layout_mode);
        self.settle()
    }

    /// Re-scatter the existing pieces (debug "shuffle again") and re-arm
    /// the solved latch.
    pub fn reset_scatter(&mut self) {
        let mut pieces = self.store.pieces().to_vec();
        match self.config.layout_mode {
            LayoutMode::Grid => {
                self.placer.shuffle(&mut pieces);
                assign_grid_cells(&mut pieces, self.grid);
            }
            LayoutMode::FreePositioning => {
                scatter(&mut pieces, &mut self.placer);
            }
        }
        self.store = PieceStateStore::new(pieces);
        self.evaluator.reset();
    }

    /// The single completion-check site behind every settling mutation.
    fn settle(&mut self) -> SolvedTransition {
        let transition =
            self.evaluator
                .evaluate(self.store.pieces(), self.grid, self.config.layout_mode);
        if transition == SolvedTransition::BecameSolved {
            if let Some(sink) = self.celebration.as_mut() {
                sink.on_solved(REVEAL_DELAY, DISMISS_DELAY);
            }
        }
        transition
    }
}

/// Assign fixed home-cell coordinates by container index (grid layout).
fn assign_grid_cells(pieces: &mut [LivePieceState], grid: GridShape) {
    for (i, piece) in pieces.iter_mut().enumerate() {
        let (row, col) = grid.position_of(i as u32);
        piece.x = col as f64 * piece.width;
        piece.y = row as f64 * piece.height;
        piece.rotation = 0.0;
    }
}

/// Scatter-place each piece in turn. The registry of committed boxes lives
/// only for this pass and is dropped afterwards; free dragging never
/// consults it.
fn scatter(pieces: &mut [LivePieceState], placer: &mut ScatterPlacer) {
    let mut placed: Vec<Rect> = Vec::with_capacity(pieces.len());
    for piece in pieces.iter_mut() {
        let Point { x, y } = placer.place(piece.width, piece.height, &placed);
        piece.x = x;
        piece.y = y;
        piece.rotation = 0.0;
        placed.push(piece.bounding_box());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BitmapHandle, ImageHandle, PADDING};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Stand-in for the external image cutter: hands out one opaque handle
    /// per slot.
    struct StubCutter;

    impl ImageCutter for StubCutter {
        fn cut(&mut self, _image: ImageInfo, grid: GridShape) -> Vec<BitmapHandle> {
            (0..grid.piece_count() as u64).map(BitmapHandle).collect()
        }
    }

    /// Cutter that violates the one-bitmap-per-slot contract.
    struct ShortCutter;

    impl ImageCutter for ShortCutter {
        fn cut(&mut self, _image: ImageInfo, _grid: GridShape) -> Vec<BitmapHandle> {
            vec![BitmapHandle(0)]
        }
    }

    #[derive(Clone, Default)]
    struct RecordingCelebration {
        calls: Rc<RefCell<Vec<(Duration, Duration)>>>,
    }

    impl CelebrationSchedule for RecordingCelebration {
        fn on_solved(&mut self, reveal_after: Duration, dismiss_after: Duration) {
            self.calls.borrow_mut().push((reveal_after, dismiss_after));
        }
    }

    const VIEWPORT: Viewport = Viewport {
        width: 1000.0,
        height: 800.0,
    };

    fn image() -> ImageInfo {
        ImageInfo::new(ImageHandle(7), 400.0, 400.0)
    }

    fn free_puzzle(rows: u32, cols: u32, seed: u64) -> PuzzleInstance {
        let config = PuzzleConfig {
            rows,
            cols,
            scale_percent: 100.0,
            layout_mode: LayoutMode::FreePositioning,
        };
        PuzzleInstance::with_seed(image(), config, VIEWPORT, &mut StubCutter, seed).unwrap()
    }

    fn grid_puzzle(rows: u32, cols: u32, seed: u64) -> PuzzleInstance {
        let config = PuzzleConfig {
            rows,
            cols,
            scale_percent: 100.0,
            layout_mode: LayoutMode::Grid,
        };
        PuzzleInstance::with_seed(image(), config, VIEWPORT, &mut StubCutter, seed).unwrap()
    }

    /// Drag every piece into solved position relative to a chosen anchor
    /// origin, settling only the final piece. Pieces are parked far apart
    /// first so the solved edge can only occur on the last drop.
    fn assemble_at(puzzle: &mut PuzzleInstance, ox: f64, oy: f64) -> SolvedTransition {
        let grid = puzzle.grid();
        let slots: Vec<u32> = puzzle.pieces().iter().map(|p| p.slot).collect();
        for &slot in &slots {
            puzzle
                .move_piece(slot, 5000.0 + slot as f64 * 2000.0, 5000.0)
                .unwrap();
        }
        let (w, h) = {
            let first = &puzzle.pieces()[0];
            (first.width, first.height)
        };
        let mut last = SolvedTransition::NotSolved;
        for slot in slots {
            let (row, col) = grid.position_of(slot);
            puzzle
                .move_piece(slot, ox + col as f64 * w, oy + row as f64 * h)
                .unwrap();
            last = puzzle.drop_piece(slot).unwrap();
        }
        last
    }

    #[test]
    fn test_scenario_3x3_scatter_has_no_collisions() {
        // 3x3 at 50% scale in a 1000x800 viewport: nine equal pieces, all
        // placed collision-free by the first two tiers.
        let config = PuzzleConfig {
            rows: 3,
            cols: 3,
            scale_percent: 50.0,
            layout_mode: LayoutMode::FreePositioning,
        };
        let puzzle =
            PuzzleInstance::with_seed(image(), config, VIEWPORT, &mut StubCutter, 42).unwrap();
        let pieces = puzzle.pieces();
        assert_eq!(pieces.len(), 9);

        let (w, h) = (pieces[0].width, pieces[0].height);
        for piece in pieces {
            assert_eq!(piece.width, w);
            assert_eq!(piece.height, h);
        }
        for i in 0..9 {
            for j in 0..9 {
                if i != j {
                    assert!(!pieces[i]
                        .bounding_box()
                        .overlaps_padded(&pieces[j].bounding_box(), PADDING));
                }
            }
        }
    }

    #[test]
    fn test_assembling_fires_celebration_once() {
        let mut puzzle = free_puzzle(2, 2, 42);
        let celebration = RecordingCelebration::default();
        let calls = celebration.calls.clone();
        puzzle.set_celebration(Box::new(celebration));

        let last = assemble_at(&mut puzzle, 300.0, 250.0);
        assert_eq!(last, SolvedTransition::BecameSolved);
        assert!(puzzle.is_solved());

        // Exactly one schedule request, carrying the reveal and dismiss
        // delays.
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(
            calls.borrow()[0],
            (Duration::from_millis(100), Duration::from_millis(3000))
        );

        // Settling again without leaving solved does not re-trigger.
        assert_eq!(puzzle.drop_piece(0).unwrap(), SolvedTransition::StillSolved);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_move_ticks_have_no_side_effects() {
        let mut puzzle = free_puzzle(2, 2, 5);
        let celebration = RecordingCelebration::default();
        let calls = celebration.calls.clone();
        puzzle.set_celebration(Box::new(celebration));

        // Drag everything into place with move ticks only: the solved
        // reading updates but nothing is scheduled until a settle point.
        let grid = puzzle.grid();
        let (w, h) = (puzzle.pieces()[0].width, puzzle.pieces()[0].height);
        let slots: Vec<u32> = puzzle.pieces().iter().map(|p| p.slot).collect();
        let mut reading = false;
        for slot in slots {
            let (row, col) = grid.position_of(slot);
            reading = puzzle
                .move_piece(slot, 100.0 + col as f64 * w, 100.0 + row as f64 * h)
                .unwrap();
        }
        assert!(reading);
        assert!(calls.borrow().is_empty());

        assert_eq!(puzzle.drop_piece(0).unwrap(), SolvedTransition::BecameSolved);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_breaking_and_resolving_retriggers() {
        let mut puzzle = free_puzzle(2, 2, 9);
        let celebration = RecordingCelebration::default();
        let calls = celebration.calls.clone();
        puzzle.set_celebration(Box::new(celebration));

        assemble_at(&mut puzzle, 200.0, 200.0);
        assert_eq!(calls.borrow().len(), 1);

        // Drag a piece far away and settle: solved is left.
        puzzle.move_piece(3, 900.0, 40.0).unwrap();
        assert_eq!(puzzle.drop_piece(3).unwrap(), SolvedTransition::NotSolved);

        // Reassemble: a fresh edge, a second celebration.
        let last = assemble_at(&mut puzzle, 200.0, 200.0);
        assert_eq!(last, SolvedTransition::BecameSolved);
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_rotation_blocks_and_then_allows_completion() {
        let mut puzzle = free_puzzle(2, 2, 11);
        assemble_at(&mut puzzle, 150.0, 150.0);
        assert!(puzzle.is_solved());

        assert_eq!(
            puzzle.rotate_piece(1, 90.0).unwrap(),
            SolvedTransition::NotSolved
        );
        assert_eq!(
            puzzle.rotate_piece(1, 270.0).unwrap(),
            SolvedTransition::BecameSolved
        );
    }

    #[test]
    fn test_legacy_swap_solves_grid_puzzle() {
        let mut puzzle = grid_puzzle(2, 2, 3);
        let celebration = RecordingCelebration::default();
        let calls = celebration.calls.clone();
        puzzle.set_celebration(Box::new(celebration));

        // Make sure the sort below has work to do even if the shuffle dealt
        // the identity arrangement.
        if puzzle.is_solved() {
            puzzle.swap_pieces(0, 1).unwrap();
        }

        // Selection-sort the containers via the swap entry point: put slot
        // i into container i.
        for i in 0..puzzle.pieces().len() as u32 {
            let current = puzzle.pieces()[i as usize].slot;
            if current != i {
                puzzle.swap_pieces(current, i).unwrap();
            }
        }
        assert!(puzzle.is_solved());
        assert_eq!(calls.borrow().len(), 1);

        // Grid-mode pieces render 1:1 and sit in fixed cells.
        let pieces = puzzle.pieces();
        assert_eq!(pieces[0].width, 200.0);
        assert_eq!((pieces[1].x, pieces[1].y), (200.0, 0.0));
    }

    #[test]
    fn test_swap_requires_grid_mode() {
        let mut puzzle = free_puzzle(2, 2, 1);
        assert_eq!(
            puzzle.swap_pieces(0, 1),
            Err(PuzzleError::WrongLayoutMode {
                expected: LayoutMode::Grid
            })
        );
    }

    #[test]
    fn test_mutations_reject_unknown_slots() {
        let mut puzzle = free_puzzle(2, 2, 1);
        assert_eq!(
            puzzle.move_piece(9, 0.0, 0.0),
            Err(PuzzleError::UnknownSlot(9))
        );
        assert_eq!(puzzle.drop_piece(9), Err(PuzzleError::UnknownSlot(9)));
        assert_eq!(puzzle.rotate_piece(9, 90.0), Err(PuzzleError::UnknownSlot(9)));
    }

    #[test]
    fn test_invalid_config_creates_no_state() {
        let config = PuzzleConfig {
            rows: 0,
            ..PuzzleConfig::default()
        };
        let result = PuzzleInstance::new(image(), config, VIEWPORT, &mut StubCutter);
        assert!(matches!(result, Err(PuzzleError::InvalidConfig { .. })));
    }

    #[test]
    fn test_cutter_contract_violation_is_rejected() {
        let config = PuzzleConfig::default();
        let result = PuzzleInstance::new(image(), config, VIEWPORT, &mut ShortCutter);
        assert!(matches!(result, Err(PuzzleError::InvalidConfig { .. })));
    }

    #[test]
    fn test_auto_solve_anchors_at_current_position() {
        let mut puzzle = free_puzzle(3, 3, 21);
        let celebration = RecordingCelebration::default();
        let calls = celebration.calls.clone();
        puzzle.set_celebration(Box::new(celebration));

        // Park the anchor somewhere specific first.
        puzzle.move_piece(0, 400.0, 300.0).unwrap();
        puzzle.drop_piece(0).unwrap();

        assert_eq!(puzzle.solve(), SolvedTransition::BecameSolved);
        assert!(puzzle.is_solved());
        assert_eq!(calls.borrow().len(), 1);

        let anchor = puzzle.pieces().iter().find(|p| p.slot == 0).unwrap();
        assert_eq!((anchor.x, anchor.y), (400.0, 300.0));
    }

    #[test]
    fn test_reset_scatter_rearms_the_latch() {
        let mut puzzle = free_puzzle(2, 2, 17);
        let celebration = RecordingCelebration::default();
        let calls = celebration.calls.clone();
        puzzle.set_celebration(Box::new(celebration));

        assert_eq!(puzzle.solve(), SolvedTransition::BecameSolved);
        puzzle.reset_scatter();

        // A fresh scatter means a fresh edge on the next solve.
        assert_eq!(puzzle.solve(), SolvedTransition::BecameSolved);
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_slot_identity_is_permanent_outside_swap() {
        let mut puzzle = free_puzzle(2, 2, 13);
        puzzle.move_piece(2, 555.0, 111.0).unwrap();
        puzzle.drop_piece(2).unwrap();
        puzzle.rotate_piece(2, 123.0).unwrap();

        let mut slots: Vec<u32> = puzzle.pieces().iter().map(|p| p.slot).collect();
        slots.sort_unstable();
        assert_eq!(slots, vec![0, 1, 2, 3]);
    }
}
