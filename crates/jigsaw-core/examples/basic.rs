//! Basic example of driving the puzzle engine without a UI

use std::time::Duration;

use jigsaw_core::{
    BitmapHandle, CelebrationSchedule, GridShape, ImageCutter, ImageHandle, ImageInfo, LayoutMode,
    PuzzleConfig, PuzzleInstance, Viewport,
};

/// Stands in for a real image-cutting backend: one opaque handle per slot.
struct StubCutter;

impl ImageCutter for StubCutter {
    fn cut(&mut self, _image: ImageInfo, grid: GridShape) -> Vec<BitmapHandle> {
        (0..grid.piece_count() as u64).map(BitmapHandle).collect()
    }
}

struct PrintCelebration;

impl CelebrationSchedule for PrintCelebration {
    fn on_solved(&mut self, reveal_after: Duration, dismiss_after: Duration) {
        println!(
            "Solved! Celebration in {}ms, dismissed after {}ms.",
            reveal_after.as_millis(),
            dismiss_after.as_millis()
        );
    }
}

fn main() {
    // A 3x3 free-positioning puzzle over a 1200x900 image
    println!("Creating a 3x3 puzzle...\n");
    let image = ImageInfo::new(ImageHandle(1), 1200.0, 900.0);
    let config = PuzzleConfig {
        rows: 3,
        cols: 3,
        scale_percent: 100.0,
        layout_mode: LayoutMode::FreePositioning,
    };
    let viewport = Viewport::new(1280.0, 720.0);

    let mut puzzle = match PuzzleInstance::with_seed(image, config, viewport, &mut StubCutter, 42) {
        Ok(puzzle) => puzzle,
        Err(err) => {
            eprintln!("Failed to create puzzle: {err}");
            return;
        }
    };
    puzzle.set_celebration(Box::new(PrintCelebration));

    println!("Scattered pieces:");
    for piece in puzzle.pieces() {
        println!(
            "  slot {} at ({:.0}, {:.0}), {:.0}x{:.0}",
            piece.slot, piece.x, piece.y, piece.width, piece.height
        );
    }
    println!("Solved: {}\n", puzzle.is_solved());

    // Drag one piece around
    println!("Dragging piece 4 to the center...");
    if let Err(err) = puzzle.move_piece(4, 600.0, 350.0) {
        eprintln!("Move failed: {err}");
        return;
    }
    match puzzle.drop_piece(4) {
        Ok(transition) => println!("Dropped. Transition: {transition:?}\n"),
        Err(err) => {
            eprintln!("Drop failed: {err}");
            return;
        }
    }

    // Let the engine finish the job
    println!("Auto-solving...");
    let transition = puzzle.solve();
    println!("Transition: {transition:?}");
    println!("Solved: {}\n", puzzle.is_solved());

    println!("Final layout:");
    for piece in puzzle.pieces() {
        println!("  slot {} at ({:.0}, {:.0})", piece.slot, piece.x, piece.y);
    }
}
