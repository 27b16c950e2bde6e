use crate::{Point, Rect, Viewport};

/// Minimum clearance enforced between two placed piece bounding boxes.
pub const PADDING: f64 = 20.0;

/// Clearance kept between a piece and the viewport edge.
const EDGE_MARGIN: f64 = 20.0;

/// Spacing of perimeter candidates along each viewport edge.
const PERIMETER_STEP: f64 = 80.0;
/// Jitter applied along the edge so the ring doesn't look mechanical.
const PERIMETER_JITTER_TANGENTIAL: f64 = 15.0;
/// Jitter applied inward from the edge.
const PERIMETER_JITTER_NORMAL: f64 = 20.0;

/// Extra clearance added to each pseudo-grid cell.
const GRID_CELL_SLACK: f64 = 60.0;
const GRID_JITTER: f64 = 20.0;

/// Bounded random-search attempts before accepting an overlapping spot.
const RANDOM_ATTEMPTS: usize = 80;

/// Finds scattered, non-overlapping initial positions for pieces.
///
/// Three tiers are tried in order: perimeter candidates first (keeping the
/// center clear as the player's working area), then a coarse jittered
/// pseudo-grid, then bounded uniform random search. Placement never fails;
/// if every random attempt collides the last sample is returned and the
/// overlap is accepted as a degradation, not an error.
pub struct ScatterPlacer {
    viewport: Viewport,
    rng: SimpleRng,
}

impl ScatterPlacer {
    /// Create a placer seeded from the operating environment.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            rng: SimpleRng::new(),
        }
    }

    /// Create a placer with a fixed seed for reproducible layouts.
    pub fn with_seed(viewport: Viewport, seed: u64) -> Self {
        Self {
            viewport,
            rng: SimpleRng::with_seed(seed),
        }
    }

    /// Find a position for a `piece_w x piece_h` piece that clears every box
    /// in `already_placed` by [`PADDING`] and lies within the viewport
    /// margins.
    pub fn place(&mut self, piece_w: f64, piece_h: f64, already_placed: &[Rect]) -> Point {
        if let Some(point) = self.try_perimeter(piece_w, piece_h, already_placed) {
            return point;
        }
        if let Some(point) = self.try_pseudo_grid(piece_w, piece_h, already_placed) {
            return point;
        }
        self.random_search(piece_w, piece_h, already_placed)
    }

    /// Largest legal x for a piece of the given width.
    fn max_x(&self, piece_w: f64) -> f64 {
        (self.viewport.width - piece_w - EDGE_MARGIN).max(EDGE_MARGIN)
    }

    fn max_y(&self, piece_h: f64) -> f64 {
        (self.viewport.height - piece_h - EDGE_MARGIN).max(EDGE_MARGIN)
    }

    fn collides(candidate: &Rect, placed: &[Rect]) -> bool {
        placed.iter().any(|b| candidate.overlaps_padded(b, PADDING))
    }

    /// Tier 1: jittered candidates along the four viewport edges, in
    /// shuffled order.
    fn try_perimeter(&mut self, piece_w: f64, piece_h: f64, placed: &[Rect]) -> Option<Point> {
        let max_x = self.max_x(piece_w);
        let max_y = self.max_y(piece_h);

        // Base positions first; jitter is applied per candidate below.
        let mut bases: Vec<(f64, f64, Edge)> = Vec::new();
        let mut x = EDGE_MARGIN;
        while x <= max_x {
            bases.push((x, EDGE_MARGIN, Edge::Top));
            bases.push((x, max_y, Edge::Bottom));
            x += PERIMETER_STEP;
        }
        let mut y = EDGE_MARGIN;
        while y <= max_y {
            bases.push((EDGE_MARGIN, y, Edge::Left));
            bases.push((max_x, y, Edge::Right));
            y += PERIMETER_STEP;
        }

        self.shuffle(&mut bases);

        for (bx, by, edge) in bases {
            let tangential = self
                .rng
                .next_range(-PERIMETER_JITTER_TANGENTIAL, PERIMETER_JITTER_TANGENTIAL);
            let normal = self.rng.next_range(0.0, PERIMETER_JITTER_NORMAL);
            let (cx, cy) = match edge {
                Edge::Top => (bx + tangential, by + normal),
                Edge::Bottom => (bx + tangential, by - normal),
                Edge::Left => (bx + normal, by + tangential),
                Edge::Right => (bx - normal, by + tangential),
            };
            let point = Point::new(clamp_coord(cx, max_x), clamp_coord(cy, max_y));
            let candidate = Rect::new(point.x, point.y, piece_w, piece_h);
            if !Self::collides(&candidate, placed) {
                return Some(point);
            }
        }
        None
    }

    /// Tier 2: coarse grid of cells sized `piece + slack`, shuffled, with
    /// per-cell jitter.
    fn try_pseudo_grid(&mut self, piece_w: f64, piece_h: f64, placed: &[Rect]) -> Option<Point> {
        let cell_w = piece_w + GRID_CELL_SLACK;
        let cell_h = piece_h + GRID_CELL_SLACK;
        let usable_w = self.viewport.width - 2.0 * EDGE_MARGIN;
        let usable_h = self.viewport.height - 2.0 * EDGE_MARGIN;
        let cols = (usable_w / cell_w).floor() as usize;
        let rows = (usable_h / cell_h).floor() as usize;

        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push((row, col));
            }
        }
        self.shuffle(&mut cells);

        let max_x = self.max_x(piece_w);
        let max_y = self.max_y(piece_h);
        for (row, col) in cells {
            let jx = self.rng.next_range(-GRID_JITTER, GRID_JITTER);
            let jy = self.rng.next_range(-GRID_JITTER, GRID_JITTER);
            let point = Point::new(
                clamp_coord(EDGE_MARGIN + col as f64 * cell_w + jx, max_x),
                clamp_coord(EDGE_MARGIN + row as f64 * cell_h + jy, max_y),
            );
            let candidate = Rect::new(point.x, point.y, piece_w, piece_h);
            if !Self::collides(&candidate, placed) {
                return Some(point);
            }
        }
        None
    }

    /// Tier 3: bounded uniform sampling. Returns the last sample even if it
    /// collides.
    fn random_search(&mut self, piece_w: f64, piece_h: f64, placed: &[Rect]) -> Point {
        let max_x = self.max_x(piece_w);
        let max_y = self.max_y(piece_h);
        let mut last = Point::new(EDGE_MARGIN, EDGE_MARGIN);
        for _ in 0..RANDOM_ATTEMPTS {
            let point = Point::new(
                self.rng.next_range(EDGE_MARGIN, max_x),
                self.rng.next_range(EDGE_MARGIN, max_y),
            );
            let candidate = Rect::new(point.x, point.y, piece_w, piece_h);
            if !Self::collides(&candidate, placed) {
                return point;
            }
            last = point;
        }
        last
    }

    /// Fisher-Yates shuffle over a candidate list.
    pub(crate) fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.rng.next_usize(i + 1);
            slice.swap(i, j);
        }
    }
}

#[derive(Clone, Copy)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

fn clamp_coord(v: f64, max: f64) -> f64 {
    if max <= EDGE_MARGIN {
        EDGE_MARGIN
    } else {
        v.clamp(EDGE_MARGIN, max)
    }
}

/// Simple PRNG, seeded via getrandom so it works under wasm as well.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new() -> Self {
        let mut seed_bytes = [0u8; 8];
        getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|_| {
            // Fallback: use a static counter if getrandom fails
            static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            seed_bytes = counter.to_le_bytes();
        });
        let seed = u64::from_le_bytes(seed_bytes);
        Self::with_seed(seed)
    }

    fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        // PCG-like PRNG
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
        let rot = (self.state >> 59) as u32;
        (xorshifted.rotate_right(rot)) as u64
    }

    fn next_usize(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }

    fn next_f64(&mut self) -> f64 {
        // next_u64 yields 32 random bits
        self.next_u64() as f64 / (1u64 << 32) as f64
    }

    fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }
}
