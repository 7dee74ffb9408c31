//! Planar polyomino transformations.
//!
//! A square has 8 symmetries (the dihedral group D4): 4 rotations of the
//! base shape and 4 rotations of its mirror image.

use rustc_hash::FxHashSet;

/// A lattice cell as `(x, y)`; `y` grows downwards, matching glyph rows.
pub type Cell = (i32, i32);

/// All 8 symmetries of the square, in enumeration order.
///
/// - Transforms 0-3: rotations by 0, 90, 180 and 270 degrees
/// - Transforms 4-7: the x-mirrored base, then rotated the same way
///
/// A single rotation step is `(x, y) -> (y, -x)`; the mirror is
/// `(x, y) -> (-x, y)`. Each entry is the composition applied in one go,
/// which agrees with stepwise application up to translation.
pub const TRANSFORMS: [fn(Cell) -> Cell; 8] = [
    |(x, y)| (x, y),
    |(x, y)| (y, -x),
    |(x, y)| (-x, -y),
    |(x, y)| (-y, x),
    |(x, y)| (-x, y),
    |(x, y)| (y, x),
    |(x, y)| (x, -y),
    |(x, y)| (-y, -x),
];

/// A set of cells in canonical form.
///
/// Canonical means translated so the minimum x and y are zero, with cells
/// sorted by `(y, x)`. Equality of canonical forms is polyomino equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Polyomino {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl Polyomino {
    /// Builds the canonical form of an arbitrary cell set.
    ///
    /// Duplicate cells collapse into one.
    pub fn new(cells: Vec<Cell>) -> Self {
        let min_x = cells.iter().map(|&(x, _)| x).min().unwrap_or(0);
        let min_y = cells.iter().map(|&(_, y)| y).min().unwrap_or(0);
        let max_x = cells.iter().map(|&(x, _)| x).max().unwrap_or(-1);
        let max_y = cells.iter().map(|&(_, y)| y).max().unwrap_or(-1);

        let mut cells: Vec<Cell> = cells
            .into_iter()
            .map(|(x, y)| (x - min_x, y - min_y))
            .collect();
        cells.sort_unstable_by_key(|&(x, y)| (y, x));
        cells.dedup();

        Self {
            cells,
            width: (max_x - min_x + 1).max(0) as usize,
            height: (max_y - min_y + 1).max(0) as usize,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Bounding-box width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bounding-box height.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Applies one symmetry and renormalises.
    pub fn transform(&self, transform: fn(Cell) -> Cell) -> Self {
        Self::new(self.cells.iter().map(|&cell| transform(cell)).collect())
    }

    /// Quarter turn, `(x, y) -> (y, -x)`.
    pub fn rot90(&self) -> Self {
        self.transform(TRANSFORMS[1])
    }

    /// Mirror across the vertical axis, `(x, y) -> (-x, y)`.
    pub fn flip_x(&self) -> Self {
        self.transform(TRANSFORMS[4])
    }

    /// Generates all distinct orientations of this polyomino.
    ///
    /// Applies the 8 symmetries in `TRANSFORMS` order and keeps the first
    /// occurrence of each canonical form, so the result is stable across
    /// runs and always starts with the base itself. Symmetric shapes give
    /// 1, 2 or 4 members instead of 8.
    pub fn orientations(&self) -> Vec<Polyomino> {
        let mut seen: FxHashSet<Polyomino> = FxHashSet::default();
        let mut orientations = Vec::with_capacity(TRANSFORMS.len());

        for transform in TRANSFORMS {
            let candidate = self.transform(transform);
            if seen.insert(candidate.clone()) {
                orientations.push(candidate);
            }
        }

        orientations
    }

    /// Counts cells on each checkerboard colour as `(black, white)`.
    ///
    /// A cell is black when `x + y` is even, so `(0, 0)` is black.
    pub fn colour_counts(&self) -> (usize, usize) {
        let black = self
            .cells
            .iter()
            .filter(|&&(x, y)| (x + y).rem_euclid(2) == 0)
            .count();
        (black, self.cells.len() - black)
    }
}
