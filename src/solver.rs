//! Backtracking search for tilings of a region.
//!
//! Key techniques:
//! - Packed word bitmasks for board occupancy and placements
//! - Most-constrained shape first: branch on the shape with the fewest
//!   placements still compatible with the board
//! - Identical copies of a shape use strictly increasing placement indices,
//!   so the `k!` orderings of `k` copies are explored once
//! - Checkerboard parity and bounding-box checks before any search
//! - Explicit stack instead of recursion, so depth is bounded by the heap
//!
//! Placements never overlap once applied, which makes XOR an exact undo.

use rustc_hash::FxHashMap;
use tracing::{debug, info, trace};

use crate::error::Result;
use crate::grid::{render_tiling, words_for, BoardMask};
use crate::parity::parity_feasible;
use crate::pieces::{Puzzle, Region, Shape};
use crate::placement::PlacementList;

/// What counts as a successful tiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fill {
    /// Every board cell is covered; demands with a different area fail.
    #[default]
    Exact,
    /// Pieces only have to fit without overlapping; cells may stay empty.
    Pack,
}

/// Knobs for region solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverOptions {
    pub fill: Fill,
    /// Run the checkerboard bound before searching.
    pub parity_prune: bool,
    /// Solve identical regions only once per puzzle.
    pub memoize: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            fill: Fill::Exact,
            parity_prune: true,
            memoize: true,
        }
    }
}

/// One piece of a found tiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedPiece {
    /// Shape id.
    pub shape: usize,
    /// Index into the shape's placement list for this board.
    pub placement: usize,
    /// Occupied cells of the board.
    pub mask: Vec<u64>,
}

/// A witness that a region's demand fits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tiling {
    pub width: usize,
    pub height: usize,
    /// Pieces in the order the search placed them.
    pub pieces: Vec<PlacedPiece>,
}

impl Tiling {
    fn empty(region: &Region) -> Self {
        Self {
            width: region.width,
            height: region.height,
            pieces: Vec::new(),
        }
    }

    /// Draws the tiling with one letter per piece.
    pub fn render(&self) -> String {
        render_tiling(
            self.width,
            self.height,
            self.pieces.iter().map(|piece| piece.mask.as_slice()),
        )
    }
}

/// Searches for a tiling of `region` by copies of `shapes`.
///
/// Returns `Ok(None)` for infeasible regions; errors only when placement
/// storage cannot be allocated.
pub fn solve_region(
    shapes: &[Shape],
    region: &Region,
    options: &SolverOptions,
) -> Result<Option<Tiling>> {
    let area_sum = region.area_sum(shapes);
    let board = region.cells();

    if area_sum == 0 {
        return Ok(Some(Tiling::empty(region)));
    }
    if area_sum > board {
        trace!(area_sum, board, "demand exceeds board");
        return Ok(None);
    }
    if options.fill == Fill::Exact && area_sum != board {
        trace!(area_sum, board, "demand does not cover board");
        return Ok(None);
    }
    if options.parity_prune && !parity_feasible(shapes, region, area_sum) {
        return Ok(None);
    }

    let oversized = shapes
        .iter()
        .find(|shape| region.count(shape.id) > 0 && !shape.fits(region.width, region.height));
    if let Some(shape) = oversized {
        trace!(shape = shape.id, "shape fits in no orientation");
        return Ok(None);
    }

    let Some(mut search) = Search::new(shapes, region, area_sum)? else {
        return Ok(None);
    };
    let tiling = search.run().map(|chosen| Tiling {
        width: region.width,
        height: region.height,
        pieces: chosen
            .into_iter()
            .map(|(shape, placement)| PlacedPiece {
                shape,
                placement,
                mask: search.placements[shape].mask(placement).to_vec(),
            })
            .collect(),
    });
    Ok(tiling)
}

/// Whether `region` admits a tiling.
pub fn is_tileable(shapes: &[Shape], region: &Region, options: &SolverOptions) -> Result<bool> {
    Ok(solve_region(shapes, region, options)?.is_some())
}

/// Counts the regions of `puzzle` that admit a tiling.
pub fn count_tileable(puzzle: &Puzzle, options: &SolverOptions) -> Result<usize> {
    let mut cache: FxHashMap<&Region, bool> = FxHashMap::default();
    let mut tileable = 0;

    for (index, region) in puzzle.regions.iter().enumerate() {
        let verdict = match cache.get(region) {
            Some(&verdict) if options.memoize => {
                trace!(index, "cached region");
                verdict
            }
            _ => {
                let verdict = is_tileable(&puzzle.shapes, region, options)?;
                if options.memoize {
                    cache.insert(region, verdict);
                }
                verdict
            }
        };
        debug!(
            index,
            width = region.width,
            height = region.height,
            verdict,
            "region solved"
        );
        tileable += usize::from(verdict);
    }

    info!(
        regions = puzzle.regions.len(),
        tileable,
        distinct = cache.len(),
        "puzzle solved"
    );
    Ok(tileable)
}

/// One level of the explicit search stack: a copy of `shape` being placed.
#[derive(Debug, Clone, Copy)]
struct Frame {
    shape: usize,
    /// `last[shape]` before this frame, restored when it is popped.
    saved_last: Option<usize>,
    /// Next placement index to try.
    next: usize,
    /// Placement currently on the board, if any.
    applied: Option<usize>,
}

/// Mutable search state for one region.
struct Search {
    /// Placement lists indexed by shape; empty for shapes not demanded.
    placements: Vec<PlacementList>,
    area: Vec<usize>,
    need: Vec<usize>,
    /// Placement index used by the most recent copy of each shape.
    last: Vec<Option<usize>>,
    occupied: BoardMask,
    area_sum: usize,
    remaining_area: usize,
    free_cells: usize,
}

impl Search {
    /// Builds placements for every demanded shape.
    ///
    /// Returns `Ok(None)` when a demanded shape has no placement at all.
    fn new(shapes: &[Shape], region: &Region, area_sum: usize) -> Result<Option<Self>> {
        let words = words_for(region.cells());
        let mut placements = Vec::with_capacity(shapes.len());

        for shape in shapes {
            if region.count(shape.id) == 0 {
                placements.push(PlacementList::default());
                continue;
            }
            let list = PlacementList::build(shape, region.width, region.height, words)?;
            trace!(shape = shape.id, placements = list.len(), "placements built");
            if list.is_empty() {
                return Ok(None);
            }
            placements.push(list);
        }

        Ok(Some(Self {
            placements,
            area: shapes.iter().map(Shape::area).collect(),
            need: shapes.iter().map(|shape| region.count(shape.id)).collect(),
            last: vec![None; shapes.len()],
            occupied: BoardMask::new(words),
            area_sum,
            remaining_area: area_sum,
            free_cells: region.cells(),
        }))
    }

    /// First placement of `shape` at or after `from` that fits the board.
    #[inline]
    fn next_fit(&self, shape: usize, from: usize) -> Option<usize> {
        let list = &self.placements[shape];
        (from..list.len()).find(|&index| !self.occupied.overlaps(list.mask(index)))
    }

    /// Compatible placements of `shape` after its last used index, counting
    /// no further than `limit`.
    fn count_fits(&self, shape: usize, limit: usize) -> usize {
        let start = self.last[shape].map_or(0, |index| index + 1);
        self.placements[shape]
            .iter()
            .skip(start)
            .filter(|mask| !self.occupied.overlaps(mask))
            .take(limit)
            .count()
    }

    /// Picks the demanded shape with the fewest compatible placements.
    ///
    /// Returns `None` when some demanded shape can no longer be placed.
    fn choose_shape(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;

        for shape in 0..self.need.len() {
            if self.need[shape] == 0 {
                continue;
            }
            let limit = best.map_or(usize::MAX, |(_, count)| count);
            let count = self.count_fits(shape, limit);
            if count == 0 {
                return None;
            }
            if count < limit {
                best = Some((shape, count));
                if count == 1 {
                    break;
                }
            }
        }

        best.map(|(shape, _)| shape)
    }

    fn place(&mut self, shape: usize, index: usize) {
        self.occupied.apply(self.placements[shape].mask(index));
        self.free_cells -= self.area[shape];
        self.remaining_area -= self.area[shape];
        self.need[shape] -= 1;
        self.last[shape] = Some(index);
    }

    fn retract(&mut self, shape: usize, index: usize) {
        self.occupied.unapply(self.placements[shape].mask(index));
        self.free_cells += self.area[shape];
        self.remaining_area += self.area[shape];
        self.need[shape] += 1;
    }

    /// Runs the search to completion.
    ///
    /// On success returns the `(shape, placement)` pairs in placement order.
    /// Either way the state is back to its initial values afterwards.
    fn run(&mut self) -> Option<Vec<(usize, usize)>> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut descend = true;

        let solved = loop {
            if descend {
                debug_assert_eq!(
                    self.occupied.count_ones() + self.remaining_area,
                    self.area_sum
                );
                if self.remaining_area == 0 {
                    break true;
                }
                if self.remaining_area <= self.free_cells {
                    if let Some(shape) = self.choose_shape() {
                        let saved_last = self.last[shape];
                        stack.push(Frame {
                            shape,
                            saved_last,
                            next: saved_last.map_or(0, |index| index + 1),
                            applied: None,
                        });
                    }
                }
            }

            // advance the deepest open frame to its next compatible placement
            let Some(frame) = stack.last_mut() else {
                break false;
            };
            if let Some(index) = frame.applied.take() {
                self.retract(frame.shape, index);
            }
            match self.next_fit(frame.shape, frame.next) {
                Some(index) => {
                    self.place(frame.shape, index);
                    frame.applied = Some(index);
                    frame.next = index + 1;
                    descend = true;
                }
                None => {
                    self.last[frame.shape] = frame.saved_last;
                    stack.pop();
                    descend = false;
                }
            }
        };

        let chosen = solved.then(|| {
            stack
                .iter()
                .filter_map(|frame| frame.applied.map(|index| (frame.shape, index)))
                .collect()
        });

        while let Some(frame) = stack.pop() {
            if let Some(index) = frame.applied {
                self.retract(frame.shape, index);
            }
            self.last[frame.shape] = frame.saved_last;
        }

        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::count_ones;
    use proptest::prelude::*;

    fn count(input: &str) -> usize {
        let puzzle = Puzzle::parse(input).unwrap();
        count_tileable(&puzzle, &SolverOptions::default()).unwrap()
    }

    fn pack() -> SolverOptions {
        SolverOptions {
            fill: Fill::Pack,
            ..SolverOptions::default()
        }
    }

    fn solve(input: &str, options: &SolverOptions) -> Option<Tiling> {
        let puzzle = Puzzle::parse(input).unwrap();
        solve_region(&puzzle.shapes, &puzzle.regions[0], options).unwrap()
    }

    #[test]
    fn test_single_monomino() {
        assert_eq!(count("0:\n#\n\n1x1: 1\n"), 1);
    }

    #[test]
    fn test_two_dominoes_fill_square() {
        assert_eq!(count("0:\n##\n\n2x2: 2\n"), 1);
    }

    #[test]
    fn test_l_tromino_cannot_fill_square() {
        assert_eq!(count("0:\n#.\n##\n\n2x2: 1\n"), 0);
    }

    #[test]
    fn test_monominoes_and_domino() {
        assert_eq!(count("0:\n#\n\n1:\n##\n\n2x2: 2 1\n"), 1);
    }

    #[test]
    fn test_dominoes_leave_a_cell_on_odd_board() {
        assert_eq!(count("0:\n##\n\n3x3: 4\n"), 0);
    }

    #[test]
    fn test_pack_allows_empty_cells() {
        assert!(solve("0:\n##\n\n3x3: 4\n", &pack()).is_some());
        assert!(solve("0:\n#.\n##\n\n2x2: 1\n", &pack()).is_some());
        assert!(solve("0:\n##\n\n3x3: 5\n", &pack()).is_none());
    }

    #[test]
    fn test_empty_demand_is_tileable() {
        let tiling = solve("0:\n###\n\n2x2: 0\n", &SolverOptions::default()).unwrap();
        assert!(tiling.pieces.is_empty());
        assert_eq!(tiling.render(), "..\n..\n");
    }

    #[test]
    fn test_oversized_shape_is_infeasible() {
        assert_eq!(count("0:\n####\n\n1:\n#\n\n2x2: 1 0\n"), 0);
        assert!(solve("0:\n####\n\n3x3: 1\n", &pack()).is_none());
    }

    #[test]
    fn test_pentomino_rectangle() {
        // two P pentominoes tile a 2x5 rectangle
        let input = "0:\n##\n##\n#.\n\n2x5: 2\n5x2: 2\n";
        assert_eq!(count(input), 2);
    }

    #[test]
    fn test_parity_rejects_t_tetrominoes() {
        // three Ts and two squares match the 4x5 area, but the Ts leave an
        // odd colour imbalance of at least 2
        let input = "0:\n###\n.#.\n\n1:\n##\n##\n\n4x5: 3 2\n";
        let puzzle = Puzzle::parse(input).unwrap();
        let region = &puzzle.regions[0];
        assert!(!parity_feasible(&puzzle.shapes, region, region.area_sum(&puzzle.shapes)));
        assert_eq!(count(input), 0);
    }

    #[test]
    fn test_identical_regions_use_cache() {
        let input = "0:\n##\n\n2x2: 2\n2x2: 2\n3x3: 4\n2x2: 2\n";
        let puzzle = Puzzle::parse(input).unwrap();
        let cached = count_tileable(&puzzle, &SolverOptions::default()).unwrap();
        let uncached = count_tileable(
            &puzzle,
            &SolverOptions {
                memoize: false,
                ..SolverOptions::default()
            },
        )
        .unwrap();
        assert_eq!(cached, 3);
        assert_eq!(uncached, 3);
    }

    #[test]
    fn test_tiling_covers_board_exactly() {
        let tiling = solve("0:\n#.\n##\n\n1:\n###\n\n3x3: 2 1\n", &SolverOptions::default())
            .unwrap();
        let mut union = vec![0u64; 1];
        for piece in &tiling.pieces {
            assert_eq!(union[0] & piece.mask[0], 0);
            union[0] |= piece.mask[0];
        }
        assert_eq!(count_ones(&union), 9);
    }

    #[test]
    fn test_render_tiling_snapshot() {
        let tiling = solve("0:\n##\n\n2x2: 2\n", &SolverOptions::default()).unwrap();
        insta::assert_snapshot!(tiling.render(), @r"
        AA
        BB
        ");
    }

    #[test]
    fn test_search_state_is_restored() {
        let puzzle = Puzzle::parse("0:\n#.\n##\n\n1:\n#\n\n3x3: 2 3\n4x4: 5 1\n").unwrap();
        for region in &puzzle.regions {
            let area_sum = region.area_sum(&puzzle.shapes);
            let mut search = Search::new(&puzzle.shapes, region, area_sum)
                .unwrap()
                .unwrap();
            let need = search.need.clone();
            let _ = search.run();
            assert!(search.occupied.is_empty());
            assert_eq!(search.need, need);
            assert!(search.last.iter().all(Option::is_none));
            assert_eq!(search.remaining_area, area_sum);
            assert_eq!(search.free_cells, region.cells());
        }
    }

    #[test]
    fn test_repeat_solves_agree() {
        let input = "0:\n###\n#..\n\n1:\n##\n\n4x4: 2 4\n";
        let first = solve(input, &SolverOptions::default());
        let second = solve(input, &SolverOptions::default());
        assert_eq!(first, second);
    }

    const GLYPHS: [&str; 5] = ["#", "##", "###", "#.\n##", "##\n##"];

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_parity_bound_is_sound(
            counts in prop::collection::vec(0..4usize, GLYPHS.len()),
            width in 1..5usize,
            height in 1..5usize,
            exact in any::<bool>(),
        ) {
            let shapes: Vec<Shape> = GLYPHS
                .iter()
                .enumerate()
                .map(|(id, glyphs)| Shape::from_glyphs(id, glyphs).unwrap())
                .collect();
            let region = Region { width, height, counts };
            let fill = if exact { Fill::Exact } else { Fill::Pack };

            let with_prune = SolverOptions { fill, parity_prune: true, memoize: false };
            let without_prune = SolverOptions { fill, parity_prune: false, memoize: false };

            let pruned = is_tileable(&shapes, &region, &with_prune).unwrap();
            let exhaustive = is_tileable(&shapes, &region, &without_prune).unwrap();
            prop_assert_eq!(pruned, exhaustive);

            let area_sum = region.area_sum(&shapes);
            if area_sum <= region.cells() && !parity_feasible(&shapes, &region, area_sum) {
                prop_assert!(!exhaustive);
            }
        }
    }
}
