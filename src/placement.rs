//! Enumeration of every in-bounds placement of a shape on a board.

use std::collections::TryReserveError;

use crate::grid::{cell_index, set_bit, MAX_BOARD_WORDS};
use crate::pieces::Shape;

/// Placement masks of one shape, stored back to back.
///
/// Mask `i` occupies `data[i * words..(i + 1) * words]`. Order is
/// (orientation, y0, x0); the search relies on it being fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementList {
    words: usize,
    data: Vec<u64>,
}

impl PlacementList {
    /// Builds all placements of `shape` on a `width` x `height` board.
    ///
    /// Orientations whose bounding box exceeds the board are skipped, so a
    /// shape that fits in no orientation yields an empty list.
    pub fn build(
        shape: &Shape,
        width: usize,
        height: usize,
        words: usize,
    ) -> Result<Self, TryReserveError> {
        debug_assert!(words <= MAX_BOARD_WORDS);
        let mut list = Self {
            words,
            data: Vec::new(),
        };
        let mut scratch = [0u64; MAX_BOARD_WORDS];
        let scratch = &mut scratch[..words];

        for orientation in &shape.orientations {
            if orientation.width() > width || orientation.height() > height {
                continue;
            }

            for y0 in 0..=height - orientation.height() {
                for x0 in 0..=width - orientation.width() {
                    scratch.fill(0);
                    for &(x, y) in orientation.cells() {
                        set_bit(scratch, cell_index(width, x0 + x as usize, y0 + y as usize));
                    }
                    list.push(scratch)?;
                }
            }
        }

        Ok(list)
    }

    fn push(&mut self, mask: &[u64]) -> Result<(), TryReserveError> {
        self.data.try_reserve(mask.len())?;
        self.data.extend_from_slice(mask);
        Ok(())
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        if self.words == 0 {
            0
        } else {
            self.data.len() / self.words
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mask of placement `index`.
    #[inline(always)]
    pub fn mask(&self, index: usize) -> &[u64] {
        &self.data[index * self.words..(index + 1) * self.words]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u64]> {
        self.data.chunks_exact(self.words.max(1))
    }
}
