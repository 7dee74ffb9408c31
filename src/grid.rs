//! Packed board representation for rectangular regions.
//!
//! Cell `(x, y)` of a `W`x`H` board is bit `y * W + x`, stored across
//! `ceil(W * H / 64)` little-endian `u64` words. All mask operations work a
//! whole word at a time.

/// Largest supported mask length in words, i.e. boards of up to 4096 cells.
pub const MAX_BOARD_WORDS: usize = 64;

/// Number of bits in one mask word.
const WORD_BITS: usize = u64::BITS as usize;

/// Piece labels used by `render_tiling`, cycled when a board has more pieces.
const LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Words needed to hold `cells` bits.
#[inline(always)]
pub const fn words_for(cells: usize) -> usize {
    cells.div_ceil(WORD_BITS)
}

/// Converts board coordinates to a bit index.
#[inline(always)]
pub const fn cell_index(width: usize, x: usize, y: usize) -> usize {
    y * width + x
}

/// Sets bit `index` in a raw mask.
#[inline(always)]
pub fn set_bit(mask: &mut [u64], index: usize) {
    mask[index / WORD_BITS] |= 1 << (index % WORD_BITS);
}

/// Tests bit `index` in a raw mask.
#[inline(always)]
pub fn test_bit(mask: &[u64], index: usize) -> bool {
    mask[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
}

/// Population count of a raw mask.
#[inline]
pub fn count_ones(mask: &[u64]) -> usize {
    mask.iter().map(|word| word.count_ones() as usize).sum()
}

/// Occupancy of one board during search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardMask {
    words: Vec<u64>,
}

impl BoardMask {
    /// An empty board of `words` mask words.
    pub fn new(words: usize) -> Self {
        Self {
            words: vec![0; words],
        }
    }

    /// Whether any cell of `mask` is already occupied.
    #[inline(always)]
    pub fn overlaps(&self, mask: &[u64]) -> bool {
        self.words
            .iter()
            .zip(mask)
            .any(|(occupied, placed)| occupied & placed != 0)
    }

    /// Marks every cell of `mask` as occupied.
    #[inline(always)]
    pub fn apply(&mut self, mask: &[u64]) {
        for (occupied, placed) in self.words.iter_mut().zip(mask) {
            *occupied |= placed;
        }
    }

    /// Clears a mask previously passed to `apply`.
    ///
    /// XOR is exact here because applied masks never overlap.
    #[inline(always)]
    pub fn unapply(&mut self, mask: &[u64]) {
        for (occupied, placed) in self.words.iter_mut().zip(mask) {
            *occupied ^= placed;
        }
    }

    pub fn count_ones(&self) -> usize {
        count_ones(&self.words)
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }
}

/// Formats a tiling as a human-readable string.
///
/// Each mask in `pieces` is drawn with its own letter (`A`-`Z`, then
/// `a`-`z`, cycling), one text row per board row. Uncovered cells show as
/// `.`.
pub fn render_tiling<'a>(
    width: usize,
    height: usize,
    pieces: impl IntoIterator<Item = &'a [u64]>,
) -> String {
    let mut board = vec![b'.'; width * height];

    for (ordinal, mask) in pieces.into_iter().enumerate() {
        let label = LABELS[ordinal % LABELS.len()];
        for (index, cell) in board.iter_mut().enumerate() {
            if test_bit(mask, index) {
                *cell = label;
            }
        }
    }

    let mut output = String::with_capacity((width + 1) * height);
    for row in board.chunks(width.max(1)) {
        output.extend(row.iter().map(|&b| char::from(b)));
        output.push('\n');
    }
    output
}
