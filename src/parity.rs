//! Checkerboard colouring bound on a region's demand.
//!
//! Colour cell `(x, y)` black when `x + y` is even. A board of `n` cells has
//! `ceil(n / 2)` black and `floor(n / 2)` white cells. A piece with colour
//! counts `(b, w)` in its base orientation covers either `(b, w)` or `(w, b)`
//! wherever it lands, so its signed imbalance is `+d` or `-d` with
//! `d = |b - w|`. The demand can only fit if some choice of signs keeps
//! both colour totals within the board's capacities.
//!
//! Choosing signs is a subset sum: with `D` the sum of all `d`, flipping a
//! subset whose imbalances sum to `t` gives a total of `D - 2t`. Reachable
//! values of `t` are tracked in a shift-or bitset.

use tracing::debug;

use crate::pieces::{Region, Shape};

/// Returns `false` only if no tiling of `region` can exist.
///
/// Passing says nothing about feasibility. `area_sum` must be the region's
/// total demanded area and must not exceed the board. If the subset-sum
/// table cannot be allocated the bound is skipped and `true` is returned.
pub fn parity_feasible(shapes: &[Shape], region: &Region, area_sum: usize) -> bool {
    let board = region.cells();
    let black_capacity = board.div_ceil(2);
    let white_capacity = board / 2;

    let imbalances: Vec<(usize, usize)> = shapes
        .iter()
        .map(|shape| (shape.imbalance(), region.count(shape.id)))
        .filter(|&(d, count)| d > 0 && count > 0)
        .collect();
    // bounded by area_sum since d never exceeds a shape's area
    let total: usize = imbalances.iter().map(|&(d, count)| d * count).sum();

    let mut reachable: Vec<u64> = Vec::new();
    if reachable.try_reserve_exact(total / 64 + 1).is_err() {
        debug!(total, "parity table allocation failed, skipping bound");
        return true;
    }
    reachable.resize(total / 64 + 1, 0);
    reachable[0] = 1;

    for &(d, count) in &imbalances {
        for _ in 0..count {
            shift_or(&mut reachable, d);
        }
    }

    let area = area_sum as i64;
    let feasible = (0..=total)
        .filter(|&t| reachable[t / 64] & (1 << (t % 64)) != 0)
        .any(|t| {
            let signed = total as i64 - 2 * t as i64;
            if (area + signed) % 2 != 0 {
                return false;
            }
            let black = (area + signed) / 2;
            let white = area - black;
            (0..=black_capacity as i64).contains(&black)
                && (0..=white_capacity as i64).contains(&white)
        });

    debug!(
        width = region.width,
        height = region.height,
        total,
        feasible,
        "parity bound"
    );
    feasible
}

/// In-place `bits |= bits << shift`, bits beyond the last word dropped.
fn shift_or(bits: &mut [u64], shift: usize) {
    let word_shift = shift / 64;
    let bit_shift = shift % 64;

    // high to low so every read sees the value from before this call
    for i in (word_shift..bits.len()).rev() {
        let source = i - word_shift;
        let mut shifted = bits[source] << bit_shift;
        if bit_shift != 0 && source > 0 {
            shifted |= bits[source - 1] >> (64 - bit_shift);
        }
        bits[i] |= shifted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shapes(glyphs: &[&str]) -> Vec<Shape> {
        glyphs
            .iter()
            .enumerate()
            .map(|(id, g)| Shape::from_glyphs(id, g).unwrap())
            .collect()
    }

    fn region(width: usize, height: usize, counts: &[usize]) -> Region {
        Region {
            width,
            height,
            counts: counts.to_vec(),
        }
    }

    fn check(shapes: &[Shape], region: &Region) -> bool {
        parity_feasible(shapes, region, region.area_sum(shapes))
    }

    #[test]
    fn test_shift_or_within_word() {
        let mut bits = vec![0b1];
        shift_or(&mut bits, 3);
        assert_eq!(bits, vec![0b1001]);
        shift_or(&mut bits, 3);
        assert_eq!(bits, vec![0b100_1001]);
    }

    #[test]
    fn test_shift_or_across_words() {
        let mut bits = vec![1 << 62, 0, 0];
        shift_or(&mut bits, 66);
        assert_eq!(bits, vec![1 << 62, 0, 1 << 0]);

        let mut bits = vec![1, 0];
        shift_or(&mut bits, 64);
        assert_eq!(bits, vec![1, 1]);
    }

    #[test]
    fn test_balanced_pieces_always_pass() {
        let library = shapes(&["##"]);
        assert!(check(&library, &region(2, 2, &[2])));
        assert!(check(&library, &region(3, 3, &[4])));
    }

    #[test]
    fn test_t_tetrominoes_on_4x4() {
        // each T covers 3 of one colour and 1 of the other
        let library = shapes(&["###\n.#."]);
        // four Ts: signs +2 +2 -2 -2 balance to 8 black, 8 white
        assert!(check(&library, &region(4, 4, &[4])));
        // one T: 3 of one colour fits easily
        assert!(check(&library, &region(4, 4, &[1])));
    }

    #[test]
    fn test_odd_t_count_cannot_fill_even_board() {
        // three Ts on a 3x4 board need 12 cells split 6/6, but three
        // imbalances of 2 can only sum to +-2 or +-6
        let library = shapes(&["###\n.#."]);
        assert!(!check(&library, &region(3, 4, &[3])));
    }

    #[test]
    fn test_monominoes_fill_any_board() {
        let library = shapes(&["#"]);
        assert!(check(&library, &region(3, 3, &[9])));
        assert!(check(&library, &region(5, 1, &[5])));
    }

    #[test]
    fn test_bars_with_a_spare_cell() {
        // each 3x1 bar is off by one; eight of them cover 24 of 25 cells
        // and can split 12/12 within the 13/12 capacities
        let library = shapes(&["###"]);
        assert!(check(&library, &region(5, 5, &[8])));
    }

    #[test]
    fn test_empty_demand_passes() {
        let library = shapes(&["###\n.#."]);
        assert!(check(&library, &region(1, 1, &[0])));
    }
}
