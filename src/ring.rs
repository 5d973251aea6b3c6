//! Progressive reference cache (C9): per-tile-grid-cell store of the
//! previously emitted quantized/linearized coefficients, driving the
//! "sub-band diffing" decision for progressive (`PRO1`) tiles.
//!
//! Mirrors `struct rfx_rb` / `enc->rbs[RFX_MAX_RB_X][RFX_MAX_RB_Y]` from
//! `rfxencode.h` and the `COEF_DIFF_COUNT_COPY` logic in
//! `rfx_pro_compose_message_region` (`rfxencode_compose.c`): a 64x64 grid of
//! lazily-allocated three-plane (Y/U/V) reference buffers, addressed by
//! tile grid coordinate. The difference/original choice is made once per
//! *tile*, from the combined zero count of all three planes, not
//! independently per plane — that detail isn't spelled out by the
//! distilled spec and is taken from the reference composer.

/// Tile grid is 64x64 cells (4096x4096 pixels of addressable tiles), per
/// `RFX_MAX_RB_X`/`RFX_MAX_RB_Y`.
pub const GRID_SIZE: usize = 64;

/// Leading coefficients considered for the sparsity comparison: the full
/// 4096-coefficient tile minus the 81-coefficient LL3 tail that is always
/// differentially coded before entropy coding (§4.9).
const DIFF_PREFIX_LEN: usize = 4096 - 81;

#[derive(Clone)]
struct RefBlock {
    y: Box<[i16; 4096]>,
    u: Box<[i16; 4096]>,
    v: Box<[i16; 4096]>,
}

impl Default for RefBlock {
    fn default() -> Self {
        Self {
            y: Box::new([0; 4096]),
            u: Box::new([0; 4096]),
            v: Box::new([0; 4096]),
        }
    }
}

/// Result of a sub-band diffing decision for one progressive tile: the
/// chosen branch, and the three coefficient buffers to entropy-code.
pub struct DiffedTile {
    pub difference: bool,
    pub y: [i16; 4096],
    pub u: [i16; 4096],
    pub v: [i16; 4096],
}

/// Lazily-allocated grid of per-tile reference coefficient blocks, owned by
/// an [`crate::encoder::EncoderState`] in progressive mode.
#[derive(Default)]
pub struct RingCache {
    cells: Vec<Option<Box<RefBlock>>>,
}

impl RingCache {
    pub fn new() -> Self {
        Self {
            cells: (0..GRID_SIZE * GRID_SIZE).map(|_| None).collect(),
        }
    }

    fn index(x_idx: usize, y_idx: usize) -> usize {
        y_idx * GRID_SIZE + x_idx
    }

    /// Clears every reference block, per the per-encode `PRO_KEY` flag:
    /// the next tile at any grid cell is always encoded as `original`.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Computes the difference-coded and original variants of the
    /// quantized/linearized `(y, u, v)` coefficients for grid cell
    /// `(x_idx, y_idx)`, picks whichever is sparser over the
    /// `4096 - 81`-coefficient prefix, updates the reference to the
    /// original coefficients (the `R <- O` rule applies on both branches),
    /// and returns the chosen branch.
    pub fn diff_or_original(
        &mut self,
        x_idx: usize,
        y_idx: usize,
        y: &[i16; 4096],
        u: &[i16; 4096],
        v: &[i16; 4096],
    ) -> DiffedTile {
        assert!(x_idx < GRID_SIZE && y_idx < GRID_SIZE, "tile grid index out of range");
        let idx = Self::index(x_idx, y_idx);
        let cell = self.cells[idx].get_or_insert_with(Box::<RefBlock>::default);

        let mut diff_y = [0i16; 4096];
        let mut diff_u = [0i16; 4096];
        let mut diff_v = [0i16; 4096];
        let (zeros_diff, zeros_original) = diff_plane(y, &cell.y, &mut diff_y)
            .zip_add(diff_plane(u, &cell.u, &mut diff_u))
            .zip_add(diff_plane(v, &cell.v, &mut diff_v));

        cell.y.copy_from_slice(y);
        cell.u.copy_from_slice(u);
        cell.v.copy_from_slice(v);

        if zeros_diff > zeros_original {
            DiffedTile {
                difference: true,
                y: diff_y,
                u: diff_u,
                v: diff_v,
            }
        } else {
            DiffedTile {
                difference: false,
                y: *y,
                u: *u,
                v: *v,
            }
        }
    }
}

/// Writes `original - reference` into `out` and returns `(zeros in the diff
/// prefix, zeros in the original prefix)`; the trailing LL3 tail (the last
/// 81 coefficients) is still diffed for `out` but excluded from both counts.
fn diff_plane(original: &[i16; 4096], reference: &[i16; 4096], out: &mut [i16; 4096]) -> Counts {
    let mut zeros_diff = 0usize;
    let mut zeros_original = 0usize;
    for i in 0..4096 {
        let d = original[i].wrapping_sub(reference[i]);
        out[i] = d;
        if i < DIFF_PREFIX_LEN {
            if d == 0 {
                zeros_diff += 1;
            }
            if original[i] == 0 {
                zeros_original += 1;
            }
        }
    }
    Counts { zeros_diff, zeros_original }
}

#[derive(Clone, Copy)]
struct Counts {
    zeros_diff: usize,
    zeros_original: usize,
}

impl Counts {
    fn zip_add(self, other: Self) -> Self {
        Self {
            zeros_diff: self.zeros_diff + other.zeros_diff,
            zeros_original: self.zeros_original + other.zeros_original,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tile_after_reset_is_always_original() {
        let mut ring = RingCache::new();
        let y = [5i16; 4096];
        let u = [0i16; 4096];
        let v = [0i16; 4096];
        let tile = ring.diff_or_original(0, 0, &y, &u, &v);
        assert!(!tile.difference);
        assert_eq!(tile.y, y);
    }

    #[test]
    fn identical_repeated_tile_is_flagged_difference() {
        let mut ring = RingCache::new();
        let mut y = [0i16; 4096];
        for (i, v) in y.iter_mut().enumerate().take(4096 - 81) {
            *v = (i % 13) as i16 - 6;
        }
        let u = [1i16; 4096];
        let v = [2i16; 4096];

        let first = ring.diff_or_original(3, 4, &y, &u, &v);
        assert!(!first.difference);

        let second = ring.diff_or_original(3, 4, &y, &u, &v);
        assert!(second.difference);
        assert!(second.y[..4096 - 81].iter().all(|&c| c == 0));
    }

    #[test]
    fn reset_forces_original_again() {
        let mut ring = RingCache::new();
        let y = [7i16; 4096];
        let u = [0i16; 4096];
        let v = [0i16; 4096];
        ring.diff_or_original(1, 1, &y, &u, &v);
        ring.reset();
        let tile = ring.diff_or_original(1, 1, &y, &u, &v);
        assert!(!tile.difference);
    }

    #[test]
    fn distinct_grid_cells_are_independent() {
        let mut ring = RingCache::new();
        let y = [9i16; 4096];
        let u = [0i16; 4096];
        let v = [0i16; 4096];
        ring.diff_or_original(0, 0, &y, &u, &v);
        let other_cell = ring.diff_or_original(1, 0, &y, &u, &v);
        assert!(!other_cell.difference);
    }
}
