//! Hex coordinate math: axial and cube forms, centroids and 60° rotations.
//!
//! Cells are addressed with axial coordinates `(q, r)`. Rotation happens in
//! cube space, where `x = q`, `z = r` and `y = -x - z`, so every cube
//! coordinate satisfies `x + y + z = 0`.
//!
//! Centroids are generally not lattice points. They are kept as an integer
//! sum plus a count so that rotating about them and rounding back to the
//! lattice is exact: rounding never depends on floating point error.

use crate::shape::Coord;

/// A cube coordinate `(x, y, z)` with `x + y + z = 0`.
pub type Cube = (i32, i32, i32);

/// Number of 60° rotations in a full turn.
pub const NUM_ROTATIONS: u8 = 6;

/// Largest absolute axial component a shape cell may have.
///
/// Rotating about a centroid can move a cell up to three times this far
/// from the origin, and board offsets add a little more; both stay in `i32`.
pub const MAX_COORD: i32 = i32::MAX / 4;

/// Converts axial `(q, r)` to cube `(x, y, z)`.
#[inline]
pub const fn axial_to_cube((q, r): Coord) -> Cube {
    (q, -q - r, r)
}

/// Converts cube `(x, y, z)` back to axial `(q, r)`.
#[inline]
pub const fn cube_to_axial((x, _, z): Cube) -> Coord {
    (x, z)
}

/// Rotates a cube coordinate 60° clockwise about the origin.
#[inline]
pub const fn rotate_cube((x, y, z): Cube) -> Cube {
    (-z, -x, -y)
}

/// Exact centroid of a set of cells in cube space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Centroid {
    sum: (i64, i64, i64),
    count: i64,
}

impl Centroid {
    /// Componentwise mean of the cube coordinates.
    pub fn mean(&self) -> (f64, f64, f64) {
        let n = self.count as f64;
        (
            self.sum.0 as f64 / n,
            self.sum.1 as f64 / n,
            self.sum.2 as f64 / n,
        )
    }

    /// Number of cells the centroid was taken over.
    pub fn count(&self) -> usize {
        self.count as usize
    }
}

/// Computes the centroid of `cells` in cube space.
///
/// An empty slice yields a centroid with a count of zero; rotating about it
/// is a no-op.
pub fn centroid(cells: &[Coord]) -> Centroid {
    let mut sum = (0i64, 0i64, 0i64);
    for &cell in cells {
        let (x, y, z) = axial_to_cube(cell);
        sum.0 += x as i64;
        sum.1 += y as i64;
        sum.2 += z as i64;
    }
    Centroid {
        sum,
        count: cells.len() as i64,
    }
}

/// Divides and rounds to the nearest integer, halves going towards +∞.
#[inline]
fn div_round(numerator: i64, denominator: i64) -> i64 {
    (2 * numerator + denominator).div_euclid(2 * denominator)
}

fn rotate_cube_i64((x, y, z): (i64, i64, i64)) -> (i64, i64, i64) {
    (-z, -x, -y)
}

/// Rotates `cells` by `turns` × 60° clockwise about `center`.
///
/// Each rotated cell is `R^k(p - c) + c`, rounded per axial component. The
/// fractional part of that expression is the same for every cell, so all
/// cells round the same way and the result is a rigid copy of the input.
pub fn rotate_around(cells: &[Coord], center: &Centroid, turns: u8) -> Vec<Coord> {
    let turns = turns % NUM_ROTATIONS;
    if turns == 0 || center.count == 0 {
        return cells.to_vec();
    }

    let n = center.count;
    let mut rotated_sum = center.sum;
    for _ in 0..turns {
        rotated_sum = rotate_cube_i64(rotated_sum);
    }
    // n * (c - R^k c), the shared translation scaled by n
    let shift = (
        center.sum.0 - rotated_sum.0,
        center.sum.2 - rotated_sum.2,
    );

    let rotated: Vec<Coord> = cells
        .iter()
        .map(|&cell| {
            let mut cube = axial_to_cube(cell);
            for _ in 0..turns {
                cube = rotate_cube(cube);
            }
            let (q, r) = cube_to_axial(cube);
            let q = div_round(n * q as i64 + shift.0, n);
            let r = div_round(n * r as i64 + shift.1, n);
            (q as i32, r as i32)
        })
        .collect();

    debug_assert_eq!(rotated.len(), cells.len());
    rotated
}

/// Rotates a shape 60° clockwise about its own centroid.
///
/// Feeding the result back in does not close after six turns: each call
/// rounds about a new centroid, so the cells come back translated. For
/// repeated turns use [`rotate_around`] with the original centroid, or
/// `Shape::rotate`.
pub fn rotate_shape_around_center(cells: &[Coord]) -> Vec<Coord> {
    rotate_around(cells, &centroid(cells), 1)
}

/// Translates every cell by `(offset_x, offset_y)`.
#[inline]
pub fn translate(
    cells: &[Coord],
    offset_x: i32,
    offset_y: i32,
) -> impl Iterator<Item = Coord> + '_ {
    cells.iter().map(move |&(q, r)| (q + offset_x, r + offset_y))
}

/// Sorts the cells and shifts them so the minimum q and minimum r are zero.
///
/// Two shapes that differ only by translation normalize to the same cells.
pub fn normalize(cells: &[Coord]) -> Vec<Coord> {
    let Some(min_q) = cells.iter().map(|&(q, _)| q).min() else {
        return Vec::new();
    };
    let min_r = cells.iter().map(|&(_, r)| r).min().unwrap_or(0);

    let mut normalized: Vec<Coord> = cells
        .iter()
        .map(|&(q, r)| (q - min_q, r - min_r))
        .collect();
    normalized.sort_unstable();
    normalized
}
