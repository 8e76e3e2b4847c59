//! Precomputed disk offset tables for circular area effects.
//!
//! Sight, shroud and jam all walk a filled disk of cells around an origin.
//! [`RADIUS_OFFSETS`] lists every offset out to ring 10, grouped by ring, and
//! [`RADIUS_COUNT`] holds the cumulative size of each disk, so a disk of any
//! radius is a prefix of the table and an outer band is a contiguous slice.

use crate::coord::CellOffset;

/// Largest radius covered by the tables.
pub const MAX_SIGHT_RADIUS: usize = 10;

/// Cumulative cell count of the disk for each radius `0..=10`.
pub const RADIUS_COUNT: [usize; MAX_SIGHT_RADIUS + 1] = [1, 9, 21, 37, 61, 89, 121, 161, 205, 253, 309];

const fn o(dx: i8, dy: i8) -> CellOffset {
    CellOffset::new(dx, dy)
}

/// Disk offsets ordered by ring.
#[rustfmt::skip]
pub const RADIUS_OFFSETS: [CellOffset; 309] = [
    o(0, 0), o(-1, -1), o(0, -1), o(1, -1), o(-1, 0), o(1, 0),
    o(-1, 1), o(0, 1), o(1, 1), o(-1, -2), o(0, -2), o(1, -2),
    o(-2, -1), o(2, -1), o(-2, 0), o(2, 0), o(-2, 1), o(2, 1),
    o(-1, 2), o(0, 2), o(1, 2), o(-1, -3), o(0, -3), o(1, -3),
    o(-2, -2), o(2, -2), o(-3, -1), o(3, -1), o(-3, 0), o(3, 0),
    o(-3, 1), o(3, 1), o(-2, 2), o(2, 2), o(-1, 3), o(0, 3),
    o(1, 3), o(-1, -4), o(0, -4), o(1, -4), o(-3, -3), o(-2, -3),
    o(2, -3), o(3, -3), o(-3, -2), o(3, -2), o(-4, -1), o(4, -1),
    o(-4, 0), o(4, 0), o(-4, 1), o(4, 1), o(-3, 2), o(3, 2),
    o(-3, 3), o(-2, 3), o(2, 3), o(3, 3), o(-1, 4), o(0, 4),
    o(1, 4), o(-1, -5), o(0, -5), o(1, -5), o(-3, -4), o(-2, -4),
    o(2, -4), o(3, -4), o(-4, -3), o(4, -3), o(-4, -2), o(4, -2),
    o(-5, -1), o(5, -1), o(-5, 0), o(5, 0), o(-5, 1), o(5, 1),
    o(-4, 2), o(4, 2), o(-4, 3), o(4, 3), o(-3, 4), o(-2, 4),
    o(2, 4), o(3, 4), o(-1, 5), o(0, 5), o(1, 5), o(-1, -6),
    o(0, -6), o(1, -6), o(-3, -5), o(-2, -5), o(2, -5), o(3, -5),
    o(-4, -4), o(4, -4), o(-5, -3), o(5, -3), o(-5, -2), o(5, -2),
    o(-6, -1), o(6, -1), o(-6, 0), o(6, 0), o(-6, 1), o(6, 1),
    o(-5, 2), o(5, 2), o(-5, 3), o(5, 3), o(-4, 4), o(4, 4),
    o(-3, 5), o(-2, 5), o(2, 5), o(3, 5), o(-1, 6), o(0, 6),
    o(1, 6), o(-1, -7), o(0, -7), o(1, -7), o(-3, -6), o(-2, -6),
    o(2, -6), o(3, -6), o(-5, -5), o(-4, -5), o(4, -5), o(5, -5),
    o(-5, -4), o(5, -4), o(-6, -3), o(6, -3), o(-6, -2), o(6, -2),
    o(-7, -1), o(7, -1), o(-7, 0), o(7, 0), o(-7, 1), o(7, 1),
    o(-6, 2), o(6, 2), o(-6, 3), o(6, 3), o(-5, 4), o(5, 4),
    o(-5, 5), o(-4, 5), o(4, 5), o(5, 5), o(-3, 6), o(-2, 6),
    o(2, 6), o(3, 6), o(-1, 7), o(0, 7), o(1, 7), o(-1, -8),
    o(0, -8), o(1, -8), o(-3, -7), o(-2, -7), o(2, -7), o(3, -7),
    o(-5, -6), o(-4, -6), o(4, -6), o(5, -6), o(-6, -5), o(6, -5),
    o(-6, -4), o(6, -4), o(-7, -3), o(7, -3), o(-7, -2), o(7, -2),
    o(-8, -1), o(8, -1), o(-8, 0), o(8, 0), o(-8, 1), o(8, 1),
    o(-7, 2), o(7, 2), o(-7, 3), o(7, 3), o(-6, 4), o(6, 4),
    o(-6, 5), o(6, 5), o(-5, 6), o(-4, 6), o(4, 6), o(5, 6),
    o(-3, 7), o(-2, 7), o(2, 7), o(3, 7), o(-1, 8), o(0, 8),
    o(1, 8), o(-1, -9), o(0, -9), o(1, -9), o(-3, -8), o(-2, -8),
    o(2, -8), o(3, -8), o(-5, -7), o(-4, -7), o(4, -7), o(5, -7),
    o(-6, -6), o(6, -6), o(-7, -5), o(7, -5), o(-7, -4), o(7, -4),
    o(-8, -3), o(8, -3), o(-8, -2), o(8, -2), o(-9, -1), o(9, -1),
    o(-9, 0), o(9, 0), o(-9, 1), o(9, 1), o(-8, 2), o(8, 2),
    o(-8, 3), o(8, 3), o(-7, 4), o(7, 4), o(-7, 5), o(7, 5),
    o(-6, 6), o(6, 6), o(-5, 7), o(-4, 7), o(4, 7), o(5, 7),
    o(-3, 8), o(-2, 8), o(2, 8), o(3, 8), o(-1, 9), o(0, 9),
    o(1, 9), o(-1, -10), o(0, -10), o(1, -10), o(-3, -9), o(-2, -9),
    o(2, -9), o(3, -9), o(-5, -8), o(-4, -8), o(4, -8), o(5, -8),
    o(-7, -7), o(-6, -7), o(6, -7), o(7, -7), o(-7, -6), o(7, -6),
    o(-8, -5), o(8, -5), o(-8, -4), o(8, -4), o(-9, -3), o(9, -3),
    o(-9, -2), o(9, -2), o(-10, -1), o(10, -1), o(-10, 0), o(10, 0),
    o(-10, 1), o(10, 1), o(-9, 2), o(9, 2), o(-9, 3), o(9, 3),
    o(-8, 4), o(8, 4), o(-8, 5), o(8, 5), o(-7, 6), o(7, 6),
    o(-7, 7), o(-6, 7), o(6, 7), o(7, 7), o(-5, 8), o(-4, 8),
    o(4, 8), o(5, 8), o(-3, 9), o(-2, 9), o(2, 9), o(3, 9),
    o(-1, 10), o(0, 10), o(1, 10),];

/// Offsets forming the full disk of radius `radius`.
///
/// Returns `None` for radii the table does not cover.
#[must_use]
pub fn offsets_for(radius: usize) -> Option<&'static [CellOffset]> {
    let count = *RADIUS_COUNT.get(radius)?;
    Some(&RADIUS_OFFSETS[..count])
}

/// Offsets forming only the outer band of the disk of radius `radius`.
///
/// For radii above 2 this is the three outermost rings. Smaller radii have
/// no inner part to skip, so the full disk is returned.
#[must_use]
pub fn band_offsets_for(radius: usize) -> Option<&'static [CellOffset]> {
    let end = *RADIUS_COUNT.get(radius)?;
    if radius > 2 {
        Some(&RADIUS_OFFSETS[RADIUS_COUNT[radius - 3]..end])
    } else {
        Some(&RADIUS_OFFSETS[..end])
    }
}

/// Ring index of an offset (Chebyshev distance).
#[must_use]
pub fn ring_of(offset: CellOffset) -> usize {
    usize::from(offset.dx.unsigned_abs().max(offset.dy.unsigned_abs()))
}
