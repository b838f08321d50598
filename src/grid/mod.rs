//! Grid geometry: cell indices, coordinates, distances and reserved
//! sentinel locations.
//!
//! Every object location is a row-major cell index `x + y * size`. Two
//! indices past the last cell are reserved: `size²` marks a dead object and
//! `size² + 1` marks an object that is not currently observed.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Row-major cell index (or one of the grid's sentinels).
pub type Location = u32;

/// The 8 neighbouring offsets, in the fixed order used for move generation.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// A 2D cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts a cell index on a grid of side `size` into a coordinate.
    pub fn from_index(loc: Location, size: u32) -> Self {
        Self {
            x: (loc % size) as i32,
            y: (loc / size) as i32,
        }
    }

    /// Row-major index of this coordinate. Only meaningful when on the grid.
    pub fn index(&self, size: u32) -> Location {
        self.x as Location + self.y as Location * size
    }

    /// Squared Euclidean distance.
    pub fn squared_distance(&self, other: &Coordinate) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance.
    pub fn real_distance(&self, other: &Coordinate) -> f64 {
        (self.squared_distance(other) as f64).sqrt()
    }

    pub fn is_on_grid(&self, size: u32) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as u32) < size && (self.y as u32) < size
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Multiplies both components by `factor`, flooring the result.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            (self.x as f64 * factor).floor() as i32,
            (self.y as f64 * factor).floor() as i32,
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A square grid of side `size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Grid {
    size: u32,
}

impl Grid {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of cells on the grid.
    pub fn cells(&self) -> u32 {
        self.size * self.size
    }

    /// Sentinel location of a dead object.
    pub fn dead(&self) -> Location {
        self.cells()
    }

    /// Sentinel location of an object that is not currently observed.
    pub fn non_observed(&self) -> Location {
        self.cells() + 1
    }

    /// Largest location value this grid can produce (the non-observed sentinel).
    pub fn max_location(&self) -> Location {
        self.non_observed()
    }

    pub fn is_cell(&self, loc: Location) -> bool {
        loc < self.cells()
    }

    pub fn is_dead(&self, loc: Location) -> bool {
        loc == self.dead()
    }

    pub fn is_non_observed(&self, loc: Location) -> bool {
        loc == self.non_observed()
    }

    pub fn coordinate(&self, loc: Location) -> Coordinate {
        Coordinate::from_index(loc, self.size)
    }

    /// Squared distance between two cells.
    pub fn squared_distance(&self, a: Location, b: Location) -> i32 {
        self.coordinate(a).squared_distance(&self.coordinate(b))
    }

    /// Euclidean distance between two cells.
    pub fn real_distance(&self, a: Location, b: Location) -> f64 {
        self.coordinate(a).real_distance(&self.coordinate(b))
    }

    /// On-grid neighbours of `loc` in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&self, loc: Location) -> impl Iterator<Item = Location> + '_ {
        let origin = self.coordinate(loc);
        NEIGHBOR_OFFSETS
            .iter()
            .map(move |(dx, dy)| origin.offset(*dx, *dy))
            .filter(move |c| c.is_on_grid(self.size))
            .map(move |c| c.index(self.size))
    }

    /// Maps a location from grid `from` onto this grid.
    ///
    /// Sentinels map to this grid's sentinels; cells are scaled by
    /// `self.size / from.size` and floored. Any other value is treated as dead.
    pub fn rescale_from(&self, loc: Location, from: &Grid) -> Location {
        if from.is_non_observed(loc) {
            return self.non_observed();
        }
        if !from.is_cell(loc) {
            return self.dead();
        }
        let factor = self.size as f64 / from.size as f64;
        let scaled = from.coordinate(loc).scaled(factor);
        if scaled.is_on_grid(self.size) {
            scaled.index(self.size)
        } else {
            self.dead()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        let c = Coordinate::from_index(17, 5);
        assert_eq!(c, Coordinate::new(2, 3));
        assert_eq!(c.index(5), 17);
    }

    #[test]
    fn distances() {
        let g = Grid::new(5);
        assert_eq!(g.squared_distance(0, 24), 32);
        assert!((g.real_distance(0, 3) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn sentinels_follow_last_cell() {
        let g = Grid::new(4);
        assert_eq!(g.dead(), 16);
        assert_eq!(g.non_observed(), 17);
        assert!(!g.is_cell(g.dead()));
        assert!(g.is_cell(15));
    }

    #[test]
    fn corner_has_three_neighbors() {
        let g = Grid::new(4);
        let n: Vec<_> = g.neighbors(0).collect();
        assert_eq!(n, vec![4, 1, 5]);
    }

    #[test]
    fn center_has_eight_neighbors_in_fixed_order() {
        let g = Grid::new(3);
        let n: Vec<_> = g.neighbors(4).collect();
        assert_eq!(n, vec![7, 1, 5, 3, 8, 2, 6, 0]);
    }

    #[test]
    fn rescale_cells_and_sentinels() {
        let fine = Grid::new(10);
        let coarse = Grid::new(5);
        assert_eq!(coarse.rescale_from(99, &fine), 24);
        assert_eq!(coarse.rescale_from(fine.dead(), &fine), coarse.dead());
        assert_eq!(
            coarse.rescale_from(fine.non_observed(), &fine),
            coarse.non_observed()
        );
        // (3, 1) on 10x10 -> (1, 0) on 5x5
        assert_eq!(coarse.rescale_from(13, &fine), 1);
    }
}
