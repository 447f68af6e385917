//! Diamond arena geometry.
//!
//! The board is a square grid of `size` cells per side, but only a diamond
//! inside it is playable. The lower half (`y < size / 2`) belongs to us and
//! the upper half to the opponent. Each half has two diagonal edges where
//! mobile units are launched and where they score.

use crate::constants::*;
use crate::location::*;
use bitflags::*;
use serde::{Deserialize, Serialize};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Edges: u8 {
        const TOP_LEFT = 1;
        const TOP_RIGHT = 2;
        const BOTTOM_LEFT = 4;
        const BOTTOM_RIGHT = 8;

        const TOP = Self::TOP_LEFT.bits() | Self::TOP_RIGHT.bits();
        const BOTTOM = Self::BOTTOM_LEFT.bits() | Self::BOTTOM_RIGHT.bits();
    }
}

impl Edges {
    /// The edge a unit launched from `self` walks towards.
    pub fn opposite(self) -> Edges {
        let mut out = Edges::empty();
        if self.contains(Edges::TOP_LEFT) {
            out |= Edges::BOTTOM_RIGHT;
        }
        if self.contains(Edges::TOP_RIGHT) {
            out |= Edges::BOTTOM_LEFT;
        }
        if self.contains(Edges::BOTTOM_LEFT) {
            out |= Edges::TOP_RIGHT;
        }
        if self.contains(Edges::BOTTOM_RIGHT) {
            out |= Edges::TOP_LEFT;
        }
        out
    }
}

/// Neighbor offsets for 4-directional (cardinal) movement.
pub const NEIGHBORS_4: [(i8, i8); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardGeometry {
    size: i8,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        BoardGeometry::new(BOARD_SIZE)
    }
}

impl BoardGeometry {
    /// `size` must be even; odd sizes are rounded down.
    pub fn new(size: i8) -> Self {
        BoardGeometry { size: size & !1 }
    }

    pub fn size(&self) -> i8 {
        self.size
    }

    pub fn half(&self) -> i8 {
        self.size / 2
    }

    /// Last column of the left half; breaches at or left of it mirror rightwards.
    pub fn center_x(&self) -> i8 {
        self.half() - 1
    }

    pub fn wall_row(&self) -> i8 {
        self.half() - 1
    }

    pub fn turret_row(&self) -> i8 {
        self.half() - 2
    }

    pub fn in_arena(&self, loc: Location) -> bool {
        let half = self.half();
        let (x, y) = (loc.x(), loc.y());
        if y < 0 || y >= self.size {
            return false;
        }
        if y < half {
            x >= half - 1 - y && x <= half + y
        } else {
            x >= y - half && x <= self.size - 1 + half - y
        }
    }

    pub fn is_own_half(&self, loc: Location) -> bool {
        self.in_arena(loc) && loc.y() < self.half()
    }

    /// Which edges `loc` lies on (empty if none).
    pub fn edges_of(&self, loc: Location) -> Edges {
        let half = self.half();
        let (x, y) = (loc.x(), loc.y());
        let mut out = Edges::empty();
        if !self.in_arena(loc) {
            return out;
        }
        if y < half {
            if x == half - 1 - y {
                out |= Edges::BOTTOM_LEFT;
            }
            if x == half + y {
                out |= Edges::BOTTOM_RIGHT;
            }
        } else {
            if x == y - half {
                out |= Edges::TOP_LEFT;
            }
            if x == self.size - 1 + half - y {
                out |= Edges::TOP_RIGHT;
            }
        }
        out
    }

    /// Edge cells in the engine's enumeration order, edge by edge, each edge
    /// starting from its top or bottom corner.
    pub fn edge_locations(&self, edges: Edges) -> Vec<Location> {
        let half = self.half();
        let top = self.size - 1;
        let mut out = Vec::with_capacity(half as usize * 4);
        for i in 0..half {
            if edges.contains(Edges::TOP_LEFT) {
                out.push(Location::new(half - 1 - i, top - i));
            }
        }
        for i in 0..half {
            if edges.contains(Edges::TOP_RIGHT) {
                out.push(Location::new(half + i, top - i));
            }
        }
        for i in 0..half {
            if edges.contains(Edges::BOTTOM_LEFT) {
                out.push(Location::new(half - 1 - i, i));
            }
        }
        for i in 0..half {
            if edges.contains(Edges::BOTTOM_RIGHT) {
                out.push(Location::new(half + i, i));
            }
        }
        out
    }

    /// All arena cells within `radius` of `center`, row-major.
    pub fn locations_in_range(&self, center: Location, radius: f64) -> Vec<Location> {
        let r = radius.ceil() as i8;
        let mut out = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let loc = center.offset(dx, dy);
                if self.in_arena(loc) && center.distance_to(loc) <= radius {
                    out.push(loc);
                }
            }
        }
        out
    }

    pub fn neighbors(&self, loc: Location) -> impl Iterator<Item = Location> + '_ {
        NEIGHBORS_4
            .iter()
            .map(move |&(dx, dy)| loc.offset(dx, dy))
            .filter(move |n| self.in_arena(*n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_is_a_diamond() {
        let g = BoardGeometry::default();
        assert!(g.in_arena(Location::new(13, 0)));
        assert!(g.in_arena(Location::new(14, 0)));
        assert!(!g.in_arena(Location::new(12, 0)));
        assert!(g.in_arena(Location::new(0, 13)));
        assert!(g.in_arena(Location::new(27, 14)));
        assert!(!g.in_arena(Location::new(-1, 12)));
        assert!(g.in_arena(Location::new(13, 27)));
        assert!(!g.in_arena(Location::new(12, 27)));
    }

    #[test]
    fn edges_have_one_cell_per_row() {
        let g = BoardGeometry::default();
        let bottom = g.edge_locations(Edges::BOTTOM);
        assert_eq!(bottom.len(), 28);
        assert_eq!(bottom[0], Location::new(13, 0));
        assert_eq!(bottom[14], Location::new(14, 0));
        for loc in &bottom {
            assert!(g.edges_of(*loc).intersects(Edges::BOTTOM));
        }
        let top = g.edge_locations(Edges::TOP);
        assert_eq!(top.len(), 28);
        for loc in &top {
            assert!(g.edges_of(*loc).intersects(Edges::TOP));
        }
        assert_eq!(g.edges_of(Location::new(0, 14)), Edges::TOP_LEFT);
    }

    #[test]
    fn top_edges_start_at_the_top_corners() {
        let g = BoardGeometry::default();
        let top = g.edge_locations(Edges::TOP);
        assert_eq!(top[0], Location::new(13, 27));
        assert_eq!(top[13], Location::new(0, 14));
        assert_eq!(top[14], Location::new(14, 27));
        assert_eq!(top[27], Location::new(27, 14));
        assert_eq!(g.edge_locations(Edges::TOP_RIGHT)[0], Location::new(14, 27));
    }

    #[test]
    fn opposite_edges() {
        assert_eq!(Edges::BOTTOM_LEFT.opposite(), Edges::TOP_RIGHT);
        assert_eq!(Edges::TOP.opposite(), Edges::BOTTOM);
    }

    #[test]
    fn range_query_clips_to_arena() {
        let g = BoardGeometry::default();
        let cells = g.locations_in_range(Location::new(13, 0), 1.0);
        assert!(cells.contains(&Location::new(13, 1)));
        assert!(cells.contains(&Location::new(14, 0)));
        assert!(!cells.contains(&Location::new(12, 0)));
    }

    #[test]
    fn front_rows_follow_board_size() {
        let g = BoardGeometry::new(20);
        assert_eq!(g.turret_row(), 8);
        assert_eq!(g.wall_row(), 9);
        assert_eq!(g.center_x(), 9);
    }
}
