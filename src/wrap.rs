use coord_2d::{Coord, Size};

/// How coordinates of the output grid are addressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wrap {
    /// Bounded output. A pattern may only be placed where its whole footprint is inside the
    /// grid, so the last `N-1` columns and rows are never chosen directly.
    WrapNone,
    /// Toroidal output.
    WrapXY,
}

fn footprint_fits(value: i32, size: u32, pattern_size: u32) -> bool {
    value >= 0 && value as u32 + pattern_size <= size
}

impl Wrap {
    pub fn new(periodic: bool) -> Self {
        if periodic {
            Wrap::WrapXY
        } else {
            Wrap::WrapNone
        }
    }

    pub fn is_periodic(self) -> bool {
        self == Wrap::WrapXY
    }

    /// Whether a pattern of side `pattern_size` may be placed with its top-left corner at
    /// `coord`, which must be inside the grid.
    pub fn is_placeable(self, coord: Coord, size: Size, pattern_size: u32) -> bool {
        match self {
            Wrap::WrapXY => true,
            Wrap::WrapNone => {
                footprint_fits(coord.x, size.width(), pattern_size)
                    && footprint_fits(coord.y, size.height(), pattern_size)
            }
        }
    }

    /// Maps a possibly out-of-grid coordinate onto a cell where a pattern may be placed, if
    /// there is one.
    pub fn normalize_coord(self, coord: Coord, size: Size, pattern_size: u32) -> Option<Coord> {
        match self {
            Wrap::WrapXY => Some(coord.normalize(size)),
            Wrap::WrapNone => {
                if self.is_placeable(coord, size, pattern_size) {
                    Some(coord)
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wraps() {
        let size = Size::new(4, 5);
        assert_eq! {
            Wrap::WrapNone.normalize_coord(Coord::new(2, 3), size, 1),
            Some(Coord::new(2, 3))
        };
        assert_eq! {
            Wrap::WrapNone.normalize_coord(Coord::new(4, 3), size, 1),
            None,
        };
        assert_eq! {
            Wrap::WrapNone.normalize_coord(Coord::new(-1, 3), size, 1),
            None,
        };
        assert_eq! {
            Wrap::WrapXY.normalize_coord(Coord::new(4, 3), size, 3),
            Some(Coord::new(0, 3)),
        };
        assert_eq! {
            Wrap::WrapXY.normalize_coord(Coord::new(-2, 6), size, 3),
            Some(Coord::new(2, 1)),
        };
    }

    #[test]
    fn footprint() {
        let size = Size::new(4, 5);
        assert!(Wrap::WrapNone.is_placeable(Coord::new(2, 2), size, 2));
        assert!(!Wrap::WrapNone.is_placeable(Coord::new(3, 2), size, 2));
        assert!(!Wrap::WrapNone.is_placeable(Coord::new(0, 4), size, 2));
        assert!(Wrap::WrapNone.is_placeable(Coord::new(0, 3), size, 2));
        assert!(Wrap::WrapXY.is_placeable(Coord::new(3, 4), size, 2));
        assert_eq!(Wrap::new(true), Wrap::WrapXY);
        assert!(!Wrap::new(false).is_periodic());
    }
}
