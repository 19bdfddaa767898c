use crate::orientation::Orientation;
use crate::pattern::ColourId;
use coord_2d::Coord;
use grid_2d::Grid;
use std::hash::{Hash, Hasher};

/// An oriented square of the source's colour ids, anchored at a position of the source.
/// Local coordinates past the right or bottom edge of the source wrap around to the start.
#[derive(Clone, Copy)]
pub struct SourceWindow<'a> {
    grid: &'a Grid<ColourId>,
    position: Coord,
    pattern_size: u32,
    orientation: Orientation,
}

impl<'a> SourceWindow<'a> {
    pub fn new(
        grid: &'a Grid<ColourId>,
        position: Coord,
        pattern_size: u32,
        orientation: Orientation,
    ) -> Self {
        Self {
            grid,
            position,
            pattern_size,
            orientation,
        }
    }

    /// The colour at a local coordinate, which must be inside the window.
    pub fn colour(&self, local: Coord) -> ColourId {
        let n = self.pattern_size as i32;
        assert!(
            local.x >= 0 && local.y >= 0 && local.x < n && local.y < n,
            "local coord is outside the window"
        );
        let source = self.orientation.transform_coord(self.pattern_size, local);
        *self.grid.get_tiled(self.position + source)
    }

    /// Row-major colours of the window as seen through its orientation.
    pub fn colours(&self) -> impl Iterator<Item = ColourId> + '_ {
        let n = self.pattern_size;
        (0..n * n).map(move |i| self.colour(Coord::new((i % n) as i32, (i / n) as i32)))
    }
}

impl<'a> Hash for SourceWindow<'a> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern_size.hash(state);
        self.colours().for_each(|colour| colour.hash(state));
    }
}

impl<'a> PartialEq for SourceWindow<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.pattern_size == other.pattern_size && self.colours().eq(other.colours())
    }
}

impl<'a> Eq for SourceWindow<'a> {}
