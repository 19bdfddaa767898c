use crate::pattern::{PatternId, PatternTable};
use crate::wrap::Wrap;
use coord_2d::{Coord, Size};
use grid_2d::Grid;

/// Index of a cell of the output grid: `x + y * width`.
pub type CellIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChosenPatternIdError {
    NoCompatiblePatterns,
    MultipleCompatiblePatterns,
}

/// The patterns still possible at one cell of the output.
#[derive(Debug, Clone)]
pub struct WaveCell {
    possible: PatternTable<bool>,
    num_possible: u32,
    // set while the cell is on the dirty stack
    dirty: bool,
}

impl WaveCell {
    fn new(num_patterns: usize) -> Self {
        Self {
            possible: PatternTable::new_clone(num_patterns, true),
            num_possible: num_patterns as u32,
            dirty: false,
        }
    }
    fn reset(&mut self) {
        self.possible.fill(true);
        self.num_possible = self.possible.len() as u32;
        self.dirty = false;
    }
    pub fn is_possible(&self, pattern_id: PatternId) -> bool {
        self.possible[pattern_id]
    }
    /// One flag per pattern, in pattern order.
    pub fn possible(&self) -> &PatternTable<bool> {
        &self.possible
    }
    pub fn num_possible(&self) -> u32 {
        self.num_possible
    }
    pub fn possible_pattern_ids(&self) -> impl Iterator<Item = PatternId> + '_ {
        self.possible
            .enumerate()
            .filter_map(|(pattern_id, &possible)| if possible { Some(pattern_id) } else { None })
    }
    pub fn is_collapsed(&self) -> bool {
        self.num_possible == 1
    }
    pub fn is_contradiction(&self) -> bool {
        self.num_possible == 0
    }
    pub fn chosen_pattern_id(&self) -> Result<PatternId, ChosenPatternIdError> {
        match self.num_possible {
            0 => Err(ChosenPatternIdError::NoCompatiblePatterns),
            1 => self
                .possible_pattern_ids()
                .next()
                .ok_or(ChosenPatternIdError::NoCompatiblePatterns),
            _ => Err(ChosenPatternIdError::MultipleCompatiblePatterns),
        }
    }
    /// Returns true if the flag changed.
    fn set(&mut self, pattern_id: PatternId, possible: bool) -> bool {
        let flag = &mut self.possible[pattern_id];
        if *flag == possible {
            return false;
        }
        *flag = possible;
        if possible {
            self.num_possible += 1;
        } else {
            self.num_possible -= 1;
        }
        true
    }
}

/// The superposition of patterns over the whole output grid, along with the stack of cells
/// whose possibilities changed and have not been propagated yet.
#[derive(Debug, Clone)]
pub struct Wave {
    grid: Grid<WaveCell>,
    wrap: Wrap,
    dirty: Vec<CellIndex>,
}

impl Wave {
    pub fn new(num_patterns: usize, size: Size, periodic: bool) -> Self {
        Self {
            grid: Grid::new_fn(size, |_| WaveCell::new(num_patterns)),
            wrap: Wrap::new(periodic),
            dirty: Vec::with_capacity(size.count()),
        }
    }

    pub fn size(&self) -> Size {
        self.grid.size()
    }
    pub fn num_cells(&self) -> usize {
        self.grid.size().count()
    }
    pub fn wrap(&self) -> Wrap {
        self.wrap
    }
    pub fn num_patterns(&self) -> usize {
        self.grid.iter().next().map_or(0, |cell| cell.possible.len())
    }
    pub fn grid(&self) -> &Grid<WaveCell> {
        &self.grid
    }
    pub fn cell(&self, index: CellIndex) -> &WaveCell {
        self.grid.get_index_checked(index)
    }
    pub fn index_of_coord(&self, coord: Coord) -> CellIndex {
        let size = self.size();
        assert!(coord.is_valid(size), "coord is out of bounds");
        coord.x as usize + coord.y as usize * size.width() as usize
    }
    pub fn coord_of_index(&self, index: CellIndex) -> Coord {
        let width = self.size().width() as usize;
        Coord::new((index % width) as i32, (index / width) as i32)
    }

    /// Leaves only `pattern_id` possible at the cell.
    pub fn collapse(&mut self, index: CellIndex, pattern_id: PatternId) {
        let cell = self.grid.get_index_checked_mut(index);
        let mut changed = cell.set(pattern_id, true);
        for other in 0..cell.possible.len() as PatternId {
            if other != pattern_id {
                changed |= cell.set(other, false);
            }
        }
        if changed {
            self.mark_dirty(index);
        }
    }

    pub fn set_coefficient(&mut self, index: CellIndex, pattern_id: PatternId, possible: bool) {
        if self
            .grid
            .get_index_checked_mut(index)
            .set(pattern_id, possible)
        {
            self.mark_dirty(index);
        }
    }

    fn mark_dirty(&mut self, index: CellIndex) {
        let cell = self.grid.get_index_checked_mut(index);
        if !cell.dirty {
            cell.dirty = true;
            self.dirty.push(index);
        }
    }

    /// Removes the most recently changed cell from the dirty stack.
    pub fn pop_dirty(&mut self) -> Option<CellIndex> {
        let index = self.dirty.pop()?;
        self.grid.get_index_checked_mut(index).dirty = false;
        Some(index)
    }

    pub fn num_dirty(&self) -> usize {
        self.dirty.len()
    }

    /// Makes every pattern possible everywhere again and forgets pending changes.
    pub fn clear(&mut self) {
        self.grid.iter_mut().for_each(WaveCell::reset);
        self.dirty.clear();
    }

    pub fn is_fully_collapsed(&self) -> bool {
        self.grid.iter().all(WaveCell::is_collapsed)
    }

    pub fn num_collapsed(&self) -> usize {
        self.grid.iter().filter(|cell| cell.is_collapsed()).count()
    }
}
