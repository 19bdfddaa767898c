use crate::error::PropagateError;
use crate::pattern::PatternId;
use crate::propagator::{offsets, Propagator};
use crate::wave::{CellIndex, Wave};
use coord_2d::Coord;

/// Takes one cell off the wave's dirty stack and removes, from every cell whose pattern would
/// overlap it, the patterns that no pattern still possible at that cell agrees with. Cells
/// that lose a pattern are pushed onto the dirty stack in turn.
///
/// Returns the processed cell, or `None` once the stack is empty. Fails as soon as a cell has
/// no possible pattern left.
pub fn propagate_step(
    wave: &mut Wave,
    propagator: &Propagator,
) -> Result<Option<CellIndex>, PropagateError> {
    let index = match wave.pop_dirty() {
        Some(index) => index,
        None => return Ok(None),
    };
    let pattern_size = propagator.pattern_size();
    let size = wave.size();
    let wrap = wave.wrap();
    let coord = wave.coord_of_index(index);
    let num_patterns = wave.num_patterns() as PatternId;
    for offset in offsets(pattern_size) {
        let neighbour_coord = match wrap.normalize_coord(coord + offset, size, pattern_size) {
            Some(neighbour_coord) => neighbour_coord,
            None => continue,
        };
        let neighbour_index = wave.index_of_coord(neighbour_coord);
        let back = Coord::new(-offset.x, -offset.y);
        for pattern_id in 0..num_patterns {
            if !wave.cell(neighbour_index).is_possible(pattern_id) {
                continue;
            }
            let cell = wave.cell(index);
            let supported = propagator
                .compatible(pattern_id, back)
                .iter()
                .any(|&source_pattern_id| cell.is_possible(source_pattern_id));
            if !supported {
                wave.set_coefficient(neighbour_index, pattern_id, false);
                if wave.cell(neighbour_index).is_contradiction() {
                    return Err(PropagateError::Contradiction);
                }
            }
        }
    }
    Ok(Some(index))
}

/// Propagates until the dirty stack is empty.
pub fn propagate_all(wave: &mut Wave, propagator: &Propagator) -> Result<(), PropagateError> {
    while propagate_step(wave, propagator)?.is_some() {}
    Ok(())
}
