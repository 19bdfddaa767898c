//! Pins one pattern to the bottom row of the output.

use crate::pattern::PatternId;
use crate::wave::Wave;
use coord_2d::Coord;

/// Resolves a signed ground index against the number of patterns, counting negative values
/// back from the last pattern. Returns `None` when the ground constraint is disabled.
pub fn ground_pattern_id(ground: i32, num_patterns: usize) -> Option<PatternId> {
    if ground == 0 || num_patterns == 0 {
        return None;
    }
    let num_patterns = num_patterns as i64;
    Some((ground as i64).rem_euclid(num_patterns) as PatternId)
}

/// Forbids the ground pattern from every row but the last, and collapses every cell of the
/// last row to it. Changed cells are left on the dirty stack for propagation.
pub fn apply_ground(wave: &mut Wave, ground: i32) {
    let pattern_id = match ground_pattern_id(ground, wave.num_patterns()) {
        Some(pattern_id) => pattern_id,
        None => return,
    };
    let size = wave.size();
    let last_row = size.height() as i32 - 1;
    for x in 0..size.width() as i32 {
        for y in 0..last_row {
            let index = wave.index_of_coord(Coord::new(x, y));
            wave.set_coefficient(index, pattern_id, false);
        }
        let index = wave.index_of_coord(Coord::new(x, last_row));
        wave.collapse(index, pattern_id);
    }
}
