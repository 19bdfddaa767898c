use crate::pattern::{Pattern, PatternCatalog, PatternId, PatternTable};
use coord_2d::Coord;
use log::debug;

/// Whether `b`, placed at `offset` relative to `a`, has the same colours as `a` wherever the
/// two overlap.
fn are_patterns_compatible(a: &Pattern, b: &Pattern, offset: Coord) -> bool {
    let n = a.size() as i32;
    assert!(a.size() == b.size());
    let Coord { x: dx, y: dy } = offset;
    let (xmin, xmax) = (dx.max(0), (dx + n).min(n));
    let (ymin, ymax) = (dy.max(0), (dy + n).min(n));
    (ymin..ymax).all(|y| {
        (xmin..xmax).all(|x| a.get(Coord::new(x, y)) == b.get(Coord::new(x - dx, y - dy)))
    })
}

/// For every offset within a pattern's footprint (`-(N-1)..=N-1` on each axis) and every
/// pattern, the patterns that may be placed at that offset from it.
#[derive(Debug, Clone)]
pub struct Propagator {
    pattern_size: u32,
    compatible_per_offset: Vec<PatternTable<Vec<PatternId>>>,
}

impl Propagator {
    pub fn new(catalog: &PatternCatalog) -> Self {
        let pattern_size = catalog.pattern_size();
        let patterns = catalog.patterns();
        let compatible_per_offset = offsets(pattern_size)
            .map(|offset| {
                patterns
                    .iter()
                    .map(|pattern| {
                        patterns
                            .enumerate()
                            .filter(|(_, other)| are_patterns_compatible(pattern, other, offset))
                            .map(|(id, _)| id)
                            .collect::<Vec<_>>()
                    })
                    .collect::<PatternTable<_>>()
            })
            .collect::<Vec<_>>();
        debug!(
            "built compatibility tables for {} patterns over {} offsets ({} entries)",
            patterns.len(),
            compatible_per_offset.len(),
            compatible_per_offset
                .iter()
                .flat_map(|table| table.iter())
                .map(|compatible| compatible.len())
                .sum::<usize>(),
        );
        Self {
            pattern_size,
            compatible_per_offset,
        }
    }

    pub fn pattern_size(&self) -> u32 {
        self.pattern_size
    }

    fn offset_index(&self, offset: Coord) -> usize {
        let reach = self.pattern_size as i32 - 1;
        let side = 2 * reach + 1;
        assert!(
            offset.x.abs() <= reach && offset.y.abs() <= reach,
            "offset out of range"
        );
        ((offset.x + reach) + (offset.y + reach) * side) as usize
    }

    /// Patterns that may be placed at `offset` relative to `pattern_id`.
    pub fn compatible(&self, pattern_id: PatternId, offset: Coord) -> &[PatternId] {
        &self.compatible_per_offset[self.offset_index(offset)][pattern_id]
    }

    pub fn is_compatible(&self, a: PatternId, b: PatternId, offset: Coord) -> bool {
        self.compatible(a, offset).contains(&b)
    }
}

/// Every offset at which two patterns of the given size overlap, row by row.
pub fn offsets(pattern_size: u32) -> impl Iterator<Item = Coord> {
    let reach = pattern_size as i32 - 1;
    (-reach..=reach).flat_map(move |dy| (-reach..=reach).map(move |dx| Coord::new(dx, dy)))
}
