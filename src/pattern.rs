use crate::bitmap::{Bitmap, Rgba32};
use crate::config::{validate_pattern_size, Config};
use crate::error::Result;
use crate::orientation::Symmetry;
use crate::window::SourceWindow;
use coord_2d::{Coord, Size};
use grid_2d::Grid;
use hashbrown::HashMap;
use log::debug;
use std::iter;
use std::ops::{Index, IndexMut};
use std::slice;

pub type PatternId = u32;
pub type ColourId = u32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternTable<T> {
    table: Vec<T>,
}

impl<T> Default for PatternTable<T> {
    fn default() -> Self {
        Self { table: Vec::new() }
    }
}

impl<T> PatternTable<T> {
    pub fn from_vec(table: Vec<T>) -> Self {
        Self { table }
    }
    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
    pub fn iter(&self) -> slice::Iter<T> {
        self.table.iter()
    }
    pub fn iter_mut(&mut self) -> slice::IterMut<T> {
        self.table.iter_mut()
    }
    pub fn enumerate(&self) -> impl Iterator<Item = (PatternId, &T)> {
        self.iter()
            .enumerate()
            .map(|(index, item)| (index as PatternId, item))
    }
    fn push(&mut self, value: T) -> PatternId {
        self.table.push(value);
        (self.table.len() - 1) as PatternId
    }
}

impl<T: Clone> PatternTable<T> {
    pub fn new_clone(len: usize, value: T) -> Self {
        Self {
            table: vec![value; len],
        }
    }
    pub fn fill(&mut self, value: T) {
        self.table.iter_mut().for_each(|v| *v = value.clone());
    }
}

impl<T> iter::FromIterator<T> for PatternTable<T> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            table: Vec::from_iter(iter),
        }
    }
}

impl<T> Index<PatternId> for PatternTable<T> {
    type Output = T;
    fn index(&self, index: PatternId) -> &Self::Output {
        self.table.index(index as usize)
    }
}

impl<T> IndexMut<PatternId> for PatternTable<T> {
    fn index_mut(&mut self, index: PatternId) -> &mut Self::Output {
        self.table.index_mut(index as usize)
    }
}

/// The distinct colours of a source bitmap, indexed in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colours: Vec<Rgba32>,
    ids: HashMap<Rgba32, ColourId>,
}

impl Palette {
    pub fn new(bitmap: &Bitmap) -> Self {
        let mut palette = Self::default();
        for colour in bitmap.pixels() {
            if !palette.ids.contains_key(&colour) {
                palette.ids.insert(colour, palette.colours.len() as ColourId);
                palette.colours.push(colour);
            }
        }
        palette
    }
    pub fn len(&self) -> usize {
        self.colours.len()
    }
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }
    pub fn colour(&self, colour_id: ColourId) -> Rgba32 {
        self.colours[colour_id as usize]
    }
    pub fn colour_id(&self, colour: Rgba32) -> Option<ColourId> {
        self.ids.get(&colour).copied()
    }
    pub fn colours(&self) -> &[Rgba32] {
        &self.colours
    }
    fn id_grid(&self, bitmap: &Bitmap) -> Grid<ColourId> {
        Grid::new_fn(bitmap.size(), |coord| self.ids[bitmap.grid().get_checked(coord)])
    }
}

/// A square of palette indices stored row-major, and the number of sampled windows (counting
/// each included orientation) that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    colours: Vec<ColourId>,
    size: u32,
    count: u32,
}

impl Pattern {
    pub fn size(&self) -> u32 {
        self.size
    }
    pub fn colours(&self) -> &[ColourId] {
        &self.colours
    }
    /// The colour at a local coordinate, which must be inside the pattern.
    pub fn get(&self, coord: Coord) -> ColourId {
        self.colours[coord.x as usize + coord.y as usize * self.size as usize]
    }
    pub fn top_left(&self) -> ColourId {
        self.colours[0]
    }
    pub fn weight(&self) -> u32 {
        self.count
    }
}

/// Every distinct pattern of a source bitmap, with its weight.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    palette: Palette,
    patterns: PatternTable<Pattern>,
    pattern_size: u32,
    num_windows: usize,
    symmetry: Symmetry,
}

impl PatternCatalog {
    pub fn new(
        bitmap: &Bitmap,
        pattern_size: u32,
        periodic_input: bool,
        symmetry: Symmetry,
    ) -> Result<Self> {
        let input_size = bitmap.size();
        validate_pattern_size(pattern_size, periodic_input, input_size)?;
        let palette = Palette::new(bitmap);
        let grid = palette.id_grid(bitmap);
        let window_positions = if periodic_input {
            input_size
        } else {
            Size::new(
                input_size.width() - pattern_size + 1,
                input_size.height() - pattern_size + 1,
            )
        };
        let mut patterns = PatternTable::default();
        let mut pattern_ids = HashMap::new();
        for y in 0..window_positions.height() as i32 {
            for x in 0..window_positions.width() as i32 {
                for &orientation in symmetry.orientations() {
                    let window =
                        SourceWindow::new(&grid, Coord::new(x, y), pattern_size, orientation);
                    let pattern_id = *pattern_ids.entry(window).or_insert_with(|| {
                        patterns.push(Pattern {
                            colours: window.colours().collect(),
                            size: pattern_size,
                            count: 0,
                        })
                    });
                    patterns[pattern_id].count += 1;
                }
            }
        }
        let catalog = Self {
            palette,
            patterns,
            pattern_size,
            num_windows: window_positions.count(),
            symmetry,
        };
        debug!(
            "extracted {} patterns of size {} from {} windows ({} colours, total weight {})",
            catalog.num_patterns(),
            pattern_size,
            catalog.num_windows,
            catalog.palette.len(),
            catalog.total_weight(),
        );
        Ok(catalog)
    }

    pub fn from_config(bitmap: &Bitmap, config: &Config) -> Result<Self> {
        Self::new(
            bitmap,
            config.pattern_size,
            config.periodic_input,
            config.symmetry,
        )
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
    pub fn pattern_size(&self) -> u32 {
        self.pattern_size
    }
    pub fn num_patterns(&self) -> usize {
        self.patterns.len()
    }
    pub fn pattern(&self, pattern_id: PatternId) -> &Pattern {
        &self.patterns[pattern_id]
    }
    pub fn patterns(&self) -> &PatternTable<Pattern> {
        &self.patterns
    }
    pub fn weight(&self, pattern_id: PatternId) -> u32 {
        self.patterns[pattern_id].count
    }
    pub fn total_weight(&self) -> u64 {
        self.patterns.iter().map(|p| p.count as u64).sum()
    }
    /// Number of window positions sampled from the source, not counting orientations.
    pub fn num_windows(&self) -> usize {
        self.num_windows
    }
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use crate::orientation::Orientation;
    use proptest::prelude::*;

    fn bitmap(width: u32, height: u32, pixels: &[u32]) -> Bitmap {
        Bitmap::new(width, height, pixels.to_vec()).unwrap()
    }

    fn oriented(pattern: &Pattern, orientation: Orientation) -> Vec<ColourId> {
        let size = pattern.size();
        let mut colours = Vec::new();
        for y in 0..size as i32 {
            for x in 0..size as i32 {
                colours.push(pattern.get(orientation.transform_coord(size, Coord::new(x, y))));
            }
        }
        colours
    }

    #[test]
    fn default_table_is_empty() {
        let mut table = PatternTable::<Pattern>::default();
        assert!(table.is_empty());
        let pattern_id = table.push(Pattern {
            colours: vec![0],
            size: 1,
            count: 3,
        });
        assert_eq!(pattern_id, 0);
        assert_eq!(table[0].weight(), 3);
    }

    #[test]
    fn palette_first_seen_order() {
        let b = bitmap(3, 2, &[7, 3, 7, 9, 3, 1]);
        let palette = Palette::new(&b);
        assert_eq!(palette.colours(), &[7, 3, 9, 1]);
        assert_eq!(palette.colour_id(9), Some(2));
        assert_eq!(palette.colour_id(4), None);
    }

    #[test]
    fn uniform_source_has_one_pattern() {
        let b = bitmap(3, 3, &[5; 9]);
        let catalog = PatternCatalog::new(&b, 2, true, Symmetry::All).unwrap();
        assert_eq!(catalog.num_patterns(), 1);
        assert_eq!(catalog.weight(0), 9 * 8);
        assert_eq!(catalog.pattern(0).colours(), &[0, 0, 0, 0]);
    }

    #[test]
    fn single_pixel() {
        let b = bitmap(1, 1, &[42]);
        assert!(matches!(
            PatternCatalog::new(&b, 2, false, Symmetry::None),
            Err(Error::InvalidConfig(_))
        ));
        let catalog = PatternCatalog::new(&b, 2, true, Symmetry::None).unwrap();
        assert_eq!(catalog.num_patterns(), 1);
        assert_eq!(catalog.pattern(0).colours(), &[0, 0, 0, 0]);
        assert_eq!(catalog.palette().colour(0), 42);
    }

    #[test]
    fn zero_pattern_size() {
        let b = bitmap(2, 2, &[0, 1, 1, 0]);
        assert!(PatternCatalog::new(&b, 0, true, Symmetry::None).is_err());
    }

    #[test]
    fn non_periodic_windows() {
        // 0 1 1
        // 1 0 1
        let b = bitmap(3, 2, &[0, 1, 1, 1, 0, 1]);
        let catalog = PatternCatalog::new(&b, 2, false, Symmetry::None).unwrap();
        assert_eq!(catalog.num_windows(), 2);
        assert_eq!(catalog.num_patterns(), 2);
        assert_eq!(catalog.pattern(0).colours(), &[0, 1, 1, 0]);
        assert_eq!(catalog.pattern(1).colours(), &[1, 1, 0, 1]);
    }

    #[test]
    fn periodic_windows_wrap() {
        let b = bitmap(2, 2, &[0, 1, 1, 0]);
        let catalog = PatternCatalog::new(&b, 2, true, Symmetry::None).unwrap();
        assert_eq!(catalog.num_windows(), 4);
        assert_eq!(catalog.num_patterns(), 2);
        assert_eq!(catalog.pattern(0).colours(), &[0, 1, 1, 0]);
        assert_eq!(catalog.pattern(1).colours(), &[1, 0, 0, 1]);
        assert_eq!(catalog.weight(0), 2);
        assert_eq!(catalog.weight(1), 2);
    }

    #[test]
    fn reflect_symmetry_adds_mirror_image() {
        // a single asymmetric window
        let b = bitmap(2, 2, &[0, 1, 2, 3]);
        let catalog = PatternCatalog::new(&b, 2, false, Symmetry::Reflect).unwrap();
        assert_eq!(catalog.num_patterns(), 2);
        assert_eq!(catalog.pattern(1).colours(), &[1, 0, 3, 2]);
    }

    fn arb_bitmap() -> impl Strategy<Value = Bitmap> {
        (1u32..6, 1u32..6).prop_flat_map(|(w, h)| {
            proptest::collection::vec(0u32..3, (w * h) as usize)
                .prop_map(move |pixels| Bitmap::new(w, h, pixels).unwrap())
        })
    }

    proptest! {
        #[test]
        fn palette_is_deterministic(b in arb_bitmap()) {
            let a = PatternCatalog::new(&b, 2, true, Symmetry::All).unwrap();
            let c = PatternCatalog::new(&b, 2, true, Symmetry::All).unwrap();
            prop_assert_eq!(a.palette().colours(), c.palette().colours());
            prop_assert_eq!(a.patterns(), c.patterns());
        }

        #[test]
        fn weights_are_conserved(b in arb_bitmap(), n in 1u32..4, periodic in any::<bool>()) {
            let symmetries = [Symmetry::None, Symmetry::Reflect, Symmetry::All];
            for &symmetry in &symmetries {
                match PatternCatalog::new(&b, n, periodic, symmetry) {
                    Ok(catalog) => prop_assert_eq!(
                        catalog.total_weight(),
                        (catalog.num_windows() * symmetry.count()) as u64
                    ),
                    Err(_) => prop_assert!(!periodic),
                }
            }
        }

        #[test]
        fn full_symmetry_is_closed(b in arb_bitmap(), n in 1u32..4) {
            let catalog = PatternCatalog::new(&b, n, true, Symmetry::All).unwrap();
            let all = catalog
                .patterns()
                .iter()
                .map(|p| p.colours().to_vec())
                .collect::<Vec<_>>();
            for pattern in catalog.patterns().iter() {
                prop_assert!(all.contains(&oriented(pattern, Orientation::Reflected)));
                prop_assert!(all.contains(&oriented(pattern, Orientation::Rotated90)));
            }
        }
    }
}
