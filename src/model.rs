use crate::bitmap::{Bitmap, Rgba32};
use crate::config::Config;
use crate::error::Result;
use crate::ground::apply_ground;
use crate::observer::Observer;
use crate::pattern::{Palette, Pattern, PatternCatalog, PatternId};
use crate::propagator::{offsets, Propagator};
use crate::wave::{ChosenPatternIdError, Wave, WaveCell};

/// Everything derived from the source bitmap and the configuration, computed once per
/// generation request and shared by every run.
#[derive(Debug, Clone)]
pub struct Model {
    config: Config,
    catalog: PatternCatalog,
    propagator: Propagator,
    observer: Observer,
}

impl Model {
    pub fn new(bitmap: &Bitmap, config: &Config) -> Result<Self> {
        config.validate(bitmap.size())?;
        let catalog = PatternCatalog::from_config(bitmap, config)?;
        let propagator = Propagator::new(&catalog);
        let observer = Observer::new(&catalog);
        Ok(Self {
            config: *config,
            catalog,
            propagator,
            observer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }
    pub fn propagator(&self) -> &Propagator {
        &self.propagator
    }
    pub fn observer(&self) -> &Observer {
        &self.observer
    }
    pub fn palette(&self) -> &Palette {
        self.catalog.palette()
    }
    pub fn num_patterns(&self) -> usize {
        self.catalog.num_patterns()
    }
    pub fn pattern(&self, pattern_id: PatternId) -> &Pattern {
        self.catalog.pattern(pattern_id)
    }
    pub fn pattern_top_left_colour(&self, pattern_id: PatternId) -> Rgba32 {
        self.palette()
            .colour(self.catalog.pattern(pattern_id).top_left())
    }

    /// A fully superposed wave of the configured output size, with the ground constraint
    /// applied but not yet propagated.
    pub fn new_wave(&self) -> Wave {
        let mut wave = Wave::new(
            self.num_patterns(),
            self.config.output_size(),
            self.config.periodic_output,
        );
        apply_ground(&mut wave, self.config.ground);
        wave
    }

    pub fn reset_wave(&self, wave: &mut Wave) {
        wave.clear();
        apply_ground(wave, self.config.ground);
    }

    pub fn wave_cell_ref<'a>(&'a self, wave_cell: &'a WaveCell) -> WaveCellRef<'a> {
        WaveCellRef {
            wave_cell,
            model: self,
        }
    }

    /// Whether every cell where a pattern may be placed holds exactly one pattern, and every
    /// pair of overlapping patterns agrees.
    pub fn wave_is_consistent(&self, wave: &Wave) -> bool {
        let size = wave.size();
        let wrap = wave.wrap();
        let pattern_size = self.catalog.pattern_size();
        wave.grid().enumerate().all(|(coord, cell)| {
            if !wrap.is_placeable(coord, size, pattern_size) {
                return true;
            }
            let pattern_id = match cell.chosen_pattern_id() {
                Ok(pattern_id) => pattern_id,
                Err(_) => return false,
            };
            offsets(pattern_size).all(|offset| {
                match wrap.normalize_coord(coord + offset, size, pattern_size) {
                    None => true,
                    Some(neighbour) => {
                        let neighbour = wave.cell(wave.index_of_coord(neighbour));
                        match neighbour.chosen_pattern_id() {
                            Ok(neighbour_id) => {
                                self.propagator.is_compatible(pattern_id, neighbour_id, offset)
                            }
                            Err(_) => false,
                        }
                    }
                }
            })
        })
    }
}

/// A cell of a wave together with the model it was generated from, for inspecting it from
/// outside the solver.
#[derive(Clone, Copy)]
pub struct WaveCellRef<'a> {
    wave_cell: &'a WaveCell,
    model: &'a Model,
}

impl<'a> WaveCellRef<'a> {
    pub fn cell(&self) -> &'a WaveCell {
        self.wave_cell
    }
    pub fn num_possible(&self) -> u32 {
        self.wave_cell.num_possible()
    }
    pub fn chosen_pattern_id(&self) -> std::result::Result<PatternId, ChosenPatternIdError> {
        self.wave_cell.chosen_pattern_id()
    }
    /// The possible patterns and their weights.
    pub fn enumerate_compatible_pattern_weights(
        &self,
    ) -> impl Iterator<Item = (PatternId, u32)> + 'a {
        let catalog = self.model.catalog();
        self.wave_cell
            .possible_pattern_ids()
            .map(move |pattern_id| (pattern_id, catalog.weight(pattern_id)))
    }
    pub fn sum_compatible_pattern_weight(&self) -> u32 {
        self.enumerate_compatible_pattern_weights()
            .map(|(_, weight)| weight)
            .sum()
    }
}
