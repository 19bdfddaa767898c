use crate::pattern::{PatternCatalog, PatternId, PatternTable};
use crate::wave::{CellIndex, Wave, WaveCell};
use log::trace;
use rand::Rng;

const NOISE_SCALE: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
pub struct PatternWeight {
    weight: u32,
    weight_log_weight: f64,
}

impl PatternWeight {
    pub fn new(weight: u32) -> Self {
        let w = weight as f64;
        Self {
            weight,
            weight_log_weight: if weight == 0 { 0. } else { w * w.ln() },
        }
    }
    pub fn weight(&self) -> u32 {
        self.weight
    }
    pub fn weight_log_weight(&self) -> f64 {
        self.weight_log_weight
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The cell at this index was collapsed to a single pattern.
    Collapsed(CellIndex),
    /// Every cell that can be observed has a single pattern left.
    Complete,
    /// Some cell has no possible pattern left.
    Contradiction,
}

enum CellEntropy {
    Contradiction,
    Decided,
    Entropy(f64),
}

/// Chooses which cell to collapse next, and what to collapse it to.
#[derive(Debug, Clone)]
pub struct Observer {
    pattern_weights: PatternTable<PatternWeight>,
    log_num_patterns: f64,
    pattern_size: u32,
}

impl Observer {
    pub fn new(catalog: &PatternCatalog) -> Self {
        Self::from_weights(
            catalog.patterns().iter().map(|pattern| pattern.weight()),
            catalog.pattern_size(),
        )
    }

    pub fn from_weights(weights: impl IntoIterator<Item = u32>, pattern_size: u32) -> Self {
        let pattern_weights = weights
            .into_iter()
            .map(PatternWeight::new)
            .collect::<PatternTable<_>>();
        let log_num_patterns = (pattern_weights.len() as f64).ln();
        Self {
            pattern_weights,
            log_num_patterns,
            pattern_size,
        }
    }

    pub fn pattern_weights(&self) -> &PatternTable<PatternWeight> {
        &self.pattern_weights
    }

    // -(p0*ln(p0) + p1*ln(p1) + ...) = ln(n0+n1+...) - (n0*ln(n0) + n1*ln(n1) + ...) / (n0+n1+...)
    fn cell_entropy(&self, cell: &WaveCell) -> CellEntropy {
        let mut sum_weight = 0u64;
        let mut sum_weight_log_weight = 0.;
        for pattern_id in cell.possible_pattern_ids() {
            let pattern_weight = &self.pattern_weights[pattern_id];
            sum_weight += pattern_weight.weight() as u64;
            sum_weight_log_weight += pattern_weight.weight_log_weight();
        }
        if sum_weight == 0 {
            return CellEntropy::Contradiction;
        }
        if cell.num_possible() == 1 {
            return CellEntropy::Decided;
        }
        let sum_weight = sum_weight as f64;
        let entropy = sum_weight.ln() - sum_weight_log_weight / sum_weight;
        CellEntropy::Entropy(entropy / self.log_num_patterns)
    }

    /// Finds the observable cell with the lowest entropy, ignoring cells that are already
    /// decided, and collapses it to a pattern drawn according to the pattern weights.
    pub fn observe<R: Rng>(&self, wave: &mut Wave, rng: &mut R) -> Observation {
        let size = wave.size();
        let wrap = wave.wrap();
        let mut min_entropy = ::std::f64::INFINITY;
        let mut chosen = None;
        for (coord, cell) in wave.grid().enumerate() {
            if !wrap.is_placeable(coord, size, self.pattern_size) {
                continue;
            }
            if cell.is_collapsed() {
                continue;
            }
            match self.cell_entropy(cell) {
                CellEntropy::Contradiction => return Observation::Contradiction,
                CellEntropy::Decided => (),
                CellEntropy::Entropy(entropy) => {
                    if entropy > 0. {
                        let entropy_with_noise = entropy + NOISE_SCALE * rng.gen::<f64>();
                        if entropy_with_noise < min_entropy {
                            min_entropy = entropy_with_noise;
                            chosen = Some(coord);
                        }
                    }
                }
            }
        }
        let coord = match chosen {
            Some(coord) => coord,
            None => return Observation::Complete,
        };
        let index = wave.index_of_coord(coord);
        let pattern_id = self.choose_pattern_id(wave.cell(index), rng);
        trace!(
            "collapsing ({}, {}) with entropy {:.6} to pattern {}",
            coord.x,
            coord.y,
            min_entropy,
            pattern_id
        );
        wave.collapse(index, pattern_id);
        Observation::Collapsed(index)
    }

    fn choose_pattern_id<R: Rng>(&self, cell: &WaveCell, rng: &mut R) -> PatternId {
        let distribution = self
            .pattern_weights
            .enumerate()
            .map(|(pattern_id, pattern_weight)| {
                if cell.is_possible(pattern_id) {
                    pattern_weight.weight() as f64
                } else {
                    0.
                }
            })
            .collect::<Vec<_>>();
        random_index(&distribution, rng.gen::<f64>()) as PatternId
    }
}

/// Picks an index of `weights` for a uniform sample `r` in `[0, 1)`, with each index taking
/// a share of the unit interval proportional to its weight. If every weight is zero the
/// indices are treated as equally likely.
pub fn random_index(weights: &[f64], r: f64) -> usize {
    let sum = weights.iter().sum::<f64>();
    if sum <= 0. {
        if weights.is_empty() {
            return 0;
        }
        let uniform = vec![1.; weights.len()];
        return random_index(&uniform, r);
    }
    let mut cumulative = 0.;
    for (index, &weight) in weights.iter().enumerate() {
        cumulative += weight / sum;
        if weight > 0. && r < cumulative {
            return index;
        }
    }
    // rounding left r above the final cumulative value
    weights.iter().rposition(|&weight| weight > 0.).unwrap_or(0)
}
