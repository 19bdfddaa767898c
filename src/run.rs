use crate::config::TickConfig;
use crate::error::PropagateError;
use crate::model::{Model, WaveCellRef};
use crate::observer::Observation;
use crate::propagate::{propagate_all, propagate_step};
use crate::retry;
use crate::wave::{CellIndex, Wave};
use log::{info, trace};
use rand::Rng;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observe {
    Incomplete,
    Complete,
}

/// What a single tick achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Still working. Holds the cell collapsed during this tick, if any.
    InProgress(Option<CellIndex>),
    /// Every cell is decided. Further ticks do nothing.
    Done,
    /// A contradiction was found and the wave has been reset for another attempt.
    Contradiction,
    /// The run was cancelled. Further ticks do nothing.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Observing,
    Propagating,
    Done,
    Cancelled,
}

/// Shrinks the per-tick propagation bound when a tick ran over its budget, and grows it when
/// a tick that used up the bound still finished early.
pub fn adapt_propagation_steps(
    steps: usize,
    bound_reached: bool,
    elapsed: Duration,
    budget: Duration,
) -> usize {
    if elapsed > budget {
        (steps - steps / 4).max(1)
    } else if bound_reached {
        steps.saturating_add(steps / 4 + 1)
    } else {
        steps
    }
}

/// A single generation request: the wave being collapsed, along with the driver state needed
/// to advance it a little at a time.
#[derive(Debug, Clone)]
pub struct Run<'a> {
    model: &'a Model,
    wave: Wave,
    state: State,
    tick_config: TickConfig,
    propagation_steps_per_tick: usize,
    attempts: usize,
    num_collapses: usize,
}

impl<'a> Run<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self::with_tick_config(model, TickConfig::default())
    }

    pub fn with_tick_config(model: &'a Model, tick_config: TickConfig) -> Self {
        Self {
            model,
            wave: model.new_wave(),
            state: State::Propagating,
            tick_config,
            propagation_steps_per_tick: tick_config.initial_propagation_steps.max(1),
            attempts: 1,
            num_collapses: 0,
        }
    }

    /// Starts another attempt from a fully superposed wave.
    pub fn reset(&mut self) {
        info!(
            "restarting after {} collapses (attempt {})",
            self.num_collapses,
            self.attempts + 1
        );
        self.model.reset_wave(&mut self.wave);
        self.state = State::Propagating;
        self.attempts += 1;
        self.num_collapses = 0;
    }

    fn step_core<R: Rng>(&mut self, rng: &mut R) -> Result<Observe, PropagateError> {
        propagate_all(&mut self.wave, self.model.propagator())?;
        match self.model.observer().observe(&mut self.wave, rng) {
            Observation::Complete => {
                self.complete();
                Ok(Observe::Complete)
            }
            Observation::Contradiction => Err(PropagateError::Contradiction),
            Observation::Collapsed(_) => {
                self.num_collapses += 1;
                propagate_all(&mut self.wave, self.model.propagator())?;
                self.state = State::Observing;
                Ok(Observe::Incomplete)
            }
        }
    }

    /// Collapses one cell and propagates the consequences. The run is reset if this leads to a
    /// contradiction.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Result<Observe, PropagateError> {
        match self.state {
            State::Done => return Ok(Observe::Complete),
            State::Cancelled => return Err(PropagateError::Cancelled),
            State::Observing | State::Propagating => (),
        }
        let result = self.step_core(rng);
        if result.is_err() {
            self.reset();
        }
        result
    }

    /// Steps until every cell is decided. The run is reset if this leads to a contradiction.
    /// A cancelled run is left as it is and reports `PropagateError::Cancelled`.
    pub fn collapse<R: Rng>(&mut self, rng: &mut R) -> Result<(), PropagateError> {
        loop {
            if let Observe::Complete = self.step(rng)? {
                return Ok(());
            }
        }
    }

    pub fn collapse_retrying<R, RT>(self, mut retry: RT, rng: &mut R) -> RT::Return
    where
        R: Rng,
        RT: retry::Retry,
    {
        retry.retry(self, rng)
    }

    /// Advances the run within the configured time budget.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Status {
        self.tick_with_budget(self.tick_config.target, rng)
    }

    /// Performs one observation if nothing is waiting to be propagated, then at most the
    /// current number of propagation steps. That number is adjusted afterwards according to
    /// how long the tick took compared to `budget`.
    pub fn tick_with_budget<R: Rng>(&mut self, budget: Duration, rng: &mut R) -> Status {
        let start = Instant::now();
        let mut collapsed = None;
        match self.state {
            State::Done => return Status::Done,
            State::Cancelled => return Status::Cancelled,
            State::Propagating => (),
            State::Observing => match self.model.observer().observe(&mut self.wave, rng) {
                Observation::Complete => {
                    self.complete();
                    return Status::Done;
                }
                Observation::Contradiction => {
                    self.reset();
                    return Status::Contradiction;
                }
                Observation::Collapsed(index) => {
                    self.num_collapses += 1;
                    collapsed = Some(index);
                    self.state = State::Propagating;
                }
            },
        }
        let mut steps = 0;
        while steps < self.propagation_steps_per_tick {
            match propagate_step(&mut self.wave, self.model.propagator()) {
                Ok(Some(_)) => steps += 1,
                Ok(None) => break,
                Err(_) => {
                    self.reset();
                    return Status::Contradiction;
                }
            }
        }
        if self.wave.num_dirty() == 0 {
            self.state = State::Observing;
        }
        let elapsed = start.elapsed();
        let adapted = adapt_propagation_steps(
            self.propagation_steps_per_tick,
            steps == self.propagation_steps_per_tick,
            elapsed,
            budget,
        );
        if adapted != self.propagation_steps_per_tick {
            trace!(
                "tick took {:?}; propagation steps per tick {} -> {}",
                elapsed,
                self.propagation_steps_per_tick,
                adapted
            );
            self.propagation_steps_per_tick = adapted;
        }
        Status::InProgress(collapsed)
    }

    fn complete(&mut self) {
        if self.state != State::Done {
            info!(
                "generation complete after {} collapses (attempt {})",
                self.num_collapses, self.attempts
            );
        }
        self.state = State::Done;
    }

    /// Stops the run. Every later tick reports `Status::Cancelled`, and `step` and `collapse`
    /// fail with `PropagateError::Cancelled`.
    pub fn cancel(&mut self) {
        self.state = State::Cancelled;
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }
    pub fn is_cancelled(&self) -> bool {
        self.state == State::Cancelled
    }
    pub fn model(&self) -> &'a Model {
        self.model
    }
    pub fn wave(&self) -> &Wave {
        &self.wave
    }
    pub fn into_wave(self) -> Wave {
        self.wave
    }
    pub fn wave_cell_ref(&self, index: CellIndex) -> WaveCellRef {
        self.model.wave_cell_ref(self.wave.cell(index))
    }
    /// Number of attempts started so far, including the current one.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
    /// Number of observations made in the current attempt.
    pub fn num_collapses(&self) -> usize {
        self.num_collapses
    }
    pub fn num_collapsed(&self) -> usize {
        self.wave.num_collapsed()
    }
    pub fn propagation_steps_per_tick(&self) -> usize {
        self.propagation_steps_per_tick
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::config::Config;
    use crate::orientation::Symmetry;
    use crate::pattern::PatternId;
    use coord_2d::Coord;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn checkerboard_model(output_width: u32, output_height: u32) -> Model {
        let bitmap = Bitmap::new(2, 2, vec![0xff000000, 0xffffffff, 0xffffffff, 0xff000000])
            .unwrap();
        let config = Config {
            pattern_size: 2,
            symmetry: Symmetry::All,
            output_width,
            output_height,
            ..Config::default()
        };
        Model::new(&bitmap, &config).unwrap()
    }

    fn stripes_model() -> Model {
        // vertical stripes of three colours
        let row = [1, 2, 3, 1, 2, 3];
        let pixels = row.iter().cycle().take(36).copied().collect();
        let bitmap = Bitmap::new(6, 6, pixels).unwrap();
        let config = Config {
            pattern_size: 3,
            symmetry: Symmetry::None,
            periodic_output: false,
            output_width: 12,
            output_height: 9,
            ..Config::default()
        };
        Model::new(&bitmap, &config).unwrap()
    }

    fn top_left_colour(model: &Model, wave: &Wave, coord: Coord) -> u32 {
        let pattern_id = wave
            .cell(wave.index_of_coord(coord))
            .chosen_pattern_id()
            .unwrap();
        model.pattern_top_left_colour(pattern_id)
    }

    #[test]
    fn checkerboard_output() {
        let model = checkerboard_model(8, 8);
        assert_eq!(model.num_patterns(), 2);
        let mut run = Run::new(&model);
        let mut rng = XorShiftRng::seed_from_u64(0);
        run.collapse(&mut rng).unwrap();
        assert!(run.is_done());
        let wave = run.wave();
        assert!(wave.is_fully_collapsed());
        assert!(model.wave_is_consistent(wave));
        let origin = top_left_colour(&model, wave, Coord::new(0, 0));
        for (coord, _) in wave.grid().enumerate() {
            let colour = top_left_colour(&model, wave, coord);
            assert_eq!(colour == origin, (coord.x + coord.y) % 2 == 0);
        }
    }

    #[test]
    fn odd_checkerboard_source() {
        // the wrap of an odd-sized checkerboard puts equal colours side by side
        let pixels = (0..9)
            .map(|i| if (i % 3 + i / 3) % 2 == 0 { 0xff000000 } else { 0xffffffff })
            .collect();
        let bitmap = Bitmap::new(3, 3, pixels).unwrap();
        let config = Config {
            pattern_size: 2,
            periodic_input: true,
            symmetry: Symmetry::None,
            periodic_output: true,
            output_width: 8,
            output_height: 8,
            ..Config::default()
        };
        let model = Model::new(&bitmap, &config).unwrap();
        assert_eq!(model.num_patterns(), 7);
        let mut rng = XorShiftRng::seed_from_u64(0);
        let wave = Run::new(&model)
            .collapse_retrying(retry::NumTimes(50), &mut rng)
            .unwrap();
        assert!(wave.is_fully_collapsed());
        assert!(model.wave_is_consistent(&wave));
    }

    #[test]
    fn single_pixel_source() {
        let bitmap = Bitmap::new(1, 1, vec![0xff0000ff]).unwrap();
        let config = Config {
            pattern_size: 2,
            output_width: 5,
            output_height: 4,
            ..Config::default()
        };
        let model = Model::new(&bitmap, &config).unwrap();
        let mut run = Run::new(&model);
        let mut rng = XorShiftRng::seed_from_u64(0);
        assert_eq!(run.step(&mut rng), Ok(Observe::Complete));
        assert_eq!(run.num_collapses(), 0);
        assert!(run
            .wave()
            .grid()
            .iter()
            .all(|cell| cell.chosen_pattern_id() == Ok(0)));
        assert_eq!(run.tick(&mut rng), Status::Done);
    }

    #[test]
    fn ground_pins_bottom_row() {
        let bitmap = Bitmap::new(3, 1, vec![5, 6, 7]).unwrap();
        for &(ground, ground_pattern_id) in &[(1, 1), (-1, 2)] {
            let config = Config {
                pattern_size: 1,
                symmetry: Symmetry::None,
                output_width: 6,
                output_height: 5,
                ground,
                ..Config::default()
            };
            let model = Model::new(&bitmap, &config).unwrap();
            assert_eq!(model.num_patterns(), 3);
            let mut run = Run::new(&model);
            let mut rng = XorShiftRng::seed_from_u64(1);
            run.collapse(&mut rng).unwrap();
            let wave = run.wave();
            for (coord, cell) in wave.grid().enumerate() {
                let pattern_id = cell.chosen_pattern_id().unwrap();
                if coord.y == 4 {
                    assert_eq!(pattern_id, ground_pattern_id);
                } else {
                    assert_ne!(pattern_id, ground_pattern_id);
                }
            }
        }
    }

    #[test]
    fn periodic_runs_terminate_consistently() {
        let bitmap = Bitmap::new(
            4,
            4,
            vec![0, 0, 0, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 0, 0],
        )
        .unwrap();
        let config = Config {
            pattern_size: 2,
            output_width: 10,
            output_height: 10,
            ..Config::default()
        };
        let model = Model::new(&bitmap, &config).unwrap();
        for seed in 0..10 {
            let mut rng = XorShiftRng::seed_from_u64(seed);
            let wave = Run::new(&model).collapse_retrying(retry::Forever, &mut rng);
            assert!(wave.is_fully_collapsed());
            assert!(model.wave_is_consistent(&wave));
        }
    }

    #[test]
    fn bounded_runs_terminate_consistently() {
        let model = stripes_model();
        assert_eq!(model.num_patterns(), 3);
        for seed in 0..10 {
            let mut rng = XorShiftRng::seed_from_u64(seed);
            let wave = Run::new(&model)
                .collapse_retrying(retry::NumTimes(100), &mut rng)
                .unwrap();
            assert!(model.wave_is_consistent(&wave));
            // the last pattern_size - 1 rows and columns are never observed
            let size = wave.size();
            let corner = Coord::new(size.width() as i32 - 1, size.height() as i32 - 1);
            assert_eq!(wave.cell(wave.index_of_coord(corner)).num_possible(), 3);
        }
    }

    #[test]
    fn ticking_reaches_done() {
        let model = checkerboard_model(16, 16);
        let tick_config = TickConfig {
            target: Duration::from_secs(1),
            initial_propagation_steps: 4,
        };
        let mut run = Run::with_tick_config(&model, tick_config);
        let mut rng = XorShiftRng::seed_from_u64(2);
        let mut collapsed = Vec::new();
        let mut ticks = 0;
        loop {
            ticks += 1;
            assert!(ticks < 100_000, "too many ticks");
            match run.tick(&mut rng) {
                Status::InProgress(Some(index)) => collapsed.push(index),
                Status::InProgress(None) | Status::Contradiction => (),
                Status::Done => break,
                Status::Cancelled => panic!("not cancelled"),
            }
        }
        // a checkerboard is decided by its first collapse
        assert_eq!(collapsed.len(), 1);
        assert!(run.propagation_steps_per_tick() > 4);
        assert!(model.wave_is_consistent(run.wave()));
        assert_eq!(run.tick(&mut rng), Status::Done);
    }

    #[test]
    fn tick_observes_one_cell_at_a_time() {
        let bitmap = Bitmap::new(2, 1, vec![0, 1]).unwrap();
        let config = Config {
            pattern_size: 1,
            symmetry: Symmetry::None,
            output_width: 3,
            output_height: 3,
            ..Config::default()
        };
        let model = Model::new(&bitmap, &config).unwrap();
        let mut run = Run::new(&model);
        let mut rng = XorShiftRng::seed_from_u64(3);
        // nothing to propagate on the first tick
        assert_eq!(run.tick(&mut rng), Status::InProgress(None));
        // every 1x1 pattern agrees with every other, so each tick decides exactly one cell
        for expected in 1..=9 {
            assert!(matches!(run.tick(&mut rng), Status::InProgress(Some(_))));
            assert_eq!(run.num_collapsed(), expected);
        }
        assert_eq!(run.tick(&mut rng), Status::Done);
        assert_eq!(run.num_collapses(), 9);
    }

    #[test]
    fn contradiction_resets() {
        let model = checkerboard_model(3, 3);
        let mut run = Run::new(&model);
        let mut rng = XorShiftRng::seed_from_u64(0);
        assert_eq!(run.collapse(&mut rng), Err(PropagateError::Contradiction));
        assert_eq!(run.attempts(), 2);
        assert_eq!(run.num_collapses(), 0);
        assert!(run.wave().grid().iter().all(|cell| cell.num_possible() == 2));
        let mut statuses = Vec::new();
        for _ in 0..8 {
            statuses.push(run.tick(&mut rng));
        }
        assert!(statuses.contains(&Status::Contradiction));
        assert!(run.attempts() > 2);
        let result = Run::new(&model)
            .collapse_retrying(retry::NumTimes(3), &mut rng)
            .map(|wave| wave.num_cells());
        assert_eq!(result, Err(PropagateError::Contradiction));
    }

    #[test]
    fn cancel_stops_ticking() {
        let model = checkerboard_model(8, 8);
        let mut run = Run::new(&model);
        let mut rng = XorShiftRng::seed_from_u64(0);
        run.tick(&mut rng);
        run.cancel();
        assert!(run.is_cancelled());
        assert_eq!(run.tick(&mut rng), Status::Cancelled);
        assert_eq!(run.tick(&mut rng), Status::Cancelled);
        assert_eq!(run.collapse(&mut rng), Err(PropagateError::Cancelled));
        assert_eq!(run.step(&mut rng), Err(PropagateError::Cancelled));
        assert!(run.is_cancelled());
        assert!(!run.is_done());
    }

    #[test]
    fn wave_cell_ref_reports_weights() {
        let model = checkerboard_model(4, 4);
        let run = Run::new(&model);
        let cell_ref = run.wave_cell_ref(0);
        assert_eq!(cell_ref.num_possible(), 2);
        assert_eq!(cell_ref.sum_compatible_pattern_weight(), 32);
        let ids = cell_ref
            .enumerate_compatible_pattern_weights()
            .map(|(pattern_id, _)| pattern_id)
            .collect::<Vec<PatternId>>();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn adaptation() {
        let budget = Duration::from_millis(22);
        let over = Duration::from_millis(30);
        let under = Duration::from_millis(10);
        assert_eq!(adapt_propagation_steps(1000, true, over, budget), 750);
        assert_eq!(adapt_propagation_steps(1, true, over, budget), 1);
        assert_eq!(adapt_propagation_steps(1000, true, under, budget), 1251);
        assert_eq!(adapt_propagation_steps(1000, false, under, budget), 1000);
        assert_eq!(adapt_propagation_steps(0, false, over, budget), 1);
    }
}
