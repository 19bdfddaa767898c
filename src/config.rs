use crate::error::{Error, Result};
use crate::orientation::Symmetry;
use coord_2d::Size;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options of a single generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Side length of the square patterns sampled from the source bitmap.
    pub pattern_size: u32,
    /// Sample windows that wrap around the edges of the source bitmap.
    pub periodic_input: bool,
    /// How many reflected and rotated variants of each window to include.
    pub symmetry: Symmetry,
    /// Treat the output as a torus.
    pub periodic_output: bool,
    pub output_width: u32,
    pub output_height: u32,
    /// Signed index of a pattern to pin to the bottom row of the output. 0 disables it, and
    /// negative values count back from the last pattern.
    pub ground: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pattern_size: 3,
            periodic_input: true,
            symmetry: Symmetry::All,
            periodic_output: true,
            output_width: 48,
            output_height: 48,
            ground: 0,
        }
    }
}

impl Config {
    pub fn output_size(&self) -> Size {
        Size::new(self.output_width, self.output_height)
    }

    /// Checks the options against the size of the source bitmap they will be applied to.
    pub fn validate(&self, input_size: Size) -> Result<()> {
        validate_pattern_size(self.pattern_size, self.periodic_input, input_size)?;
        if self.output_width == 0 || self.output_height == 0 {
            return Err(Error::invalid_config(format!(
                "output size must be positive (got {}x{})",
                self.output_width, self.output_height
            )));
        }
        Ok(())
    }
}

/// Checks that windows of `pattern_size` can be sampled from a source of `input_size`.
pub(crate) fn validate_pattern_size(
    pattern_size: u32,
    periodic_input: bool,
    input_size: Size,
) -> Result<()> {
    if pattern_size < 1 {
        return Err(Error::invalid_config("pattern size must be at least 1"));
    }
    if !periodic_input && (input_size.width() < pattern_size || input_size.height() < pattern_size)
    {
        return Err(Error::invalid_config(format!(
            "non-periodic input of size {}x{} is smaller than the pattern size {}",
            input_size.width(),
            input_size.height(),
            pattern_size
        )));
    }
    Ok(())
}

/// Pacing of the cooperative generation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickConfig {
    /// Wall-clock time a single tick should aim to take.
    pub target: Duration,
    /// Number of propagation steps the first tick may perform.
    pub initial_propagation_steps: usize,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            // about 45 ticks per second
            target: Duration::from_millis(22),
            initial_propagation_steps: 1000,
        }
    }
}
