extern crate coord_2d;
extern crate grid_2d;
extern crate hashbrown;
extern crate rand;

pub mod bitmap;
pub mod config;
mod error;
pub mod ground;
mod model;
pub mod observer;
pub mod orientation;
pub mod pattern;
pub mod propagate;
pub mod propagator;
pub mod retry;
mod run;
pub mod wave;
mod window;
pub mod wrap;

pub use bitmap::{Bitmap, Rgba32};
pub use config::{Config, TickConfig};
pub use coord_2d::{Coord, Size};
pub use error::{Error, PropagateError, Result};
pub use model::{Model, WaveCellRef};
pub use orientation::{Orientation, Symmetry};
pub use pattern::{PatternCatalog, PatternId};
pub use run::{adapt_propagation_steps, Observe, Run, Status};
pub use wave::{CellIndex, Wave, WaveCell};
