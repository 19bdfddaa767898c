//! Policies for what to do when a run ends in a contradiction.

use crate::error::PropagateError;
use crate::run::Run;
use crate::wave::Wave;
use rand::Rng;

pub trait Retry: private::Sealed {
    type Return;
    fn retry<'a, R: Rng>(&mut self, run: Run<'a>, rng: &mut R) -> Self::Return;
}

/// Keep restarting until a run completes. A cancelled run is returned as it stands, so its
/// wave may still have undecided cells.
#[derive(Debug, Clone, Copy)]
pub struct Forever;

impl Retry for Forever {
    type Return = Wave;
    fn retry<'a, R: Rng>(&mut self, mut run: Run<'a>, rng: &mut R) -> Self::Return {
        loop {
            match run.collapse(rng) {
                Ok(()) | Err(PropagateError::Cancelled) => return run.into_wave(),
                Err(PropagateError::Contradiction) => continue,
            }
        }
    }
}

/// Restart at most this many times after the first contradiction.
#[derive(Debug, Clone, Copy)]
pub struct NumTimes(pub usize);

impl Retry for NumTimes {
    type Return = Result<Wave, PropagateError>;
    fn retry<'a, R: Rng>(&mut self, mut run: Run<'a>, rng: &mut R) -> Self::Return {
        loop {
            match run.collapse(rng) {
                Ok(()) => return Ok(run.into_wave()),
                Err(PropagateError::Cancelled) => return Err(PropagateError::Cancelled),
                Err(e) => {
                    if self.0 == 0 {
                        return Err(e);
                    } else {
                        self.0 -= 1;
                    }
                }
            }
        }
    }
}

/// Make this many attempts in parallel, each with its own rng seeded from the caller's, and
/// return whichever completes.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy)]
pub struct ParNumTimes(pub usize);

#[cfg(feature = "parallel")]
impl Retry for ParNumTimes {
    type Return = Result<Wave, PropagateError>;
    fn retry<'a, R: Rng>(&mut self, run: Run<'a>, rng: &mut R) -> Self::Return {
        use rand::SeedableRng;
        use rand_xorshift::XorShiftRng;
        use rayon::prelude::*;

        if run.is_cancelled() {
            return Err(PropagateError::Cancelled);
        }
        let seeds = (0..self.0.max(1))
            .map(|_| rng.gen::<u64>())
            .collect::<Vec<_>>();
        seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = XorShiftRng::seed_from_u64(seed);
                let mut run = run.clone();
                run.collapse(&mut rng).map(|()| run.into_wave())
            })
            .find_any(Result::is_ok)
            .unwrap_or(Err(PropagateError::Contradiction))
    }
}

mod private {
    use super::*;

    pub trait Sealed {}

    impl Sealed for Forever {}
    impl Sealed for NumTimes {}
    #[cfg(feature = "parallel")]
    impl Sealed for ParNumTimes {}
}
