use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of the symmetric jitter applied to each base reading.
///
/// Every call yields a value in `[-1, 1]`.
pub trait JitterSource {
    fn next_unit(&mut self) -> f64;
}

/// Uniform jitter drawn from a `rand` generator.
pub struct RngJitter<R> {
    rng: R,
}

impl<R: Rng> RngJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngJitter<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> JitterSource for RngJitter<R> {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }
}

/// Replays a fixed sequence of units, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct FixedJitter {
    units: Vec<f64>,
    pos: usize,
}

impl FixedJitter {
    pub fn new(units: impl Into<Vec<f64>>) -> Self {
        Self {
            units: units.into(),
            pos: 0,
        }
    }

    /// Always returns zero jitter, so readings equal their rounded base.
    pub fn none() -> Self {
        Self::new(vec![0.0])
    }
}

impl JitterSource for FixedJitter {
    fn next_unit(&mut self) -> f64 {
        if self.units.is_empty() {
            return 0.0;
        }
        let unit = self.units[self.pos % self.units.len()];
        self.pos += 1;
        unit.clamp(-1.0, 1.0)
    }
}
