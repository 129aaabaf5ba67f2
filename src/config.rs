//! Sketch configuration
//!
//! The three run constants of a weighted sketch (slot count, decay interval,
//! decay rate) plus the seed of its random parameter source. Values are fixed
//! for the lifetime of a sketch.

use crate::error::ConfigError;

/// Default number of sampling slots
pub const DEFAULT_SLOTS: usize = 256;

/// Default number of observations between decay events
pub const DEFAULT_DECAY_INTERVAL: u64 = 500;

/// Default decay rate (aging factor is `exp(-lambda)`)
pub const DEFAULT_LAMBDA: f64 = 0.02;

/// Configuration of a [`WeightedSketch`](crate::weighted::WeightedSketch)
///
/// # Example
///
/// ```
/// use flowsketch::config::SketchConfig;
///
/// let config = SketchConfig::default()
///     .with_slots(64)
///     .with_decay_interval(1000)
///     .with_lambda(0.01)
///     .with_seed(7);
///
/// assert!(config.validate().is_ok());
/// assert!((config.decay_factor() - (-0.01f64).exp()).abs() < 1e-15);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SketchConfig {
    /// Number of sampling slots (K)
    pub slots: usize,
    /// Streaming observations between two decay events
    pub decay_interval: u64,
    /// Decay rate; weights and best scores are scaled by `exp(-lambda)`,
    /// which must not underflow to zero
    pub lambda: f64,
    /// Seed for the random parameter source
    pub seed: u64,
}

impl SketchConfig {
    /// Create a configuration from the three run constants, seed 0
    pub fn new(slots: usize, decay_interval: u64, lambda: f64) -> Self {
        Self {
            slots,
            decay_interval,
            lambda,
            seed: 0,
        }
    }

    pub fn with_slots(mut self, slots: usize) -> Self {
        self.slots = slots;
        self
    }

    pub fn with_decay_interval(mut self, decay_interval: u64) -> Self {
        self.decay_interval = decay_interval;
        self
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Multiplicative aging factor applied at each decay event
    pub fn decay_factor(&self) -> f64 {
        (-self.lambda).exp()
    }

    /// Check every parameter
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots == 0 {
            return Err(ConfigError::ZeroSlots);
        }
        if self.decay_interval == 0 {
            return Err(ConfigError::ZeroDecayInterval);
        }
        if !self.lambda.is_finite() || self.lambda < 0.0 || self.decay_factor() == 0.0 {
            return Err(ConfigError::InvalidLambda(self.lambda));
        }
        Ok(())
    }
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SLOTS, DEFAULT_DECAY_INTERVAL, DEFAULT_LAMBDA)
    }
}
