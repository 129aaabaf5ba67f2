//! Observation-counting decay scheduler
//!
//! Every `interval` streaming observations the whole sketch ages once: each
//! stored weight and each slot's best score is multiplied by
//! `exp(-lambda)`. Best scores are rescaled in place rather than recomputed
//! from the store, so after an aging pass the slots hold the previous winners
//! with rescaled thresholds and are no longer guaranteed to be the exact
//! arg-min. Only [`create_sketch`](super::WeightedSketch::create_sketch)
//! restores exactness.

/// Counts observations and signals when an aging pass is due
#[derive(Clone, Debug)]
pub struct DecayScheduler {
    interval: u64,
    factor: f64,
    ticks: u64,
    events: u64,
}

impl DecayScheduler {
    /// Create a scheduler firing every `interval` observations with aging
    /// factor `exp(-lambda)`
    ///
    /// An `interval` of zero is treated as one.
    pub fn new(interval: u64, lambda: f64) -> Self {
        Self {
            interval: interval.max(1),
            factor: (-lambda).exp(),
            ticks: 0,
            events: 0,
        }
    }

    /// Count one observation; returns `true` when an aging pass is due
    ///
    /// The counter resets when it fires.
    pub fn on_observation(&mut self) -> bool {
        self.ticks += 1;
        if self.ticks >= self.interval {
            self.ticks = 0;
            self.events += 1;
            true
        } else {
            false
        }
    }

    /// Multiplicative aging factor
    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Observations since the last aging pass
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Aging passes fired so far
    pub fn events(&self) -> u64 {
        self.events
    }
}
