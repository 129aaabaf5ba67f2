//! Weighted sampling sketches
//!
//! This module provides a fixed-size sketch of a weighted, decaying label
//! multiset built on consistent weighted sampling (the weighted MinHash
//! family). Sketches of two streams built with the same parameters hold the
//! same label in a slot with probability close to the weighted Jaccard
//! similarity of the streams.
//!
//! # Components
//!
//! - [`LabelStore`]: per-label weights and fixed random parameters
//! - [`ParameterSource`]: where those parameters come from
//!   ([`SeededStreams`], [`LabelHashed`])
//! - [`score`]: the per-slot sampling score
//! - [`DecayScheduler`]: periodic exponential aging
//! - [`WeightedSketch`]: the sketch itself
//!
//! # Example
//!
//! ```
//! use flowsketch::config::SketchConfig;
//! use flowsketch::weighted::{LabelHashed, WeightedSketch};
//!
//! let config = SketchConfig::new(16, 1_000, 0.02).with_seed(9);
//!
//! // Exact sketch of a base dataset
//! let mut sketch =
//!     WeightedSketch::from_base(config.clone(), LabelHashed::new(config.seed), [1, 2, 2, 3])
//!         .unwrap();
//!
//! // Then follow the stream
//! for label in [3, 3, 4, 5] {
//!     sketch.update(label);
//! }
//!
//! println!("{}", sketch.snapshot().unwrap());
//! ```

mod cws;
mod decay;
mod params;
mod sketch;
mod store;

/// Stream label
pub type Label = u64;

pub use cws::score;
pub use decay::DecayScheduler;
pub use params::{LabelHashed, ParameterSource, SeededStreams, SlotParams};
pub use sketch::{Snapshot, WeightedSketch};
pub use store::{LabelEntry, LabelStore, Weight};
