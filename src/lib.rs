//! # Flowsketch
//!
//! Decaying weighted-sample sketches for label streams.
//!
//! Flowsketch maintains a fixed-size, weight-biased sample of a stream of
//! integer labels using consistent weighted sampling. Label weights grow with
//! repetition and age exponentially, so the sketch tracks the recent weighted
//! distribution of the stream. Comparing two sketches slot by slot estimates
//! the weighted Jaccard similarity of the streams without storing them.
//!
//! ## Features
//!
//! - **Streaming updates**: O(K) per observation, with periodic exponential decay
//! - **Exact batch construction**: build a sketch from a static base dataset
//! - **Pluggable randomness**: order-seeded or label-hashed sampling parameters
//! - **Shared access**: scoped locking for multiple producer threads
//!
//! ## Quick Start
//!
//! ```rust
//! use flowsketch::prelude::*;
//!
//! let config = SketchConfig::new(8, 1000, 0.02);
//! let mut sketch = WeightedSketch::new(config).unwrap();
//!
//! for label in [4, 8, 15, 16, 23, 42, 4, 4] {
//!     sketch.update(label);
//! }
//!
//! let mut out = Vec::new();
//! sketch.record_sketch(&mut out).unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialize configs and snapshots, deserialize configs

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod sync;
pub mod traits;
pub mod weighted;

pub mod prelude {
    pub use crate::config::SketchConfig;
    pub use crate::error::{ConfigError, SketchError};
    pub use crate::sync::SharedSketch;
    pub use crate::traits::*;
    pub use crate::weighted::{
        Label, LabelHashed, ParameterSource, SeededStreams, Snapshot, Weight, WeightedSketch,
    };
}

pub use config::SketchConfig;
pub use error::{ConfigError, SketchError};
pub use sync::SharedSketch;
pub use weighted::{Snapshot, WeightedSketch};
