//! Error types
//!
//! Streaming operations (`update`, `insert_label`) never fail. Errors only
//! surface when a sketch is constructed from an invalid configuration, when
//! an exact recomputation is requested on an empty store, or when a snapshot
//! is requested before any slot holds a label.

use std::io;

use thiserror::Error;

/// Invalid [`SketchConfig`](crate::config::SketchConfig) parameter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A sketch needs at least one slot
    #[error("slot count must be positive")]
    ZeroSlots,
    /// Decay interval of zero would age the store on every observation forever
    #[error("decay interval must be positive")]
    ZeroDecayInterval,
    /// Lambda must be finite and non-negative with a nonzero aging factor
    #[error("invalid decay rate lambda: {0}")]
    InvalidLambda(f64),
}

/// Error from a sketch operation
#[derive(Debug, Error)]
pub enum SketchError {
    /// `create_sketch` was called before any label was inserted
    #[error("cannot create a sketch from an empty label store")]
    EmptyStore,
    /// A snapshot was requested before every slot held a label
    #[error("sketch has unpopulated slots")]
    Unpopulated,
    /// Writing the sketch dump failed
    #[error("failed to write sketch: {0}")]
    Io(#[from] io::Error),
    /// The sketch configuration was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
}
