//! Core traits for streaming sketches
//!
//! Sketches implement the base [`StreamingSketch`] trait, with
//! [`SamplingSketch`] for those that maintain a fixed-size sample.

use core::fmt::Debug;

/// Core trait for streaming sketches
pub trait StreamingSketch: Debug {
    /// The type of item this sketch processes
    type Item: ?Sized;

    /// Add an item to the sketch
    fn update(&mut self, item: &Self::Item);

    /// Memory usage in bytes
    fn size_bytes(&self) -> usize;

    /// Number of items processed
    fn count(&self) -> u64;

    /// Check if sketch is empty
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Sketches that maintain a fixed-size sample of the stream
pub trait SamplingSketch: StreamingSketch
where
    Self::Item: Sized + Clone,
{
    /// Current sample, `None` until every position holds an item
    fn sample(&self) -> Option<Vec<Self::Item>>;

    /// Sample size
    fn capacity(&self) -> usize;
}
