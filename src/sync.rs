//! Shared access to a sketch from several producer threads
//!
//! [`SharedSketch`] is a cloneable handle to one [`WeightedSketch`] behind a
//! mutex. Single operations lock for their own duration. A sequence that must
//! appear atomic to other threads (for example an update followed by a dump)
//! holds one [`acquire`](SharedSketch::acquire) guard for the whole sequence;
//! the lock is released when the guard is dropped, on every exit path.

use std::io::Write;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::config::SketchConfig;
use crate::error::SketchError;
use crate::weighted::{Label, ParameterSource, SeededStreams, Snapshot, Weight, WeightedSketch};

/// Scoped exclusive access to a shared sketch
pub type SketchGuard<'a, P> = MutexGuard<'a, WeightedSketch<P>>;

/// Thread-safe handle to a single weighted sketch
///
/// # Example
///
/// ```
/// use std::thread;
///
/// use flowsketch::config::SketchConfig;
/// use flowsketch::sync::SharedSketch;
///
/// let shared = SharedSketch::new(SketchConfig::new(8, 100, 0.02)).unwrap();
///
/// let producers: Vec<_> = (0..4u64)
///     .map(|t| {
///         let shared = shared.clone();
///         thread::spawn(move || {
///             for i in 0..100 {
///                 shared.update(t * 1000 + i % 10);
///             }
///         })
///     })
///     .collect();
/// for p in producers {
///     p.join().unwrap();
/// }
///
/// let sketch = shared.acquire();
/// assert_eq!(sketch.observations(), 400);
/// assert_eq!(sketch.len(), 40);
/// ```
#[derive(Debug)]
pub struct SharedSketch<P = SeededStreams> {
    inner: Arc<Mutex<WeightedSketch<P>>>,
}

impl<P> Clone for SharedSketch<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedSketch<SeededStreams> {
    /// Create a shared empty sketch drawing parameters from seeded streams
    pub fn new(config: SketchConfig) -> Result<Self, SketchError> {
        WeightedSketch::new(config).map(Self::from_sketch)
    }
}

impl<P: ParameterSource> SharedSketch<P> {
    /// Share an existing sketch
    pub fn from_sketch(sketch: WeightedSketch<P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sketch)),
        }
    }

    /// Lock the sketch until the returned guard is dropped
    pub fn acquire(&self) -> SketchGuard<'_, P> {
        self.inner.lock()
    }

    /// Lock only if no other thread holds the sketch
    pub fn try_acquire(&self) -> Option<SketchGuard<'_, P>> {
        self.inner.try_lock()
    }

    /// Run `f` with the sketch locked
    pub fn with<R>(&self, f: impl FnOnce(&mut WeightedSketch<P>) -> R) -> R {
        f(&mut self.acquire())
    }

    pub fn update(&self, label: Label) {
        self.acquire().update(label);
    }

    pub fn insert_label(&self, label: Label) {
        self.acquire().insert_label(label);
    }

    pub fn insert_weighted(&self, label: Label, weight: Weight) {
        self.acquire().insert_weighted(label, weight);
    }

    pub fn create_sketch(&self) -> Result<(), SketchError> {
        self.acquire().create_sketch()
    }

    /// Observe `label` and dump the resulting sketch under one lock
    pub fn update_and_record<W: Write + ?Sized>(
        &self,
        label: Label,
        sink: &mut W,
    ) -> Result<(), SketchError> {
        let mut sketch = self.acquire();
        sketch.update(label);
        sketch.record_sketch(sink)
    }

    pub fn record_sketch<W: Write + ?Sized>(&self, sink: &mut W) -> Result<(), SketchError> {
        self.acquire().record_sketch(sink)
    }

    pub fn snapshot(&self) -> Result<Snapshot, SketchError> {
        self.acquire().snapshot()
    }

    /// Recover the sketch if this is the last handle
    pub fn into_inner(self) -> Result<WeightedSketch<P>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
