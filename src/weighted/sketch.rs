//! Decaying weighted-sample sketch
//!
//! Keeps, for each of `K` slots, the label with the lowest consistent weighted
//! sampling score seen so far. Labels arrive either one at a time through
//! [`WeightedSketch::update`] (streaming, with periodic decay) or in bulk
//! through [`WeightedSketch::insert_label`] followed by a single
//! [`WeightedSketch::create_sketch`].

use std::fmt;
use std::io::Write;

use tracing::debug;

use super::cws::score;
use super::decay::DecayScheduler;
use super::params::{ParameterSource, SeededStreams};
use super::store::{LabelStore, Weight};
use super::Label;
use crate::config::SketchConfig;
use crate::error::SketchError;
use crate::traits::{SamplingSketch, StreamingSketch};

/// Fixed-size weighted sample of a decaying label multiset
///
/// Two sketches using [`LabelHashed`](super::LabelHashed) parameters with the
/// same seed approximate the weighted Jaccard similarity of their streams by
/// the fraction of slots in which they hold the same label.
///
/// The sketch does no locking of its own; share it between threads through
/// [`SharedSketch`](crate::sync::SharedSketch).
///
/// # Algorithm
///
/// On every streaming observation:
/// 1. Count the observation; every `decay_interval` observations multiply all
///    stored weights and all best scores by `exp(-lambda)`
/// 2. Add one to the label's weight, creating its entry if new
/// 3. For each slot, replace the slot's label if the label now scores lower
///
/// Between aging passes the best scores only shrink. An aging pass rescales
/// them without re-deriving the arg-min, so the slots are exact only after
/// [`create_sketch`](Self::create_sketch) and until the next aging pass.
///
/// # Example
///
/// ```
/// use flowsketch::config::SketchConfig;
/// use flowsketch::weighted::WeightedSketch;
///
/// let mut sketch = WeightedSketch::new(SketchConfig::new(4, 100, 0.02)).unwrap();
///
/// for label in [1, 2, 3, 1, 1, 2] {
///     sketch.update(label);
/// }
///
/// let snapshot = sketch.snapshot().unwrap();
/// assert_eq!(snapshot.len(), 4);
///
/// let mut out = Vec::new();
/// sketch.record_sketch(&mut out).unwrap();
/// assert!(out.ends_with(b" \n"));
/// ```
#[derive(Clone, Debug)]
pub struct WeightedSketch<P = SeededStreams> {
    config: SketchConfig,
    store: LabelStore,
    source: P,
    scheduler: DecayScheduler,
    /// Lowest score seen per slot
    best_scores: Vec<f64>,
    /// Label holding each slot's best score
    sketch: Vec<Option<Label>>,
    /// Calls to update / insert
    observations: u64,
}

impl WeightedSketch<SeededStreams> {
    /// Create an empty sketch drawing parameters from seeded streams
    pub fn new(config: SketchConfig) -> Result<Self, SketchError> {
        let source = SeededStreams::new(config.seed);
        Self::with_source(config, source)
    }
}

impl<P: ParameterSource> WeightedSketch<P> {
    /// Create an empty sketch with an explicit parameter source
    pub fn with_source(config: SketchConfig, source: P) -> Result<Self, SketchError> {
        config.validate()?;

        Ok(Self {
            store: LabelStore::new(config.slots),
            scheduler: DecayScheduler::new(config.decay_interval, config.lambda),
            best_scores: vec![f64::INFINITY; config.slots],
            sketch: vec![None; config.slots],
            observations: 0,
            source,
            config,
        })
    }

    /// Build an exact sketch from a static base dataset
    ///
    /// Inserts every label without decay, then runs
    /// [`create_sketch`](Self::create_sketch).
    pub fn from_base<I>(config: SketchConfig, source: P, labels: I) -> Result<Self, SketchError>
    where
        I: IntoIterator<Item = Label>,
    {
        let mut sketch = Self::with_source(config, source)?;
        for label in labels {
            sketch.insert_label(label);
        }
        sketch.create_sketch()?;
        Ok(sketch)
    }

    /// Observe one label from the stream
    pub fn update(&mut self, label: Label) {
        self.observations += 1;

        if self.scheduler.on_observation() {
            self.age();
        }

        let (entry, _) = self.store.ensure(label, &mut self.source);
        let weight = entry.weight();
        for (slot, params) in entry.params().iter().enumerate() {
            let s = score(weight, params);
            if s < self.best_scores[slot] {
                self.best_scores[slot] = s;
                self.sketch[slot] = Some(label);
            }
        }
    }

    /// Scale every weight and every best score by the decay factor
    fn age(&mut self) {
        let factor = self.scheduler.factor();
        self.store.decay(factor);
        for best in self.best_scores.iter_mut() {
            *best *= factor;
        }

        debug!(
            event = self.scheduler.events(),
            factor,
            labels = self.store.len(),
            "aged label weights and best scores"
        );
    }

    /// Add one observation of `label` to the store without touching the
    /// sketch or the decay counter
    pub fn insert_label(&mut self, label: Label) {
        self.insert_weighted(label, Weight::ONE);
    }

    /// Add `weight` worth of observations of `label` to the store without
    /// touching the sketch or the decay counter
    ///
    /// Inserting a label twice and inserting it once with weight 2 leave the
    /// store in the same state.
    pub fn insert_weighted(&mut self, label: Label, weight: Weight) {
        self.observations += 1;
        self.store.ensure_weighted(label, weight, &mut self.source);
    }

    /// Recompute every slot from the whole store
    ///
    /// This is the only operation that yields the exact arg-min in every slot.
    /// Equal scores go to the smaller label.
    ///
    /// # Errors
    ///
    /// [`SketchError::EmptyStore`] if no label has been inserted yet.
    pub fn create_sketch(&mut self) -> Result<(), SketchError> {
        if self.store.is_empty() {
            return Err(SketchError::EmptyStore);
        }

        self.best_scores.fill(f64::INFINITY);
        self.sketch.fill(None);

        for (label, entry) in self.store.iter() {
            let weight = entry.weight();
            for (slot, params) in entry.params().iter().enumerate() {
                let s = score(weight, params);
                let best = self.best_scores[slot];
                let wins = s < best
                    || (s == best && self.sketch[slot].map_or(true, |held| label < held));
                if wins {
                    self.best_scores[slot] = s;
                    self.sketch[slot] = Some(label);
                }
            }
        }

        debug!(
            labels = self.store.len(),
            slots = self.config.slots,
            "created sketch from label store"
        );
        Ok(())
    }

    /// Write the winning label of every slot to `sink`
    ///
    /// Each label is followed by a single space and the line ends with `\n`,
    /// e.g. `"7 2 9 \n"`.
    ///
    /// # Errors
    ///
    /// [`SketchError::Unpopulated`] before any label has been sketched (nothing
    /// is written), [`SketchError::Io`] if the sink fails.
    pub fn record_sketch<W: Write + ?Sized>(&self, sink: &mut W) -> Result<(), SketchError> {
        let snapshot = self.snapshot()?;
        write!(sink, "{}", snapshot)?;
        Ok(())
    }
}

impl<P> WeightedSketch<P> {
    /// Owned copy of the winning labels
    ///
    /// # Errors
    ///
    /// [`SketchError::Unpopulated`] if any slot has no label yet.
    pub fn snapshot(&self) -> Result<Snapshot, SketchError> {
        self.sketch
            .iter()
            .copied()
            .collect::<Option<Vec<_>>>()
            .map(Snapshot::new)
            .ok_or(SketchError::Unpopulated)
    }

    /// Whether every slot holds a label
    pub fn is_populated(&self) -> bool {
        self.sketch.iter().all(Option::is_some)
    }

    /// Label currently holding `slot`
    pub fn slot(&self, slot: usize) -> Option<Label> {
        self.sketch.get(slot).copied().flatten()
    }

    /// Winning label per slot, `None` where no label has been sketched
    pub fn labels(&self) -> &[Option<Label>] {
        &self.sketch
    }

    /// Current best score per slot (`+inf` before any data)
    pub fn best_scores(&self) -> &[f64] {
        &self.best_scores
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn store(&self) -> &LabelStore {
        &self.store
    }

    /// Number of slots (K)
    pub fn slots(&self) -> usize {
        self.config.slots
    }

    /// Number of distinct labels observed
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of update / insert calls
    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Streaming observations since the last aging pass
    pub fn ticks(&self) -> u64 {
        self.scheduler.ticks()
    }

    /// Aging passes performed so far
    pub fn decay_events(&self) -> u64 {
        self.scheduler.events()
    }

    /// Aging factor, `exp(-lambda)`
    pub fn decay_factor(&self) -> f64 {
        self.scheduler.factor()
    }

    /// Emit every `(label, weight)` pair at debug level, ordered by label
    pub fn log_weights(&self) {
        let mut weights: Vec<(Label, f64)> = self
            .store
            .iter()
            .map(|(label, entry)| (label, entry.weight().get()))
            .collect();
        weights.sort_unstable_by_key(|&(label, _)| label);

        debug!(labels = weights.len(), "dumping label weights");
        for (label, weight) in weights {
            debug!(label, weight, "label weight");
        }
    }
}

impl<P: ParameterSource + fmt::Debug> StreamingSketch for WeightedSketch<P> {
    type Item = Label;

    fn update(&mut self, item: &Label) {
        WeightedSketch::update(self, *item);
    }

    fn size_bytes(&self) -> usize {
        self.store.size_bytes()
            + self.best_scores.capacity() * core::mem::size_of::<f64>()
            + self.sketch.capacity() * core::mem::size_of::<Option<Label>>()
    }

    fn count(&self) -> u64 {
        self.observations
    }
}

impl<P: ParameterSource + fmt::Debug> SamplingSketch for WeightedSketch<P> {
    fn sample(&self) -> Option<Vec<Label>> {
        self.snapshot().ok().map(Snapshot::into_labels)
    }

    fn capacity(&self) -> usize {
        self.config.slots
    }
}

/// Winning labels of a populated sketch, one per slot
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Snapshot {
    labels: Vec<Label>,
}

impl Snapshot {
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn into_labels(self) -> Vec<Label> {
        self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Dump layout: every label followed by one space, then a newline
impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in &self.labels {
            write!(f, "{} ", label)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighted::{LabelHashed, SlotParams};

    /// Same parameters for every label and slot
    #[derive(Debug)]
    struct Fixed(SlotParams);

    impl ParameterSource for Fixed {
        fn draw(&mut self, _label: Label, slots: usize) -> Box<[SlotParams]> {
            vec![self.0; slots].into_boxed_slice()
        }
    }

    fn unit() -> Fixed {
        Fixed(SlotParams::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_empty() {
        let sketch = WeightedSketch::new(SketchConfig::new(3, 10, 0.1)).unwrap();

        assert!(sketch.is_empty());
        assert!(!sketch.is_populated());
        assert!(sketch.best_scores().iter().all(|s| *s == f64::INFINITY));
        assert!(matches!(sketch.snapshot(), Err(SketchError::Unpopulated)));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            WeightedSketch::new(SketchConfig::new(0, 10, 0.1)),
            Err(SketchError::Config(_))
        ));
    }

    #[test]
    fn test_first_update_populates() {
        let mut sketch = WeightedSketch::new(SketchConfig::new(8, 10, 0.1)).unwrap();
        sketch.update(42);

        assert!(sketch.is_populated());
        assert_eq!(sketch.snapshot().unwrap().labels(), &[42; 8]);
        assert_eq!(sketch.slot(0), Some(42));
        assert_eq!(sketch.slot(8), None);
    }

    #[test]
    fn test_heavier_label_takes_slot() {
        let config = SketchConfig::new(1, 1000, 0.0);
        let mut sketch = WeightedSketch::with_source(config, unit()).unwrap();

        sketch.update(1);
        assert_eq!(sketch.slot(0), Some(1));
        assert_eq!(sketch.best_scores()[0], 1.0);

        // Equal score does not replace
        sketch.update(2);
        assert_eq!(sketch.slot(0), Some(1));

        sketch.update(2);
        assert_eq!(sketch.slot(0), Some(2));
        assert_eq!(sketch.best_scores()[0], 0.5);
    }

    #[test]
    fn test_decay_rescales() {
        let config = SketchConfig::new(1, 2, 1.0);
        let mut sketch = WeightedSketch::with_source(config, unit()).unwrap();
        let factor = (-1.0f64).exp();

        sketch.update(1);
        assert_eq!(sketch.decay_events(), 0);

        // Second observation ages first, then adds
        sketch.update(1);
        assert_eq!(sketch.decay_events(), 1);
        assert_eq!(sketch.ticks(), 0);
        let weight = sketch.store().weight(1).unwrap().get();
        assert!((weight - (factor + 1.0)).abs() < 1e-12);
        // Rescaled threshold (1.0 * factor) beats 1 / (factor + 1)
        assert!((sketch.best_scores()[0] - factor).abs() < 1e-12);
    }

    #[test]
    fn test_insert_does_not_sketch() {
        let config = SketchConfig::new(2, 1, 0.5);
        let mut sketch = WeightedSketch::new(config).unwrap();

        sketch.insert_label(5);
        sketch.insert_label(5);

        assert_eq!(sketch.len(), 1);
        assert_eq!(sketch.decay_events(), 0);
        assert!(!sketch.is_populated());
        assert_eq!(sketch.store().weight(5).map(Weight::get), Some(2.0));
    }

    #[test]
    fn test_create_sketch_exact() {
        let config = SketchConfig::new(1, 10, 0.0);
        let mut sketch = WeightedSketch::with_source(config, unit()).unwrap();

        sketch.insert_label(10);
        sketch.insert_label(10);
        for _ in 0..5 {
            sketch.insert_label(20);
        }
        sketch.create_sketch().unwrap();

        assert_eq!(sketch.slot(0), Some(20));
        assert_eq!(sketch.best_scores()[0], 0.2);
    }

    #[test]
    fn test_create_sketch_tie_goes_to_smaller_label() {
        let config = SketchConfig::new(2, 10, 0.0);
        let sketch = WeightedSketch::from_base(config, unit(), [30, 20, 40, 10]).unwrap();

        assert_eq!(sketch.snapshot().unwrap().labels(), &[10, 10]);
    }

    #[test]
    fn test_create_sketch_empty() {
        let mut sketch = WeightedSketch::new(SketchConfig::new(2, 10, 0.1)).unwrap();
        assert!(matches!(sketch.create_sketch(), Err(SketchError::EmptyStore)));
    }

    #[test]
    fn test_create_sketch_matches_streaming_without_decay() {
        let config = SketchConfig::new(32, 1_000_000, 0.0);
        let labels: Vec<Label> = (0..2_000u64).map(|i| (i * i) % 97).collect();

        let mut streamed =
            WeightedSketch::with_source(config.clone(), LabelHashed::new(3)).unwrap();
        for &label in &labels {
            streamed.update(label);
        }

        let exact = WeightedSketch::from_base(config, LabelHashed::new(3), labels).unwrap();
        // Weights only grow, so the streaming minimum is the exact minimum
        assert_eq!(streamed.snapshot().unwrap(), exact.snapshot().unwrap());
    }

    #[test]
    fn test_record_sketch_format() {
        let config = SketchConfig::new(3, 10, 0.0);
        let mut sketch = WeightedSketch::with_source(config, unit()).unwrap();
        sketch.update(7);

        let mut out = Vec::new();
        sketch.record_sketch(&mut out).unwrap();
        assert_eq!(out, b"7 7 7 \n");
    }

    #[test]
    fn test_record_sketch_unpopulated_writes_nothing() {
        let sketch = WeightedSketch::new(SketchConfig::new(3, 10, 0.0)).unwrap();

        let mut out = Vec::new();
        assert!(matches!(
            sketch.record_sketch(&mut out),
            Err(SketchError::Unpopulated)
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_snapshot_display() {
        let snapshot = Snapshot::new(vec![7, 2, 9]);
        assert_eq!(snapshot.to_string(), "7 2 9 \n");
        assert_eq!(Snapshot::new(Vec::new()).to_string(), "\n");
    }

    #[test]
    fn test_traits() {
        let config = SketchConfig::new(4, 10, 0.1);
        let mut sketch = WeightedSketch::new(config).unwrap();
        assert!(StreamingSketch::is_empty(&sketch));
        assert_eq!(SamplingSketch::sample(&sketch), None);

        StreamingSketch::update(&mut sketch, &3);
        assert_eq!(StreamingSketch::count(&sketch), 1);
        assert_eq!(SamplingSketch::capacity(&sketch), 4);
        assert_eq!(SamplingSketch::sample(&sketch), Some(vec![3; 4]));
        assert!(sketch.size_bytes() > 0);
    }
}
