//! Label weight store
//!
//! Maps every distinct label to its accumulated (decaying) weight and the
//! random parameters drawn for it on first sight. Entries are never removed.

use std::collections::hash_map::{Entry, HashMap};

use tracing::trace;

use super::params::{ParameterSource, SlotParams};
use super::Label;

/// Strictly positive, finite label weight
///
/// The sampling score divides by the weight, so zero or negative weights are
/// not representable.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Weight(f64);

impl Weight {
    /// Weight of a single observation
    pub const ONE: Weight = Weight(1.0);

    /// Wrap a value, rejecting anything not finite and strictly positive
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value > 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Scale by an aging factor in `(0, 1]`
    ///
    /// Saturates at the smallest positive normal value, so an entry that has
    /// been aged for a very long time stays usable.
    #[inline]
    pub(crate) fn scale(&mut self, factor: f64) {
        self.0 = (self.0 * factor).max(f64::MIN_POSITIVE);
    }
}

/// Saturates at `f64::MAX`
impl core::ops::AddAssign for Weight {
    fn add_assign(&mut self, rhs: Weight) {
        self.0 = (self.0 + rhs.0).min(f64::MAX);
    }
}

/// Store entry for one distinct label
#[derive(Clone, Debug)]
pub struct LabelEntry {
    weight: Weight,
    params: Box<[SlotParams]>,
}

impl LabelEntry {
    fn new(weight: Weight, params: Box<[SlotParams]>) -> Self {
        Self { weight, params }
    }

    /// Accumulated weight
    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// Per-slot random parameters, fixed since creation
    pub fn params(&self) -> &[SlotParams] {
        &self.params
    }
}

/// Mapping from label to [`LabelEntry`]
#[derive(Clone, Debug)]
pub struct LabelStore {
    /// Parameter triples drawn per new label
    slots: usize,
    entries: HashMap<Label, LabelEntry>,
    /// Distinct labels ever inserted
    size: usize,
}

impl LabelStore {
    /// Create an empty store whose entries carry `slots` parameter triples
    pub fn new(slots: usize) -> Self {
        Self {
            slots,
            entries: HashMap::new(),
            size: 0,
        }
    }

    /// Record one observation of `label`
    ///
    /// Creates the entry with weight 1 and fresh parameters if the label is
    /// new, otherwise adds 1 to its weight. Returns the entry and whether it
    /// was created.
    pub fn ensure<P>(&mut self, label: Label, source: &mut P) -> (&LabelEntry, bool)
    where
        P: ParameterSource + ?Sized,
    {
        self.ensure_weighted(label, Weight::ONE, source)
    }

    /// Record `weight` worth of observations of `label`
    ///
    /// Existing parameters are left untouched; only the weight grows.
    pub fn ensure_weighted<P>(
        &mut self,
        label: Label,
        weight: Weight,
        source: &mut P,
    ) -> (&LabelEntry, bool)
    where
        P: ParameterSource + ?Sized,
    {
        match self.entries.entry(label) {
            Entry::Occupied(occupied) => {
                trace!(label, "label already stored, updating weight");
                let entry = occupied.into_mut();
                entry.weight += weight;
                (&*entry, false)
            }
            Entry::Vacant(vacant) => {
                trace!(label, "new label");
                let params = source.draw(label, self.slots);
                debug_assert_eq!(params.len(), self.slots);
                self.size += 1;
                (&*vacant.insert(LabelEntry::new(weight, params)), true)
            }
        }
    }

    /// Multiply every weight by `factor`
    pub fn decay(&mut self, factor: f64) {
        for entry in self.entries.values_mut() {
            entry.weight.scale(factor);
        }
    }

    pub fn get(&self, label: Label) -> Option<&LabelEntry> {
        self.entries.get(&label)
    }

    /// Current weight of `label`, if it was ever observed
    pub fn weight(&self, label: Label) -> Option<Weight> {
        self.entries.get(&label).map(LabelEntry::weight)
    }

    pub fn contains(&self, label: Label) -> bool {
        self.entries.contains_key(&label)
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Parameter triples per entry
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Iterate over `(label, entry)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (Label, &LabelEntry)> {
        self.entries.iter().map(|(&label, entry)| (label, entry))
    }

    /// Approximate heap usage in bytes
    pub fn size_bytes(&self) -> usize {
        self.entries.capacity()
            * (core::mem::size_of::<Label>() + core::mem::size_of::<LabelEntry>())
            + self.size * self.slots * core::mem::size_of::<SlotParams>()
    }
}
