use std::collections::HashMap;

use flowsketch::config::SketchConfig;
use flowsketch::weighted::{Label, LabelHashed, WeightedSketch};
use proptest::prelude::*;

fn arb_labels() -> impl Strategy<Value = Vec<Label>> {
    prop::collection::vec(0u64..64, 1..400)
}

fn arb_config() -> impl Strategy<Value = SketchConfig> {
    (1usize..24, 1u64..50, 0.0f64..2.0, any::<u64>()).prop_map(
        |(slots, interval, lambda, seed)| {
            SketchConfig::new(slots, interval, lambda).with_seed(seed)
        },
    )
}

// ── Store sizing ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn distinct_count_equals_unique_labels(labels in arb_labels(), config in arb_config()) {
        let mut sketch = WeightedSketch::new(config).unwrap();
        let mut counts: HashMap<Label, u64> = HashMap::new();
        for &label in &labels {
            sketch.insert_label(label);
            *counts.entry(label).or_default() += 1;
        }

        prop_assert_eq!(sketch.len(), counts.len());
        for (label, count) in counts {
            prop_assert_eq!(sketch.store().weight(label).unwrap().get(), count as f64);
        }
    }
}

// ── Parameter stability ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn parameters_fixed_at_creation(labels in arb_labels(), config in arb_config()) {
        let mut sketch = WeightedSketch::new(config).unwrap();
        let mut first_seen = HashMap::new();

        for &label in &labels {
            sketch.update(label);
            let params = sketch.store().get(label).unwrap().params().to_vec();
            let recorded = first_seen.entry(label).or_insert_with(|| params.clone());
            prop_assert_eq!(&*recorded, &params);
        }
    }
}

// ── Monotonic between decays ─────────────────────────────────────────────

proptest! {
    #[test]
    fn best_scores_only_shrink_between_decays(labels in arb_labels(), config in arb_config()) {
        let mut sketch = WeightedSketch::new(config).unwrap();

        for &label in &labels {
            let before = sketch.best_scores().to_vec();
            let events = sketch.decay_events();
            sketch.update(label);

            if sketch.decay_events() == events {
                for (after, before) in sketch.best_scores().iter().zip(&before) {
                    prop_assert!(after <= before);
                }
            }
        }
    }
}

// ── Decay cadence ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn decay_fires_every_interval(
        labels in arb_labels(),
        inserts in 0usize..50,
        config in arb_config(),
    ) {
        let interval = config.decay_interval;
        let mut sketch = WeightedSketch::new(config).unwrap();

        for label in 0..inserts as Label {
            sketch.insert_label(label);
        }
        for &label in &labels {
            sketch.update(label);
        }

        prop_assert_eq!(sketch.decay_events(), labels.len() as u64 / interval);
        prop_assert_eq!(sketch.ticks(), labels.len() as u64 % interval);
    }
}

// ── Exact recomputation ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn create_sketch_independent_of_insert_order(labels in arb_labels(), config in arb_config()) {
        let seed = config.seed;
        let mut reversed = labels.clone();
        reversed.reverse();

        let forward =
            WeightedSketch::from_base(config.clone(), LabelHashed::new(seed), labels).unwrap();
        let backward =
            WeightedSketch::from_base(config, LabelHashed::new(seed), reversed).unwrap();

        prop_assert_eq!(forward.snapshot().unwrap(), backward.snapshot().unwrap());
    }
}
