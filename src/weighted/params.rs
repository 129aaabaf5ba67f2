//! Random parameters for consistent weighted sampling
//!
//! Every label gets one `(r, beta, c)` triple per sketch slot when it is first
//! seen. `r` and `c` follow Gamma(2, 1), `beta` is uniform on `[0, 1)`.
//! Where the draws come from is pluggable through [`ParameterSource`].

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use super::Label;

/// Random parameters of one label for one sketch slot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotParams {
    /// Gamma(2, 1) draw
    pub r: f64,
    /// Uniform [0, 1) draw
    pub beta: f64,
    /// Gamma(2, 1) draw
    pub c: f64,
}

impl SlotParams {
    pub fn new(r: f64, beta: f64, c: f64) -> Self {
        Self { r, beta, c }
    }

    fn sample<R: Rng>(r_rng: &mut R, beta_rng: &mut R, c_rng: &mut R) -> Self {
        Self {
            r: gamma2(r_rng),
            beta: beta_rng.random::<f64>(),
            c: gamma2(c_rng),
        }
    }
}

/// Source of per-label sampling parameters
///
/// `draw` is called exactly once per distinct label, when its store entry is
/// created. Implementations must return `slots` parameter triples.
pub trait ParameterSource: Send {
    /// Draw the parameters for a newly observed label
    fn draw(&mut self, label: Label, slots: usize) -> Box<[SlotParams]>;
}

/// Draw from Gamma(2, 1) as the sum of two unit exponentials
#[inline]
fn gamma2<R: Rng>(rng: &mut R) -> f64 {
    -unit_open(rng).ln() - unit_open(rng).ln()
}

/// Uniform on (0, 1], so the logarithm stays finite
#[inline]
fn unit_open<R: Rng>(rng: &mut R) -> f64 {
    1.0 - rng.random::<f64>()
}

/// Three independent seeded streams for `r`, `beta` and `c`
///
/// Parameters depend on the order in which new labels arrive, so two sketches
/// fed the same stream in the same order draw identical parameters. The
/// streams are owned by the sketch and advance only under its lock.
///
/// # Example
///
/// ```
/// use flowsketch::weighted::{ParameterSource, SeededStreams};
///
/// let mut a = SeededStreams::new(42);
/// let mut b = SeededStreams::new(42);
///
/// assert_eq!(a.draw(1, 8), b.draw(1, 8));
/// ```
#[derive(Clone, Debug)]
pub struct SeededStreams {
    r: ChaCha8Rng,
    beta: ChaCha8Rng,
    c: ChaCha8Rng,
}

impl SeededStreams {
    const R_STREAM: u64 = 0;
    const BETA_STREAM: u64 = 1;
    const C_STREAM: u64 = 2;

    /// Create the three streams from a single seed
    pub fn new(seed: u64) -> Self {
        Self {
            r: Self::stream(seed, Self::R_STREAM),
            beta: Self::stream(seed, Self::BETA_STREAM),
            c: Self::stream(seed, Self::C_STREAM),
        }
    }

    fn stream(seed: u64, stream: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        rng
    }
}

impl Default for SeededStreams {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ParameterSource for SeededStreams {
    fn draw(&mut self, _label: Label, slots: usize) -> Box<[SlotParams]> {
        (0..slots)
            .map(|_| SlotParams::sample(&mut self.r, &mut self.beta, &mut self.c))
            .collect()
    }
}

/// Parameters derived from the label itself
///
/// The label is hashed with xxh3 under the configured seed and the hash seeds
/// a private stream for that label. Two sketches sharing a seed therefore agree
/// on every label's parameters regardless of arrival order or thread, which
/// is what comparing sketches built by different producers requires.
///
/// # Example
///
/// ```
/// use flowsketch::weighted::{LabelHashed, ParameterSource};
///
/// let mut a = LabelHashed::new(7);
/// let mut b = LabelHashed::new(7);
///
/// let first = a.draw(10, 4);
/// b.draw(99, 4);
/// assert_eq!(first, b.draw(10, 4));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct LabelHashed {
    seed: u64,
}

impl LabelHashed {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl ParameterSource for LabelHashed {
    fn draw(&mut self, label: Label, slots: usize) -> Box<[SlotParams]> {
        let mut rng =
            ChaCha8Rng::seed_from_u64(xxh3_64_with_seed(&label.to_le_bytes(), self.seed));
        (0..slots)
            .map(|_| SlotParams {
                r: gamma2(&mut rng),
                beta: rng.random::<f64>(),
                c: gamma2(&mut rng),
            })
            .collect()
    }
}
