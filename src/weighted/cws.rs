//! Consistent weighted sampling score
//!
//! For a label with weight `w` and slot parameters `(r, beta, c)`:
//!
//! ```text
//! y     = exp(ln(w) - r * beta)
//! score = c / (y * exp(r))
//!       = c * exp(r * (beta - 1)) / w
//! ```
//!
//! The label with the lowest score in a slot is that slot's sample. Heavier
//! labels tend to score lower, so the arg-min over the whole multiset is a
//! weight-biased sample that is reproducible from the same inputs.

use super::params::SlotParams;
use super::store::Weight;

/// Sampling score of one label in one slot
#[inline]
pub fn score(weight: Weight, params: &SlotParams) -> f64 {
    params.c * (params.r * (params.beta - 1.0)).exp() / weight.get()
}
