//! Small shared helpers used across the mining engine.

/// Total-order wrapper for `f64`, used wherever scores or bounds need to sit
/// in an ordered collection (`BinaryHeap`, sorting). An alias onto
/// `ordered_float`'s `OrderedFloat` rather than a hand-rolled `total_cmp`
/// newtype, matching how the wider pack reaches for `ordered_float::NotNan`
/// for the same concern.
///
/// # Examples
///
/// ```
/// use depminer::utils::OrdF64;
/// use std::collections::BinaryHeap;
///
/// let mut heap = BinaryHeap::new();
/// heap.push(OrdF64(3.14));
/// heap.push(OrdF64(2.71));
/// heap.push(OrdF64(1.41));
///
/// assert_eq!(heap.pop().unwrap().0, 3.14);
/// ```
pub type OrdF64 = ordered_float::OrderedFloat<f64>;

/// Clamp a score-like quantity into a usable range, flattening `NaN` to `0.0`.
///
/// Numerical guards throughout the scorer family (Newton-Raphson bounds,
/// incremental hypergeometric bias) can produce `NaN` or small negative
/// values from floating point error; every call site that finalizes a score
/// or a bound routes through this function rather than checking ad hoc.
#[inline]
pub fn clamp_nonnegative(x: f64) -> f64 {
    if x.is_nan() || x < 0.0 { 0.0 } else { x }
}
