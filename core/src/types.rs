//! Shared primitive types used across the entire projection.

/// The canonical run identifier.
pub type RunId = String;

/// Period numbering anchored to the scenario's start month.
/// Relative year 1 is the first twelve months of the horizon.
pub type RelativeYear = u32;

/// Divide, resolving a zero (or non-finite) result to 0.0.
///
/// Every ratio in the model goes through here: no units sold yet or no
/// revenue yet must read as zero, never as NaN leaking downstream.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let q = numerator / denominator;
    if q.is_finite() { q } else { 0.0 }
}
