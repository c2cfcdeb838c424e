//! The concrete statistical reducers.

mod bulk_mean_gap_ratio;
mod cdf;
mod dressed_states_finder;
mod inverse_participation_ratio;
mod mean_gap_ratio;
mod mean_inverse_participation_ratio;
mod participation_entropy;
mod pdf;

pub use bulk_mean_gap_ratio::BulkMeanGapRatio;
pub use cdf::Cdf;
pub use dressed_states_finder::DressedStatesFinder;
pub use inverse_participation_ratio::InverseParticipationRatio;
pub use mean_gap_ratio::MeanGapRatio;
pub use mean_inverse_participation_ratio::MeanInverseParticipationRatio;
pub use participation_entropy::ParticipationEntropy;
pub use pdf::Pdf;

/// The level-statistics diagnostic at interior index `i`:
/// `min(g1, g2) / max(g1, g2)` for the two gaps adjacent to `energies[i]`.
pub(crate) fn gap_ratio(energies: &[f64], i: usize) -> f64 {
    let gap_below = energies[i] - energies[i - 1];
    let gap_above = energies[i + 1] - energies[i];
    gap_below.min(gap_above) / gap_below.max(gap_above)
}

/// Inverse participation ratio of a unit-norm coefficient vector,
/// `1 / Σ c⁴`.
pub(crate) fn inverse_participation(coefficients: ndarray::ArrayView1<'_, f64>)
    -> f64
{
    1.0 / coefficients.iter().map(|c| c.powi(4)).sum::<f64>()
}
