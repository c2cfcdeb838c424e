//! Selection of eigenstate working sets by energy criteria.

use log::info;
use crate::{
    eigensystem::Eigensystem,
    error::{ EdError, EdResult },
    fock::FockVector,
};

/// How wide a selection around a band center is.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Margin {
    /// A normalized-energy window of this total width.
    Width(f64),
    /// A fixed number of eigenstates nearest the center.
    NumberOfEnergies(usize),
}

impl Margin {
    fn validate(&self, context: &str) {
        match *self {
            Self::Width(w) => {
                if w <= 0.0 {
                    panic!("{}: width margin must be positive", context);
                }
            },
            Self::NumberOfEnergies(n) => {
                if n == 0 {
                    panic!("{}: number of energies must be positive", context);
                }
            },
        }
    }
}

/// A band around a fixed normalized energy.
#[derive(Clone, Debug, PartialEq)]
pub struct EpsilonRange {
    epsilon: f64,
    margin: Margin,
}

impl EpsilonRange {
    /// *Panics* on a center outside (0, 1), a non-positive margin, or a
    /// width window leaving (0, 1).
    pub fn new(epsilon: f64, margin: Margin) -> Self {
        margin.validate("EpsilonRange::new");
        if epsilon <= 0.0 || epsilon >= 1.0 {
            panic!("EpsilonRange::new: band center must lie strictly inside \
                (0, 1)");
        }
        if let Margin::Width(w) = margin {
            if epsilon - w / 2.0 <= 0.0 || epsilon + w / 2.0 >= 1.0 {
                panic!("EpsilonRange::new: energy window must lie strictly \
                    inside (0, 1)");
            }
        }
        Self { epsilon, margin }
    }
}

/// A band around the normalized expectation energy of a reference Fock
/// vector under the eigenbasis.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorRange {
    vector: FockVector,
    margin: Margin,
}

impl VectorRange {
    /// *Panics* on a non-positive margin. Whether a width window around the
    /// computed center stays inside (0, 1) can only be checked per
    /// eigensystem, so that failure surfaces from
    /// [`BandExtractor::band_indices`] instead.
    pub fn new(vector: FockVector, margin: Margin) -> Self {
        margin.validate("VectorRange::new");
        Self { vector, margin }
    }
}

/// A quantile window by eigenstate rank.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CdfRange {
    middle: f64,
    margin: f64,
}

impl CdfRange {
    /// *Panics* on a non-positive margin or a window touching either end of
    /// [0, 1]; a window with an endpoint at 0 or 1 would keep a spectrum
    /// edge in every selection.
    pub fn new(middle: f64, margin: f64) -> Self {
        if margin <= 0.0 {
            panic!("CdfRange::new: margin must be positive");
        }
        if middle - margin / 2.0 <= 0.0 || middle + margin / 2.0 >= 1.0 {
            panic!("CdfRange::new: quantile window must lie strictly inside \
                (0, 1)");
        }
        Self { middle, margin }
    }
}

/// The addressing scheme a [`BandExtractor`] dispatches on.
#[derive(Clone, Debug, PartialEq)]
pub enum Range {
    Epsilon(EpsilonRange),
    Vector(VectorRange),
    Cdf(CdfRange),
}

/// Resolves a [`Range`] against a concrete eigensystem, letting downstream
/// tasks stay agnostic to which addressing scheme selected their working
/// set.
#[derive(Clone, Debug, PartialEq)]
pub struct BandExtractor {
    range: Range,
}

impl BandExtractor {
    pub fn new(range: Range) -> Self { Self { range } }

    pub fn epsilon(epsilon: f64, margin: Margin) -> Self {
        Self::new(Range::Epsilon(EpsilonRange::new(epsilon, margin)))
    }

    pub fn vector(vector: FockVector, margin: Margin) -> Self {
        Self::new(Range::Vector(VectorRange::new(vector, margin)))
    }

    pub fn cdf(middle: f64, margin: f64) -> Self {
        Self::new(Range::Cdf(CdfRange::new(middle, margin)))
    }

    /// The ascending eigenstate indices selected by the active range.
    pub fn band_indices(&self, eigensystem: &Eigensystem)
        -> EdResult<Vec<usize>>
    {
        match &self.range {
            Range::Epsilon(range) => {
                let indices = Self::indices_around(
                    eigensystem, range.epsilon, range.margin)?;
                Self::log_resolved_band(eigensystem, range.epsilon, &indices)?;
                Ok(indices)
            },
            Range::Vector(range) => {
                let center
                    = Self::vector_expectation_energy(eigensystem, &range.vector)?;
                info!(
                    "extracting band around vector {}, epsilon = {:.6}",
                    range.vector, center,
                );
                if let Margin::Width(w) = range.margin {
                    if center - w / 2.0 <= 0.0 || center + w / 2.0 >= 1.0 {
                        return Err(EdError::MarginOverflow {
                            margin: w,
                            energy: center,
                        });
                    }
                }
                let indices
                    = Self::indices_around(eigensystem, center, range.margin)?;
                Self::log_resolved_band(eigensystem, center, &indices)?;
                Ok(indices)
            },
            Range::Cdf(range) => {
                let size = eigensystem.len();
                let from = range.middle - range.margin / 2.0;
                let to = range.middle + range.margin / 2.0;
                let from_idx = (from * size as f64) as usize;
                let to_idx = (to * size as f64) as usize;
                info!(
                    "extracting quantile window [{:.4}, {:.4}], \
                    indices [{}, {})",
                    from, to, from_idx, to_idx,
                );
                if from_idx == to_idx || from_idx == 0 || to_idx >= size {
                    return Err(EdError::BadQuantileWindow { from, to });
                }
                Ok((from_idx..to_idx).collect())
            },
        }
    }

    /// Reports the window the selection actually resolved to, not just the
    /// one that was requested.
    fn log_resolved_band(
        eigensystem: &Eigensystem,
        epsilon: f64,
        indices: &[usize],
    ) -> EdResult<()>
    {
        if let (Some(&first), Some(&last)) = (indices.first(), indices.last()) {
            let energies = eigensystem.normalized_eigenenergies()?;
            info!(
                "band around epsilon = {}: energies [{:.6}, {:.6}], \
                indices [{}, {}]",
                epsilon, energies[first], energies[last], first, last,
            );
        }
        Ok(())
    }

    fn indices_around(
        eigensystem: &Eigensystem,
        epsilon: f64,
        margin: Margin,
    ) -> EdResult<Vec<usize>>
    {
        match margin {
            Margin::Width(w) => eigensystem.indices_in_band(epsilon, w),
            Margin::NumberOfEnergies(n)
                => eigensystem.indices_of_closest(epsilon, n),
        }
    }

    /// The reference vector's energy under the eigenbasis, `Σ_j E_j |c_j|²`
    /// with `c_j` the projection onto eigenstate `j`, rescaled onto [0, 1]
    /// like the spectrum itself.
    ///
    /// *Panics* if the vector is not a member of the attached basis.
    fn vector_expectation_energy(
        eigensystem: &Eigensystem,
        vector: &FockVector,
    ) -> EdResult<f64>
    {
        let basis = eigensystem.fock_basis()?;
        let states = eigensystem.eigenstates()?;
        let basis_index = basis.find_index(vector)
            .unwrap_or_else(|| panic!(
                "BandExtractor: reference vector {} is not in the basis",
                vector,
            ));
        let energies = eigensystem.eigenenergies();
        let expectation: f64 = (0..eigensystem.len())
            .map(|j| {
                let c = states[[basis_index, j]];
                energies[j] * c * c
            })
            .sum();
        let min = energies[0];
        let max = energies[energies.len() - 1];
        if max == min {
            return Err(EdError::DegenerateSpectrum);
        }
        Ok((expectation - min) / (max - min))
    }
}
