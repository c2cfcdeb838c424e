//! Error types shared across the crate.

use thiserror::Error;

/// Any failure a diagonalization or analysis operation can report.
///
/// Structural misuse (mismatched sizes, out-of-range margins passed to a
/// constructor) panics instead; these variants cover conditions that depend on
/// the data actually flowing through a computation.
#[derive(Debug, Error)]
pub enum EdError {
    /// The operation needs eigenvectors but the eigensystem holds only
    /// energies.
    #[error("eigensystem does not contain eigenvectors")]
    MissingEigenvectors,

    /// The operation needs a Fock basis but none is attached.
    #[error("eigensystem does not have a Fock basis attached")]
    MissingFockBasis,

    /// All eigenvalues are equal, so the spectrum cannot be rescaled onto
    /// [0, 1].
    #[error("all eigenvalues equal, cannot normalize")]
    DegenerateSpectrum,

    /// A band query selected no eigenstates.
    #[error("energy band [{from}, {to}) selects no eigenstates")]
    EmptyBand { from: f64, to: f64 },

    /// A band selection has no states left once the spectrum edges are
    /// dropped.
    #[error("band leaves no usable eigenstates after dropping spectrum edges")]
    EmptyTrimmedBand,

    /// A width margin around a computed band center leaves (0, 1).
    #[error("margin {margin} is too big around the energy {energy}")]
    MarginOverflow { margin: f64, energy: f64 },

    /// A quantile window truncated to indices is empty or out of bounds.
    #[error("quantile window [{from}, {to}) gives no valid index range")]
    BadQuantileWindow { from: f64, to: f64 },

    /// A restored checkpoint does not line up with the accumulator layout.
    #[error("restored state does not match: {0}")]
    CheckpointMismatch(String),

    /// Failure opening or using a named stream.
    #[error("{description}: I/O failure on '{name}'")]
    Stream {
        name: String,
        description: String,
        source: std::io::Error,
    },

    #[error("I/O failure")]
    Io(#[from] std::io::Error),

    #[error("eigensolver failure")]
    Eigensolver(#[from] ndarray_linalg::error::LinalgError),
}

pub type EdResult<T> = Result<T, EdError>;
