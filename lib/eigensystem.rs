//! Sorted, validated spectral data produced by diagonalization.

use std::{ io::{ Read, Write }, rc::Rc };
use ndarray as nd;
use crate::{
    error::{ EdError, EdResult },
    fock::FockBasis,
    storage,
};

/// Eigenvalues sorted ascending, optionally paired with unit-norm
/// eigenvectors (stored as matrix columns) and a back-reference to the Fock
/// basis the matrix was built over.
///
/// Construction sorts eigenvalue/eigenvector pairs jointly and normalizes
/// every eigenvector; after that the system never mutates. Eigenvector signs
/// are not canonicalized, so comparisons go through [`Eigensystem::approx_eq`]
/// which accepts either global sign.
#[derive(Clone, Debug)]
pub struct Eigensystem {
    energies: nd::Array1<f64>,
    states: Option<nd::Array2<f64>>,
    basis: Option<Rc<FockBasis>>,
}

impl Eigensystem {
    /// An energy-only eigensystem. Input order is irrelevant; energies are
    /// sorted ascending.
    ///
    /// *Panics* if a basis is supplied whose dimension does not match the
    /// eigenvalue count.
    pub fn new(energies: nd::Array1<f64>, basis: Option<Rc<FockBasis>>)
        -> Self
    {
        if let Some(basis) = basis.as_ref() {
            if basis.len() != energies.len() {
                panic!("Eigensystem::new: eigenvalue count does not match \
                    basis dimension");
            }
        }
        let mut sorted = energies.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self { energies: nd::Array1::from_vec(sorted), states: None, basis }
    }

    /// An eigensystem with eigenvectors, one matrix column per eigenvalue.
    /// Pairs are sorted jointly by ascending eigenvalue and every column is
    /// rescaled to unit Euclidean norm.
    ///
    /// *Panics* if the column count does not match the eigenvalue count, if
    /// the matrix is not square, if a basis is supplied whose dimension does
    /// not match, or if any column has near-zero norm.
    pub fn with_eigenvectors(
        energies: nd::Array1<f64>,
        states: nd::Array2<f64>,
        basis: Option<Rc<FockBasis>>,
    ) -> Self
    {
        if states.ncols() != energies.len() {
            panic!("Eigensystem::with_eigenvectors: eigenvector count does \
                not match eigenvalue count");
        }
        if states.nrows() != states.ncols() {
            panic!("Eigensystem::with_eigenvectors: non-square eigenvector \
                matrix");
        }
        if let Some(basis) = basis.as_ref() {
            if basis.len() != states.nrows() {
                panic!("Eigensystem::with_eigenvectors: eigenvector length \
                    does not match basis dimension");
            }
        }

        let mut order: Vec<usize> = (0..energies.len()).collect();
        order.sort_by(|&a, &b| energies[a].total_cmp(&energies[b]));

        let sorted_energies: nd::Array1<f64>
            = order.iter().map(|&i| energies[i]).collect();
        let mut sorted_states: nd::Array2<f64>
            = nd::Array2::zeros(states.dim());
        for (to, &from) in order.iter().enumerate() {
            sorted_states.column_mut(to).assign(&states.column(from));
        }
        for mut column in sorted_states.axis_iter_mut(nd::Axis(1)) {
            let norm = column.iter().map(|c| c * c).sum::<f64>().sqrt();
            if norm < 1e-12 {
                panic!("Eigensystem::with_eigenvectors: zero-norm \
                    eigenvector");
            }
            column.mapv_inplace(|c| c / norm);
        }

        Self { energies: sorted_energies, states: Some(sorted_states), basis }
    }

    pub fn len(&self) -> usize { self.energies.len() }

    pub fn is_empty(&self) -> bool { self.energies.is_empty() }

    pub fn has_eigenvectors(&self) -> bool { self.states.is_some() }

    pub fn has_fock_basis(&self) -> bool { self.basis.is_some() }

    pub fn eigenenergies(&self) -> &nd::Array1<f64> { &self.energies }

    pub fn eigenstates(&self) -> EdResult<&nd::Array2<f64>> {
        self.states.as_ref().ok_or(EdError::MissingEigenvectors)
    }

    /// The `i`-th eigenvector, as a column view.
    ///
    /// *Panics* if `i` is out of range.
    pub fn eigenstate(&self, i: usize) -> EdResult<nd::ArrayView1<'_, f64>> {
        if i >= self.len() {
            panic!("Eigensystem::eigenstate: index out of range");
        }
        Ok(self.eigenstates()?.column(i))
    }

    pub fn fock_basis(&self) -> EdResult<&Rc<FockBasis>> {
        self.basis.as_ref().ok_or(EdError::MissingFockBasis)
    }

    /// Energies rescaled onto [0, 1] via `(e - min) / (max - min)`. A
    /// single-entry spectrum normalizes to `[1]`; more entries with
    /// `max == min` are a [`EdError::DegenerateSpectrum`] error.
    ///
    /// *Panics* on an empty eigensystem.
    pub fn normalized_eigenenergies(&self) -> EdResult<nd::Array1<f64>> {
        if self.is_empty() {
            panic!("Eigensystem::normalized_eigenenergies: empty \
                eigensystem");
        }
        if self.len() == 1 {
            return Ok(nd::array![1.0]);
        }
        let min = self.energies[0];
        let max = self.energies[self.len() - 1];
        if max == min {
            return Err(EdError::DegenerateSpectrum);
        }
        Ok(self.energies.mapv(|e| (e - min) / (max - min)))
    }

    /// Indices whose normalized energy falls in the half-open window
    /// `[epsilon - delta/2, epsilon + delta/2)`. The window endpoints may
    /// poke outside [0, 1]; an empty selection is an error.
    ///
    /// *Panics* if `delta` is not positive or `epsilon` lies outside (0, 1).
    pub fn indices_in_band(&self, epsilon: f64, delta: f64)
        -> EdResult<Vec<usize>>
    {
        if epsilon <= 0.0 || epsilon >= 1.0 {
            panic!("Eigensystem::indices_in_band: epsilon must lie strictly \
                inside (0, 1)");
        }
        if delta <= 0.0 {
            panic!("Eigensystem::indices_in_band: delta must be positive");
        }
        let normalized = self.normalized_eigenenergies()?;
        let normalized = normalized.to_vec();
        let from = epsilon - delta / 2.0;
        let to = epsilon + delta / 2.0;
        let start = normalized.partition_point(|&e| e < from);
        let end = normalized.partition_point(|&e| e < to);
        if start == end {
            return Err(EdError::EmptyBand { from, to });
        }
        Ok((start..end).collect())
    }

    /// Exactly `count` contiguous indices whose normalized energies lie
    /// nearest to `epsilon`, grown greedily outward from the closest entry;
    /// the lower neighbor wins distance ties.
    ///
    /// *Panics* if `epsilon` lies outside (0, 1), or if `count` is zero or
    /// exceeds the spectrum size. Rejecting out-of-range centers here keeps
    /// a window from silently snapping to a spectrum edge.
    pub fn indices_of_closest(&self, epsilon: f64, count: usize)
        -> EdResult<Vec<usize>>
    {
        if epsilon <= 0.0 || epsilon >= 1.0 {
            panic!("Eigensystem::indices_of_closest: epsilon must lie \
                strictly inside (0, 1)");
        }
        if count == 0 {
            panic!("Eigensystem::indices_of_closest: count must be positive");
        }
        if count > self.len() {
            panic!("Eigensystem::indices_of_closest: count exceeds spectrum \
                size");
        }
        let normalized = self.normalized_eigenenergies()?;
        let normalized = normalized.to_vec();
        let mut lo = normalized.partition_point(|&e| e < epsilon);
        let mut hi = lo;
        while hi - lo < count {
            let take_lower =
                if lo == 0 {
                    false
                } else if hi == normalized.len() {
                    true
                } else {
                    (epsilon - normalized[lo - 1]).abs()
                        <= (normalized[hi] - epsilon).abs()
                };
            if take_lower { lo -= 1; } else { hi += 1; }
        }
        Ok((lo..hi).collect())
    }

    /// Whether the eigenvector matrix is orthonormal within a tolerance
    /// scaled by the dimension.
    pub fn is_orthonormal(&self) -> EdResult<bool> {
        let states = self.eigenstates()?;
        let overlap = states.t().dot(states);
        let tolerance = 1e-8 * self.len().max(1) as f64;
        let orthonormal = overlap.indexed_iter()
            .all(|((i, j), &x)| {
                let expected = if i == j { 1.0 } else { 0.0 };
                (x - expected).abs() <= tolerance
            });
        Ok(orthonormal)
    }

    /// Whether the stored entry count matches an externally-declared total
    /// dimension. Detects partial restores.
    pub fn is_complete(&self, expected_dimension: usize) -> bool {
        self.len() == expected_dimension
    }

    /// Elementwise comparison within `tolerance`; eigenvectors match up to a
    /// global per-column sign.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        if self.len() != other.len()
            || self.has_eigenvectors() != other.has_eigenvectors()
        {
            return false;
        }
        let energies_match = self.energies.iter()
            .zip(other.energies.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance);
        if !energies_match { return false; }
        match (self.states.as_ref(), other.states.as_ref()) {
            (Some(lhs), Some(rhs)) => {
                (0..self.len()).all(|j| {
                    let a = lhs.column(j);
                    let b = rhs.column(j);
                    a.iter().zip(b.iter())
                        .all(|(x, y)| (x - y).abs() <= tolerance)
                    || a.iter().zip(b.iter())
                        .all(|(x, y)| (x + y).abs() <= tolerance)
                })
            },
            _ => true,
        }
    }

    /* Persistence ***********************************************************/

    /// Write the eigenvalue count and raw eigenvalues.
    pub fn store(&self, out: &mut dyn Write) -> EdResult<()> {
        storage::write_u64(out, self.len() as u64)?;
        for &e in self.energies.iter() { storage::write_f64(out, e)?; }
        Ok(())
    }

    /// Write the eigenvalue count and raw eigenvector coefficients,
    /// column-major.
    pub fn store_eigenstates(&self, out: &mut dyn Write) -> EdResult<()> {
        let states = self.eigenstates()?;
        storage::write_u64(out, self.len() as u64)?;
        for column in states.axis_iter(nd::Axis(1)) {
            for &c in column.iter() { storage::write_f64(out, c)?; }
        }
        Ok(())
    }

    /// Read an energy-only eigensystem written by [`Eigensystem::store`],
    /// optionally re-attaching a basis.
    pub fn restore(input: &mut dyn Read, basis: Option<Rc<FockBasis>>)
        -> EdResult<Self>
    {
        let count = storage::read_u64(input)? as usize;
        let energies: nd::Array1<f64> = (0..count)
            .map(|_| storage::read_f64(input))
            .collect::<EdResult<Vec<f64>>>()?
            .into();
        Ok(Self::new(energies, basis))
    }

    /// Read the two-stream layout written by [`Eigensystem::store`] plus
    /// [`Eigensystem::store_eigenstates`]. The counts in the two streams
    /// must agree.
    pub fn restore_with_eigenstates(
        energy_input: &mut dyn Read,
        state_input: &mut dyn Read,
        basis: Option<Rc<FockBasis>>,
    ) -> EdResult<Self>
    {
        let count = storage::read_u64(energy_input)? as usize;
        let energies: nd::Array1<f64> = (0..count)
            .map(|_| storage::read_f64(energy_input))
            .collect::<EdResult<Vec<f64>>>()?
            .into();
        let state_count = storage::read_u64(state_input)? as usize;
        if state_count != count {
            return Err(EdError::CheckpointMismatch(format!(
                "eigenstate stream holds {} entries, energy stream {}",
                state_count, count,
            )));
        }
        let mut states: nd::Array2<f64> = nd::Array2::zeros((count, count));
        for j in 0..count {
            for i in 0..count {
                states[[i, j]] = storage::read_f64(state_input)?;
            }
        }
        Ok(Self::with_eigenvectors(energies, states, basis))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use crate::fock::FockBasisGenerator;
    use super::*;

    fn band_fixture() -> Eigensystem {
        Eigensystem::new(
            nd::array![0.0, 0.1, 0.3, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0], None)
    }

    #[test]
    fn construction_sorts_jointly() {
        let eigensystem = Eigensystem::with_eigenvectors(
            nd::array![2.0, 0.0, 1.0],
            nd::array![
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 0.0],
            ],
            None,
        );
        assert_eq!(*eigensystem.eigenenergies(), nd::array![0.0, 1.0, 2.0]);
        let states = eigensystem.eigenstates().unwrap();
        assert_eq!(states.column(0), nd::array![1.0, 0.0, 0.0]);
        assert_eq!(states.column(1), nd::array![0.0, 0.0, 1.0]);
        assert_eq!(states.column(2), nd::array![0.0, 1.0, 0.0]);
    }

    #[test]
    #[should_panic]
    fn new_with_mismatched_basis_panics() {
        let basis = Rc::new(FockBasisGenerator.generate(1, 3));
        Eigensystem::new(nd::array![0.0, 1.0], Some(basis));
    }

    #[test]
    fn construction_normalizes_columns() {
        let eigensystem = Eigensystem::with_eigenvectors(
            nd::array![0.0, 1.0],
            nd::array![
                [3.0, 0.0],
                [4.0, 2.0],
            ],
            None,
        );
        for j in 0..2 {
            let norm: f64 = eigensystem.eigenstate(j).unwrap()
                .iter().map(|c| c * c).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-8);
        }
    }

    #[test]
    #[should_panic]
    fn zero_norm_eigenvector_panics() {
        Eigensystem::with_eigenvectors(
            nd::array![0.0, 1.0],
            nd::array![
                [1.0, 0.0],
                [0.0, 0.0],
            ],
            None,
        );
    }

    #[test]
    #[should_panic]
    fn mismatched_basis_dimension_panics() {
        let basis = Rc::new(FockBasisGenerator.generate(2, 2));
        Eigensystem::with_eigenvectors(
            nd::array![0.0, 1.0], nd::Array2::eye(2), Some(basis));
    }

    #[test]
    fn normalized_energies_span_unit_interval() {
        let eigensystem = Eigensystem::new(nd::array![2.0, 3.0, 6.0], None);
        let normalized = eigensystem.normalized_eigenenergies().unwrap();
        assert_eq!(normalized, nd::array![0.0, 0.25, 1.0]);
    }

    #[test]
    fn normalized_energies_degenerate_is_err() {
        let eigensystem = Eigensystem::new(nd::array![1.0, 1.0, 1.0], None);
        assert!(matches!(
            eigensystem.normalized_eigenenergies(),
            Err(EdError::DegenerateSpectrum),
        ));
    }

    #[test]
    fn normalized_energies_single_entry() {
        let eigensystem = Eigensystem::new(nd::array![3.0], None);
        assert_eq!(
            eigensystem.normalized_eigenenergies().unwrap(),
            nd::array![1.0],
        );
    }

    #[test]
    fn band_selection() {
        let indices = band_fixture().indices_in_band(0.5, 0.5).unwrap();
        assert_eq!(indices, vec![2, 3, 4, 5]);
    }

    #[test]
    fn band_window_is_half_open() {
        // [0.25, 0.75): 0.7 is in, 0.75 would not be
        let indices = band_fixture().indices_in_band(0.5, 0.5).unwrap();
        assert!(indices.contains(&5));
        let indices = band_fixture().indices_in_band(0.4, 0.6).unwrap();
        // [0.1, 0.7): 0.1 included, 0.7 excluded
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_band_is_err() {
        assert!(matches!(
            band_fixture().indices_in_band(0.45, 0.02),
            Err(EdError::EmptyBand { .. }),
        ));
    }

    #[test]
    fn closest_indices() {
        let indices = band_fixture().indices_of_closest(0.5, 3).unwrap();
        assert_eq!(indices, vec![2, 3, 4]);
        let indices = band_fixture().indices_of_closest(0.05, 2).unwrap();
        assert_eq!(indices, vec![0, 1]);
        let indices = band_fixture().indices_of_closest(0.95, 2).unwrap();
        assert_eq!(indices, vec![7, 8]);
    }

    #[test]
    #[should_panic]
    fn closest_center_outside_unit_interval_panics() {
        // must not snap to the spectrum edge
        let _ = band_fixture().indices_of_closest(5.0, 2);
    }

    #[test]
    #[should_panic]
    fn band_center_outside_unit_interval_panics() {
        let _ = band_fixture().indices_in_band(1.5, 0.5);
    }

    #[test]
    fn orthonormality_check() {
        let good = Eigensystem::with_eigenvectors(
            nd::array![0.0, 1.0], nd::Array2::eye(2), None);
        assert!(good.is_orthonormal().unwrap());

        let skewed = Eigensystem::with_eigenvectors(
            nd::array![0.0, 1.0],
            nd::array![
                [1.0, 1.0],
                [0.0, 1.0],
            ],
            None,
        );
        assert!(!skewed.is_orthonormal().unwrap());

        let energy_only = Eigensystem::new(nd::array![0.0, 1.0], None);
        assert!(matches!(
            energy_only.is_orthonormal(),
            Err(EdError::MissingEigenvectors),
        ));
    }

    #[test]
    fn completeness_against_expected_dimension() {
        let eigensystem = Eigensystem::new(nd::array![0.0, 1.0, 2.0], None);
        assert!(eigensystem.is_complete(3));
        assert!(!eigensystem.is_complete(10));
    }

    #[test]
    fn store_restore_round_trip() {
        let basis = Rc::new(FockBasisGenerator.generate(2, 2));
        let eigensystem = Eigensystem::with_eigenvectors(
            nd::array![0.5, -1.0, 2.0],
            nd::array![
                [1.0, 1.0, 0.0],
                [1.0, -1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            Some(Rc::clone(&basis)),
        );

        let mut energy_buf: Vec<u8> = Vec::new();
        let mut state_buf: Vec<u8> = Vec::new();
        eigensystem.store(&mut energy_buf).unwrap();
        eigensystem.store_eigenstates(&mut state_buf).unwrap();

        let restored = Eigensystem::restore_with_eigenstates(
            &mut Cursor::new(energy_buf),
            &mut Cursor::new(state_buf),
            Some(basis),
        ).unwrap();
        assert!(restored.approx_eq(&eigensystem, 1e-12));
        assert!(restored.has_fock_basis());
    }

    #[test]
    fn restore_mismatched_streams_is_err() {
        let small = Eigensystem::new(nd::array![0.0, 1.0], None);
        let big = Eigensystem::with_eigenvectors(
            nd::array![0.0, 1.0, 2.0], nd::Array2::eye(3), None);
        let mut energy_buf: Vec<u8> = Vec::new();
        let mut state_buf: Vec<u8> = Vec::new();
        small.store(&mut energy_buf).unwrap();
        big.store_eigenstates(&mut state_buf).unwrap();
        assert!(matches!(
            Eigensystem::restore_with_eigenstates(
                &mut Cursor::new(energy_buf),
                &mut Cursor::new(state_buf),
                None,
            ),
            Err(EdError::CheckpointMismatch(_)),
        ));
    }

    #[test]
    fn approx_eq_ignores_global_sign() {
        let a = Eigensystem::with_eigenvectors(
            nd::array![0.0, 1.0], nd::Array2::eye(2), None);
        let b = Eigensystem::with_eigenvectors(
            nd::array![0.0, 1.0],
            nd::array![
                [-1.0, 0.0],
                [0.0, 1.0],
            ],
            None,
        );
        assert!(a.approx_eq(&b, 1e-12));
    }
}
