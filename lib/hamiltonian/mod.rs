//! Assembly of second-quantized Hamiltonians over a Fock basis.
//!
//! A [`HamiltonianGenerator`] owns a shared basis and ordered lists of
//! pluggable interaction terms. Diagonal terms contribute to matrix
//! diagonal entries directly; hopping terms are realized by acting with
//! ladder operators on every basis vector and looking up the image vector's
//! index, so a term itself only supplies the amplitude in front of the
//! operators.

use std::rc::Rc;
use ndarray as nd;
use ndarray_linalg::{ EigValshInto, EighInto, UPLO };
use crate::{
    eigensystem::Eigensystem,
    error::EdResult,
    fock::{ FockBasis, FockVector },
};

pub mod terms;
pub use terms::{
    CavityLongInteraction,
    ConstantForce,
    HubbardHop,
    HubbardOnsite,
    ListOnsite,
    OnsiteDisorder,
    QuasiperiodicDisorder,
};

/// A single hop of one particle between two sites.
#[derive(Clone, Debug, PartialEq)]
pub struct HopData {
    pub from_site: usize,
    pub to_site: usize,
    pub from_vector: FockVector,
    pub to_vector: FockVector,
    /// The constant produced by acting with `b†_to b_from` on `from_vector`,
    /// i.e. `sqrt((n_to + 1) * n_from)`.
    pub ladder_constant: f64,
}

/// One diagonal term of the Hamiltonian: contributes an energy depending
/// only on the occupations of a basis vector.
pub trait DiagonalTerm {
    /// The diagonal entry contribution for `vector`. The generator is
    /// passed for geometry queries (site distances, boundary condition).
    fn calculate(&self, vector: &FockVector, generator: &HamiltonianGenerator)
        -> f64;
}

/// One off-diagonal (single-hop) term of the Hamiltonian.
pub trait HoppingTerm {
    /// The amplitude in front of `b†_to b_from` for the given hop. Factors
    /// coming from the ladder operators themselves are applied by the
    /// generator and must not be included here.
    fn calculate(&self, hop: &HopData, generator: &HamiltonianGenerator)
        -> f64;
}

/// A term built from two chained `b† b` pairs (four site indices total),
/// producing next-nearest-neighbor-like matrix elements.
pub trait DoubleHoppingTerm {
    /// The amplitude in front of the chained ladder operators taking
    /// `first.from_vector` to `second.to_vector`. Ladder-operator factors
    /// are applied by the generator.
    fn calculate(
        &self,
        first: &HopData,
        second: &HopData,
        generator: &HamiltonianGenerator,
    ) -> f64;
}

/// Composes registered interaction terms into a real symmetric matrix
/// indexed by a shared [`FockBasis`].
pub struct HamiltonianGenerator {
    use_pbc: bool,
    basis: Rc<FockBasis>,
    diagonal_terms: Vec<Box<dyn DiagonalTerm>>,
    hopping_terms: Vec<Box<dyn HoppingTerm>>,
    double_hopping_terms: Vec<Box<dyn DoubleHoppingTerm>>,
}

impl HamiltonianGenerator {
    /// Create a generator for `basis` with periodic (`use_pbc`) or open
    /// boundary conditions. Terms are added afterwards.
    pub fn new(basis: Rc<FockBasis>, use_pbc: bool) -> Self {
        Self {
            use_pbc,
            basis,
            diagonal_terms: Vec::new(),
            hopping_terms: Vec::new(),
            double_hopping_terms: Vec::new(),
        }
    }

    pub fn add_diagonal_term(&mut self, term: Box<dyn DiagonalTerm>) {
        self.diagonal_terms.push(term);
    }

    pub fn add_hopping_term(&mut self, term: Box<dyn HoppingTerm>) {
        self.hopping_terms.push(term);
    }

    pub fn add_double_hopping_term(&mut self, term: Box<dyn DoubleHoppingTerm>)
    {
        self.double_hopping_terms.push(term);
    }

    pub fn fock_basis(&self) -> &Rc<FockBasis> { &self.basis }

    pub fn uses_pbc(&self) -> bool { self.use_pbc }

    /// The distance between two sites: the absolute index difference, or the
    /// shorter arc around the ring under periodic boundaries.
    ///
    /// *Panics* if either index is not a valid site.
    pub fn site_distance(&self, from_site: usize, to_site: usize) -> usize {
        let num_sites = self.basis.num_sites();
        if from_site >= num_sites || to_site >= num_sites {
            panic!("HamiltonianGenerator::site_distance: site out of range");
        }
        let distance = from_site.abs_diff(to_site);
        if self.use_pbc && distance > num_sites / 2 {
            num_sites - distance
        } else {
            distance
        }
    }

    /// Act with `b†_to b_from` on `from_vector`.
    ///
    /// Site indices one past the last site wrap around under periodic
    /// boundaries and are rejected under open ones. `None` marks a hop that
    /// annihilates the state (empty source site) or falls off the open edge;
    /// both are expected, silently-skipped outcomes.
    fn hopping_action(
        &self,
        from_vector: &FockVector,
        from_site: usize,
        to_site: usize,
    ) -> Option<HopData>
    {
        let num_sites = self.basis.num_sites();
        let (from_site, to_site) =
            if self.use_pbc {
                (from_site % num_sites, to_site % num_sites)
            } else if from_site >= num_sites || to_site >= num_sites {
                return None;
            } else {
                (from_site, to_site)
            };
        if from_site == to_site {
            panic!("HamiltonianGenerator::hopping_action: equal sites");
        }

        let constant =
            ((from_vector[to_site] + 1) * from_vector[from_site]) as f64;
        if constant == 0.0 { return None; }

        let mut to_vector = from_vector.clone();
        *to_vector.occupation_mut(from_site) -= 1;
        *to_vector.occupation_mut(to_site) += 1;
        Some(HopData {
            from_site,
            to_site,
            from_vector: from_vector.clone(),
            to_vector,
            ladder_constant: constant.sqrt(),
        })
    }

    fn add_diagonal_entries(&self, matrix: &mut nd::Array2<f64>, idx: usize) {
        let vector = self.basis.vector(idx);
        for term in self.diagonal_terms.iter() {
            matrix[[idx, idx]] += term.calculate(vector, self);
        }
    }

    fn add_hopping_entries(&self, matrix: &mut nd::Array2<f64>, from: usize) {
        for from_site in 0..self.basis.num_sites() {
            let hop = match self.hopping_action(
                self.basis.vector(from), from_site, from_site + 1)
            {
                Some(hop) => hop,
                None => continue,
            };

            let amplitude: f64 = self.hopping_terms.iter()
                .map(|term| term.calculate(&hop, self))
                .sum::<f64>()
                * hop.ladder_constant;
            let to = self.basis.find_index(&hop.to_vector)
                .expect("HamiltonianGenerator: hop image not in basis");
            matrix[[from, to]] += amplitude;
            matrix[[to, from]] += amplitude;
        }
    }

    fn double_hop_element(&self, first: &HopData, second: &HopData)
        -> (f64, usize)
    {
        let amplitude: f64 = self.double_hopping_terms.iter()
            .map(|term| term.calculate(first, second, self))
            .sum::<f64>()
            * first.ladder_constant * second.ladder_constant;
        let to = self.basis.find_index(&second.to_vector)
            .expect("HamiltonianGenerator: double-hop image not in basis");
        (amplitude, to)
    }

    fn perform_second_hop(
        &self,
        matrix: &mut nd::Array2<f64>,
        from: usize,
        first: &HopData,
    ) {
        for site in 0..self.basis.num_sites() {
            if let Some(second)
                = self.hopping_action(&first.to_vector, site, site + 1)
            {
                let (amplitude, to) = self.double_hop_element(first, &second);
                matrix[[to, from]] += amplitude;
            }
            if let Some(second)
                = self.hopping_action(&first.to_vector, site + 1, site)
            {
                let (amplitude, to) = self.double_hop_element(first, &second);
                matrix[[to, from]] += amplitude;
            }
        }
    }

    fn add_double_hopping_entries(
        &self,
        matrix: &mut nd::Array2<f64>,
        from: usize,
    ) {
        for site in 0..self.basis.num_sites() {
            if let Some(first)
                = self.hopping_action(self.basis.vector(from), site, site + 1)
            {
                self.perform_second_hop(matrix, from, &first);
            }
            if let Some(first)
                = self.hopping_action(self.basis.vector(from), site + 1, site)
            {
                self.perform_second_hop(matrix, from, &first);
            }
        }
    }

    /// Build the full symmetric matrix from all registered terms.
    pub fn generate(&self) -> nd::Array2<f64> {
        let dim = self.basis.len();
        let mut matrix: nd::Array2<f64> = nd::Array2::zeros((dim, dim));
        for idx in 0..dim {
            if !self.diagonal_terms.is_empty() {
                self.add_diagonal_entries(&mut matrix, idx);
            }
            if !self.hopping_terms.is_empty() {
                self.add_hopping_entries(&mut matrix, idx);
            }
            if !self.double_hopping_terms.is_empty() {
                self.add_double_hopping_entries(&mut matrix, idx);
            }
        }
        matrix
    }

    /// Generate the matrix and hand it to the symmetric eigensolver,
    /// wrapping the output in an [`Eigensystem`] that carries this
    /// generator's basis.
    ///
    /// A purely diagonal Hamiltonian skips the solver: the diagonal entries
    /// are the spectrum and the eigenvectors (if requested) are the basis
    /// vectors themselves.
    pub fn calculate_eigensystem(&self, compute_eigenvectors: bool)
        -> EdResult<Eigensystem>
    {
        let dim = self.basis.len();
        if self.hopping_terms.is_empty() && self.double_hopping_terms.is_empty()
        {
            let mut energies: nd::Array1<f64> = nd::Array1::zeros(dim);
            for term in self.diagonal_terms.iter() {
                for i in 0..dim {
                    energies[i] += term.calculate(self.basis.vector(i), self);
                }
            }
            if compute_eigenvectors {
                Ok(Eigensystem::with_eigenvectors(
                    energies, nd::Array2::eye(dim), Some(Rc::clone(&self.basis)),
                ))
            } else {
                Ok(Eigensystem::new(energies, Some(Rc::clone(&self.basis))))
            }
        } else if compute_eigenvectors {
            let (energies, states) = self.generate().eigh_into(UPLO::Lower)?;
            Ok(Eigensystem::with_eigenvectors(
                energies, states, Some(Rc::clone(&self.basis)),
            ))
        } else {
            let energies = self.generate().eigvalsh_into(UPLO::Lower)?;
            Ok(Eigensystem::new(energies, Some(Rc::clone(&self.basis))))
        }
    }
}
