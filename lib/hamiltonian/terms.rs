//! The concrete interaction terms composable into a Hamiltonian.

use std::f64::consts::PI;
use rand::Rng;
use crate::{
    disorder::DisorderGenerator,
    fock::FockVector,
    hamiltonian::{ DiagonalTerm, HamiltonianGenerator, HopData, HoppingTerm },
};

/// Nearest-neighbor tunneling, `-J b†_i b_j` for adjacent sites.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HubbardHop {
    j: f64,
}

impl HubbardHop {
    pub fn new(j: f64) -> Self { Self { j } }
}

impl HoppingTerm for HubbardHop {
    fn calculate(&self, hop: &HopData, generator: &HamiltonianGenerator)
        -> f64
    {
        if generator.site_distance(hop.from_site, hop.to_site) != 1 {
            panic!("HubbardHop::calculate: only nearest-neighbor hops are \
                supported");
        }
        -self.j
    }
}

/// On-site repulsion, `U/2 Σ n_i (n_i - 1)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HubbardOnsite {
    u: f64,
}

impl HubbardOnsite {
    pub fn new(u: f64) -> Self { Self { u } }
}

impl DiagonalTerm for HubbardOnsite {
    fn calculate(&self, vector: &FockVector, _: &HamiltonianGenerator) -> f64 {
        self.u / 2.0
            * vector.iter().map(|&n| (n * n.saturating_sub(1)) as f64).sum::<f64>()
    }
}

/// Random on-site energies, `Σ E_i n_i`, with the `E_i` drawn once at
/// construction and redrawable per disorder realization.
#[derive(Clone, Debug, PartialEq)]
pub struct OnsiteDisorder {
    onsite_energies: Vec<f64>,
}

impl OnsiteDisorder {
    pub fn new<D, R>(disorder: &D, num_sites: usize, rng: &mut R) -> Self
    where
        D: DisorderGenerator,
        R: Rng + ?Sized,
    {
        Self {
            onsite_energies:
                (0..num_sites).map(|_| disorder.sample(rng)).collect(),
        }
    }

    /// Redraw every on-site energy for a new disorder realization.
    pub fn resample<D, R>(&mut self, disorder: &D, rng: &mut R)
    where
        D: DisorderGenerator,
        R: Rng + ?Sized,
    {
        self.onsite_energies.iter_mut()
            .for_each(|e| { *e = disorder.sample(rng); });
    }

    pub fn onsite_energies(&self) -> &[f64] { &self.onsite_energies }
}

impl DiagonalTerm for OnsiteDisorder {
    fn calculate(&self, vector: &FockVector, _: &HamiltonianGenerator) -> f64 {
        if vector.len() != self.onsite_energies.len() {
            panic!("OnsiteDisorder::calculate: mismatched number of sites");
        }
        vector.iter().zip(self.onsite_energies.iter())
            .map(|(&n, e)| n as f64 * e)
            .sum()
    }
}

/// Deterministic quasiperiodic potential,
/// `Σ W cos(2 π β i + φ0) n_i`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QuasiperiodicDisorder {
    w: f64,
    beta: f64,
    phi0: f64,
}

impl QuasiperiodicDisorder {
    pub fn new(w: f64, beta: f64, phi0: f64) -> Self {
        Self { w, beta, phi0 }
    }

    /// Shift the phase for a new realization.
    pub fn set_phi0(&mut self, phi0: f64) { self.phi0 = phi0; }
}

impl DiagonalTerm for QuasiperiodicDisorder {
    fn calculate(&self, vector: &FockVector, _: &HamiltonianGenerator) -> f64 {
        vector.iter().enumerate()
            .map(|(i, &n)| {
                self.w * (2.0 * PI * self.beta * i as f64 + self.phi0).cos()
                    * n as f64
            })
            .sum()
    }
}

/// Cavity-mediated all-to-all interaction,
/// `-U1/K (Σ cos(2 π β i + φ0) n_i)²`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CavityLongInteraction {
    u1: f64,
    beta: f64,
    phi0: f64,
}

impl CavityLongInteraction {
    pub fn new(u1: f64, beta: f64, phi0: f64) -> Self {
        Self { u1, beta, phi0 }
    }

    pub fn set_phi0(&mut self, phi0: f64) { self.phi0 = phi0; }
}

impl DiagonalTerm for CavityLongInteraction {
    fn calculate(&self, vector: &FockVector, _: &HamiltonianGenerator) -> f64 {
        let weighted: f64 = vector.iter().enumerate()
            .map(|(i, &n)| {
                (2.0 * PI * self.beta * i as f64 + self.phi0).cos() * n as f64
            })
            .sum();
        -self.u1 / vector.len() as f64 * weighted.powi(2)
    }
}

/// Linear tilt `F Σ (i - (K-1)/2) n_i`, zero at the chain center. Only
/// meaningful on an open chain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstantForce {
    f: f64,
}

impl ConstantForce {
    pub fn new(f: f64) -> Self { Self { f } }
}

impl DiagonalTerm for ConstantForce {
    fn calculate(&self, vector: &FockVector, generator: &HamiltonianGenerator)
        -> f64
    {
        if generator.uses_pbc() {
            panic!("ConstantForce::calculate: periodic boundary conditions \
                are not supported");
        }
        let center = (vector.len() - 1) as f64 / 2.0;
        vector.iter().enumerate()
            .map(|(i, &n)| self.f * (i as f64 - center) * n as f64)
            .sum()
    }
}

/// Fixed per-site potential list, `Σ V_i n_i`.
#[derive(Clone, Debug, PartialEq)]
pub struct ListOnsite {
    potentials: Vec<f64>,
}

impl ListOnsite {
    pub fn new(potentials: Vec<f64>) -> Self { Self { potentials } }
}

impl DiagonalTerm for ListOnsite {
    fn calculate(&self, vector: &FockVector, _: &HamiltonianGenerator) -> f64 {
        if vector.len() != self.potentials.len() {
            panic!("ListOnsite::calculate: mismatched number of sites");
        }
        vector.iter().zip(self.potentials.iter())
            .map(|(&n, v)| n as f64 * v)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use crate::disorder::UniformDisorder;
    use crate::fock::{ FockBasisGenerator, FockVector };
    use super::*;

    fn generator(n: usize, k: usize, pbc: bool) -> HamiltonianGenerator {
        HamiltonianGenerator::new(
            Rc::new(FockBasisGenerator.generate(n, k)), pbc)
    }

    fn fv(occupations: &[usize]) -> FockVector {
        occupations.to_vec().into()
    }

    #[test]
    fn hubbard_onsite_counts_pairs() {
        let gen = generator(3, 3, false);
        let term = HubbardOnsite::new(3.0);
        assert_eq!(term.calculate(&fv(&[2, 1, 0]), &gen), 3.0);
        assert_eq!(term.calculate(&fv(&[3, 0, 0]), &gen), 9.0);
        assert_eq!(term.calculate(&fv(&[1, 1, 1]), &gen), 0.0);
    }

    #[test]
    fn constant_force_tilts_around_center() {
        let gen = generator(1, 3, false);
        let term = ConstantForce::new(2.0);
        assert_eq!(term.calculate(&fv(&[1, 0, 0]), &gen), -2.0);
        assert_eq!(term.calculate(&fv(&[0, 1, 0]), &gen), 0.0);
        assert_eq!(term.calculate(&fv(&[0, 0, 1]), &gen), 2.0);
    }

    #[test]
    #[should_panic]
    fn constant_force_rejects_pbc() {
        let gen = generator(1, 3, true);
        ConstantForce::new(1.0).calculate(&fv(&[1, 0, 0]), &gen);
    }

    #[test]
    fn list_onsite_weights_occupations() {
        let gen = generator(3, 2, false);
        let term = ListOnsite::new(vec![0.5, -1.0]);
        assert_eq!(term.calculate(&fv(&[2, 1]), &gen), 0.0);
        assert_eq!(term.calculate(&fv(&[0, 3]), &gen), -3.0);
    }

    #[test]
    #[should_panic]
    fn list_onsite_mismatched_sites_panics() {
        let gen = generator(1, 3, false);
        ListOnsite::new(vec![0.5, -1.0]).calculate(&fv(&[1, 0, 0]), &gen);
    }

    #[test]
    fn quasiperiodic_potential_values() {
        let gen = generator(2, 2, false);
        // beta = 1/2: cos(pi i) alternates +1, -1
        let mut term = QuasiperiodicDisorder::new(1.5, 0.5, 0.0);
        assert!((term.calculate(&fv(&[2, 0]), &gen) - 3.0).abs() < 1e-12);
        assert!((term.calculate(&fv(&[0, 2]), &gen) + 3.0).abs() < 1e-12);
        term.set_phi0(PI);
        assert!((term.calculate(&fv(&[2, 0]), &gen) + 3.0).abs() < 1e-12);
    }

    #[test]
    fn cavity_interaction_value() {
        let gen = generator(2, 2, false);
        // beta = 0: the weighted sum is the particle number
        let term = CavityLongInteraction::new(2.0, 0.0, 0.0);
        assert!((term.calculate(&fv(&[1, 1]), &gen) + 4.0).abs() < 1e-12);
    }

    #[test]
    fn onsite_disorder_resamples() {
        let disorder = UniformDisorder::new(-1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(42);
        let mut term = OnsiteDisorder::new(&disorder, 4, &mut rng);
        assert_eq!(term.onsite_energies().len(), 4);
        let before = term.onsite_energies().to_vec();
        term.resample(&disorder, &mut rng);
        assert_eq!(term.onsite_energies().len(), 4);
        assert_ne!(before, term.onsite_energies());
    }

    #[test]
    #[should_panic]
    fn onsite_disorder_mismatched_sites_panics() {
        let disorder = UniformDisorder::new(-1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(42);
        let term = OnsiteDisorder::new(&disorder, 2, &mut rng);
        let gen = generator(1, 3, false);
        term.calculate(&fv(&[1, 0, 0]), &gen);
    }
}
