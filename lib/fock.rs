//! Occupation-number (Fock) vectors and the bosonic bases built from them.

use std::{ fmt, num::ParseIntError, ops::{ Deref, Index }, str::FromStr };
use indexmap::IndexSet;
use itertools::Itertools;

/* Fock vectors ***************************************************************/

/// A single product state: the number of particles sitting on each lattice
/// site.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FockVector(Vec<usize>);

impl FockVector {
    /// Create a vector of `sites` empty sites.
    pub fn zeros(sites: usize) -> Self { Self(vec![0; sites]) }

    /// Number of lattice sites.
    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Total number of particles across all sites.
    pub fn total_particles(&self) -> usize { self.0.iter().sum() }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> { self.0.iter() }

    /// Occupation of site `site`.
    pub fn occupation(&self, site: usize) -> usize { self.0[site] }

    pub(crate) fn occupation_mut(&mut self, site: usize) -> &mut usize {
        &mut self.0[site]
    }

    /// Concatenate two vectors into one over the combined set of sites.
    pub fn concat(&self, rhs: &Self) -> Self {
        Self(self.0.iter().chain(rhs.0.iter()).copied().collect())
    }
}

impl Deref for FockVector {
    type Target = [usize];

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl Index<usize> for FockVector {
    type Output = usize;

    fn index(&self, site: usize) -> &usize { &self.0[site] }
}

impl From<Vec<usize>> for FockVector {
    fn from(occupations: Vec<usize>) -> Self { Self(occupations) }
}

impl FromIterator<usize> for FockVector {
    fn from_iter<I>(iter: I) -> Self
    where I: IntoIterator<Item = usize>
    {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FockVector {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

/// Occupations joined with dots, e.g. `2.0.1`.
impl fmt::Display for FockVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("."))
    }
}

/// Parse the dotted occupation representation produced by `Display`.
impl FromStr for FockVector {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('.')
            .map(|token| token.trim().parse::<usize>())
            .collect::<Result<Vec<usize>, _>>()
            .map(Self)
    }
}

/* Fock bases *****************************************************************/

/// An ordered, duplicate-free collection of equal-length [`FockVector`]s.
///
/// Insertion order defines the index used everywhere else as the Hamiltonian
/// matrix dimension index. Built once by [`FockBasisGenerator`] and then
/// shared read-only (`Rc<FockBasis>`) by the Hamiltonian generator, the
/// eigensystems, and any basis-aware analyzer task.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FockBasis {
    vectors: IndexSet<FockVector>,
}

impl FockBasis {
    pub fn new() -> Self { Self::default() }

    /// Append a vector, assigning it the next index.
    ///
    /// *Panics* if the vector's site count differs from the vectors already
    /// present.
    pub fn add(&mut self, vector: FockVector) {
        if let Some(first) = self.vectors.first() {
            if first.len() != vector.len() {
                panic!("FockBasis::add: mismatched number of sites");
            }
        }
        self.vectors.insert(vector);
    }

    pub fn len(&self) -> usize { self.vectors.len() }

    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }

    /// The vector stored at index `i`.
    ///
    /// *Panics* if `i` is out of range.
    pub fn vector(&self, i: usize) -> &FockVector {
        self.vectors.get_index(i)
            .expect("FockBasis::vector: index out of range")
    }

    /// The generation-order index of `vector`, or `None` if it is not a
    /// member (including the wrong-length case).
    pub fn find_index(&self, vector: &FockVector) -> Option<usize> {
        self.vectors.get_index_of(vector)
    }

    pub fn iter(&self) -> indexmap::set::Iter<'_, FockVector> {
        self.vectors.iter()
    }

    /// Number of lattice sites.
    ///
    /// *Panics* on an empty basis.
    pub fn num_sites(&self) -> usize {
        self.vectors.first()
            .expect("FockBasis::num_sites: empty basis")
            .len()
    }

    /// Total particle number.
    ///
    /// *Panics* on an empty basis.
    pub fn num_particles(&self) -> usize {
        self.vectors.first()
            .expect("FockBasis::num_particles: empty basis")
            .total_particles()
    }
}

impl<'a> IntoIterator for &'a FockBasis {
    type Item = &'a FockVector;
    type IntoIter = indexmap::set::Iter<'a, FockVector>;

    fn into_iter(self) -> Self::IntoIter { self.vectors.iter() }
}

impl FromIterator<FockVector> for FockBasis {
    fn from_iter<I>(iter: I) -> Self
    where I: IntoIterator<Item = FockVector>
    {
        let mut basis = Self::new();
        iter.into_iter().for_each(|v| { basis.add(v); });
        basis
    }
}

/* Basis generation ***********************************************************/

/// Generates the complete bosonic basis for a fixed particle and site count.
#[derive(Copy, Clone, Debug, Default)]
pub struct FockBasisGenerator;

impl FockBasisGenerator {
    /// Enumerate every way of distributing `num_particles` bosons over
    /// `num_sites` sites, C(N+K-1, K-1) vectors in total.
    ///
    /// The order is the mixed-radix one anchored at the first site: start
    /// with all particles on site 0, then repeatedly decrement the rightmost
    /// non-final occupied site, dump the freed remainder onto the site just
    /// after it, and zero everything further right.
    ///
    /// *Panics* if `num_sites` is zero.
    pub fn generate(&self, num_particles: usize, num_sites: usize)
        -> FockBasis
    {
        if num_sites == 0 {
            panic!("FockBasisGenerator::generate: num_sites must be positive");
        }

        let mut basis = FockBasis::new();
        let mut current = FockVector::zeros(num_sites);
        *current.occupation_mut(0) = num_particles;
        basis.add(current.clone());

        while current.occupation(num_sites - 1) != num_particles {
            let mut k = num_sites - 2;
            while current.occupation(k) == 0 { k -= 1; }

            *current.occupation_mut(k) -= 1;
            let head: usize = current.iter().take(k + 1).sum();
            *current.occupation_mut(k + 1) = num_particles - head;
            (k + 2..num_sites)
                .for_each(|j| { *current.occupation_mut(j) = 0; });

            basis.add(current.clone());
        }
        basis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(occupations: &[usize]) -> FockVector {
        occupations.to_vec().into()
    }

    #[test]
    fn generate_3_particles_3_sites() {
        let basis = FockBasisGenerator.generate(3, 3);
        let expected: Vec<FockVector> = [
            [3, 0, 0], [2, 1, 0], [2, 0, 1], [1, 2, 0], [1, 1, 1],
            [1, 0, 2], [0, 3, 0], [0, 2, 1], [0, 1, 2], [0, 0, 3],
        ].iter().map(|occ| fv(occ)).collect();
        let generated: Vec<FockVector> = basis.iter().cloned().collect();
        assert_eq!(generated, expected);
    }

    #[test]
    fn generate_counts_and_sums() {
        fn binom(n: usize, k: usize) -> usize {
            (1..=k).fold(1, |acc, j| acc * (n - k + j) / j)
        }

        for n in 0..=5 {
            for k in 1..=4 {
                let basis = FockBasisGenerator.generate(n, k);
                assert_eq!(basis.len(), binom(n + k - 1, k - 1));
                assert!(basis.iter().all(|v| v.len() == k));
                assert!(basis.iter().all(|v| v.total_particles() == n));
            }
        }
    }

    #[test]
    fn generate_zero_particles() {
        let basis = FockBasisGenerator.generate(0, 4);
        assert_eq!(basis.len(), 1);
        assert_eq!(*basis.vector(0), fv(&[0, 0, 0, 0]));
    }

    #[test]
    #[should_panic]
    fn generate_zero_sites_panics() {
        FockBasisGenerator.generate(2, 0);
    }

    #[test]
    fn find_index_round_trip() {
        let basis = FockBasisGenerator.generate(4, 3);
        for (i, vector) in basis.iter().enumerate() {
            assert_eq!(basis.find_index(vector), Some(i));
        }
        assert_eq!(basis.find_index(&fv(&[4, 4, 4])), None);
        // wrong number of sites is "not found", not an error
        assert_eq!(basis.find_index(&fv(&[4, 0])), None);
    }

    #[test]
    #[should_panic]
    fn add_mismatched_sites_panics() {
        let mut basis = FockBasis::new();
        basis.add(fv(&[1, 0]));
        basis.add(fv(&[1, 0, 0]));
    }

    #[test]
    fn display_and_parse() {
        let vector = fv(&[2, 0, 1]);
        assert_eq!(vector.to_string(), "2.0.1");
        assert_eq!("2.0.1".parse::<FockVector>().unwrap(), vector);
        assert!("2.x.1".parse::<FockVector>().is_err());
    }

    #[test]
    fn concat_joins_sites() {
        let joined = fv(&[1, 2]).concat(&fv(&[0, 3]));
        assert_eq!(joined, fv(&[1, 2, 0, 3]));
    }

    #[test]
    fn basis_metadata() {
        let basis = FockBasisGenerator.generate(2, 3);
        assert_eq!(basis.num_sites(), 3);
        assert_eq!(basis.num_particles(), 2);
    }
}
