//! Identification of eigenstates dominated by a single Fock vector.

use std::io::{ Read, Write };
use std::f64::consts::FRAC_1_SQRT_2;
use log::info;
use crate::{
    analyzer::{ AnalyzerTask, BandExtractor, BulkTask, Restorable },
    eigensystem::Eigensystem,
    error::EdResult,
    storage,
};

#[derive(Clone, Debug, PartialEq)]
struct DressedState {
    simulation_index: u64,
    label: String,
    energy: f64,
    coefficient: f64,
}

/// Records every in-band eigenstate whose overlap with some single Fock
/// basis vector exceeds a threshold, tagged with the index of the
/// eigensystem it came from. Rows of the bulk output are
/// `simulationIndex vector energy coefficient`, the energy normalized.
pub struct DressedStatesFinder {
    extractor: BandExtractor,
    coefficient_threshold: f64,
    simulation_count: u64,
    states: Vec<DressedState>,
}

impl DressedStatesFinder {
    /// *Panics* unless the threshold exceeds `1/sqrt(2)`; above that bound
    /// at most one coefficient per unit-norm eigenstate can qualify.
    pub fn new(extractor: BandExtractor, coefficient_threshold: f64) -> Self {
        if coefficient_threshold <= FRAC_1_SQRT_2 {
            panic!("DressedStatesFinder::new: coefficient threshold must \
                exceed 1/sqrt(2)");
        }
        Self {
            extractor,
            coefficient_threshold,
            simulation_count: 0,
            states: Vec::new(),
        }
    }
}

impl Restorable for DressedStatesFinder {
    fn store_state(&self, out: &mut dyn Write) -> EdResult<()> {
        storage::write_u64(out, self.simulation_count)?;
        storage::write_u64(out, self.states.len() as u64)?;
        for state in self.states.iter() {
            storage::write_u64(out, state.simulation_index)?;
            storage::write_f64(out, state.energy)?;
            storage::write_f64(out, state.coefficient)?;
            storage::write_label(out, &state.label)?;
        }
        Ok(())
    }

    fn join_restored_state(&mut self, input: &mut dyn Read) -> EdResult<()> {
        let simulation_count = storage::read_u64(input)?;
        let num_states = storage::read_u64(input)?;
        for _ in 0..num_states {
            let simulation_index = storage::read_u64(input)?;
            let energy = storage::read_f64(input)?;
            let coefficient = storage::read_f64(input)?;
            let label = storage::read_label(input)?;
            self.states.push(DressedState {
                // restored indices follow the simulations already seen here
                simulation_index: simulation_index + self.simulation_count,
                label,
                energy,
                coefficient,
            });
        }
        self.simulation_count += simulation_count;
        Ok(())
    }

    fn clear(&mut self) {
        self.simulation_count = 0;
        self.states.clear();
    }
}

impl AnalyzerTask for DressedStatesFinder {
    fn analyze(&mut self, eigensystem: &Eigensystem) -> EdResult<()> {
        let indices = self.extractor.band_indices(eigensystem)?;
        let basis = eigensystem.fock_basis()?.clone();
        let states = eigensystem.eigenstates()?;
        let energies = eigensystem.normalized_eigenenergies()?;
        let before = self.states.len();
        for &i in indices.iter() {
            for (j, &coefficient) in states.column(i).iter().enumerate() {
                if coefficient.abs() > self.coefficient_threshold {
                    self.states.push(DressedState {
                        simulation_index: self.simulation_count,
                        label: basis.vector(j).to_string(),
                        energy: energies[i],
                        coefficient,
                    });
                }
            }
        }
        info!(
            "found {}/{} dressed states",
            self.states.len() - before, indices.len(),
        );
        self.simulation_count += 1;
        Ok(())
    }

    fn name(&self) -> &str { "dressed" }

    fn as_bulk(&self) -> Option<&dyn BulkTask> { Some(self) }
}

impl BulkTask for DressedStatesFinder {
    fn store_result(&self, out: &mut dyn Write) -> EdResult<()> {
        for state in self.states.iter() {
            writeln!(
                out, "{} {} {} {}",
                state.simulation_index, state.label, state.energy,
                state.coefficient,
            )?;
        }
        Ok(())
    }
}
