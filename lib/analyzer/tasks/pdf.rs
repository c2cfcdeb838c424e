//! Averaged histogram of normalized eigenenergies.

use std::io::{ Read, Write };
use crate::{
    analyzer::{ AnalyzerTask, BulkTask, Restorable },
    eigensystem::Eigensystem,
    error::{ EdError, EdResult },
    quantity::{ Quantity, Separator },
    storage,
};

/// Per eigensystem, the fraction of normalized energies falling into each of
/// a fixed number of uniform bins on [0, 1]; fractions are averaged across
/// eigensystems. Rows of the bulk output are `binMiddle value error`.
pub struct Pdf {
    bins: Vec<Vec<f64>>,
}

impl Pdf {
    /// *Panics* with fewer than two bins; a one-bin histogram carries no
    /// information about the level distribution.
    pub fn new(num_bins: usize) -> Self {
        if num_bins < 2 {
            panic!("Pdf::new: at least two bins are required");
        }
        Self { bins: vec![Vec::new(); num_bins] }
    }
}

impl Restorable for Pdf {
    fn store_state(&self, out: &mut dyn Write) -> EdResult<()> {
        storage::write_u64(out, self.bins.len() as u64)?;
        for samples in self.bins.iter() {
            storage::write_samples(out, samples)?;
        }
        Ok(())
    }

    fn join_restored_state(&mut self, input: &mut dyn Read) -> EdResult<()> {
        let num_bins = storage::read_u64(input)? as usize;
        if num_bins != self.bins.len() {
            return Err(EdError::CheckpointMismatch(format!(
                "stored state holds {} bins, task has {}",
                num_bins, self.bins.len(),
            )));
        }
        for samples in self.bins.iter_mut() {
            samples.extend(storage::read_samples(input)?);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.bins.iter_mut().for_each(|samples| samples.clear());
    }
}

impl AnalyzerTask for Pdf {
    fn analyze(&mut self, eigensystem: &Eigensystem) -> EdResult<()> {
        let energies = eigensystem.normalized_eigenenergies()?;
        let num_bins = self.bins.len();
        let mut counts = vec![0_usize; num_bins];
        for &e in energies.iter() {
            let bin = ((e * num_bins as f64) as usize).min(num_bins - 1);
            counts[bin] += 1;
        }
        let total = energies.len() as f64;
        for (samples, count) in self.bins.iter_mut().zip(counts) {
            samples.push(count as f64 / total);
        }
        Ok(())
    }

    fn name(&self) -> &str { "pdf" }

    fn as_bulk(&self) -> Option<&dyn BulkTask> { Some(self) }
}

impl BulkTask for Pdf {
    fn store_result(&self, out: &mut dyn Write) -> EdResult<()> {
        let num_bins = self.bins.len() as f64;
        for (b, samples) in self.bins.iter().enumerate() {
            let quantity = Quantity::from_samples(samples)
                .with_separator(Separator::Space);
            writeln!(out, "{:.4} {}", (b as f64 + 0.5) / num_bins, quantity)?;
        }
        Ok(())
    }
}
