//! Averaged cumulative distribution of normalized eigenenergies.

use std::io::{ Read, Write };
use crate::{
    analyzer::{ AnalyzerTask, BulkTask, Restorable },
    eigensystem::Eigensystem,
    error::{ EdError, EdResult },
    quantity::{ Quantity, Separator },
    storage,
};

/// Samples, per eigensystem, the fraction of normalized energies at or
/// below each point of a uniform grid on [0, 1], and averages across
/// eigensystems. Rows of the bulk output are `x value error`.
pub struct Cdf {
    grid: Vec<Vec<f64>>,
}

impl Cdf {
    /// *Panics* if the grid has fewer than two points.
    pub fn new(num_points: usize) -> Self {
        if num_points < 2 {
            panic!("Cdf::new: at least two grid points are required");
        }
        Self { grid: vec![Vec::new(); num_points] }
    }
}

impl Restorable for Cdf {
    fn store_state(&self, out: &mut dyn Write) -> EdResult<()> {
        storage::write_u64(out, self.grid.len() as u64)?;
        for samples in self.grid.iter() {
            storage::write_samples(out, samples)?;
        }
        Ok(())
    }

    fn join_restored_state(&mut self, input: &mut dyn Read) -> EdResult<()> {
        let num_points = storage::read_u64(input)? as usize;
        if num_points != self.grid.len() {
            return Err(EdError::CheckpointMismatch(format!(
                "stored state holds {} grid points, task has {}",
                num_points, self.grid.len(),
            )));
        }
        for samples in self.grid.iter_mut() {
            samples.extend(storage::read_samples(input)?);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.grid.iter_mut().for_each(|samples| samples.clear());
    }
}

impl AnalyzerTask for Cdf {
    fn analyze(&mut self, eigensystem: &Eigensystem) -> EdResult<()> {
        let energies = eigensystem.normalized_eigenenergies()?.to_vec();
        let total = energies.len() as f64;
        let last = self.grid.len() - 1;
        for (b, samples) in self.grid.iter_mut().enumerate() {
            let x = b as f64 / last as f64;
            let below = energies.partition_point(|&e| e <= x);
            samples.push(below as f64 / total);
        }
        Ok(())
    }

    fn name(&self) -> &str { "cdf" }

    fn as_bulk(&self) -> Option<&dyn BulkTask> { Some(self) }
}

impl BulkTask for Cdf {
    fn store_result(&self, out: &mut dyn Write) -> EdResult<()> {
        let last = self.grid.len() - 1;
        for (b, samples) in self.grid.iter().enumerate() {
            let quantity = Quantity::from_samples(samples)
                .with_separator(Separator::Space);
            writeln!(out, "{:.4} {}", b as f64 / last as f64, quantity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray as nd;
    use super::*;

    #[test]
    fn grid_fractions() {
        let mut task = Cdf::new(3);
        task.analyze(&Eigensystem::new(nd::array![0.0, 1.0], None)).unwrap();
        let mut buf: Vec<u8> = Vec::new();
        task.store_result(&mut buf).unwrap();
        let result = String::from_utf8(buf).unwrap();
        assert_eq!(result,
            "0.0000 0.500000 0\n0.5000 0.500000 0\n1.0000 1.00000 0\n");
    }

    #[test]
    fn averages_across_eigensystems() {
        let mut task = Cdf::new(2);
        task.analyze(&Eigensystem::new(nd::array![0.0, 1.0], None)).unwrap();
        task.analyze(
            &Eigensystem::new(nd::array![0.0, 0.5, 1.0], None)).unwrap();
        let mut buf: Vec<u8> = Vec::new();
        task.store_result(&mut buf).unwrap();
        let result = String::from_utf8(buf).unwrap();
        // x = 0: fractions 1/2 and 1/3; x = 1: both 1
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines[0], "0.0000 0.41667 0.08333");
        assert_eq!(lines[1], "1.0000 1.00000 0");
    }
}
