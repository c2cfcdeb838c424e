//! Gap-ratio statistics resolved across the whole normalized spectrum.

use std::io::{ Read, Write };
use crate::{
    analyzer::{ AnalyzerTask, BulkTask, Restorable },
    eigensystem::Eigensystem,
    error::{ EdError, EdResult },
    quantity::{ Quantity, Separator },
    storage,
};
use super::gap_ratio;

/// Pools the gap ratio of every interior eigenstate into uniform bins over
/// the normalized energy axis, across all analyzed eigensystems. Rows of the
/// bulk output are `binStart value error`.
pub struct BulkMeanGapRatio {
    bins: Vec<Vec<f64>>,
}

impl BulkMeanGapRatio {
    /// *Panics* if `num_bins` is zero.
    pub fn new(num_bins: usize) -> Self {
        if num_bins == 0 {
            panic!("BulkMeanGapRatio::new: number of bins must be positive");
        }
        Self { bins: vec![Vec::new(); num_bins] }
    }
}

impl Restorable for BulkMeanGapRatio {
    fn store_state(&self, out: &mut dyn Write) -> EdResult<()> {
        storage::write_u64(out, self.bins.len() as u64)?;
        for bin in self.bins.iter() {
            storage::write_samples(out, bin)?;
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
        for bin in self.bins.iter_mut() {
            bin.extend(storage::read_samples(input)?);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.bins.iter_mut().for_each(|bin| bin.clear());
    }
}

impl AnalyzerTask for BulkMeanGapRatio {
    fn analyze(&mut self, eigensystem: &Eigensystem) -> EdResult<()> {
        let energies = eigensystem.normalized_eigenenergies()?.to_vec();
        let num_bins = self.bins.len();
        for i in 1..energies.len().saturating_sub(1) {
            let bin = ((energies[i] * num_bins as f64) as usize)
                .min(num_bins - 1);
            self.bins[bin].push(gap_ratio(&energies, i));
        }
        Ok(())
    }

    fn name(&self) -> &str { "mgrBulk" }

    fn as_bulk(&self) -> Option<&dyn BulkTask> { Some(self) }
}

impl BulkTask for BulkMeanGapRatio {
    fn store_result(&self, out: &mut dyn Write) -> EdResult<()> {
        let num_bins = self.bins.len();
        for (b, bin) in self.bins.iter().enumerate() {
            let quantity = Quantity::from_samples(bin)
                .with_separator(Separator::Space);
            writeln!(out, "{:.4} {}", b as f64 / num_bins as f64, quantity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use ndarray as nd;
    use super::*;

    fn uniform_fixture() -> Eigensystem {
        Eigensystem::new(
            (0..9).map(|i| i as f64 / 8.0).collect::<Vec<f64>>().into(), None)
    }

    #[test]
    fn bins_pool_interior_gap_ratios() {
        let mut task = BulkMeanGapRatio::new(2);
        task.analyze(&uniform_fixture()).unwrap();
        let mut buf: Vec<u8> = Vec::new();
        task.store_result(&mut buf).unwrap();
        let result = String::from_utf8(buf).unwrap();
        // equally spaced spectrum: every interior ratio is 1
        assert_eq!(result, "0.0000 1.00000 0\n0.5000 1.00000 0\n");
    }

    #[test]
    fn checkpoint_merge_matches_direct_accumulation() {
        let fixture = Eigensystem::new(
            nd::array![0.0, 0.1, 0.4, 0.5, 0.6, 0.8, 0.9, 1.0], None);

        let mut direct = BulkMeanGapRatio::new(4);
        direct.analyze(&fixture).unwrap();
        direct.analyze(&uniform_fixture()).unwrap();
        let mut direct_out: Vec<u8> = Vec::new();
        direct.store_result(&mut direct_out).unwrap();

        let mut stored = BulkMeanGapRatio::new(4);
        stored.analyze(&fixture).unwrap();
        let mut buf: Vec<u8> = Vec::new();
        stored.store_state(&mut buf).unwrap();

        let mut merged = BulkMeanGapRatio::new(4);
        merged.analyze(&uniform_fixture()).unwrap();
        merged.join_restored_state(&mut Cursor::new(buf)).unwrap();
        let mut merged_out: Vec<u8> = Vec::new();
        merged.store_result(&mut merged_out).unwrap();

        assert_eq!(merged_out, direct_out);
    }

    #[test]
    fn join_with_wrong_bin_count_is_err() {
        let task = BulkMeanGapRatio::new(4);
        let mut buf: Vec<u8> = Vec::new();
        task.store_state(&mut buf).unwrap();

        let mut other = BulkMeanGapRatio::new(8);
        assert!(matches!(
            other.join_restored_state(&mut Cursor::new(buf)),
            Err(EdError::CheckpointMismatch(_)),
        ));
    }
}
