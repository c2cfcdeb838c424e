//! Band-averaged gap-ratio statistics.

use std::io::{ Read, Write };
use crate::{
    analyzer::{ AnalyzerTask, BandExtractor, InlineTask, Restorable },
    eigensystem::Eigensystem,
    error::{ EdError, EdResult },
    quantity::Quantity,
    storage,
};
use super::gap_ratio;

/// Accumulates one sample per eigensystem: the mean gap ratio over the
/// extracted band, with the spectrum-edge indices dropped since they lack a
/// neighbor gap on one side.
pub struct MeanGapRatio {
    extractor: BandExtractor,
    ratios: Vec<f64>,
}

impl MeanGapRatio {
    pub fn new(extractor: BandExtractor) -> Self {
        Self { extractor, ratios: Vec::new() }
    }
}

impl Restorable for MeanGapRatio {
    fn store_state(&self, out: &mut dyn Write) -> EdResult<()> {
        storage::write_samples(out, &self.ratios)
    }

    fn join_restored_state(&mut self, input: &mut dyn Read) -> EdResult<()> {
        self.ratios.extend(storage::read_samples(input)?);
        Ok(())
    }

    fn clear(&mut self) { self.ratios.clear(); }
}

impl AnalyzerTask for MeanGapRatio {
    fn analyze(&mut self, eigensystem: &Eigensystem) -> EdResult<()> {
        let indices = self.extractor.band_indices(eigensystem)?;
        let energies = eigensystem.normalized_eigenenergies()?.to_vec();
        let last = energies.len() - 1;
        let ratios: Vec<f64> = indices.into_iter()
            .filter(|&i| i != 0 && i != last)
            .map(|i| gap_ratio(&energies, i))
            .collect();
        if ratios.is_empty() {
            return Err(EdError::EmptyTrimmedBand);
        }
        self.ratios.push(ratios.iter().sum::<f64>() / ratios.len() as f64);
        Ok(())
    }

    fn name(&self) -> &str { "mgr" }

    fn as_inline(&self) -> Option<&dyn InlineTask> { Some(self) }
}

impl InlineTask for MeanGapRatio {
    fn result_header(&self) -> Vec<String> {
        vec!["meanGapRatio".to_string(), "meanGapRatioError".to_string()]
    }

    fn result_fields(&self) -> Vec<String> {
        let (value, error)
            = Quantity::from_samples(&self.ratios).value_error_strings();
        vec![value, error]
    }
}
