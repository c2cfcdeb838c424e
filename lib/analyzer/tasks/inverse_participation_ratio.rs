//! Per-state inverse participation ratios pooled across eigensystems.

use std::io::{ Read, Write };
use crate::{
    analyzer::{ AnalyzerTask, BandExtractor, InlineTask, Restorable },
    eigensystem::Eigensystem,
    error::EdResult,
    quantity::Quantity,
    storage,
};
use super::inverse_participation;

/// Unlike [`super::MeanInverseParticipationRatio`], every in-band
/// eigenstate contributes its own sample, so the error reflects the spread
/// over states rather than over disorder realizations.
pub struct InverseParticipationRatio {
    extractor: BandExtractor,
    ratios: Vec<f64>,
}

impl InverseParticipationRatio {
    pub fn new(extractor: BandExtractor) -> Self {
        Self { extractor, ratios: Vec::new() }
    }
}

impl Restorable for InverseParticipationRatio {
    fn store_state(&self, out: &mut dyn Write) -> EdResult<()> {
        storage::write_samples(out, &self.ratios)
    }

    fn join_restored_state(&mut self, input: &mut dyn Read) -> EdResult<()> {
        self.ratios.extend(storage::read_samples(input)?);
        Ok(())
    }

    fn clear(&mut self) { self.ratios.clear(); }
}

impl AnalyzerTask for InverseParticipationRatio {
    fn analyze(&mut self, eigensystem: &Eigensystem) -> EdResult<()> {
        let indices = self.extractor.band_indices(eigensystem)?;
        let states = eigensystem.eigenstates()?;
        self.ratios.extend(
            indices.iter().map(|&i| inverse_participation(states.column(i))));
        Ok(())
    }

    fn name(&self) -> &str { "ipr" }

    fn as_inline(&self) -> Option<&dyn InlineTask> { Some(self) }
}

impl InlineTask for InverseParticipationRatio {
    fn result_header(&self) -> Vec<String> {
        vec![
            "inverseParticipationRatio".to_string(),
            "inverseParticipationRatioError".to_string(),
        ]
    }

    fn result_fields(&self) -> Vec<String> {
        let (value, error)
            = Quantity::from_samples(&self.ratios).value_error_strings();
        vec![value, error]
    }
}
