//! Band-averaged inverse participation ratio.

use std::io::{ Read, Write };
use crate::{
    analyzer::{ AnalyzerTask, BandExtractor, InlineTask, Restorable },
    eigensystem::Eigensystem,
    error::EdResult,
    quantity::Quantity,
    storage,
};
use super::inverse_participation;

/// Accumulates one sample per eigensystem: the mean of `1 / Σ c⁴` over the
/// extracted band's eigenstates.
pub struct MeanInverseParticipationRatio {
    extractor: BandExtractor,
    ratios: Vec<f64>,
}

impl MeanInverseParticipationRatio {
    pub fn new(extractor: BandExtractor) -> Self {
        Self { extractor, ratios: Vec::new() }
    }
}

impl Restorable for MeanInverseParticipationRatio {
    fn store_state(&self, out: &mut dyn Write) -> EdResult<()> {
        storage::write_samples(out, &self.ratios)
    }

    fn join_restored_state(&mut self, input: &mut dyn Read) -> EdResult<()> {
        self.ratios.extend(storage::read_samples(input)?);
        Ok(())
    }

    fn clear(&mut self) { self.ratios.clear(); }
}

impl AnalyzerTask for MeanInverseParticipationRatio {
    fn analyze(&mut self, eigensystem: &Eigensystem) -> EdResult<()> {
        let indices = self.extractor.band_indices(eigensystem)?;
        let states = eigensystem.eigenstates()?;
        let mean: f64 = indices.iter()
            .map(|&i| inverse_participation(states.column(i)))
            .sum::<f64>()
            / indices.len() as f64;
        self.ratios.push(mean);
        Ok(())
    }

    fn name(&self) -> &str { "mipr" }

    fn as_inline(&self) -> Option<&dyn InlineTask> { Some(self) }
}

impl InlineTask for MeanInverseParticipationRatio {
    fn result_header(&self) -> Vec<String> {
        vec![
            "meanInverseParticipationRatio".to_string(),
            "meanInverseParticipationRatioError".to_string(),
        ]
    }

    fn result_fields(&self) -> Vec<String> {
        let (value, error)
            = Quantity::from_samples(&self.ratios).value_error_strings();
        vec![value, error]
    }
}

#[cfg(test)]
mod tests {
    use ndarray as nd;
    use crate::analyzer::Margin;
    use crate::error::EdError;
    use super::*;

    // band [0.05, 0.95) over normalized energies {0, 1/3, 2/3, 1} selects
    // indices 1 and 2
    fn extractor() -> BandExtractor {
        BandExtractor::epsilon(0.5, Margin::Width(0.9))
    }

    fn delocalized_fixture() -> Eigensystem {
        // column 1 spreads over 4 basis states (IPR 4), column 2 is fully
        // localized (IPR 1)
        Eigensystem::with_eigenvectors(
            nd::array![0.0, 1.0, 2.0, 3.0],
            nd::array![
                [0.0, 1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 1.0],
            ],
            None,
        )
    }

    fn pair_fixture() -> Eigensystem {
        // both in-band columns spread over 2 basis states (IPR 2)
        Eigensystem::with_eigenvectors(
            nd::array![0.0, 1.0, 2.0, 3.0],
            nd::array![
                [1.0, 1.0, 0.0, 0.0],
                [0.0, 1.0, 1.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            None,
        )
    }

    #[test]
    fn header_names_fields() {
        let task = MeanInverseParticipationRatio::new(extractor());
        assert_eq!(
            task.result_header(),
            vec![
                "meanInverseParticipationRatio",
                "meanInverseParticipationRatioError",
            ],
        );
    }

    #[test]
    fn single_eigensystem_band_mean() {
        let mut task = MeanInverseParticipationRatio::new(extractor());
        task.analyze(&delocalized_fixture()).unwrap();
        // (4 + 1) / 2
        assert_eq!(task.result_fields(), vec!["2.50000", "0"]);
    }

    #[test]
    fn mean_over_eigensystems() {
        let mut task = MeanInverseParticipationRatio::new(extractor());
        task.analyze(&delocalized_fixture()).unwrap();
        task.analyze(&pair_fixture()).unwrap();
        // samples 2.5 and 2.0
        assert_eq!(task.result_fields(), vec!["2.2500", "0.2500"]);
    }

    #[test]
    fn missing_eigenvectors_is_err() {
        let mut task = MeanInverseParticipationRatio::new(extractor());
        let energy_only = Eigensystem::new(
            nd::array![0.0, 1.0, 2.0, 3.0], None);
        assert!(matches!(
            task.analyze(&energy_only),
            Err(EdError::MissingEigenvectors),
        ));
    }
}
