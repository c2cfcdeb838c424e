//! Rényi participation entropies of in-band eigenstates.

use std::io::{ Read, Write };
use ndarray as nd;
use crate::{
    analyzer::{ AnalyzerTask, BandExtractor, InlineTask, Restorable },
    eigensystem::Eigensystem,
    error::EdResult,
    quantity::Quantity,
    storage,
};

/// Band-averaged participation entropy of order `q`,
/// `S_q = ln(Σ_j |c_j|^(2q)) / (1 - q)`, with the Shannon limit
/// `S_1 = -Σ_j c_j² ln c_j²` taken at `q = 1`. One sample per eigensystem.
pub struct ParticipationEntropy {
    extractor: BandExtractor,
    q: f64,
    entropies: Vec<f64>,
}

impl ParticipationEntropy {
    /// *Panics* if `q` is not positive.
    pub fn new(extractor: BandExtractor, q: f64) -> Self {
        if q <= 0.0 {
            panic!("ParticipationEntropy::new: order must be positive");
        }
        Self { extractor, q, entropies: Vec::new() }
    }

    fn entropy(&self, coefficients: nd::ArrayView1<'_, f64>) -> f64 {
        if (self.q - 1.0).abs() < 1e-12 {
            -coefficients.iter()
                .map(|c| c * c)
                .filter(|&p| p > 0.0)
                .map(|p| p * p.ln())
                .sum::<f64>()
        } else {
            coefficients.iter()
                .map(|c| (c * c).powf(self.q))
                .sum::<f64>()
                .ln()
                / (1.0 - self.q)
        }
    }
}

impl Restorable for ParticipationEntropy {
    fn store_state(&self, out: &mut dyn Write) -> EdResult<()> {
        storage::write_samples(out, &self.entropies)
    }

    fn join_restored_state(&mut self, input: &mut dyn Read) -> EdResult<()> {
        self.entropies.extend(storage::read_samples(input)?);
        Ok(())
    }

    fn clear(&mut self) { self.entropies.clear(); }
}

impl AnalyzerTask for ParticipationEntropy {
    fn analyze(&mut self, eigensystem: &Eigensystem) -> EdResult<()> {
        let indices = self.extractor.band_indices(eigensystem)?;
        let states = eigensystem.eigenstates()?;
        let mean: f64 = indices.iter()
            .map(|&i| self.entropy(states.column(i)))
            .sum::<f64>()
            / indices.len() as f64;
        self.entropies.push(mean);
        Ok(())
    }

    fn name(&self) -> &str { "pe" }

    fn as_inline(&self) -> Option<&dyn InlineTask> { Some(self) }
}

impl InlineTask for ParticipationEntropy {
    fn result_header(&self) -> Vec<String> {
        vec![
            "participationEntropy".to_string(),
            "participationEntropyError".to_string(),
        ]
    }

    fn result_fields(&self) -> Vec<String> {
        let (value, error)
            = Quantity::from_samples(&self.entropies).value_error_strings();
        vec![value, error]
    }
}
