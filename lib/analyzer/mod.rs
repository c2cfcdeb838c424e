//! Statistical reduction of eigensystem streams.
//!
//! An [`Analyzer`] owns an ordered collection of [`AnalyzerTask`]s and
//! forwards every eigensystem to each of them in insertion order. Tasks are
//! independently checkpointable through [`Restorable`], which is what lets a
//! campaign spanning many diagonalizations survive process restarts and lets
//! independently-run shards be merged afterwards.

use std::io::{ Read, Write };
use log::info;
use crate::{
    eigensystem::Eigensystem,
    error::{ EdError, EdResult },
    storage::{ self, FileStreamProvider },
};

pub mod band;
pub mod tasks;
pub use band::{ BandExtractor, Margin, Range };

/// Checkpointable accumulation state.
///
/// `join_restored_state` merges a previously stored state into whatever has
/// been accumulated since, never replacing it; the merge must be associative
/// and commutative so that shards checkpointed in any order combine to the
/// same result. State embedding simulation counters shifts restored indices
/// by the count accumulated so far.
pub trait Restorable {
    fn store_state(&self, out: &mut dyn Write) -> EdResult<()>;

    fn join_restored_state(&mut self, input: &mut dyn Read) -> EdResult<()>;

    /// Reset to the freshly-constructed empty state.
    fn clear(&mut self);

    /// Replace the current state with a stored one.
    fn restore_state(&mut self, input: &mut dyn Read) -> EdResult<()> {
        self.clear();
        self.join_restored_state(input)
    }
}

/// One statistical reducer over a stream of eigensystems.
///
/// Inline and bulk output are optional capabilities surfaced through the
/// accessors rather than downcasts; a task advertising neither still
/// accumulates and checkpoints normally.
pub trait AnalyzerTask: Restorable {
    /// Fold one eigensystem into the accumulator. Results must not depend
    /// on the order eigensystems arrive in.
    fn analyze(&mut self, eigensystem: &Eigensystem) -> EdResult<()>;

    /// Short name used in result headers and bulk file names.
    fn name(&self) -> &str;

    fn as_inline(&self) -> Option<&dyn InlineTask> { None }

    fn as_bulk(&self) -> Option<&dyn BulkTask> { None }
}

/// Tabular one-line-per-campaign output capability.
pub trait InlineTask: AnalyzerTask {
    fn result_header(&self) -> Vec<String>;

    fn result_fields(&self) -> Vec<String>;
}

/// Free-form multi-row output capability.
pub trait BulkTask: AnalyzerTask {
    fn store_result(&self, out: &mut dyn Write) -> EdResult<()>;
}

/// The orchestrator: forwards eigensystems, concatenates inline results,
/// writes bulk result files through an injected stream provider, and
/// checkpoints all tasks as one unit.
pub struct Analyzer {
    tasks: Vec<Box<dyn AnalyzerTask>>,
    provider: Box<dyn FileStreamProvider>,
}

impl Analyzer {
    pub fn new(provider: Box<dyn FileStreamProvider>) -> Self {
        Self { tasks: Vec::new(), provider }
    }

    pub fn add_task(&mut self, task: Box<dyn AnalyzerTask>) {
        self.tasks.push(task);
    }

    pub fn num_tasks(&self) -> usize { self.tasks.len() }

    /// Forward to every task in insertion order. The first failure aborts
    /// the batch; a malformed eigensystem should halt the analysis step, not
    /// silently skip a task.
    pub fn analyze(&mut self, eigensystem: &Eigensystem) -> EdResult<()> {
        for task in self.tasks.iter_mut() {
            info!("analyzing with task '{}'", task.name());
            task.analyze(eigensystem)?;
        }
        Ok(())
    }

    /// Header fields of all inline-capable tasks, in insertion order.
    pub fn inline_results_header(&self) -> Vec<String> {
        self.tasks.iter()
            .filter_map(|task| task.as_inline())
            .flat_map(|task| task.result_header())
            .collect()
    }

    /// Value fields of all inline-capable tasks, matching
    /// [`Analyzer::inline_results_header`] position by position.
    pub fn inline_results_fields(&self) -> Vec<String> {
        self.tasks.iter()
            .filter_map(|task| task.as_inline())
            .flat_map(|task| task.result_fields())
            .collect()
    }

    /// Write `<signature>_<name>.txt` through the stream provider for every
    /// bulk-capable task.
    pub fn store_bulk_results(&self, signature: &str) -> EdResult<()> {
        for task in self.tasks.iter() {
            if let Some(bulk) = task.as_bulk() {
                let file_name = format!("{}_{}.txt", signature, task.name());
                let mut out = self.provider.open_output(
                    &file_name, "bulk analyzer results")?;
                bulk.store_result(out.as_mut())?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

impl Restorable for Analyzer {
    fn store_state(&self, out: &mut dyn Write) -> EdResult<()> {
        storage::write_u64(out, self.tasks.len() as u64)?;
        for task in self.tasks.iter() {
            task.store_state(out)?;
        }
        Ok(())
    }

    fn join_restored_state(&mut self, input: &mut dyn Read) -> EdResult<()> {
        let count = storage::read_u64(input)? as usize;
        if count != self.tasks.len() {
            return Err(EdError::CheckpointMismatch(format!(
                "stored state holds {} tasks, analyzer has {}",
                count, self.tasks.len(),
            )));
        }
        for task in self.tasks.iter_mut() {
            task.join_restored_state(input)?;
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.tasks.iter_mut().for_each(|task| task.clear());
    }
}


#[cfg(test)]
pub(crate) use test_support::MemStreamProvider;
