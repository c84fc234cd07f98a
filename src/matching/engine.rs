use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::read::{Read, ReadInput, ReadPair};
use crate::index::ReferenceIndex;
use crate::matching::pairing::combine;
use crate::matching::result::{AlignmentResult, PairAlignment, ReadAlignment, SampleResult};
use crate::matching::seed::align_read;
use crate::matching::AlignError;

/// Default number of inputs handed to a worker at a time
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Failed to build thread pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Align(#[from] AlignError),
}

/// Worker pool settings for [`Aligner::align_sample_parallel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Worker threads; 0 means one per available core
    pub threads: usize,
    /// Inputs per work unit
    pub chunk_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl PoolConfig {
    /// Thread count actually used, bounded by the available cores
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        let cores = num_cpus::get();
        if self.threads == 0 {
            cores
        } else {
            self.threads.min(cores)
        }
    }
}

/// Aligns reads against a shared, read-only reference index
#[derive(Debug, Clone, Copy)]
pub struct Aligner<'a> {
    index: &'a ReferenceIndex,
}

impl<'a> Aligner<'a> {
    #[must_use]
    pub fn new(index: &'a ReferenceIndex) -> Self {
        Self { index }
    }

    #[must_use]
    pub fn index(&self) -> &'a ReferenceIndex {
        self.index
    }

    /// Align one single-end read.
    ///
    /// # Errors
    ///
    /// See [`align_read`].
    pub fn align_read(&self, read: &Read) -> Result<ReadAlignment, AlignError> {
        align_read(self.index, read)
    }

    /// Align both mates independently and combine them.
    ///
    /// # Errors
    ///
    /// Fails if either mate fails; mate 1 is checked first.
    pub fn align_pair(&self, pair: &ReadPair) -> Result<PairAlignment, AlignError> {
        let first = align_read(self.index, &pair.first)?;
        let second = align_read(self.index, &pair.second)?;
        Ok(combine(first, second))
    }

    /// Align a single input of either shape.
    ///
    /// # Errors
    ///
    /// See [`Aligner::align_read`] and [`Aligner::align_pair`].
    pub fn align_input(&self, input: &ReadInput) -> Result<AlignmentResult, AlignError> {
        match input {
            ReadInput::Single(read) => self.align_read(read).map(AlignmentResult::Single),
            ReadInput::Paired(pair) => self.align_pair(pair).map(AlignmentResult::Paired),
        }
    }

    /// Align every input of a sample in order on the calling thread.
    ///
    /// A read of the wrong length is recorded in its slot and the batch goes
    /// on.
    ///
    /// # Errors
    ///
    /// Returns `AlignError::InternalIndex` as soon as any input hits it.
    pub fn align_sample(&self, inputs: &[ReadInput]) -> Result<Vec<SampleResult>, AlignError> {
        let results = self.align_chunk(0, inputs)?;
        log_sample(&results);
        Ok(results)
    }

    /// Align a sample on a dedicated worker pool.
    ///
    /// Inputs are split into disjoint chunks of `config.chunk_size`; each
    /// worker aligns its chunk independently against the shared index. The
    /// returned list is in input order and equal to what
    /// [`Aligner::align_sample`] returns.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` if the pool cannot be created, or
    /// `PoolError::Align` on an internal index error.
    pub fn align_sample_parallel(
        &self,
        inputs: &[ReadInput],
        config: &PoolConfig,
    ) -> Result<Vec<SampleResult>, PoolError> {
        let threads = config.effective_threads();
        let chunk_size = config.chunk_size.max(1);
        debug!(threads, chunk_size, inputs = inputs.len(), "starting worker pool");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;

        let chunks: Vec<Vec<SampleResult>> = pool.install(|| {
            inputs
                .par_chunks(chunk_size)
                .enumerate()
                .map(|(chunk_idx, chunk)| self.align_chunk(chunk_idx * chunk_size, chunk))
                .collect::<Result<_, AlignError>>()
        })?;

        let results: Vec<SampleResult> = chunks.into_iter().flatten().collect();
        log_sample(&results);
        Ok(results)
    }

    fn align_chunk(
        &self,
        first_index: usize,
        inputs: &[ReadInput],
    ) -> Result<Vec<SampleResult>, AlignError> {
        let mut results = Vec::with_capacity(inputs.len());
        for (offset, input) in inputs.iter().enumerate() {
            let outcome = match self.align_input(input) {
                Err(err) if err.is_fatal() => return Err(err),
                other => other,
            };
            if let Err(err) = &outcome {
                warn!("{err}");
            }
            results.push(SampleResult {
                index: first_index + offset,
                outcome,
            });
        }
        Ok(results)
    }
}

fn log_sample(results: &[SampleResult]) {
    let mapped = results
        .iter()
        .filter(|r| r.outcome.as_ref().is_ok_and(AlignmentResult::is_mapped))
        .count();
    info!(inputs = results.len(), mapped, "aligned sample");
}
