//! Batch orchestration over many contract records
//!
//! Records are split into fixed-size chunks; chunks run in parallel on the
//! rayon pool while records inside a chunk run sequentially. Computation is
//! pure per record, so the only coordination is the processed-count used for
//! progress reporting and the merge of per-chunk outputs at the end, which
//! preserves input order. A failed record becomes an error entry in the
//! output and never stops its neighbors.

use crate::contract::ContractRecord;
use crate::engine::{ScheduleEngine, ScheduleResult};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Batch layer configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Records per chunk; progress fires once per completed chunk
    pub chunk_size: usize,
    /// Run chunks on the rayon pool; `false` processes them in order on the
    /// calling thread (useful for deterministic progress in tests)
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 25,
            parallel: true,
        }
    }
}

/// Progress snapshot delivered after each completed chunk
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BatchProgress {
    /// Records processed so far, across all completed chunks
    pub processed: usize,
    /// Total records in the batch
    pub total: usize,
    /// Index of the chunk that just completed
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// Outcome for a single record: a schedule or an error, never both
#[derive(Debug, Clone, Serialize)]
pub struct RecordResult {
    /// Identity of the input record
    pub record_id: String,
    /// Present when the record computed cleanly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleResult>,
    /// Present when the record failed validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run-level counts and totals
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Sum of `total_amount_with_tax` across succeeded records
    pub total_amount_with_tax: f64,
}

/// Everything a batch run produces
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    /// One entry per processed record, in input order
    pub results: Vec<RecordResult>,
    pub summary: BatchSummary,
}

/// Applies the schedule engine across a record list
#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    engine: ScheduleEngine,
    config: BatchConfig,
}

impl BatchProcessor {
    pub fn new(engine: ScheduleEngine, config: BatchConfig) -> Self {
        Self { engine, config }
    }

    /// Process every record, no progress reporting or cancellation
    pub fn process_all(&self, records: &[ContractRecord]) -> BatchOutput {
        self.process_with_progress(records, None, |_| {})
    }

    /// Process every record with per-chunk progress callbacks
    ///
    /// Cancellation is cooperative: once `cancel` is set, no new chunk
    /// starts, but chunks already running finish and their results are
    /// kept (there are no side effects to roll back).
    pub fn process_with_progress<F>(
        &self,
        records: &[ContractRecord],
        cancel: Option<&AtomicBool>,
        progress: F,
    ) -> BatchOutput
    where
        F: Fn(BatchProgress) + Sync,
    {
        let total = records.len();
        let chunk_size = self.config.chunk_size.max(1);
        let total_chunks = total.div_ceil(chunk_size);
        let processed = AtomicUsize::new(0);

        let cancelled = || cancel.is_some_and(|c| c.load(Ordering::Relaxed));

        let run_chunk = |(chunk_index, chunk): (usize, &[ContractRecord])| {
            if cancelled() {
                log::debug!("chunk {}/{} skipped: batch cancelled", chunk_index + 1, total_chunks);
                return Vec::new();
            }
            let results = self.process_chunk(chunk);
            let done = processed.fetch_add(results.len(), Ordering::SeqCst) + results.len();
            log::info!(
                "chunk {}/{} complete ({}/{} records)",
                chunk_index + 1,
                total_chunks,
                done,
                total
            );
            progress(BatchProgress {
                processed: done,
                total,
                chunk_index,
                total_chunks,
            });
            results
        };

        // Chunk completion order is irrelevant: collect() keeps the chunk
        // slots in input order either way.
        let per_chunk: Vec<Vec<RecordResult>> = if self.config.parallel {
            records.par_chunks(chunk_size).enumerate().map(run_chunk).collect()
        } else {
            records.chunks(chunk_size).enumerate().map(run_chunk).collect()
        };

        let results: Vec<RecordResult> = per_chunk.into_iter().flatten().collect();
        let summary = summarize(&results);
        BatchOutput { results, summary }
    }

    fn process_chunk(&self, chunk: &[ContractRecord]) -> Vec<RecordResult> {
        chunk
            .iter()
            .map(|record| match self.engine.compute(record) {
                Ok(schedule) => RecordResult {
                    record_id: record.id.clone(),
                    schedule: Some(schedule),
                    error: None,
                },
                Err(err) => {
                    log::warn!("record `{}` failed: {}", record.id, err);
                    RecordResult {
                        record_id: record.id.clone(),
                        schedule: None,
                        error: Some(err.to_string()),
                    }
                }
            })
            .collect()
    }
}

fn summarize(results: &[RecordResult]) -> BatchSummary {
    let mut summary = BatchSummary {
        processed: results.len(),
        ..Default::default()
    };
    for result in results {
        match &result.schedule {
            Some(schedule) => {
                summary.succeeded += 1;
                summary.total_amount_with_tax += schedule.summary.total_amount_with_tax;
            }
            None => summary.failed += 1,
        }
    }
    summary
}
