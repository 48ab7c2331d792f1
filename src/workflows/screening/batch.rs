//! Batch orchestration: a single-writer roster owning the candidate set
//! for the lifetime of one batch, and the screener that drives every
//! admitted candidate through the evaluator one at a time.
//!
//! Candidates are processed strictly in admission order, never
//! concurrently with each other. This bounds load on the external oracle
//! to at most one candidate's worth of in-flight questions regardless of
//! batch size. Readers only ever observe snapshots published between
//! steps; no lock is held across an oracle await.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Candidate, DocumentSource, ScreeningStatus};
use super::evaluator::CandidateEvaluator;
use super::question::Question;
use super::score;
use crate::oracle::JudgmentOracle;

/// Batch lifecycle misuse surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("a screening batch is already running")]
    AlreadyRunning,
    #[error("batch already screened; admit a new document set to run again")]
    AlreadyScreened,
}

/// Progress snapshot published after every candidate settles.
#[derive(Debug, Clone, Serialize)]
pub struct BatchProgress {
    pub processed: usize,
    pub total: usize,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Local>>,
}

#[derive(Default)]
struct RosterState {
    candidates: Vec<Candidate>,
    running: bool,
    processed: usize,
    started_at: Option<DateTime<Local>>,
    finished_at: Option<DateTime<Local>>,
}

/// Exclusive owner of the mutable candidate set for one batch. The batch
/// runner is the only writer; everyone else reads cloned snapshots.
#[derive(Clone, Default)]
pub struct CandidateRoster {
    inner: Arc<Mutex<RosterState>>,
}

impl CandidateRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole candidate set with freshly admitted documents.
    /// Every candidate starts over at `Pending`; prior results are gone.
    pub fn admit(&self, documents: Vec<DocumentSource>) -> Result<usize, BatchError> {
        let mut state = self.lock();
        if state.running {
            return Err(BatchError::AlreadyRunning);
        }

        state.candidates = documents.into_iter().map(Candidate::admitted).collect();
        state.processed = 0;
        state.started_at = None;
        state.finished_at = None;

        Ok(state.candidates.len())
    }

    pub fn snapshot(&self) -> Vec<Candidate> {
        self.lock().candidates.clone()
    }

    pub fn progress(&self) -> BatchProgress {
        let state = self.lock();
        BatchProgress {
            processed: state.processed,
            total: state.candidates.len(),
            running: state.running,
            started_at: state.started_at,
            finished_at: state.finished_at,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().candidates.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RosterState> {
        self.inner.lock().expect("roster mutex poisoned")
    }
}

/// Sequencing engine: one candidate at a time, every question per
/// candidate fanned out by the evaluator.
pub struct BatchScreener<O> {
    oracle: O,
}

impl<O: JudgmentOracle> BatchScreener<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    /// Run the batch to completion, mutating the roster in place and
    /// reporting `(processed, total)` after each candidate settles.
    ///
    /// A batch with no candidates or no questions is a no-op and reports
    /// no progress. Every candidate ends in a terminal state even when
    /// every oracle call fails; only caller misuse is an error here.
    pub async fn run<F>(
        &self,
        roster: &CandidateRoster,
        questions: &[Question],
        guidance: &str,
        mut on_progress: F,
    ) -> Result<(), BatchError>
    where
        F: FnMut(usize, usize) + Send,
    {
        let work: Vec<String> = {
            let mut state = roster.lock();
            if state.running {
                return Err(BatchError::AlreadyRunning);
            }
            if state
                .candidates
                .iter()
                .any(|candidate| candidate.status != ScreeningStatus::Pending)
            {
                return Err(BatchError::AlreadyScreened);
            }
            if state.candidates.is_empty() || questions.is_empty() {
                return Ok(());
            }

            state.running = true;
            state.processed = 0;
            state.started_at = Some(Local::now());
            state.finished_at = None;

            state
                .candidates
                .iter()
                .map(|candidate| candidate.text.clone())
                .collect()
        };

        let total = work.len();
        info!(total, questions = questions.len(), "starting screening batch");

        let evaluator = CandidateEvaluator::new(&self.oracle);

        for (index, text) in work.into_iter().enumerate() {
            {
                let mut state = roster.lock();
                state.candidates[index].status = ScreeningStatus::Processing;
            }

            match evaluator.evaluate(&text, questions, guidance).await {
                Ok(judgments) => {
                    let outcome = score::aggregate(questions, &judgments);
                    let mut state = roster.lock();
                    let candidate = &mut state.candidates[index];
                    candidate.judgments = judgments;
                    candidate.outcome = Some(outcome);
                    candidate.status = ScreeningStatus::Completed;
                    candidate.error = None;
                }
                Err(err) => {
                    let mut state = roster.lock();
                    let candidate = &mut state.candidates[index];
                    warn!(candidate = %candidate.id, %err, "candidate evaluation failed");
                    candidate.status = ScreeningStatus::Error;
                    candidate.error = Some(err.to_string());
                }
            }

            {
                let mut state = roster.lock();
                state.processed = index + 1;
            }
            on_progress(index + 1, total);
        }

        {
            let mut state = roster.lock();
            state.running = false;
            state.finished_at = Some(Local::now());
        }
        info!(total, "screening batch finished");

        Ok(())
    }
}
