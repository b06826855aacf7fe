//! Buffering of low-confidence answers for later curation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A (query, answer) pair the certainty evaluator flagged as low-confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncertainCase {
    /// The user's original query.
    pub query: String,

    /// The answer that was produced for it.
    pub answer: String,

    /// When the case was queued.
    pub recorded_at: DateTime<Utc>,
}

/// What [`UncertaintyQueue::drain`] does to the buffer.
///
/// `Clear` hands each case out exactly once; `Snapshot` leaves the buffer
/// intact so later passes see the same cases again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainPolicy {
    /// Remove the cases from the buffer as they are handed out.
    Clear,
    /// Hand out a copy and keep the buffer as is.
    Snapshot,
}

/// Decides whether an answer was confident enough to skip curation.
pub trait CertaintyEvaluator: Send + Sync {
    /// True when the answer needs no follow-up curation.
    fn is_certain(&self, query: &str, answer: &str) -> bool;
}

/// Length-threshold stand-in for a calibrated confidence model: short
/// answers are assumed uncertain. Swap in a real evaluator where one is
/// available.
#[derive(Debug, Clone)]
pub struct AnswerLengthEvaluator {
    min_len: usize,
}

impl AnswerLengthEvaluator {
    /// Answers of at most `min_len` characters count as uncertain.
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }
}

impl Default for AnswerLengthEvaluator {
    fn default() -> Self {
        Self::new(50)
    }
}

impl CertaintyEvaluator for AnswerLengthEvaluator {
    fn is_certain(&self, _query: &str, answer: &str) -> bool {
        answer.len() > self.min_len
    }
}

/// Append-only buffer of uncertain cases awaiting a curation pass.
#[derive(Debug)]
pub struct UncertaintyQueue {
    cases: Vec<UncertainCase>,
    policy: DrainPolicy,
}

impl UncertaintyQueue {
    /// Create an empty queue with the given drain policy.
    pub fn new(policy: DrainPolicy) -> Self {
        Self {
            cases: Vec::new(),
            policy,
        }
    }

    /// Queue the pair when it was flagged uncertain; a no-op otherwise.
    pub fn record(&mut self, query: &str, answer: &str, is_uncertain: bool) {
        if !is_uncertain {
            return;
        }
        debug!("queueing uncertain case for query: {query}");
        self.cases.push(UncertainCase {
            query: query.to_string(),
            answer: answer.to_string(),
            recorded_at: Utc::now(),
        });
    }

    /// Evaluate and record in one step.
    pub fn observe(&mut self, query: &str, answer: &str, evaluator: &dyn CertaintyEvaluator) {
        self.record(query, answer, !evaluator.is_certain(query, answer));
    }

    /// Number of buffered cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// The buffered cases, oldest first.
    pub fn cases(&self) -> &[UncertainCase] {
        &self.cases
    }

    /// Hand the buffered cases to a curation pass, per the drain policy.
    pub fn drain(&mut self) -> Vec<UncertainCase> {
        match self.policy {
            DrainPolicy::Clear => std::mem::take(&mut self.cases),
            DrainPolicy::Snapshot => self.cases.clone(),
        }
    }
}

impl Default for UncertaintyQueue {
    fn default() -> Self {
        Self::new(DrainPolicy::Clear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_skips_certain_answers() {
        let mut queue = UncertaintyQueue::default();

        queue.record("q1", "short answer", true);
        queue.record("q2", "confident answer", false);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.cases()[0].query, "q1");
    }

    #[test]
    fn test_observe_applies_length_heuristic() {
        let mut queue = UncertaintyQueue::default();
        let evaluator = AnswerLengthEvaluator::default();

        queue.observe("q1", "too short", &evaluator);
        queue.observe(
            "q2",
            "a long and thorough answer that easily clears the fifty character bar",
            &evaluator,
        );

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.cases()[0].query, "q1");
    }

    #[test]
    fn test_drain_clear_empties_the_buffer() {
        let mut queue = UncertaintyQueue::new(DrainPolicy::Clear);
        queue.record("q1", "a", true);
        queue.record("q2", "b", true);

        let drained = queue.drain();

        assert_eq!(drained.len(), 2);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_drain_snapshot_keeps_the_buffer() {
        let mut queue = UncertaintyQueue::new(DrainPolicy::Snapshot);
        queue.record("q1", "a", true);

        let first = queue.drain();
        let second = queue.drain();

        assert_eq!(first, second);
        assert_eq!(queue.len(), 1);
    }
}
