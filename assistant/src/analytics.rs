//! In-memory analytics over answered queries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sentiment::Sentiment;

/// One answered query.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionRecord {
    /// The customer's query.
    pub query: String,

    /// Wall-clock time to answer, in milliseconds.
    pub response_ms: u64,

    /// Gated sentiment of the query.
    pub sentiment: Sentiment,

    /// When the interaction happened.
    pub recorded_at: DateTime<Utc>,
}

/// Append-only log of answered queries.
#[derive(Debug, Default)]
pub struct InteractionLog {
    records: Vec<InteractionRecord>,
}

impl InteractionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one answered query.
    pub fn record(&mut self, query: &str, response_ms: u64, sentiment: Sentiment) {
        self.records.push(InteractionRecord {
            query: query.to_string(),
            response_ms,
            sentiment,
            recorded_at: Utc::now(),
        });
    }

    /// Number of recorded interactions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The recorded interactions, oldest first.
    pub fn records(&self) -> &[InteractionRecord] {
        &self.records
    }

    /// Aggregates over everything logged so far.
    pub fn summary(&self) -> InteractionSummary {
        let total = self.records.len();
        let mean_response_ms = if total == 0 {
            0.0
        } else {
            self.records.iter().map(|r| r.response_ms as f64).sum::<f64>() / total as f64
        };
        let mut positive = 0;
        let mut negative = 0;
        let mut neutral = 0;
        for record in &self.records {
            match record.sentiment {
                Sentiment::Positive => positive += 1,
                Sentiment::Negative => negative += 1,
                Sentiment::Neutral => neutral += 1,
            }
        }
        InteractionSummary {
            total,
            mean_response_ms,
            positive,
            negative,
            neutral,
        }
    }
}

/// Aggregate view of the interaction log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionSummary {
    /// Total number of interactions.
    pub total: usize,

    /// Mean response time in milliseconds.
    pub mean_response_ms: f64,

    /// Interactions with positive query sentiment.
    pub positive: usize,

    /// Interactions with negative query sentiment.
    pub negative: usize,

    /// Interactions with neutral query sentiment.
    pub neutral: usize,
}
