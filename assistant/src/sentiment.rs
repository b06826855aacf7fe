//! Sentiment tagging and response personalization.

use serde::{Deserialize, Serialize};

use helpdesk_embeddings::fnv1a;

/// Tagged sentiment label.
///
/// Consumers branch on this enum; raw provider label strings never travel
/// through the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Confidence a label needs before it affects phrasing.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Classifies the sentiment of a customer query.
pub trait SentimentAnalyzer: Send + Sync {
    /// Label plus confidence in [0, 1].
    fn analyze(&self, text: &str) -> (Sentiment, f32);
}

/// Gate a raw (label, score) pair: labels only stick above the confidence
/// threshold, everything else reads as neutral.
pub fn gate(label: Sentiment, score: f32, threshold: f32) -> Sentiment {
    if score > threshold {
        label
    } else {
        Sentiment::Neutral
    }
}

const POSITIVE_WORDS: [&str; 10] = [
    "great",
    "thanks",
    "thank",
    "love",
    "awesome",
    "excellent",
    "happy",
    "good",
    "perfect",
    "appreciate",
];

const NEGATIVE_WORDS: [&str; 10] = [
    "bad",
    "terrible",
    "awful",
    "broken",
    "angry",
    "frustrated",
    "hate",
    "disappointed",
    "worst",
    "unacceptable",
];

/// Keyword-lexicon analyzer for offline use.
///
/// A transformer-backed classifier can slot in behind the same trait; this
/// one just counts charged words and reports their majority.
#[derive(Debug, Clone, Default)]
pub struct LexiconAnalyzer;

impl SentimentAnalyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> (Sentiment, f32) {
        let mut positive = 0usize;
        let mut negative = 0usize;
        let tokens = text
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty());
        for token in tokens {
            let token = token.to_ascii_lowercase();
            if POSITIVE_WORDS.contains(&token.as_str()) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(&token.as_str()) {
                negative += 1;
            }
        }

        let total = positive + negative;
        if total == 0 {
            return (Sentiment::Neutral, 0.0);
        }
        let label = if positive > negative {
            Sentiment::Positive
        } else if negative > positive {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };
        let score = positive.max(negative) as f32 / total as f32;
        (label, score)
    }
}

const POSITIVE_TEMPLATES: [&str; 3] = [
    "I'm glad to hear your positive feedback! {response}",
    "That's great! {response}",
    "Thank you for your support! {response}",
];

const NEGATIVE_TEMPLATES: [&str; 3] = [
    "I'm sorry to hear you're having issues. {response} Let's work together to resolve this.",
    "I understand your frustration. {response} We'll do our best to help you.",
    "I apologize for the inconvenience. {response} Please let me know if there's anything else I can assist you with.",
];

/// Wrap an answer in sentiment-appropriate phrasing.
///
/// Neutral answers pass through untouched. The template is keyed off the
/// query text, so a given interaction always phrases the same way.
pub fn personalize(response: &str, sentiment: Sentiment, query: &str) -> String {
    let templates: &[&str] = match sentiment {
        Sentiment::Positive => &POSITIVE_TEMPLATES,
        Sentiment::Negative => &NEGATIVE_TEMPLATES,
        Sentiment::Neutral => return response.to_string(),
    };
    let pick = (fnv1a(query.as_bytes()) % templates.len() as u64) as usize;
    templates[pick].replace("{response}", response)
}
