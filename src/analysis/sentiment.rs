use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::{Comment, SentimentAnalysis};

/// Overall batch sentiment, derived from star ratings only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn analyze_sentiment(comments: &[Comment]) -> SentimentAnalysis {
    let total = comments.len();
    let positive = comments.iter().filter(|c| c.rating >= 4).count();
    let negative = comments.iter().filter(|c| c.rating <= 2).count();

    let overall_sentiment = if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    SentimentAnalysis {
        positive_count: positive,
        negative_count: negative,
        neutral_count: total - positive - negative,
        overall_sentiment,
        positive_percentage: percentage(positive, total),
        negative_percentage: percentage(negative, total),
    }
}

pub fn average_rating(comments: &[Comment]) -> f64 {
    if comments.is_empty() {
        return 0.0;
    }
    let sum: i64 = comments.iter().map(|c| i64::from(c.rating)).sum();
    sum as f64 / comments.len() as f64
}

/// One decimal, ties to even.
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round_ties_even() / 10.0
}
