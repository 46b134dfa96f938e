use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::sentiment::Sentiment;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub author: String,
    pub text: String,
    /// Nominally 1-5 stars, not enforced.
    pub rating: i32,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Accepts RFC 3339 timestamps and offset-less ones, which are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSummary {
    pub overall_summary: String,
    pub positive_points: Vec<String>,
    pub negative_points: Vec<String>,
    pub common_themes: Vec<String>,
    pub sentiment: SentimentAnalysis,
    pub total_comments: usize,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentAnalysis {
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub overall_sentiment: Sentiment,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCommentAnalysis {
    pub comment_id: i32,
    /// Label as supplied by the model, e.g. "positive".
    pub sentiment: String,
    pub key_phrases: Vec<String>,
    pub topics: Vec<String>,
}
