pub mod analyzer;
pub mod extract;
pub mod prompt;
pub mod sentiment;
pub mod types;

pub use analyzer::CommentAnalyzer;
pub use sentiment::Sentiment;
pub use types::{
    AnalysisRequest, Comment, CommentSummary, DetailedCommentAnalysis, SentimentAnalysis,
};
