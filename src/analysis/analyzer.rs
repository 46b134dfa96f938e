use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::llm::{self, ChatClient};
use super::extract::{extract_bullet_points, extract_section, parse_detail_reply};
use super::prompt::{
    build_batch_prompt, build_detail_prompt, build_summary_prompt, NEGATIVE_POINTS,
    POSITIVE_POINTS, REPEATING_TOPICS, SENTIMENT_ANALYSIS,
};
use super::sentiment::{analyze_sentiment, average_rating};
use super::types::{Comment, CommentSummary, DetailedCommentAnalysis};

pub const NO_COMMENTS_TO_ANALYZE: &str = "There Are No Comments To Analyze.";
pub const NO_COMMENTS_TO_SUMMARIZE: &str = "There Are No Comments To Summarize.";

/// Runs comment batches through the chat model and shapes the replies.
pub struct CommentAnalyzer {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl CommentAnalyzer {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn ping(&self) -> Result<()> {
        self.client.ping().await
    }

    /// One model call for the whole batch, then section and bullet extraction.
    /// Sentiment comes from the ratings, never from the model.
    pub async fn analyze_comments(&self, comments: &[Comment]) -> Result<CommentSummary> {
        if comments.is_empty() {
            return Ok(CommentSummary {
                overall_summary: NO_COMMENTS_TO_ANALYZE.to_string(),
                ..CommentSummary::default()
            });
        }

        info!("Starting analysis of {} comments", comments.len());

        let analysis_text = self
            .ask(build_batch_prompt(comments))
            .await
            .inspect_err(|e| error!("Comment analysis failed: {:#}", e))?;

        info!("Analysis completed");

        Ok(assemble_summary(analysis_text, comments))
    }

    pub async fn generate_simple_summary(&self, comments: &[Comment]) -> Result<String> {
        if comments.is_empty() {
            return Ok(NO_COMMENTS_TO_SUMMARIZE.to_string());
        }

        self.ask(build_summary_prompt(comments))
            .await
            .inspect_err(|e| error!("Simple summary failed: {:#}", e))
    }

    /// One model call per comment, in order. A comment whose call or reply
    /// fails is logged and left out of the result.
    pub async fn analyze_detailed(&self, comments: &[Comment]) -> Vec<DetailedCommentAnalysis> {
        let mut results = Vec::with_capacity(comments.len());

        for comment in comments {
            match self.analyze_one(comment).await {
                Ok(analysis) => results.push(analysis),
                Err(e) => warn!("Skipping comment {}: {:#}", comment.id, e),
            }
        }

        info!(
            "Detailed analysis finished: {}/{} comments parsed",
            results.len(),
            comments.len()
        );
        results
    }

    async fn analyze_one(&self, comment: &Comment) -> Result<DetailedCommentAnalysis> {
        let reply = self.ask(build_detail_prompt(comment)).await?;
        parse_detail_reply(comment.id, &reply)
    }

    async fn ask(&self, prompt: String) -> Result<String> {
        llm::collect_reply(self.client.as_ref(), &self.model, prompt)
            .await
            .with_context(|| format!("Chat with model {} failed", self.model))
    }
}

fn assemble_summary(analysis_text: String, comments: &[Comment]) -> CommentSummary {
    let positive = extract_section(&analysis_text, POSITIVE_POINTS, NEGATIVE_POINTS);
    let negative = extract_section(&analysis_text, NEGATIVE_POINTS, REPEATING_TOPICS);
    let themes = extract_section(&analysis_text, REPEATING_TOPICS, SENTIMENT_ANALYSIS);

    CommentSummary {
        positive_points: extract_bullet_points(positive),
        negative_points: extract_bullet_points(negative),
        common_themes: extract_bullet_points(themes),
        sentiment: analyze_sentiment(comments),
        total_comments: comments.len(),
        average_rating: average_rating(comments),
        overall_summary: analysis_text,
    }
}
