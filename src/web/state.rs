use std::sync::Arc;

use crate::analysis::CommentAnalyzer;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<CommentAnalyzer>,
}

impl AppState {
    pub fn new(analyzer: CommentAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}
