//! Chat backend abstraction and reply aggregation.

pub mod ollama;

use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_stream::{Stream, StreamExt};

pub use ollama::OllamaClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// One incremental piece of a streamed reply. `content` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatChunk {
    pub content: Option<String>,
    pub done: bool,
}

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatChunk>> + Send>>;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Starts a chat completion and returns its reply as an ordered chunk stream.
    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<ChunkStream>;

    /// Checks that the backend answers at all.
    async fn ping(&self) -> Result<()>;
}

/// Sends `prompt` as a single user message and joins the streamed chunks up to
/// and including the one marked `done`.
pub async fn collect_reply(client: &dyn ChatClient, model: &str, prompt: String) -> Result<String> {
    let mut stream = client.chat(model, vec![ChatMessage::user(prompt)]).await?;

    let mut reply = String::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if let Some(content) = chunk.content {
            reply.push_str(&content);
        }
        if chunk.done {
            break;
        }
    }

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedChunks {
        chunks: Mutex<Option<Vec<Result<ChatChunk>>>>,
        seen: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    }

    impl FixedChunks {
        fn new(chunks: Vec<Result<ChatChunk>>) -> Self {
            Self {
                chunks: Mutex::new(Some(chunks)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for FixedChunks {
        async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<ChunkStream> {
            self.seen.lock().unwrap().push((model.to_string(), messages));
            let chunks = self.chunks.lock().unwrap().take().unwrap_or_default();
            Ok(Box::pin(tokio_stream::iter(chunks)))
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    fn text(s: &str) -> Result<ChatChunk> {
        Ok(ChatChunk {
            content: Some(s.to_string()),
            done: false,
        })
    }

    #[tokio::test]
    async fn joins_chunks_in_order_and_skips_empty_payloads() {
        let client = FixedChunks::new(vec![
            text("سلام"),
            Ok(ChatChunk::default()),
            text(" world"),
            Ok(ChatChunk {
                content: None,
                done: true,
            }),
        ]);

        let reply = collect_reply(&client, "llama3.1:latest", "prompt".into())
            .await
            .unwrap();
        assert_eq!(reply, "سلام world");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "llama3.1:latest");
        assert_eq!(seen[0].1, vec![ChatMessage::user("prompt")]);
    }

    #[tokio::test]
    async fn stops_reading_at_the_done_chunk() {
        let client = FixedChunks::new(vec![
            text("final "),
            Ok(ChatChunk {
                content: Some("answer".to_string()),
                done: true,
            }),
            text(" trailing"),
            Err(anyhow::anyhow!("never reached")),
        ]);

        let reply = collect_reply(&client, "m", "p".into()).await.unwrap();
        assert_eq!(reply, "final answer");
    }

    #[tokio::test]
    async fn stream_error_propagates() {
        let client = FixedChunks::new(vec![text("partial"), Err(anyhow::anyhow!("connection reset"))]);

        let err = collect_reply(&client, "m", "p".into()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn empty_stream_gives_empty_reply() {
        let client = FixedChunks::new(Vec::new());
        assert_eq!(collect_reply(&client, "m", "p".into()).await.unwrap(), "");
    }
}
