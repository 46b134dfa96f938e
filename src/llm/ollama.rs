use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use super::{ChatChunk, ChatClient, ChatMessage, ChunkStream};
use crate::config::OllamaConfig;

const CHUNK_BUFFER: usize = 64;

/// Streaming client for a local Ollama server.
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    max_retries: u32,
    retry_base_delay: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponseLine {
    message: Option<ResponseMessage>,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .context("Failed to build Ollama HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        })
    }

    async fn open_chat(&self, url: &str, request: &ChatRequest<'_>) -> Result<Response> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .context("Ollama chat request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama returned {}: {}", status, body);
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn chat(&self, model: &str, messages: Vec<ChatMessage>) -> Result<ChunkStream> {
        let url = format!("{}/api/chat", self.endpoint);
        let request = ChatRequest {
            model,
            messages: &messages,
            stream: true,
        };

        let mut attempt = 0;
        let response = loop {
            match self.open_chat(&url, &request).await {
                Ok(response) => break response,
                Err(e) if attempt < self.max_retries => {
                    let delay = self.retry_base_delay * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        "Ollama chat attempt {} failed, retrying in {:?}: {:#}",
                        attempt, delay, e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        };

        let (tx, rx) = mpsc::channel(CHUNK_BUFFER);
        tokio::spawn(forward_chunks(response, tx));

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn ping(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Ollama is unreachable")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Ollama health check returned {}", status);
        }

        Ok(())
    }
}

/// Splits the newline-delimited body into chunks until the body ends, a line
/// fails to decode, or the receiver goes away. Dropping the body closes the
/// connection to Ollama.
async fn forward_chunks(response: Response, tx: mpsc::Sender<Result<ChatChunk>>) {
    let mut body = Box::pin(response.bytes_stream());
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let next = tokio::select! {
            next = body.next() => next,
            _ = tx.closed() => {
                debug!("Reply receiver dropped, abandoning Ollama stream");
                return;
            }
        };
        let Some(next) = next else {
            break;
        };

        let bytes = match next {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tx
                    .send(Err(anyhow::Error::new(e).context("Ollama stream interrupted")))
                    .await;
                return;
            }
        };
        pending.extend_from_slice(&bytes);

        while let Some(newline) = pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = pending.drain(..=newline).collect();
            if !send_line(&tx, &line).await {
                return;
            }
        }
    }

    if !pending.is_empty() {
        send_line(&tx, &pending).await;
    }
    debug!("Ollama stream finished");
}

/// Returns false once forwarding should stop.
async fn send_line(tx: &mpsc::Sender<Result<ChatChunk>>, line: &[u8]) -> bool {
    let Some(item) = decode_line(line) else {
        return true;
    };
    let failed = item.is_err();
    tx.send(item).await.is_ok() && !failed
}

fn decode_line(line: &[u8]) -> Option<Result<ChatChunk>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let parsed: ChatResponseLine = match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            return Some(Err(
                anyhow::Error::new(e).context("Malformed chunk in Ollama stream")
            ))
        }
    };

    if let Some(error) = parsed.error {
        return Some(Err(anyhow::anyhow!("Ollama error: {}", error)));
    }

    Some(Ok(ChatChunk {
        content: parsed.message.and_then(|m| m.content),
        done: parsed.done,
    }))
}
