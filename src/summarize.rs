use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SUMMARY_INSTRUCTION: &str =
    "Summarize this text in 7-10 detailed sentences. Then create a 10-bullet point list of the key points.";

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A hosted language model that turns a prompt into text
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build the summarization prompt for a transcript
pub fn build_prompt(transcript_text: &str) -> String {
    format!("{transcript_text}\n{SUMMARY_INSTRUCTION}")
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, model, GEMINI_ENDPOINT)
    }

    /// Point the client at another `.../models` root, e.g. a proxy
    pub fn with_base_url(
        client: reqwest::Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Summarizing via Gemini API with model {}", self.model);

        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        // Key goes in a header so it never shows up in a reqwest error's URL
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::QuotaExceeded(body));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ModelStatus { status, body });
        }

        let parsed: GeminiResponse = resp.json().await?;
        extract_gemini_text(parsed)
    }
}

fn extract_gemini_text(resp: GeminiResponse) -> Result<String> {
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(Error::EmptyCompletion)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve one canned HTTP response on a local port and return its base URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });

        format!("http://{addr}/v1beta/models")
    }

    /// Consume headers and the Content-Length body so the client sees a clean exchange
    async fn read_request(stream: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }

    fn client_for(base_url: String) -> GeminiClient {
        GeminiClient::with_base_url(reqwest::Client::new(), "test-key", "gemini-test", base_url)
    }

    fn parse(json: serde_json::Value) -> GeminiResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt("line one\nline two");
        assert_eq!(
            prompt,
            "line one\nline two\nSummarize this text in 7-10 detailed sentences. \
             Then create a 10-bullet point list of the key points."
        );
    }

    #[test]
    fn test_request_shape() {
        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hi" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn test_extract_gemini_text() {
        let resp = parse(serde_json::json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Here is the summary."}, {"text": "ignored"}]}},
                {"content": {"parts": [{"text": "second candidate"}]}}
            ]
        }));
        assert_eq!(extract_gemini_text(resp).unwrap(), "Here is the summary.");
    }

    #[test]
    fn test_extract_gemini_text_no_candidates() {
        let resp = parse(serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert!(matches!(extract_gemini_text(resp), Err(Error::EmptyCompletion)));
    }

    #[test]
    fn test_extract_gemini_text_candidate_without_content() {
        let resp = parse(serde_json::json!({"candidates": [{"finishReason": "SAFETY"}]}));
        assert!(matches!(extract_gemini_text(resp), Err(Error::EmptyCompletion)));
    }

    #[tokio::test]
    async fn test_generate_returns_first_part() {
        let base = serve_once("200 OK", r#"{"candidates":[{"content":{"parts":[{"text":"**Summary** ok"}]}}]}"#).await;
        let text = client_for(base).generate("prompt").await.unwrap();
        assert_eq!(text, "**Summary** ok");
    }

    #[tokio::test]
    async fn test_generate_too_many_requests_is_quota() {
        let base = serve_once("429 Too Many Requests", r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#).await;
        let err = client_for(base).generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded(ref body) if body.contains("RESOURCE_EXHAUSTED")));
        assert_eq!(err.kind(), "quota_exceeded");
    }

    #[tokio::test]
    async fn test_generate_server_error_keeps_status() {
        let base = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let err = client_for(base).generate("prompt").await.unwrap_err();
        match err {
            Error::ModelStatus { status, body } => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.contains("boom"));
            }
            other => panic!("expected ModelStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_without_candidates_is_empty_completion() {
        let base = serve_once("200 OK", r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).await;
        let err = client_for(base).generate("prompt").await.unwrap_err();
        assert!(matches!(err, Error::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_generate_times_out_on_silent_upstream() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            // Hold the connection open without answering
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(stream);
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(300))
            .build()
            .unwrap();
        let gemini = GeminiClient::with_base_url(client, "test-key", "gemini-test", format!("http://{addr}/models"));

        let started = std::time::Instant::now();
        let err = gemini.generate("prompt").await.unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, Error::Timeout(_)));
        assert_eq!(err.kind(), "timeout");
        assert!(err.to_string().starts_with("upstream request timed out"));
    }
}
