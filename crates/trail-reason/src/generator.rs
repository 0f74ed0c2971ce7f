use crate::error::ReasonError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// External text-generation collaborator.
///
/// Returns the raw free-text response. Callers parse and validate it; an
/// implementation only classifies transport-level failures.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, instruction: &str, payload: &str) -> Result<String, ReasonError>;
}

/// Generator backed by an OpenAI-compatible chat completions endpoint.
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpGenerator {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ReasonError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn request_body(&self, instruction: &str, payload: &str) -> Value {
        serde_json::json!({
            "model": self.model,
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": instruction },
                { "role": "user", "content": payload },
            ],
        })
    }
}

/// Text of the first choice in a chat completions envelope.
pub fn message_content(envelope: &Value) -> Option<&str> {
    envelope
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, instruction: &str, payload: &str) -> Result<String, ReasonError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(instruction, payload));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::info!(
            endpoint = %self.endpoint,
            model = %self.model,
            bytes = payload.len(),
            "requesting generation"
        );
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "generation request rejected");
            return Err(ReasonError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Value = serde_json::from_str(&body)
            .map_err(|e| ReasonError::Schema(format!("generation envelope is not JSON: {e}")))?;
        message_content(&envelope)
            .map(str::to_string)
            .ok_or_else(|| ReasonError::Schema("generation envelope has no message content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response on a local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            // Read headers, then as much body as Content-Length announces.
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let len = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= head_end + 4 + len {
                        break;
                    }
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn generator(endpoint: &str) -> HttpGenerator {
        HttpGenerator::new(
            endpoint,
            "test-model",
            Some("k".into()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn content_is_read_from_first_choice() {
        let envelope = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"blocks\":[]}" } }]
        });
        assert_eq!(message_content(&envelope), Some("{\"blocks\":[]}"));
        assert_eq!(message_content(&serde_json::json!({ "choices": [] })), None);
    }

    #[tokio::test]
    async fn success_returns_message_text() {
        let url = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"content":"here is json: {}"}}]}"#,
        )
        .await;
        let text = generator(&url).generate("instr", "[]").await.unwrap();
        assert_eq!(text, "here is json: {}");
    }

    #[tokio::test]
    async fn non_success_status_is_transport_failure_with_body() {
        let url = serve_once("HTTP/1.1 429 Too Many Requests", r#"{"error":"slow down"}"#).await;
        let err = generator(&url).generate("instr", "[]").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        match err {
            ReasonError::Transport { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("slow down"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn envelope_without_content_is_schema_failure() {
        let url = serve_once("HTTP/1.1 200 OK", r#"{"choices":[]}"#).await;
        let err = generator(&url).generate("instr", "[]").await.unwrap_err();
        assert!(matches!(err, ReasonError::Schema(_)));
    }
}
