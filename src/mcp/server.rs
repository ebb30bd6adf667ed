//! MCP server over stdio.
//!
//! Requests are read line by line and each one is handled on its own task, so a
//! slow transcript extraction never blocks `tools/list` or a second extraction.
//! Responses funnel through a channel into a single writer, which keeps every
//! line on stdout whole.

use super::handler::RequestHandler;
use super::protocol::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};
use crate::browser::{BrowserSession, TranscriptExtractor};
use crate::config::Settings;
use crate::metadata::YtDlp;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// MCP server for Tekst.
pub struct McpServer {
    handler: Arc<RequestHandler>,
    session: Option<Arc<BrowserSession>>,
}

impl McpServer {
    /// Create a server backed by a lazily launched Chrome and yt-dlp.
    pub fn new(settings: Settings) -> Self {
        let session = Arc::new(BrowserSession::new(settings.browser.clone()));
        let extractor = TranscriptExtractor::new(session.clone(), settings.browser.clone());
        let metadata = YtDlp::new(settings.metadata.ytdlp_path.clone());

        let handler = RequestHandler::new(
            Arc::new(extractor),
            Arc::new(metadata),
            settings.pagination.clone(),
        );

        Self {
            handler: Arc::new(handler),
            session: Some(session),
        }
    }

    /// Create a server around an existing handler. No browser is owned.
    pub fn with_handler(handler: RequestHandler) -> Self {
        Self {
            handler: Arc::new(handler),
            session: None,
        }
    }

    /// Serve stdin/stdout until the client disconnects or Ctrl-C, then close the browser.
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("Tekst MCP server starting");

        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        let result = tokio::select! {
            result = self.serve(stdin, stdout) => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                Ok(())
            }
        };

        if let Some(session) = &self.session {
            session.shutdown().await;
        }
        info!("Tekst MCP server stopped");
        result
    }

    /// Serve one connection. Returns once the reader hits EOF and every
    /// in-flight response has been written.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(line) {
                Ok(request) => request,
                Err(e) => {
                    warn!("Failed to parse request: {}", e);
                    let _ = tx.send(JsonRpcResponse::error(Value::Null, PARSE_ERROR, "Parse error"));
                    continue;
                }
            };

            debug!(method = %request.method, "Request");
            let handler = self.handler.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = handler.handle(request).await {
                    let _ = tx.send(response);
                }
            });
        }

        debug!("Input closed, waiting for in-flight requests");
        drop(tx);
        writer_task.await??;
        Ok(())
    }
}

/// Write one JSON object per line until every sender is gone.
async fn write_responses<W>(
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
    mut writer: W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = match serde_json::to_string(&response) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                continue;
            }
        };
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::TranscriptSource;
    use crate::config::PaginationSettings;
    use crate::error::Result;
    use crate::metadata::{MetadataSource, VideoInfo};
    use crate::transcript::TranscriptSegment;
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;

    /// Transcripts for "slow" URLs take a while; everything else is immediate.
    struct Transcripts;

    #[async_trait]
    impl TranscriptSource for Transcripts {
        async fn fetch_transcript(&self, url: &str, _language: &str) -> Result<Vec<TranscriptSegment>> {
            if url.ends_with("sloooooooow") {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok(vec![TranscriptSegment::new(url.to_string(), 0.0, 0.0)])
        }
    }

    struct Metadata;

    #[async_trait]
    impl MetadataSource for Metadata {
        async fn fetch_info(&self, _url: &str) -> Result<VideoInfo> {
            Ok(VideoInfo::default())
        }
    }

    fn server() -> McpServer {
        McpServer::with_handler(RequestHandler::new(
            Arc::new(Transcripts),
            Arc::new(Metadata),
            PaginationSettings::default(),
        ))
    }

    async fn exchange(input: String) -> Vec<Value> {
        let (mut output, writer) = tokio::io::duplex(64 * 1024);

        server().serve(BufReader::new(input.as_bytes()), writer).await.unwrap();

        let mut raw = String::new();
        output.read_to_string(&mut raw).await.unwrap();
        raw.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_parse_error_and_notification() {
        let input = [
            "not json".to_string(),
            String::new(),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
            json!({"jsonrpc": "2.0", "id": 7, "method": "ping"}).to_string(),
        ]
        .join("\n");

        let responses = exchange(input).await;
        assert_eq!(responses.len(), 2);

        let parse = responses.iter().find(|r| r["id"].is_null()).unwrap();
        assert_eq!(parse["error"]["code"], PARSE_ERROR);

        let ping = responses.iter().find(|r| r["id"] == 7).unwrap();
        assert_eq!(ping["result"], json!({}));
    }

    #[tokio::test]
    async fn test_slow_call_does_not_block_others() {
        let call = |id: i64, video: &str| {
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": "tools/call",
                "params": {"name": "get_transcript", "arguments": {"url": video}}
            })
            .to_string()
        };
        let input = [
            call(1, "https://www.youtube.com/watch?v=sloooooooow"),
            call(2, "jNQXAC9IVRw"),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"}).to_string(),
        ]
        .join("\n");

        let responses = exchange(input).await;
        let order: Vec<i64> = responses.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(order.len(), 3);
        assert_eq!(*order.last().unwrap(), 1);
        assert!(responses.iter().all(|r| r.get("error").is_none()));
    }
}
