//! JSON-RPC method dispatch and tool implementations.

use super::protocol::*;
use super::tools::{
    get_tools, TranscriptArgs, VideoInfoArgs, GET_TIMED_TRANSCRIPT, GET_TRANSCRIPT, GET_VIDEO_INFO,
};
use crate::browser::TranscriptSource;
use crate::config::PaginationSettings;
use crate::error::{Result, TekstError};
use crate::metadata::MetadataSource;
use crate::transcript::{flat_text, paginate_items, paginate_text, TimedTranscript, TranscriptSegment};
use crate::youtube::resolve_url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "tekst";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One page of a timed transcript.
#[derive(Debug, Serialize)]
struct TimedPage<'a> {
    transcript: &'a [TranscriptSegment],
    next_cursor: Option<String>,
    total_items: usize,
    url: &'a str,
}

/// Answers MCP requests. Shared by every in-flight request task.
pub struct RequestHandler {
    transcripts: Arc<dyn TranscriptSource>,
    metadata: Arc<dyn MetadataSource>,
    pagination: PaginationSettings,
}

impl RequestHandler {
    pub fn new(
        transcripts: Arc<dyn TranscriptSource>,
        metadata: Arc<dyn MetadataSource>,
        pagination: PaginationSettings,
    ) -> Self {
        Self {
            transcripts,
            metadata,
            pagination,
        }
    }

    /// Handle a single message. Notifications get no response.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => info!("MCP client initialized"),
            "notifications/cancelled" => {
                info!("Client cancelled a request; extractions run to completion")
            }
            other => debug!("Ignoring notification: {}", other),
        }
    }

    fn handle_initialize(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        if let Some(params) = params.and_then(|p| serde_json::from_value::<InitializeParams>(p).ok()) {
            let client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown");
            let client_version = params
                .client_info
                .as_ref()
                .and_then(|c| c.version.as_deref())
                .unwrap_or("unknown");
            info!(
                client,
                client_version,
                protocol = params.protocol_version.as_deref().unwrap_or("unspecified"),
                "Initialize"
            );
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };

        to_response(id, &result)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        to_response(id, &ToolsListResult { tools: get_tools() })
    }

    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        &format!("Invalid params: {}", e),
                    )
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let result = match self.call_tool(&params.name, params.arguments).await {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => {
                warn!(tool = %params.name, "Tool call failed: {}", e);
                ToolCallResult::error(e)
            }
        };

        to_response(id, &result)
    }

    /// Run a tool and return its JSON text payload.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<String> {
        match name {
            GET_VIDEO_INFO => self.tool_video_info(parse_args(arguments)?).await,
            GET_TRANSCRIPT => self.tool_transcript(parse_args(arguments)?).await,
            GET_TIMED_TRANSCRIPT => self.tool_timed_transcript(parse_args(arguments)?).await,
            _ => Err(TekstError::UnknownTool(name.to_string())),
        }
    }

    async fn tool_video_info(&self, args: VideoInfoArgs) -> Result<String> {
        let url = resolve_url(&args.url)?;
        let info = self.metadata.fetch_info(&url).await?;
        Ok(serde_json::to_string_pretty(&info)?)
    }

    async fn tool_transcript(&self, args: TranscriptArgs) -> Result<String> {
        let url = resolve_url(&args.url)?;
        let segments = self.transcripts.fetch_transcript(&url, args.language()).await?;
        let flat = flat_text(&segments);

        let text = match args.cursor.as_deref() {
            None => serde_json::to_string_pretty(&flat)?,
            Some(cursor) => {
                let page = paginate_text(&flat.transcript, Some(cursor), self.pagination.text_page_size)?;
                serde_json::to_string_pretty(&page)?
            }
        };
        Ok(text)
    }

    async fn tool_timed_transcript(&self, args: TranscriptArgs) -> Result<String> {
        let url = resolve_url(&args.url)?;
        let segments = self.transcripts.fetch_transcript(&url, args.language()).await?;

        let text = match args.cursor.as_deref() {
            None => {
                let payload = TimedTranscript {
                    total_items: segments.len(),
                    transcript: segments,
                    url,
                };
                serde_json::to_string_pretty(&payload)?
            }
            Some(cursor) => {
                let page = paginate_items(&segments, Some(cursor), self.pagination.item_page_size)?;
                serde_json::to_string_pretty(&TimedPage {
                    transcript: page.items,
                    next_cursor: page.next_cursor,
                    total_items: page.total_items,
                    url: &url,
                })?
            }
        };
        Ok(text)
    }
}

/// Deserialize tool arguments. Missing arguments are treated as an empty object.
fn parse_args<T: DeserializeOwned>(arguments: Option<Value>) -> Result<T> {
    let arguments = arguments.unwrap_or_else(|| json!({}));
    serde_json::from_value(arguments)
        .map_err(|e| TekstError::InvalidInput(format!("invalid arguments: {}", e)))
}

fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, -32603, &format!("Internal error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::VideoInfo;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeTranscripts {
        segments: Vec<TranscriptSegment>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TranscriptSource for FakeTranscripts {
        async fn fetch_transcript(&self, url: &str, language: &str) -> Result<Vec<TranscriptSegment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(url.starts_with("https://"));
            assert!(!language.is_empty());
            if self.fail {
                return Err(TekstError::TranscriptUnavailable(
                    "'Show transcript' control not found; captions may be disabled for this video"
                        .to_string(),
                ));
            }
            Ok(self.segments.clone())
        }
    }

    struct FakeMetadata;

    #[async_trait]
    impl MetadataSource for FakeMetadata {
        async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
            if url.contains("missing") {
                return Err(TekstError::ToolFailed("yt-dlp failed: Video unavailable".into()));
            }
            Ok(VideoInfo {
                title: Some("Me at the zoo".into()),
                length_seconds: Some(19),
                ..VideoInfo::default()
            })
        }
    }

    fn handler_with(segments: Vec<TranscriptSegment>, fail: bool) -> RequestHandler {
        counting_handler(segments, fail).0
    }

    fn counting_handler(segments: Vec<TranscriptSegment>, fail: bool) -> (RequestHandler, Arc<FakeTranscripts>) {
        let transcripts = Arc::new(FakeTranscripts {
            segments,
            fail,
            calls: AtomicUsize::new(0),
        });
        let handler = RequestHandler::new(
            transcripts.clone(),
            Arc::new(FakeMetadata),
            PaginationSettings {
                text_page_size: 4,
                item_page_size: 2,
            },
        );
        (handler, transcripts)
    }

    fn sample() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new("a", 0.0, 5.0),
            TranscriptSegment::new("b", 5.0, 7.0),
            TranscriptSegment::new("c", 12.0, 0.0),
        ]
    }

    fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: Some(json!(id)),
            method: method.into(),
            params: Some(params),
        }
    }

    async fn call(handler: &RequestHandler, name: &str, arguments: Value) -> Value {
        let response = handler
            .handle(request(1, "tools/call", json!({"name": name, "arguments": arguments})))
            .await
            .unwrap();
        assert!(response.error.is_none());
        response.result.unwrap()
    }

    fn payload(result: &Value) -> Value {
        serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_get_transcript_full() {
        let handler = handler_with(sample(), false);
        let result = call(&handler, GET_TRANSCRIPT, json!({"url": "https://www.youtube.com/watch?v=jNQXAC9IVRw"})).await;

        assert!(result.get("isError").is_none());
        assert_eq!(payload(&result), json!({"transcript": "a b c", "total_length": 5}));
    }

    #[tokio::test]
    async fn test_get_transcript_paged() {
        let handler = handler_with(sample(), false);
        let first = call(&handler, GET_TRANSCRIPT, json!({"url": "jNQXAC9IVRw", "cursor": ""})).await;
        assert_eq!(
            payload(&first),
            json!({"transcript": "a b ", "next_cursor": "4", "total_length": 5})
        );

        let last = call(&handler, GET_TRANSCRIPT, json!({"url": "jNQXAC9IVRw", "cursor": "4"})).await;
        assert_eq!(
            payload(&last),
            json!({"transcript": "c", "next_cursor": null, "total_length": 5})
        );
    }

    #[tokio::test]
    async fn test_get_timed_transcript() {
        let handler = handler_with(sample(), false);
        let url = "https://www.youtube.com/watch?v=jNQXAC9IVRw";
        let result = call(&handler, GET_TIMED_TRANSCRIPT, json!({"url": url, "lang": "en"})).await;

        let parsed: TimedTranscript = serde_json::from_value(payload(&result)).unwrap();
        assert_eq!(parsed.total_items, 3);
        assert_eq!(parsed.url, url);
        assert_eq!(parsed.transcript, sample());
        assert_eq!(parsed.transcript.last().unwrap().duration, 0.0);
    }

    #[tokio::test]
    async fn test_get_timed_transcript_paged() {
        let handler = handler_with(sample(), false);
        let result = call(&handler, GET_TIMED_TRANSCRIPT, json!({"url": "jNQXAC9IVRw", "cursor": "2"})).await;

        let page = payload(&result);
        assert_eq!(page["transcript"].as_array().unwrap().len(), 1);
        assert_eq!(page["next_cursor"], Value::Null);
        assert_eq!(page["total_items"], 3);
    }

    #[tokio::test]
    async fn test_every_call_fetches_afresh() {
        let (handler, transcripts) = counting_handler(sample(), false);
        let url = json!({"url": "jNQXAC9IVRw"});

        call(&handler, GET_TRANSCRIPT, url.clone()).await;
        assert_eq!(transcripts.calls.load(Ordering::SeqCst), 1);

        call(&handler, GET_TRANSCRIPT, url.clone()).await;
        call(&handler, GET_TIMED_TRANSCRIPT, url).await;
        assert_eq!(transcripts.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_transcript_unavailable_is_error_payload() {
        let handler = handler_with(Vec::new(), true);
        let result = call(&handler, GET_TRANSCRIPT, json!({"url": "https://www.youtube.com/watch?v=aaaaaaaaaaa"})).await;

        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error: "));
        assert!(text.to_lowercase().contains("transcript unavailable"));
    }

    #[tokio::test]
    async fn test_invalid_cursor_is_error_payload() {
        let handler = handler_with(sample(), false);
        let result = call(&handler, GET_TRANSCRIPT, json!({"url": "jNQXAC9IVRw", "cursor": "abc"})).await;

        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("Invalid cursor"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_payload() {
        let handler = handler_with(sample(), false);
        let result = call(&handler, "get_comments", json!({})).await;

        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["text"], "Error: Unknown tool: get_comments");
    }

    #[tokio::test]
    async fn test_missing_url_is_error_payload() {
        let handler = handler_with(sample(), false);
        let result = call(&handler, GET_TIMED_TRANSCRIPT, json!({"lang": "en"})).await;

        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("url"));
    }

    #[tokio::test]
    async fn test_video_info() {
        let handler = handler_with(sample(), false);
        let result = call(&handler, GET_VIDEO_INFO, json!({"url": "jNQXAC9IVRw"})).await;
        assert_eq!(payload(&result), json!({"title": "Me at the zoo", "lengthSeconds": 19}));

        let failed = call(&handler, GET_VIDEO_INFO, json!({"url": "https://example.test/missing"})).await;
        assert_eq!(failed["isError"], true);
        assert!(failed["content"][0]["text"].as_str().unwrap().contains("External tool failed"));
    }

    #[tokio::test]
    async fn test_protocol_methods() {
        let handler = handler_with(sample(), false);

        let init = handler
            .handle(request(1, "initialize", json!({"protocolVersion": "2024-11-05", "clientInfo": {"name": "test", "version": "1.2.3"}})))
            .await
            .unwrap();
        let init = init.result.unwrap();
        assert_eq!(init["serverInfo"]["name"], "tekst");
        assert_eq!(init["capabilities"]["tools"]["listChanged"], false);

        let tools = handler.handle(request(2, "tools/list", json!({}))).await.unwrap();
        assert_eq!(tools.result.unwrap()["tools"].as_array().unwrap().len(), 3);

        let unknown = handler.handle(request(3, "resources/list", json!({}))).await.unwrap();
        assert_eq!(unknown.error.unwrap().code, METHOD_NOT_FOUND);

        let bad = handler.handle(request(4, "tools/call", json!({"arguments": {}}))).await.unwrap();
        assert_eq!(bad.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let handler = handler_with(sample(), false);
        let notification = JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: None,
            method: "notifications/initialized".into(),
            params: None,
        };
        assert!(handler.handle(notification).await.is_none());
    }
}
