//! MCP (Model Context Protocol) server exposing the filing and conversion tools

use crate::config::RendererConfig;
use crate::converters;
use crate::edgar::{EdgarClient, SelectionCriteria};
use crate::pipeline;
use crate::utils::AppError;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

pub const SERVER_NAME: &str = "SEC Filing Processor";

const DOWNLOAD_TOOL: &str = "download_sec_filing";
const RENDER_TOOL: &str = "html_to_pdf";
const CONVERT_TOOL: &str = "read_as_markdown";

/// JSON-RPC 2.0 request
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Arguments of `download_sec_filing`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DownloadFilingArgs {
    /// Central Index Key, zero-padded to 10 digits (e.g. "0001018724")
    pub cik: String,
    /// Calendar year of the filing's report date (e.g. "2024")
    #[serde(deserialize_with = "year_from_str_or_int")]
    #[schemars(with = "String")]
    pub year: i32,
    /// SEC form type, matched exactly (e.g. "8-K", "10-K")
    pub filing_type: String,
    /// Directory the filing archive is extracted into
    pub output_dir_path: PathBuf,
}

/// Arguments of `html_to_pdf`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RenderArgs {
    /// HTM/HTML file to render
    pub input_file_path: PathBuf,
    /// Where to write the PDF
    pub output_file_path: PathBuf,
}

/// Arguments of `read_as_markdown`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ConvertArgs {
    /// PDF, HTML or text file to convert
    pub input_file_path: PathBuf,
}

fn year_from_str_or_int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Int(i32),
        Str(String),
    }

    match Year::deserialize(deserializer)? {
        Year::Int(year) => Ok(year),
        Year::Str(raw) => raw
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid year: {:?}", raw))),
    }
}

/// MCP Server implementation
pub struct McpServer {
    client: EdgarClient,
    renderer: RendererConfig,
}

impl McpServer {
    pub fn new(client: EdgarClient, renderer: RendererConfig) -> Self {
        Self { client, renderer }
    }

    /// Handles one line of input. Blank lines and notifications (no id) get
    /// no response.
    async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        if line.trim().is_empty() {
            return None;
        }

        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) if request.id.is_none() => None,
            Ok(request) => Some(self.handle_request(request).await),
            Err(e) => Some(JsonRpcResponse::error(
                None,
                -32700,
                format!("Parse error: {}", e),
            )),
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            _ => JsonRpcResponse::error(
                request.id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "tools": [
                    {
                        "name": DOWNLOAD_TOOL,
                        "description": "Download the latest SEC filing of a form type for a report year and return the path of its primary document.",
                        "inputSchema": schema_value(schema_for!(DownloadFilingArgs))
                    },
                    {
                        "name": RENDER_TOOL,
                        "description": "Render an HTM/HTML file to PDF and return the PDF path.",
                        "inputSchema": schema_value(schema_for!(RenderArgs))
                    },
                    {
                        "name": CONVERT_TOOL,
                        "description": "Convert a PDF, HTML or text document to markdown text.",
                        "inputSchema": schema_value(schema_for!(ConvertArgs))
                    }
                ]
            }),
        )
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        tracing::info!("Tool call: {}", tool_name);

        let outcome = match tool_name.as_str() {
            DOWNLOAD_TOOL => match parse_args::<DownloadFilingArgs>(arguments) {
                Ok(args) => self.download(args).await,
                Err(message) => return JsonRpcResponse::error(id, -32602, message),
            },
            RENDER_TOOL => match parse_args::<RenderArgs>(arguments) {
                Ok(args) => converters::render_html_to_pdf(
                    &self.renderer,
                    &args.input_file_path,
                    &args.output_file_path,
                )
                .await
                .map(|path| path.display().to_string())
                .map_err(AppError::from),
                Err(message) => return JsonRpcResponse::error(id, -32602, message),
            },
            CONVERT_TOOL => match parse_args::<ConvertArgs>(arguments) {
                Ok(args) => {
                    converters::convert_to_text(&args.input_file_path).map_err(AppError::from)
                }
                Err(message) => return JsonRpcResponse::error(id, -32602, message),
            },
            _ => return JsonRpcResponse::error(id, -32602, format!("Unknown tool: {}", tool_name)),
        };

        match outcome {
            Ok(text) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [{
                        "type": "text",
                        "text": text
                    }]
                }),
            ),
            Err(e) => {
                tracing::error!("Tool {} failed: {}", tool_name, e);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "content": [{
                            "type": "text",
                            "text": format!("{}: {}", e.kind(), e)
                        }],
                        "isError": true
                    }),
                )
            }
        }
    }

    async fn download(&self, args: DownloadFilingArgs) -> Result<String, AppError> {
        let criteria = SelectionCriteria::new(args.cik, args.year, args.filing_type);
        let path = pipeline::download_filing(&self.client, &criteria, &args.output_dir_path).await?;
        Ok(path.display().to_string())
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: Value) -> Result<T, String> {
    serde_json::from_value(arguments).map_err(|e| format!("Invalid arguments: {}", e))
}

fn schema_value(schema: schemars::schema::RootSchema) -> Value {
    serde_json::to_value(schema).unwrap_or_default()
}

/// Run the MCP server over stdio, one request at a time
pub async fn run_server(server: McpServer) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    tracing::info!("{} listening on stdio", SERVER_NAME);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                continue;
            }
        };

        let Some(response) = server.handle_line(&line).await else {
            continue;
        };

        let json = serde_json::to_string(&response).unwrap_or_default();
        let _ = writeln!(stdout, "{}", json);
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgarConfig;

    fn server() -> McpServer {
        let client = EdgarClient::new(EdgarConfig::default()).unwrap();
        McpServer::new(client, RendererConfig::default())
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = server().handle_request(request("initialize", json!({}))).await;
        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list_schemas() {
        let response = server().handle_request(request("tools/list", json!({}))).await;
        let tools = response.result.unwrap()["tools"].clone();
        let tools = tools.as_array().unwrap();
        assert_eq!(tools.len(), 3);

        let download = &tools[0];
        assert_eq!(download["name"], DOWNLOAD_TOOL);
        let props = &download["inputSchema"]["properties"];
        for field in ["cik", "year", "filing_type", "output_dir_path"] {
            assert!(props[field].is_object(), "missing {}", field);
        }
        assert!(tools[2]["inputSchema"]["properties"]["input_file_path"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_method_and_tool() {
        let response = server().handle_request(request("resources/list", json!({}))).await;
        assert_eq!(response.error.unwrap().code, -32601);

        let response = server()
            .handle_request(request("tools/call", json!({"name": "nope", "arguments": {}})))
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("nope"));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let response = server()
            .handle_request(request(
                "tools/call",
                json!({"name": DOWNLOAD_TOOL, "arguments": {"cik": "0001018724", "year": "twenty"}}),
            ))
            .await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_tool_failure_is_reported_in_result() {
        let response = server()
            .handle_request(request(
                "tools/call",
                json!({"name": CONVERT_TOOL, "arguments": {"input_file_path": "/nonexistent/file.pdf"}}),
            ))
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("ConversionError:"));
    }

    #[tokio::test]
    async fn test_handle_line() {
        let server = server();

        let response = server.handle_line("{not json").await.unwrap();
        assert_eq!(response.id, None);
        assert_eq!(response.error.unwrap().code, -32700);

        let notification = r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#;
        assert!(server.handle_line(notification).await.is_none());
        assert!(server.handle_line("   ").await.is_none());

        let response = server
            .handle_line(r#"{"jsonrpc": "2.0", "id": 7, "method": "tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(response.id, Some(json!(7)));
        assert!(response.result.is_some());
    }

    #[test]
    fn test_year_accepts_string_or_integer() {
        let args: DownloadFilingArgs = serde_json::from_value(json!({
            "cik": "0001018724", "year": "2024", "filing_type": "8-K", "output_dir_path": "out"
        }))
        .unwrap();
        assert_eq!(args.year, 2024);

        let args: DownloadFilingArgs = serde_json::from_value(json!({
            "cik": "0001018724", "year": 2023, "filing_type": "10-K", "output_dir_path": "out"
        }))
        .unwrap();
        assert_eq!(args.year, 2023);
    }
}
