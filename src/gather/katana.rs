use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::external::{run_tool, Capability, ToolInvocation, ToolPaths};
use crate::result::{Record, ResultSet};

pub const DEFAULT_DEPTH: u32 = 2;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KatanaArgs {
    /// List of URLs to crawl
    pub urls: Vec<String>,
    /// Crawl depth (default: 2)
    #[serde(default)]
    pub depth: Option<u32>,
    /// Crawl scope, passed through to `-f`
    #[serde(default)]
    pub scope: Option<String>,
}

impl KatanaArgs {
    pub fn new(urls: Vec<String>, depth: u32) -> Self {
        Self { urls, depth: Some(depth), scope: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Endpoint(pub String);

impl Record for Endpoint {
    const FIELD: &'static str = "endpoints";
}

#[derive(Debug, Deserialize)]
struct RawKatanaLine {
    #[serde(rename = "request")]
    request: Option<RawKatanaRequest>,
}

#[derive(Debug, Deserialize)]
struct RawKatanaRequest {
    #[serde(rename = "endpoint")]
    endpoint: Option<String>,
}

pub fn build_args(args: &KatanaArgs) -> Vec<String> {
    let depth = args.depth.unwrap_or(DEFAULT_DEPTH);
    let mut out = vec!["-d".to_string(), depth.to_string(), "-jsonl".to_string()];
    if let Some(scope) = args.scope.as_deref().filter(|s| !s.is_empty()) {
        out.push("-f".to_string());
        out.push(scope.to_string());
    }
    out
}

/// `request.endpoint` from JSONL, or a bare URL line.
pub fn parse_line(line: &str) -> Option<Endpoint> {
    let line = line.trim();
    match serde_json::from_str::<Value>(line) {
        Ok(v) => serde_json::from_value::<RawKatanaLine>(v)
            .ok()?
            .request?
            .endpoint
            .filter(|e| !e.is_empty())
            .map(Endpoint),
        Err(_) if line.starts_with("http") => Some(Endpoint(line.to_string())),
        Err(_) => None,
    }
}

pub async fn run(paths: &ToolPaths, args: &KatanaArgs) -> ResultSet<Endpoint> {
    let cap = Capability::Katana;
    let inv = ToolInvocation::new(cap.name(), paths.resolve(cap), build_args(args)).with_stdin(&args.urls);
    run_tool(inv, parse_line).await.dedup()
}
