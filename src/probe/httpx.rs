use serde::{Deserialize, Serialize};

use crate::external::{run_tool, Capability, ToolInvocation, ToolPaths};
use crate::result::{Record, ResultSet};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpxArgs {
    /// List of URLs or hosts to probe
    pub urls: Vec<String>,
    #[serde(default)]
    pub follow_redirects: Option<bool>,
    #[serde(default)]
    pub screenshot: Option<bool>,
}

impl HttpxArgs {
    pub fn new(urls: Vec<String>, follow_redirects: bool) -> Self {
        Self { urls, follow_redirects: Some(follow_redirects), screenshot: Some(false) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webserver: Option<String>,
}

impl HttpResponse {
    /// Answered with a status below 500.
    pub fn is_live(&self) -> bool {
        matches!(self.status_code, Some(code) if code > 0 && code < 500)
    }
}

impl Record for HttpResponse {
    const FIELD: &'static str = "responses";
}

#[derive(Debug, Deserialize)]
struct RawHttpxLine {
    #[serde(rename = "url")]
    url: Option<String>,
    #[serde(rename = "host")]
    host: Option<String>,
    #[serde(rename = "status_code")]
    status_code: Option<u16>,
    #[serde(rename = "content_length")]
    content_length: Option<u64>,
    #[serde(rename = "title")]
    title: Option<String>,
    #[serde(rename = "webserver")]
    webserver: Option<String>,
}

pub fn build_args(args: &HttpxArgs) -> Vec<String> {
    let mut out = vec!["-j".to_string(), "-silent".to_string()];
    if args.follow_redirects.unwrap_or(false) {
        out.push("-fr".to_string());
    }
    if args.screenshot.unwrap_or(false) {
        out.push("-screenshot".to_string());
    }
    out
}

pub fn parse_line(line: &str) -> Option<HttpResponse> {
    let raw: RawHttpxLine = serde_json::from_str(line).ok()?;
    let url = raw.url.filter(|u| !u.is_empty()).or(raw.host)?;
    Some(HttpResponse {
        url,
        status_code: raw.status_code,
        content_length: raw.content_length,
        title: raw.title,
        webserver: raw.webserver,
    })
}

pub async fn run(paths: &ToolPaths, args: &HttpxArgs) -> ResultSet<HttpResponse> {
    let cap = Capability::Httpx;
    let inv = ToolInvocation::new(cap.name(), paths.resolve(cap), build_args(args)).with_stdin(&args.urls);
    run_tool(inv, parse_line).await
}
