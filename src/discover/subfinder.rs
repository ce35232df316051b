use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::external::{run_tool, Capability, ToolInvocation, ToolPaths};
use crate::result::{Record, ResultSet};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubfinderArgs {
    /// Target domain (e.g. example.com)
    pub domain: String,
    /// Show only subdomains in output (default: true)
    #[serde(default)]
    pub silent: Option<bool>,
}

impl SubfinderArgs {
    pub fn new(domain: impl Into<String>) -> Self {
        Self { domain: domain.into(), silent: Some(true) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Subdomain(pub String);

impl Record for Subdomain {
    const FIELD: &'static str = "subdomains";
}

#[derive(Debug, Deserialize)]
struct RawSubfinderLine {
    #[serde(rename = "host")]
    host: Option<String>,
}

pub fn build_args(args: &SubfinderArgs) -> Vec<String> {
    let mut out = vec!["-d".to_string(), args.domain.clone(), "-json".to_string()];
    if args.silent.unwrap_or(true) {
        out.push("-silent".to_string());
    }
    out
}

/// JSON lines carry `host`; anything that isn't JSON is taken as a bare subdomain.
pub fn parse_line(line: &str) -> Option<Subdomain> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(line) {
        Ok(v) => serde_json::from_value::<RawSubfinderLine>(v)
            .ok()
            .and_then(|raw| raw.host)
            .filter(|h| !h.trim().is_empty())
            .map(|h| Subdomain(h.trim().to_string())),
        Err(_) => Some(Subdomain(line.to_string())),
    }
}

pub async fn run(paths: &ToolPaths, args: &SubfinderArgs) -> ResultSet<Subdomain> {
    let cap = Capability::Subfinder;
    let inv = ToolInvocation::new(cap.name(), paths.resolve(cap), build_args(args));
    run_tool(inv, parse_line).await.dedup()
}
