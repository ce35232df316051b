use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::external::{run_tool, Capability, ToolInvocation, ToolPaths};
use crate::result::{Record, ResultSet};

pub const DEFAULT_TOP_PORTS: u32 = 100;

static HOST_PORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+):(\d+)$").expect("valid host:port regex"));

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaabuArgs {
    /// List of hosts to scan
    pub hosts: Vec<String>,
    /// Ports to scan (e.g. '80,443' or '1-1000'); takes precedence over topPorts
    #[serde(default)]
    pub ports: Option<String>,
    /// Scan top N ports
    #[serde(default)]
    pub top_ports: Option<u32>,
}

impl NaabuArgs {
    pub fn top(hosts: Vec<String>, top_ports: u32) -> Self {
        Self { hosts, ports: None, top_ports: Some(top_ports) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OpenPort {
    pub host: String,
    pub port: u16,
}

impl Record for OpenPort {
    const FIELD: &'static str = "openPorts";
}

#[derive(Debug, Deserialize)]
struct RawNaabuLine {
    #[serde(rename = "host")]
    host: Option<String>,
    #[serde(rename = "port")]
    port: Option<u16>,
}

pub fn build_args(args: &NaabuArgs) -> Vec<String> {
    let mut out = vec!["-json".to_string()];
    match (args.ports.as_deref().filter(|p| !p.trim().is_empty()), args.top_ports.filter(|n| *n > 0)) {
        (Some(ports), _) => {
            out.push("-p".to_string());
            out.push(ports.to_string());
        }
        (None, Some(n)) => {
            out.push("-top-ports".to_string());
            out.push(n.to_string());
        }
        (None, None) => {
            out.push("-top-ports".to_string());
            out.push(DEFAULT_TOP_PORTS.to_string());
        }
    }
    out
}

/// JSON `host`/`port`, or the plain `host:port` form naabu prints without `-json`.
pub fn parse_line(line: &str) -> Option<OpenPort> {
    match serde_json::from_str::<Value>(line) {
        Ok(v) => {
            let raw: RawNaabuLine = serde_json::from_value(v).ok()?;
            match (raw.host.filter(|h| !h.is_empty()), raw.port.filter(|p| *p > 0)) {
                (Some(host), Some(port)) => Some(OpenPort { host, port }),
                _ => None,
            }
        }
        Err(_) => {
            let caps = HOST_PORT.captures(line.trim())?;
            let port = caps[2].parse().ok()?;
            Some(OpenPort { host: caps[1].to_string(), port })
        }
    }
}

pub async fn run(paths: &ToolPaths, args: &NaabuArgs) -> ResultSet<OpenPort> {
    let cap = Capability::Naabu;
    let inv = ToolInvocation::new(cap.name(), paths.resolve(cap), build_args(args)).with_stdin(&args.hosts);
    run_tool(inv, parse_line).await
}
