use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::external::{run_tool, Capability, ToolInvocation, ToolPaths};
use crate::result::{Record, ResultSet};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsxArgs {
    /// List of domains to resolve
    pub domains: Vec<String>,
    /// DNS record type (A, AAAA, CNAME, ...); A when omitted
    #[serde(default)]
    pub record_type: Option<String>,
}

impl DnsxArgs {
    pub fn new(domains: Vec<String>) -> Self {
        Self { domains, record_type: None }
    }

    fn answer_field(&self) -> String {
        self.record_type
            .as_deref()
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "a".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Resolution {
    pub domain: String,
    pub ip: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
}

impl Record for Resolution {
    const FIELD: &'static str = "resolved";
}

/// One dnsx JSON line: `host` plus one array per queried record type.
#[derive(Debug, Deserialize)]
struct RawDnsxLine {
    #[serde(rename = "host")]
    host: Option<String>,
    #[serde(flatten)]
    answers: HashMap<String, Value>,
}

pub fn build_args(args: &DnsxArgs) -> Vec<String> {
    let mut out = vec!["-json".to_string()];
    if args.record_type.is_some() {
        out.push(format!("-{}", args.answer_field()));
    }
    out
}

/// Map one line to the addresses it answers for `field` (`a`, `aaaa`, ...).
pub fn parse_line(line: &str, field: &str) -> Option<Vec<Resolution>> {
    let raw: RawDnsxLine = serde_json::from_str(line).ok()?;
    let host = raw.host.filter(|h| !h.is_empty())?;
    let answers = raw.answers.get(field)?.as_array()?;
    let record_type = field.to_ascii_uppercase();
    let out: Vec<Resolution> = answers
        .iter()
        .filter_map(|v| v.as_str())
        .map(|ip| Resolution {
            domain: host.clone(),
            ip: ip.to_string(),
            record_type: Some(record_type.clone()),
        })
        .collect();
    if out.is_empty() { None } else { Some(out) }
}

pub async fn run(paths: &ToolPaths, args: &DnsxArgs) -> ResultSet<Resolution> {
    let cap = Capability::Dnsx;
    let field = args.answer_field();
    let inv = ToolInvocation::new(cap.name(), paths.resolve(cap), build_args(args)).with_stdin(&args.domains);
    run_tool(inv, |line| parse_line(line, &field).unwrap_or_default()).await
}
