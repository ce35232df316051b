use std::fmt;

use serde::{Deserialize, Serialize};

use crate::external::{run_tool, Capability, ToolInvocation, ToolPaths};
use crate::result::{Record, ResultSet};

/// Severity filter used by the workflow when none is given.
pub const DEFAULT_SEVERITY_FILTER: [&str; 3] = ["critical", "high", "medium"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Case-insensitive; unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NucleiArgs {
    /// List of targets to scan
    pub targets: Vec<String>,
    /// Specific templates to use
    #[serde(default)]
    pub templates: Option<Vec<String>>,
    /// Filter by severity (critical, high, medium, low, info)
    #[serde(default)]
    pub severity: Option<Vec<String>>,
}

impl NucleiArgs {
    pub fn new(targets: Vec<String>, severity: Vec<String>) -> Self {
        Self { targets, templates: None, severity: Some(severity) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VulnerabilityInfo {
    pub name: String,
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(rename = "templateID", skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub info: VulnerabilityInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matcher_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

impl Vulnerability {
    pub fn severity(&self) -> Option<Severity> {
        Severity::parse(&self.info.severity)
    }
}

impl Record for Vulnerability {
    const FIELD: &'static str = "vulnerabilities";
}

#[derive(Debug, Deserialize)]
struct RawNucleiLine {
    #[serde(rename = "template")]
    template: Option<String>,
    #[serde(rename = "template-id")]
    template_id: Option<String>,
    #[serde(rename = "templateID")]
    template_id_legacy: Option<String>,
    #[serde(rename = "info")]
    info: Option<RawNucleiInfo>,
    #[serde(rename = "matcher-name")]
    matcher_name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(rename = "host")]
    host: Option<String>,
    #[serde(rename = "matched")]
    matched: Option<String>,
    #[serde(rename = "matched-at")]
    matched_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNucleiInfo {
    #[serde(rename = "name")]
    name: Option<String>,
    #[serde(rename = "severity")]
    severity: Option<String>,
    #[serde(rename = "description")]
    description: Option<String>,
}

pub fn build_args(args: &NucleiArgs) -> Vec<String> {
    let mut out = vec!["-json".to_string()];
    if let Some(templates) = args.templates.as_ref().filter(|t| !t.is_empty()) {
        out.push("-t".to_string());
        out.push(templates.join(","));
    }
    if let Some(severity) = args.severity.as_ref().filter(|s| !s.is_empty()) {
        out.push("-s".to_string());
        out.push(severity.join(","));
    }
    out
}

/// A finding needs both `info` and `type`; everything else is optional.
pub fn parse_line(line: &str) -> Option<Vulnerability> {
    let raw: RawNucleiLine = serde_json::from_str(line).ok()?;
    let info = raw.info?;
    let kind = raw.kind.filter(|k| !k.is_empty())?;
    Some(Vulnerability {
        template: raw.template,
        template_id: raw.template_id.or(raw.template_id_legacy),
        info: VulnerabilityInfo {
            name: info.name.unwrap_or_default(),
            severity: info.severity.unwrap_or_default(),
            description: info.description,
        },
        matcher_name: raw.matcher_name,
        kind,
        host: raw.host,
        matched: raw.matched.or(raw.matched_at),
    })
}

pub async fn run(paths: &ToolPaths, args: &NucleiArgs) -> ResultSet<Vulnerability> {
    let cap = Capability::Nuclei;
    let inv = ToolInvocation::new(cap.name(), paths.resolve(cap), build_args(args)).with_stdin(&args.targets);
    run_tool(inv, parse_line).await
}
