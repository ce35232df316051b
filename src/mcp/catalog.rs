use serde::Serialize;
use serde_json::{json, Value};

/// Name of the composed workflow operation.
pub const WORKFLOW_TOOL: &str = "bug_bounty_workflow";

/// One entry of the static operation catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Names listed under the schema's `required` key.
    pub fn required(&self) -> Vec<&str> {
        self.input_schema["required"]
            .as_array()
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

fn string_array(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

pub fn catalog() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "subfinder",
            description: "Discover subdomains for a given domain using passive sources",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "domain": { "type": "string", "description": "Target domain (e.g., example.com)" },
                    "silent": { "type": "boolean", "description": "Show only subdomains in output" }
                },
                "required": ["domain"]
            }),
        },
        ToolDescriptor {
            name: "dnsx",
            description: "Resolve DNS records for domains and subdomains",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "domains": string_array("List of domains to resolve"),
                    "recordType": { "type": "string", "description": "DNS record type (A, AAAA, CNAME, etc.)" }
                },
                "required": ["domains"]
            }),
        },
        ToolDescriptor {
            name: "naabu",
            description: "Fast port scanner to discover open ports on hosts",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "hosts": string_array("List of hosts to scan"),
                    "ports": { "type": "string", "description": "Ports to scan (e.g., '80,443' or '1-1000')" },
                    "topPorts": { "type": "number", "description": "Scan top N ports" }
                },
                "required": ["hosts"]
            }),
        },
        ToolDescriptor {
            name: "httpx",
            description: "Probe HTTP/HTTPS servers and gather information",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "urls": string_array("List of URLs or hosts to probe"),
                    "followRedirects": { "type": "boolean", "description": "Follow HTTP redirects" },
                    "screenshot": { "type": "boolean", "description": "Take screenshots" }
                },
                "required": ["urls"]
            }),
        },
        ToolDescriptor {
            name: "katana",
            description: "Fast web crawler for discovering endpoints and paths",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "urls": string_array("List of URLs to crawl"),
                    "depth": { "type": "number", "description": "Crawl depth (default: 2)" },
                    "scope": { "type": "string", "description": "Crawl scope (e.g., regex pattern)" }
                },
                "required": ["urls"]
            }),
        },
        ToolDescriptor {
            name: "nuclei",
            description: "Fast vulnerability scanner using YAML-based templates",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "targets": string_array("List of targets to scan"),
                    "templates": string_array("Specific templates to use"),
                    "severity": string_array("Filter by severity (critical, high, medium, low, info)")
                },
                "required": ["targets"]
            }),
        },
        ToolDescriptor {
            name: WORKFLOW_TOOL,
            description: "Execute complete bug bounty reconnaissance workflow: subdomain discovery, DNS resolution, port scanning, HTTP probing, crawling, and vulnerability scanning",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "domain": { "type": "string", "description": "Target domain for bug bounty reconnaissance" },
                    "portScan": { "type": "boolean", "description": "Include port scanning (default: true)" },
                    "crawl": { "type": "boolean", "description": "Include web crawling (default: true)" },
                    "vulnerabilityScan": { "type": "boolean", "description": "Include vulnerability scanning (default: true)" },
                    "severityFilter": string_array("Nuclei severity filter (critical, high, medium, low)"),
                    "maxCrawlUrls": { "type": "number", "description": "Maximum URLs to crawl (default: 10)" },
                    "maxScanUrls": { "type": "number", "description": "Maximum URLs to scan with Nuclei (default: 20)" },
                    "maxTopPorts": { "type": "number", "description": "Maximum top ports for Naabu (default: 100)" },
                    "batchSize": { "type": "number", "description": "Batch size for DNS/HTTP requests (default: 50)" },
                    "delayBetweenBatches": { "type": "number", "description": "Delay in milliseconds between batches (default: 1000)" },
                    "crawlDepth": { "type": "number", "description": "Crawl depth for Katana (default: 2)" }
                },
                "required": ["domain"]
            }),
        },
    ]
}
