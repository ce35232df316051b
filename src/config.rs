use std::time::Duration;

use serde::Deserialize;

use crate::analyze::nuclei::DEFAULT_SEVERITY_FILTER;

/// Volume limits applied by the workflow. Resolved once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitConfig {
    pub max_crawl_urls: usize,
    pub max_scan_urls: usize,
    pub max_top_ports: u32,
    pub batch_size: usize,
    /// Milliseconds.
    pub delay_between_batches: u64,
    pub crawl_depth: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_crawl_urls: 10,
            max_scan_urls: 20,
            max_top_ports: 100,
            batch_size: 50,
            delay_between_batches: 1000,
            crawl_depth: 2,
        }
    }
}

impl RateLimitConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_batches)
    }
}

/// Everything a workflow run needs besides the domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOptions {
    pub port_scan: bool,
    pub crawl: bool,
    pub vulnerability_scan: bool,
    pub severity_filter: Vec<String>,
    pub rate_limit: RateLimitConfig,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            port_scan: true,
            crawl: true,
            vulnerability_scan: true,
            severity_filter: default_severity_filter(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

pub fn default_severity_filter() -> Vec<String> {
    DEFAULT_SEVERITY_FILTER.iter().map(|s| s.to_string()).collect()
}

/// Arguments of the `bug_bounty_workflow` operation; every field but the
/// domain is optional and falls back to [`WorkflowOptions::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowArgs {
    pub domain: String,
    #[serde(default)]
    pub port_scan: Option<bool>,
    #[serde(default)]
    pub crawl: Option<bool>,
    #[serde(default)]
    pub vulnerability_scan: Option<bool>,
    #[serde(default)]
    pub severity_filter: Option<Vec<String>>,
    #[serde(flatten)]
    pub rate_limit: RateLimitConfig,
}

impl WorkflowArgs {
    pub fn into_parts(self) -> (String, WorkflowOptions) {
        let d = WorkflowOptions::default();
        let options = WorkflowOptions {
            port_scan: self.port_scan.unwrap_or(d.port_scan),
            crawl: self.crawl.unwrap_or(d.crawl),
            vulnerability_scan: self.vulnerability_scan.unwrap_or(d.vulnerability_scan),
            severity_filter: self
                .severity_filter
                .filter(|s| !s.is_empty())
                .unwrap_or(d.severity_filter),
            rate_limit: RateLimitConfig { batch_size: self.rate_limit.batch_size.max(1), ..self.rate_limit },
        };
        (self.domain, options)
    }
}
