use std::time::Duration;

use serde::Serialize;

use crate::analyze::nuclei::{Severity, Vulnerability};
use crate::workflow::steps::Steps;

/// Aggregate counts of one workflow run. Always derived from [`Steps`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSummary {
    pub domain: String,
    pub total_subdomains: usize,
    pub total_resolved_hosts: usize,
    pub total_open_ports: usize,
    pub total_live_hosts: usize,
    pub total_endpoints: usize,
    pub total_vulnerabilities: usize,
    pub critical_findings: usize,
    pub high_findings: usize,
    /// Wall-clock seconds, rounded.
    pub execution_time: u64,
}

impl WorkflowSummary {
    pub fn derive(domain: &str, steps: &Steps, elapsed: Duration) -> Self {
        let vulns: &[Vulnerability] = steps.vulnerabilities().map(|r| r.entries()).unwrap_or_default();
        Self {
            domain: domain.to_string(),
            total_subdomains: steps.subdomains().map_or(0, |r| r.count()),
            total_resolved_hosts: steps.resolutions().map_or(0, |r| r.count()),
            total_open_ports: steps.open_ports().map_or(0, |r| r.count()),
            total_live_hosts: steps.http_responses().map_or(0, |r| r.count()),
            total_endpoints: steps.endpoints().map_or(0, |r| r.count()),
            total_vulnerabilities: vulns.len(),
            critical_findings: count_severity(vulns, Severity::Critical),
            high_findings: count_severity(vulns, Severity::High),
            execution_time: round_secs(elapsed),
        }
    }
}

pub fn count_severity(vulns: &[Vulnerability], severity: Severity) -> usize {
    vulns.iter().filter(|v| v.severity() == Some(severity)).count()
}

fn round_secs(elapsed: Duration) -> u64 {
    elapsed.as_secs_f64().round() as u64
}

/// Full workflow output: summary, per-stage raw results and the findings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowReport {
    pub summary: WorkflowSummary,
    pub steps: Steps,
    pub findings: Vec<Vulnerability>,
}

impl WorkflowReport {
    pub fn new(domain: &str, steps: Steps, elapsed: Duration) -> Self {
        let summary = WorkflowSummary::derive(domain, &steps, elapsed);
        let findings = steps
            .vulnerabilities()
            .map(|r| r.entries().to_vec())
            .unwrap_or_default();
        Self { summary, steps, findings }
    }
}
