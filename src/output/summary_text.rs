use crate::analyze::nuclei::Severity;
use crate::workflow::{Stage, WorkflowReport};

/// Plain-text rendering of a workflow report for terminal use.
pub fn render_summary(report: &WorkflowReport) -> String {
    let s = &report.summary;
    let mut lines = vec![
        format!("[>] Target: {}", s.domain),
        format!("[*] Subdomains:     {}", s.total_subdomains),
        format!("[*] Resolved hosts: {}", s.total_resolved_hosts),
        format!("[*] Open ports:     {}", s.total_open_ports),
        format!("[*] Live hosts:     {}", s.total_live_hosts),
        format!("[*] Endpoints:      {}", s.total_endpoints),
        format!(
            "[*] Findings:       {} (critical: {}, high: {})",
            s.total_vulnerabilities, s.critical_findings, s.high_findings
        ),
    ];

    for record in report.steps.iter() {
        if let Some(err) = record.error() {
            lines.push(format!("[-] {} (step {}): {}", record.stage(), record.stage().number(), err.trim()));
        }
    }
    if !report.steps.contains(Stage::HttpProbing) || report.steps.http_responses().is_some_and(|r| r.is_dead_end()) {
        lines.push("[·] Workflow stopped before crawling and scanning".to_string());
    }

    let mut findings: Vec<_> = report.findings.iter().collect();
    findings.sort_by_key(|v| v.severity().unwrap_or(Severity::Info));
    for v in findings.iter().take(10) {
        let label = v.severity().map(|s| s.label().to_uppercase()).unwrap_or_else(|| "UNKNOWN".into());
        let target = v.matched.as_deref().or(v.host.as_deref()).unwrap_or("-");
        lines.push(format!("[!] {} {} - {}", label, v.info.name, target));
    }

    lines.push(format!("[~] Completed in {}s", s.execution_time));
    lines.join("\n")
}
