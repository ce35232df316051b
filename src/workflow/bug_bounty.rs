use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;

use crate::analyze::nuclei::NucleiArgs;
use crate::batch::BatchProcessor;
use crate::config::WorkflowOptions;
use crate::discover::dnsx::DnsxArgs;
use crate::discover::subfinder::SubfinderArgs;
use crate::gather::katana::KatanaArgs;
use crate::probe::httpx::HttpxArgs;
use crate::probe::naabu::NaabuArgs;
use crate::result::ResultSet;
use crate::toolkit::Toolkit;
use crate::utils::panic_message;
use crate::workflow::steps::{Stage, StageRecord, Steps};
use crate::workflow::summary::WorkflowReport;

/// Run the six-stage reconnaissance chain against `domain`.
///
/// Never fails: a dead end at subdomain discovery, DNS resolution or HTTP
/// probing stops the run and returns the partial report, and a panic inside
/// a stage is logged and reported the same way.
pub async fn run_bug_bounty_workflow<T>(toolkit: &T, domain: &str, options: &WorkflowOptions) -> WorkflowReport
where
    T: Toolkit + ?Sized,
{
    let started = Instant::now();
    let mut steps = Steps::new();

    let outcome = AssertUnwindSafe(run_stages(toolkit, domain, options, &mut steps))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Some(stage)) => {
            tracing::warn!(domain, %stage, "workflow stopped early");
        }
        Ok(None) => {}
        Err(panic) => {
            let msg = panic_message(panic.as_ref());
            tracing::error!(domain, error = %msg, "workflow error");
        }
    }

    let report = WorkflowReport::new(domain, steps, started.elapsed());
    tracing::info!(domain, secs = report.summary.execution_time, "workflow completed");
    report
}

/// Returns the stage that ended the run early, if any.
async fn run_stages<T>(toolkit: &T, domain: &str, options: &WorkflowOptions, steps: &mut Steps) -> Option<Stage>
where
    T: Toolkit + ?Sized,
{
    let limits = &options.rate_limit;
    let batcher = BatchProcessor::from_config(limits);

    // Step 1: subdomain discovery
    tracing::info!(domain, "step 1: discovering subdomains");
    let subdomains = toolkit.subfinder(&SubfinderArgs::new(domain)).await;
    let dead_end = subdomains.is_dead_end();
    let names: Vec<String> = subdomains.entries().iter().map(|s| s.0.clone()).collect();
    steps.record(StageRecord::SubdomainDiscovery(subdomains));
    if dead_end {
        tracing::warn!("no subdomains found or error occurred");
        return Some(Stage::SubdomainDiscovery);
    }

    // Step 2: DNS resolution, batched
    tracing::info!(count = names.len(), "step 2: resolving domains");
    let parts = batcher
        .run(&names, |batch| async move { toolkit.dnsx(&DnsxArgs::new(batch)).await })
        .await;
    let resolved = ResultSet::merge(parts);
    let dead_end = resolved.is_dead_end();
    let hosts = unique(resolved.entries().iter().map(|r| r.domain.clone()));
    steps.record(StageRecord::DnsResolution(resolved));
    if dead_end {
        tracing::warn!("no domains resolved");
        return Some(Stage::DnsResolution);
    }

    // Step 3: port scanning (optional)
    if options.port_scan {
        tracing::info!(hosts = hosts.len(), top_ports = limits.max_top_ports, "step 3: scanning ports");
        let ports = toolkit.naabu(&NaabuArgs::top(hosts.clone(), limits.max_top_ports)).await;
        steps.record(StageRecord::PortScanning(ports));
    }

    // Step 4: HTTP probing, batched
    tracing::info!(hosts = hosts.len(), "step 4: probing HTTP services");
    let parts = batcher
        .run(&hosts, |batch| async move { toolkit.httpx(&HttpxArgs::new(batch, true)).await })
        .await;
    let probed = ResultSet::merge(parts);
    let dead_end = probed.is_dead_end();
    let live_urls: Vec<String> = probed
        .entries()
        .iter()
        .filter(|r| r.is_live())
        .map(|r| r.url.clone())
        .collect();
    steps.record(StageRecord::HttpProbing(probed));
    if dead_end {
        tracing::warn!("no live HTTP services found");
        return Some(Stage::HttpProbing);
    }

    // Step 5: crawling (optional)
    let crawl_urls = truncated(&live_urls, limits.max_crawl_urls);
    if options.crawl && !crawl_urls.is_empty() {
        tracing::info!(urls = crawl_urls.len(), depth = limits.crawl_depth, "step 5: crawling");
        let endpoints = toolkit.katana(&KatanaArgs::new(crawl_urls, limits.crawl_depth)).await;
        steps.record(StageRecord::WebCrawling(endpoints));
    }

    // Step 6: vulnerability scanning (optional)
    let scan_urls = truncated(&live_urls, limits.max_scan_urls);
    if options.vulnerability_scan && !scan_urls.is_empty() {
        tracing::info!(urls = scan_urls.len(), severity = ?options.severity_filter, "step 6: scanning for vulnerabilities");
        let vulns = toolkit
            .nuclei(&NucleiArgs::new(scan_urls, options.severity_filter.clone()))
            .await;
        steps.record(StageRecord::VulnerabilityScanning(vulns));
    }

    None
}

fn truncated(urls: &[String], max: usize) -> Vec<String> {
    urls.iter().take(max).cloned().collect()
}

fn unique(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = ahash::AHashSet::new();
    items.filter(|i| seen.insert(i.clone())).collect()
}
