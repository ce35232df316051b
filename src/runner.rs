use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, Commands};
use pd_recon::config::{RateLimitConfig, WorkflowArgs};
use pd_recon::external::{Capability, ToolPaths};
use pd_recon::mcp::{Gateway, McpServer, WORKFLOW_TOOL};
use pd_recon::{ProjectDiscovery, Toolkit};

pub async fn run_from_cli(cli: Cli) -> anyhow::Result<()> {
    // Logs go to stderr: stdout carries protocol messages and JSON results.
    use tracing_subscriber::EnvFilter;
    let crate_level = if cli.debug { "debug" } else if cli.verbose { "info" } else { "warn" };
    let filter_str = format!("pd_recon={}", crate_level);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&filter_str))
        .unwrap_or_else(|_| EnvFilter::new(crate_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();

    let paths = ToolPaths::from_specs(&cli.tool_paths).map_err(anyhow::Error::msg)?;
    let toolkit = Arc::new(ProjectDiscovery::new(paths));
    let gateway = Gateway::new(toolkit.clone());

    match cli.command {
        Commands::Serve => {
            McpServer::new(gateway).run_stdio().await.context("MCP server I/O failed")?;
        }
        Commands::Tools => {
            for tool in gateway.list_tools() {
                let status = match tool.name.parse::<Capability>() {
                    Ok(cap) if toolkit.paths().is_installed(cap) => {
                        format!("installed ({})", toolkit.paths().resolve(cap).display())
                    }
                    Ok(_) => "missing".to_string(),
                    Err(_) if tool.name == WORKFLOW_TOOL => "workflow".to_string(),
                    Err(_) => "-".to_string(),
                };
                println!("{:<20} {:<40} {}", tool.name, status, tool.description);
            }
        }
        Commands::Call { name, args } => {
            println!("{}", call_once(&gateway, &name, &args).await?);
        }
        Commands::Workflow {
            domain,
            no_port_scan,
            no_crawl,
            no_vuln_scan,
            severity,
            max_crawl_urls,
            max_scan_urls,
            max_top_ports,
            batch_size,
            delay_between_batches,
            crawl_depth,
            text,
        } => {
            let mut limits = RateLimitConfig::default();
            if let Some(n) = max_crawl_urls {
                limits.max_crawl_urls = n;
            }
            if let Some(n) = max_scan_urls {
                limits.max_scan_urls = n;
            }
            if let Some(n) = max_top_ports {
                limits.max_top_ports = n;
            }
            if let Some(n) = batch_size {
                limits.batch_size = n;
            }
            if let Some(ms) = delay_between_batches {
                limits.delay_between_batches = ms;
            }
            if let Some(d) = crawl_depth {
                limits.crawl_depth = d;
            }
            let args = WorkflowArgs {
                domain: pd_recon::utils::normalize_domain(&domain),
                port_scan: Some(!no_port_scan),
                crawl: Some(!no_crawl),
                vulnerability_scan: Some(!no_vuln_scan),
                severity_filter: Some(severity),
                rate_limit: limits,
            };
            let (domain, options) = args.into_parts();
            tracing::info!(domain = %domain, ?options, "Starting workflow");

            let report = pd_recon::workflow::run_bug_bounty_workflow(toolkit.as_ref(), &domain, &options).await;
            if text {
                println!("{}", pd_recon::output::render_summary(&report));
            } else {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
    }
    Ok(())
}

/// Invoke one operation; an error envelope becomes an `Err` so `main` exits non-zero.
async fn call_once<T: Toolkit + ?Sized>(gateway: &Gateway<T>, name: &str, args: &str) -> anyhow::Result<String> {
    let arguments: serde_json::Value =
        serde_json::from_str(args).with_context(|| format!("--args is not valid JSON: {}", args))?;
    let envelope = gateway.call(name, arguments).await;
    if envelope.is_error {
        anyhow::bail!(envelope.payload);
    }
    Ok(envelope.payload)
}
