use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::analyze::nuclei::NucleiArgs;
use crate::config::WorkflowArgs;
use crate::discover::dnsx::DnsxArgs;
use crate::discover::subfinder::SubfinderArgs;
use crate::error::{GatewayError, Result};
use crate::gather::katana::KatanaArgs;
use crate::mcp::catalog::{catalog, ToolDescriptor, WORKFLOW_TOOL};
use crate::probe::httpx::HttpxArgs;
use crate::probe::naabu::NaabuArgs;
use crate::toolkit::Toolkit;
use crate::utils::panic_message;
use crate::workflow::run_bug_bounty_workflow;

/// Uniform reply to every invocation: one text payload plus an error flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub payload: String,
    pub is_error: bool,
}

impl Envelope {
    pub fn ok(payload: String) -> Self {
        Self { payload, is_error: false }
    }

    pub fn error(tool: &str, err: &GatewayError) -> Self {
        Self { payload: format!("Error executing {}: {}", tool, err), is_error: true }
    }

    /// MCP `tools/call` result shape.
    pub fn to_content(&self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.payload }],
            "isError": self.is_error
        })
    }
}

/// Dispatches named operations to a [`Toolkit`] or the workflow.
pub struct Gateway<T: ?Sized> {
    toolkit: Arc<T>,
}

impl<T: ?Sized> Clone for Gateway<T> {
    fn clone(&self) -> Self {
        Self { toolkit: self.toolkit.clone() }
    }
}

impl<T: Toolkit + ?Sized> Gateway<T> {
    pub fn new(toolkit: Arc<T>) -> Self {
        Self { toolkit }
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        catalog()
    }

    /// Invoke `name` with `arguments`. Never fails and never panics outward.
    pub async fn call(&self, name: &str, arguments: Value) -> Envelope {
        let outcome = AssertUnwindSafe(self.dispatch(name, arguments)).catch_unwind().await;
        match outcome {
            Ok(Ok(payload)) => Envelope::ok(payload),
            Ok(Err(e)) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                Envelope::error(name, &e)
            }
            Err(panic) => {
                let e = GatewayError::Unexpected(panic_message(panic.as_ref()));
                tracing::error!(tool = name, error = %e, "tool call panicked");
                Envelope::error(name, &e)
            }
        }
    }

    /// Run the operation and return its pretty-printed JSON result.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<String> {
        let arguments = if arguments.is_null() { json!({}) } else { arguments };
        tracing::info!(tool = name, "tool call");
        match name {
            "subfinder" => {
                let args: SubfinderArgs = parse_args(name, arguments)?;
                render(&self.toolkit.subfinder(&args).await)
            }
            "dnsx" => {
                let args: DnsxArgs = parse_args(name, arguments)?;
                render(&self.toolkit.dnsx(&args).await)
            }
            "naabu" => {
                let args: NaabuArgs = parse_args(name, arguments)?;
                render(&self.toolkit.naabu(&args).await)
            }
            "httpx" => {
                let args: HttpxArgs = parse_args(name, arguments)?;
                render(&self.toolkit.httpx(&args).await)
            }
            "katana" => {
                let args: KatanaArgs = parse_args(name, arguments)?;
                render(&self.toolkit.katana(&args).await)
            }
            "nuclei" => {
                let args: NucleiArgs = parse_args(name, arguments)?;
                render(&self.toolkit.nuclei(&args).await)
            }
            WORKFLOW_TOOL => {
                let args: WorkflowArgs = parse_args(name, arguments)?;
                let (domain, options) = args.into_parts();
                render(&run_bug_bounty_workflow(&*self.toolkit, &domain, &options).await)
            }
            other => Err(GatewayError::UnknownTool(other.to_string())),
        }
    }
}

fn parse_args<A: DeserializeOwned>(tool: &str, arguments: Value) -> Result<A> {
    serde_json::from_value(arguments).map_err(|source| GatewayError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

fn render<S: Serialize>(value: &S) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
