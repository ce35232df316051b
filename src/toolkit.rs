use async_trait::async_trait;

use crate::analyze::nuclei::{self, NucleiArgs, Vulnerability};
use crate::discover::dnsx::{self, DnsxArgs, Resolution};
use crate::discover::subfinder::{self, Subdomain, SubfinderArgs};
use crate::external::ToolPaths;
use crate::gather::katana::{self, Endpoint, KatanaArgs};
use crate::probe::httpx::{self, HttpResponse, HttpxArgs};
use crate::probe::naabu::{self, NaabuArgs, OpenPort};
use crate::result::ResultSet;

/// The six capabilities as seen by the workflow and the gateway.
///
/// Implementations never fail: every outcome is encoded in the returned
/// [`ResultSet`].
#[async_trait]
pub trait Toolkit: Send + Sync {
    async fn subfinder(&self, args: &SubfinderArgs) -> ResultSet<Subdomain>;
    async fn dnsx(&self, args: &DnsxArgs) -> ResultSet<Resolution>;
    async fn naabu(&self, args: &NaabuArgs) -> ResultSet<OpenPort>;
    async fn httpx(&self, args: &HttpxArgs) -> ResultSet<HttpResponse>;
    async fn katana(&self, args: &KatanaArgs) -> ResultSet<Endpoint>;
    async fn nuclei(&self, args: &NucleiArgs) -> ResultSet<Vulnerability>;
}

/// Process-backed toolkit: one child process per call.
#[derive(Debug, Clone, Default)]
pub struct ProjectDiscovery {
    paths: ToolPaths,
}

impl ProjectDiscovery {
    pub fn new(paths: ToolPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ToolPaths {
        &self.paths
    }
}

#[async_trait]
impl Toolkit for ProjectDiscovery {
    async fn subfinder(&self, args: &SubfinderArgs) -> ResultSet<Subdomain> {
        subfinder::run(&self.paths, args).await
    }

    async fn dnsx(&self, args: &DnsxArgs) -> ResultSet<Resolution> {
        dnsx::run(&self.paths, args).await
    }

    async fn naabu(&self, args: &NaabuArgs) -> ResultSet<OpenPort> {
        naabu::run(&self.paths, args).await
    }

    async fn httpx(&self, args: &HttpxArgs) -> ResultSet<HttpResponse> {
        httpx::run(&self.paths, args).await
    }

    async fn katana(&self, args: &KatanaArgs) -> ResultSet<Endpoint> {
        katana::run(&self.paths, args).await
    }

    async fn nuclei(&self, args: &NucleiArgs) -> ResultSet<Vulnerability> {
        nuclei::run(&self.paths, args).await
    }
}
