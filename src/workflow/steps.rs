use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::analyze::nuclei::Vulnerability;
use crate::discover::dnsx::Resolution;
use crate::discover::subfinder::Subdomain;
use crate::gather::katana::Endpoint;
use crate::probe::httpx::HttpResponse;
use crate::probe::naabu::OpenPort;
use crate::result::ResultSet;

/// The six workflow stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    SubdomainDiscovery,
    DnsResolution,
    PortScanning,
    HttpProbing,
    WebCrawling,
    VulnerabilityScanning,
}

impl Stage {
    pub fn key(&self) -> &'static str {
        match self {
            Stage::SubdomainDiscovery => "subdomainDiscovery",
            Stage::DnsResolution => "dnsResolution",
            Stage::PortScanning => "portScanning",
            Stage::HttpProbing => "httpProbing",
            Stage::WebCrawling => "webCrawling",
            Stage::VulnerabilityScanning => "vulnerabilityScanning",
        }
    }

    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Result of one completed stage.
#[derive(Debug, Clone, PartialEq)]
pub enum StageRecord {
    SubdomainDiscovery(ResultSet<Subdomain>),
    DnsResolution(ResultSet<Resolution>),
    PortScanning(ResultSet<OpenPort>),
    HttpProbing(ResultSet<HttpResponse>),
    WebCrawling(ResultSet<Endpoint>),
    VulnerabilityScanning(ResultSet<Vulnerability>),
}

impl StageRecord {
    pub fn stage(&self) -> Stage {
        match self {
            StageRecord::SubdomainDiscovery(_) => Stage::SubdomainDiscovery,
            StageRecord::DnsResolution(_) => Stage::DnsResolution,
            StageRecord::PortScanning(_) => Stage::PortScanning,
            StageRecord::HttpProbing(_) => Stage::HttpProbing,
            StageRecord::WebCrawling(_) => Stage::WebCrawling,
            StageRecord::VulnerabilityScanning(_) => Stage::VulnerabilityScanning,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            StageRecord::SubdomainDiscovery(r) => r.count(),
            StageRecord::DnsResolution(r) => r.count(),
            StageRecord::PortScanning(r) => r.count(),
            StageRecord::HttpProbing(r) => r.count(),
            StageRecord::WebCrawling(r) => r.count(),
            StageRecord::VulnerabilityScanning(r) => r.count(),
        }
    }

    pub fn error(&self) -> Option<String> {
        match self {
            StageRecord::SubdomainDiscovery(r) => r.error(),
            StageRecord::DnsResolution(r) => r.error(),
            StageRecord::PortScanning(r) => r.error(),
            StageRecord::HttpProbing(r) => r.error(),
            StageRecord::WebCrawling(r) => r.error(),
            StageRecord::VulnerabilityScanning(r) => r.error(),
        }
    }
}

impl Serialize for StageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StageRecord::SubdomainDiscovery(r) => r.serialize(serializer),
            StageRecord::DnsResolution(r) => r.serialize(serializer),
            StageRecord::PortScanning(r) => r.serialize(serializer),
            StageRecord::HttpProbing(r) => r.serialize(serializer),
            StageRecord::WebCrawling(r) => r.serialize(serializer),
            StageRecord::VulnerabilityScanning(r) => r.serialize(serializer),
        }
    }
}

/// Completed stages, at most one record per stage. Records are append-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Steps {
    records: Vec<StageRecord>,
}

impl Steps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a finished stage. A stage already recorded keeps its first record.
    pub fn record(&mut self, record: StageRecord) {
        let stage = record.stage();
        if self.get(stage).is_some() {
            tracing::warn!(%stage, "stage already recorded, ignoring");
            return;
        }
        self.records.push(record);
    }

    pub fn get(&self, stage: Stage) -> Option<&StageRecord> {
        self.records.iter().find(|r| r.stage() == stage)
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.get(stage).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn subdomains(&self) -> Option<&ResultSet<Subdomain>> {
        match self.get(Stage::SubdomainDiscovery) {
            Some(StageRecord::SubdomainDiscovery(r)) => Some(r),
            _ => None,
        }
    }

    pub fn resolutions(&self) -> Option<&ResultSet<Resolution>> {
        match self.get(Stage::DnsResolution) {
            Some(StageRecord::DnsResolution(r)) => Some(r),
            _ => None,
        }
    }

    pub fn open_ports(&self) -> Option<&ResultSet<OpenPort>> {
        match self.get(Stage::PortScanning) {
            Some(StageRecord::PortScanning(r)) => Some(r),
            _ => None,
        }
    }

    pub fn http_responses(&self) -> Option<&ResultSet<HttpResponse>> {
        match self.get(Stage::HttpProbing) {
            Some(StageRecord::HttpProbing(r)) => Some(r),
            _ => None,
        }
    }

    pub fn endpoints(&self) -> Option<&ResultSet<Endpoint>> {
        match self.get(Stage::WebCrawling) {
            Some(StageRecord::WebCrawling(r)) => Some(r),
            _ => None,
        }
    }

    pub fn vulnerabilities(&self) -> Option<&ResultSet<Vulnerability>> {
        match self.get(Stage::VulnerabilityScanning) {
            Some(StageRecord::VulnerabilityScanning(r)) => Some(r),
            _ => None,
        }
    }
}

impl Serialize for Steps {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(record.stage().key(), record)?;
        }
        map.end()
    }
}
