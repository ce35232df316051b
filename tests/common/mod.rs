#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use pd_recon::analyze::nuclei::{NucleiArgs, Vulnerability, VulnerabilityInfo};
use pd_recon::discover::dnsx::{DnsxArgs, Resolution};
use pd_recon::discover::subfinder::{Subdomain, SubfinderArgs};
use pd_recon::gather::katana::{Endpoint, KatanaArgs};
use pd_recon::probe::httpx::{HttpResponse, HttpxArgs};
use pd_recon::probe::naabu::{NaabuArgs, OpenPort};
use pd_recon::result::ExitReport;
use pd_recon::{ResultSet, Toolkit};

/// In-memory toolkit with canned results; records every call it receives.
pub struct ScriptedToolkit {
    pub subdomains: ResultSet<Subdomain>,
    pub resolved: ResultSet<Resolution>,
    pub ports: ResultSet<OpenPort>,
    pub responses: ResultSet<HttpResponse>,
    pub endpoints: ResultSet<Endpoint>,
    pub vulns: ResultSet<Vulnerability>,
    pub panic_on_crawl: bool,
    pub calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedToolkit {
    /// Two subdomains, both resolved and live, three endpoints, one high finding.
    pub fn example() -> Self {
        Self {
            subdomains: ResultSet::ok(vec![sub("a.example.com"), sub("b.example.com")]),
            resolved: ResultSet::ok(vec![res("a.example.com", "93.184.216.34"), res("b.example.com", "93.184.216.35")]),
            ports: ResultSet::ok(vec![OpenPort { host: "a.example.com".into(), port: 443 }]),
            responses: ResultSet::ok(vec![live("https://a.example.com", 200), live("https://b.example.com", 200)]),
            endpoints: ResultSet::ok(vec![
                Endpoint("https://a.example.com/login".into()),
                Endpoint("https://a.example.com/api".into()),
                Endpoint("https://b.example.com/".into()),
            ]),
            vulns: ResultSet::ok(vec![vuln("high")]),
            panic_on_crawl: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, tool: &str) -> Vec<Vec<String>> {
        self.calls().into_iter().filter(|(t, _)| t == tool).map(|(_, i)| i).collect()
    }

    fn log(&self, tool: &str, inputs: &[String]) {
        self.calls.lock().unwrap().push((tool.to_string(), inputs.to_vec()));
    }
}

#[async_trait]
impl Toolkit for ScriptedToolkit {
    async fn subfinder(&self, args: &SubfinderArgs) -> ResultSet<Subdomain> {
        self.log("subfinder", &[args.domain.clone()]);
        self.subdomains.clone()
    }

    async fn dnsx(&self, args: &DnsxArgs) -> ResultSet<Resolution> {
        self.log("dnsx", &args.domains);
        let entries: Vec<Resolution> = self
            .resolved
            .entries()
            .iter()
            .filter(|r| args.domains.contains(&r.domain))
            .cloned()
            .collect();
        if entries.is_empty() && self.resolved.is_error() {
            return self.resolved.clone();
        }
        ResultSet::ok(entries)
    }

    async fn naabu(&self, args: &NaabuArgs) -> ResultSet<OpenPort> {
        let mut inputs = args.hosts.clone();
        inputs.push(format!("top-ports={}", args.top_ports.unwrap_or_default()));
        self.log("naabu", &inputs);
        self.ports.clone()
    }

    async fn httpx(&self, args: &HttpxArgs) -> ResultSet<HttpResponse> {
        self.log("httpx", &args.urls);
        let entries: Vec<HttpResponse> = self
            .responses
            .entries()
            .iter()
            .filter(|r| args.urls.iter().any(|u| r.url.contains(u.as_str())))
            .cloned()
            .collect();
        if entries.is_empty() && self.responses.is_error() {
            return self.responses.clone();
        }
        ResultSet::ok(entries)
    }

    async fn katana(&self, args: &KatanaArgs) -> ResultSet<Endpoint> {
        let mut inputs = args.urls.clone();
        inputs.push(format!("depth={}", args.depth.unwrap_or_default()));
        self.log("katana", &inputs);
        if self.panic_on_crawl {
            panic!("crawler exploded");
        }
        self.endpoints.clone()
    }

    async fn nuclei(&self, args: &NucleiArgs) -> ResultSet<Vulnerability> {
        let mut inputs = args.targets.clone();
        inputs.push(format!("severity={}", args.severity.clone().unwrap_or_default().join(",")));
        self.log("nuclei", &inputs);
        self.vulns.clone()
    }
}

pub fn sub(s: &str) -> Subdomain {
    Subdomain(s.to_string())
}

pub fn res(domain: &str, ip: &str) -> Resolution {
    Resolution { domain: domain.into(), ip: ip.into(), record_type: Some("A".into()) }
}

pub fn live(url: &str, status: u16) -> HttpResponse {
    HttpResponse {
        url: url.into(),
        status_code: Some(status),
        content_length: Some(1256),
        title: Some("Example Domain".into()),
        webserver: Some("nginx".into()),
    }
}

pub fn vuln(severity: &str) -> Vulnerability {
    Vulnerability {
        template: Some("http/misconfiguration/x.yaml".into()),
        template_id: Some("x".into()),
        info: VulnerabilityInfo { name: "Finding".into(), severity: severity.into(), description: None },
        matcher_name: None,
        kind: "http".into(),
        host: Some("https://a.example.com".into()),
        matched: Some("https://a.example.com/x".into()),
    }
}

pub fn exit_failure<T>(tool: &str, code: i32) -> ResultSet<T> {
    ResultSet::complete(tool, Vec::new(), ExitReport { code: Some(code), stderr: "fatal".into() })
}
