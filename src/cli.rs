use clap::Parser;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable detailed debug logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Enable verbose logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Override a tool binary, e.g. --tool-path httpx=/opt/pd/httpx (repeatable)
    #[arg(long = "tool-path", value_name = "NAME=PATH", global = true)]
    pub tool_paths: Vec<String>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Serve the tools over MCP (JSON-RPC on stdin/stdout)
    Serve,

    /// List the available tools and whether their binaries are installed
    Tools,

    /// Invoke one tool by name and print its JSON result
    Call {
        /// Tool name (subfinder, dnsx, naabu, httpx, katana, nuclei, bug_bounty_workflow)
        name: String,

        /// Arguments as a JSON object, e.g. '{"domain":"example.com"}'
        #[arg(short = 'a', long, default_value = "{}")]
        args: String,
    },

    /// Run the full reconnaissance workflow against a domain
    Workflow {
        /// Target domain (e.g. example.com); URLs are reduced to their host
        domain: String,

        /// Skip port scanning
        #[arg(long, default_value_t = false)]
        no_port_scan: bool,

        /// Skip web crawling
        #[arg(long, default_value_t = false)]
        no_crawl: bool,

        /// Skip vulnerability scanning
        #[arg(long, default_value_t = false)]
        no_vuln_scan: bool,

        /// Nuclei severity filter (repeatable; default: critical, high, medium)
        #[arg(short = 's', long = "severity")]
        severity: Vec<String>,

        /// Maximum URLs to crawl (default: 10)
        #[arg(long)]
        max_crawl_urls: Option<usize>,

        /// Maximum URLs to scan with nuclei (default: 20)
        #[arg(long)]
        max_scan_urls: Option<usize>,

        /// Top ports for naabu (default: 100)
        #[arg(long)]
        max_top_ports: Option<u32>,

        /// Batch size for DNS/HTTP requests (default: 50)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Delay in milliseconds between batches (default: 1000)
        #[arg(long)]
        delay_between_batches: Option<u64>,

        /// Crawl depth for katana (default: 2)
        #[arg(long)]
        crawl_depth: Option<u32>,

        /// Print a plain-text summary instead of JSON
        #[arg(long, default_value_t = false)]
        text: bool,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
