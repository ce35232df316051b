use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use which::which;

/// The six external scanning capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Subfinder,
    Dnsx,
    Naabu,
    Httpx,
    Katana,
    Nuclei,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Subfinder,
        Capability::Dnsx,
        Capability::Naabu,
        Capability::Httpx,
        Capability::Katana,
        Capability::Nuclei,
    ];

    /// Operation name and default binary name; both are the same.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Subfinder => "subfinder",
            Capability::Dnsx => "dnsx",
            Capability::Naabu => "naabu",
            Capability::Httpx => "httpx",
            Capability::Katana => "katana",
            Capability::Nuclei => "nuclei",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown tool '{}'", s))
    }
}

/// Where each tool binary lives. Explicit overrides win; otherwise the Go
/// bin directory (for httpx), then `PATH`, then the bare name.
#[derive(Debug, Clone, Default)]
pub struct ToolPaths {
    overrides: HashMap<Capability, PathBuf>,
}

impl ToolPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, cap: Capability, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(cap, path.into());
        self
    }

    /// Parse `NAME=PATH` pairs as given on the command line.
    pub fn from_specs<S: AsRef<str>>(specs: &[S]) -> Result<Self, String> {
        let mut paths = Self::new();
        for spec in specs {
            let spec = spec.as_ref();
            let (name, path) = spec
                .split_once('=')
                .ok_or_else(|| format!("expected NAME=PATH, got '{}'", spec))?;
            let cap: Capability = name.trim().parse()?;
            paths.overrides.insert(cap, PathBuf::from(path.trim()));
        }
        Ok(paths)
    }

    pub fn resolve(&self, cap: Capability) -> PathBuf {
        if let Some(p) = self.overrides.get(&cap) {
            return p.clone();
        }
        // A Python package also ships an `httpx` entrypoint; prefer the Go build.
        if cap == Capability::Httpx {
            if let Some(p) = go_bin_dirs().into_iter().map(|d| d.join("httpx")).find(|p| p.is_file()) {
                return p;
            }
        }
        which(cap.name()).unwrap_or_else(|_| PathBuf::from(cap.name()))
    }

    /// Whether the binary resolves to an existing file.
    pub fn is_installed(&self, cap: Capability) -> bool {
        let p = self.resolve(cap);
        p.is_file() || which(&p).is_ok()
    }
}

fn go_bin_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(gopath) = std::env::var("GOPATH") {
        dirs.push(PathBuf::from(gopath).join("bin"));
    }
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(PathBuf::from(home).join("go").join("bin"));
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_names_round_trip() {
        for cap in Capability::ALL {
            assert_eq!(cap.name().parse::<Capability>().unwrap(), cap);
        }
        assert!("nmap".parse::<Capability>().is_err());
    }

    #[test]
    fn override_wins() {
        let paths = ToolPaths::from_specs(&["nuclei=/opt/nuclei/bin/nuclei"]).unwrap();
        assert_eq!(paths.resolve(Capability::Nuclei), PathBuf::from("/opt/nuclei/bin/nuclei"));
    }

    #[test]
    fn malformed_spec_is_rejected() {
        assert!(ToolPaths::from_specs(&["nuclei"]).is_err());
        assert!(ToolPaths::from_specs(&["masscan=/usr/bin/masscan"]).is_err());
    }
}
