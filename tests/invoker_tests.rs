//! Runs the process-backed toolkit against small shell scripts standing in
//! for the real binaries.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use pd_recon::analyze::nuclei::NucleiArgs;
use pd_recon::discover::dnsx::DnsxArgs;
use pd_recon::discover::subfinder::SubfinderArgs;
use pd_recon::external::{Capability, ToolPaths};
use pd_recon::gather::katana::KatanaArgs;
use pd_recon::probe::httpx::HttpxArgs;
use pd_recon::probe::naabu::NaabuArgs;
use pd_recon::{ProjectDiscovery, Toolkit};
use tempfile::TempDir;

// Writing an executable while another test forks can fail with ETXTBSY.
static SPAWN_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn toolkit(cap: Capability, path: PathBuf) -> ProjectDiscovery {
    ProjectDiscovery::new(ToolPaths::new().with_override(cap, path))
}

#[tokio::test]
async fn one_entry_per_json_line() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let body = r#"echo '{"host":"a.example.com","input":"example.com","source":"crtsh"}'
echo '{"host":"b.example.com","input":"example.com","source":"dnsdumpster"}'
echo '{"host":"c.example.com","input":"example.com","source":"crtsh"}'"#;
    let tk = toolkit(Capability::Subfinder, fake_tool(dir.path(), "subfinder", body));

    let rs = tk.subfinder(&SubfinderArgs::new("example.com")).await;
    assert!(!rs.is_error());
    let names: Vec<&str> = rs.entries().iter().map(|s| s.0.as_str()).collect();
    assert_eq!(names, vec!["a.example.com", "b.example.com", "c.example.com"]);
}

#[tokio::test]
async fn subdomains_are_deduplicated_in_order() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let body = "echo b.example.com\necho a.example.com\necho b.example.com";
    let tk = toolkit(Capability::Subfinder, fake_tool(dir.path(), "subfinder", body));

    let rs = tk.subfinder(&SubfinderArgs::new("example.com")).await;
    let names: Vec<&str> = rs.entries().iter().map(|s| s.0.as_str()).collect();
    assert_eq!(names, vec!["b.example.com", "a.example.com"]);
    assert_eq!(rs.count(), 2);
}

#[tokio::test]
async fn empty_output_with_failing_exit_is_an_error() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let tk = toolkit(Capability::Httpx, fake_tool(dir.path(), "httpx", "echo 'bad flag' >&2\nexit 2"));

    let rs = tk.httpx(&HttpxArgs::new(vec!["a.example.com".into()], true)).await;
    assert!(rs.is_empty());
    let err = rs.error().unwrap();
    assert!(err.contains("exited with code 2"), "{}", err);
    assert!(err.contains("bad flag"), "{}", err);
    assert!(!rs.is_launch_failure());
}

#[tokio::test]
async fn malformed_lines_are_skipped() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let body = r#"cat > /dev/null
echo '{"url":"https://a.example.com","status_code":200,"title":"A"}'
echo '{"url": broken'
echo ''
echo '{"url":"https://b.example.com","status_code":503}'"#;
    let tk = toolkit(Capability::Httpx, fake_tool(dir.path(), "httpx", body));

    let rs = tk.httpx(&HttpxArgs::new(vec!["a.example.com".into(), "b.example.com".into()], true)).await;
    assert!(!rs.is_error());
    let urls: Vec<&str> = rs.entries().iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.example.com", "https://b.example.com"]);
    assert!(rs.entries()[0].is_live());
    assert!(!rs.entries()[1].is_live());
}

#[tokio::test]
async fn findings_survive_a_failing_exit() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let body = r#"cat > /dev/null
echo '{"template-id":"tech-detect","info":{"name":"Tech","severity":"info"},"type":"http","host":"https://a.example.com","matched-at":"https://a.example.com/"}'
exit 1"#;
    let tk = toolkit(Capability::Nuclei, fake_tool(dir.path(), "nuclei", body));

    let rs = tk.nuclei(&NucleiArgs::new(vec!["https://a.example.com".into()], vec!["info".into()])).await;
    assert!(!rs.is_error());
    assert_eq!(rs.count(), 1);
    assert_eq!(rs.entries()[0].template_id.as_deref(), Some("tech-detect"));
    assert_eq!(rs.entries()[0].matched.as_deref(), Some("https://a.example.com/"));
}

#[tokio::test]
async fn targets_are_fed_on_stdin_with_arguments() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let args_file = dir.path().join("args");
    let body = format!(
        r#"printf '%s\n' "$@" > '{}'
while read -r h; do
  [ -n "$h" ] && echo "{{\"host\":\"$h\",\"a\":[\"10.0.0.1\"]}}"
done"#,
        args_file.display()
    );
    let tk = toolkit(Capability::Dnsx, fake_tool(dir.path(), "dnsx", &body));

    let rs = tk.dnsx(&DnsxArgs::new(vec!["a.example.com".into(), "b.example.com".into()])).await;
    let hosts: Vec<&str> = rs.entries().iter().map(|r| r.domain.as_str()).collect();
    assert_eq!(hosts, vec!["a.example.com", "b.example.com"]);
    assert!(rs.entries().iter().all(|r| r.ip == "10.0.0.1"));

    let args = std::fs::read_to_string(&args_file).unwrap();
    assert_eq!(args.lines().collect::<Vec<_>>(), vec!["-json"]);
}

#[tokio::test]
async fn open_ports_from_json_and_plain_lines() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let body = r#"cat > /dev/null
echo '{"host":"a.example.com","ip":"93.184.216.34","port":443}'
echo 'a.example.com:8080'"#;
    let tk = toolkit(Capability::Naabu, fake_tool(dir.path(), "naabu", body));

    let rs = tk.naabu(&NaabuArgs::top(vec!["a.example.com".into()], 100)).await;
    let ports: Vec<u16> = rs.entries().iter().map(|p| p.port).collect();
    assert_eq!(ports, vec![443, 8080]);
}

#[tokio::test]
async fn crawled_endpoints_are_deduplicated() {
    let _guard = SPAWN_LOCK.lock().await;
    let dir = TempDir::new().unwrap();
    let body = r#"cat > /dev/null
echo '{"request":{"method":"GET","endpoint":"https://a.example.com/login"}}'
echo '{"request":{"method":"GET","endpoint":"https://a.example.com/login"}}'
echo 'https://a.example.com/about'
echo '[INF] crawling'"#;
    let tk = toolkit(Capability::Katana, fake_tool(dir.path(), "katana", body));

    let rs = tk.katana(&KatanaArgs::new(vec!["https://a.example.com".into()], 2)).await;
    let urls: Vec<&str> = rs.entries().iter().map(|e| e.0.as_str()).collect();
    assert_eq!(urls, vec!["https://a.example.com/login", "https://a.example.com/about"]);
    assert_eq!(rs.count(), 2);
}

#[tokio::test]
async fn missing_binary_is_a_launch_failure() {
    let dir = TempDir::new().unwrap();
    let tk = toolkit(Capability::Nuclei, dir.path().join("nuclei"));

    let rs = tk.nuclei(&NucleiArgs::new(vec!["https://a.example.com".into()], vec!["high".into()])).await;
    assert!(rs.is_launch_failure());
    let err = rs.error().unwrap();
    assert!(err.starts_with("Failed to execute nuclei:"), "{}", err);
    assert!(err.ends_with("Make sure nuclei is installed."), "{}", err);
}

/// Two well-formed output lines per tool.
fn sample_output(cap: Capability) -> [&'static str; 2] {
    match cap {
        Capability::Subfinder => [r#"{"host":"a.example.com"}"#, r#"{"host":"b.example.com"}"#],
        Capability::Dnsx => [
            r#"{"host":"a.example.com","a":["10.0.0.1"]}"#,
            r#"{"host":"b.example.com","a":["10.0.0.2"]}"#,
        ],
        Capability::Naabu => [r#"{"host":"a.example.com","port":80}"#, r#"{"host":"a.example.com","port":443}"#],
        Capability::Httpx => [
            r#"{"url":"https://a.example.com","status_code":200}"#,
            r#"{"url":"https://b.example.com","status_code":404}"#,
        ],
        Capability::Katana => [
            r#"{"request":{"endpoint":"https://a.example.com/login"}}"#,
            r#"{"request":{"endpoint":"https://a.example.com/api"}}"#,
        ],
        Capability::Nuclei => [
            r#"{"template-id":"a","info":{"name":"A","severity":"high"},"type":"http","host":"https://a.example.com"}"#,
            r#"{"template-id":"b","info":{"name":"B","severity":"low"},"type":"http","host":"https://a.example.com"}"#,
        ],
    }
}

/// Invoke `cap` through the toolkit and return `(count, error)`.
async fn invoke(tk: &ProjectDiscovery, cap: Capability) -> (usize, Option<String>) {
    let targets = vec!["a.example.com".to_string()];
    match cap {
        Capability::Subfinder => {
            let rs = tk.subfinder(&SubfinderArgs::new("example.com")).await;
            (rs.count(), rs.error())
        }
        Capability::Dnsx => {
            let rs = tk.dnsx(&DnsxArgs::new(targets)).await;
            (rs.count(), rs.error())
        }
        Capability::Naabu => {
            let rs = tk.naabu(&NaabuArgs::top(targets, 100)).await;
            (rs.count(), rs.error())
        }
        Capability::Httpx => {
            let rs = tk.httpx(&HttpxArgs::new(targets, true)).await;
            (rs.count(), rs.error())
        }
        Capability::Katana => {
            let rs = tk.katana(&KatanaArgs::new(targets, 2)).await;
            (rs.count(), rs.error())
        }
        Capability::Nuclei => {
            let rs = tk.nuclei(&NucleiArgs::new(targets, vec!["high".into()])).await;
            (rs.count(), rs.error())
        }
    }
}

#[tokio::test]
async fn every_tool_counts_records_on_clean_exit() {
    let _guard = SPAWN_LOCK.lock().await;
    for cap in Capability::ALL {
        let dir = TempDir::new().unwrap();
        let [first, second] = sample_output(cap);
        let body = format!("cat > /dev/null\necho '{}'\necho '{}'", first, second);
        let tk = toolkit(cap, fake_tool(dir.path(), cap.name(), &body));

        let (count, error) = invoke(&tk, cap).await;
        assert_eq!(count, 2, "{}", cap);
        assert_eq!(error, None, "{}", cap);
    }
}

#[tokio::test]
async fn every_tool_reports_exit_code_when_nothing_parsed() {
    let _guard = SPAWN_LOCK.lock().await;
    for cap in Capability::ALL {
        let dir = TempDir::new().unwrap();
        let tk = toolkit(cap, fake_tool(dir.path(), cap.name(), "cat > /dev/null\necho '{\"status\":\"noise\"}'\nexit 3"));

        let (count, error) = invoke(&tk, cap).await;
        assert_eq!(count, 0, "{}", cap);
        let error = error.unwrap_or_else(|| panic!("{} returned no error", cap));
        assert!(error.contains(&format!("{} exited with code 3", cap)), "{}", error);
    }
}
