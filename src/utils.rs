/// Reduce a target given as a URL (`https://example.com/x`) to its host.
pub fn normalize_domain(target: &str) -> String {
    let target = target.trim();
    if target.starts_with("http://") || target.starts_with("https://") {
        match url::Url::parse(target) {
            Ok(u) => u.host_str().map(|s| s.to_string()).unwrap_or_else(|| target.to_string()),
            Err(_) => target.to_string(),
        }
    } else {
        target.trim_end_matches('/').to_string()
    }
}

/// Best-effort text of a caught panic payload.
pub fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_targets_reduce_to_host() {
        assert_eq!(normalize_domain("https://example.com/login"), "example.com");
        assert_eq!(normalize_domain(" example.com/ "), "example.com");
        assert_eq!(normalize_domain("sub.example.com"), "sub.example.com");
    }

    #[test]
    fn panic_payloads() {
        let p = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(p.as_ref()), "boom");
        let p = std::panic::catch_unwind(|| panic!("{}", 42)).unwrap_err();
        assert_eq!(panic_message(p.as_ref()), "42");
    }
}
