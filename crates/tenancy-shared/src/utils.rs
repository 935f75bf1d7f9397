//! Utility functions

/// Trim and lower-case a tenant code or domain before lookup or storage.
pub fn normalize_key(s: &str) -> String {
    s.trim().to_ascii_lowercase()
}

/// Host header value without port, lower-cased. Returns `None` for blank hosts.
pub fn host_without_port(host: &str) -> Option<String> {
    let host = host.trim();
    if host.is_empty() {
        return None;
    }
    // IPv6 literal: "[::1]:8080"
    let bare = if let Some(rest) = host.strip_prefix('[') {
        rest.split(']').next().unwrap_or(rest)
    } else {
        host.rsplit_once(':').map(|(h, _)| h).unwrap_or(host)
    };
    let bare = bare.trim_end_matches('.');
    if bare.is_empty() {
        None
    } else {
        Some(bare.to_ascii_lowercase())
    }
}

pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let keep = if local.chars().count() <= 2 { 1 } else { 2 };
        let visible: String = local.chars().take(keep).collect();
        format!("{}***{}", visible, domain)
    } else {
        "***".to_string()
    }
}
