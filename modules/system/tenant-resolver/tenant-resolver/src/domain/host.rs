//! `Host` header parsing.

/// Classification of an inbound host relative to the base domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMatch {
    /// Exactly the base domain (or bare `localhost`).
    MainDomain,
    /// `<label>.<base_domain>` or `<label>.localhost`. Only the leftmost
    /// label is kept when several remain before the suffix.
    Subdomain(String),
    /// Any other host, lowercased and without port. Candidate custom domain.
    Foreign(String),
}

/// Lowercases, trims, and removes the port and any trailing dot.
#[must_use]
pub fn normalize_host(raw: &str) -> String {
    let host = raw.trim().to_ascii_lowercase();

    // Bracketed IPv6 literal, e.g. `[::1]:8080`.
    if let Some(rest) = host.strip_prefix('[') {
        return rest
            .split_once(']')
            .map_or(rest, |(addr, _)| addr)
            .to_owned();
    }

    let without_port = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host.as_str(),
    };

    without_port.trim_end_matches('.').to_owned()
}

/// Classifies `raw_host` against `base_domain`.
#[must_use]
pub fn parse_host(raw_host: &str, base_domain: &str) -> HostMatch {
    let host = normalize_host(raw_host);
    let base = normalize_host(base_domain);

    if host.is_empty() || host == base || host == "localhost" {
        return HostMatch::MainDomain;
    }

    let prefix = host
        .strip_suffix(base.as_str())
        .and_then(|p| p.strip_suffix('.'))
        .or_else(|| host.strip_suffix(".localhost"));

    match prefix {
        Some(prefix) => match prefix.split('.').next() {
            Some(label) if !label.is_empty() => HostMatch::Subdomain(label.to_owned()),
            _ => HostMatch::MainDomain,
        },
        None => HostMatch::Foreign(host),
    }
}

/// Lowercased subdomain label of `raw_host`, if any.
#[must_use]
pub fn extract_subdomain(raw_host: &str, base_domain: &str) -> Option<String> {
    match parse_host(raw_host, base_domain) {
        HostMatch::Subdomain(label) => Some(label),
        HostMatch::MainDomain | HostMatch::Foreign(_) => None,
    }
}
