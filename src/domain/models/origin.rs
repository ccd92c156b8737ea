use reqwest::Url;
use tracing::warn;

/// Origins that are always accepted, for local development.
pub const LOCAL_DEV_ORIGINS: [&str; 2] = ["http://localhost:3000", "https://localhost:3000"];

/// Serialized `scheme://host[:port]` origin of `raw`, if it parses as a
/// hierarchical URL. Opaque origins (`data:`, `file:` ...) yield `None`.
pub fn origin_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return None;
    }
    Some(origin.ascii_serialization())
}

/// Exact-match allow-list of request origins.
///
/// Matching compares scheme, host and port only. Subdomains and string
/// prefixes of an allowed origin do not match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginAllowList {
    origins: Vec<String>,
}

impl OriginAllowList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut origins: Vec<String> = Vec::new();
        for entry in entries {
            let entry = entry.as_ref();
            match origin_of(entry) {
                Some(origin) => {
                    if !origins.contains(&origin) {
                        origins.push(origin);
                    }
                }
                None => warn!("Ignoring unparsable allowed origin '{}'", entry),
            }
        }
        Self { origins }
    }

    /// Build the list from deployment settings.
    ///
    /// `site_urls` is a comma-separated list; `deployment_host` is a bare host
    /// name that is allowed over https. Local development origins are always
    /// included. Empty settings count as unset.
    pub fn from_settings(site_urls: Option<&str>, deployment_host: Option<&str>) -> Self {
        let mut entries: Vec<String> = site_urls
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.split(',').map(|u| u.trim().to_string()).collect::<Vec<_>>())
            .unwrap_or_default();

        if let Some(host) = deployment_host.map(str::trim).filter(|h| !h.is_empty()) {
            entries.push(format!("https://{host}"));
        }

        entries.extend(LOCAL_DEV_ORIGINS.iter().map(|o| o.to_string()));
        Self::new(entries)
    }

    /// Whether the origin of `candidate` (an `Origin` or `Referer` header
    /// value) exactly equals an allowed origin.
    pub fn allows(&self, candidate: &str) -> bool {
        match origin_of(candidate) {
            Some(origin) => self.origins.iter().any(|allowed| *allowed == origin),
            None => false,
        }
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> OriginAllowList {
        OriginAllowList::from_settings(Some("https://allowed.com, https://docs.allowed.com:8443"), None)
    }

    #[test]
    fn exact_origin_matches() {
        let list = list();
        assert!(list.allows("https://allowed.com"));
        assert!(list.allows("https://allowed.com/"));
        assert!(list.allows("https://docs.allowed.com:8443"));
    }

    #[test]
    fn referer_path_and_query_are_ignored() {
        assert!(list().allows("https://allowed.com/chat?x=1#top"));
    }

    #[test]
    fn default_port_is_normalized() {
        assert!(list().allows("https://allowed.com:443/page"));
    }

    #[test]
    fn subdomain_and_lookalike_hosts_are_rejected() {
        let list = list();
        assert!(!list.allows("https://evil.allowed.com"));
        assert!(!list.allows("https://allowed.com.evil.net"));
        assert!(!list.allows("https://notallowed.com"));
    }

    #[test]
    fn scheme_and_port_must_match() {
        let list = list();
        assert!(!list.allows("http://allowed.com"));
        assert!(!list.allows("https://allowed.com:8080"));
        assert!(!list.allows("https://docs.allowed.com"));
    }

    #[test]
    fn malformed_values_never_match() {
        let list = list();
        assert!(!list.allows(""));
        assert!(!list.allows("allowed.com"));
        assert!(!list.allows("null"));
        assert!(!list.allows("data:text/plain,hi"));
    }

    #[test]
    fn local_dev_origins_always_present() {
        let list = OriginAllowList::from_settings(None, None);
        assert_eq!(list.len(), 2);
        assert!(list.allows("http://localhost:3000/"));
        assert!(list.allows("https://localhost:3000"));
        assert!(!list.allows("http://localhost:3001"));
    }

    #[test]
    fn deployment_host_is_allowed_over_https() {
        let list = OriginAllowList::from_settings(Some(""), Some("bugzap-abc123.vercel.app"));
        assert!(list.allows("https://bugzap-abc123.vercel.app"));
        assert!(!list.allows("http://bugzap-abc123.vercel.app"));
    }

    #[test]
    fn unparsable_entries_are_dropped() {
        let list = OriginAllowList::new(["not a url", "", "https://ok.example"]);
        assert_eq!(list.origins(), &["https://ok.example".to_string()]);
    }

    #[test]
    fn duplicate_entries_collapse() {
        let list = OriginAllowList::from_settings(Some("http://localhost:3000"), None);
        assert_eq!(list.len(), 2);
    }
}
