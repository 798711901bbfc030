//! Client metadata captured from the request (origin address + user agent).

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Coarse summary of a `User-Agent` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAgentSummary {
    pub browser: Option<String>,
    pub version: Option<String>,
    pub os: Option<String>,
    pub mobile: bool,
}

impl UserAgentSummary {
    /// Best-effort parse. Unknown agents yield `None` fields, never an error.
    pub fn parse(raw: &str) -> Self {
        // Order matters: Edge and Opera also advertise Chrome, Chrome also advertises Safari.
        const BROWSERS: [(&str, &str); 4] = [
            ("Edg/", "Edge"),
            ("OPR/", "Opera"),
            ("Chrome/", "Chrome"),
            ("Firefox/", "Firefox"),
        ];

        let mut browser = None;
        let mut version = None;
        for (marker, name) in BROWSERS {
            if let Some(v) = token_after(raw, marker) {
                browser = Some(name.to_string());
                version = Some(v);
                break;
            }
        }
        if browser.is_none() && raw.contains("Safari/") {
            browser = Some("Safari".to_string());
            version = token_after(raw, "Version/");
        }

        let os = if raw.contains("Windows") {
            Some("Windows")
        } else if raw.contains("Android") {
            Some("Android")
        } else if raw.contains("iPhone") || raw.contains("iPad") {
            Some("iOS")
        } else if raw.contains("Mac OS X") {
            Some("macOS")
        } else if raw.contains("Linux") {
            Some("Linux")
        } else {
            None
        };

        Self {
            browser,
            version,
            os: os.map(str::to_string),
            mobile: raw.contains("Mobi") || raw.contains("Android") || raw.contains("iPhone"),
        }
    }
}

fn token_after(raw: &str, marker: &str) -> Option<String> {
    let start = raw.find(marker)? + marker.len();
    let rest = &raw[start..];
    let end = rest.find(|c: char| c.is_whitespace() || c == ';' || c == ')').unwrap_or(rest.len());
    let token = &rest[..end];
    (!token.is_empty()).then(|| token.to_string())
}

/// Where the request came from and what it was sent with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetadata {
    pub origin_address: Option<String>,
    pub user_agent: UserAgentSummary,
}

impl ClientMetadata {
    pub fn new(origin: Option<IpAddr>, user_agent: &str) -> Self {
        Self {
            origin_address: origin.map(normalize_address),
            user_agent: UserAgentSummary::parse(user_agent),
        }
    }
}

/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are reported as plain IPv4.
fn normalize_address(addr: IpAddr) -> String {
    match addr {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
        IpAddr::V4(v4) => v4.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.71 Safari/537.36";
    const EDGE_WIN: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.61";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";

    #[test]
    fn detects_common_browsers() {
        let chrome = UserAgentSummary::parse(CHROME_WIN);
        assert_eq!(chrome.browser.as_deref(), Some("Chrome"));
        assert_eq!(chrome.version.as_deref(), Some("120.0.6099.71"));
        assert_eq!(chrome.os.as_deref(), Some("Windows"));
        assert!(!chrome.mobile);

        let edge = UserAgentSummary::parse(EDGE_WIN);
        assert_eq!(edge.browser.as_deref(), Some("Edge"));

        let safari = UserAgentSummary::parse(SAFARI_IPHONE);
        assert_eq!(safari.browser.as_deref(), Some("Safari"));
        assert_eq!(safari.version.as_deref(), Some("17.1"));
        assert_eq!(safari.os.as_deref(), Some("iOS"));
        assert!(safari.mobile);
    }

    #[test]
    fn unknown_agent_is_empty_summary() {
        let summary = UserAgentSummary::parse("curl/8.4.0");
        assert_eq!(summary, UserAgentSummary::default());
    }

    #[test]
    fn strips_ipv4_mapped_prefix() {
        let mapped: IpAddr = "::ffff:10.0.0.7".parse().unwrap();
        let meta = ClientMetadata::new(Some(mapped), "curl/8.4.0");
        assert_eq!(meta.origin_address.as_deref(), Some("10.0.0.7"));

        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        let meta = ClientMetadata::new(Some(v6), "curl/8.4.0");
        assert_eq!(meta.origin_address.as_deref(), Some("2001:db8::1"));
    }
}
