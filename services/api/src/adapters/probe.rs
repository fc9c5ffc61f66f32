//! services/api/src/adapters/probe.rs
//!
//! Best-effort connectivity probe: resolves the backend hostname via DNS and
//! performs a one-row round trip through the `FeedbackStore` port. Purely
//! diagnostic; a failed probe is logged and shown as a page caption, never
//! treated as fatal.

use std::net::IpAddr;

use comfort_core::ports::FeedbackStore;

/// The outcome of the startup probe.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub host: String,
    pub resolved_ip: Option<IpAddr>,
    pub error: Option<String>,
}

impl ProbeReport {
    /// Caption string rendered at the top of every page.
    pub fn caption(&self) -> String {
        match (&self.resolved_ip, &self.error) {
            (Some(ip), None) => format!("Backend connected ({} \u{2192} {})", self.host, ip),
            (_, Some(err)) => format!("Backend probe failed: {}", err),
            (None, None) => format!("Backend probe inconclusive ({})", self.host),
        }
    }

    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Extracts the hostname from a URL without pulling in a URL parser; the
/// backend URL is `https://<host>` with no path by the time it gets here.
fn host_of(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    rest.split(['/', ':'])
        .next()
        .unwrap_or(rest)
        .to_string()
}

/// Runs the probe: DNS first (helps catch URL typos), then a one-row select.
pub async fn run(backend_url: &str, store: &dyn FeedbackStore) -> ProbeReport {
    let host = host_of(backend_url);

    let resolved_ip = match tokio::net::lookup_host((host.clone(), 443)).await {
        Ok(mut addrs) => addrs.next().map(|a| a.ip()),
        Err(e) => {
            return ProbeReport {
                host,
                resolved_ip: None,
                error: Some(format!("DNS resolution failed: {}", e)),
            }
        }
    };

    let error = store.probe().await.err().map(|e| e.to_string());

    ProbeReport {
        host,
        resolved_ip,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_extraction_handles_scheme_and_port() {
        assert_eq!(host_of("https://abc.supabase.co"), "abc.supabase.co");
        assert_eq!(host_of("https://abc.supabase.co:8443"), "abc.supabase.co");
        assert_eq!(host_of("abc.supabase.co"), "abc.supabase.co");
    }

    #[test]
    fn caption_reports_failure_detail() {
        let report = ProbeReport {
            host: "abc.supabase.co".to_string(),
            resolved_ip: None,
            error: Some("DNS resolution failed: no such host".to_string()),
        };
        assert!(report.caption().contains("probe failed"));
        assert!(!report.ok());
    }
}
