//! Client IP lookup from proxy headers

use logleaf_core::RequestContext;
use tracing::trace;

/// Headers consulted for the client address, in priority order
pub const CLIENT_IP_HEADERS: &[&str] = &[
    "Client-IP",
    "X-Forwarded-For",
    "X-Forwarded",
    "X-Cluster-Client-IP",
    "Forwarded-For",
    "Forwarded",
];

/// Value logged when no address is available
pub const UNKNOWN_IP: &str = "UNKNOWN";

/// Resolve the client address for a request.
///
/// The first present header wins, falling back to the socket peer address.
/// For comma-separated lists the last entry is used.
pub fn client_ip(ctx: &RequestContext) -> String {
    let raw = CLIENT_IP_HEADERS
        .iter()
        .find_map(|name| ctx.header(name).map(|v| (*name, v)))
        .or_else(|| ctx.remote_addr.as_deref().map(|v| ("remote_addr", v)));

    match raw {
        Some((source, value)) => {
            trace!(source, value, "Resolved client address");
            let last = value.rsplit(',').next().unwrap_or(value).trim();
            if last.is_empty() {
                UNKNOWN_IP.to_string()
            } else {
                last.to_string()
            }
        }
        None => UNKNOWN_IP.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_addr_fallback() {
        let ctx = RequestContext::new().with_remote_addr("192.168.1.10");
        assert_eq!(client_ip(&ctx), "192.168.1.10");
    }

    #[test]
    fn test_header_priority() {
        let ctx = RequestContext::new()
            .with_remote_addr("10.0.0.1")
            .with_header("X-Forwarded-For", "203.0.113.7")
            .with_header("Forwarded", "198.51.100.2");
        assert_eq!(client_ip(&ctx), "203.0.113.7");

        let ctx = ctx.with_header("client-ip", "192.0.2.44");
        assert_eq!(client_ip(&ctx), "192.0.2.44");
    }

    #[test]
    fn test_last_entry_of_list() {
        let ctx = RequestContext::new().with_header("X-Forwarded-For", "203.0.113.7, 10.1.1.1 ");
        assert_eq!(client_ip(&ctx), "10.1.1.1");
    }

    #[test]
    fn test_unknown() {
        assert_eq!(client_ip(&RequestContext::new()), "UNKNOWN");
        let blank = RequestContext::new().with_header("X-Forwarded-For", " ");
        assert_eq!(client_ip(&blank), "UNKNOWN");
    }
}
