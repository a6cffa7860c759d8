//! Request-correlation metadata extraction.
//!
//! When a mutation originates inside an HTTP request lifecycle, the caller
//! attaches a [`RequestContext`] to the emitted event so the audit entry
//! carries the client IP and user agent. Background and system mutations
//! carry no context and their entries leave both fields NULL.

use http::Request;
use serde::{Deserialize, Serialize};

/// HTTP metadata captured from an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Client IP address, from `X-Forwarded-For` when present.
    pub ip_address: Option<String>,
    /// Value of the `User-Agent` header.
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// Build a context with explicit values.
    pub fn new(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
        }
    }

    /// Extract metadata from an HTTP request.
    ///
    /// The client IP is taken from the first hop of `X-Forwarded-For`,
    /// falling back to `X-Real-IP`. Callers that know the peer address (no
    /// proxy in front) can fill it in with [`RequestContext::with_peer_addr`].
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            ip_address: client_ip(req),
            user_agent: header_value(req, "user-agent"),
        }
    }

    /// Use `addr` as the IP when none was found in forwarding headers.
    #[must_use]
    pub fn with_peer_addr(mut self, addr: std::net::IpAddr) -> Self {
        if self.ip_address.is_none() {
            self.ip_address = Some(addr.to_string());
        }
        self
    }
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn client_ip<B>(req: &Request<B>) -> Option<String> {
    if let Some(forwarded) = header_value(req, "x-forwarded-for") {
        // First hop is the original client
        let first = forwarded.split(',').next().map(|s| s.trim().to_string());
        if let Some(ip) = first.filter(|s| !s.is_empty()) {
            return Some(ip);
        }
    }

    header_value(req, "x-real-ip")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_headers(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_extracts_user_agent() {
        let req = request_with_headers(&[("user-agent", "Mozilla/5.0")]);
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert!(ctx.ip_address.is_none());
    }

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let req = request_with_headers(&[(
            "x-forwarded-for",
            "203.0.113.7, 10.0.0.2, 10.0.0.3",
        )]);
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = request_with_headers(&[("x-real-ip", "198.51.100.4")]);
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.ip_address.as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_empty_headers_yield_empty_context() {
        let req = request_with_headers(&[]);
        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx, RequestContext::default());
    }

    #[test]
    fn test_whitespace_only_header_is_ignored() {
        let req = request_with_headers(&[("x-forwarded-for", "   ")]);
        let ctx = RequestContext::from_request(&req);
        assert!(ctx.ip_address.is_none());
    }

    #[test]
    fn test_peer_addr_fills_missing_ip_only() {
        let peer: std::net::IpAddr = "192.0.2.1".parse().unwrap();

        let ctx = RequestContext::default().with_peer_addr(peer);
        assert_eq!(ctx.ip_address.as_deref(), Some("192.0.2.1"));

        let req = request_with_headers(&[("x-forwarded-for", "203.0.113.7")]);
        let ctx = RequestContext::from_request(&req).with_peer_addr(peer);
        assert_eq!(ctx.ip_address.as_deref(), Some("203.0.113.7"));
    }
}
