//! Client key derivation.
//!
//! The identity used to bucket rate-limit state: the first non-empty
//! `X-Forwarded-For` value wins, otherwise the peer IP address. The key is
//! opaque to the limiter; an empty header plus a missing peer would still be
//! a valid (empty) bucket.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Header consulted before falling back to the peer address.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Derive the rate-limit bucket key for one request.
pub fn client_key(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "203.0.113.7:51234".parse().unwrap()
    }

    #[test]
    fn forwarded_for_wins_when_present() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_key(&headers, peer()), "198.51.100.4");
    }

    #[test]
    fn falls_back_to_peer_ip_without_port() {
        assert_eq!(client_key(&HeaderMap::new(), peer()), "203.0.113.7");
    }

    #[test]
    fn empty_forwarded_for_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static(""));
        assert_eq!(client_key(&headers, peer()), "203.0.113.7");
    }
}
