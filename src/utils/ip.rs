//! Client IP extraction
//!
//! The audit records prefer the forwarded client address over the raw
//! connection peer, so deployments behind a reverse proxy record the real
//! visitor rather than the proxy.

use actix_web::http::header::HeaderMap;
use actix_web::HttpRequest;

/// Extract the client IP for audit purposes.
///
/// Order: first `X-Forwarded-For` hop, then `X-Real-IP`, then the peer
/// address of the connection.
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    forwarded_ip(req.headers()).or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
}

/// First forwarded hop from proxy headers, if any.
pub fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_forwarded_ip_first_hop() {
        let map = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(forwarded_ip(&map).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_forwarded_ip_real_ip_fallback() {
        let map = headers(&[("x-real-ip", "198.51.100.4")]);
        assert_eq!(forwarded_ip(&map).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_forwarded_ip_none() {
        let map = headers(&[]);
        assert_eq!(forwarded_ip(&map), None);
    }
}
