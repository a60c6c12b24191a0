//! Diagnostic trap endpoint
//!
//! The route path is not linked anywhere: it is derived at startup from a
//! marker hidden in the page template, so only clients that mine the
//! template (or replay a scanner wordlist) ever land here. Hits are
//! reported to an optional webhook and always answered with the same
//! fixed payload.

use std::sync::OnceLock;
use std::time::Duration;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sha2::{Digest, Sha512};
use tracing::{debug, info, warn};
use ureq::Agent;

use crate::config::get_config;
use crate::services::docs::PAGE_TEMPLATE;
use crate::utils::hex_encode;
use crate::utils::ip::client_ip;

/// Outbound notification timeout.
const WEBHOOK_TIMEOUT_SECS: u64 = 5;

static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(WEBHOOK_TIMEOUT_SECS)))
            .build()
            .into()
    })
}

pub struct FlagService;

impl FlagService {
    /// The trap path segment: hex(SHA-512(seed)), where the seed is the
    /// first `integrity` attribute value in the page template that is not
    /// a real `sha*-` digest.
    pub fn flag_token() -> String {
        let seed = Self::find_seed(PAGE_TEMPLATE).unwrap_or_default();
        Self::token_for(&seed)
    }

    pub fn token_for(seed: &str) -> String {
        hex_encode(&Sha512::digest(seed.as_bytes()))
    }

    /// Scan a template for `integrity="…"` values, skipping genuine
    /// subresource-integrity digests.
    pub fn find_seed(template: &str) -> Option<String> {
        let marker = "integrity=\"";
        let mut rest = template;
        while let Some(start) = rest.find(marker) {
            rest = &rest[start + marker.len()..];
            let end = rest.find('"')?;
            let value = &rest[..end];
            if !value.starts_with("sha") {
                return Some(value.to_string());
            }
            rest = &rest[end..];
        }
        None
    }

    /// Any method, the computed path: notify the webhook (best effort)
    /// and answer with the fixed payload.
    pub async fn handle_flag(req: HttpRequest, body: web::Bytes) -> impl Responder {
        let webhook_url = get_config().webhook.url.clone();

        if webhook_url.is_empty() {
            debug!("Trap endpoint hit, no webhook configured");
        } else {
            let base_url = {
                let info = req.connection_info();
                format!("{}://{}", info.scheme(), info.host())
            };
            let payload = serde_json::json!({
                "method": req.method().to_string(),
                "baseUrl": base_url,
                "query": req.query_string(),
                "body": String::from_utf8_lossy(&body),
                "ip": client_ip(&req),
            });
            info!("Trap endpoint hit, notifying webhook");
            Self::notify(webhook_url, payload);
        }

        HttpResponse::Ok().json(serde_json::json!({
            "endpoint": "diagnostic",
            "description": "This route exists to observe clients that probe for it.",
            "recorded": true,
        }))
    }

    /// Fire-and-forget webhook call; the response never waits on it and
    /// failures are only logged.
    fn notify(url: String, payload: serde_json::Value) {
        tokio::task::spawn_blocking(move || {
            let agent = get_agent();
            if let Err(e) = agent.post(&url).send_json(&payload) {
                warn!("Webhook notification to \"{}\" failed: {}", url, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_seed_skips_sha_digests() {
        let template = r#"
            <link integrity="sha384-abcdef" href="a.css">
            <script integrity="bm90LWEtZGlnZXN0" src="b.js"></script>
        "#;
        assert_eq!(
            FlagService::find_seed(template).as_deref(),
            Some("bm90LWEtZGlnZXN0")
        );
    }

    #[test]
    fn test_find_seed_none_when_all_sha() {
        let template = r#"<link integrity="sha256-only" href="a.css">"#;
        assert_eq!(FlagService::find_seed(template), None);
    }

    #[test]
    fn test_embedded_template_has_a_seed() {
        let seed = FlagService::find_seed(PAGE_TEMPLATE).unwrap();
        assert!(!seed.starts_with("sha"));
        // 128 hex chars of SHA-512.
        assert_eq!(FlagService::token_for(&seed).len(), 128);
    }

    #[test]
    fn test_token_is_stable() {
        assert_eq!(
            FlagService::token_for("abc"),
            FlagService::token_for("abc")
        );
        assert_ne!(
            FlagService::token_for("abc"),
            FlagService::token_for("abd")
        );
    }
}
