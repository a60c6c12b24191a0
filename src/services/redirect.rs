use std::collections::HashMap;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::{debug, error, warn};

use super::capture_context;
use super::docs::DocsService;
use crate::errors::ShortgateError;
use crate::storage::{format_record, Collections, InvocationRecord, ShortcodeRecord};

/// Explicit lookup outcome, so "absent" and "broken" stay distinguishable
/// even though both end up on the fallback page.
pub enum ResolveOutcome {
    Found(ShortcodeRecord),
    NotFound,
    LookupFailed(ShortgateError),
}

pub struct RedirectService;

impl RedirectService {
    /// `GET|POST /{shortcode}` — redirect with the stored status, or fall
    /// through to the documentation page on a miss.
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        body: web::Bytes,
        collections: web::Data<Collections>,
    ) -> impl Responder {
        let code = path.into_inner();

        match Self::resolve(&collections, &code).await {
            ResolveOutcome::Found(record) => {
                // The redirect is decided before the audit write: a failed
                // audit entry must not cost the visitor their redirect.
                let response = Self::finish_redirect(&record);
                Self::record_invocation(&req, &collections, &record, &body).await;
                response
            }
            ResolveOutcome::NotFound => {
                debug!("Unknown short code, serving documentation page: {}", code);
                DocsService::page()
            }
            ResolveOutcome::LookupFailed(e) => {
                error!("Lookup failed for short code {}: {}", code, e);
                DocsService::page()
            }
        }
    }

    async fn resolve(collections: &Collections, code: &str) -> ResolveOutcome {
        match collections.shortcodes.get(code).await {
            Ok(Some(record)) => ResolveOutcome::Found(record),
            Ok(None) => ResolveOutcome::NotFound,
            Err(e) => ResolveOutcome::LookupFailed(e),
        }
    }

    fn finish_redirect(record: &ShortcodeRecord) -> HttpResponse {
        // Same canonical shape the creation path responds with.
        let formatted = format_record(record);
        HttpResponse::build(Self::redirect_status(formatted.status))
            .insert_header(("Location", formatted.redirect))
            .finish()
    }

    /// Best-effort invocation audit; failures are logged, never surfaced.
    async fn record_invocation(
        req: &HttpRequest,
        collections: &Collections,
        record: &ShortcodeRecord,
        body: &[u8],
    ) {
        let id = uuid::Uuid::new_v4().to_string();
        let mut params = HashMap::new();
        params.insert("shortcode".to_string(), record.code.clone());

        let invocation = InvocationRecord {
            id: id.clone(),
            code: record.code.clone(),
            context: capture_context(req, params, Self::body_value(body)),
            created_at: chrono::Utc::now(),
        };

        if let Err(e) = collections.invocations.set(&id, invocation).await {
            warn!("Invocation audit write failed for {}: {}", record.code, e);
        }
    }

    fn body_value(body: &[u8]) -> serde_json::Value {
        if body.is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_slice(body).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(body).into_owned())
        })
    }

    fn redirect_status(status: u16) -> StatusCode {
        match status {
            301 => StatusCode::MOVED_PERMANENTLY,
            302 => StatusCode::FOUND,
            303 => StatusCode::SEE_OTHER,
            307 => StatusCode::TEMPORARY_REDIRECT,
            308 => StatusCode::PERMANENT_REDIRECT,
            // Creation only admits the codes above; anything else in
            // storage is treated as the default.
            _ => StatusCode::MOVED_PERMANENTLY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_status_mapping() {
        assert_eq!(
            RedirectService::redirect_status(302),
            StatusCode::FOUND
        );
        assert_eq!(
            RedirectService::redirect_status(308),
            StatusCode::PERMANENT_REDIRECT
        );
        assert_eq!(
            RedirectService::redirect_status(999),
            StatusCode::MOVED_PERMANENTLY
        );
    }

    #[test]
    fn test_body_value() {
        assert_eq!(RedirectService::body_value(b""), serde_json::Value::Null);
        assert_eq!(
            RedirectService::body_value(b"{\"a\":1}"),
            serde_json::json!({"a": 1})
        );
        assert_eq!(
            RedirectService::body_value(b"plain text"),
            serde_json::Value::String("plain text".to_string())
        );
    }
}
