use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::{error, info};

use super::capture_context;
use crate::config::get_config;
use crate::errors::Result;
use crate::storage::{
    format_record, is_allowed_status, Collections, CreationRecord, ShortcodeRecord,
};
use crate::utils::mint_unique_code;

/// Default redirect status when the request does not name one.
const DEFAULT_REDIRECT_STATUS: u16 = 301;

/// Fields extracted from the request payload, plus the raw payload kept
/// for the creation audit.
struct CreatePayload {
    redirect: Option<String>,
    status: Option<String>,
    raw: serde_json::Value,
}

pub struct CreateService;

impl CreateService {
    /// `POST /` — validate, mint a code, persist mapping + audit, reply
    /// with the formatted record.
    pub async fn handle_create(
        req: HttpRequest,
        body: web::Bytes,
        collections: web::Data<Collections>,
    ) -> impl Responder {
        let payload = Self::parse_payload(&req, &body);

        // Validation failures write no state.
        let redirect = match payload.redirect.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => return Self::bad_request("No redirect URI provided"),
        };

        if let Err(e) = url::Url::parse(&redirect) {
            return Self::bad_request(&e.to_string());
        }

        let status = match payload.status.as_deref() {
            None => DEFAULT_REDIRECT_STATUS,
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(status) if is_allowed_status(status) => status,
                Ok(_) => return Self::bad_request("Invalid status"),
                Err(e) => return Self::bad_request(&e.to_string()),
            },
        };

        match Self::create_record(&req, &collections, redirect, status, payload.raw).await {
            Ok(formatted) => HttpResponse::Ok().json(formatted),
            Err(e) => {
                error!("Shortcode creation failed: {}", e);
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("Internal Server Error")
            }
        }
    }

    async fn create_record(
        req: &HttpRequest,
        collections: &Collections,
        redirect: String,
        status: u16,
        raw_body: serde_json::Value,
    ) -> Result<crate::storage::FormattedRecord> {
        let config = get_config();
        let code = mint_unique_code(collections.shortcodes.as_ref(), config.codes.length).await?;

        let now = chrono::Utc::now();
        collections
            .shortcodes
            .set(
                &code,
                ShortcodeRecord {
                    code: code.clone(),
                    redirect,
                    status,
                    created_at: now,
                },
            )
            .await?;

        collections
            .creations
            .set(
                &code,
                CreationRecord {
                    code: code.clone(),
                    context: capture_context(req, HashMap::new(), raw_body),
                    created_at: now,
                },
            )
            .await?;

        // Reply from the stored record, not the inputs.
        let stored = collections.shortcodes.get(&code).await?.ok_or_else(|| {
            crate::errors::ShortgateError::storage_operation(format!(
                "Stored shortcode vanished on re-read: {}",
                code
            ))
        })?;

        info!("Shortcode created: {} -> {} ({})", code, stored.redirect, stored.status);
        Ok(format_record(&stored))
    }

    fn parse_payload(req: &HttpRequest, body: &[u8]) -> CreatePayload {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");

        if content_type.contains("json") || body.first() == Some(&b'{') {
            let value: serde_json::Value =
                serde_json::from_slice(body).unwrap_or(serde_json::Value::Null);
            let redirect = value
                .get("redirect")
                .and_then(|v| v.as_str())
                .map(String::from);
            let status = match value.get("status") {
                None | Some(serde_json::Value::Null) => None,
                Some(serde_json::Value::Number(n)) => Some(n.to_string()),
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
            };
            return CreatePayload {
                redirect,
                status,
                raw: value,
            };
        }

        // Anything else is treated as a form body.
        let fields: HashMap<String, String> = url::form_urlencoded::parse(body)
            .into_owned()
            .collect();
        CreatePayload {
            redirect: fields.get("redirect").cloned(),
            status: fields.get("status").cloned(),
            raw: serde_json::to_value(&fields).unwrap_or(serde_json::Value::Null),
        }
    }

    fn bad_request(message: &str) -> HttpResponse {
        HttpResponse::BadRequest()
            .content_type("text/plain; charset=utf-8")
            .body(message.to_string())
    }
}
