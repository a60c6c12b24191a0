//! HTTP service layer
//!
//! One handler struct per surface, wired up by `main` (and by tests)
//! through the per-service route helpers.

pub mod admin;
pub mod auth;
pub mod create;
pub mod docs;
pub mod flag;
pub mod redirect;

use std::collections::HashMap;

use actix_web::HttpRequest;

use crate::storage::RequestContext;
use crate::utils::ip::client_ip;

/// Capture requester metadata for an audit record.
///
/// `params` are the matched route parameters, `body` whatever the handler
/// already parsed out of the payload (JSON value, form fields as an
/// object, or `null` when there was none).
pub(crate) fn capture_context(
    req: &HttpRequest,
    params: HashMap<String, String>,
    body: serde_json::Value,
) -> RequestContext {
    let (protocol, base_url) = {
        let info = req.connection_info();
        (
            info.scheme().to_string(),
            format!("{}://{}", info.scheme(), info.host()),
        )
    };

    let query: HashMap<String, String> =
        url::form_urlencoded::parse(req.query_string().as_bytes())
            .into_owned()
            .collect();

    RequestContext {
        protocol,
        ip: client_ip(req),
        method: req.method().to_string(),
        path: req.path().to_string(),
        base_url,
        params,
        query,
        body,
    }
}
