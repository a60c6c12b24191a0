use std::sync::OnceLock;

use actix_web::{HttpRequest, HttpResponse, Responder};

use crate::config::{get_config, AppConfig};

/// The embedded page template. Also the document the trap endpoint mines
/// for its seed token (see `services::flag`).
pub const PAGE_TEMPLATE: &str = include_str!("../../assets/docs.html");

static RENDERED: OnceLock<String> = OnceLock::new();

pub struct DocsService;

impl DocsService {
    /// Catch-all handler: everything unmatched gets the help page.
    pub async fn handle_default(_req: HttpRequest) -> impl Responder {
        Self::page()
    }

    /// The rendered documentation page, also used as the soft-miss
    /// fallback by the redirect handler.
    pub fn page() -> HttpResponse {
        let body = RENDERED.get_or_init(|| Self::render(get_config()));
        HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body.clone())
    }

    /// Placeholder substitution over the embedded template.
    pub fn render(config: &AppConfig) -> String {
        PAGE_TEMPLATE
            .replace("%SITE_NAME%", &config.display.name)
            .replace("%SITE_DESCRIPTION%", &config.display.description)
            .replace("%SITE_CONTACT%", &config.display.contact)
            .replace("%SOURCE_URL%", &config.display.source_url)
            .replace("%BASE_URL%", &config.oauth.callback_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholders() {
        let mut config = AppConfig::default();
        config.display.name = "testsite".to_string();
        config.display.description = "a test".to_string();
        config.oauth.callback_base = "http://sg.test".to_string();

        let html = DocsService::render(&config);
        assert!(html.contains("testsite"));
        assert!(html.contains("http://sg.test/"));
        assert!(!html.contains("%SITE_NAME%"));
        assert!(!html.contains("%BASE_URL%"));
    }
}
