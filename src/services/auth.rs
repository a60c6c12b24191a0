//! GitHub OAuth login
//!
//! `GET /auth/github` parks the caller's return path and a random state in
//! short-lived cookies and hands off to GitHub. The callback verifies the
//! state, exchanges the code, fetches the profile, and maps it onto a
//! stored user (created on first login, reused afterwards). Every failure
//! mode in the handshake collapses to a redirect home.

use std::sync::OnceLock;
use std::time::Duration;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse, Responder, Scope};
use serde::Deserialize;
use tracing::{info, warn};
use ureq::Agent;

use crate::config::get_config;
use crate::errors::{Result, ShortgateError};
use crate::session::{SessionService, SESSION_COOKIE};
use crate::storage::{Collections, User};

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";

/// Cookie holding the anti-forgery state between the two legs.
const STATE_COOKIE: &str = "sg_oauth_state";
/// Cookie holding the path to land on after login.
const RETURN_COOKIE: &str = "sg_return";
/// Both cookies only need to survive one handshake.
const HANDSHAKE_COOKIE_SECS: i64 = 600;

const OAUTH_HTTP_TIMEOUT_SECS: u64 = 10;

static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(OAUTH_HTTP_TIMEOUT_SECS)))
            .build()
            .into()
    })
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

pub struct AuthService;

impl AuthService {
    /// `GET /auth/github` — capture the return path, hand off to GitHub.
    pub async fn handle_login(query: web::Query<LoginQuery>) -> impl Responder {
        let config = get_config();

        if !config.oauth_enabled() {
            return HttpResponse::NotFound()
                .content_type("text/plain; charset=utf-8")
                .body("Not Found");
        }

        let state = uuid::Uuid::new_v4().to_string();
        let return_to = Self::sanitize_return_to(query.return_to.as_deref());

        let redirect_uri = format!("{}/auth/github/callback", config.oauth.callback_base);
        let authorize_query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &config.oauth.client_id)
            .append_pair("redirect_uri", &redirect_uri)
            .append_pair("scope", "read:user")
            .append_pair("state", &state)
            .finish();

        HttpResponse::Found()
            .cookie(Self::handshake_cookie(STATE_COOKIE, &state))
            .cookie(Self::handshake_cookie(RETURN_COOKIE, &return_to))
            .insert_header((
                "Location",
                format!("{}?{}", GITHUB_AUTHORIZE_URL, authorize_query),
            ))
            .finish()
    }

    /// `GET /auth/github/callback` — finish the handshake. Anything that
    /// goes wrong lands the caller back on the home page.
    pub async fn handle_callback(
        req: HttpRequest,
        query: web::Query<CallbackQuery>,
        collections: web::Data<Collections>,
        session: web::Data<SessionService>,
    ) -> impl Responder {
        match Self::complete_login(&req, &query, &collections, &session).await {
            Ok(token) => {
                let return_cookie = req.cookie(RETURN_COOKIE);
                let return_to =
                    Self::sanitize_return_to(return_cookie.as_ref().map(|c| c.value()));

                let session_cookie = Cookie::build(SESSION_COOKIE, token)
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .max_age(CookieDuration::seconds(session.ttl_secs() as i64))
                    .finish();

                HttpResponse::Found()
                    .cookie(session_cookie)
                    .cookie(Self::removal_cookie(STATE_COOKIE))
                    .cookie(Self::removal_cookie(RETURN_COOKIE))
                    .insert_header(("Location", return_to))
                    .finish()
            }
            Err(e) => {
                warn!("GitHub OAuth callback failed: {}", e);
                HttpResponse::Found()
                    .cookie(Self::removal_cookie(STATE_COOKIE))
                    .cookie(Self::removal_cookie(RETURN_COOKIE))
                    .insert_header(("Location", "/"))
                    .finish()
            }
        }
    }

    /// `GET /auth/logout` — drop the session cookie.
    pub async fn handle_logout() -> impl Responder {
        HttpResponse::Found()
            .cookie(Self::removal_cookie(SESSION_COOKIE))
            .insert_header(("Location", "/"))
            .finish()
    }

    async fn complete_login(
        req: &HttpRequest,
        query: &CallbackQuery,
        collections: &Collections,
        session: &SessionService,
    ) -> Result<String> {
        let code = query
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ShortgateError::oauth("Callback without a code"))?
            .to_string();
        let state = query
            .state
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ShortgateError::oauth("Callback without a state"))?;

        let cookie_state = req
            .cookie(STATE_COOKIE)
            .map(|c| c.value().to_string())
            .unwrap_or_default();
        if cookie_state.is_empty() || cookie_state != state {
            return Err(ShortgateError::oauth("State cookie mismatch"));
        }

        let access_token = tokio::task::spawn_blocking(move || Self::exchange_code(&code))
            .await
            .map_err(|e| ShortgateError::oauth(e.to_string()))??;

        let profile =
            tokio::task::spawn_blocking(move || Self::fetch_profile(&access_token))
                .await
                .map_err(|e| ShortgateError::oauth(e.to_string()))??;

        let user = Self::find_or_create_user(collections, profile).await?;
        session.issue(&user.id)
    }

    /// Match the provider profile id against the stored users; create a
    /// fresh record only when nothing matches.
    async fn find_or_create_user(
        collections: &Collections,
        profile: serde_json::Value,
    ) -> Result<User> {
        let provider_id = profile
            .get("id")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ShortgateError::oauth("Provider profile without an id"))?;

        let existing = collections
            .users
            .filter(Box::new(move |u: &User| u.provider_id == provider_id))
            .await?;
        if let Some(user) = existing.into_iter().next() {
            return Ok(user);
        }

        let login = profile
            .get("login")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            provider_id,
            login,
            profile,
            created_at: chrono::Utc::now(),
        };
        collections.users.set(&user.id, user.clone()).await?;
        info!("Created user {} for provider id {}", user.id, provider_id);
        Ok(user)
    }

    fn exchange_code(code: &str) -> Result<String> {
        let config = get_config();
        let payload = serde_json::json!({
            "client_id": config.oauth.client_id,
            "client_secret": config.oauth.client_secret,
            "code": code,
            "redirect_uri": format!("{}/auth/github/callback", config.oauth.callback_base),
        });

        let response = get_agent()
            .post(GITHUB_TOKEN_URL)
            .header("Accept", "application/json")
            .send_json(&payload)
            .map_err(|e| ShortgateError::oauth(format!("Token exchange failed: {}", e)))?;

        let value: serde_json::Value = response
            .into_body()
            .read_json()
            .map_err(|e| ShortgateError::oauth(format!("Token response unreadable: {}", e)))?;

        match value.get("access_token").and_then(|v| v.as_str()) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => {
                let reason = value
                    .get("error_description")
                    .or_else(|| value.get("error"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("no access token in response");
                Err(ShortgateError::oauth(format!(
                    "Token exchange rejected: {}",
                    reason
                )))
            }
        }
    }

    fn fetch_profile(access_token: &str) -> Result<serde_json::Value> {
        let response = get_agent()
            .get(GITHUB_USER_URL)
            .header("Authorization", &format!("Bearer {}", access_token))
            .header("User-Agent", "shortgate")
            .call()
            .map_err(|e| ShortgateError::oauth(format!("Profile fetch failed: {}", e)))?;

        response
            .into_body()
            .read_json()
            .map_err(|e| ShortgateError::oauth(format!("Profile unreadable: {}", e)))
    }

    /// Only site-relative paths are accepted as a return target.
    fn sanitize_return_to(raw: Option<&str>) -> String {
        match raw {
            Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
            _ => "/".to_string(),
        }
    }

    fn handshake_cookie(name: &'static str, value: &str) -> Cookie<'static> {
        Cookie::build(name, value.to_string())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(HANDSHAKE_COOKIE_SECS))
            .finish()
    }

    fn removal_cookie(name: &'static str) -> Cookie<'static> {
        Cookie::build(name, "")
            .path("/")
            .http_only(true)
            .max_age(CookieDuration::ZERO)
            .finish()
    }
}

/// Auth route wiring.
pub fn auth_routes() -> Scope {
    web::scope("/auth")
        .route("/github", web::get().to(AuthService::handle_login))
        .route("/github/callback", web::get().to(AuthService::handle_callback))
        .route("/logout", web::get().to(AuthService::handle_logout))
}
