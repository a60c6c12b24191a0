use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage, HttpResponse};
use tracing::debug;

use crate::session::{SessionService, SESSION_COOKIE};
use crate::storage::{Collections, User};

/// The authenticated user, inserted into request extensions for handlers
/// behind the guard.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub struct SessionGuard;

impl SessionGuard {
    /// Admin scope guard: a valid session cookie whose user still
    /// resolves in storage, or a redirect into the OAuth login with the
    /// original path as the return target.
    pub async fn admin_guard(
        req: ServiceRequest,
        next: Next<BoxBody>,
    ) -> Result<ServiceResponse<BoxBody>, Error> {
        if let Some(user) = Self::authenticated_user(&req).await {
            req.extensions_mut().insert(CurrentUser(user));
            return next.call(req).await;
        }

        let login_query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("returnTo", req.path())
            .finish();

        debug!("Unauthenticated admin request to {}", req.path());
        Ok(req.into_response(
            HttpResponse::Found()
                .insert_header(("Location", format!("/auth/github?{}", login_query)))
                .finish(),
        ))
    }

    async fn authenticated_user(req: &ServiceRequest) -> Option<User> {
        let session = req.app_data::<web::Data<SessionService>>()?;
        let collections = req.app_data::<web::Data<Collections>>()?;

        let cookie = req.request().cookie(SESSION_COOKIE)?;
        let claims = match session.verify(cookie.value()) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Session token rejected: {}", e);
                return None;
            }
        };

        // The token only references the user; the record itself decides.
        match collections.users.get(&claims.sub).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                debug!("Session for unknown user id: {}", claims.sub);
                None
            }
            Err(e) => {
                debug!("User lookup failed during session check: {}", e);
                None
            }
        }
    }
}
