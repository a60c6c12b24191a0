use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Responder, Scope};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::middleware::CurrentUser;
use crate::storage::{format_record, Collections, ShortcodeRecord};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub data: T,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ListLinksQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaginatedResponse<T> {
    pub code: i32,
    pub data: T,
    pub pagination: PaginationInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaginationInfo {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AdminLink {
    pub shortcode: String,
    pub redirect: String,
    pub status: u16,
    pub created_at: String,
}

impl AdminLink {
    fn from_record(record: &ShortcodeRecord) -> Self {
        let formatted = format_record(record);
        Self {
            shortcode: formatted.shortcode,
            redirect: formatted.redirect,
            status: formatted.status,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

pub struct AdminService;

impl AdminService {
    /// `GET /admin/me` — the session user the guard resolved.
    pub async fn get_me(req: HttpRequest) -> impl Responder {
        match req.extensions().get::<CurrentUser>() {
            Some(CurrentUser(user)) => HttpResponse::Ok().json(ApiResponse {
                code: 0,
                data: serde_json::json!({
                    "id": user.id,
                    "login": user.login,
                }),
            }),
            None => HttpResponse::Unauthorized().json(ApiResponse {
                code: 1,
                data: serde_json::json!({ "error": "No session" }),
            }),
        }
    }

    /// `GET /admin/links` — newest-first paginated listing.
    pub async fn get_all_links(
        query: web::Query<ListLinksQuery>,
        collections: web::Data<Collections>,
    ) -> impl Responder {
        let mut records = match collections.shortcodes.filter(Box::new(|_| true)).await {
            Ok(records) => records,
            Err(e) => return Self::storage_error(e),
        };

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = records.len();
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(20).clamp(1, 100);
        let total_pages = total.div_ceil(page_size);

        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total);
        let links: Vec<AdminLink> = if start < total {
            records[start..end].iter().map(AdminLink::from_record).collect()
        } else {
            vec![]
        };

        info!(
            "Admin API: returning {} links (page {} of {}, total: {})",
            links.len(),
            page,
            total_pages,
            total
        );

        HttpResponse::Ok().json(PaginatedResponse {
            code: 0,
            data: links,
            pagination: PaginationInfo {
                page,
                page_size,
                total,
                total_pages,
            },
        })
    }

    /// `GET /admin/links/{code}` — one record with its audit trail.
    pub async fn get_link(
        code: web::Path<String>,
        collections: web::Data<Collections>,
    ) -> impl Responder {
        let code = code.into_inner();

        let record = match collections.shortcodes.get(&code).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return HttpResponse::NotFound().json(ApiResponse {
                    code: 1,
                    data: serde_json::json!({ "error": "Link not found" }),
                });
            }
            Err(e) => return Self::storage_error(e),
        };

        let creation = collections.creations.get(&code).await.ok().flatten();

        let lookup_code = code.clone();
        let invocation_count = collections
            .invocations
            .filter(Box::new(move |i| i.code == lookup_code))
            .await
            .map(|records| records.len())
            .unwrap_or(0);

        HttpResponse::Ok().json(ApiResponse {
            code: 0,
            data: serde_json::json!({
                "link": AdminLink::from_record(&record),
                "creation": creation.map(|c| c.context),
                "invocations": invocation_count,
            }),
        })
    }

    fn storage_error(e: crate::errors::ShortgateError) -> HttpResponse {
        tracing::error!("Admin API storage failure: {}", e);
        HttpResponse::InternalServerError().json(ApiResponse {
            code: 1,
            data: serde_json::json!({ "error": e.to_string() }),
        })
    }
}

/// Admin route wiring; `main` wraps this scope with the session guard.
pub fn admin_routes() -> Scope {
    web::scope("/admin")
        .route("/me", web::get().to(AdminService::get_me))
        .route("/links", web::get().to(AdminService::get_all_links))
        .route("/links/{code}", web::get().to(AdminService::get_link))
}
