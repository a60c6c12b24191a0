use actix_web::middleware::{from_fn, Compress};
use actix_web::{web, App, HttpServer};
use tracing::info;

use shortgate::config::get_config;
use shortgate::middleware::SessionGuard;
use shortgate::services::admin::admin_routes;
use shortgate::services::auth::auth_routes;
use shortgate::services::create::CreateService;
use shortgate::services::docs::DocsService;
use shortgate::services::flag::FlagService;
use shortgate::services::redirect::RedirectService;
use shortgate::session::SessionService;
use shortgate::storage::StorageFactory;
use shortgate::system::logging::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = get_config();
    let _log_guard = init_logging(config);

    let collections = StorageFactory::create(&config.storage).expect("Failed to create storage");
    info!("Using storage backend: {}", config.storage.backend);

    if config.oauth_enabled() {
        info!("GitHub login enabled, admin area at /admin");
    } else {
        info!("GitHub OAuth not configured, admin area is unreachable");
    }
    if config.webhook.url.is_empty() {
        info!("Trap notifications disabled (no webhook URL)");
    }

    let flag_token = FlagService::flag_token();
    let session = SessionService::from_config(config);

    let collections = web::Data::new(collections);
    let session = web::Data::new(session);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(collections.clone())
            .app_data(session.clone())
            .wrap(Compress::default())
            .service(auth_routes())
            .service(admin_routes().wrap(from_fn(SessionGuard::admin_guard)))
            .route("/", web::post().to(CreateService::handle_create))
            .service(
                web::resource(format!("/flag/{}", flag_token))
                    .route(web::route().to(FlagService::handle_flag)),
            )
            .route("/{shortcode}", web::get().to(RedirectService::handle_redirect))
            .route("/{shortcode}", web::post().to(RedirectService::handle_redirect))
            .default_service(web::route().to(DocsService::handle_default))
    })
    .bind(bind_address)?
    .run()
    .await
}
