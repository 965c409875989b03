use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::net::TcpListener;
use std::sync::Arc;

use zentry_server::clients::http_client::new_backend_client;
use zentry_server::clients::{CallableFunctionsClient, FirestoreClient};
use zentry_server::config::init_config;
use zentry_server::handlers;
use zentry_server::routes::{configure_api_routes, json_config, not_found};
use zentry_server::services::auth::{
    init_admin_services, AccessTokenSource, FirebaseTokenVerifier, IdentityVerifier,
};
use zentry_server::services::{DocumentService, GuardiaService, SessionCookieManager};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_settings = match init_config() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load application settings: {}", e);
            log::error!("Cannot start server without valid settings");
            std::process::exit(1);
        }
    };

    let http_client = match new_backend_client() {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to build backend HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let verifier: Arc<dyn IdentityVerifier> =
        Arc::new(FirebaseTokenVerifier::new(http_client.clone(), &app_settings));

    // Optional: without a service account the admin delete and claims
    // endpoints answer 503 and everything else keeps working
    let admin_services = init_admin_services(http_client.clone(), &app_settings);
    if let Some(admin) = &admin_services {
        log::info!("Admin services ready for project {}", admin.project_id());
    }

    let functions = Arc::new(CallableFunctionsClient::new(http_client.clone(), &app_settings));
    let guardia_service = web::Data::new(GuardiaService::new(functions));

    let token_source = admin_services
        .clone()
        .map(|admin| admin as Arc<dyn AccessTokenSource>);
    let firestore = Arc::new(FirestoreClient::new(http_client, &app_settings));
    let document_service = web::Data::new(DocumentService::new(firestore, token_source));

    let session_cookies = web::Data::new(SessionCookieManager::new(&app_settings));
    let admin_services = web::Data::new(admin_services);

    let host = &app_settings.server.host;
    let port = app_settings.server.port;

    log::info!(
        "Starting {} ({}) at http://{}:{}",
        app_settings.app.name,
        app_settings.app.environment,
        host,
        port
    );

    let server_addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(server_addr)?;
    let cors_origins = app_settings.server.cors_origins.clone();

    HttpServer::new(move || {
        let verifier = verifier.clone();

        let mut cors = Cors::default().supports_credentials();

        if cors_origins.iter().any(|o| o == "*") {
            cors = cors.allow_any_origin();
        } else {
            for origin in &cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        cors = cors.allow_any_method().allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(json_config())
            .app_data(session_cookies.clone())
            .app_data(guardia_service.clone())
            .app_data(document_service.clone())
            .app_data(admin_services.clone())
            .service(
                web::resource("/health")
                    .route(web::get().to(handlers::health::health_check))
            )
            .service(
                web::scope("/api")
                    .configure(|cfg| configure_api_routes(cfg, verifier))
            )
            .default_service(web::to(not_found))
    })
    .listen(listener)?
    .run()
    .await
}
