use actix_files::Files;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

use vidtube::api;
use vidtube::auth::TokenIssuer;
use vidtube::config::AppConfig;
use vidtube::db::memory::MemoryStore;
use vidtube::db::DataStore;
use vidtube::services::media::{LocalMediaStore, MediaStore};
use vidtube::services::mutations::MutationCoordinator;
use vidtube::services::views::ViewComposer;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if it exists
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    let config = AppConfig::new().expect("Failed to load configuration");

    log::info!(
        "Starting server on {}:{}",
        config.server.host,
        config.server.port
    );

    // Create upload directory if it doesn't exist
    tokio::fs::create_dir_all(&config.storage.upload_path)
        .await
        .expect("Failed to create upload directory");

    let store: Arc<dyn DataStore> = Arc::new(MemoryStore::new());
    let media: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(
        config.storage.upload_path.clone(),
        config.storage.public_base_url.clone(),
    ));

    let issuer = web::Data::new(TokenIssuer::new(&config.auth));
    let views = web::Data::new(ViewComposer::new(store.clone()));
    let mutations = web::Data::new(MutationCoordinator::new(store, media));

    let upload_dir = config.storage.upload_path.clone();
    HttpServer::new(move || {
        App::new()
            .service(Files::new("/uploads", upload_dir.clone()))
            .app_data(issuer.clone())
            .app_data(views.clone())
            .app_data(mutations.clone())
            .wrap(actix_cors::Cors::permissive()) // Configure properly in production
            .configure(api::configure)
    })
    .bind((config.server.host.clone(), config.server.port))?
    .run()
    .await
}
