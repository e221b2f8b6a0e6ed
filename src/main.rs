pub mod config;
pub mod health;
pub mod modules;
pub mod shared;

pub use modules::upload;

use std::env;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::UploadConfig;
use crate::upload::adapter::incoming::web::routes::upload_routes;
use crate::upload::adapter::outgoing::github::GithubContentStore;
use crate::upload::application::ports::outgoing::content_store::ContentStore;
use crate::upload::application::use_cases::UploadImageUseCase;

#[derive(Clone)]
pub struct AppState {
    pub config: UploadConfig,
    pub upload_image: Arc<UploadImageUseCase>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = UploadConfig::from_env();
    if config.github_token.is_none() {
        warn!("GITHUB_TOKEN is not set; uploads will fail until it is configured");
    }

    let store: Arc<dyn ContentStore> = Arc::new(GithubContentStore::new(
        config.owner.clone(),
        config.repo.clone(),
        config.github_token.clone().unwrap_or_default(),
    ));

    let state = AppState {
        config: config.clone(),
        upload_image: Arc::new(UploadImageUseCase::new(config.clone(), store)),
    };

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid u16");

    info!(
        %host,
        port,
        owner = %config.owner,
        repo = %config.repo,
        branch = %config.branch,
        folder = %config.folder,
        "Starting image upload service"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(health::health)
            .configure(upload_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
