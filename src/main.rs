use std::env;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use config::{Config, Environment, File};
use dotenvy::dotenv;
use tera::Tera;

use blogicum::db::{establish_connection_pool, run_migrations};
use blogicum::models::config::ServerConfig;
use blogicum::repository::DieselRepository;
use blogicum::routes::{configure, error_pages};

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    Config::builder()
        .add_source(File::with_name("config/default"))
        .add_source(File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(Environment::with_prefix("APP"))
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let server_config = match load_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let secret_key = match Key::try_from(server_config.secret.as_bytes()) {
        Ok(key) => key,
        Err(e) => {
            log::error!("Invalid secret, at least 64 bytes are required: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool) {
        log::error!("Failed to run database migrations: {e}");
        std::process::exit(1);
    }

    let templates = format!("{}/**/*", server_config.templates_dir);
    let tera = match Tera::new(&templates) {
        Ok(tera) => tera,
        Err(e) => {
            log::error!("Failed to parse templates: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&server_config.media_root) {
        log::error!("Failed to create media root {}: {e}", server_config.media_root);
        std::process::exit(1);
    }

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let bind_address = (server_config.bind_address.clone(), server_config.port);
    log::info!(
        "Starting server at http://{}:{}",
        bind_address.0,
        bind_address.1
    );

    let repo = DieselRepository::new(pool);
    let server_config = web::Data::new(server_config);
    let tera = web::Data::new(tera);

    HttpServer::new(move || {
        App::new()
            .wrap(error_pages())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(Logger::default())
            .service(Files::new(&server_config.static_url, &server_config.static_root))
            .service(Files::new(&server_config.media_url, &server_config.media_root))
            .configure(configure)
            .app_data(web::Data::new(repo.clone()))
            .app_data(server_config.clone())
            .app_data(tera.clone())
    })
    .bind(bind_address)?
    .run()
    .await
}
