use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use redis::aio::ConnectionManager;
use revocation_store::RevocationStore;
use sqlx::postgres::PgPoolOptions;
use token_codec::TokenCodec;
use tracing_subscriber::EnvFilter;

use shop_auth_service::config::Config;
use shop_auth_service::middleware::RequestLogging;
use shop_auth_service::routes;
use shop_auth_service::services::{Mailer, OAuthService, TokenLifecycle};
use shop_auth_service::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = redis::Client::open(config.redis_url.as_str())?;
    let redis = ConnectionManager::new(redis_client).await?;
    let revocations = RevocationStore::new(redis);

    let codec = Arc::new(
        TokenCodec::new(
            config.jwt_access_key.as_bytes(),
            config.jwt_refresh_key.as_bytes(),
            config.jwt_reset_key.as_bytes(),
        )
        .with_ttls(
            chrono::Duration::seconds(config.access_token_ttl_secs),
            chrono::Duration::seconds(config.refresh_token_ttl_secs),
            chrono::Duration::seconds(config.reset_token_ttl_secs),
        ),
    );

    let lifecycle = TokenLifecycle::new(codec, pool.clone(), revocations);

    let mailer = match config.smtp() {
        Some(settings) => Some(Mailer::new(&settings)?),
        None => {
            tracing::warn!("smtp not configured; password reset emails are disabled");
            None
        }
    };

    let oauth = OAuthService::from_config(&config);
    if oauth.is_none() {
        tracing::warn!("oauth not configured; social login is disabled");
    }

    let bind_addr = (config.server_host.clone(), config.server_port);
    let state = AppState {
        pool,
        config,
        lifecycle,
        mailer,
        oauth,
    };

    tracing::info!(host = %bind_addr.0, port = bind_addr.1, "starting auth service");

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(RequestLogging)
            .configure(|cfg| routes::configure(cfg, &state))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
