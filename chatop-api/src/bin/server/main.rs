use std::sync::Arc;

use auth::AuthenticationGate;
use auth::Authenticator;
use auth::KeyPair;
use chatop_api::config::Config;
use chatop_api::domain::user::service::UserService;
use chatop_api::inbound::http::router::create_router;
use chatop_api::inbound::http::routes::public_routes;
use chatop_api::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatop_api=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "chatop-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        keystore = %config.keystore.path.display(),
        key_alias = %config.keystore.key_alias,
        token_lifetime_secs = config.jwt.lifetime_secs,
        token_leeway_secs = config.jwt.leeway_secs,
        "Configuration loaded"
    );

    // Without signing keys there is nothing to serve.
    let key_pair = KeyPair::load(&config.keystore).map_err(|e| {
        tracing::error!(error = %e, "Failed to load signing keys");
        e
    })?;

    let authenticator = Arc::new(Authenticator::new(
        key_pair,
        config.jwt.token_settings(),
        config.password,
    )?);

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let user_service = Arc::new(UserService::new(
        user_repository,
        Arc::clone(&authenticator),
    ));
    let gate = Arc::new(AuthenticationGate::new(
        public_routes(),
        authenticator.validator(),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(user_service, gate)).await?;

    Ok(())
}
