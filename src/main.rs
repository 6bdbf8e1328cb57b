use reimburse::{
    create_router,
    reimbursement::repository::PostgresReimbursementRepository,
    user::repository::PostgresUserRepository,
    AppState, Config, TokenConfig,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reimburse=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reimbursement service");

    let config = Config::from_env();
    let token_config = TokenConfig::from_config(&config);

    let app_state = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url)
                .await
                .expect("Failed to connect to database");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run database migrations");
            info!("Using PostgreSQL repositories");

            AppState::new(
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresReimbursementRepository::new(pool)),
                token_config,
            )
        }
        None => {
            warn!("DATABASE_URL is not set, data will be kept in memory only");
            AppState::in_memory(token_config)
        }
    };

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("Failed to bind listener");
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await.expect("Server error");
}
