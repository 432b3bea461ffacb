use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use amw_backend::auth::jwt::JwtService;
use amw_backend::config::AppConfig;
use amw_backend::db;
use amw_backend::notify;
use amw_backend::routes;
use amw_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        database_url = %config.database_url,
        pool_size = config.database_max_pool_size,
        server_host = %config.server_host,
        server_port = config.server_port,
        walk_in_capacity = config.walk_in_capacity,
        authenticated_capacity = config.authenticated_capacity,
        public_holidays = config.public_holidays.len(),
        mail_relay_enabled = config.mail_relay_endpoint.is_some(),
        "loaded backend configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    {
        let mut conn = pool.get()?;
        db::run_migrations(&mut conn)?;
    }

    let notifier = notify::build_notifier(&config)?;
    let jwt = JwtService::from_config(&config)?;
    let state = AppState::new(pool, config, notifier, jwt);

    let listen_addr: SocketAddr = format!(
        "{}:{}",
        state.config.server_host, state.config.server_port
    )
    .parse()?;
    let router = routes::create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on {}", listen_addr);

    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
