use guberspiel_server::core::{AppState, Config};
use guberspiel_server::create_router;
use guberspiel_server::notify::Notifier;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Inizializza il logging strutturato (RUST_LOG per il filtro, default info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Carica la configurazione dalle variabili d'ambiente
    let config = Config::from_env()?;
    config.print_info();

    // Crea il pool di connessioni al database
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
        .connect(&config.database_url)
        .await?;

    info!("Connected to database");

    // Applica le migrazioni pendenti
    sqlx::migrate!("./migrations").run(&pool).await?;

    let notifier = Notifier::new(config.notification_url.clone());
    let state = Arc::new(AppState::new(pool, config.jwt_secret.clone(), notifier));

    // Crea il router
    let app = create_router(state);

    // Avvia il server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
