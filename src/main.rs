use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use forms_ajaxified::app::app;
use forms_ajaxified::config::config;
use forms_ajaxified::contacts::ContactStore;

#[derive(Parser)]
#[command(name = "forms-ajaxified")]
#[command(about = "Serve the contact book through AJAX-aware form and delete views")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Interface to bind (overrides SERVER_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides SERVER_PORT / PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Seed demo contacts at startup")]
    seed: bool,

    #[arg(long, conflicts_with = "seed", help = "Start with an empty contact book")]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up APP_ENV, SERVER_PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,forms_ajaxified=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = config();
    tracing::info!("Starting forms-ajaxified in {:?} mode", config.environment);

    let store = ContactStore::new();
    let seed = (config.server.seed_demo_data || cli.seed) && !cli.no_seed;
    if seed {
        if forms_ajaxified::is_production!() {
            tracing::warn!("Seeding demo contacts in production");
        }
        store.seed_demo().await;
    }

    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(store)).await.context("server error")?;
    Ok(())
}
