use anyhow::Context;
use quotedesk_api::{app, AppState, AuthConfig};
use quotedesk_catalog::PricingCalculator;
use quotedesk_export::ExportTemplate;
use quotedesk_store::{Config, DbClient};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotedesk_api=debug,quotedesk_store=info,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting QuoteDesk API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;

    let calculator = PricingCalculator::new(config.pricing.gst_rate)
        .context("Invalid pricing.gst_rate")?;

    let template = ExportTemplate {
        company_name: config.export.company_name.clone(),
        company_address: config.export.company_address.clone(),
        logo_path: config.export.logo_path.clone(),
        image_dir: config.export.image_dir.clone(),
        currency_symbol: config.pricing.currency_symbol.clone(),
    };
    if !template.logo_path.exists() {
        tracing::warn!(path = %template.logo_path.display(), "Logo not found; exports will fail until it is provided");
    }

    let state = AppState::new(
        &db,
        calculator,
        template,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    );

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
