use clap::Parser;
use certward_api::{config::CertwardConfig, server};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CertwardConfig::parse();

    let (router, api, engine) = server::make(&config)?;

    if config.dump_openapi {
        let json = api.to_pretty_json()?;
        print!("{}", json);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or("certward_api=info,certward_db=info".into()),
        )
        .pretty()
        .init();

    let listener = TcpListener::bind(config.bind_addr).await?;

    info!("Listening on http://{:?}", config.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("Shutting down, further revocations are no-ops");
            engine.set_tainted(true);
        })
        .await?;

    Ok(())
}
