use anyhow::Result;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = atrium_server::AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let router = atrium_server::build(config).await?;

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, router).await?;

    Ok(())
}
