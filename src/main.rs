use heartrisk::{config, model, server, telemetry};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Init
    telemetry::init_tracing();
    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    // 2. Load Config
    let config = config::AppConfig::load(config::DEFAULT_CONFIG_PATH)?;

    // 3. Load Model
    let loaded = match model::loader::load_model(&config.model) {
        Ok(loaded) => Some(loaded),
        Err(e) if config.model.required => return Err(e.into()),
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %config.model.path,
                "model unavailable, predictions will report an error"
            );
            None
        }
    };

    // 4. Create Router
    let app = server::routes::create_router(loaded, config.model.path.clone(), metrics_handle);

    // 5. Bind & Serve
    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}
