use skin_vision::AnalysisPool;
use skin_vision_server::{AppState, ServerConfig, start_server};
use tracing_subscriber::{EnvFilter, fmt};

fn init_logging() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = "skin_vision=info".parse() {
        filter = filter.add_directive(d);
    }
    if let Ok(d) = "skin_vision_server=info".parse() {
        filter = filter.add_directive(d);
    }

    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    // Bind address and worker count from env or defaults
    let cfg = ServerConfig::from_env()?;
    let state = AppState::new(AnalysisPool::new(cfg.pipeline_config()));

    let (_addr, handle) = start_server(state, &cfg).await?;
    // Park forever
    handle.await.ok();
    Ok(())
}
