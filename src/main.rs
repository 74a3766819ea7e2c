use std::sync::Arc;

use retention_assist::config::AppConfig;
use retention_assist::narrative::{NarrativeAugmenter, OllamaService};
use retention_assist::routes::{AppState, chat_routes};
use retention_assist::session::{SessionManager, spawn_expiry_task};
use retention_assist::student::MockDirectory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("🎓 Retention Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Narrative service: {} (model: {})",
        config.narrative.base_url, config.narrative.model
    );
    eprintln!(
        "   Profiles: scoring={:?}, parsing={:?}, baseline questions={}",
        config.assessment.scoring, config.assessment.parsing, config.assessment.include_baseline
    );
    eprintln!("   Chat API: http://0.0.0.0:{}/api/start-chat\n", config.port);

    let directory = Arc::new(MockDirectory::seeded());
    let narrative = Arc::new(OllamaService::new(&config.narrative));
    let augmenter = NarrativeAugmenter::new(narrative, config.narrative.timeout);
    let sessions = Arc::new(SessionManager::new(
        directory,
        augmenter,
        config.assessment.clone(),
    ));

    // Idle sessions are swept out in the background.
    let _sweep = spawn_expiry_task(Arc::clone(&sessions), config.session_idle_timeout);

    let app = chat_routes(AppState { sessions });
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Chat server started");
    axum::serve(listener, app).await?;

    Ok(())
}
