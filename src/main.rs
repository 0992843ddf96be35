use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use voice_clip_bot::clip::prune_older_than;
use voice_clip_bot::config::Config;
use voice_clip_bot::console::{self, ConsoleMessenger};
use voice_clip_bot::{telemetry, BotState, ChatId, Dispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize telemetry
    telemetry::init(&config.telemetry)?;
    tracing::info!("voice-clip-bot starting");

    let state = BotState::from_config(&config).await?;
    tracing::info!(dir = %state.registry.dir().display(), "clip registry ready");

    let mut dispatcher = Dispatcher::new(state, ConsoleMessenger::new(tokio::io::stdout()));
    let chat = ChatId("console".to_owned());

    let mut sweep = tokio::time::interval(config.sweep_interval());
    let mut retention = tokio::time::interval(config.retention_interval());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // Main event loop: one event at a time
    tracing::info!("event loop starting (press Ctrl+C to exit)");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    tracing::info!("stdin closed");
                    break;
                };
                match console::parse_line(&line, &chat).await {
                    Ok(event) => dispatcher.handle(&event).await,
                    Err(e) => tracing::warn!("ignoring input: {e:#}"),
                }
            }
            _ = sweep.tick() => {
                dispatcher.sweep_expired();
            }
            _ = retention.tick() => {
                if let Some(max_age) = config.retention_max_age() {
                    match prune_older_than(&dispatcher.state().registry, max_age).await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(deleted = n, "retention pass complete"),
                        Err(e) => tracing::warn!("retention pass failed: {e}"),
                    }
                }
            }
        }
    }

    Ok(())
}
