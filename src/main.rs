mod auth;
mod clock;
mod config;
mod db;
mod error;
mod habits;
mod session;
mod shell;
mod state;
mod store;

use crate::{
    clock::SystemClock,
    config::AppConfig,
    shell::{prompt::TerminalPrompter, Shell},
    state::AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Resolve the local offset while the process is still single-threaded.
    let clock = SystemClock::local();

    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "habit_tracker=warn,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let clock = clock.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "local utc offset unavailable; using UTC dates");
        SystemClock::utc()
    });

    let config = AppConfig::from_env()?;
    let app_state = AppState::init(&config, clock).await?;
    println!("Connected to database");

    let mut shell = Shell::new(app_state, TerminalPrompter::new(), std::io::stdout());
    shell.run().await?;

    Ok(())
}
