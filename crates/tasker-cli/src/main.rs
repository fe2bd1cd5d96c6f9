mod config;
mod repl;

use tracing::info;

use tasker_db::Database;
use tasker_service::TaskerService;

use crate::config::Config;
use crate::repl::Repl;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they stay out of the menu
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasker=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = Database::new(config.db)?;
    db.bootstrap()?;

    info!("Task manager ready");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    Repl::new(TaskerService::new(db), stdin, std::io::stdout())
        .run()
        .await
}
