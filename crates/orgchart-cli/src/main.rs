//! Interactive shell for the orgchart employee tracker.
//!
//! Usage:
//!   orgchart        - ensure the schema exists and open the menu
//!   orgchart seed   - additionally insert baseline demo data first
//!
//! Connection settings come from `DB_*` environment variables (a `.env`
//! file is honored); see `orgchart-db` for the variables and defaults.

mod menu;
mod prompt;
mod render;

use orgchart_db::{DbConfig, Store};
use owo_colors::OwoColorize;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Log to stderr so tables and prompts on stdout stay clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("{}", format!("fatal: {e}").red());
        std::process::exit(1);
    }
}

async fn run() -> Result<(), orgchart_db::Error> {
    let config = DbConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        dbname = %config.dbname,
        "connecting"
    );

    let store = Store::new(config.create_pool()?);
    store.ensure_schema().await?;

    let seed = std::env::args().nth(1).is_some_and(|arg| arg == "seed");
    if seed {
        store.seed_baseline().await?;
        println!("Baseline data seeded.");
    }

    menu::run(&store).await
}
