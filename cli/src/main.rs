use std::sync::Arc;

use clap::Parser;

use cli::args::{Cli, Command};
use cli::config::AppConfig;
use cli::{commands, run};
use common::logger::init_logger;
use subscriber::SubscriberManager;
use subscriber::store::SqliteSettingsStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let cfg = AppConfig::from_env()?;

    init_logger("dealwatch", cfg.log_format());

    match args.command {
        Command::Run => {
            tracing::info!("starting dealwatch monitor");
            run::run(cfg).await
        }
        command => {
            let store = Arc::new(SqliteSettingsStore::new(&cfg.database_url).await?);
            let manager = SubscriberManager::new(store)
                .await?
                .with_admins(cfg.admin_ids.iter().copied());
            let out = commands::execute(&manager, command).await?;
            println!("{out}");
            Ok(())
        }
    }
}
