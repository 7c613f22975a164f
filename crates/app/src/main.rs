use clap::Parser;
use engine::{
    PeriodStore,
    storage::{DatabaseProvider, FileProvider, MemoryProvider, SnapshotProvider},
};
use migration::{Migrator, MigratorTrait};
use settings::{Settings, Storage};

mod cli;
mod commands;
mod error;
mod settings;

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = cli::Cli::parse();
    let settings = Settings::load(cli.overrides())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pocket={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    match &settings.storage {
        Storage::Memory => {
            tracing::debug!("using in-memory storage");
            run(MemoryProvider::default(), &settings, cli.command).await
        }
        Storage::File(dir) => {
            tracing::debug!("using file storage in {dir}");
            run(FileProvider::new(dir), &settings, cli.command).await
        }
        Storage::Sqlite(path) => {
            tracing::debug!("using sqlite storage at {path}");
            let database = connect(path).await?;
            run(DatabaseProvider::new(database), &settings, cli.command).await
        }
    }
}

async fn run<P: SnapshotProvider>(
    provider: P,
    settings: &Settings,
    command: cli::Command,
) -> error::Result<()> {
    let mut store = PeriodStore::builder()
        .provider(provider)
        .seed_defaults(settings.seed_defaults)
        .build()
        .await?;

    let result = commands::execute(&mut store, command).await;
    for notice in store.take_notices() {
        eprintln!(
            "warning: could not save {}: {}",
            notice.key.as_str(),
            notice.message
        );
    }
    result
}

async fn connect(path: &str) -> error::Result<sea_orm::DatabaseConnection> {
    let url = format!("sqlite:{path}?mode=rwc");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
