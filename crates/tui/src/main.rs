mod app;
mod config;
mod error;
mod local_state;
mod quick_add;
mod ui;

use migration::{Migrator, MigratorTrait};

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "bilancio={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let database = sea_orm::Database::connect(settings.database_url()).await?;
    Migrator::up(&database, None).await?;

    let timezone = settings.parsed_timezone()?;
    let currency = settings.parsed_currency()?;

    let engine = engine::Engine::builder()
        .database(database)
        .timezone(timezone)
        .build()
        .await?;

    let mut app = app::App::new(engine, currency)?;
    app.run().await?;

    Ok(())
}
