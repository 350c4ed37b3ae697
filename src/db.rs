use migration::Migrator;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use crate::{config::Config, error::AppResult};

pub async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    let db = Database::connect(config.database_url.as_str()).await?;

    if config.migrate_on_start {
        Migrator::up(&db, None).await?;
        tracing::info!("movies schema is up to date");
    }

    // Fail at startup rather than on the first render if the file is not a database.
    db.execute(Statement::from_string(db.get_database_backend(), "SELECT 1".to_string())).await?;

    Ok(db)
}
