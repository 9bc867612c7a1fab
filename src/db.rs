use sea_orm::{Database, DatabaseConnection, DbErr};
use std::env;

/// Open a pooled connection to the Postgres database named by `DATABASE_URL`.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    let db_url = env::var("DATABASE_URL")
        .map_err(|_| DbErr::Custom("DATABASE_URL must be set".to_string()))?;

    tracing::info!("Connecting to database");

    Database::connect(&db_url).await
}
