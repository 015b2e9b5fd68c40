use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::shared::config::Config;

pub struct Database {
  pub pool: Arc<Pool<Postgres>>,
}

impl Database {
  /// Connects and brings the schema up to date.
  pub async fn new(config: &Config) -> Result<Self, sqlx::Error> {
    let pool = prepare_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("database migrations applied");
    Ok(Self {
      pool: Arc::new(pool),
    })
  }
}

pub async fn prepare_pool(database_url: &str) -> Result<Pool<Postgres>, sqlx::Error> {
  PgPoolOptions::new()
    .max_connections(10)
    .connect(database_url)
    .await
}
