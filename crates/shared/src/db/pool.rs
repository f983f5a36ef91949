use async_trait::async_trait;
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use crate::db::connection::Connector;
use crate::AppConfig;

#[derive(Clone)]
pub struct Db(pub Pool<Postgres>);

impl Db {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self(pool))
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.0).await?;
        Ok(())
    }
}

/// Opens the Postgres pool and brings the schema up to date.
pub struct PgConnector {
    database_url: Option<String>,
    max_connections: u32,
}

impl PgConnector {
    pub fn new(cfg: &AppConfig) -> Self {
        Self { database_url: cfg.database_url.clone(), max_connections: cfg.max_connections }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Conn = Db;

    async fn connect(&self) -> anyhow::Result<Db> {
        let url = self
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DEVEVENT_DATABASE_URL is not set"))?;
        let db = Db::connect(url, self.max_connections).await?;
        db.migrate().await?;
        Ok(db)
    }
}
