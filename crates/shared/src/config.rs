use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub store: StoreKind,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub cloudinary_cloud_name: Option<String>,
    #[serde(default)]
    pub cloudinary_api_key: Option<String>,
    #[serde(default)]
    pub cloudinary_api_secret: Option<String>,
    #[serde(default = "default_upload_folder")]
    pub upload_folder: String,
    #[serde(default)]
    pub seed_demo: bool,
}

fn default_listen_addr() -> String { "0.0.0.0:8080".into() }
fn default_max_connections() -> u32 { 10 }
fn default_upload_folder() -> String { "events".into() }

impl AppConfig {
    pub fn from_env() -> Result<Self, figment::Error> {
        dotenvy::dotenv().ok();
        Self::from_figment(figment::Figment::new().merge(figment::providers::Env::prefixed("DEVEVENT_")))
    }

    pub fn from_figment(fig: figment::Figment) -> Result<Self, figment::Error> {
        fig.extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::{providers::Env, Figment, Jail};

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        Jail::expect_with(|jail| {
            jail.set_env("DEVEVENT_DATABASE_URL", "postgres://localhost/devevent");
            let cfg = AppConfig::from_figment(Figment::new().merge(Env::prefixed("DEVEVENT_")))?;
            assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/devevent"));
            assert_eq!(cfg.store, StoreKind::Postgres);
            assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
            assert_eq!(cfg.max_connections, 10);
            assert_eq!(cfg.upload_folder, "events");
            assert!(!cfg.seed_demo);
            Ok(())
        });
    }

    #[test]
    fn memory_store_and_seed_flag() {
        Jail::expect_with(|jail| {
            jail.set_env("DEVEVENT_STORE", "memory");
            jail.set_env("DEVEVENT_SEED_DEMO", "true");
            let cfg = AppConfig::from_figment(Figment::new().merge(Env::prefixed("DEVEVENT_")))?;
            assert_eq!(cfg.store, StoreKind::Memory);
            assert!(cfg.seed_demo);
            assert!(cfg.database_url.is_none());
            Ok(())
        });
    }
}
