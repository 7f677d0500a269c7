use anyhow::Context;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// `None` when `DATABASE_URL` is unset; the server then keeps contacts in memory.
    pub database: Option<DatabaseConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_POOL_SIZE: u32 = 5;

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match read("SERVER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("SERVER_PORT must be a port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let database = match read("DATABASE_URL") {
            Some(url) => {
                let pool_size = match read("DATABASE_POOL_SIZE") {
                    Some(raw) => raw
                        .parse::<u32>()
                        .ok()
                        .filter(|size| *size > 0)
                        .with_context(|| {
                            format!("DATABASE_POOL_SIZE must be a positive integer, got '{raw}'")
                        })?,
                    None => DEFAULT_POOL_SIZE,
                };
                Some(DatabaseConfig { url, pool_size })
            }
            None => None,
        };

        Ok(AppConfig {
            server: ServerConfig {
                host: read("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
            },
            database,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, anyhow::Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_database() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.database, None);
        assert_eq!(config.bind_address(), "127.0.0.1:3001");
    }

    #[test]
    fn test_reads_server_and_database() {
        let config = config_from(&[
            ("SERVER_HOST", "0.0.0.0"),
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "postgres://app:secret@db/addressbook"),
            ("DATABASE_POOL_SIZE", "12"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(
            config.database,
            Some(DatabaseConfig {
                url: "postgres://app:secret@db/addressbook".to_string(),
                pool_size: 12,
            })
        );
    }

    #[test]
    fn test_blank_database_url_means_memory() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database.is_none());
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(config_from(&[("SERVER_PORT", "http")]).is_err());
        assert!(config_from(&[("DATABASE_URL", "postgres://db/x"), ("DATABASE_POOL_SIZE", "0")]).is_err());
    }
}
