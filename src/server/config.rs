use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_db_connections")]
    pub max_db_connections: u32,

    /// Allowed CORS origin. Any origin is accepted when unset.
    #[serde(default)]
    pub cors_allow_origin: Option<String>,

    /// Accounts with these emails are made administrators when they register
    /// or log in. Stored trimmed and lowercased.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    max_db_connections: Option<u32>,
    cors_allow_origin: Option<String>,
    admin_emails: Option<Vec<String>>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_max_db_connections() -> u32 {
    10
}

impl PartialServerConfig {
    fn from_file(config_path: Option<&str>) -> Result<Self, String> {
        let Some(path_str) = config_path else {
            return Ok(Self::default());
        };
        let path = Path::new(path_str);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
    }

    /// Fields set here win over `base`.
    fn merge_over(self, base: PartialServerConfig) -> Result<ServerConfig, String> {
        Ok(ServerConfig {
            database_url: self.database_url.or(base.database_url)
                .ok_or("DATABASE_URL is required")?,
            jwt_secret: self.jwt_secret.or(base.jwt_secret)
                .ok_or("JWT_SECRET is required")?,
            listen_addr: self.listen_addr.or(base.listen_addr)
                .unwrap_or_else(default_listen_addr),
            log_dir: self.log_dir.or(base.log_dir)
                .unwrap_or_else(default_log_dir),
            max_db_connections: self.max_db_connections.or(base.max_db_connections)
                .unwrap_or_else(default_max_db_connections),
            cors_allow_origin: self.cors_allow_origin.or(base.cors_allow_origin),
            admin_emails: self.admin_emails.or(base.admin_emails)
                .unwrap_or_default()
                .into_iter()
                .map(|email| email.trim().to_lowercase())
                .filter(|email| !email.is_empty())
                .collect(),
        })
    }
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = PartialServerConfig::from_file(config_path)?;

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        env_config.merge_over(file_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_overrides_file_and_defaults_fill_gaps() {
        let file: PartialServerConfig = toml::from_str(
            r#"
            database_url = "postgres://file/db"
            jwt_secret = "file-secret"
            max_db_connections = 4
            "#,
        )
        .unwrap();
        let env = PartialServerConfig {
            jwt_secret: Some("env-secret".to_string()),
            ..Default::default()
        };

        let config = env.merge_over(file).unwrap();
        assert_eq!(config.database_url, "postgres://file/db");
        assert_eq!(config.jwt_secret, "env-secret");
        assert_eq!(config.max_db_connections, 4);
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.log_dir, "logs");
        assert!(config.cors_allow_origin.is_none());
        assert!(config.admin_emails.is_empty());
    }

    #[test]
    fn test_admin_emails_are_normalized() {
        let file: PartialServerConfig = toml::from_str(
            r#"
            database_url = "sqlite::memory:"
            jwt_secret = "secret"
            admin_emails = [" Root@Example.com ", ""]
            "#,
        )
        .unwrap();

        let config = PartialServerConfig::default().merge_over(file).unwrap();
        assert_eq!(config.admin_emails, vec!["root@example.com".to_string()]);
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let file = PartialServerConfig {
            database_url: Some("sqlite::memory:".to_string()),
            ..Default::default()
        };
        let result = PartialServerConfig::default().merge_over(file);
        assert_eq!(result.unwrap_err(), "JWT_SECRET is required");
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let partial = PartialServerConfig::from_file(Some("/nonexistent/skillbridge.toml")).unwrap();
        assert!(partial.database_url.is_none());
    }
}
