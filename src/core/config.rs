use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub bot: BotConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// How long an issued session token stays valid
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Base URL of the external bot process, e.g. "http://localhost:5000"
    pub endpoint: String,
    #[serde(default = "default_bot_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "default_activity_log_days")]
    pub activity_log_days: u32,
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    pub admin_email: String,
    pub admin_password: String,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    /// Also create a demo account with a 30-day active license
    #[serde(default)]
    pub demo_user: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_session_ttl() -> i64 {
    86_400 // 24 hours
}

fn default_bot_timeout() -> u64 {
    10
}

fn default_activity_log_days() -> u32 {
    30
}

fn default_cleanup_interval() -> u64 {
    3600 // 1 hour
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            activity_log_days: default_activity_log_days(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be greater than 0");
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.session.ttl_secs <= 0 {
            bail!("session ttl_secs must be greater than 0");
        }

        if self.bot.endpoint.is_empty() {
            bail!("bot endpoint must not be empty");
        }

        if self.bot.timeout_secs == 0 {
            bail!("bot timeout_secs must be greater than 0");
        }

        if self.retention.activity_log_days == 0 {
            bail!("activity_log_days must be greater than 0");
        }

        if self.retention.cleanup_interval_secs == 0 {
            bail!("cleanup_interval_secs must be greater than 0");
        }

        if self.seed.admin_email.is_empty() {
            bail!("seed admin_email must not be empty");
        }

        if self.seed.admin_password.is_empty() {
            bail!("seed admin_password must not be empty");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for unit tests across the crate.
    pub(crate) fn for_tests() -> Self {
        Config {
            server: ServerConfig {
                port: 3000,
                num_threads: 2,
            },
            session: SessionConfig { ttl_secs: 3600 },
            bot: BotConfig {
                endpoint: "http://localhost:5000".to_string(),
                timeout_secs: 5,
            },
            retention: RetentionConfig {
                activity_log_days: 30,
                cleanup_interval_secs: 3600,
            },
            seed: SeedConfig {
                admin_email: "admin@example.com".to_string(),
                admin_password: "admin123".to_string(),
                admin_name: "Administrator".to_string(),
                demo_user: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "console".to_string(),
                console: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    const MINIMAL: &str = r#"
        [server]
        port = 3000

        [bot]
        endpoint = "http://localhost:5000"

        [seed]
        admin_email = "admin@example.com"
        admin_password = "admin123"

        [logging]
    "#;

    #[test]
    fn test_minimal_config_with_defaults() {
        let (_dir, path) = write_config(MINIMAL);
        let config = Config::from_file(&path).expect("Failed to load config");

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.session.ttl_secs, 86_400);
        assert_eq!(config.retention.activity_log_days, 30);
        assert_eq!(config.bot.timeout_secs, 10);
        assert_eq!(config.seed.admin_name, "Administrator");
        assert!(!config.seed.demo_user);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let content = MINIMAL.replace("port = 3000", "port = 0");
        let (_dir, path) = write_config(&content);
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_empty_admin_email_rejected() {
        let content = MINIMAL.replace("admin@example.com", "");
        let (_dir, path) = write_config(&content);
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let content = format!("{}\nlevel = \"verbose\"\n", MINIMAL);
        let (_dir, path) = write_config(&content);
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_retention_overrides() {
        let content = format!(
            "{}\n[retention]\nactivity_log_days = 7\ncleanup_interval_secs = 600\n",
            MINIMAL.replace("[logging]", "")
        );
        let content = format!("{}\n[logging]\n", content);
        let (_dir, path) = write_config(&content);
        let config = Config::from_file(&path).expect("Failed to load config");

        assert_eq!(config.retention.activity_log_days, 7);
        assert_eq!(config.retention.cleanup_interval_secs, 600);
    }
}
