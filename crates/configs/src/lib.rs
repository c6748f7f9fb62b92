use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 3030, worker_threads: Some(4) }
    }
}

/// Which document store backs the `blogs` and `users` collections.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Seed the blog id counter from the largest stored id instead of 0.
    #[serde(default)]
    pub resume_ids: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::File, data_dir: default_data_dir(), resume_ids: false }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_data_dir() -> String { "data".into() }
fn default_log_format() -> String { "compact".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file if one exists, otherwise `SERVER_HOST`/`SERVER_PORT`/`DATA_DIR`
    /// on top of the defaults. A config file that exists but is invalid is an error.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = if std::path::Path::new(&config_path()).exists() {
            load_default()?
        } else {
            Self::from_env()
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Ok(dir) = std::env::var("DATA_DIR") {
            cfg.storage.data_dir = dir;
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.server.host, self.server.port).parse()?)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::File && self.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir is empty; the file backend needs a directory"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() -> Result<()> {
        let mut cfg = parse("")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.port, 3030);
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.storage.data_dir, "data");
        assert!(!cfg.storage.resume_ids);
        assert_eq!(cfg.logging.format, "compact");
        Ok(())
    }

    #[test]
    fn parses_all_sections() -> Result<()> {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8088
            worker_threads = 2

            [storage]
            backend = "memory"
            resume_ids = true

            [logging]
            format = "json"
            "#,
        )?;
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8088);
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.storage.backend, StorageBackend::Memory);
        assert!(cfg.storage.resume_ids);
        assert_eq!(cfg.logging.format, "json");
        Ok(())
    }

    #[test]
    fn normalizes_blank_host_and_zero_workers() -> Result<()> {
        let mut cfg = parse("[server]\nhost = \"  \"\nport = 9000\nworker_threads = 0\n")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.bind_addr()?.port(), 9000);
        Ok(())
    }

    #[test]
    fn rejects_port_zero_and_empty_data_dir() -> Result<()> {
        let mut cfg = parse("[server]\nhost = \"127.0.0.1\"\nport = 0\n")?;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = parse("[storage]\nbackend = \"file\"\ndata_dir = \"\"\n")?;
        assert!(cfg.normalize_and_validate().is_err());

        // memory backend ignores data_dir
        let mut cfg = parse("[storage]\nbackend = \"memory\"\ndata_dir = \"\"\n")?;
        assert!(cfg.normalize_and_validate().is_ok());
        Ok(())
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        assert!(parse("[storage]\nbackend = \"mongo\"\n").is_err());
    }
}
